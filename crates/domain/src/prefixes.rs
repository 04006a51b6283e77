//! Account name prefixes that are never erased.

/// Builtin prefixes covering common bot and bridge puppet accounts.
pub const DEFAULT_EXCLUDED_PREFIXES: [&str; 34] = [
    "@bluesky_",
    "@blueskybot:",
    "@discord_",
    "@discordbot:",
    "@emailbot:",
    "@gmessages_",
    "@gmessagesbot:",
    "@googlechat_",
    "@googlechatbot:",
    "@heisenbridge:",
    "@hookshot:",
    "@instagram_",
    "@instagrambot:",
    "@linkedin_",
    "@linkedinbot:",
    "@messenger_",
    "@messengerbot:",
    "@reminder:",
    "@signal_",
    "@signalbot:",
    "@slack_",
    "@slackbot:",
    "@steam_",
    "@steambot:",
    "@telegram_",
    "@telegrambot:",
    "@twitter_",
    "@twitterbot:",
    "@wechat_",
    "@wechatbot:",
    "@whatsapp_",
    "@whatsappbot:",
    "@zulip_",
    "@zulipbot:",
];

/// Immutable set of case-sensitive name prefixes excluded from erasure.
///
/// Always contains [`DEFAULT_EXCLUDED_PREFIXES`]; operator prefixes can only
/// extend it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludedPrefixes(Vec<String>);

impl ExcludedPrefixes {
    /// Creates the builtin prefix set.
    #[must_use]
    pub fn builtin() -> Self {
        Self(
            DEFAULT_EXCLUDED_PREFIXES
                .iter()
                .map(|prefix| (*prefix).to_owned())
                .collect(),
        )
    }

    /// Creates the builtin set extended with operator-supplied prefixes.
    ///
    /// Blank entries are skipped since an empty prefix matches every name.
    #[must_use]
    pub fn with_operator_prefixes<I, S>(operator_prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut prefixes = Self::builtin();
        for prefix in operator_prefixes {
            let prefix = prefix.as_ref().trim();
            if prefix.is_empty() || prefixes.0.iter().any(|known| known == prefix) {
                continue;
            }
            prefixes.0.push(prefix.to_owned());
        }

        prefixes
    }

    /// Returns whether `name` starts with any excluded prefix.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.0.iter().any(|prefix| name.starts_with(prefix.as_str()))
    }

    /// Returns the number of prefixes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the set is empty. Never true for a constructed set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ExcludedPrefixes {
    fn default() -> Self {
        Self::builtin()
    }
}
