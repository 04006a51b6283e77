//! Homeserver account records as reported by the admin user directory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Milliseconds in one day, the unit used by retention windows.
pub const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// One user identity on the homeserver.
///
/// Only the fields the retention run depends on are decoded. Older Synapse
/// releases report the boolean flags as `0`/`1` integers, newer ones as JSON
/// booleans; both forms are accepted and missing flags default to `false`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Account {
    /// Fully qualified user id, e.g. `@alice:example.org`.
    pub name: String,
    /// Guest account flag.
    #[serde(default, deserialize_with = "flag")]
    pub is_guest: bool,
    /// Server administrator flag.
    #[serde(default, deserialize_with = "flag")]
    pub admin: bool,
    /// Account already deactivated.
    #[serde(default, deserialize_with = "flag")]
    pub deactivated: bool,
    /// Account locked by an administrator.
    #[serde(default, deserialize_with = "flag")]
    pub locked: bool,
    /// Registration time in milliseconds since the Unix epoch.
    pub creation_ts: i64,
    /// Uploaded media count, only attached during dry-run previews.
    #[serde(skip)]
    pub uploaded_media: Option<u64>,
}

impl Account {
    /// Creates a regular (non-privileged, active) account record.
    #[must_use]
    pub fn new(name: impl Into<String>, creation_ts: i64) -> Self {
        Self {
            name: name.into(),
            is_guest: false,
            admin: false,
            deactivated: false,
            locked: false,
            creation_ts,
            uploaded_media: None,
        }
    }

    /// Returns whether any server-reported state forbids erasing this account.
    #[must_use]
    pub fn is_protected(&self) -> bool {
        self.is_guest || self.admin || self.deactivated || self.locked
    }

    /// Returns the signed account age in milliseconds relative to `now`.
    ///
    /// The value is negative when the registration time lies in the future.
    #[must_use]
    pub fn age_millis(&self, now: DateTime<Utc>) -> i64 {
        now.timestamp_millis().saturating_sub(self.creation_ts)
    }

    /// Returns the age in whole days, truncated toward zero.
    #[must_use]
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        self.age_millis(now) / MILLIS_PER_DAY
    }

    /// Returns the uploaded media count, or zero when it was never fetched.
    #[must_use]
    pub fn uploaded_media_or_zero(&self) -> u64 {
        self.uploaded_media.unwrap_or(0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagValue {
    Bool(bool),
    Int(i64),
}

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<FlagValue>::deserialize(deserializer)?;
    Ok(match value {
        Some(FlagValue::Bool(value)) => value,
        Some(FlagValue::Int(value)) => value != 0,
        None => false,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_boolean_flags() {
        let account: Result<Account, _> = serde_json::from_value(json!({
            "name": "@alice:example.org",
            "is_guest": false,
            "admin": true,
            "deactivated": false,
            "locked": false,
            "creation_ts": 1_700_000_000_000_i64,
            "displayname": "Alice"
        }));

        let account = account.unwrap_or_else(|error| panic!("decode failed: {error}"));
        assert!(account.admin);
        assert!(account.is_protected());
        assert_eq!(account.uploaded_media, None);
    }

    #[test]
    fn decodes_integer_flags_and_missing_locked() {
        let account: Result<Account, _> = serde_json::from_value(json!({
            "name": "@bob:example.org",
            "is_guest": 0,
            "admin": 0,
            "deactivated": 1,
            "creation_ts": 1_600_000_000_000_i64
        }));

        let account = account.unwrap_or_else(|error| panic!("decode failed: {error}"));
        assert!(account.deactivated);
        assert!(!account.locked);
        assert!(!account.is_guest);
    }

    #[test]
    fn null_flag_decodes_as_false() {
        let account: Result<Account, _> = serde_json::from_value(json!({
            "name": "@carol:example.org",
            "locked": null,
            "creation_ts": 0
        }));

        let account = account.unwrap_or_else(|error| panic!("decode failed: {error}"));
        assert!(!account.is_protected());
    }

    #[test]
    fn age_days_truncates_partial_days() {
        let now = Utc.timestamp_millis_opt(100 * MILLIS_PER_DAY).single();
        let now = now.unwrap_or_else(|| panic!("test"));
        let account = Account::new("@dave:example.org", 60 * MILLIS_PER_DAY + 1);

        assert_eq!(account.age_days(now), 39);
    }

    #[test]
    fn future_account_has_negative_age() {
        let now = Utc.timestamp_millis_opt(10 * MILLIS_PER_DAY).single();
        let now = now.unwrap_or_else(|| panic!("test"));
        let account = Account::new("@eve:example.org", 12 * MILLIS_PER_DAY);

        assert_eq!(account.age_millis(now), -2 * MILLIS_PER_DAY);
    }
}
