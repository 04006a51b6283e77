//! Erasure eligibility rules.

use chrono::{DateTime, Utc};

use crate::account::{Account, MILLIS_PER_DAY};
use crate::prefixes::ExcludedPrefixes;

/// First rule that keeps an account from being erased.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    /// Guest, admin, deactivated or locked account.
    Protected,
    /// Name starts with an excluded bot or bridge prefix.
    ExcludedPrefix,
    /// Account is younger than the retention window (or registered in the future).
    WithinRetention,
}

impl ExclusionReason {
    /// Returns a stable label for logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Protected => "protected",
            Self::ExcludedPrefix => "excluded_prefix",
            Self::WithinRetention => "within_retention",
        }
    }
}

/// Rules deciding which accounts are eligible for erasure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityRules {
    retention_days: u32,
    excluded_prefixes: ExcludedPrefixes,
}

impl EligibilityRules {
    /// Creates eligibility rules.
    ///
    /// A `retention_days` of zero disables the age check entirely; it never
    /// means "erase immediately".
    #[must_use]
    pub fn new(retention_days: u32, excluded_prefixes: ExcludedPrefixes) -> Self {
        Self {
            retention_days,
            excluded_prefixes,
        }
    }

    /// Returns the retention window in days.
    #[must_use]
    pub fn retention_days(&self) -> u32 {
        self.retention_days
    }

    /// Returns the excluded prefix set.
    #[must_use]
    pub fn excluded_prefixes(&self) -> &ExcludedPrefixes {
        &self.excluded_prefixes
    }

    /// Returns the first rule excluding `account`, or `None` when it is eligible.
    #[must_use]
    pub fn exclusion_reason(
        &self,
        account: &Account,
        now: DateTime<Utc>,
    ) -> Option<ExclusionReason> {
        if account.is_protected() {
            return Some(ExclusionReason::Protected);
        }

        if self.excluded_prefixes.matches(account.name.as_str()) {
            return Some(ExclusionReason::ExcludedPrefix);
        }

        if self.is_within_retention(account, now) {
            return Some(ExclusionReason::WithinRetention);
        }

        None
    }

    /// Returns whether `account` may be erased.
    #[must_use]
    pub fn is_eligible(&self, account: &Account, now: DateTime<Utc>) -> bool {
        self.exclusion_reason(account, now).is_none()
    }

    // Absolute distance, so registrations in the future are kept too.
    fn is_within_retention(&self, account: &Account, now: DateTime<Utc>) -> bool {
        if self.retention_days == 0 {
            return false;
        }

        let window_millis = u64::from(self.retention_days).saturating_mul(MILLIS_PER_DAY as u64);
        account.age_millis(now).unsigned_abs() <= window_millis
    }
}

/// Returns the eligible subset of `accounts`, preserving input order.
#[must_use]
pub fn filter_eligible(
    accounts: Vec<Account>,
    rules: &EligibilityRules,
    now: DateTime<Utc>,
) -> Vec<Account> {
    filter_eligible_with(accounts, rules, now, |_, _| {})
}

/// Like [`filter_eligible`], calling `on_excluded` with each dropped account
/// and the rule that excluded it.
pub fn filter_eligible_with<F>(
    accounts: Vec<Account>,
    rules: &EligibilityRules,
    now: DateTime<Utc>,
    mut on_excluded: F,
) -> Vec<Account>
where
    F: FnMut(&Account, ExclusionReason),
{
    accounts
        .into_iter()
        .filter(|account| match rules.exclusion_reason(account, now) {
            Some(reason) => {
                on_excluded(account, reason);
                false
            }
            None => true,
        })
        .collect()
}
