use autoerase_core::{AppError, AppResult};

use crate::eligibility::EligibilityRules;
use crate::prefixes::ExcludedPrefixes;

/// Retention configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionPolicy {
    rules: EligibilityRules,
    dry_run: bool,
    redact_on_erase: bool,
}

impl RetentionPolicy {
    /// Creates a validated retention policy.
    ///
    /// `retention_days` must be strictly positive; zero is rejected rather
    /// than interpreted as "erase everything".
    pub fn new(
        retention_days: u32,
        excluded_prefixes: ExcludedPrefixes,
        dry_run: bool,
        redact_on_erase: bool,
    ) -> AppResult<Self> {
        if retention_days == 0 {
            return Err(AppError::Validation(
                "retention days must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            rules: EligibilityRules::new(retention_days, excluded_prefixes),
            dry_run,
            redact_on_erase,
        })
    }

    /// Returns the eligibility rules.
    #[must_use]
    pub fn rules(&self) -> &EligibilityRules {
        &self.rules
    }

    /// Returns the retention window in days.
    #[must_use]
    pub fn retention_days(&self) -> u32 {
        self.rules.retention_days()
    }

    /// Returns whether the run only previews eligible accounts.
    #[must_use]
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Returns whether messages are redacted after erasure.
    #[must_use]
    pub fn redact_on_erase(&self) -> bool {
        self.redact_on_erase
    }
}
