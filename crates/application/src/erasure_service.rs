use std::sync::Arc;

use autoerase_domain::Account;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::homeserver_ports::AccountEraser;

/// Result of one erasure step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    /// Step completed.
    Succeeded,
    /// Step failed with the given diagnostic message.
    Failed(String),
    /// Step was not attempted because deactivation failed.
    Skipped,
}

impl StepStatus {
    /// Returns a stable label for logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed(_) => "failed",
            Self::Skipped => "skipped",
        }
    }

    /// Returns whether the step completed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// Per-account record of what the executor did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErasureOutcome {
    /// Account user id.
    pub account_name: String,
    /// Deactivation-with-erase step.
    pub deactivation: StepStatus,
    /// Media deletion step.
    pub media_deletion: StepStatus,
    /// Media files deleted, zero when unknown or failed.
    pub deleted_media: u64,
    /// Redaction step, `None` when redaction is disabled.
    pub redaction: Option<StepStatus>,
}

impl ErasureOutcome {
    /// Returns whether the account was deactivated.
    #[must_use]
    pub fn is_deactivated(&self) -> bool {
        self.deactivation.is_success()
    }

    /// Returns whether every attempted step succeeded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.is_deactivated()
            && self.media_deletion.is_success()
            && self.redaction.as_ref().is_none_or(StepStatus::is_success)
    }
}

/// Totals over one erasure batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErasureSummary {
    /// Outcomes in processing order.
    pub outcomes: Vec<ErasureOutcome>,
}

impl ErasureSummary {
    /// Accounts whose every step succeeded.
    #[must_use]
    pub fn fully_erased(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.is_complete())
            .count()
    }

    /// Accounts deactivated with at least one later step failing.
    #[must_use]
    pub fn partially_erased(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.is_deactivated() && !outcome.is_complete())
            .count()
    }

    /// Accounts whose deactivation failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| !outcome.is_deactivated())
            .count()
    }

    /// Media files deleted across the batch.
    #[must_use]
    pub fn deleted_media(&self) -> u64 {
        self.outcomes
            .iter()
            .map(|outcome| outcome.deleted_media)
            .fold(0, u64::saturating_add)
    }
}

/// Sequential erasure executor.
#[derive(Clone)]
pub struct ErasureService {
    eraser: Arc<dyn AccountEraser>,
    redact_on_erase: bool,
}

impl ErasureService {
    /// Creates an erasure executor.
    #[must_use]
    pub fn new(eraser: Arc<dyn AccountEraser>, redact_on_erase: bool) -> Self {
        Self {
            eraser,
            redact_on_erase,
        }
    }

    /// Erases one account: deactivate with erase, delete media, then redact
    /// messages when enabled.
    ///
    /// A failed deactivation skips the remaining steps. Later steps fail
    /// independently and are never rolled back.
    pub async fn erase(&self, account: &Account, now: DateTime<Utc>) -> ErasureOutcome {
        let name = account.name.as_str();
        info!(account = %name, "removing account");

        if let Err(error) = self.eraser.deactivate_account(name).await {
            warn!(account = %name, error = %error, "failed to deactivate account");
            return ErasureOutcome {
                account_name: name.to_owned(),
                deactivation: StepStatus::Failed(error.to_string()),
                media_deletion: StepStatus::Skipped,
                deleted_media: 0,
                redaction: self.redact_on_erase.then_some(StepStatus::Skipped),
            };
        }

        let (media_deletion, deleted_media) = match self.eraser.delete_account_media(name).await {
            Ok(count) => (StepStatus::Succeeded, count),
            Err(error) => {
                warn!(account = %name, error = %error, "failed to delete account media");
                (StepStatus::Failed(error.to_string()), 0)
            }
        };

        let redaction = if self.redact_on_erase {
            Some(match self.eraser.redact_account_messages(name).await {
                Ok(()) => StepStatus::Succeeded,
                Err(error) => {
                    warn!(account = %name, error = %error, "failed to redact messages");
                    StepStatus::Failed(error.to_string())
                }
            })
        } else {
            None
        };

        info!(
            account = %name,
            registered_days_ago = account.age_days(now),
            deleted_media,
            "removed account"
        );

        ErasureOutcome {
            account_name: name.to_owned(),
            deactivation: StepStatus::Succeeded,
            media_deletion,
            deleted_media,
            redaction,
        }
    }

    /// Erases accounts one at a time in input order, continuing past failures.
    pub async fn erase_all(&self, accounts: &[Account], now: DateTime<Utc>) -> ErasureSummary {
        let mut summary = ErasureSummary::default();
        for account in accounts {
            let outcome = self.erase(account, now).await;
            summary.outcomes.push(outcome);
        }

        summary
    }
}
