use std::sync::Arc;

use autoerase_core::AppError;
use autoerase_domain::{RetentionPolicy, filter_eligible_with};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::directory_service::AccountDirectoryService;
use crate::dry_run_reporter::{DryRunReporter, PreviewEntry};
use crate::erasure_service::{ErasureService, ErasureSummary};
use crate::homeserver_ports::{AccountDirectory, AccountEraser};

/// What a run ended up doing with the eligible accounts.
#[derive(Debug)]
pub enum RunOutcome {
    /// Nothing passed the eligibility filter.
    NoEligibleAccounts,
    /// Dry-run preview lines, oldest account first.
    Previewed(Vec<PreviewEntry>),
    /// Erasure batch results.
    Erased(ErasureSummary),
}

/// Summary of one retention run.
#[derive(Debug)]
pub struct RunReport {
    /// Accounts loaded from the directory.
    pub loaded_accounts: usize,
    /// Error that cut the directory listing short, if any.
    pub listing_error: Option<AppError>,
    /// Accounts that passed the eligibility filter.
    pub eligible_accounts: usize,
    /// Preview or erasure result.
    pub outcome: RunOutcome,
}

/// Runs the directory listing, the eligibility filter and then either the
/// dry-run preview or the erasure executor.
#[derive(Clone)]
pub struct RetentionRunService {
    directory: Arc<dyn AccountDirectory>,
    eraser: Arc<dyn AccountEraser>,
}

impl RetentionRunService {
    /// Creates a run service from port implementations.
    #[must_use]
    pub fn new(directory: Arc<dyn AccountDirectory>, eraser: Arc<dyn AccountEraser>) -> Self {
        Self { directory, eraser }
    }

    /// Executes one run under `policy`.
    ///
    /// A partially loaded directory is still filtered and processed; the
    /// listing error is logged and reported back.
    pub async fn run(&self, policy: &RetentionPolicy, now: DateTime<Utc>) -> RunReport {
        if policy.dry_run() {
            info!("running in dry run mode");
        }

        info!("loading accounts...");
        let listing = AccountDirectoryService::new(self.directory.clone())
            .list_accounts()
            .await;
        if let Some(error) = &listing.error {
            warn!(
                error = %error,
                loaded_accounts = listing.accounts.len(),
                "account listing stopped early, continuing with loaded accounts"
            );
        }

        let loaded_accounts = listing.accounts.len();
        info!(loaded_accounts, "loaded accounts, filtering...");
        let eligible =
            filter_eligible_with(listing.accounts, policy.rules(), now, |account, reason| {
                debug!(account = %account.name, reason = reason.as_str(), "account excluded");
            });
        let eligible_accounts = eligible.len();

        let outcome = if eligible.is_empty() {
            info!("no eligible accounts found");
            RunOutcome::NoEligibleAccounts
        } else if policy.dry_run() {
            info!(eligible_accounts, "filtered accounts, adding media count...");
            let entries = DryRunReporter::new(self.directory.clone())
                .report(eligible, now)
                .await;
            RunOutcome::Previewed(entries)
        } else {
            info!(eligible_accounts, "filtered accounts, erasing...");
            let summary = ErasureService::new(self.eraser.clone(), policy.redact_on_erase())
                .erase_all(&eligible, now)
                .await;
            RunOutcome::Erased(summary)
        };

        RunReport {
            loaded_accounts,
            listing_error: listing.error,
            eligible_accounts,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use autoerase_core::AppError;
    use autoerase_domain::{Account, ExcludedPrefixes, MILLIS_PER_DAY, RetentionPolicy};
    use chrono::{DateTime, Utc};

    use crate::AccountPage;
    use crate::fakes::{AdminCall, FakeHomeserver};

    use super::{RetentionRunService, RunOutcome};

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_790_000_000_000).unwrap_or_default()
    }

    fn account_aged(name: &str, days: i64) -> Account {
        Account::new(name, now().timestamp_millis() - days * MILLIS_PER_DAY)
    }

    fn policy(dry_run: bool, redact: bool) -> RetentionPolicy {
        RetentionPolicy::new(30, ExcludedPrefixes::builtin(), dry_run, redact)
            .unwrap_or_else(|error| panic!("invalid policy: {error}"))
    }

    fn directory_pages() -> Vec<Result<AccountPage, AppError>> {
        let mut admin = account_aged("@root:hs", 900);
        admin.admin = true;
        vec![
            Ok(AccountPage {
                accounts: vec![account_aged("@new:hs", 3), account_aged("@alice:hs", 40)],
                next_token: Some("2".to_owned()),
                total: Some(5),
            }),
            Ok(AccountPage {
                accounts: vec![
                    account_aged("@discordbot:hs", 400),
                    admin,
                    account_aged("@bob:hs", 200),
                ],
                next_token: None,
                total: Some(5),
            }),
        ]
    }

    #[tokio::test]
    async fn erases_only_eligible_accounts() {
        let homeserver = Arc::new(FakeHomeserver::with_pages(directory_pages()).media("@bob:hs", 6));
        let service = RetentionRunService::new(homeserver.clone(), homeserver.clone());

        let report = service.run(&policy(false, true), now()).await;

        assert_eq!(report.loaded_accounts, 5);
        assert_eq!(report.eligible_accounts, 2);
        let RunOutcome::Erased(summary) = report.outcome else {
            panic!("expected erasure outcome");
        };
        assert_eq!(summary.fully_erased(), 2);
        assert_eq!(summary.deleted_media(), 6);
        assert_eq!(
            homeserver.erasure_calls().await,
            vec![
                AdminCall::Deactivate("@alice:hs".to_owned()),
                AdminCall::DeleteMedia("@alice:hs".to_owned()),
                AdminCall::Redact("@alice:hs".to_owned()),
                AdminCall::Deactivate("@bob:hs".to_owned()),
                AdminCall::DeleteMedia("@bob:hs".to_owned()),
                AdminCall::Redact("@bob:hs".to_owned()),
            ]
        );
    }

    #[tokio::test]
    async fn dry_run_previews_without_erasing() {
        let homeserver = Arc::new(FakeHomeserver::with_pages(directory_pages()));
        let service = RetentionRunService::new(homeserver.clone(), homeserver.clone());

        let report = service.run(&policy(true, true), now()).await;

        let RunOutcome::Previewed(entries) = report.outcome else {
            panic!("expected preview outcome");
        };
        let names: Vec<&str> = entries
            .iter()
            .map(|entry| entry.account_name.as_str())
            .collect();
        assert_eq!(names, vec!["@bob:hs", "@alice:hs"]);
        assert!(homeserver.erasure_calls().await.is_empty());
    }

    #[tokio::test]
    async fn partial_listing_is_still_processed() {
        let homeserver = Arc::new(FakeHomeserver::with_pages(vec![
            Ok(AccountPage {
                accounts: vec![account_aged("@alice:hs", 40)],
                next_token: Some("1".to_owned()),
                total: None,
            }),
            Err(AppError::Transport("connection reset".to_owned())),
        ]));
        let service = RetentionRunService::new(homeserver.clone(), homeserver.clone());

        let report = service.run(&policy(false, false), now()).await;

        assert!(matches!(report.listing_error, Some(AppError::Transport(_))));
        assert_eq!(report.eligible_accounts, 1);
        assert!(matches!(report.outcome, RunOutcome::Erased(_)));
    }

    #[tokio::test]
    async fn nothing_eligible_sends_no_requests() {
        let homeserver = Arc::new(FakeHomeserver::with_pages(vec![Ok(AccountPage {
            accounts: vec![account_aged("@new:hs", 1)],
            next_token: None,
            total: Some(1),
        })]));
        let service = RetentionRunService::new(homeserver.clone(), homeserver.clone());

        let report = service.run(&policy(true, false), now()).await;

        assert!(matches!(report.outcome, RunOutcome::NoEligibleAccounts));
        assert!(homeserver.calls().await.is_empty());
    }
}
