use std::sync::Arc;

use autoerase_domain::Account;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::homeserver_ports::AccountDirectory;

/// One line of the dry-run preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewEntry {
    /// Account user id.
    pub account_name: String,
    /// Whole days since registration.
    pub registered_days_ago: i64,
    /// Uploaded media count, zero when it could not be fetched.
    pub uploaded_media: u64,
}

/// Read-only preview of the accounts a run would erase.
///
/// Holds only the directory port, so it cannot deactivate, delete or redact.
#[derive(Clone)]
pub struct DryRunReporter {
    directory: Arc<dyn AccountDirectory>,
}

impl DryRunReporter {
    /// Creates a reporter from a directory port implementation.
    #[must_use]
    pub fn new(directory: Arc<dyn AccountDirectory>) -> Self {
        Self { directory }
    }

    /// Attaches uploaded media counts and sorts the accounts oldest first.
    ///
    /// Count failures are logged and leave that account's count unset.
    pub async fn prepare(&self, mut accounts: Vec<Account>) -> Vec<Account> {
        for account in &mut accounts {
            match self
                .directory
                .uploaded_media_count(account.name.as_str())
                .await
            {
                Ok(count) => account.uploaded_media = Some(count),
                Err(error) => {
                    warn!(
                        account = %account.name,
                        error = %error,
                        "failed to get media count"
                    );
                }
            }
        }

        accounts.sort_by_key(|account| account.creation_ts);
        accounts
    }

    /// Fetches counts, sorts and logs the preview; returns the printed lines.
    pub async fn report(&self, accounts: Vec<Account>, now: DateTime<Utc>) -> Vec<PreviewEntry> {
        let accounts = self.prepare(accounts).await;
        let entries = preview_entries(&accounts, now);

        info!(count = entries.len(), "accounts eligible for erasure, printing...");
        for entry in &entries {
            info!(
                "{} registered {} days ago, uploaded {} media",
                entry.account_name, entry.registered_days_ago, entry.uploaded_media
            );
        }
        info!("to remove the accounts, set SUAE_DRYRUN to false or pass --dryrun=false");

        entries
    }
}

/// Builds preview lines for already prepared accounts, keeping their order.
#[must_use]
pub fn preview_entries(accounts: &[Account], now: DateTime<Utc>) -> Vec<PreviewEntry> {
    accounts
        .iter()
        .map(|account| PreviewEntry {
            account_name: account.name.clone(),
            registered_days_ago: account.age_days(now),
            uploaded_media: account.uploaded_media_or_zero(),
        })
        .collect()
}
