use async_trait::async_trait;
use autoerase_core::AppResult;
use autoerase_domain::Account;

/// One page of the homeserver account directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountPage {
    /// Accounts in server order.
    pub accounts: Vec<Account>,
    /// Cursor for the following page, absent on the last page.
    pub next_token: Option<String>,
    /// Total number of matching accounts reported by the server.
    pub total: Option<u64>,
}

/// Read-only port over the homeserver account directory.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Fetches one page, starting at `from` or at the beginning when `None`.
    ///
    /// Guests, admins, deactivated and locked accounts are excluded by the
    /// server where it supports it; results are ordered newest first.
    async fn fetch_accounts_page(&self, from: Option<&str>) -> AppResult<AccountPage>;

    /// Returns the number of media files uploaded by `account_name`.
    async fn uploaded_media_count(&self, account_name: &str) -> AppResult<u64>;
}

/// Port for irreversible administrative actions on one account.
#[async_trait]
pub trait AccountEraser: Send + Sync {
    /// Deactivates the account, asking the server to erase personal data.
    async fn deactivate_account(&self, account_name: &str) -> AppResult<()>;

    /// Deletes all media uploaded by the account and returns the deleted count.
    async fn delete_account_media(&self, account_name: &str) -> AppResult<u64>;

    /// Redacts every message the account sent, in all rooms it joined.
    async fn redact_account_messages(&self, account_name: &str) -> AppResult<()>;
}
