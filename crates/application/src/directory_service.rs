use std::sync::Arc;

use autoerase_core::AppError;
use autoerase_domain::Account;
use tracing::debug;

use crate::homeserver_ports::AccountDirectory;

/// Accounts collected from the directory, with the error that stopped
/// pagination early if any.
#[derive(Debug)]
pub struct DirectoryListing {
    /// Accounts from every fetched page, in server order.
    pub accounts: Vec<Account>,
    /// Number of pages fetched successfully.
    pub pages: usize,
    /// Failure that aborted pagination.
    pub error: Option<AppError>,
}

impl DirectoryListing {
    /// Returns whether pagination stopped before the last page.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.error.is_some()
    }
}

/// Walks the paginated account directory.
#[derive(Clone)]
pub struct AccountDirectoryService {
    directory: Arc<dyn AccountDirectory>,
}

impl AccountDirectoryService {
    /// Creates a directory service from a port implementation.
    #[must_use]
    pub fn new(directory: Arc<dyn AccountDirectory>) -> Self {
        Self { directory }
    }

    /// Fetches every page until the server stops returning a continuation
    /// token. A token identical to the previous one is treated as a decode
    /// failure.
    ///
    /// A failed page ends pagination; accounts from earlier pages are kept and
    /// returned alongside the error so the caller can decide whether to use
    /// them.
    pub async fn list_accounts(&self) -> DirectoryListing {
        let mut accounts = Vec::new();
        let mut pages = 0_usize;
        let mut next_token: Option<String> = None;

        loop {
            let page = match self.directory.fetch_accounts_page(next_token.as_deref()).await {
                Ok(page) => page,
                Err(error) => {
                    return DirectoryListing {
                        accounts,
                        pages,
                        error: Some(error),
                    };
                }
            };

            pages = pages.saturating_add(1);
            debug!(
                page = pages,
                page_accounts = page.accounts.len(),
                total = ?page.total,
                "fetched account directory page"
            );
            accounts.extend(page.accounts);

            match page.next_token.filter(|token| !token.is_empty()) {
                Some(token) if next_token.as_deref() == Some(token.as_str()) => {
                    return DirectoryListing {
                        accounts,
                        pages,
                        error: Some(AppError::Decode(format!(
                            "account directory repeated next_token '{token}'"
                        ))),
                    };
                }
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        DirectoryListing {
            accounts,
            pages,
            error: None,
        }
    }
}
