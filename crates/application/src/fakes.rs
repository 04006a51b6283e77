use std::collections::{HashMap, HashSet, VecDeque};

use async_trait::async_trait;
use tokio::sync::Mutex;

use autoerase_core::{AppError, AppResult};

use crate::{AccountDirectory, AccountEraser, AccountPage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AdminCall {
    MediaCount(String),
    Deactivate(String),
    DeleteMedia(String),
    Redact(String),
}

#[derive(Default)]
pub(crate) struct FakeHomeserver {
    pages: Mutex<VecDeque<AppResult<AccountPage>>>,
    page_tokens: Mutex<Vec<Option<String>>>,
    media: HashMap<String, u64>,
    failing_media_counts: HashSet<String>,
    failing_deactivations: HashSet<String>,
    failing_media_deletions: HashSet<String>,
    failing_redactions: HashSet<String>,
    calls: Mutex<Vec<AdminCall>>,
}

impl FakeHomeserver {
    pub(crate) fn with_pages(pages: Vec<AppResult<AccountPage>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            ..Self::default()
        }
    }

    pub(crate) fn media(mut self, account_name: &str, count: u64) -> Self {
        self.media.insert(account_name.to_owned(), count);
        self
    }

    pub(crate) fn failing_media_count(mut self, account_name: &str) -> Self {
        self.failing_media_counts.insert(account_name.to_owned());
        self
    }

    pub(crate) fn failing_deactivation(mut self, account_name: &str) -> Self {
        self.failing_deactivations.insert(account_name.to_owned());
        self
    }

    pub(crate) fn failing_media_deletion(mut self, account_name: &str) -> Self {
        self.failing_media_deletions.insert(account_name.to_owned());
        self
    }

    pub(crate) fn failing_redaction(mut self, account_name: &str) -> Self {
        self.failing_redactions.insert(account_name.to_owned());
        self
    }

    pub(crate) async fn requested_page_tokens(&self) -> Vec<Option<String>> {
        self.page_tokens.lock().await.clone()
    }

    pub(crate) async fn calls(&self) -> Vec<AdminCall> {
        self.calls.lock().await.clone()
    }

    pub(crate) async fn erasure_calls(&self) -> Vec<AdminCall> {
        self.calls()
            .await
            .into_iter()
            .filter(|call| !matches!(call, AdminCall::MediaCount(_)))
            .collect()
    }

    async fn record(&self, call: AdminCall) {
        self.calls.lock().await.push(call);
    }
}

#[async_trait]
impl AccountDirectory for FakeHomeserver {
    async fn fetch_accounts_page(&self, from: Option<&str>) -> AppResult<AccountPage> {
        self.page_tokens.lock().await.push(from.map(str::to_owned));
        self.pages
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(AccountPage::default()))
    }

    async fn uploaded_media_count(&self, account_name: &str) -> AppResult<u64> {
        self.record(AdminCall::MediaCount(account_name.to_owned()))
            .await;
        if self.failing_media_counts.contains(account_name) {
            return Err(AppError::Transport("connection reset by peer".to_owned()));
        }

        Ok(self.media.get(account_name).copied().unwrap_or(0))
    }
}

#[async_trait]
impl AccountEraser for FakeHomeserver {
    async fn deactivate_account(&self, account_name: &str) -> AppResult<()> {
        self.record(AdminCall::Deactivate(account_name.to_owned()))
            .await;
        if self.failing_deactivations.contains(account_name) {
            return Err(AppError::Server {
                status: 500,
                body: "{\"errcode\":\"M_UNKNOWN\"}".to_owned(),
            });
        }

        Ok(())
    }

    async fn delete_account_media(&self, account_name: &str) -> AppResult<u64> {
        self.record(AdminCall::DeleteMedia(account_name.to_owned()))
            .await;
        if self.failing_media_deletions.contains(account_name) {
            return Err(AppError::Decode("expected value at line 1".to_owned()));
        }

        Ok(self.media.get(account_name).copied().unwrap_or(0))
    }

    async fn redact_account_messages(&self, account_name: &str) -> AppResult<()> {
        self.record(AdminCall::Redact(account_name.to_owned()))
            .await;
        if self.failing_redactions.contains(account_name) {
            return Err(AppError::Server {
                status: 400,
                body: "{\"errcode\":\"M_BAD_JSON\"}".to_owned(),
            });
        }

        Ok(())
    }
}
