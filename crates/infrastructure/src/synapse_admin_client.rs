use async_trait::async_trait;
use autoerase_application::{AccountDirectory, AccountEraser, AccountPage};
use autoerase_core::{AppError, AppResult};
use autoerase_domain::Account;
use reqwest::header;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

/// User agent sent with every admin API request.
pub const USER_AGENT: &str =
    "Synapse User Auto Erase (library; +https://github.com/etkecc/synapse-user-autoerase)";

const PAGE_SIZE: u32 = 1000;
const FIRST_PAGE_TOKEN: &str = "0";

#[derive(Debug, Serialize)]
struct DeactivateAccountRequest {
    erase: bool,
}

#[derive(Debug, Serialize)]
struct RedactMessagesRequest {
    rooms: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AccountsPageResponse {
    #[serde(default)]
    users: Vec<Account>,
    #[serde(default)]
    next_token: Option<NextToken>,
    #[serde(default)]
    total: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NextToken {
    Text(String),
    Number(u64),
}

impl NextToken {
    fn into_string(self) -> String {
        match self {
            Self::Text(value) => value,
            Self::Number(value) => value.to_string(),
        }
    }
}

/// Shared shape of the media listing and media deletion responses.
#[derive(Debug, Deserialize)]
struct MediaTotalResponse {
    total: u64,
}

/// Synapse admin API adapter for the directory and erasure ports.
#[derive(Clone)]
pub struct SynapseAdminClient {
    http_client: reqwest::Client,
    base_url: Url,
    access_token: String,
}

impl SynapseAdminClient {
    /// Creates a client with its own HTTP connection pool.
    ///
    /// No request timeout is configured; transport defaults apply.
    pub fn new(base_url: &str, access_token: impl Into<String>) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

        Self::with_http_client(http_client, base_url, access_token)
    }

    /// Creates a client reusing an existing HTTP client.
    pub fn with_http_client(
        http_client: reqwest::Client,
        base_url: &str,
        access_token: impl Into<String>,
    ) -> AppResult<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|error| {
            AppError::Validation(format!("invalid homeserver URL '{base_url}': {error}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Validation(format!(
                "homeserver URL '{base_url}' cannot carry API paths"
            )));
        }

        Ok(Self {
            http_client,
            base_url,
            access_token: access_token.into(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                AppError::Validation(format!(
                    "homeserver URL '{}' cannot carry API paths",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        operation: &str,
    ) -> AppResult<reqwest::Response> {
        let response = request
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.access_token),
            )
            .send()
            .await
            .map_err(|error| {
                AppError::Transport(format!("failed to call {operation} endpoint: {error}"))
            })?;

        let status = response.status();
        debug!(operation, status = status.as_u16(), "admin API responded");
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_owned());
            return Err(AppError::Server {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
        operation: &str,
    ) -> AppResult<T> {
        response.json::<T>().await.map_err(|error| {
            if error.is_decode() {
                AppError::Decode(format!(
                    "failed to parse {operation} endpoint response body: {error}"
                ))
            } else {
                AppError::Transport(format!(
                    "failed to read {operation} endpoint response body: {error}"
                ))
            }
        })
    }
}

#[async_trait]
impl AccountDirectory for SynapseAdminClient {
    async fn fetch_accounts_page(&self, from: Option<&str>) -> AppResult<AccountPage> {
        let mut url = self.endpoint(&["_synapse", "admin", "v2", "users"])?;
        url.query_pairs_mut()
            .append_pair("from", from.unwrap_or(FIRST_PAGE_TOKEN))
            .append_pair("limit", PAGE_SIZE.to_string().as_str())
            .append_pair("guests", "false")
            .append_pair("admins", "false")
            .append_pair("deactivated", "false")
            .append_pair("locked", "false")
            .append_pair("order_by", "creation_ts")
            .append_pair("dir", "b");

        let response = self
            .send(self.http_client.get(url), "list accounts")
            .await?;
        let page = Self::decode::<AccountsPageResponse>(response, "list accounts").await?;

        Ok(AccountPage {
            accounts: page.users,
            next_token: page
                .next_token
                .map(NextToken::into_string)
                .filter(|token| !token.is_empty()),
            total: page.total,
        })
    }

    async fn uploaded_media_count(&self, account_name: &str) -> AppResult<u64> {
        let mut url = self.endpoint(&["_synapse", "admin", "v1", "users", account_name, "media"])?;
        url.query_pairs_mut().append_pair("limit", "1");

        let response = self.send(self.http_client.get(url), "media count").await?;
        let media = Self::decode::<MediaTotalResponse>(response, "media count").await?;
        Ok(media.total)
    }
}

#[async_trait]
impl AccountEraser for SynapseAdminClient {
    async fn deactivate_account(&self, account_name: &str) -> AppResult<()> {
        let url = self.endpoint(&["_synapse", "admin", "v1", "deactivate", account_name])?;
        self.send(
            self.http_client
                .post(url)
                .json(&DeactivateAccountRequest { erase: true }),
            "deactivate account",
        )
        .await?;

        Ok(())
    }

    async fn delete_account_media(&self, account_name: &str) -> AppResult<u64> {
        let url = self.endpoint(&["_synapse", "admin", "v1", "users", account_name, "media"])?;
        let response = self
            .send(self.http_client.delete(url), "delete media")
            .await?;
        let deleted = Self::decode::<MediaTotalResponse>(response, "delete media").await?;
        Ok(deleted.total)
    }

    async fn redact_account_messages(&self, account_name: &str) -> AppResult<()> {
        let url = self.endpoint(&["_synapse", "admin", "v1", "user", account_name, "redact"])?;
        self.send(
            self.http_client
                .post(url)
                .json(&RedactMessagesRequest { rooms: Vec::new() }),
            "redact messages",
        )
        .await?;

        Ok(())
    }
}
