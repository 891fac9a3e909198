//! # Target Discovery
//!
//! Candidate targets come from a host-search provider through the
//! [`TargetSource`] cursor. The orchestrator is its only consumer, so every
//! candidate is handed out exactly once.

use std::time::Duration;

use async_trait::async_trait;
use camaudit_common::network::scope::Scope;
use camaudit_common::network::target::Target;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

pub const SHODAN_API: &str = "https://api.shodan.io";

/// Banner served by the audited device family's embedded web server.
pub const DEFAULT_QUERY: &str = "Server: DNVRS-Webs";

const MAX_ATTEMPTS: u32 = 5;
const RETRY_DELAY: Duration = Duration::from_secs(1);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("discovery api returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("discovery request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// One batch of candidates from the provider.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Page {
    pub targets: Vec<Target>,
    /// Entries the provider counted but that carried no usable address or port.
    pub skipped: usize,
}

impl From<Vec<Target>> for Page {
    fn from(targets: Vec<Target>) -> Self {
        Self { targets, skipped: 0 }
    }
}

/// A paginated cursor over candidate targets.
#[async_trait]
pub trait TargetSource: Send {
    /// Number of candidates the provider expects to hand out.
    async fn total(&mut self) -> Result<usize, DiscoveryError>;

    /// Next batch of candidates, `None` once exhausted.
    async fn next_page(&mut self) -> Result<Option<Page>, DiscoveryError>;
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    total: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    matches: Vec<SearchMatch>,
}

#[derive(Debug, Deserialize)]
struct SearchMatch {
    ip_str: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
}

pub struct ShodanSource {
    client: Client,
    base_url: String,
    api_key: String,
    query: String,
    page: u32,
    exhausted: bool,
}

impl ShodanSource {
    pub fn new(api_key: impl Into<String>, query: impl Into<String>) -> Result<Self, DiscoveryError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("camaudit/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: SHODAN_API.to_string(),
            api_key: api_key.into(),
            query: query.into(),
            page: 0,
            exhausted: false,
        })
    }

    /// Points the source at another API root (a mirror or a local fake).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Narrows the query to the authorized networks.
    pub fn within(mut self, scope: &Scope) -> Self {
        self.query = scoped_query(&self.query, scope);
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, DiscoveryError> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let result = self
                .client
                .get(&url)
                .query(&[("key", self.api_key.as_str())])
                .query(params)
                .send()
                .await;

            let status = match result {
                Ok(response) if response.status().is_success() => {
                    return Ok(response.json::<T>().await?);
                }
                Ok(response) if is_transient(response.status()) => response.status().as_u16(),
                Ok(response) => {
                    let status = response.status().as_u16();
                    let body = response.text().await.unwrap_or_default();
                    let message = serde_json::from_str::<ApiErrorBody>(&body)
                        .map(|b| b.error)
                        .unwrap_or(body);
                    return Err(DiscoveryError::Api { status, message });
                }
                Err(err) if attempt < MAX_ATTEMPTS => {
                    warn!(path, attempt, error = %err, "discovery request failed, retrying");
                    tokio::time::sleep(RETRY_DELAY * attempt).await;
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            if attempt >= MAX_ATTEMPTS {
                return Err(DiscoveryError::Api {
                    status,
                    message: format!("still failing after {attempt} attempts"),
                });
            }

            warn!(path, attempt, status, "discovery request failed, retrying");
            tokio::time::sleep(RETRY_DELAY * attempt).await;
        }
    }
}

#[async_trait]
impl TargetSource for ShodanSource {
    async fn total(&mut self) -> Result<usize, DiscoveryError> {
        let count: CountResponse = self
            .get_json("/shodan/host/count", &[("query", self.query.clone())])
            .await?;
        Ok(count.total)
    }

    async fn next_page(&mut self) -> Result<Option<Page>, DiscoveryError> {
        if self.exhausted {
            return Ok(None);
        }

        self.page += 1;
        let params = [
            ("query", self.query.clone()),
            ("page", self.page.to_string()),
            ("minify", "true".to_string()),
        ];
        let response: SearchResponse = self.get_json("/shodan/host/search", &params).await?;

        if response.matches.is_empty() {
            self.exhausted = true;
            return Ok(None);
        }

        let mut page = Page::default();
        for found in response.matches {
            match (found.ip_str, found.port) {
                (Some(ip), Some(port)) => page.targets.push(Target::new(ip, port)),
                (ip, port) => {
                    debug!(?ip, ?port, "skipping incomplete search result");
                    page.skipped += 1;
                }
            }
        }

        Ok(Some(page))
    }
}

fn is_transient(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

/// Appends a `net:` filter so the provider only returns in-scope hosts.
pub fn scoped_query(query: &str, scope: &Scope) -> String {
    let query = query.trim();
    if query.is_empty() {
        format!("net:{scope}")
    } else {
        format!("{query} net:{scope}")
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
