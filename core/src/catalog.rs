//! # Result Catalog
//!
//! Persists matched devices to a hosted database, one row per `address:port`,
//! and skips rows that already exist.

use std::collections::HashSet;

use async_trait::async_trait;
use camaudit_common::models::device::DeviceRecord;
use reqwest::Client;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, warn};

pub const NOTION_API: &str = "https://api.notion.com";
pub const NOTION_VERSION: &str = "2022-06-28";

/// Notion caps a single rich-text segment at 2000 characters.
const RICH_TEXT_LIMIT: usize = 2000;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog api returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid database reference '{0}'")]
    InvalidDatabase(String),
}

#[async_trait]
pub trait Catalog: Send + Sync {
    /// Keys (`address:port`) of every row already stored.
    async fn known_entries(&self) -> Result<HashSet<String>, CatalogError>;

    async fn insert(&self, record: &DeviceRecord) -> Result<(), CatalogError>;
}

#[derive(Debug)]
pub enum SyncStatus {
    Added,
    AlreadyKnown,
    Failed(CatalogError),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncSummary {
    pub added: usize,
    pub known: usize,
    pub failed: usize,
}

/// Writes every record whose key the catalog does not know yet.
///
/// Existing keys are read once up front. A failed insert is reported through
/// `on_record` and does not stop the remaining records.
pub async fn synchronize<C, F>(
    catalog: &C,
    records: &[DeviceRecord],
    mut on_record: F,
) -> Result<SyncSummary, CatalogError>
where
    C: Catalog + ?Sized,
    F: FnMut(&DeviceRecord, &SyncStatus),
{
    let mut known = catalog.known_entries().await?;
    let mut summary = SyncSummary::default();

    for record in records {
        let key = record.key();

        let status = if known.contains(&key) {
            summary.known += 1;
            SyncStatus::AlreadyKnown
        } else {
            match catalog.insert(record).await {
                Ok(()) => {
                    known.insert(key);
                    summary.added += 1;
                    SyncStatus::Added
                }
                Err(err) => {
                    warn!(target = %record.target, error = %err, "catalog insert failed");
                    summary.failed += 1;
                    SyncStatus::Failed(err)
                }
            }
        };

        on_record(record, &status);
    }

    Ok(summary)
}

/// Catalog backed by a Notion database.
///
/// Expected properties: `Name` (title), `Cameras` (number), `Users` (number),
/// `Address` (url).
pub struct NotionCatalog {
    client: Client,
    base_url: String,
    token: String,
    database_id: String,
}

impl NotionCatalog {
    /// `database` is either the bare id or a link to the database page.
    pub fn new(token: impl Into<String>, database: &str) -> Result<Self, CatalogError> {
        let database_id = database_id(database)
            .ok_or_else(|| CatalogError::InvalidDatabase(database.to_string()))?;

        let client = Client::builder()
            .user_agent(concat!("camaudit/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: NOTION_API.to_string(),
            token: token.into(),
            database_id,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, CatalogError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let payload: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            let message = payload["message"]
                .as_str()
                .unwrap_or("no error message")
                .to_string();
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(payload)
    }
}

#[async_trait]
impl Catalog for NotionCatalog {
    async fn known_entries(&self) -> Result<HashSet<String>, CatalogError> {
        let path = format!("/v1/databases/{}/query", self.database_id);
        let mut known = HashSet::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut body = json!({ "page_size": 100 });
            if let Some(cursor) = &cursor {
                body["start_cursor"] = json!(cursor);
            }

            let page = self.post(&path, &body).await?;
            let rows = page["results"].as_array().map(Vec::as_slice).unwrap_or_default();
            known.extend(rows.iter().filter_map(row_title));

            cursor = match (page["has_more"].as_bool(), page["next_cursor"].as_str()) {
                (Some(true), Some(next)) => Some(next.to_string()),
                _ => break,
            };
        }

        debug!(entries = known.len(), "loaded catalog entries");
        Ok(known)
    }

    async fn insert(&self, record: &DeviceRecord) -> Result<(), CatalogError> {
        let body = page_body(&self.database_id, record);
        self.post("/v1/pages", &body).await.map(|_| ())
    }
}

/// Plain text of the row's title property, whatever it is called.
fn row_title(row: &Value) -> Option<String> {
    let properties = row["properties"].as_object()?;
    let title = properties
        .values()
        .find(|prop| prop["type"] == "title")?["title"]
        .as_array()?;

    let text: String = title
        .iter()
        .filter_map(|part| part["plain_text"].as_str())
        .collect();

    (!text.is_empty()).then_some(text)
}

fn page_body(database_id: &str, record: &DeviceRecord) -> Value {
    let document = record.to_pretty_json();

    json!({
        "parent": { "database_id": database_id },
        "properties": {
            "Name": { "title": [{ "text": { "content": record.key() } }] },
            "Cameras": { "number": record.channels.len() },
            "Users": { "number": record.users.len() },
            "Address": { "url": record.target.link() },
        },
        "children": [{
            "object": "block",
            "type": "code",
            "code": {
                "language": "json",
                "rich_text": rich_text(&document),
            },
        }],
    })
}

fn rich_text(text: &str) -> Vec<Value> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(RICH_TEXT_LIMIT)
        .map(|chunk| {
            let content: String = chunk.iter().collect();
            json!({ "type": "text", "text": { "content": content } })
        })
        .collect()
}

/// Extracts the 32-hex-digit database id from a bare id or a share link.
pub fn database_id(reference: &str) -> Option<String> {
    let reference = reference.trim();
    let without_query = reference.split(['?', '#']).next().unwrap_or(reference);
    let last_segment = without_query.rsplit('/').next().unwrap_or(without_query);

    let compact: String = last_segment.chars().filter(|c| *c != '-').collect();
    let candidate = compact.get(compact.len().saturating_sub(32)..)?;

    (candidate.len() == 32 && candidate.chars().all(|c| c.is_ascii_hexdigit()))
        .then(|| candidate.to_ascii_lowercase())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
