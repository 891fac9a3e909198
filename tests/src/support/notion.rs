//! Fake Notion database: the query and page-creation endpoints, one row per
//! query page so the client has to follow cursors.

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};

use super::serve;

pub const TOKEN: &str = "secret_notion_token";
pub const DATABASE_ID: &str = "0123456789abcdef0123456789abcdef";

#[derive(Default)]
struct NotionState {
    rows: Mutex<Vec<String>>,
    created: Mutex<Vec<Value>>,
}

pub struct FakeNotion {
    pub base_url: String,
    state: Arc<NotionState>,
}

impl FakeNotion {
    pub async fn start(rows: &[&str]) -> Self {
        let state = Arc::new(NotionState {
            rows: Mutex::new(rows.iter().map(|r| r.to_string()).collect()),
            created: Mutex::default(),
        });
        let app = Router::new()
            .route("/v1/databases/:id/query", post(query))
            .route("/v1/pages", post(create_page))
            .with_state(Arc::clone(&state));
        let addr = serve(app).await;

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn rows(&self) -> Vec<String> {
        self.state.rows.lock().unwrap().clone()
    }

    /// Request bodies of every page created so far.
    pub fn created(&self) -> Vec<Value> {
        self.state.created.lock().unwrap().clone()
    }
}

fn authorized(headers: &HeaderMap) -> Result<(), Response> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    let versioned = headers.contains_key("notion-version");

    if bearer == Some(TOKEN) && versioned {
        return Ok(());
    }
    Err((
        StatusCode::UNAUTHORIZED,
        Json(json!({ "object": "error", "code": "unauthorized", "message": "API token is invalid." })),
    )
        .into_response())
}

async fn query(State(state): State<Arc<NotionState>>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(denied) = authorized(&headers) {
        return denied;
    }

    let rows = state.rows.lock().unwrap().clone();
    let start: usize = body["start_cursor"]
        .as_str()
        .and_then(|c| c.parse().ok())
        .unwrap_or(0);

    let results: Vec<Value> = rows
        .get(start..(start + 1).min(rows.len()))
        .unwrap_or_default()
        .iter()
        .map(|title| {
            json!({
                "object": "page",
                "properties": {
                    "Cameras": { "type": "number", "number": 1 },
                    "Name": { "type": "title", "title": [{ "plain_text": title }] },
                }
            })
        })
        .collect();

    let has_more = start + 1 < rows.len();
    Json(json!({
        "object": "list",
        "results": results,
        "has_more": has_more,
        "next_cursor": has_more.then(|| (start + 1).to_string()),
    }))
    .into_response()
}

async fn create_page(State(state): State<Arc<NotionState>>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(denied) = authorized(&headers) {
        return denied;
    }

    if body["parent"]["database_id"] != DATABASE_ID {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "object": "error", "message": "Could not find database." })),
        )
            .into_response();
    }

    let title = body["properties"]["Name"]["title"][0]["text"]["content"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    state.rows.lock().unwrap().push(title);
    state.created.lock().unwrap().push(body);

    Json(json!({ "object": "page", "id": "f00d" })).into_response()
}
