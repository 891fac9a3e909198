//! # Device HTTP Transport
//!
//! Thin wrapper around [`reqwest::Client`] configured for embedded devices:
//! certificate verification is disabled (devices ship self-signed
//! certificates), every request carries its own timeout, and authenticated
//! requests use HTTP digest authentication.

use std::time::Duration;

use camaudit_common::models::device::Credential;
use reqwest::header::{AUTHORIZATION, HeaderMap, WWW_AUTHENTICATE};
use reqwest::{Client, StatusCode, Url};
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("invalid url '{0}'")]
    InvalidUrl(String),
    #[error("bad digest challenge: {0}")]
    Digest(String),
    #[error("failed to build http client: {0}")]
    Builder(#[source] reqwest::Error),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Request(err)
        }
    }
}

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceResponse {
    pub status: u16,
    pub body: String,
}

impl DeviceResponse {
    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK.as_u16()
    }
}

#[derive(Debug, Clone)]
pub struct DeviceClient {
    client: Client,
}

impl DeviceClient {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .danger_accept_invalid_certs(true)
            .user_agent(concat!("camaudit/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(TransportError::Builder)?;

        Ok(Self { client })
    }

    /// Plain unauthenticated GET.
    pub async fn get(&self, url: &str) -> Result<DeviceResponse, TransportError> {
        let url = parse_url(url)?;
        let response = self.client.get(url).send().await?;
        read(response).await
    }

    /// GET with digest authentication.
    ///
    /// The first request collects the challenge; if the device answers it
    /// with anything but a digest challenge, that response is returned as-is.
    pub async fn get_digest(
        &self,
        url: &str,
        credential: &Credential,
    ) -> Result<DeviceResponse, TransportError> {
        let url = parse_url(url)?;
        let challenge = self.client.get(url.clone()).send().await?;

        if challenge.status() != StatusCode::UNAUTHORIZED {
            return read(challenge).await;
        }

        let Some(prompt) = digest_challenge(challenge.headers()) else {
            trace!(url = %url, "no digest challenge offered");
            return read(challenge).await;
        };

        let authorization = answer_challenge(&prompt, &url, credential)?;

        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, authorization)
            .send()
            .await?;

        read(response).await
    }
}

fn parse_url(url: &str) -> Result<Url, TransportError> {
    Url::parse(url).map_err(|_| TransportError::InvalidUrl(url.to_string()))
}

async fn read(response: reqwest::Response) -> Result<DeviceResponse, TransportError> {
    let status = response.status().as_u16();
    let body = response.text().await?;
    Ok(DeviceResponse { status, body })
}

/// First `WWW-Authenticate` value offering the digest scheme.
fn digest_challenge(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(WWW_AUTHENTICATE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| {
            value
                .trim_start()
                .get(..6)
                .is_some_and(|scheme| scheme.eq_ignore_ascii_case("digest"))
        })
        .map(str::to_string)
}

fn answer_challenge(
    challenge: &str,
    url: &Url,
    credential: &Credential,
) -> Result<String, TransportError> {
    let mut prompt =
        digest_auth::parse(challenge).map_err(|e| TransportError::Digest(e.to_string()))?;

    let uri = match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    };

    let context = digest_auth::AuthContext::new(
        credential.username.as_str(),
        credential.password.as_str(),
        uri.as_str(),
    );

    let answer = prompt
        .respond(&context)
        .map_err(|e| TransportError::Digest(e.to_string()))?;

    Ok(answer.to_header_string())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
