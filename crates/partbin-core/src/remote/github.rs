//! GitHub Contents API client
//!
//! Stores one document as a file in a repository:
//!
//! - `GET  /repos/{repo}/contents/{path}` returns `{ content, sha }` with
//!   base64 content
//! - `PUT  /repos/{repo}/contents/{path}` with `{ message, content, sha? }`
//!   commits a new revision; `sha` is the optimistic-concurrency token and
//!   is omitted when creating the file

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::{RemoteDocument, RemoteError, RemoteResult, RemoteStore, VersionToken};
use crate::codec;
use crate::credentials::Credentials;

const ACCEPT_V3: &str = "application/vnd.github.v3+json";
const CLIENT_USER_AGENT: &str = concat!("partbin/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    sha: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Debug, Serialize)]
struct PutRequest<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct PutResponse {
    content: PutContent,
}

#[derive(Debug, Deserialize)]
struct PutContent {
    sha: String,
}

/// Asynchronous client for a single repository
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    credentials: Credentials,
}

impl GitHubClient {
    /// Build a client for `credentials.repository`.
    ///
    /// `timeout` bounds each request end to end.
    pub fn new(
        api_url: impl Into<String>,
        credentials: &Credentials,
        timeout: Duration,
    ) -> RemoteResult<Self> {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_V3));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Network(format!("failed to build HTTP client: {}", e)))?;
        debug!(api_url = %api_url, repository = %credentials.repository, "created GitHubClient");
        Ok(Self {
            http,
            api_url,
            credentials: credentials.clone(),
        })
    }

    /// URL of the contents endpoint for `path`
    pub fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/contents/{}",
            self.api_url,
            self.credentials.repository.trim_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn authorization(&self) -> String {
        format!("token {}", self.credentials.token)
    }
}

#[async_trait]
impl RemoteStore for GitHubClient {
    #[instrument(skip(self))]
    async fn fetch(&self, path: &str) -> RemoteResult<RemoteDocument> {
        let resp = self
            .http
            .get(self.contents_url(path))
            .header(AUTHORIZATION, self.authorization())
            .send()
            .await
            .map_err(transport_error)?;
        check_response(&resp)?;

        let body: ContentsResponse = resp.json().await.map_err(transport_error)?;
        if let Some(encoding) = body.encoding.as_deref() {
            if encoding != "base64" {
                return Err(RemoteError::Decode(format!(
                    "unsupported content encoding '{}' (file may be too large for the contents API)",
                    encoding
                )));
            }
        }
        let content = codec::from_base64(body.content.as_deref().unwrap_or(""))
            .map_err(|e| RemoteError::Decode(e.to_string()))?;

        debug!(sha = %body.sha, bytes = content.len(), "fetched document");
        Ok(RemoteDocument {
            content,
            version: VersionToken::new(body.sha),
        })
    }

    #[instrument(skip(self, content, message), fields(bytes = content.len()))]
    async fn put(
        &self,
        path: &str,
        content: &[u8],
        expected: Option<&VersionToken>,
        message: &str,
    ) -> RemoteResult<VersionToken> {
        let body = PutRequest {
            message,
            content: codec::to_base64(content),
            sha: expected.map(VersionToken::as_str),
        };
        let resp = self
            .http
            .put(self.contents_url(path))
            .header(AUTHORIZATION, self.authorization())
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        check_response(&resp)?;

        let created = resp.status() == StatusCode::CREATED;
        let body: PutResponse = resp.json().await.map_err(transport_error)?;
        info!(sha = %body.content.sha, created, "committed document");
        Ok(VersionToken::new(body.content.sha))
    }
}

fn check_response(resp: &reqwest::Response) -> RemoteResult<()> {
    match classify_status(resp.status(), resp.headers()) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Map an HTTP status to a failure category; `None` for success
fn classify_status(status: StatusCode, headers: &HeaderMap) -> Option<RemoteError> {
    if status.is_success() {
        return None;
    }
    let err = match status.as_u16() {
        404 => RemoteError::NotFound,
        401 => RemoteError::Auth(format!("HTTP {}", status)),
        403 | 429 => {
            let reset = headers
                .get("x-ratelimit-reset")
                .and_then(|v| v.to_str().ok());
            match reset {
                Some(reset) => RemoteError::RateLimited(format!("HTTP {}, resets at {}", status, reset)),
                None => RemoteError::RateLimited(format!("HTTP {}", status)),
            }
        }
        409 | 422 => RemoteError::Conflict(format!("HTTP {}", status)),
        _ => RemoteError::Network(format!("unexpected HTTP {}", status)),
    };
    Some(err)
}

fn transport_error(error: reqwest::Error) -> RemoteError {
    if error.is_decode() {
        RemoteError::Decode(error.to_string())
    } else if error.is_timeout() {
        RemoteError::Network(format!("request timed out: {}", error))
    } else {
        RemoteError::Network(error.to_string())
    }
}
