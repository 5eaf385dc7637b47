//! Fetch collaborator: turns a URL into raw page bytes.
//!
//! The orchestrator only depends on the [`Fetcher`] trait. [`HttpFetcher`]
//! is the `reqwest`-backed implementation; tests inject canned pages.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use std::error::Error as _;
use std::time::Duration;
use url::Url;

use crate::config::Config;
use crate::error::FetchError;

/// Browser-like agent; several code hosts serve reduced pages to unknown clients.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const ACCEPT_VALUE: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,application/json;q=0.9,text/plain;q=0.8,*/*;q=0.5";

const RAW_GITHUB_HOST: &str = "raw.githubusercontent.com";

/// A successfully fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// URL after redirects.
    pub final_url: String,
    pub status: u16,
    /// Declared `Content-Type`, or `""` when absent.
    pub content_type: String,
    pub body: Vec<u8>,
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url`. Status codes of 400 and above are errors.
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str, max_redirects: usize) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(user_agent)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(max_redirects))
            .build()
            .map_err(|e| FetchError::Request(error_chain(&e)))?;

        Ok(Self { client })
    }

    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Self::new(
            Duration::from_secs(config.timeout_secs),
            &config.user_agent,
            config.max_redirects,
        )
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self.client.get(url).send().await.map_err(classify)?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(http_status(status));
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.bytes().await.map_err(classify)?.to_vec();

        Ok(FetchedPage {
            final_url,
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

fn http_status(status: StatusCode) -> FetchError {
    FetchError::HttpStatus {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
    }
}

fn classify(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::Timeout;
    }
    if let Some(status) = err.status() {
        return http_status(status);
    }

    let detail = error_chain(&err);
    let lower = detail.to_ascii_lowercase();
    if ["certificate", "tls", "ssl", "handshake"].iter().any(|m| lower.contains(m)) {
        FetchError::Tls(detail)
    } else if err.is_connect() {
        FetchError::Connection(detail)
    } else {
        FetchError::Request(detail)
    }
}

/// Renders an error and all of its sources as `outer: inner: ...`.
fn error_chain(err: &reqwest::Error) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        parts.push(cause.to_string());
        source = cause.source();
    }
    parts.join(": ")
}

/// Maps a GitHub blob URL onto its raw-content equivalent.
///
/// `https://github.com/{owner}/{repo}/blob/{ref}/{path}` becomes
/// `https://raw.githubusercontent.com/{owner}/{repo}/{ref}/{path}`. Returns
/// `None` for anything else. Query strings and fragments are dropped.
pub fn rewrite_github_blob(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    if !matches!(parsed.host_str()?, "github.com" | "www.github.com") {
        return None;
    }

    let segments: Vec<&str> = parsed.path_segments()?.collect();
    let [owner, repo, "blob", reference, path @ ..] = segments.as_slice() else {
        return None;
    };
    if owner.is_empty() || repo.is_empty() || reference.is_empty() {
        return None;
    }
    if path.is_empty() || path.iter().all(|s| s.is_empty()) {
        return None;
    }

    Some(format!(
        "https://{}/{}/{}/{}/{}",
        RAW_GITHUB_HOST,
        owner,
        repo,
        reference,
        path.join("/")
    ))
}
