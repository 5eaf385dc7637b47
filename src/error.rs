//! Error taxonomy for a scan.
//!
//! Only [`FetchError`] and [`ValidationError`] on the scan input end a scan;
//! they surface through [`ScanError`] into `ScanReport.error`. [`ParseError`]
//! and [`RuleError`] are always recovered where they occur.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("HTTP status {status} {reason}")]
    HttpStatus { status: u16, reason: String },

    #[error("TLS handshake failed: {0}")]
    Tls(String),

    #[error("scan cancelled")]
    Cancelled,

    #[error("request failed: {0}")]
    Request(String),
}

impl FetchError {
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Timeout => "timeout",
            FetchError::Connection(_) => "connection",
            FetchError::HttpStatus { .. } => "http-status",
            FetchError::Tls(_) => "tls",
            FetchError::Cancelled => "cancelled",
            FetchError::Request(_) => "request",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("content is not JSON")]
    NotJson,

    #[error("JSON decode error: {0}")]
    JsonDecode(String),
}

impl ParseError {
    pub fn kind(&self) -> &'static str {
        match self {
            ParseError::NotJson => "not-json",
            ParseError::JsonDecode(_) => "decode-error",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RuleError {
    #[error("rule {id} has a faulty pattern: {reason}")]
    PatternFault { id: String, reason: String },
}

impl RuleError {
    pub fn rule_id(&self) -> &str {
        match self {
            RuleError::PatternFault { id, .. } => id,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid URL provided")]
    EmptyInput,
}

/// Errors that end a scan and are rendered into the report.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScanError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
