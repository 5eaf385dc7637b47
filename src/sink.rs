//! Diagnostic side channel for scans.
//!
//! A [`Scanner`](crate::Scanner) reports significant events to an injected
//! [`LogSink`] instead of writing to global state. The binary uses
//! [`TracingSink`], which forwards to the `tracing` subscriber installed in
//! `main`; tests use [`MemorySink`] to capture lines in memory.

use chrono::{SecondsFormat, Utc};
use std::fmt;
use std::sync::Mutex;

use crate::error::{FetchError, ParseError, RuleError};
use crate::model::ContentClass;

/// Something worth a log line during a scan.
#[derive(Debug, Clone, Copy)]
pub enum ScanEvent<'a> {
    FetchAttempted { url: &'a str },
    UrlRewritten { from: &'a str, to: &'a str },
    FetchFailed { url: &'a str, error: &'a FetchError },
    ParseFallback { from: ContentClass, to: ContentClass, reason: &'a ParseError },
    RuleSkipped { fault: &'a RuleError },
    StrategyFinished { strategy: &'static str, found: usize },
    ScanFinished { url: &'a str, total: usize },
}

impl fmt::Display for ScanEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanEvent::FetchAttempted { url } => write!(f, "fetch attempted: {}", url),
            ScanEvent::UrlRewritten { from, to } => write!(f, "url rewritten: {} → {}", from, to),
            ScanEvent::FetchFailed { error, .. } => write!(f, "fetch failed: {}", error.kind()),
            ScanEvent::ParseFallback { from, to, .. } => {
                write!(f, "parse fallback: {}→{}", from.as_str(), to.as_str())
            }
            ScanEvent::RuleSkipped { fault } => write!(f, "rule skipped: {}", fault.rule_id()),
            ScanEvent::StrategyFinished { strategy, found } => {
                write!(f, "strategy finished: {} ({} found)", strategy, found)
            }
            ScanEvent::ScanFinished { url, total } => {
                write!(f, "scan finished: {} ({} dependencies)", url, total)
            }
        }
    }
}

/// Receives scan events. Implementations must tolerate concurrent calls
/// from independent scans and write each event as one whole line.
pub trait LogSink: Send + Sync {
    fn record(&self, event: &ScanEvent<'_>);
}

/// Forwards events to `tracing` with structured fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn record(&self, event: &ScanEvent<'_>) {
        match *event {
            ScanEvent::FetchAttempted { url } => tracing::info!(url, "fetch attempted"),
            ScanEvent::UrlRewritten { from, to } => tracing::debug!(from, to, "url rewritten"),
            ScanEvent::FetchFailed { url, error } => {
                tracing::warn!(url, kind = error.kind(), error = %error, "fetch failed")
            }
            ScanEvent::ParseFallback { from, to, reason } => tracing::debug!(
                from = from.as_str(),
                to = to.as_str(),
                reason = reason.kind(),
                "parse fallback"
            ),
            ScanEvent::RuleSkipped { fault } => {
                tracing::warn!(rule = fault.rule_id(), error = %fault, "rule skipped")
            }
            ScanEvent::StrategyFinished { strategy, found } => {
                tracing::debug!(strategy, found, "strategy finished")
            }
            ScanEvent::ScanFinished { url, total } => tracing::info!(url, total, "scan finished"),
        }
    }
}

/// Keeps timestamped event lines in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded lines, `<RFC 3339 timestamp> <event>`.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Recorded lines without their timestamps.
    pub fn messages(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .map(|line| match line.split_once(' ') {
                Some((_, message)) => message.to_string(),
                None => line,
            })
            .collect()
    }
}

impl LogSink for MemorySink {
    fn record(&self, event: &ScanEvent<'_>) {
        let line = format!(
            "{} {}",
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            event
        );
        self.lines.lock().unwrap_or_else(|e| e.into_inner()).push(line);
    }
}
