use serde::Serialize;
use std::collections::BTreeMap;

use super::{Dependency, ManagerType};

/// How a body is treated before extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentClass {
    Json,
    Html,
    PlainText,
}

impl ContentClass {
    /// Classifies a body from its declared content type and a structural sniff.
    ///
    /// A body whose first non-whitespace character is `{` or `[` is a JSON
    /// candidate whatever the header says. Otherwise the header decides, and
    /// an absent or generic header falls back to looking for an HTML prologue.
    pub fn classify(content_type: &str, body: &str) -> Self {
        let first = body.trim_start().chars().next();
        if matches!(first, Some('{') | Some('[')) {
            return ContentClass::Json;
        }

        let declared = content_type.to_ascii_lowercase();
        if declared.contains("json") {
            return ContentClass::Json;
        }
        if declared.contains("html") {
            return ContentClass::Html;
        }
        if declared.starts_with("text/") || declared.contains("xml") {
            return ContentClass::PlainText;
        }

        let head: String = body.trim_start().chars().take(256).collect::<String>().to_ascii_lowercase();
        if head.starts_with("<!doctype html") || head.starts_with("<html") || head.contains("<body") {
            ContentClass::Html
        } else {
            ContentClass::PlainText
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentClass::Json => "json",
            ContentClass::Html => "html",
            ContentClass::PlainText => "plain-text",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total: usize,
    pub by_type: BTreeMap<ManagerType, usize>,
}

impl Summary {
    pub fn from_dependencies(dependencies: &[Dependency]) -> Self {
        let mut by_type = BTreeMap::new();
        for dep in dependencies {
            *by_type.entry(dep.kind).or_insert(0) += 1;
        }
        Self {
            total: dependencies.len(),
            by_type,
        }
    }
}

/// Result of one scan. Always produced, never a fault.
///
/// On failure `error` is set, `dependencies` is empty and the summary is
/// zeroed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub dependencies: Vec<Dependency>,
    pub summary: Summary,
}

impl ScanReport {
    pub fn new(url: impl Into<String>, dependencies: Vec<Dependency>) -> Self {
        let summary = Summary::from_dependencies(&dependencies);
        Self {
            url: url.into(),
            error: None,
            dependencies,
            summary,
        }
    }

    pub fn failed(url: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self {
            url: url.into(),
            error: Some(error.to_string()),
            dependencies: Vec::new(),
            summary: Summary::default(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
