use serde::{Deserialize, Serialize};

/// Longest `sourceLine` kept on a dependency, in characters.
pub const MAX_SOURCE_LINE: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManagerType {
    Npm,
    Pip,
    Maven,
    Gradle,
    Go,
    Ruby,
    Composer,
}

impl ManagerType {
    pub const ALL: [ManagerType; 7] = [
        ManagerType::Npm,
        ManagerType::Pip,
        ManagerType::Maven,
        ManagerType::Gradle,
        ManagerType::Go,
        ManagerType::Ruby,
        ManagerType::Composer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ManagerType::Npm => "npm",
            ManagerType::Pip => "pip",
            ManagerType::Maven => "maven",
            ManagerType::Gradle => "gradle",
            ManagerType::Go => "go",
            ManagerType::Ruby => "ruby",
            ManagerType::Composer => "composer",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ManagerType::Npm => "NPM",
            ManagerType::Pip => "PyPI",
            ManagerType::Maven => "Maven",
            ManagerType::Gradle => "Gradle",
            ManagerType::Go => "Go",
            ManagerType::Ruby => "RubyGems",
            ManagerType::Composer => "Composer",
        }
    }
}

impl std::fmt::Display for ManagerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A dependency declaration found in scanned content.
///
/// `version` is empty when the declaration carries no version. Two
/// dependencies with the same `(name, type)` are duplicates whatever their
/// versions; see [`Dependency::key`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub name: String,
    pub version: String,
    #[serde(rename = "type")]
    pub kind: ManagerType,
    pub source_line: String,
}

impl Dependency {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        kind: ManagerType,
        source_line: impl AsRef<str>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            kind,
            source_line: clip(source_line.as_ref().trim(), MAX_SOURCE_LINE),
        }
    }

    /// Identity used for deduplication.
    pub fn key(&self) -> (&str, ManagerType) {
        (&self.name, self.kind)
    }
}

/// Truncates to at most `max` characters without splitting a code point.
pub(crate) fn clip(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
