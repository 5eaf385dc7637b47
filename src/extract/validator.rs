//! Plausibility checks for candidate package names and versions.
//!
//! Both checks are total and deterministic. They are the main defense against
//! prose words, paths and shell noise being reported as dependencies.

use regex::Regex;
use std::sync::LazyLock;

use crate::model::ManagerType;

/// npm's own ceiling on package name length.
pub const MAX_NAME_LEN: usize = 214;

const MAX_VERSION_LEN: usize = 128;

/// Command verbs, installer names and prose that show up next to install
/// commands. Words that are also common package names stay out.
const STOPWORDS: &[&str] = &[
    "a", "activate", "add", "an", "and", "apt", "apt-get", "are", "brew", "composer", "conda",
    "for", "from", "gem", "if", "in", "install", "is", "it", "mamba", "npm", "npx", "of", "on",
    "or", "package", "packages", "pip", "pip3", "please", "pnpm", "python", "python3", "sudo",
    "the", "then", "this", "to", "uninstall", "using", "with", "yarn", "you", "your", "yum",
];

/// File suffixes that mark a token as a file argument rather than a package.
const FILE_SUFFIXES: &[&str] = &[
    ".txt", ".cfg", ".toml", ".lock", ".whl", ".tar.gz", ".tgz", ".zip", ".yml", ".yaml",
    ".ini", ".sh", ".egg",
];

static NPM_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)(@[a-z0-9~][a-z0-9._~-]*/)?[a-z0-9~][a-z0-9._~-]*$")
        .expect("npm name regex is valid")
});

static PYPI_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9._-]*[A-Za-z0-9])?$").expect("pypi name regex is valid")
});

static JVM_COORDINATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.-]*:[A-Za-z0-9_][A-Za-z0-9_.-]*$")
        .expect("coordinate regex is valid")
});

static GO_MODULE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._~-]*(/[A-Za-z0-9._~-]+)*$").expect("go module regex is valid")
});

static GEM_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("gem name regex is valid")
});

static COMPOSER_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*(/[A-Za-z0-9][A-Za-z0-9_.-]*)?$")
        .expect("composer name regex is valid")
});

static VERSION_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    let atom = r"[=<>!~^]{0,3}\s*[vV]?\d[0-9A-Za-z.+*_-]*";
    Regex::new(&format!(r"^{atom}(\s*(,|\|\|?|\s)\s*{atom})*$")).expect("version regex is valid")
});

/// Non-numeric version strings managers accept as-is.
const VERSION_TAGS: &[&str] = &["*", "x", "latest", "next", "beta", "canary", "stable", "dev-master", "dev-main"];

/// Returns true when `candidate` is a plausible package identifier for `kind`.
pub fn is_valid_name(candidate: &str, kind: ManagerType) -> bool {
    let len = candidate.chars().count();
    if !(2..=MAX_NAME_LEN).contains(&len) {
        return false;
    }
    if candidate.chars().any(char::is_whitespace) || candidate.contains("://") {
        return false;
    }
    if candidate.starts_with(['-', '$', '.', '/', '~']) || candidate.contains('\\') {
        return false;
    }
    // Bare numbers are orphaned versions.
    if candidate.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return false;
    }

    let lower = candidate.to_ascii_lowercase();
    if STOPWORDS.contains(&lower.as_str()) || lower.starts_with("www.") {
        return false;
    }
    if FILE_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix)) {
        return false;
    }

    match kind {
        ManagerType::Npm => NPM_NAME.is_match(candidate),
        ManagerType::Pip => PYPI_NAME.is_match(candidate),
        ManagerType::Maven | ManagerType::Gradle => JVM_COORDINATE.is_match(candidate),
        ManagerType::Go => GO_MODULE.is_match(candidate) && !candidate.ends_with('/'),
        ManagerType::Ruby => GEM_NAME.is_match(candidate),
        ManagerType::Composer => COMPOSER_NAME.is_match(candidate),
    }
}

/// Returns true when `candidate` looks like a version or version constraint.
///
/// Accepts semver requirements, numeric versions with operators and ranges
/// (`>=1.0, <2`, `~> 2.1`, `^8.1 || ^8.2`), and the common dist tags.
pub fn is_valid_version(candidate: &str) -> bool {
    let candidate = candidate.trim();
    if candidate.is_empty() || candidate.len() > MAX_VERSION_LEN || candidate.contains(['\n', '\r']) {
        return false;
    }
    if candidate.contains("://") {
        return false;
    }
    if VERSION_TAGS.contains(&candidate.to_ascii_lowercase().as_str()) {
        return true;
    }
    VERSION_SHAPE.is_match(candidate) || semver::VersionReq::parse(candidate).is_ok()
}
