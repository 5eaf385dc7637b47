//! Configuration file handling.
//!
//! Settings are read from a TOML file. Command-line flags override them.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/depscan/config.toml`
//! - macOS: `~/Library/Application Support/depscan/config.toml`
//! - Windows: `%APPDATA%\depscan\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! timeout_secs = 30
//! default_format = "json"
//! max_redirects = 10
//! log_file = "/var/log/depscan.log"
//!
//! [ignore]
//! packages = ["install", "@types/*"]
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::fetch::DEFAULT_USER_AGENT;

/// URL scanned when none is given on the command line.
pub const DEFAULT_URL: &str = "https://github.com/expressjs/express/blob/master/package.json";

/// Application configuration.
///
/// # Example
///
/// ```no_run
/// use depscan::Config;
///
/// // Load from file (or use defaults if file doesn't exist)
/// let config = Config::load().unwrap();
///
/// println!("Timeout: {}s", config.timeout_secs);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fetch timeout in seconds.
    ///
    /// Default: 30
    pub timeout_secs: u64,

    /// URL scanned when no URL argument is given.
    pub default_url: String,

    /// Default output format when no `--format` flag is provided.
    ///
    /// Valid values: "json", "table", "csv"
    /// Default: "json"
    pub default_format: String,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,

    /// Redirects followed before a fetch fails.
    ///
    /// Default: 10
    pub max_redirects: usize,

    /// Append diagnostics to this file in addition to stderr.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,

    /// Ignore list for suppressing known false positives.
    #[serde(default)]
    pub ignore: IgnoreConfig,
}

/// Dependency names that never appear in reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreConfig {
    /// Package names to drop from results.
    ///
    /// Supports glob patterns (e.g., "lodash*", "@types/*").
    pub packages: Vec<String>,
}

impl IgnoreConfig {
    /// Check if a package should be ignored.
    pub fn should_ignore_package(&self, name: &str) -> bool {
        self.packages.iter().any(|pattern| {
            if pattern.contains('*') {
                glob_match(pattern, name)
            } else {
                pattern == name
            }
        })
    }
}

/// Simple glob matching (supports * as wildcard).
fn glob_match(pattern: &str, text: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();

    if parts.len() == 1 {
        return pattern == text;
    }

    let mut remaining = text;

    // Check prefix (before first *)
    if !parts[0].is_empty() {
        if !remaining.starts_with(parts[0]) {
            return false;
        }
        remaining = &remaining[parts[0].len()..];
    }

    // Check suffix (after last *)
    let last_part = parts[parts.len() - 1];
    if !last_part.is_empty() {
        if !remaining.ends_with(last_part) {
            return false;
        }
        remaining = &remaining[..remaining.len() - last_part.len()];
    }

    for part in &parts[1..parts.len() - 1] {
        if part.is_empty() {
            continue;
        }
        if let Some(pos) = remaining.find(part) {
            remaining = &remaining[pos + part.len()..];
        } else {
            return false;
        }
    }

    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            default_url: DEFAULT_URL.to_string(),
            default_format: "json".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_redirects: 10,
            log_file: None,
            ignore: IgnoreConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from the config file.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from `path`, falling back to defaults when absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Saves the configuration to the config file.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    /// Returns the path to the configuration file.
    ///
    /// # Example
    ///
    /// ```
    /// use depscan::Config;
    ///
    /// let path = Config::config_path();
    /// assert!(path.ends_with("depscan/config.toml"));
    /// ```
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("depscan")
            .join("config.toml")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Generates a string containing the default configuration.
    pub fn generate_default_config() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}
