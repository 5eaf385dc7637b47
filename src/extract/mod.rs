//! Dependency extraction from fetched text.
//!
//! Everything in this module is synchronous and side-effect free apart from
//! `tracing` diagnostics:
//!
//! - [`validator`] decides whether a candidate name or version is plausible.
//! - [`command`] tokenizes install commands (`pip install ...`, `npm i ...`).
//! - [`structured`] reads JSON manifests.
//! - [`markup`] reduces HTML pages to prioritized text segments.
//! - [`catalog`] holds the per-manager regex rules that tie the above together.
//!
//! # Example
//!
//! ```
//! use depscan::extract::{extract_packages_from_command, Catalog};
//! use depscan::ManagerType;
//!
//! let deps = extract_packages_from_command("pip install numpy==1.2 scipy", ManagerType::Pip);
//! assert_eq!(deps.len(), 2);
//!
//! let found = Catalog::builtin().extract("npm install --save express");
//! assert_eq!(found[0].name, "express");
//! ```

pub mod catalog;
pub mod command;
pub mod markup;
pub mod structured;
pub mod validator;

pub use catalog::{Capture, Catalog, ExtractionRule, RuleSpec, VersionPolicy, BUILTIN_RULES};
pub use command::{extract_packages_from_command, join_continuations, logical_line};
pub use markup::{extract_text_segments, reduce_html, Segment, SourceHint};
pub use structured::parse_json_dependencies;
pub use validator::{is_valid_name, is_valid_version};
