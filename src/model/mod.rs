//! Core data types for dependencies and scan reports.
//!
//! This module contains the fundamental types used throughout depscan:
//!
//! - [`Dependency`] - A declared dependency found in scanned content
//! - [`ManagerType`] - The package manager a dependency belongs to
//! - [`ContentClass`] - How a fetched body is classified before extraction
//! - [`ScanReport`] - The complete result of one scan
//!
//! # Example
//!
//! ```
//! use depscan::{Dependency, ManagerType, ScanReport};
//!
//! let dep = Dependency::new("express", "^4.18.0", ManagerType::Npm, r#""express": "^4.18.0""#);
//! let report = ScanReport::new("https://example.com/package.json", vec![dep]);
//!
//! assert_eq!(report.summary.total, 1);
//! ```

mod dependency;
mod report;

pub use dependency::*;
pub use report::*;
