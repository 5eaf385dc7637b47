//! CSV export, one row per dependency.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::model::ScanReport;

const HEADER: &str = "name,version,type,source_url,line";

/// Renders `reports` with the columns `name,version,type,source_url,line`.
///
/// Failed reports contribute no rows.
pub fn reports_to_csv(reports: &[ScanReport]) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for report in reports {
        for dep in &report.dependencies {
            let row = [
                dep.name.as_str(),
                dep.version.as_str(),
                dep.kind.as_str(),
                report.url.as_str(),
                dep.source_line.as_str(),
            ];
            let fields: Vec<String> = row.iter().map(|field| escape(field)).collect();
            out.push_str(&fields.join(","));
            out.push('\n');
        }
    }
    out
}

pub fn write_csv(path: &Path, reports: &[ScanReport]) -> Result<()> {
    fs::write(path, reports_to_csv(reports))
        .with_context(|| format!("failed to write CSV to {}", path.display()))
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
