mod cli;
mod csv;
mod json;

pub use cli::print_cli_table;
pub use csv::{reports_to_csv, write_csv};
pub use json::{print_json, reports_to_json};

use crate::model::ScanReport;
use anyhow::Result;

/// Output format for scan reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Indented JSON, the stable report schema
    Json,
    /// Human-readable table format
    Table,
    /// One row per dependency
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "table" => Ok(OutputFormat::Table),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use 'json', 'table', or 'csv'", s)),
        }
    }
}

/// Prints reports to stdout. A single report is printed as one JSON object,
/// several as a JSON array.
pub fn print_reports(reports: &[ScanReport], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(reports),
        OutputFormat::Table => print_cli_table(reports),
        OutputFormat::Csv => {
            print!("{}", reports_to_csv(reports));
            Ok(())
        }
    }
}

/// Format reports to string for file output. Table mode writes JSON.
pub fn format_reports_to_string(reports: &[ScanReport], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json | OutputFormat::Table => reports_to_json(reports),
        OutputFormat::Csv => Ok(reports_to_csv(reports)),
    }
}
