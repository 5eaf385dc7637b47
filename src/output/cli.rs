use crate::model::{ManagerType, ScanReport};
use anyhow::Result;
use chrono::{DateTime, Utc};
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct DependencyRow {
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Source")]
    source: String,
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Count")]
    count: usize,
}

pub fn print_cli_table(reports: &[ScanReport]) -> Result<()> {
    print!("{}", render_reports(reports, Utc::now()));
    Ok(())
}

fn render_reports(reports: &[ScanReport], scanned_at: DateTime<Utc>) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str(&format!(
        "Scan completed at: {}\n",
        scanned_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    for report in reports {
        out.push('\n');
        out.push_str(&render_report(report));
    }
    out
}

fn render_report(report: &ScanReport) -> String {
    let mut out = format!("URL: {}\n\n", report.url);

    if let Some(error) = &report.error {
        out.push_str(&format!("Scan failed: {}\n", error));
        return out;
    }

    if report.dependencies.is_empty() {
        out.push_str("No dependencies found.\n");
        return out;
    }

    out.push_str(&format!("Found {} dependencies:\n\n", report.summary.total));

    let rows: Vec<DependencyRow> = report
        .dependencies
        .iter()
        .map(|d| DependencyRow {
            kind: d.kind.display_name().to_string(),
            name: truncate(&d.name, 50),
            version: format_version(&d.version),
            source: truncate(&d.source_line, 60),
        })
        .collect();
    out.push_str(&Table::new(rows).with(Style::rounded()).to_string());
    out.push_str("\n\n");

    let summary: Vec<SummaryRow> = report
        .summary
        .by_type
        .iter()
        .map(|(kind, count)| SummaryRow {
            kind: kind.display_name().to_string(),
            count: *count,
        })
        .collect();
    out.push_str(&Table::new(summary).with(Style::rounded()).to_string());
    out.push('\n');

    out.push_str(&format!("\n{}\n", summary_line(report)));
    out
}

/// `3 dependencies (npm: 2, pip: 1)`
fn summary_line(report: &ScanReport) -> String {
    let parts: Vec<String> = ManagerType::ALL
        .iter()
        .filter_map(|kind| {
            report
                .summary
                .by_type
                .get(kind)
                .map(|count| format!("{}: {}", kind, count))
        })
        .collect();
    format!("{} dependencies ({})", report.summary.total, parts.join(", "))
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

fn format_version(version: &str) -> String {
    if version.is_empty() {
        "-".to_string()
    } else {
        version.to_string()
    }
}
