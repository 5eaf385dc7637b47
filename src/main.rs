use anyhow::{Context, Result};
use clap::Parser;
use depscan::{
    config::Config,
    logging::init_tracing,
    output::{format_reports_to_string, print_reports, write_csv, OutputFormat},
    scan::{CancelSignal, Scanner},
    Catalog, ScanReport,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;

/// Exit codes for the process boundary. A scan whose report carries an
/// `error` still exits with `SUCCESS`.
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
    pub const INTERRUPTED: u8 = 130;
}

#[derive(Parser)]
#[command(name = "depscan")]
#[command(
    author,
    version,
    about = "Extract declared dependencies from manifests and documentation pages"
)]
struct Cli {
    /// URLs to scan (defaults to the configured default_url)
    urls: Vec<String>,

    /// Output format (json, table, csv)
    #[arg(short, long)]
    format: Option<String>,

    /// Write output to file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Also save the dependencies as CSV
    #[arg(long, value_name = "FILE")]
    csv: Option<PathBuf>,

    /// Fetch timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Scan a local file instead of fetching; the first URL, if any, labels the report
    #[arg(long, value_name = "FILE")]
    content: Option<PathBuf>,

    /// Content type of --content (sniffed when omitted)
    #[arg(long, requires = "content")]
    content_type: Option<String>,

    /// Append logs to this file
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,

    /// Generate default config file
    #[arg(long)]
    init_config: bool,

    /// Show config file path
    #[arg(long)]
    config_path: bool,

    /// List the built-in extraction rules
    #[arg(long)]
    list_rules: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

async fn run() -> Result<u8> {
    let cli = Cli::parse();
    let mut config = Config::load().unwrap_or_default();

    if cli.config_path || cli.init_config {
        handle_config(cli.init_config, cli.config_path)?;
        return Ok(exit_codes::SUCCESS);
    }
    if cli.list_rules {
        list_rules();
        return Ok(exit_codes::SUCCESS);
    }

    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }
    let log_file = cli.log_file.clone().or_else(|| config.log_file.clone());
    init_tracing(log_file.as_deref(), cli.verbose)?;

    let format_str = cli.format.clone().unwrap_or(config.default_format.clone());
    let format = OutputFormat::from_str(&format_str).map_err(|e| anyhow::anyhow!(e))?;
    let is_interactive = format == OutputFormat::Table;

    let scanner = Scanner::from_config(&config).context("failed to set up HTTP client")?;

    let (reports, interrupted) = match &cli.content {
        Some(path) => {
            let raw = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
            let label = cli
                .urls
                .first()
                .cloned()
                .unwrap_or_else(|| path.display().to_string());
            let content_type = cli.content_type.as_deref().unwrap_or_default();
            (vec![scanner.scan_content(&label, &raw, content_type)], false)
        }
        None => {
            let urls = if cli.urls.is_empty() {
                vec![config.default_url.clone()]
            } else {
                cli.urls.clone()
            };
            scan_urls(&scanner, &urls, is_interactive).await
        }
    };

    // Handle output
    if let Some(path) = &cli.output {
        let text = format_reports_to_string(&reports, format)?;
        std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
        if is_interactive {
            println!("Results written to: {}", path.display());
        }
    } else {
        print_reports(&reports, format)?;
    }

    if let Some(path) = &cli.csv {
        write_csv(path, &reports)?;
        if is_interactive {
            println!("CSV written to: {}", path.display());
        }
    }

    if interrupted {
        Ok(exit_codes::INTERRUPTED)
    } else {
        Ok(exit_codes::SUCCESS)
    }
}

/// Scans `urls` concurrently. Ctrl-C cancels the in-flight fetches; their
/// reports are still returned, marked cancelled.
async fn scan_urls(scanner: &Scanner, urls: &[String], is_interactive: bool) -> (Vec<ScanReport>, bool) {
    let progress = if is_interactive {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .expect("spinner template is valid"),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("Scanning {} URL(s)...", urls.len()));
        Some(pb)
    } else {
        None
    };

    let (cancel, signal) = CancelSignal::channel();
    let scans = scanner.scan_all(urls, signal);
    tokio::pin!(scans);

    let (reports, interrupted) = tokio::select! {
        reports = &mut scans => (reports, false),
        _ = tokio::signal::ctrl_c() => {
            cancel.cancel();
            (scans.await, true)
        }
    };

    if let Some(pb) = progress {
        let total: usize = reports.iter().map(|r| r.summary.total).sum();
        pb.finish_with_message(format!("Found {} dependencies", total));
    }

    (reports, interrupted)
}

fn list_rules() {
    println!("Built-in extraction rules:");
    println!();

    let catalog = Catalog::builtin();
    for rule in catalog.rules() {
        println!("  {:<24} {:<10} {:?}", rule.id, rule.kind.display_name(), rule.capture);
    }
}

fn handle_config(init: bool, show_path: bool) -> Result<()> {
    let config_path = Config::config_path();

    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
            return Ok(());
        }

        let config = Config::default();
        config.save()?;
        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Default configuration:");
        println!("{}", Config::generate_default_config());
    }

    Ok(())
}
