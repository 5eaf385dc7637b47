//! The extraction orchestrator.
//!
//! One scan walks `Fetching → Classifying → Extracting → Filtering → Done`,
//! or ends in `Errored` when the URL is empty, the fetch fails or the scan
//! is cancelled. Only the fetch suspends; everything after it is synchronous.
//!
//! Extraction is an ordered list of [`Strategy`] functions per
//! [`ContentClass`]. Each returns what it found and whether the list should
//! stop there:
//!
//! | Class | Strategies |
//! |-------|------------|
//! | JSON | `manifest`, then `plain-text` if the body does not decode |
//! | HTML | `markup-blocks`, then `markup-body` if no block yielded anything |
//! | Plain text | `plain-text` |

use futures::future::join_all;
use std::cell::OnceCell;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::watch;

use crate::config::{Config, IgnoreConfig};
use crate::error::{FetchError, ParseError, ScanError, ValidationError};
use crate::extract::{is_valid_name, parse_json_dependencies, reduce_html, Catalog, Segment, SourceHint};
use crate::fetch::{rewrite_github_blob, Fetcher, HttpFetcher};
use crate::model::{ContentClass, Dependency, ScanReport};
use crate::sink::{LogSink, ScanEvent, TracingSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Fetching,
    Classifying,
    Extracting,
    Filtering,
    Done,
    Errored,
}

impl ScanState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanState::Fetching => "fetching",
            ScanState::Classifying => "classifying",
            ScanState::Extracting => "extracting",
            ScanState::Filtering => "filtering",
            ScanState::Done => "done",
            ScanState::Errored => "errored",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ScanState::Done | ScanState::Errored)
    }

    /// Whether `next` is a legal successor. `Errored` is reachable from any
    /// non-terminal state.
    pub fn can_advance_to(&self, next: ScanState) -> bool {
        use ScanState::*;
        if next == Errored {
            return !self.is_terminal();
        }
        matches!(
            (self, next),
            (Fetching, Classifying) | (Classifying, Extracting) | (Extracting, Filtering) | (Filtering, Done)
        )
    }
}

/// State tracker for one scan.
struct Run<'a> {
    url: &'a str,
    state: ScanState,
}

impl<'a> Run<'a> {
    fn start(url: &'a str, state: ScanState) -> Self {
        tracing::trace!(url, state = state.as_str(), "scan started");
        Self { url, state }
    }

    fn advance(&mut self, next: ScanState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal scan transition {:?} -> {:?}",
            self.state,
            next
        );
        tracing::trace!(url = self.url, from = self.state.as_str(), to = next.as_str(), "scan state");
        self.state = next;
    }
}

/// Cooperative cancellation observed at the fetch suspension point.
#[derive(Debug, Clone)]
pub struct CancelSignal(Option<watch::Receiver<bool>>);

/// Triggers every [`CancelSignal`] cloned from its channel.
#[derive(Debug)]
pub struct CancelHandle(watch::Sender<bool>);

impl CancelSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        Self(None)
    }

    pub fn channel() -> (CancelHandle, CancelSignal) {
        let (tx, rx) = watch::channel(false);
        (CancelHandle(tx), CancelSignal(Some(rx)))
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Resolves once cancellation is requested; pends forever otherwise.
    async fn cancelled(&mut self) {
        if let Some(rx) = self.0.as_mut() {
            if rx.wait_for(|&cancelled| cancelled).await.is_ok() {
                return;
            }
        }
        std::future::pending::<()>().await
    }
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }
}

/// What a strategy found, and whether later strategies should be skipped.
#[derive(Debug, Default)]
pub struct StrategyOutcome {
    pub dependencies: Vec<Dependency>,
    pub exhausted: bool,
}

/// Shared input of every strategy for one body.
pub struct StrategyInput<'a> {
    pub text: &'a str,
    catalog: &'a Catalog,
    sink: &'a dyn LogSink,
    segments: OnceCell<Vec<Segment>>,
}

impl<'a> StrategyInput<'a> {
    pub fn new(text: &'a str, catalog: &'a Catalog, sink: &'a dyn LogSink) -> Self {
        Self {
            text,
            catalog,
            sink,
            segments: OnceCell::new(),
        }
    }

    /// Markup segments of the body, reduced on first use.
    fn segments(&self) -> &[Segment] {
        self.segments.get_or_init(|| reduce_html(self.text))
    }

    /// A segment may itself be a manifest; otherwise the catalog runs on it.
    fn segment_dependencies(&self, segment: &Segment) -> Vec<Dependency> {
        match parse_json_dependencies(&segment.text) {
            Ok(found) if !found.is_empty() => found,
            Ok(_) => self.catalog.extract(&segment.text),
            Err(err) => {
                if err != ParseError::NotJson {
                    self.sink.record(&ScanEvent::ParseFallback {
                        from: ContentClass::Json,
                        to: ContentClass::PlainText,
                        reason: &err,
                    });
                }
                self.catalog.extract(&segment.text)
            }
        }
    }
}

/// One named extraction approach.
#[derive(Clone, Copy)]
pub struct Strategy {
    pub name: &'static str,
    run: fn(&StrategyInput<'_>) -> StrategyOutcome,
}

impl Strategy {
    pub fn run(&self, input: &StrategyInput<'_>) -> StrategyOutcome {
        (self.run)(input)
    }
}

impl std::fmt::Debug for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Strategy").field("name", &self.name).finish()
    }
}

const MANIFEST: Strategy = Strategy { name: "manifest", run: manifest };
const PLAIN_TEXT: Strategy = Strategy { name: "plain-text", run: plain_text };
const MARKUP_BLOCKS: Strategy = Strategy { name: "markup-blocks", run: markup_blocks };
const MARKUP_BODY: Strategy = Strategy { name: "markup-body", run: markup_body };

/// Ordered strategies for a content class.
pub fn strategies_for(class: ContentClass) -> &'static [Strategy] {
    match class {
        ContentClass::Json => &[MANIFEST, PLAIN_TEXT],
        ContentClass::Html => &[MARKUP_BLOCKS, MARKUP_BODY],
        ContentClass::PlainText => &[PLAIN_TEXT],
    }
}

fn manifest(input: &StrategyInput<'_>) -> StrategyOutcome {
    match parse_json_dependencies(input.text) {
        Ok(dependencies) => StrategyOutcome {
            dependencies,
            exhausted: true,
        },
        Err(err) => {
            input.sink.record(&ScanEvent::ParseFallback {
                from: ContentClass::Json,
                to: ContentClass::PlainText,
                reason: &err,
            });
            StrategyOutcome::default()
        }
    }
}

fn plain_text(input: &StrategyInput<'_>) -> StrategyOutcome {
    StrategyOutcome {
        dependencies: input.catalog.extract(input.text),
        exhausted: true,
    }
}

fn markup_blocks(input: &StrategyInput<'_>) -> StrategyOutcome {
    let dependencies: Vec<Dependency> = input
        .segments()
        .iter()
        .filter(|segment| segment.source != SourceHint::Body)
        .flat_map(|segment| input.segment_dependencies(segment))
        .collect();
    let exhausted = !dependencies.is_empty();
    StrategyOutcome {
        dependencies,
        exhausted,
    }
}

fn markup_body(input: &StrategyInput<'_>) -> StrategyOutcome {
    let dependencies = input
        .segments()
        .iter()
        .filter(|segment| segment.source == SourceHint::Body)
        .flat_map(|segment| input.catalog.extract(&segment.text))
        .collect();
    StrategyOutcome {
        dependencies,
        exhausted: true,
    }
}

/// Keeps the first dependency per `(name, type)` in discovery order.
///
/// Names are validated again and names on the ignore list are dropped.
pub fn dedupe(dependencies: Vec<Dependency>, ignore: &IgnoreConfig) -> Vec<Dependency> {
    let mut seen = HashSet::new();
    dependencies
        .into_iter()
        .filter(|dep| is_valid_name(&dep.name, dep.kind))
        .filter(|dep| !ignore.should_ignore_package(&dep.name))
        .filter(|dep| seen.insert((dep.name.clone(), dep.kind)))
        .collect()
}

/// Scans URLs or injected content for dependency declarations.
///
/// A `Scanner` holds only shared, read-only collaborators; clone it or share
/// it by reference across any number of concurrent scans.
///
/// # Example
///
/// ```no_run
/// use depscan::{Config, Scanner};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let scanner = Scanner::from_config(&Config::default())?;
///     let report = scanner
///         .scan("https://github.com/expressjs/express/blob/master/package.json")
///         .await;
///     println!("{}", serde_json::to_string_pretty(&report)?);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Scanner {
    fetcher: Arc<dyn Fetcher>,
    sink: Arc<dyn LogSink>,
    catalog: Arc<Catalog>,
    ignore: IgnoreConfig,
}

impl Scanner {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            sink: Arc::new(TracingSink),
            catalog: Catalog::builtin(),
            ignore: IgnoreConfig::default(),
        }
    }

    /// A scanner with an [`HttpFetcher`] and the ignore list from `config`.
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let fetcher = HttpFetcher::from_config(config)?;
        Ok(Self::new(Arc::new(fetcher)).with_ignore(config.ignore.clone()))
    }

    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_catalog(mut self, catalog: Arc<Catalog>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_ignore(mut self, ignore: IgnoreConfig) -> Self {
        self.ignore = ignore;
        self
    }

    /// Fetches `url` and extracts its dependencies. Never fails; problems
    /// end up in [`ScanReport::error`].
    pub async fn scan(&self, url: &str) -> ScanReport {
        self.scan_with_cancel(url, CancelSignal::never()).await
    }

    /// Like [`scan`](Self::scan), but gives up with a `cancelled` report when
    /// `cancel` fires before the fetch completes.
    pub async fn scan_with_cancel(&self, url: &str, mut cancel: CancelSignal) -> ScanReport {
        let target = url.trim();
        let mut run = Run::start(url, ScanState::Fetching);

        if target.is_empty() {
            run.advance(ScanState::Errored);
            return ScanReport::failed(url, ScanError::from(ValidationError::EmptyInput));
        }

        let fetch_url = match rewrite_github_blob(target) {
            Some(raw) => {
                self.sink.record(&ScanEvent::UrlRewritten { from: target, to: &raw });
                raw
            }
            None => target.to_string(),
        };

        self.sink.record(&ScanEvent::FetchAttempted { url: &fetch_url });
        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(FetchError::Cancelled),
            result = self.fetcher.fetch(&fetch_url) => result,
        };

        match fetched {
            Ok(page) => {
                run.advance(ScanState::Classifying);
                self.extract(run, &page.body, &page.content_type)
            }
            Err(error) => {
                self.sink.record(&ScanEvent::FetchFailed {
                    url: &fetch_url,
                    error: &error,
                });
                run.advance(ScanState::Errored);
                ScanReport::failed(url, ScanError::from(error))
            }
        }
    }

    /// Extracts dependencies from already-fetched bytes, skipping the fetch.
    ///
    /// `url` only labels the report. Invalid UTF-8 is replaced, not rejected.
    pub fn scan_content(&self, url: &str, raw: &[u8], content_type: &str) -> ScanReport {
        self.extract(Run::start(url, ScanState::Classifying), raw, content_type)
    }

    /// Scans every URL concurrently; reports come back in input order.
    pub async fn scan_all(&self, urls: &[String], cancel: CancelSignal) -> Vec<ScanReport> {
        join_all(urls.iter().map(|url| self.scan_with_cancel(url, cancel.clone()))).await
    }

    fn extract(&self, mut run: Run<'_>, raw: &[u8], content_type: &str) -> ScanReport {
        let text = String::from_utf8_lossy(raw);
        let class = ContentClass::classify(content_type, &text);
        tracing::debug!(url = run.url, class = class.as_str(), bytes = raw.len(), "classified");

        run.advance(ScanState::Extracting);
        for fault in self.catalog.faults() {
            self.sink.record(&ScanEvent::RuleSkipped { fault });
        }

        let input = StrategyInput::new(&text, &self.catalog, self.sink.as_ref());
        let mut collected = Vec::new();
        for strategy in strategies_for(class) {
            let outcome = strategy.run(&input);
            self.sink.record(&ScanEvent::StrategyFinished {
                strategy: strategy.name,
                found: outcome.dependencies.len(),
            });
            collected.extend(outcome.dependencies);
            if outcome.exhausted {
                break;
            }
        }

        run.advance(ScanState::Filtering);
        let dependencies = dedupe(collected, &self.ignore);

        run.advance(ScanState::Done);
        self.sink.record(&ScanEvent::ScanFinished {
            url: run.url,
            total: dependencies.len(),
        });
        ScanReport::new(run.url, dependencies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{Capture, RuleSpec, VersionPolicy};
    use crate::fetch::FetchedPage;
    use crate::model::ManagerType;
    use crate::sink::MemorySink;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Serves one canned response and records requested URLs.
    struct CannedFetcher {
        response: Result<FetchedPage, FetchError>,
        requested: Mutex<Vec<String>>,
    }

    impl CannedFetcher {
        fn page(content_type: &str, body: &str) -> Arc<Self> {
            Arc::new(Self {
                response: Ok(FetchedPage {
                    final_url: "https://example.test/".to_string(),
                    status: 200,
                    content_type: content_type.to_string(),
                    body: body.as_bytes().to_vec(),
                }),
                requested: Mutex::new(Vec::new()),
            })
        }

        fn failing(error: FetchError) -> Arc<Self> {
            Arc::new(Self {
                response: Err(error),
                requested: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Fetcher for CannedFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
            self.requested.lock().unwrap().push(url.to_string());
            self.response.clone()
        }
    }

    struct HangingFetcher;

    #[async_trait]
    impl Fetcher for HangingFetcher {
        async fn fetch(&self, _url: &str) -> Result<FetchedPage, FetchError> {
            std::future::pending().await
        }
    }

    fn scanner_with(fetcher: Arc<dyn Fetcher>) -> (Scanner, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        (Scanner::new(fetcher).with_sink(sink.clone()), sink)
    }

    fn names(report: &ScanReport) -> Vec<&str> {
        report.dependencies.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn test_state_transitions() {
        assert!(ScanState::Fetching.can_advance_to(ScanState::Classifying));
        assert!(ScanState::Filtering.can_advance_to(ScanState::Done));
        assert!(ScanState::Extracting.can_advance_to(ScanState::Errored));
        assert!(!ScanState::Fetching.can_advance_to(ScanState::Extracting));
        assert!(!ScanState::Done.can_advance_to(ScanState::Errored));
        assert!(!ScanState::Errored.can_advance_to(ScanState::Fetching));
    }

    #[tokio::test]
    async fn test_json_manifest_scan() {
        let fetcher = CannedFetcher::page("application/json", r#"{"dependencies":{"express":"^4.18.0"}}"#);
        let (scanner, sink) = scanner_with(fetcher);

        let report = scanner.scan("https://example.test/package.json").await;

        assert_eq!(report.error, None);
        assert_eq!(names(&report), ["express"]);
        assert_eq!(report.dependencies[0].version, "^4.18.0");
        assert_eq!(report.summary.total, 1);
        assert_eq!(report.summary.by_type.get(&ManagerType::Npm), Some(&1));
        assert_eq!(sink.messages()[0], "fetch attempted: https://example.test/package.json");
    }

    #[tokio::test]
    async fn test_github_blob_url_is_rewritten_before_fetch() {
        let fetcher = CannedFetcher::page("text/plain", "flask==3.0.0\n");
        let (scanner, sink) = scanner_with(fetcher.clone());

        let report = scanner
            .scan("https://github.com/acme/app/blob/main/requirements.txt")
            .await;

        assert_eq!(
            *fetcher.requested.lock().unwrap(),
            ["https://raw.githubusercontent.com/acme/app/main/requirements.txt"]
        );
        assert_eq!(report.url, "https://github.com/acme/app/blob/main/requirements.txt");
        assert_eq!(names(&report), ["flask"]);
        assert!(sink.messages()[0].starts_with("url rewritten: "));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_an_error_report() {
        let fetcher = CannedFetcher::failing(FetchError::HttpStatus {
            status: 404,
            reason: "Not Found".to_string(),
        });
        let (scanner, sink) = scanner_with(fetcher);

        let report = scanner.scan("https://example.test/missing").await;

        assert_eq!(report.error.as_deref(), Some("HTTP status 404 Not Found"));
        assert!(report.dependencies.is_empty());
        assert_eq!(report.summary.total, 0);
        assert!(report.summary.by_type.is_empty());
        assert!(sink.messages().contains(&"fetch failed: http-status".to_string()));
    }

    #[tokio::test]
    async fn test_empty_url_is_rejected_without_fetching() {
        let fetcher = CannedFetcher::page("text/plain", "");
        let (scanner, _sink) = scanner_with(fetcher.clone());

        let report = scanner.scan("   ").await;

        assert_eq!(report.error.as_deref(), Some("invalid URL provided"));
        assert!(fetcher.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancellation_yields_cancelled_report() {
        let (scanner, _sink) = scanner_with(Arc::new(HangingFetcher));
        let (handle, signal) = CancelSignal::channel();

        let scan = scanner.scan_with_cancel("https://example.test/slow", signal);
        let cancel = async {
            tokio::task::yield_now().await;
            handle.cancel();
        };
        let (report, ()) = tokio::join!(scan, cancel);

        assert_eq!(report.error.as_deref(), Some("scan cancelled"));
        assert!(report.dependencies.is_empty());
    }

    #[tokio::test]
    async fn test_already_cancelled_signal_skips_fetch() {
        let fetcher = CannedFetcher::page("text/plain", "numpy==1.0");
        let (scanner, _sink) = scanner_with(fetcher.clone());
        let (handle, signal) = CancelSignal::channel();
        handle.cancel();

        let report = scanner.scan_with_cancel("https://example.test/", signal.clone()).await;

        assert!(signal.is_cancelled());
        assert_eq!(report.error.as_deref(), Some("scan cancelled"));
        assert!(fetcher.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scan_all_keeps_input_order() {
        let fetcher = CannedFetcher::page("text/plain", "gem 'rails', '7.1.0'");
        let (scanner, _sink) = scanner_with(fetcher);
        let urls = vec!["https://a.test/Gemfile".to_string(), String::new()];

        let reports = scanner.scan_all(&urls, CancelSignal::never()).await;

        assert_eq!(reports.len(), 2);
        assert_eq!(names(&reports[0]), ["rails"]);
        assert!(reports[1].is_error());
    }

    #[test]
    fn test_undecodable_json_falls_back_to_plain_text() {
        let (scanner, sink) = scanner_with(Arc::new(HangingFetcher));
        let body = "{ this is not json\npip install requests\n";

        let report = scanner.scan_content("local", body.as_bytes(), "application/json");

        assert_eq!(report.error, None);
        assert_eq!(names(&report), ["requests"]);
        let messages = sink.messages();
        assert!(messages.contains(&"parse fallback: json→plain-text".to_string()));
        assert!(messages.contains(&"strategy finished: plain-text (1 found)".to_string()));
    }

    #[test]
    fn test_html_blocks_before_body() {
        let html = r#"<html><body>
            <p>Or with npm: npm install left-pad</p>
            <pre><code>pip install numpy==1.26.0 pandas</code></pre>
        </body></html>"#;
        let (scanner, sink) = scanner_with(Arc::new(HangingFetcher));

        let report = scanner.scan_content("https://docs.test/", html.as_bytes(), "text/html; charset=utf-8");

        assert_eq!(names(&report), ["numpy", "pandas"]);
        assert_eq!(report.dependencies[0].version, "1.26.0");
        assert!(!sink.messages().iter().any(|m| m.starts_with("strategy finished: markup-body")));
    }

    #[test]
    fn test_html_body_when_no_blocks() {
        let html = "<html><body><p>Install it: pip install httpx</p></body></html>";
        let (scanner, _sink) = scanner_with(Arc::new(HangingFetcher));

        let report = scanner.scan_content("https://docs.test/", html.as_bytes(), "text/html");

        assert_eq!(names(&report), ["httpx"]);
    }

    #[test]
    fn test_manifest_inside_code_block() {
        let html = r#"<body><pre>{"devDependencies": {"vitest": "^1.0.0"}}</pre></body>"#;
        let (scanner, _sink) = scanner_with(Arc::new(HangingFetcher));

        let report = scanner.scan_content("page", html.as_bytes(), "text/html");

        assert_eq!(names(&report), ["vitest"]);
        assert_eq!(report.dependencies[0].source_line, r#""vitest": "^1.0.0""#);
    }

    #[test]
    fn test_dedupe_keeps_first_seen() {
        let (scanner, _sink) = scanner_with(Arc::new(HangingFetcher));
        let body = "requests==2.31.0\nrequests==2.0.0\nflask\npip install requests==1.0\n";

        let report = scanner.scan_content("reqs", body.as_bytes(), "text/plain");

        let requests: Vec<_> = report.dependencies.iter().filter(|d| d.name == "requests").collect();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].version, "2.31.0");
    }

    #[test]
    fn test_dedupe_is_per_type_and_applies_ignore_list() {
        let deps = vec![
            Dependency::new("express", "4.0.0", ManagerType::Npm, "a"),
            Dependency::new("express", "1.0.0", ManagerType::Npm, "b"),
            Dependency::new("express", "", ManagerType::Ruby, "c"),
            Dependency::new("install", "", ManagerType::Pip, "d"),
            Dependency::new("@types/node", "20.0.0", ManagerType::Npm, "e"),
        ];
        let ignore = IgnoreConfig {
            packages: vec!["@types/*".to_string()],
        };

        let kept = dedupe(deps, &ignore);

        let keys: Vec<_> = kept.iter().map(|d| (d.name.as_str(), d.kind, d.version.as_str())).collect();
        assert_eq!(
            keys,
            [("express", ManagerType::Npm, "4.0.0"), ("express", ManagerType::Ruby, "")]
        );
    }

    #[test]
    fn test_faulty_rule_is_logged_and_others_run() {
        let specs = [
            RuleSpec {
                id: "broken",
                kind: ManagerType::Pip,
                pattern: "(unclosed",
                inner: None,
                capture: Capture::Command,
                version: VersionPolicy::Optional,
            },
            RuleSpec {
                id: "gem-line",
                kind: ManagerType::Ruby,
                pattern: r#"gem ['"]([a-z_-]+)['"]"#,
                inner: None,
                capture: Capture::NameVersion,
                version: VersionPolicy::Optional,
            },
        ];
        let (scanner, sink) = scanner_with(Arc::new(HangingFetcher));
        let scanner = scanner.with_catalog(Arc::new(Catalog::from_specs(&specs)));

        let report = scanner.scan_content("Gemfile", b"gem 'sinatra'", "text/plain");

        assert_eq!(names(&report), ["sinatra"]);
        assert!(sink.messages().contains(&"rule skipped: broken".to_string()));
    }

    #[test]
    fn test_hostile_inputs_produce_reports() {
        let (scanner, _sink) = scanner_with(Arc::new(HangingFetcher));
        let inputs: [(&[u8], &str); 5] = [
            (&b""[..], ""),
            (&b"\xff\xfe\x00pip install numpy\x80"[..], "text/plain"),
            (&b"<div><pre>npm install express"[..], "text/html"),
            (&b"["[..], "application/json"),
            (&b"{\"dependencies\": [1, 2]}"[..], "application/json"),
        ];

        for (raw, content_type) in inputs {
            let report = scanner.scan_content("input", raw, content_type);
            assert_eq!(report.error, None);
            assert_eq!(report.summary.total, report.dependencies.len());
        }
    }

    #[test]
    fn test_scan_content_is_idempotent() {
        let (scanner, _sink) = scanner_with(Arc::new(HangingFetcher));
        let body = "<pre>pip install a-lib b-lib\nnpm i c-lib@1.0.0</pre>";

        let first = serde_json::to_string(&scanner.scan_content("u", body.as_bytes(), "text/html")).unwrap();
        let second = serde_json::to_string(&scanner.scan_content("u", body.as_bytes(), "text/html")).unwrap();

        assert_eq!(first, second);
    }
}
