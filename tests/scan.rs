use depscan::sink::MemorySink;
use depscan::{HttpFetcher, ManagerType, ScanReport, Scanner};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PACKAGE_JSON: &str = r#"{"name":"demo","dependencies":{"express":"^4.18.0"}}"#;

const DOCS_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Getting started</title><script>window.npm = "install tracker";</script></head>
<body>
  <nav>Home | Docs</nav>
  <h1>Installation</h1>
  <p>Install the library and its optional extras:</p>
  <div class="highlight"><pre><span class="gp">$</span> pip install -r requirements.txt \
    &quot;fastapi[all]&gt;=0.110&quot; uvicorn==0.29.0</pre></div>
  <p>The frontend needs <code>npm install --save-dev vite@5.2.0</code>.</p>
</body>
</html>"#;

const REQUIREMENTS: &str = "\
# core
requests>=2.31, <3
celery[redis]~=5.3
Django==4.2.1

-r dev.txt
";

fn scanner() -> (Scanner, Arc<MemorySink>) {
    let fetcher = HttpFetcher::new(Duration::from_secs(5), depscan::fetch::DEFAULT_USER_AGENT, 5).unwrap();
    let sink = Arc::new(MemorySink::new());
    (Scanner::new(Arc::new(fetcher)).with_sink(sink.clone()), sink)
}

async fn serve(server: &MockServer, route: &str, status: u16, content_type: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_raw(body.to_string(), content_type))
        .mount(server)
        .await;
}

fn pairs(report: &ScanReport) -> Vec<(&str, &str, ManagerType)> {
    report
        .dependencies
        .iter()
        .map(|d| (d.name.as_str(), d.version.as_str(), d.kind))
        .collect()
}

#[tokio::test]
async fn test_json_manifest_end_to_end() {
    let server = MockServer::start().await;
    serve(&server, "/package.json", 200, "application/json", PACKAGE_JSON).await;
    let (scanner, _sink) = scanner();

    let report = scanner.scan(&format!("{}/package.json", server.uri())).await;

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(
        value["dependencies"],
        serde_json::json!([{
            "name": "express",
            "version": "^4.18.0",
            "type": "npm",
            "sourceLine": "\"express\": \"^4.18.0\""
        }])
    );
    assert_eq!(value["summary"], serde_json::json!({"total": 1, "byType": {"npm": 1}}));
    assert!(value.get("error").is_none());
}

#[tokio::test]
async fn test_not_found_is_an_error_report() {
    let server = MockServer::start().await;
    serve(&server, "/gone", 404, "text/html", "<h1>Not Found</h1>").await;
    let (scanner, sink) = scanner();

    let report = scanner.scan(&format!("{}/gone", server.uri())).await;

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["error"], "HTTP status 404 Not Found");
    assert_eq!(value["dependencies"], serde_json::json!([]));
    assert_eq!(value["summary"], serde_json::json!({"total": 0, "byType": {}}));
    assert!(sink
        .messages()
        .iter()
        .any(|m| m == "fetch failed: http-status"));
}

#[tokio::test]
async fn test_documentation_page() {
    let server = MockServer::start().await;
    serve(&server, "/docs", 200, "text/html; charset=utf-8", DOCS_PAGE).await;
    let (scanner, _sink) = scanner();

    let report = scanner.scan(&format!("{}/docs", server.uri())).await;

    assert_eq!(report.error, None);
    assert_eq!(
        pairs(&report),
        [
            ("fastapi", ">=0.110", ManagerType::Pip),
            ("uvicorn", "0.29.0", ManagerType::Pip),
            ("vite", "5.2.0", ManagerType::Npm),
        ]
    );
    assert!(report.dependencies.iter().all(|d| d.name != "tracker"));
}

#[tokio::test]
async fn test_plain_text_requirements() {
    let server = MockServer::start().await;
    serve(&server, "/requirements.txt", 200, "text/plain", REQUIREMENTS).await;
    let (scanner, _sink) = scanner();

    let report = scanner.scan(&format!("{}/requirements.txt", server.uri())).await;

    assert_eq!(
        pairs(&report),
        [
            ("requests", ">=2.31, <3", ManagerType::Pip),
            ("celery", "~=5.3", ManagerType::Pip),
            ("Django", "4.2.1", ManagerType::Pip),
        ]
    );
    assert_eq!(report.summary.by_type.get(&ManagerType::Pip), Some(&3));
}

#[tokio::test]
async fn test_repeated_scans_are_byte_identical() {
    let server = MockServer::start().await;
    serve(&server, "/docs", 200, "text/html", DOCS_PAGE).await;
    let (scanner, _sink) = scanner();
    let url = format!("{}/docs", server.uri());

    let first = serde_json::to_string_pretty(&scanner.scan(&url).await).unwrap();
    let second = serde_json::to_string_pretty(&scanner.scan(&url).await).unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_concurrent_scans_are_independent() {
    let server = MockServer::start().await;
    serve(&server, "/package.json", 200, "application/json", PACKAGE_JSON).await;
    serve(&server, "/requirements.txt", 200, "text/plain", REQUIREMENTS).await;
    let (scanner, _sink) = scanner();
    let urls = vec![
        format!("{}/package.json", server.uri()),
        format!("{}/requirements.txt", server.uri()),
        format!("{}/missing", server.uri()),
    ];

    let reports = scanner.scan_all(&urls, depscan::CancelSignal::never()).await;

    assert_eq!(reports[0].summary.total, 1);
    assert_eq!(reports[1].summary.total, 3);
    assert!(reports[2].is_error());
    assert_eq!(reports[2].url, urls[2]);
}

#[test]
fn test_offline_content_injection() {
    let (scanner, sink) = scanner();
    let gradle = "dependencies {\n    implementation 'com.google.guava:guava:32.1.2-jre'\n}\n";

    let report = scanner.scan_content("build.gradle", gradle.as_bytes(), "");

    assert_eq!(
        pairs(&report),
        [("com.google.guava:guava", "32.1.2-jre", ManagerType::Gradle)]
    );
    assert!(!sink.messages().iter().any(|m| m.starts_with("fetch attempted")));
}

#[test]
fn test_non_utf8_and_empty_content() {
    let (scanner, _sink) = scanner();

    let garbled = scanner.scan_content("bin", b"\xc3\x28 npm install left-pad \xa0\xa1", "text/plain");
    let empty = scanner.scan_content("empty", b"", "");

    assert_eq!(pairs(&garbled), [("left-pad", "", ManagerType::Npm)]);
    assert_eq!(empty.error, None);
    assert_eq!(empty.summary.total, 0);
}

#[test]
fn test_manifest_keeps_every_string_entry() {
    let (scanner, _sink) = scanner();
    let manifest = r#"{"dependencies":{"config":"^3.3.9","build":"0.1.4","env":"0.0.2","make":"0.8.1","source":"0.0.3","express":"^4.18.0"}}"#;

    let report = scanner.scan_content("package.json", manifest.as_bytes(), "application/json");

    let names: Vec<&str> = report.dependencies.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, ["config", "build", "env", "make", "source", "express"]);
    assert_eq!(report.summary.total, 6);
}
