//! Reduces an HTML page to the text regions most likely to declare
//! dependencies.
//!
//! Parsing is delegated to `scraper` (html5ever), which repairs unbalanced
//! or truncated markup instead of failing, so every page reduces to at least
//! its body text.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Where a segment came from, in extraction priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceHint {
    GithubBlob,
    Pre,
    Code,
    Script,
    Highlight,
    Body,
}

impl SourceHint {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceHint::GithubBlob => "github-blob",
            SourceHint::Pre => "pre",
            SourceHint::Code => "code",
            SourceHint::Script => "script",
            SourceHint::Highlight => "highlight",
            SourceHint::Body => "body",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub source: SourceHint,
}

static GITHUB_LINE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".blob-code-inner, .react-file-line").expect("github line selector is valid")
});
static GITHUB_RAW_TEXTAREA: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("textarea#read-only-cursor-text-area").expect("github textarea selector is valid")
});
static PRE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("pre").expect("pre selector is valid"));
static CODE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("code, textarea").expect("code selector is valid"));
static SCRIPT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script[type]").expect("script selector is valid"));
static CLASSED_BLOCK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div[class], table[class]").expect("block selector is valid"));
static BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").expect("body selector is valid"));

static HIGHLIGHT_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)highlight|hljs|syntax|sourcecode|codehilite|prettyprint|code-?block|blob-wrapper|language-")
        .expect("highlight class regex is valid")
});

/// Elements whose text never belongs in the body segment.
const INVISIBLE: &[&str] = &["script", "style", "noscript", "template", "head", "title"];

/// Parses `html` and reduces it to ordered text segments.
pub fn reduce_html(html: &str) -> Vec<Segment> {
    let document = Html::parse_document(html);
    extract_text_segments(&document)
}

/// Collects candidate text regions from a parsed page.
///
/// Order: GitHub blob lines (re-joined in document order), `<pre>` blocks,
/// `<code>`/`<textarea>` elements outside any `<pre>`, JSON `<script>`
/// bodies, syntax-highlight containers, and finally the whole visible body
/// text. Empty segments and repeated texts are dropped.
pub fn extract_text_segments(document: &Html) -> Vec<Segment> {
    let mut segments = SegmentList::default();

    let blob_lines: Vec<String> = document.select(&GITHUB_LINE).map(element_text).collect();
    if !blob_lines.is_empty() {
        segments.push(blob_lines.join("\n"), SourceHint::GithubBlob);
    }
    for textarea in document.select(&GITHUB_RAW_TEXTAREA) {
        segments.push(element_text(textarea), SourceHint::GithubBlob);
    }

    for pre in document.select(&PRE) {
        segments.push(element_text(pre), SourceHint::Pre);
    }

    for code in document.select(&CODE).filter(|el| !inside(el, "pre")) {
        segments.push(element_text(code), SourceHint::Code);
    }

    for script in document.select(&SCRIPT) {
        let is_json = script
            .value()
            .attr("type")
            .is_some_and(|t| t.to_ascii_lowercase().contains("json"));
        if is_json {
            segments.push(element_text(script), SourceHint::Script);
        }
    }

    for block in document.select(&CLASSED_BLOCK) {
        let highlighted = block
            .value()
            .attr("class")
            .is_some_and(|class| HIGHLIGHT_CLASS.is_match(class));
        if highlighted {
            segments.push(element_text(block), SourceHint::Highlight);
        }
    }

    let body = document
        .select(&BODY)
        .next()
        .unwrap_or_else(|| document.root_element());
    segments.push(visible_text(body), SourceHint::Body);

    segments.into_inner()
}

#[derive(Default)]
struct SegmentList {
    segments: Vec<Segment>,
    seen: HashSet<String>,
}

impl SegmentList {
    fn push(&mut self, text: String, source: SourceHint) {
        let key = text.trim();
        if key.is_empty() || self.seen.contains(key) {
            return;
        }
        self.seen.insert(key.to_string());
        self.segments.push(Segment { text, source });
    }

    fn into_inner(self) -> Vec<Segment> {
        self.segments
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

fn inside(element: &ElementRef<'_>, tag: &str) -> bool {
    element
        .ancestors()
        .filter_map(|node| node.value().as_element())
        .any(|el| el.name() == tag)
}

/// Text nodes under `root`, one per line, skipping non-rendered elements.
fn visible_text(root: ElementRef<'_>) -> String {
    let mut lines = Vec::new();
    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .ancestors()
            .filter_map(|a| a.value().as_element())
            .any(|el| INVISIBLE.contains(&el.name()));
        if hidden {
            continue;
        }
        for line in text.lines() {
            let line = line.trim();
            if !line.is_empty() {
                lines.push(line);
            }
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hints(segments: &[Segment]) -> Vec<SourceHint> {
        segments.iter().map(|s| s.source).collect()
    }

    #[test]
    fn test_github_blob_lines_are_rejoined() {
        let html = r#"<html><body><table class="highlight">
            <tr><td class="blob-num">1</td><td class="blob-code blob-code-inner">{</td></tr>
            <tr><td class="blob-num">2</td><td class="blob-code blob-code-inner">  "dependencies": {"express": "^4.18.0"}</td></tr>
            <tr><td class="blob-num">3</td><td class="blob-code blob-code-inner">}</td></tr>
        </table></body></html>"#;
        let segments = reduce_html(html);

        assert_eq!(segments[0].source, SourceHint::GithubBlob);
        assert_eq!(segments[0].text, "{\n  \"dependencies\": {\"express\": \"^4.18.0\"}\n}");
        assert_eq!(segments.last().unwrap().source, SourceHint::Body);
    }

    #[test]
    fn test_priority_order_and_code_inside_pre_once() {
        let html = r#"<body>
            <p>Intro</p>
            <div class="highlight-python"><span>pip install flask</span></div>
            <p>Inline <code>npm i left-pad</code></p>
            <pre><code>pip install numpy</code></pre>
        </body>"#;
        let segments = reduce_html(html);

        assert_eq!(
            hints(&segments),
            [SourceHint::Pre, SourceHint::Code, SourceHint::Highlight, SourceHint::Body]
        );
        assert_eq!(segments[0].text, "pip install numpy");
        assert_eq!(segments[1].text, "npm i left-pad");
        assert_eq!(segments[2].text, "pip install flask");
    }

    #[test]
    fn test_repeated_text_is_emitted_once() {
        let html = r#"<body><div class="highlight"><pre>gem install rails</pre></div></body>"#;
        let segments = reduce_html(html);

        assert_eq!(hints(&segments), [SourceHint::Pre]);
    }

    #[test]
    fn test_json_script_segments() {
        let html = r#"<html><head><script type="application/json">{"dependencies": {"vue": "3.4.0"}}</script>
            <script>var ignored = 1;</script></head><body><p>Docs</p></body></html>"#;
        let segments = reduce_html(html);

        assert_eq!(hints(&segments), [SourceHint::Script, SourceHint::Body]);
        assert_eq!(segments[1].text, "Docs");
    }

    #[test]
    fn test_body_text_skips_scripts_and_styles() {
        let html = "<body><style>.x{}</style><p>pip install requests</p><script>npm install evil</script></body>";
        let segments = reduce_html(html);

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "pip install requests");
    }

    #[test]
    fn test_malformed_markup_degrades_to_text() {
        let html = "<div><p>pip install <b>django</p><pre>npm install express";
        let segments = reduce_html(html);

        assert_eq!(segments[0].source, SourceHint::Pre);
        assert_eq!(segments[0].text, "npm install express");
        assert!(segments.last().unwrap().text.contains("django"));
    }

    #[test]
    fn test_empty_input_has_no_segments() {
        assert!(reduce_html("").is_empty());
        assert!(reduce_html("<html><body>   </body></html>").is_empty());
    }
}
