//! Package-manager extraction rules.
//!
//! The catalog is an ordered table of [`RuleSpec`]s, one group per manager.
//! Supporting a new manager or syntax means adding entries to
//! [`BUILTIN_RULES`]; the orchestrator never changes. Rules are applied in
//! table order and every match is collected, so one text can produce
//! dependencies for several managers at once.
//!
//! Matching uses the `regex` crate, whose engine runs in time linear in the
//! input, so no rule can backtrack without bound on large pages. A rule
//! whose pattern fails to compile is recorded as a [`RuleError`] and skipped.

use regex::{Regex, RegexBuilder};
use std::sync::{Arc, LazyLock};

use super::command::{extract_packages_from_command, logical_line, split_requirement};
use super::validator::{is_valid_name, is_valid_version};
use crate::error::RuleError;
use crate::model::{Dependency, ManagerType};

/// Compiled program size ceiling for a single rule.
const RULE_SIZE_LIMIT: usize = 1 << 20;

/// Install commands longer than this are prose, not commands.
const MAX_COMMAND_LEN: usize = 2000;

/// How a rule's capture groups map onto a dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// Group 1 is the name, optional group 2 the version.
    NameVersion,
    /// Group 1 is a requirement specifier such as `flask>=2.0`.
    Requirement,
    /// Groups 1 to 3 are group id, artifact id and optional version.
    Coordinates,
    /// The match starts an install command routed through the tokenizer.
    Command,
    /// Group 1 is a block rescanned with the inner pattern as `NameVersion`.
    Block,
    /// Group 1 is a list rescanned with the inner pattern as `Requirement`.
    RequirementList,
    /// Group 1 is the body of a Maven `<dependency>` element.
    MavenDependency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionPolicy {
    /// Matches without a plausible version are discarded.
    Required,
    /// Implausible or missing versions become `""`.
    Optional,
}

/// Uncompiled rule definition.
#[derive(Debug, Clone, Copy)]
pub struct RuleSpec {
    pub id: &'static str,
    pub kind: ManagerType,
    pub pattern: &'static str,
    pub inner: Option<&'static str>,
    pub capture: Capture,
    pub version: VersionPolicy,
}

impl RuleSpec {
    const fn new(id: &'static str, kind: ManagerType, pattern: &'static str, capture: Capture, version: VersionPolicy) -> Self {
        Self {
            id,
            kind,
            pattern,
            inner: None,
            capture,
            version,
        }
    }

    const fn with_inner(mut self, inner: &'static str) -> Self {
        self.inner = Some(inner);
        self
    }
}

use Capture::*;
use ManagerType::*;
use VersionPolicy::*;

const QUOTED_PAIR: &str = r#"["']?([@A-Za-z0-9/_.-]+)["']?\s*:\s*["']([^"'\n]+)["']"#;

pub const BUILTIN_RULES: &[RuleSpec] = &[
    // npm
    RuleSpec::new("npm-quoted-pair", Npm, r#"["']([@A-Za-z0-9/_.-]+)["']\s*:\s*["']([^"'\n]+)["']"#, NameVersion, Required),
    RuleSpec::new("npm-dependency-block", Npm, r#"(?:dependencies|devDependencies|peerDependencies)["']?\s*:\s*\{([^}]*)\}"#, Block, Required)
        .with_inner(QUOTED_PAIR),
    RuleSpec::new("npm-install", Npm, r"\bnpm\s+(?:install|i|add)\b[^\n]*", Command, Optional),
    RuleSpec::new("yarn-pnpm-add", Npm, r"\b(?:yarn|pnpm)\s+add\b[^\n]*", Command, Optional),
    // pip
    RuleSpec::new(
        "pip-requirement-line",
        Pip,
        r"(?m)^[ \t]*([A-Za-z0-9][A-Za-z0-9._-]*(?:\[[^\]\n]*\])?[ \t]*(?:===|==|>=|<=|~=|!=|>|<)[ \t]*[^\s#;,]+(?:[ \t]*,[ \t]*(?:==|>=|<=|~=|!=|>|<)[ \t]*[^\s#;,]+)*)",
        Requirement,
        Required,
    ),
    RuleSpec::new("pip-install", Pip, r"\bpip3?\s+install\b[^\n]*", Command, Optional),
    RuleSpec::new("conda-install", Pip, r"\b(?:conda|mamba)\s+(?:install|create)\b[^\n]*", Command, Optional),
    RuleSpec::new("setup-install-requires", Pip, r"(?s)install_requires\s*=\s*\[(.*?)\]", RequirementList, Optional)
        .with_inner(r#"["']([^"'\n]+)["']"#),
    RuleSpec::new(
        "pip-dependency-table",
        Pip,
        r"(?m)^[ \t]*\[(?:tool\.poetry\.(?:dev-)?dependencies|tool\.poetry\.group\.[A-Za-z0-9_-]+\.dependencies|packages|dev-packages)\][ \t]*\n((?:[^\[\n][^\n]*\n?|\n)*)",
        Block,
        Required,
    )
    .with_inner(r#"(?m)^[ \t]*([A-Za-z0-9][A-Za-z0-9_.-]*)[ \t]*=[ \t]*["']([^"'\n]+)["']"#),
    // maven
    RuleSpec::new("maven-dependency", Maven, r"(?s)<dependency>(.*?)</dependency>", MavenDependency, Optional),
    // gradle
    RuleSpec::new(
        "gradle-coordinate",
        Gradle,
        r#"\b(?:implementation|api|compile|compileOnly|runtimeOnly|testImplementation|testCompile|testRuntimeOnly|annotationProcessor|kapt|classpath)\s*\(?\s*["']([^:"'\s]+):([^:"'\s]+)(?::([^"'\s@]+))?["']"#,
        Coordinates,
        Optional,
    ),
    // go
    RuleSpec::new("go-require-line", Go, r"(?m)^[ \t]*require[ \t]+([^\s()]+)[ \t]+(v[0-9][^\s]*)", NameVersion, Required),
    RuleSpec::new("go-require-block", Go, r"(?s)\brequire\s*\((.*?)\)", Block, Required)
        .with_inner(r"(?m)^[ \t]*([^\s/]+\.[^\s]+)[ \t]+(v[0-9][^\s]*)"),
    RuleSpec::new("go-get", Go, r"\bgo\s+(?:get|install)\b[^\n]*", Command, Optional),
    // ruby
    RuleSpec::new("gemfile-gem", Ruby, r#"\bgem[ \t]+["']([^"'\n]+)["'](?:[ \t]*,[ \t]*["']([^"'\n]+)["'])?"#, NameVersion, Optional),
    RuleSpec::new("gem-install", Ruby, r"\bgem\s+install\b[^\n]*", Command, Optional),
    // composer
    RuleSpec::new(
        "composer-quoted-pair",
        Composer,
        r#"["']([A-Za-z0-9][A-Za-z0-9_.-]*/[A-Za-z0-9][A-Za-z0-9_.-]*)["']\s*:\s*["']([^"'\n]+)["']"#,
        NameVersion,
        Required,
    ),
    RuleSpec::new("composer-require", Composer, r"\bcomposer\s+require\b[^\n]*", Command, Optional),
];

static MAVEN_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<groupId>\s*([^<\s]+)\s*</groupId>").expect("groupId regex is valid"));
static MAVEN_ARTIFACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<artifactId>\s*([^<\s]+)\s*</artifactId>").expect("artifactId regex is valid"));
static MAVEN_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<version>\s*([^<]+?)\s*</version>").expect("version regex is valid"));

static BUILTIN: LazyLock<Arc<Catalog>> = LazyLock::new(|| Arc::new(Catalog::from_specs(BUILTIN_RULES)));

/// A compiled, read-only extraction rule.
#[derive(Debug)]
pub struct ExtractionRule {
    pub id: &'static str,
    pub kind: ManagerType,
    pub capture: Capture,
    pub version: VersionPolicy,
    pattern: Regex,
    inner: Option<Regex>,
}

impl ExtractionRule {
    fn compile(spec: &RuleSpec) -> Result<Self, RuleError> {
        let fault = |e: regex::Error| RuleError::PatternFault {
            id: spec.id.to_string(),
            reason: e.to_string(),
        };
        let build = |pattern: &str| RegexBuilder::new(pattern).size_limit(RULE_SIZE_LIMIT).build();

        let pattern = build(spec.pattern).map_err(fault)?;
        let inner = match spec.inner {
            Some(inner) => Some(build(inner).map_err(fault)?),
            None if matches!(spec.capture, Block | RequirementList) => {
                return Err(RuleError::PatternFault {
                    id: spec.id.to_string(),
                    reason: "block rule without inner pattern".to_string(),
                })
            }
            None => None,
        };

        Ok(Self {
            id: spec.id,
            kind: spec.kind,
            capture: spec.capture,
            version: spec.version,
            pattern,
            inner,
        })
    }

    /// Appends every dependency this rule finds in `text`.
    pub fn apply(&self, text: &str, out: &mut Vec<Dependency>) {
        for caps in self.pattern.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let line = whole.as_str();

            match self.capture {
                NameVersion => {
                    if let Some(name) = caps.get(1) {
                        let version = caps.get(2).map_or("", |m| m.as_str());
                        self.push(name.as_str(), version, line, out);
                    }
                }
                Requirement => {
                    if let Some(spec) = caps.get(1) {
                        let (name, version) = split_requirement(spec.as_str());
                        self.push(name, version, line, out);
                    }
                }
                Coordinates => {
                    if let (Some(group), Some(artifact)) = (caps.get(1), caps.get(2)) {
                        let name = format!("{}:{}", group.as_str(), artifact.as_str());
                        let version = caps.get(3).map_or("", |m| m.as_str());
                        self.push(&name, version, line, out);
                    }
                }
                Command => {
                    let command = logical_line(text, whole.start());
                    if command.len() <= MAX_COMMAND_LEN {
                        out.extend(extract_packages_from_command(&command, self.kind));
                    }
                }
                Block => {
                    if let (Some(block), Some(inner)) = (caps.get(1), &self.inner) {
                        for entry in inner.captures_iter(block.as_str()) {
                            if let (Some(all), Some(name)) = (entry.get(0), entry.get(1)) {
                                let version = entry.get(2).map_or("", |m| m.as_str());
                                self.push(name.as_str(), version, all.as_str(), out);
                            }
                        }
                    }
                }
                RequirementList => {
                    if let (Some(list), Some(inner)) = (caps.get(1), &self.inner) {
                        for entry in inner.captures_iter(list.as_str()) {
                            if let Some(spec) = entry.get(1) {
                                let (name, version) = split_requirement(spec.as_str());
                                self.push(name, version, spec.as_str(), out);
                            }
                        }
                    }
                }
                MavenDependency => {
                    if let Some(body) = caps.get(1) {
                        self.push_maven(body.as_str(), line, out);
                    }
                }
            }
        }
    }

    fn push_maven(&self, body: &str, line: &str, out: &mut Vec<Dependency>) {
        let field = |re: &Regex| re.captures(body).and_then(|c| c.get(1)).map(|m| m.as_str());
        if let (Some(group), Some(artifact)) = (field(&MAVEN_GROUP), field(&MAVEN_ARTIFACT)) {
            let version = field(&MAVEN_VERSION).unwrap_or("");
            self.push(&format!("{}:{}", group, artifact), version, line, out);
        }
    }

    fn push(&self, name: &str, version: &str, line: &str, out: &mut Vec<Dependency>) {
        let name = name.trim();
        if !is_valid_name(name, self.kind) {
            return;
        }
        let version = version.trim();
        let version = match (is_valid_version(version), self.version) {
            (true, _) => version,
            (false, Required) => return,
            (false, Optional) => "",
        };
        out.push(Dependency::new(name, version, self.kind, line));
    }
}

/// An ordered, immutable set of compiled rules.
#[derive(Debug)]
pub struct Catalog {
    rules: Vec<ExtractionRule>,
    faults: Vec<RuleError>,
}

impl Catalog {
    /// The shared built-in catalog, compiled once per process.
    pub fn builtin() -> Arc<Catalog> {
        Arc::clone(&BUILTIN)
    }

    /// Compiles `specs` in order; faulty rules are logged and left out.
    pub fn from_specs(specs: &[RuleSpec]) -> Self {
        let mut rules = Vec::with_capacity(specs.len());
        let mut faults = Vec::new();

        for spec in specs {
            match ExtractionRule::compile(spec) {
                Ok(rule) => rules.push(rule),
                Err(fault) => {
                    tracing::warn!(rule = spec.id, error = %fault, "rule skipped");
                    faults.push(fault);
                }
            }
        }

        Self { rules, faults }
    }

    pub fn rules(&self) -> &[ExtractionRule] {
        &self.rules
    }

    pub fn rules_for(&self, kind: ManagerType) -> impl Iterator<Item = &ExtractionRule> {
        self.rules.iter().filter(move |rule| rule.kind == kind)
    }

    /// Rules that failed to compile.
    pub fn faults(&self) -> &[RuleError] {
        &self.faults
    }

    /// Applies every rule in catalog order and collects all matches.
    pub fn extract(&self, text: &str) -> Vec<Dependency> {
        let mut found = Vec::new();
        for rule in &self.rules {
            rule.apply(text, &mut found);
        }
        found
    }

    /// Applies only the rules for `kind`.
    pub fn match_kind(&self, kind: ManagerType, text: &str) -> Vec<Dependency> {
        let mut found = Vec::new();
        for rule in self.rules_for(kind) {
            rule.apply(text, &mut found);
        }
        found
    }
}
