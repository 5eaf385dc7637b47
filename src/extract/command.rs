//! Tokenizer for shell install commands (`pip install x y`, `npm i x@1.2`, ...).

use super::validator::{is_valid_name, is_valid_version};
use crate::model::{Dependency, ManagerType};

/// Continuation lines followed past the first line of a command.
const MAX_CONTINUATIONS: usize = 10;

/// Tokens that end the current shell command.
const SEPARATORS: &[&str] = &["&&", "||", ";", "|", "&", ">", ">>", "<", "2>&1", "\\"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    Pip,
    Conda,
    Npm,
    Go,
    Gem,
    Composer,
}

impl Dialect {
    fn detect(tokens: &[&str], kind: ManagerType) -> Option<Self> {
        match kind {
            ManagerType::Pip => {
                let conda = tokens
                    .iter()
                    .any(|t| matches!(*t, "conda" | "mamba" | "micromamba"));
                Some(if conda { Dialect::Conda } else { Dialect::Pip })
            }
            ManagerType::Npm => Some(Dialect::Npm),
            ManagerType::Go => Some(Dialect::Go),
            ManagerType::Ruby => Some(Dialect::Gem),
            ManagerType::Composer => Some(Dialect::Composer),
            ManagerType::Maven | ManagerType::Gradle => None,
        }
    }

    fn is_verb(&self, token: &str) -> bool {
        match self {
            Dialect::Pip => token == "install",
            Dialect::Conda => matches!(token, "install" | "create" | "update"),
            Dialect::Npm => matches!(token, "install" | "i" | "add" | "isntall"),
            Dialect::Go => matches!(token, "get" | "install"),
            Dialect::Gem => token == "install",
            Dialect::Composer => token == "require",
        }
    }

    /// Flags whose value is the following token.
    fn takes_value(&self, flag: &str) -> bool {
        let flags: &[&str] = match self {
            Dialect::Pip => &[
                "-r", "--requirement", "-c", "--constraint", "-e", "--editable", "-i",
                "--index-url", "--extra-index-url", "-f", "--find-links", "-t", "--target",
                "--prefix", "--root", "--src", "--trusted-host", "--platform",
                "--python-version", "--implementation", "--abi", "--cache-dir", "--log",
                "--proxy", "--timeout", "--retries", "--progress-bar", "--upgrade-strategy",
                "--only-binary", "--no-binary", "--global-option", "-C", "--config-settings",
            ],
            Dialect::Conda => &[
                "-n", "--name", "-c", "--channel", "-p", "--prefix", "--file", "-f",
            ],
            Dialect::Npm => &[
                "--registry", "--prefix", "-w", "--workspace", "--tag", "--cache",
                "--userconfig", "--loglevel",
            ],
            Dialect::Go => &["-C", "-modfile", "-tags", "-ldflags", "-gcflags", "-o"],
            Dialect::Gem => &["-i", "--install-dir", "-s", "--source", "-n", "--bindir", "--platform"],
            Dialect::Composer => &["-d", "--working-dir"],
        };
        flags.contains(&flag)
    }

    /// Splits a package token into name and raw version text.
    fn split<'a>(&self, token: &'a str) -> (&'a str, &'a str) {
        match self {
            Dialect::Pip => split_requirement(token),
            Dialect::Conda => {
                let token = token.rsplit("::").next().unwrap_or(token);
                let (name, version) = split_requirement(token);
                (name, version.strip_prefix('=').unwrap_or(version))
            }
            Dialect::Npm => match token.rfind('@') {
                Some(idx) if idx > 0 => (&token[..idx], &token[idx + 1..]),
                _ => (token, ""),
            },
            Dialect::Go => token.split_once('@').unwrap_or((token, "")),
            Dialect::Gem => token.split_once(':').unwrap_or((token, "")),
            Dialect::Composer => token
                .split_once([':', '='])
                .unwrap_or((token, "")),
        }
    }
}

/// Splits a PEP 508-ish requirement (`name[extra]==1.2; marker`).
///
/// `==` pins keep only the version; other operators stay in the version text.
/// `name@ref` and `name @ url` return the reference as the version text, which
/// the caller validates.
pub(crate) fn split_requirement(token: &str) -> (&str, &str) {
    let token = token.split(';').next().unwrap_or(token).trim();
    if let Some((name, reference)) = token.split_once('@') {
        return (strip_extras(name).trim(), reference.trim());
    }
    let (name, rest) = match token.find(['=', '<', '>', '!', '~']) {
        Some(idx) => (&token[..idx], &token[idx..]),
        None => (token, ""),
    };
    let name = strip_extras(name);
    let version = rest
        .strip_prefix("===")
        .or_else(|| rest.strip_prefix("=="))
        .unwrap_or(rest);
    (name.trim(), version.trim())
}

fn strip_extras(name: &str) -> &str {
    match name.find('[') {
        Some(idx) => &name[..idx],
        None => name,
    }
}

/// Splits on whitespace outside single or double quotes. Quotes stay on the
/// token; an unterminated quote runs to the end of the line.
fn shell_tokens(line: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;
    let mut quote: Option<char> = None;

    for (idx, c) in line.char_indices() {
        match quote {
            Some(open) => {
                if c == open {
                    quote = None;
                }
            }
            None if c.is_whitespace() => {
                if let Some(from) = start.take() {
                    tokens.push(&line[from..idx]);
                }
            }
            None => {
                start.get_or_insert(idx);
                if matches!(c, '"' | '\'') {
                    quote = Some(c);
                }
            }
        }
    }
    if let Some(from) = start {
        tokens.push(&line[from..]);
    }
    tokens
}

/// Joins backslash-continued lines into single logical lines.
///
/// A trailing backslash with nothing after it is dropped.
pub fn join_continuations(text: &str) -> String {
    let mut joined = String::with_capacity(text.len());
    for line in text.lines() {
        let trimmed = line.trim_end();
        match trimmed.strip_suffix('\\') {
            Some(head) => {
                joined.push_str(head.trim_end());
                joined.push(' ');
            }
            None => {
                joined.push_str(line);
                joined.push('\n');
            }
        }
    }
    joined.trim_end().to_string()
}

/// The logical command line starting at byte offset `start` of `text`.
///
/// Follows up to ten backslash continuations and stops at a blank line.
pub fn logical_line(text: &str, start: usize) -> String {
    let Some(rest) = text.get(start..) else {
        return String::new();
    };

    let mut lines = rest.lines();
    let mut command = String::new();
    let mut current = lines.next().unwrap_or_default();

    for _ in 0..=MAX_CONTINUATIONS {
        let trimmed = current.trim_end();
        match trimmed.strip_suffix('\\') {
            Some(head) => {
                command.push_str(head.trim());
                command.push(' ');
                match lines.next() {
                    Some(next) if !next.trim().is_empty() => current = next,
                    _ => break,
                }
            }
            None => {
                command.push_str(trimmed.trim_start());
                break;
            }
        }
    }

    command.trim().to_string()
}

enum Pending {
    Nothing,
    SkipValue,
    GemVersion,
}

/// Extracts the packages named by an install command.
///
/// Flags are skipped, together with their value when the flag takes one.
/// Tokens carrying `==`, `@`, `>=`-style operators split into name and
/// version; bare tokens are name candidates checked by the validator. Never
/// fails: unparseable input yields an empty list.
pub fn extract_packages_from_command(command_text: &str, kind: ManagerType) -> Vec<Dependency> {
    let joined = join_continuations(command_text);
    let mut packages = Vec::new();

    for line in joined.lines() {
        tokenize_line(line.trim(), kind, &mut packages);
    }

    packages
}

fn tokenize_line(line: &str, kind: ManagerType, out: &mut Vec<Dependency>) {
    let tokens = shell_tokens(line);
    let Some(dialect) = Dialect::detect(&tokens, kind) else {
        return;
    };

    let start = tokens
        .iter()
        .position(|t| dialect.is_verb(t))
        .map(|idx| idx + 1)
        .unwrap_or(0);

    let first_new = out.len();
    let mut pending = Pending::Nothing;

    for raw in &tokens[start..] {
        if SEPARATORS.contains(raw) || raw.starts_with('#') || raw.starts_with('>') {
            break;
        }
        let (raw, ends_command) = match raw.strip_suffix(';') {
            Some(head) => (head, true),
            None => (*raw, false),
        };
        let token = raw.trim_matches(|c| matches!(c, '"' | '\'' | '`' | ',' | '(' | ')'));

        match std::mem::replace(&mut pending, Pending::Nothing) {
            Pending::SkipValue => {
                if ends_command {
                    break;
                }
                continue;
            }
            Pending::GemVersion => {
                attach_version(&mut out[first_new..], token);
                if ends_command {
                    break;
                }
                continue;
            }
            Pending::Nothing => {}
        }

        if token.starts_with('-') {
            if dialect == Dialect::Gem && matches!(token, "-v" | "--version") {
                pending = Pending::GemVersion;
            } else if !token.contains('=') && dialect.takes_value(token) {
                pending = Pending::SkipValue;
            }
        } else if dialect == Dialect::Composer && looks_like_constraint(token) {
            attach_version(&mut out[first_new..], token);
        } else if !token.is_empty() {
            let (name, version) = dialect.split(token);
            if is_valid_name(name, kind) {
                let version = if is_valid_version(version) { version } else { "" };
                out.push(Dependency::new(name, version, kind, line));
            }
        }

        if ends_command {
            break;
        }
    }
}

fn looks_like_constraint(token: &str) -> bool {
    token.starts_with(|c: char| c.is_ascii_digit() || matches!(c, '^' | '~' | '<' | '>' | '=' | '*'))
        && is_valid_version(token)
}

/// Gives `version` to the most recent package still lacking one.
fn attach_version(recent: &mut [Dependency], version: &str) {
    if !is_valid_version(version) {
        return;
    }
    if let Some(last) = recent.last_mut() {
        if last.version.is_empty() {
            last.version = version.to_string();
        }
    }
}
