//! Dependency maps from JSON manifests (`package.json`, `composer.json`).

use serde_json::Value;

use super::validator::is_valid_name;
use crate::error::ParseError;
use crate::model::{Dependency, ManagerType};

/// Top-level manifest keys holding `{name: version}` maps, in read order.
const MANIFEST_SECTIONS: &[(&str, ManagerType)] = &[
    ("dependencies", ManagerType::Npm),
    ("devDependencies", ManagerType::Npm),
    ("peerDependencies", ManagerType::Npm),
    ("optionalDependencies", ManagerType::Npm),
    ("require", ManagerType::Composer),
    ("require-dev", ManagerType::Composer),
];

/// Parses `text` as JSON and collects entries of the known manifest sections.
///
/// Returns [`ParseError::NotJson`] when the text does not even start like a
/// JSON document and [`ParseError::JsonDecode`] when decoding fails; callers
/// treat both as "try the next strategy". A document that decodes but is not
/// an object, or has no known sections, yields an empty list.
pub fn parse_json_dependencies(text: &str) -> Result<Vec<Dependency>, ParseError> {
    let trimmed = text.trim_start_matches('\u{feff}').trim();
    if !trimmed.starts_with(['{', '[']) {
        return Err(ParseError::NotJson);
    }

    let document: Value =
        serde_json::from_str(trimmed).map_err(|e| ParseError::JsonDecode(e.to_string()))?;

    let Value::Object(root) = document else {
        return Ok(Vec::new());
    };

    let mut dependencies = Vec::new();
    for (section, kind) in MANIFEST_SECTIONS {
        let Some(Value::Object(entries)) = root.get(*section) else {
            continue;
        };

        for (name, version) in entries {
            // Nested override objects, numbers and nulls are not version strings.
            let Value::String(version) = version else {
                continue;
            };
            let name = name.trim();
            if !is_valid_name(name, *kind) {
                tracing::debug!(name, section, "skipping manifest entry with implausible name");
                continue;
            }
            let version = version.trim();
            dependencies.push(Dependency::new(
                name,
                version,
                *kind,
                format!("\"{}\": \"{}\"", name, version),
            ));
        }
    }

    Ok(dependencies)
}
