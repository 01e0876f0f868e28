use crate::identity::missing_mandatory;
use crate::paths::resolve_against;
use crate::{Error, Result};
use regex::Regex;
use sonar_runner_types::{RunConfiguration, keys};
use std::path::Path;
use walkdir::WalkDir;

/// Properties whose entries must be existing directories
const FOLDER_PROPERTIES: &[&str] = &[keys::SOURCES, keys::TESTS, keys::BINARIES];

/// Check that every configured folder and library exists under `base_dir`.
pub fn validate_project_layout(
    config: &RunConfiguration,
    base_dir: &Path,
    project_key: &str,
) -> Result<()> {
    if config.list(keys::SOURCES).is_empty() {
        return Err(missing_mandatory(project_key, &[keys::SOURCES]));
    }

    for property in FOLDER_PROPERTIES {
        for entry in config.list(property) {
            if !resolve_against(base_dir, entry).is_dir() {
                return Err(Error::Configuration(format!(
                    "The folder '{}' does not exist for '{}'",
                    entry, project_key
                )));
            }
        }
    }

    for entry in config.list(keys::LIBRARIES) {
        if !library_exists(base_dir, entry) {
            return Err(Error::Configuration(format!(
                "No files nor directories matching '{}'",
                entry
            )));
        }
    }

    Ok(())
}

/// A library entry is a path whose last segment may hold `*` and `?` wildcards.
fn library_exists(base_dir: &Path, entry: &str) -> bool {
    let (parent, name) = match entry.rfind(['/', '\\']) {
        Some(idx) => (&entry[..idx], &entry[idx + 1..]),
        None => ("", entry),
    };

    if !is_pattern(name) {
        return resolve_against(base_dir, entry).exists();
    }

    let Some(matcher) = wildcard_regex(name) else {
        return false;
    };
    let dir = if parent.is_empty() {
        base_dir.to_path_buf()
    } else {
        resolve_against(base_dir, parent)
    };

    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .any(|e| matcher.is_match(&e.file_name().to_string_lossy()))
}

fn is_pattern(name: &str) -> bool {
    name.contains(['*', '?'])
}

fn wildcard_regex(pattern: &str) -> Option<Regex> {
    let mut expr = String::from("^");
    for c in pattern.chars() {
        match c {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            other => expr.push_str(&regex::escape(&other.to_string())),
        }
    }
    expr.push('$');
    Regex::new(&expr).ok()
}
