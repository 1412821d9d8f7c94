//! Reading of project descriptors (`bnd.bnd` files).
//!
//! Descriptors use a properties-like syntax. Only a handful of keys matter
//! to the catalog; everything else in the file is ignored.

use crate::domain::Project;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Key holding the bundle symbolic name.
pub const BUNDLE_SYMBOLIC_NAME: &str = "Bundle-SymbolicName";
/// Key listing compile-time dependencies.
pub const BUILDPATH: &str = "-buildpath";
/// Key listing test-time dependencies.
pub const TESTPATH: &str = "-testpath";
/// Key listing build-order-only dependencies.
pub const DEPENDSON: &str = "-dependson";
/// Key listing further descriptor fragments to merge.
pub const INCLUDE: &str = "-include";
/// Key marking a project that builds no bundle.
pub const NOBUNDLES: &str = "-nobundles";
/// Key marking a project whose jar is not published.
pub const PUBLISH_DISABLED: &str = "publish.wlp.jar.disabled";

/// Parses properties-style text into a key/value map.
///
/// Supports `key: value`, `key=value` and `key value` forms, `#` and `!`
/// comment lines, and trailing-backslash continuation lines. Later
/// definitions of the same key replace earlier ones.
#[must_use]
pub fn parse_properties(text: &str) -> BTreeMap<String, String> {
    let mut props = BTreeMap::new();
    let mut logical = String::new();

    for raw in text.lines() {
        let line = if logical.is_empty() {
            raw.trim_start()
        } else {
            raw.trim()
        };
        if logical.is_empty() && (line.is_empty() || line.starts_with('#') || line.starts_with('!'))
        {
            continue;
        }

        if let Some(stripped) = continued(line) {
            logical.push_str(stripped);
            continue;
        }
        logical.push_str(line);

        if let Some((key, value)) = split_entry(&logical) {
            props.insert(key.to_string(), value.to_string());
        }
        logical.clear();
    }

    if !logical.is_empty()
        && let Some((key, value)) = split_entry(&logical)
    {
        props.insert(key.to_string(), value.to_string());
    }

    props
}

/// Returns the line without its continuation backslash, if it has one.
///
/// An even number of trailing backslashes is an escaped backslash, not a
/// continuation.
fn continued(line: &str) -> Option<&str> {
    let trailing = line.bytes().rev().take_while(|&b| b == b'\\').count();
    if trailing % 2 == 1 {
        Some(&line[..line.len() - 1])
    } else {
        None
    }
}

fn split_entry(line: &str) -> Option<(&str, &str)> {
    let end = line.find(|c: char| c == '=' || c == ':' || c.is_whitespace())?;
    let key = &line[..end];
    if key.is_empty() {
        return None;
    }
    let mut rest = line[end..].trim_start();
    if let Some(after) = rest.strip_prefix('=').or_else(|| rest.strip_prefix(':')) {
        rest = after;
    }
    Some((key, rest.trim()))
}

/// Splits a clause list on commas that are not inside double quotes.
fn split_clauses(value: &str) -> Vec<&str> {
    let mut clauses = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (i, c) in value.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                clauses.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    clauses.push(&value[start..]);
    clauses
}

/// Returns the names of the clauses in a bnd list value.
///
/// `com.example.a;version=latest, com.example.b` yields `com.example.a` and
/// `com.example.b`. Clauses that are macro references (`${...}`) name no
/// project and are skipped.
#[must_use]
pub fn clause_names(value: &str) -> Vec<String> {
    split_clauses(value)
        .into_iter()
        .filter_map(|clause| {
            let name = clause.split(';').next().unwrap_or_default().trim();
            (!name.is_empty() && !name.contains("${")).then(|| name.to_string())
        })
        .collect()
}

/// Interprets a flag value the way bnd does: only `true` (any case) is set.
#[must_use]
pub fn is_true(value: Option<&String>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

/// Builds a [`Project`] from a project directory and its parsed descriptor.
#[must_use]
pub fn project_from_properties(
    root: PathBuf,
    props: &BTreeMap<String, String>,
    timestamp: SystemTime,
) -> Project {
    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let symbolic_name = props
        .get(BUNDLE_SYMBOLIC_NAME)
        .map(|bsn| bsn.split(';').next().unwrap_or_default().trim())
        .filter(|bsn| !bsn.is_empty() && !bsn.contains("${"))
        .map_or_else(|| name.clone(), str::to_string);

    let initial_deps: BTreeSet<String> = props
        .get(BUILDPATH)
        .map(|v| clause_names(v))
        .unwrap_or_default()
        .into_iter()
        .collect();

    Project {
        name,
        symbolic_name,
        root,
        initial_deps,
        is_no_bundle: is_true(props.get(NOBUNDLES)),
        publish_disabled: is_true(props.get(PUBLISH_DISABLED)),
        timestamp,
    }
}

/// Modification time of a file, or the epoch if it is not a readable file.
pub async fn last_modified(path: &Path) -> SystemTime {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        _ => SystemTime::UNIX_EPOCH,
    }
}

/// Reads the project in `root` from its descriptor file.
///
/// The descriptor is known to exist. If it cannot be read anyway, the
/// project is still returned with default fields and a warning is logged.
pub async fn load_project(root: PathBuf, descriptor_file: &str) -> Project {
    let path = root.join(descriptor_file);
    let timestamp = last_modified(&path).await;
    let props = match tokio::fs::read_to_string(&path).await {
        Ok(text) => parse_properties(&text),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Unable to read project descriptor");
            BTreeMap::new()
        }
    };
    project_from_properties(root, &props, timestamp)
}
