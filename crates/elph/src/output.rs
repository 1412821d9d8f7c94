//! Output formatting for CLI commands.
//!
//! Every command prints either human-readable text or pretty JSON. Text
//! writers take any [`Write`] so they can be tested without a terminal.

use crate::domain::Project;
use colored::Colorize;
use serde::Serialize;
use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

/// Configuration for text output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Reads `NO_COLOR` and `ELPH_COLOR` (`0`/`false` disables colors).
    #[must_use]
    pub fn from_env() -> Self {
        // Respect NO_COLOR standard (https://no-color.org/)
        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("ELPH_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);
        Self { use_colors }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { use_colors: true }
    }
}

fn paint(text: &str, config: &OutputConfig, style: fn(&str) -> colored::ColoredString) -> String {
    if config.use_colors {
        style(text).to_string()
    } else {
        text.to_string()
    }
}

/// Apply semantic "success" color (green) to text.
#[must_use]
pub fn success(text: &str, config: &OutputConfig) -> String {
    paint(text, config, |t| t.green())
}

/// Apply semantic "warning" color (yellow) to text.
#[must_use]
pub fn warning(text: &str, config: &OutputConfig) -> String {
    paint(text, config, |t| t.yellow())
}

/// Apply semantic "info" color (cyan) to text.
#[must_use]
pub fn info(text: &str, config: &OutputConfig) -> String {
    paint(text, config, |t| t.cyan())
}

fn dimmed(text: &str, config: &OutputConfig) -> String {
    paint(text, config, |t| t.dimmed())
}

fn bold(text: &str, config: &OutputConfig) -> String {
    paint(text, config, |t| t.bold())
}

/// Print a value as pretty JSON
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_json(&mut handle, value)
}

fn write_json<W: Write, T: Serialize>(w: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(w, "{json}")
}

/// Print a list of project roots
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn print_paths(paths: &[PathBuf], mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match mode {
        OutputMode::Text => write_paths_text(&mut handle, paths, &OutputConfig::from_env()),
        OutputMode::Json => write_json(&mut handle, &paths),
    }
}

fn write_paths_text<W: Write>(
    w: &mut W,
    paths: &[PathBuf],
    config: &OutputConfig,
) -> io::Result<()> {
    if paths.is_empty() {
        return writeln!(w, "{}", dimmed("(no projects)", config));
    }
    for path in paths {
        writeln!(
            w,
            "{}  {}",
            info(&file_name(path), config),
            dimmed(&path.display().to_string(), config)
        )?;
    }
    Ok(())
}

#[derive(Serialize)]
struct ProjectJson<'a> {
    #[serde(flatten)]
    project: &'a Project,
    dependencies: Vec<&'a str>,
    dependents: Vec<String>,
}

/// Print a project with its direct dependencies and dependents
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn print_project(
    project: &Project,
    dependencies: &[&Project],
    dependents: &[PathBuf],
    mode: OutputMode,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match mode {
        OutputMode::Text => write_project_text(
            &mut handle,
            project,
            dependencies,
            dependents,
            &OutputConfig::from_env(),
        ),
        OutputMode::Json => write_json(
            &mut handle,
            &ProjectJson {
                project,
                dependencies: dependencies.iter().map(|p| p.name.as_str()).collect(),
                dependents: dependents.iter().map(|p| file_name(p)).collect(),
            },
        ),
    }
}

fn write_project_text<W: Write>(
    w: &mut W,
    project: &Project,
    dependencies: &[&Project],
    dependents: &[PathBuf],
    config: &OutputConfig,
) -> io::Result<()> {
    write!(w, "{}", project.details())?;

    writeln!(w, "  {}", bold("dependencies:", config))?;
    if dependencies.is_empty() {
        writeln!(w, "    {}", dimmed("(none)", config))?;
    }
    for dep in dependencies {
        writeln!(w, "    {}", info(&dep.name, config))?;
    }

    writeln!(w, "  {}", bold("used by:", config))?;
    if dependents.is_empty() {
        writeln!(w, "    {}", dimmed("(none)", config))?;
    }
    for path in dependents {
        writeln!(w, "    {}", info(&file_name(path), config))?;
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::time::SystemTime;

    fn plain() -> OutputConfig {
        OutputConfig { use_colors: false }
    }

    fn project(name: &str) -> Project {
        Project {
            name: name.to_string(),
            symbolic_name: name.to_string(),
            root: PathBuf::from("/ws").join(name),
            initial_deps: BTreeSet::new(),
            is_no_bundle: false,
            publish_disabled: false,
            timestamp: SystemTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn paths_text_shows_name_and_root() {
        let mut out = Vec::new();
        write_paths_text(&mut out, &[PathBuf::from("/ws/app")], &plain()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "app  /ws/app\n");
    }

    #[test]
    fn empty_paths_text() {
        let mut out = Vec::new();
        write_paths_text(&mut out, &[], &plain()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "(no projects)\n");
    }

    #[test]
    fn paths_json_is_an_array() {
        let mut out = Vec::new();
        write_json(&mut out, &vec![PathBuf::from("/ws/a"), PathBuf::from("/ws/b")]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value, serde_json::json!(["/ws/a", "/ws/b"]));
    }

    #[test]
    fn project_text_lists_edges() {
        let lib = project("lib");
        let mut out = Vec::new();
        write_project_text(
            &mut out,
            &project("app"),
            &[&lib],
            &[PathBuf::from("/ws/tests")],
            &plain(),
        )
        .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("app\n"));
        assert!(text.contains("  dependencies:\n    lib\n"));
        assert!(text.contains("  used by:\n    tests\n"));
    }

    #[test]
    fn project_json_flattens_fields() {
        let app = project("app");
        let lib = project("lib");
        let mut out = Vec::new();
        write_json(
            &mut out,
            &ProjectJson {
                project: &app,
                dependencies: vec![lib.name.as_str()],
                dependents: Vec::new(),
            },
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["name"], "app");
        assert_eq!(value["dependencies"], serde_json::json!(["lib"]));
        assert_eq!(value["is_no_bundle"], false);
    }

    #[test]
    fn colors_can_be_disabled() {
        assert_eq!(success("ok", &plain()), "ok");
        assert_eq!(warning("careful", &plain()), "careful");
    }
}
