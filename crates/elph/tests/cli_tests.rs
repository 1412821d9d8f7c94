//! End-to-end tests for the elph binary.

mod common;
use common::{run_elph, TestWorkspace};

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Runs elph against `ws` with the given arguments.
fn run_in(ws: &TestWorkspace, args: &[&str]) -> std::process::Output {
    let root = ws.root().to_string_lossy().into_owned();
    let mut full = vec!["-w", root.as_str()];
    full.extend_from_slice(args);
    run_elph(&full)
}

fn json_names(output: &std::process::Output) -> Vec<String> {
    let paths: Vec<String> = serde_json::from_slice(&output.stdout).unwrap();
    paths
        .iter()
        .map(|p| {
            std::path::Path::new(p)
                .file_name()
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect()
}

#[test]
fn help_lists_commands() {
    let output = run_elph(&["--help"]);
    assert!(output.status.success());
    let text = stdout(&output);
    for command in ["init", "list", "deps", "users", "leaves", "order", "show", "reanalyze"] {
        assert!(text.contains(command), "missing {command} in help");
    }
}

#[test]
fn version_is_printed() {
    let output = run_elph(&["--version"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn init_writes_config_once() {
    let ws = TestWorkspace::new();

    let first = run_in(&ws, &["init"]);
    assert!(first.status.success(), "stderr: {}", stderr(&first));
    assert!(ws.path(".elph").join("config.yaml").is_file());
    assert!(ws.path(".elph").join(".gitignore").is_file());

    let second = run_in(&ws, &["init"]);
    assert!(!second.status.success());
    assert!(stderr(&second).contains("already exists"));
}

#[test]
fn list_prints_matching_projects() {
    let ws = TestWorkspace::standard();

    let output = run_in(&ws, &["list", "b*"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let lines: Vec<String> = stdout(&output).lines().map(str::to_string).collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("B  "));
    assert!(lines[1].starts_with("build.image  "));
}

#[test]
fn strict_list_fails_without_match() {
    let ws = TestWorkspace::standard();

    let lenient = run_in(&ws, &["list", "*nomatch*"]);
    assert!(lenient.status.success());
    assert_eq!(stdout(&lenient).trim(), "(no projects)");

    let strict = run_in(&ws, &["list", "--strict", "*nomatch*"]);
    assert!(!strict.status.success());
    assert!(stderr(&strict).contains("*nomatch*"));
}

#[test]
fn deps_json_is_in_build_order_and_caches_edges() {
    let ws = TestWorkspace::standard();

    let output = run_in(&ws, &["--json", "deps", "B"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(json_names(&output), ["cnf", "build.image", "A", "B"]);
    assert!(ws.cache_file().is_file());
}

#[test]
fn deps_skips_imported_projects() {
    let ws = TestWorkspace::standard();
    let imported = ws.root().join("imported.txt");
    std::fs::write(&imported, format!("{}\nbuild.image\n", ws.path("cnf").display())).unwrap();

    let output = run_in(
        &ws,
        &["--json", "deps", "A", "--imported", imported.to_str().unwrap()],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(json_names(&output), ["A"]);
}

#[test]
fn deps_with_users_adds_direct_users() {
    let ws = TestWorkspace::standard();

    let output = run_in(&ws, &["--json", "deps", "A", "--users"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(json_names(&output), ["cnf", "build.image", "A", "B"]);
}

#[test]
fn users_leaves_and_order() {
    let ws = TestWorkspace::standard();

    let users = run_in(&ws, &["--json", "users", "A"]);
    assert_eq!(json_names(&users), ["B"]);

    let leaves = run_in(&ws, &["--json", "leaves", "A", "B"]);
    assert_eq!(json_names(&leaves), ["A"]);

    let order = run_in(&ws, &["--json", "order", "B", "cnf"]);
    assert_eq!(json_names(&order), ["cnf", "B"]);
}

#[test]
fn show_prints_project() {
    let ws = TestWorkspace::standard();

    let output = run_in(&ws, &["--json", "show", "B"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["name"], "B");
    assert_eq!(value["is_no_bundle"], true);
    assert_eq!(value["dependencies"], serde_json::json!(["A", "cnf"]));
}

#[test]
fn show_unknown_project_fails() {
    let ws = TestWorkspace::standard();

    let output = run_in(&ws, &["show", "nope"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("nope"));
}

#[test]
fn reanalyze_reports_counts() {
    let ws = TestWorkspace::standard();

    let output = run_in(&ws, &["--json", "reanalyze"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["projects"], 4);
    assert!(ws.cache_file().is_file());
}

#[test]
fn missing_workspace_fails() {
    let ws = TestWorkspace::new();
    let missing = ws.path("missing");

    let output = run_elph(&["-w", missing.to_str().unwrap(), "list"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Cannot read workspace"));
}
