//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use elph::catalog::{Catalog, CatalogOptions};
use elph::domain::Project;
use elph::oracle::{DependencyOracle, OracleError};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// A temporary bnd workspace.
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Creates a project directory with the given descriptor text.
    pub fn project(&self, name: &str, descriptor: &str) -> PathBuf {
        let root = self.dir.path().join(name);
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("bnd.bnd"), descriptor).unwrap();
        root
    }

    /// Creates a project declaring `deps` on its build path.
    pub fn project_with_deps(&self, name: &str, deps: &[&str]) -> PathBuf {
        if deps.is_empty() {
            self.project(name, "")
        } else {
            self.project(name, &format!("-buildpath: {}\n", deps.join(", ")))
        }
    }

    /// Sets the descriptor's modification time.
    pub fn touch(&self, name: &str, time: SystemTime) {
        let file = fs::File::options()
            .write(true)
            .open(self.dir.path().join(name).join("bnd.bnd"))
            .unwrap();
        file.set_modified(time).unwrap();
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn cache_file(&self) -> PathBuf {
        self.dir.path().join(".elph").join("bnd-deps.cache")
    }

    /// Builds the `cnf`, `build.image`, `A`, `B` workspace.
    pub fn standard() -> Self {
        let ws = Self::new();
        ws.project("cnf", "");
        ws.project("build.image", "");
        ws.project_with_deps("A", &["cnf"]);
        ws.project("B", "-buildpath: A\n-nobundles: true\n");
        ws
    }
}

/// Options with the cache placed in the workspace settings directory.
pub fn cached_options(ws: &TestWorkspace) -> CatalogOptions {
    CatalogOptions {
        cache_file: Some(ws.cache_file()),
        ..CatalogOptions::default()
    }
}

pub async fn open(ws: &TestWorkspace, oracle: Arc<CountingOracle>) -> Catalog {
    Catalog::open(ws.root(), oracle, cached_options(ws))
        .await
        .expect("Failed to open catalog")
}

/// Oracle answering from a fixed table and counting calls.
#[derive(Default)]
pub struct CountingOracle {
    build: HashMap<String, Vec<String>>,
    test: HashMap<String, Vec<String>>,
    failing: BTreeSet<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl CountingOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(mut self, project: &str, deps: &[&str]) -> Self {
        self.build.insert(
            project.to_string(),
            deps.iter().map(|d| (*d).to_string()).collect(),
        );
        self
    }

    pub fn test(mut self, project: &str, deps: &[&str]) -> Self {
        self.test.insert(
            project.to_string(),
            deps.iter().map(|d| (*d).to_string()).collect(),
        );
        self
    }

    /// Makes every query for `project` fail.
    pub fn failing(mut self, project: &str) -> Self {
        self.failing.insert(project.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Total number of sub-queries answered so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn answer(
        &self,
        table: &HashMap<String, Vec<String>>,
        project: &Project,
    ) -> Result<Vec<String>, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(&project.name) {
            return Err(OracleError::EmptyCommand);
        }
        Ok(table.get(&project.name).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl DependencyOracle for CountingOracle {
    async fn build_dependencies(&self, project: &Project) -> Result<Vec<String>, OracleError> {
        self.answer(&self.build, project).await
    }

    async fn test_dependencies(&self, project: &Project) -> Result<Vec<String>, OracleError> {
        self.answer(&self.test, project).await
    }
}

/// Directory names of `paths`, for readable assertions.
pub fn names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

/// Run the elph binary with the given arguments
pub fn run_elph(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_elph"))
        .args(args)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute elph binary")
}
