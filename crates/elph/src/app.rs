//! Application context for CLI command execution.
//!
//! This module provides the `App` struct that loads the workspace
//! configuration, picks the dependency oracle, and opens the catalog.
//!
//! # Example
//!
//! ```no_run
//! use elph::app::App;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::open(Path::new("."), None).await?;
//!     println!("{} projects", app.catalog().all_projects().len());
//!     Ok(())
//! }
//! ```

use crate::catalog::Catalog;
use crate::config::{settings_dir, ElphConfig, CONFIG_FILE_NAME};
use crate::error::Result;
use crate::oracle::{CommandOracle, DependencyOracle, DescriptorOracle};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Application context for CLI operations.
#[derive(Debug)]
pub struct App {
    workspace: PathBuf,
    settings_dir: PathBuf,
    config: ElphConfig,
    catalog: Catalog,
}

impl App {
    /// Opens the workspace at `workspace`.
    ///
    /// Settings are read from `settings_override` if given, otherwise from
    /// the workspace's `.elph` directory; a missing configuration file means
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration file exists but is invalid
    /// - The workspace directory cannot be listed
    pub async fn open(workspace: &Path, settings_override: Option<&Path>) -> Result<Self> {
        let settings_dir = settings_dir(workspace, settings_override);
        let config = ElphConfig::load(&settings_dir.join(CONFIG_FILE_NAME)).await?;

        let oracle: Arc<dyn DependencyOracle> = match &config.oracle.command {
            Some(template) => Arc::new(CommandOracle::new(workspace, template.clone())),
            None => Arc::new(DescriptorOracle::new(workspace, config.descriptor_file.clone())),
        };

        let catalog =
            Catalog::open(workspace, oracle, config.catalog_options(&settings_dir)).await?;

        Ok(Self {
            workspace: workspace.to_path_buf(),
            settings_dir,
            config,
            catalog,
        })
    }

    /// The project catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The effective configuration.
    #[must_use]
    pub fn config(&self) -> &ElphConfig {
        &self.config
    }

    /// The workspace directory.
    #[must_use]
    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    /// The settings directory.
    #[must_use]
    pub fn settings_dir(&self) -> &Path {
        &self.settings_dir
    }
}

/// Projects already imported into the IDE, identified by directory name.
///
/// The set is opaque to the catalog; it only filters results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportedSet {
    names: BTreeSet<String>,
}

impl ImportedSet {
    /// Builds a set from project paths or names.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = entries
            .into_iter()
            .filter_map(|entry| {
                let entry = entry.as_ref().trim();
                if entry.is_empty() || entry.starts_with('#') {
                    return None;
                }
                let base = Path::new(entry).file_name()?;
                Some(base.to_string_lossy().into_owned())
            })
            .collect();
        Self { names }
    }

    /// Reads a set from a file with one path or name per line.
    ///
    /// Blank lines and `#` comments are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        Ok(Self::from_entries(content.lines()))
    }

    /// Returns `true` if the project at `path` is imported.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        path.file_name()
            .is_some_and(|name| self.names.contains(name.to_string_lossy().as_ref()))
    }

    /// Drops already-imported projects from `paths`, keeping order.
    #[must_use]
    pub fn exclude(&self, paths: Vec<PathBuf>) -> Vec<PathBuf> {
        paths.into_iter().filter(|p| !self.contains(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn workspace() -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in ["cnf", "app"] {
            std::fs::create_dir(dir.path().join(name)).unwrap();
            std::fs::write(dir.path().join(name).join("bnd.bnd"), "").unwrap();
        }
        dir
    }

    #[tokio::test]
    async fn opens_workspace_without_settings() {
        let ws = workspace();

        let app = App::open(ws.path(), None).await.unwrap();

        assert_eq!(app.catalog().all_projects().len(), 2);
        assert!(app.settings_dir().ends_with(".elph"));
        assert_eq!(app.config(), &ElphConfig::default());
    }

    #[tokio::test]
    async fn honours_settings_override() {
        let ws = workspace();
        let settings = TempDir::new().unwrap();
        std::fs::write(
            settings.path().join(CONFIG_FILE_NAME),
            "descriptor-file: other.bnd\n",
        )
        .unwrap();

        let app = App::open(ws.path(), Some(settings.path())).await.unwrap();

        assert!(app.catalog().all_projects().is_empty());
    }

    #[tokio::test]
    async fn missing_workspace_fails() {
        let ws = TempDir::new().unwrap();
        let result = App::open(&ws.path().join("nope"), None).await;
        assert!(result.is_err());
    }

    #[test]
    fn imported_set_compares_directory_names() {
        let imported = ImportedSet::from_entries(["/ide/ws/app", "# comment", "", "lib"]);
        let paths = vec![
            PathBuf::from("/ws/app"),
            PathBuf::from("/ws/lib"),
            PathBuf::from("/ws/other"),
        ];
        assert_eq!(imported.exclude(paths), [PathBuf::from("/ws/other")]);
    }
}
