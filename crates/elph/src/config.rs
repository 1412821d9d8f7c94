//! Workspace configuration (`<settings>/config.yaml`).

use crate::catalog::{CatalogOptions, DEFAULT_ORACLE_CONCURRENCY};
use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Name of the settings directory inside a workspace.
pub const SETTINGS_DIR_NAME: &str = ".elph";

/// Name of the configuration file within the settings directory.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Default edge cache file name, relative to the settings directory.
pub const DEFAULT_CACHE_FILE: &str = "bnd-deps.cache";

/// Configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ElphConfig {
    /// File whose presence marks a directory as a project.
    #[serde(rename = "descriptor-file")]
    pub descriptor_file: String,

    /// Project every other project depends on.
    #[serde(rename = "config-root")]
    pub config_root: String,

    /// Project every bundle-producing project depends on.
    #[serde(rename = "build-image")]
    pub build_image: String,

    /// Edge cache, relative to the settings directory unless absolute.
    #[serde(rename = "cache-file")]
    pub cache_file: PathBuf,

    /// Dependency oracle settings.
    pub oracle: OracleConfig,
}

/// Oracle section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OracleConfig {
    /// External command to run instead of reading descriptors.
    ///
    /// Arguments may use `{project}`, `{kind}` and `{root}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,

    /// Maximum concurrent oracle queries.
    pub concurrency: usize,
}

impl Default for ElphConfig {
    fn default() -> Self {
        Self {
            descriptor_file: "bnd.bnd".to_string(),
            config_root: "cnf".to_string(),
            build_image: "build.image".to_string(),
            cache_file: PathBuf::from(DEFAULT_CACHE_FILE),
            oracle: OracleConfig::default(),
        }
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            command: None,
            concurrency: DEFAULT_ORACLE_CONCURRENCY.get(),
        }
    }
}

impl ElphConfig {
    /// Loads the configuration file, or the defaults if there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if a value is invalid.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No configuration file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first bad key.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let required = [
            ("descriptor-file", &self.descriptor_file),
            ("config-root", &self.config_root),
            ("build-image", &self.build_image),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key,
                    message: "must not be empty".to_string(),
                });
            }
        }
        if self.oracle.concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                key: "oracle.concurrency",
                message: "must be at least 1".to_string(),
            });
        }
        if self.oracle.command.as_ref().is_some_and(Vec::is_empty) {
            return Err(ConfigError::InvalidValue {
                key: "oracle.command",
                message: "must name a program".to_string(),
            });
        }
        Ok(())
    }

    /// Catalog options for a workspace whose settings live in `settings_dir`.
    #[must_use]
    pub fn catalog_options(&self, settings_dir: &Path) -> CatalogOptions {
        CatalogOptions {
            descriptor_file: self.descriptor_file.clone(),
            config_root: self.config_root.clone(),
            build_image: self.build_image.clone(),
            cache_file: Some(settings_dir.join(&self.cache_file)),
            oracle_concurrency: NonZeroUsize::new(self.oracle.concurrency)
                .unwrap_or(DEFAULT_ORACLE_CONCURRENCY),
            case_insensitive_globs: true,
        }
    }
}

/// The settings directory for `workspace`, unless overridden.
#[must_use]
pub fn settings_dir(workspace: &Path, override_dir: Option<&Path>) -> PathBuf {
    override_dir.map_or_else(|| workspace.join(SETTINGS_DIR_NAME), Path::to_path_buf)
}
