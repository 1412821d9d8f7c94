//! Implementation of the `init` command.
//!
//! Creates the settings directory with a default configuration file. The
//! edge cache itself is written on first enrichment, not here.

use crate::config::{ElphConfig, CONFIG_FILE_NAME};
use crate::error::{ConfigError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Name of the gitignore file within the settings directory
pub const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Result of the init command
#[derive(Debug)]
pub struct InitResult {
    /// Path to the settings directory
    pub settings_dir: PathBuf,
    /// Path to the created config file
    pub config_file: PathBuf,
    /// Path to the created gitignore file
    pub gitignore_file: PathBuf,
}

/// Writes a default configuration into `settings_dir`.
///
/// # Errors
///
/// Returns an error if:
/// - A configuration file already exists there
/// - File system operations fail
pub async fn init(settings_dir: &Path) -> Result<InitResult> {
    let config_file = settings_dir.join(CONFIG_FILE_NAME);
    if fs::try_exists(&config_file).await? {
        return Err(ConfigError::AlreadyInitialized(config_file).into());
    }

    fs::create_dir_all(settings_dir).await?;

    let config = ElphConfig::default();
    config.save(&config_file).await?;

    // The cache is machine-specific; keep it out of version control
    let gitignore_file = settings_dir.join(GITIGNORE_FILE_NAME);
    let gitignore_content = format!(
        "# Elph dependency cache, regenerated on demand\n{}\n",
        config.cache_file.display()
    );
    fs::write(&gitignore_file, gitignore_content).await?;

    tracing::debug!(settings = %settings_dir.display(), "Initialized settings directory");

    Ok(InitResult {
        settings_dir: settings_dir.to_path_buf(),
        config_file,
        gitignore_file,
    })
}
