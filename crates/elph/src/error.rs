//! Error types for elph operations.
//!
//! Only [`Error::Construction`] is fatal to a catalog as a whole. Everything
//! below the catalog boundary (oracle failures, unresolved names, corrupt
//! cache lines) is logged and absorbed; the remaining variants describe a
//! single failed query.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The error type for elph operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The workspace root could not be listed.
    #[error("Cannot read workspace {}: {source}", .path.display())]
    Construction {
        /// The workspace root that was scanned.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: io::Error,
    },

    /// A project name or path does not match any project in the catalog.
    #[error("No project found with name \"{0}\"")]
    NotFound(String),

    /// A glob pattern matched nothing.
    #[error("No project found matching pattern \"{0}\"")]
    NoMatch(String),

    /// A glob pattern could not be compiled.
    #[error("Invalid pattern \"{pattern}\": {message}")]
    InvalidPattern {
        /// The pattern as supplied.
        pattern: String,
        /// Why it was rejected.
        message: String,
    },

    /// The requested projects depend on each other in a cycle.
    #[error("Circular dependency among projects: {}", .projects.join(", "))]
    Cycle {
        /// Names of the projects that could not be ordered.
        projects: Vec<String>,
    },

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be parsed.
    #[error("Invalid configuration in {}: {message}", .path.display())]
    Parse {
        /// The configuration file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// A configuration value is out of range.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue {
        /// The offending key.
        key: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// `init` found an existing configuration file.
    #[error("Configuration already exists at {}", .0.display())]
    AlreadyInitialized(PathBuf),

    /// The configuration could not be serialized.
    #[error("Failed to serialize configuration: {0}")]
    Serialize(String),
}

/// A specialized Result type for elph operations.
pub type Result<T> = std::result::Result<T, Error>;
