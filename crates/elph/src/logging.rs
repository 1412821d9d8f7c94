//! Logging set-up for the binary.
//!
//! Verbosity is an explicit value handed to [`init`] once at start-up;
//! library code only emits `tracing` events.

use tracing_subscriber::EnvFilter;

/// Crates whose events the verbosity setting controls.
const TARGETS: &[&str] = &["elph", "elph_cache"];

/// How chatty the tool is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Warnings and errors only.
    #[default]
    Off,
    /// Progress messages.
    Info,
    /// Detailed log output.
    Log,
    /// Everything, including per-edge tracing.
    Debug,
}

impl Verbosity {
    /// Maps a `-v` repeat count to a level.
    #[must_use]
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => Self::Off,
            1 => Self::Info,
            2 => Self::Log,
            _ => Self::Debug,
        }
    }

    fn level(self) -> &'static str {
        match self {
            Self::Off => "warn",
            Self::Info => "info",
            Self::Log => "debug",
            Self::Debug => "trace",
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogConfig {
    /// Requested verbosity.
    pub verbosity: Verbosity,
    /// Suppress everything below errors; wins over `verbosity`.
    pub quiet: bool,
}

impl LogConfig {
    /// Builds the configuration from command-line flags.
    #[must_use]
    pub fn from_flags(verbose: u8, quiet: bool) -> Self {
        Self {
            verbosity: Verbosity::from_count(verbose),
            quiet,
        }
    }

    /// The filter directives this configuration stands for.
    #[must_use]
    pub fn directives(&self) -> String {
        let level = if self.quiet {
            "error"
        } else {
            self.verbosity.level()
        };
        TARGETS
            .iter()
            .map(|target| format!("{target}={level}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Installs the global subscriber, writing to stderr.
///
/// `RUST_LOG` overrides the configuration when set.
pub fn init(config: LogConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.directives()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
