//! Boundary to the authoritative dependency source.
//!
//! The catalog treats the build tool as an oracle: given a project it returns
//! the names of the projects needed to build and test it. The oracle is
//! never retried; failures are logged and count as "no dependencies".

mod command;
mod descriptor;

pub use command::CommandOracle;
pub use descriptor::DescriptorOracle;

use crate::domain::Project;
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which dependency set to ask the oracle for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyKind {
    /// Needed to compile the project.
    Build,
    /// Needed to compile and run its tests.
    Test,
}

impl DependencyKind {
    /// Lowercase name, as substituted into oracle commands.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Test => "test",
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed oracle query.
#[derive(Debug, Error)]
pub enum OracleError {
    /// Reading a descriptor or include file failed.
    #[error("Cannot read {}: {source}", .path.display())]
    Read {
        /// The file being read.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// `-include` directives nest deeper than allowed.
    #[error("Include depth exceeded at {}", .0.display())]
    IncludeDepth(PathBuf),

    /// The oracle command could not be started.
    #[error("Failed to run oracle command: {0}")]
    Spawn(#[source] std::io::Error),

    /// The oracle command exited unsuccessfully.
    #[error("Oracle command exited with {status}: {stderr}")]
    CommandFailed {
        /// Exit status as reported by the OS.
        status: String,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// No command is configured.
    #[error("Oracle command is empty")]
    EmptyCommand,
}

/// Source of authoritative build and test dependencies.
///
/// Implementations return dependency *names*; the catalog resolves them and
/// drops the ones that name no known project.
#[async_trait]
pub trait DependencyOracle: Send + Sync {
    /// Names of the projects needed to build `project`.
    async fn build_dependencies(&self, project: &Project) -> Result<Vec<String>, OracleError>;

    /// Names of the projects needed to test `project`.
    async fn test_dependencies(&self, project: &Project) -> Result<Vec<String>, OracleError>;
}

/// Queries both dependency kinds and combines what succeeded.
///
/// A failure in either sub-query is logged as a warning naming the project
/// and treated as an empty result; the other result is still used.
pub async fn build_and_test_dependencies(
    oracle: &dyn DependencyOracle,
    project: &Project,
) -> Vec<String> {
    let (build, test) = futures::join!(
        oracle.build_dependencies(project),
        oracle.test_dependencies(project)
    );

    let mut names = Vec::new();
    for (kind, result) in [(DependencyKind::Build, build), (DependencyKind::Test, test)] {
        match result {
            Ok(deps) => names.extend(deps),
            Err(e) => tracing::warn!(
                project = %project.name,
                kind = %kind,
                error = %e,
                "Unable to determine dependencies"
            ),
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::time::SystemTime;

    struct HalfBroken;

    #[async_trait]
    impl DependencyOracle for HalfBroken {
        async fn build_dependencies(&self, _: &Project) -> Result<Vec<String>, OracleError> {
            Ok(vec!["lib".to_string()])
        }

        async fn test_dependencies(&self, _: &Project) -> Result<Vec<String>, OracleError> {
            Err(OracleError::EmptyCommand)
        }
    }

    fn project() -> Project {
        Project {
            name: "app".to_string(),
            symbolic_name: "app".to_string(),
            root: PathBuf::from("/ws/app"),
            initial_deps: BTreeSet::new(),
            is_no_bundle: false,
            publish_disabled: false,
            timestamp: SystemTime::UNIX_EPOCH,
        }
    }

    #[tokio::test]
    async fn failed_sub_query_keeps_the_other() {
        let deps = build_and_test_dependencies(&HalfBroken, &project()).await;
        assert_eq!(deps, vec!["lib".to_string()]);
    }

    #[test]
    fn kind_names() {
        assert_eq!(DependencyKind::Build.to_string(), "build");
        assert_eq!(DependencyKind::Test.to_string(), "test");
    }
}
