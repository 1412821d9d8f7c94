//! Oracle backed by an external command.

use super::{DependencyKind, DependencyOracle, OracleError};
use crate::domain::Project;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;

/// Runs a configured command once per project and dependency kind.
///
/// Arguments may contain the placeholders `{project}`, `{kind}` and
/// `{root}`. The command runs in the workspace root; its standard output is
/// a list of project names separated by commas or whitespace, each
/// optionally followed by `;attributes`.
#[derive(Debug, Clone)]
pub struct CommandOracle {
    workspace_root: PathBuf,
    template: Vec<String>,
}

impl CommandOracle {
    /// Creates an oracle running `template` in `workspace_root`.
    pub fn new(workspace_root: impl Into<PathBuf>, template: Vec<String>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            template,
        }
    }

    fn arguments(&self, project: &Project, kind: DependencyKind) -> Vec<String> {
        let root = project.root.to_string_lossy();
        self.template
            .iter()
            .map(|arg| {
                arg.replace("{project}", &project.name)
                    .replace("{kind}", kind.as_str())
                    .replace("{root}", &root)
            })
            .collect()
    }

    async fn run(
        &self,
        project: &Project,
        kind: DependencyKind,
    ) -> Result<Vec<String>, OracleError> {
        let args = self.arguments(project, kind);
        let (program, rest) = args.split_first().ok_or(OracleError::EmptyCommand)?;

        tracing::trace!(project = %project.name, %kind, command = ?args, "Running oracle command");
        let output = Command::new(program)
            .args(rest)
            .current_dir(&self.workspace_root)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(OracleError::Spawn)?;

        if !output.status.success() {
            return Err(OracleError::CommandFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(parse_names(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Splits command output into dependency names.
fn parse_names(stdout: &str) -> Vec<String> {
    stdout
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter_map(|token| {
            let name = token.split(';').next().unwrap_or_default().trim();
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}

#[async_trait]
impl DependencyOracle for CommandOracle {
    async fn build_dependencies(&self, project: &Project) -> Result<Vec<String>, OracleError> {
        self.run(project, DependencyKind::Build).await
    }

    async fn test_dependencies(&self, project: &Project) -> Result<Vec<String>, OracleError> {
        self.run(project, DependencyKind::Test).await
    }
}
