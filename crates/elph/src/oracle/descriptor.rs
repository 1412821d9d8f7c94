//! Oracle that reads dependencies from descriptors, following includes.

use super::{DependencyKind, DependencyOracle, OracleError};
use crate::descriptor::{clause_names, parse_properties, BUILDPATH, DEPENDSON, INCLUDE, TESTPATH};
use crate::domain::Project;
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Maximum nesting of `-include` directives.
const MAX_INCLUDE_DEPTH: usize = 8;

/// Reads a project's full descriptor, includes merged, and reports the
/// dependency clauses it declares.
///
/// Build dependencies are `-buildpath` plus `-dependson`; test dependencies
/// are `-testpath`. Include paths may use `${workspace}`; a leading `-`
/// makes an include optional and a leading `~` keeps properties already set.
#[derive(Debug, Clone)]
pub struct DescriptorOracle {
    workspace_root: PathBuf,
    descriptor_file: String,
}

impl DescriptorOracle {
    /// Creates an oracle for the workspace at `workspace_root`.
    pub fn new(workspace_root: impl Into<PathBuf>, descriptor_file: impl Into<String>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            descriptor_file: descriptor_file.into(),
        }
    }

    async fn properties(&self, project: &Project) -> Result<BTreeMap<String, String>, OracleError> {
        let path = project.root.join(&self.descriptor_file);
        self.load(path, 0).await
    }

    fn load(
        &self,
        path: PathBuf,
        depth: usize,
    ) -> BoxFuture<'_, Result<BTreeMap<String, String>, OracleError>> {
        async move {
            if depth > MAX_INCLUDE_DEPTH {
                return Err(OracleError::IncludeDepth(path));
            }
            let text = tokio::fs::read_to_string(&path)
                .await
                .map_err(|source| OracleError::Read {
                    path: path.clone(),
                    source,
                })?;
            let mut props = parse_properties(&text);

            let Some(includes) = props.remove(INCLUDE) else {
                return Ok(props);
            };
            let base = path.parent().unwrap_or(Path::new("")).to_path_buf();

            for entry in clause_names(&self.expand(&includes)) {
                let (entry, optional, keep_existing) = include_flags(&entry);
                let target = base.join(entry);
                match self.load(target.clone(), depth + 1).await {
                    Ok(included) => merge(&mut props, included, keep_existing),
                    Err(OracleError::Read { .. }) if optional => {
                        tracing::debug!(path = %target.display(), "Optional include missing");
                    }
                    Err(e) => return Err(e),
                }
            }
            Ok(props)
        }
        .boxed()
    }

    fn expand(&self, value: &str) -> String {
        value.replace("${workspace}", &self.workspace_root.to_string_lossy())
    }

    async fn clauses(
        &self,
        project: &Project,
        kind: DependencyKind,
    ) -> Result<Vec<String>, OracleError> {
        let props = self.properties(project).await?;
        let keys: &[&str] = match kind {
            DependencyKind::Build => &[BUILDPATH, DEPENDSON],
            DependencyKind::Test => &[TESTPATH],
        };
        Ok(keys
            .iter()
            .filter_map(|key| props.get(*key))
            .flat_map(|value| clause_names(value))
            .collect())
    }
}

/// Strips the `-` and `~` prefixes from an include entry.
fn include_flags(entry: &str) -> (&str, bool, bool) {
    let mut rest = entry;
    let mut optional = false;
    let mut keep_existing = false;
    loop {
        if let Some(r) = rest.strip_prefix('-') {
            optional = true;
            rest = r;
        } else if let Some(r) = rest.strip_prefix('~') {
            keep_existing = true;
            rest = r;
        } else {
            return (rest, optional, keep_existing);
        }
    }
}

fn merge(props: &mut BTreeMap<String, String>, included: BTreeMap<String, String>, keep: bool) {
    for (key, value) in included {
        if keep {
            props.entry(key).or_insert(value);
        } else {
            props.insert(key, value);
        }
    }
}

#[async_trait]
impl DependencyOracle for DescriptorOracle {
    async fn build_dependencies(&self, project: &Project) -> Result<Vec<String>, OracleError> {
        self.clauses(project, DependencyKind::Build).await
    }

    async fn test_dependencies(&self, project: &Project) -> Result<Vec<String>, OracleError> {
        self.clauses(project, DependencyKind::Test).await
    }
}
