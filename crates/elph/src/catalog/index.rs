//! Name and path lookup tables over the project arena.

use super::graph::NodeId;
use crate::domain::Project;
use globset::GlobBuilder;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// Lookup tables built once at catalog construction.
#[derive(Debug, Default)]
pub(crate) struct ProjectIndex {
    /// `name` and, when different, `symbolic_name` of every project.
    by_name: HashMap<String, NodeId>,
    /// Relative-path keys: directory basenames and indexed names.
    by_path_key: BTreeMap<String, BTreeSet<NodeId>>,
    /// Absolute project roots.
    by_root: HashMap<PathBuf, NodeId>,
}

impl ProjectIndex {
    pub(crate) fn build(projects: &[Project]) -> Self {
        let mut index = Self::default();

        // Names first so a symbolic name never shadows another project's name
        for (id, project) in projects.iter().enumerate() {
            index.by_name.insert(project.name.clone(), id);
            index.by_root.insert(project.root.clone(), id);
        }
        for (id, project) in projects.iter().enumerate() {
            if project.symbolic_name_differs_from_name() {
                match index.by_name.get(&project.symbolic_name) {
                    Some(&other) if other != id => tracing::debug!(
                        project = %project.name,
                        symbolic_name = %project.symbolic_name,
                        "Symbolic name already taken, not indexed"
                    ),
                    _ => {
                        index.by_name.insert(project.symbolic_name.clone(), id);
                    }
                }
            }
        }

        for (key, &id) in &index.by_name {
            index.by_path_key.entry(key.clone()).or_default().insert(id);
        }
        for (id, project) in projects.iter().enumerate() {
            if let Some(base) = project.root.file_name() {
                index
                    .by_path_key
                    .entry(base.to_string_lossy().into_owned())
                    .or_default()
                    .insert(id);
            }
        }

        index
    }

    /// Resolves a dependency reference: exact name or symbolic name only.
    pub(crate) fn resolve_name(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    /// Resolves a name or symbolic name supplied by a user.
    ///
    /// Exact matches win; otherwise a unique case-insensitive match is used.
    pub(crate) fn lookup_name(&self, name: &str) -> Option<NodeId> {
        if let Some(id) = self.resolve_name(name) {
            return Some(id);
        }
        let mut matches = self
            .by_name
            .iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, &id)| id)
            .collect::<BTreeSet<_>>()
            .into_iter();
        match (matches.next(), matches.next()) {
            (Some(id), None) => Some(id),
            _ => None,
        }
    }

    /// Resolves a project handle: its root, or a path whose last component
    /// names a project.
    pub(crate) fn lookup_path(&self, path: &Path) -> Option<NodeId> {
        if let Some(&id) = self.by_root.get(path) {
            return Some(id);
        }
        let base = path.file_name()?.to_string_lossy();
        self.lookup_name(&base)
    }

    /// Projects with at least one path key matching `pattern`.
    pub(crate) fn glob(
        &self,
        pattern: &str,
        case_insensitive: bool,
    ) -> Result<BTreeSet<NodeId>, globset::Error> {
        let matcher = GlobBuilder::new(pattern)
            .case_insensitive(case_insensitive)
            .literal_separator(true)
            .build()?
            .compile_matcher();

        Ok(self
            .by_path_key
            .iter()
            .filter(|(key, _)| matcher.is_match(key.as_str()))
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect())
    }
}
