//! Graph queries driving the import workflow.

use super::graph::{DepGraph, NodeId};
use super::Catalog;
use crate::domain::Project;
use crate::error::{Error, Result};
use std::collections::BTreeSet;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;

impl Catalog {
    /// Finds projects whose name, symbolic name or directory matches a glob.
    ///
    /// Supports `*`, `?`, `**` and character classes. An empty result, or a
    /// pattern that does not compile, is logged as a warning and yields an
    /// empty list. Does not enrich the graph.
    #[must_use]
    pub fn find_projects(&self, pattern: &str) -> Vec<PathBuf> {
        match self.find_projects_strict(pattern) {
            Ok(paths) => paths,
            Err(e) => {
                tracing::warn!("{e}");
                Vec::new()
            }
        }
    }

    /// Like [`find_projects`](Self::find_projects), but an empty result is an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoMatch`] if nothing matches, or
    /// [`Error::InvalidPattern`] if the glob does not compile.
    pub fn find_projects_strict(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let ids = self
            .index
            .glob(pattern, self.options.case_insensitive_globs)
            .map_err(|e| Error::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.kind().to_string(),
            })?;
        if ids.is_empty() {
            return Err(Error::NoMatch(pattern.to_string()));
        }
        Ok(self.sorted_roots(ids))
    }

    /// Union of [`find_projects_strict`](Self::find_projects_strict) over
    /// several patterns, sorted and deduplicated.
    ///
    /// # Errors
    ///
    /// Fails on the first pattern that matches nothing or does not compile.
    pub fn find_projects_all<S: AsRef<str>>(&self, patterns: &[S]) -> Result<Vec<PathBuf>> {
        let mut all = BTreeSet::new();
        for pattern in patterns {
            all.extend(self.find_projects_strict(pattern.as_ref())?);
        }
        Ok(all.into_iter().collect())
    }

    /// Returns the members of `subset` that depend on no other member.
    ///
    /// Results are sorted by path and at most `limit` long.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if a path does not identify a project.
    pub async fn leaves_of_subset(
        &self,
        subset: &[PathBuf],
        limit: NonZeroUsize,
    ) -> Result<Vec<PathBuf>> {
        self.ensure_enriched().await;
        let ids = self.resolve_paths(subset)?;
        let leaves = self.snapshot().leaves_within(&ids);
        let mut paths = self.sorted_roots(leaves);
        paths.truncate(limit.get());
        Ok(paths)
    }

    /// Returns the named projects and everything they transitively depend
    /// on, dependencies before dependents.
    ///
    /// Projects that are ready at the same time are ordered by name. Names
    /// that identify no project are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cycle`] if the dependency closure is cyclic.
    pub async fn required_project_paths<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<Vec<PathBuf>> {
        let (graph, closure) = self.project_and_dependency_subgraph(names).await;
        self.ordered_roots(&graph, &closure)
    }

    /// Returns the projects that directly depend on any of the named ones,
    /// sorted by path. Names that identify no project are ignored.
    pub async fn dependent_project_paths<S: AsRef<str>>(&self, names: &[S]) -> Vec<PathBuf> {
        self.ensure_enriched().await;
        let graph = self.snapshot();
        let dependents: BTreeSet<NodeId> = self
            .resolve_names_lenient(names)
            .into_iter()
            .flat_map(|id| graph.predecessors(id))
            .collect();
        self.sorted_roots(dependents)
    }

    /// Orders the given projects so dependencies come first, without adding
    /// anything they depend on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if a path does not identify a project, or
    /// [`Error::Cycle`] if the projects depend on each other in a cycle.
    pub async fn in_topological_order(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        self.ensure_enriched().await;
        let ids = self.resolve_paths(paths)?;
        self.ordered_roots(&self.snapshot(), &ids)
    }

    /// The direct dependencies of the named project, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no project has that name.
    pub async fn dependencies_of(&self, name: &str) -> Result<Vec<&Project>> {
        let id = self
            .index
            .lookup_name(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;
        self.ensure_enriched().await;
        Ok(self
            .snapshot()
            .successors(id)
            .map(|dep| &self.projects[dep])
            .collect())
    }

    /// The named projects plus everything reachable from them.
    ///
    /// This is the single reachability primitive behind the closure
    /// queries. Unknown names are dropped. Returns the graph snapshot the
    /// closure was computed on so callers can keep querying the same one.
    pub(crate) async fn project_and_dependency_subgraph<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> (Arc<DepGraph>, BTreeSet<NodeId>) {
        self.ensure_enriched().await;
        let start = self.resolve_names_lenient(names);
        let graph = self.snapshot();
        let closure = graph.reachable_from(start);
        (graph, closure)
    }

    fn resolve_names_lenient<S: AsRef<str>>(&self, names: &[S]) -> Vec<NodeId> {
        names
            .iter()
            .filter_map(|name| {
                let name = name.as_ref();
                let id = self.index.lookup_name(name);
                if id.is_none() {
                    tracing::debug!(project = %name, "Unknown project ignored");
                }
                id
            })
            .collect()
    }

    fn resolve_paths(&self, paths: &[PathBuf]) -> Result<BTreeSet<NodeId>> {
        paths
            .iter()
            .map(|path| {
                self.index
                    .lookup_path(path)
                    .ok_or_else(|| Error::NotFound(path.display().to_string()))
            })
            .collect()
    }

    fn ordered_roots(&self, graph: &DepGraph, ids: &BTreeSet<NodeId>) -> Result<Vec<PathBuf>> {
        match graph.topo_order(ids, |id| self.name_of(id)) {
            Ok(order) => Ok(order.into_iter().map(|id| self.root_of(id)).collect()),
            Err(stuck) => Err(Error::Cycle {
                projects: stuck
                    .into_iter()
                    .map(|id| self.name_of(id).to_string())
                    .collect(),
            }),
        }
    }

    fn sorted_roots(&self, ids: impl IntoIterator<Item = NodeId>) -> Vec<PathBuf> {
        let roots: BTreeSet<PathBuf> = ids.into_iter().map(|id| self.root_of(id)).collect();
        roots.into_iter().collect()
    }
}
