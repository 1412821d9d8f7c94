//! The project dependency catalog.
//!
//! A [`Catalog`] is built once per workspace. Construction scans the
//! workspace for project directories, indexes them, and adds the cheap
//! edges:
//!
//! - *declared* edges from each descriptor's `-buildpath`,
//! - *synthetic* edges to the configuration root and the build image,
//!
//! then tries to restore authoritative oracle edges from the edge cache.
//! Queries that need authoritative dependencies enrich the graph first,
//! exactly once per catalog unless [`Catalog::reanalyze`] forces a rerun.
//!
//! # Example
//!
//! ```no_run
//! use elph::catalog::{Catalog, CatalogOptions};
//! use elph::oracle::DescriptorOracle;
//! use std::sync::Arc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let oracle = Arc::new(DescriptorOracle::new("/ws", "bnd.bnd"));
//!     let catalog = Catalog::open("/ws", oracle, CatalogOptions::default()).await?;
//!     for path in catalog.required_project_paths(&["com.example.app"]).await? {
//!         println!("{}", path.display());
//!     }
//!     Ok(())
//! }
//! ```

mod enrichment;
pub mod graph;
mod index;
mod queries;

pub use enrichment::EnrichmentState;

use crate::descriptor::load_project;
use crate::domain::Project;
use crate::error::{Error, Result};
use crate::oracle::DependencyOracle;
use enrichment::EnrichmentGate;
use futures::stream::{self, StreamExt};
use graph::{DepGraph, NodeId};
use index::ProjectIndex;
use std::collections::BTreeSet;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Descriptors read concurrently during the workspace scan.
const SCAN_CONCURRENCY: usize = 16;

/// Oracle queries in flight during enrichment, unless configured.
pub const DEFAULT_ORACLE_CONCURRENCY: NonZeroUsize = match NonZeroUsize::new(8) {
    Some(n) => n,
    None => unreachable!(),
};

/// Settings for [`Catalog::open`].
#[derive(Debug, Clone)]
pub struct CatalogOptions {
    /// File whose presence marks a directory as a project.
    pub descriptor_file: String,
    /// Project every other project depends on.
    pub config_root: String,
    /// Project every bundle-producing project depends on.
    pub build_image: String,
    /// Where oracle edges are persisted; `None` disables the cache.
    pub cache_file: Option<PathBuf>,
    /// Maximum concurrent oracle queries.
    pub oracle_concurrency: NonZeroUsize,
    /// Whether glob lookups ignore case.
    pub case_insensitive_globs: bool,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            descriptor_file: "bnd.bnd".to_string(),
            config_root: "cnf".to_string(),
            build_image: "build.image".to_string(),
            cache_file: None,
            oracle_concurrency: DEFAULT_ORACLE_CONCURRENCY,
            case_insensitive_globs: true,
        }
    }
}

/// Directed dependency graph over every project of one workspace.
///
/// The project set is fixed at construction. Only enrichment changes the
/// graph afterwards, and it swaps in a complete new graph, so readers see
/// either the graph before enrichment or the one after it.
pub struct Catalog {
    workspace_root: PathBuf,
    options: CatalogOptions,
    /// Arena of projects, sorted by name; a project's index is its [`NodeId`].
    projects: Vec<Project>,
    index: ProjectIndex,
    /// Declared and synthetic edges only.
    base: DepGraph,
    /// `base` plus the current oracle edges.
    graph: RwLock<Arc<DepGraph>>,
    /// Edges contributed by the oracle, as persisted in the cache.
    oracle_edges: RwLock<BTreeSet<(NodeId, NodeId)>>,
    oracle: Arc<dyn DependencyOracle>,
    gate: EnrichmentGate,
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("workspace_root", &self.workspace_root)
            .field("projects", &self.projects.len())
            .field("oracle", &"<dyn DependencyOracle>")
            .field("state", &self.enrichment_state())
            .finish_non_exhaustive()
    }
}

impl Catalog {
    /// Scans `workspace_root` and builds the catalog.
    ///
    /// Every immediate subdirectory containing the descriptor file becomes a
    /// project. If a cache file is configured and no descriptor is newer
    /// than it, its oracle edges are restored and the catalog starts out
    /// enriched; cache problems are logged and never fail construction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Construction`] if the workspace root cannot be listed.
    pub async fn open(
        workspace_root: impl Into<PathBuf>,
        oracle: Arc<dyn DependencyOracle>,
        options: CatalogOptions,
    ) -> Result<Self> {
        let workspace_root = workspace_root.into();
        let roots = scan_project_dirs(&workspace_root, &options.descriptor_file).await?;

        let mut projects: Vec<Project> = stream::iter(roots)
            .map(|root| load_project(root, &options.descriptor_file))
            .buffered(SCAN_CONCURRENCY)
            .collect()
            .await;
        projects.sort();

        let index = ProjectIndex::build(&projects);
        let base = static_edges(&projects, &index, &options);

        tracing::info!(
            workspace = %workspace_root.display(),
            projects = projects.len(),
            edges = base.edge_count(),
            "Catalog built"
        );

        let catalog = Self {
            graph: RwLock::new(Arc::new(base.clone())),
            workspace_root,
            options,
            projects,
            index,
            base,
            oracle_edges: RwLock::new(BTreeSet::new()),
            oracle,
            gate: EnrichmentGate::default(),
        };
        catalog.restore_cache().await;
        Ok(catalog)
    }

    /// The scanned workspace directory.
    #[must_use]
    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// The options the catalog was opened with.
    #[must_use]
    pub fn options(&self) -> &CatalogOptions {
        &self.options
    }

    /// All projects, sorted by name.
    #[must_use]
    pub fn all_projects(&self) -> &[Project] {
        &self.projects
    }

    /// Returns `true` if `name` (or a symbolic name) identifies a project.
    #[must_use]
    pub fn has_project(&self, name: &str) -> bool {
        self.index.lookup_name(name).is_some()
    }

    /// Looks up a project by name or symbolic name.
    #[must_use]
    pub fn project(&self, name: &str) -> Option<&Project> {
        self.index.lookup_name(name).map(|id| &self.projects[id])
    }

    /// The root directory of the named project.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no project has that name.
    pub fn project_root(&self, name: &str) -> Result<&Path> {
        self.project(name)
            .map(Project::root)
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    /// Human-readable details of the named project.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no project has that name.
    pub fn project_details(&self, name: &str) -> Result<String> {
        self.project(name)
            .map(Project::details)
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    /// Total number of edges in the current graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.snapshot().edge_count()
    }

    /// The current graph. The returned handle stays valid across a later
    /// enrichment; it just no longer reflects it.
    fn snapshot(&self) -> Arc<DepGraph> {
        Arc::clone(&self.graph.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn install(&self, graph: DepGraph, oracle_edges: BTreeSet<(NodeId, NodeId)>) {
        *self.graph.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(graph);
        *self
            .oracle_edges
            .write()
            .unwrap_or_else(PoisonError::into_inner) = oracle_edges;
    }

    fn root_of(&self, id: NodeId) -> PathBuf {
        self.projects[id].root.clone()
    }

    fn name_of(&self, id: NodeId) -> &str {
        &self.projects[id].name
    }
}

/// Lists the immediate subdirectories of `workspace_root` that contain a
/// descriptor file.
async fn scan_project_dirs(workspace_root: &Path, descriptor_file: &str) -> Result<Vec<PathBuf>> {
    let construction = |source: std::io::Error| Error::Construction {
        path: workspace_root.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(workspace_root)
        .await
        .map_err(construction)?;

    let mut roots = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(construction)? {
        let path = entry.path();
        let is_dir = tokio::fs::metadata(&path)
            .await
            .is_ok_and(|meta| meta.is_dir());
        if !is_dir {
            continue;
        }
        let has_descriptor = tokio::fs::metadata(path.join(descriptor_file))
            .await
            .is_ok_and(|meta| meta.is_file());
        if has_descriptor {
            roots.push(path);
        } else {
            tracing::trace!(dir = %path.display(), "Skipping directory without descriptor");
        }
    }
    Ok(roots)
}

/// Builds the declared and synthetic edges.
///
/// The configuration root gets no synthetic edges; every other project
/// depends on it, and bundle-producing projects also depend on the build
/// image.
fn static_edges(projects: &[Project], index: &ProjectIndex, options: &CatalogOptions) -> DepGraph {
    let mut graph = DepGraph::with_nodes(projects.len());
    let config_root = index.lookup_name(&options.config_root);
    let build_image = index.lookup_name(&options.build_image);

    for (id, project) in projects.iter().enumerate() {
        for dep in &project.initial_deps {
            match index.resolve_name(dep) {
                Some(target) => {
                    graph.add_edge(id, target);
                }
                None => tracing::debug!(
                    project = %project.name,
                    dependency = %dep,
                    "Unresolved declared dependency dropped"
                ),
            }
        }

        if Some(id) == config_root {
            continue;
        }
        if let Some(cnf) = config_root {
            graph.add_edge(id, cnf);
        }
        if let Some(image) = build_image
            && project.builds_bundle()
        {
            graph.add_edge(id, image);
        }
    }

    graph
}
