//! One-time enrichment of the graph with oracle edges, and the edge cache.
//!
//! Enrichment is a small state machine:
//!
//! ```text
//! Unenriched --ensure_enriched--> Enriching --> Enriched
//!      ^                                            |
//!      +------------------ reanalyze ---------------+
//! ```
//!
//! The state lives in an atomic so that queries on an enriched catalog never
//! touch the mutex. Transitions happen only while the mutex is held, so the
//! oracle is swept at most once per transition however many tasks ask.

use super::graph::NodeId;
use super::Catalog;
use crate::oracle::build_and_test_dependencies;
use elph_cache::{
    check_freshness, read_edges_resilient, write_edges_atomic, EdgeRecord, Freshness,
};
use futures::stream::{self, StreamExt};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::PoisonError;
use tokio::sync::Mutex;

/// Where a catalog stands with respect to oracle edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrichmentState {
    /// Only declared and synthetic edges are known.
    Unenriched,
    /// An oracle sweep is in progress.
    Enriching,
    /// Oracle edges are present, from a sweep or from the cache.
    Enriched,
}

impl EnrichmentState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Enriching,
            2 => Self::Enriched,
            _ => Self::Unenriched,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Unenriched => 0,
            Self::Enriching => 1,
            Self::Enriched => 2,
        }
    }
}

/// Synchronisation for enrichment.
#[derive(Debug, Default)]
pub(super) struct EnrichmentGate {
    state: AtomicU8,
    lock: Mutex<()>,
    sweeps: AtomicUsize,
}

impl EnrichmentGate {
    fn load(&self) -> EnrichmentState {
        EnrichmentState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn store(&self, state: EnrichmentState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }
}

impl Catalog {
    /// Current enrichment state.
    #[must_use]
    pub fn enrichment_state(&self) -> EnrichmentState {
        self.gate.load()
    }

    /// Number of oracle sweeps run by this catalog.
    #[must_use]
    pub fn oracle_sweeps(&self) -> usize {
        self.gate.sweeps.load(Ordering::Acquire)
    }

    /// Oracle edges currently in the graph, as `(source, target)` names,
    /// sorted.
    #[must_use]
    pub fn oracle_edges(&self) -> Vec<(String, String)> {
        self.oracle_edges
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|&(s, t)| (self.name_of(s).to_string(), self.name_of(t).to_string()))
            .collect()
    }

    /// Enriches the graph with oracle edges unless that already happened.
    ///
    /// Concurrent callers wait for a single sweep and all observe its
    /// result; none of them sees a partially enriched graph.
    pub async fn ensure_enriched(&self) {
        if self.gate.load() == EnrichmentState::Enriched {
            return;
        }
        let _guard = self.gate.lock.lock().await;
        if self.gate.load() == EnrichmentState::Enriched {
            return;
        }
        self.enrich().await;
    }

    /// Discards the oracle edges and sweeps the oracle again.
    ///
    /// Every project is re-queried and the cache file is overwritten.
    pub async fn reanalyze(&self) {
        let _guard = self.gate.lock.lock().await;
        self.gate.store(EnrichmentState::Unenriched);
        tracing::info!("Reanalyzing workspace dependencies");
        self.enrich().await;
    }

    /// Runs one sweep. Callers hold the gate lock.
    async fn enrich(&self) {
        self.gate.store(EnrichmentState::Enriching);
        self.gate.sweeps.fetch_add(1, Ordering::AcqRel);

        let oracle_edges = self.sweep().await;
        let mut graph = self.base.clone();
        for &(source, target) in &oracle_edges {
            graph.add_edge(source, target);
        }
        tracing::info!(
            oracle_edges = oracle_edges.len(),
            total_edges = graph.edge_count(),
            "Enrichment complete"
        );

        self.install(graph, oracle_edges);
        self.gate.store(EnrichmentState::Enriched);
        self.persist_cache().await;
    }

    /// Queries the oracle for every project and resolves the answers.
    async fn sweep(&self) -> BTreeSet<(NodeId, NodeId)> {
        let oracle = self.oracle.as_ref();
        let answers: Vec<(NodeId, Vec<String>)> = stream::iter(0..self.projects.len())
            .map(|id| {
                let project = &self.projects[id];
                async move { (id, build_and_test_dependencies(oracle, project).await) }
            })
            .buffer_unordered(self.options.oracle_concurrency.get())
            .collect()
            .await;

        let mut edges = BTreeSet::new();
        for (source, names) in answers {
            for name in names {
                match self.index.resolve_name(&name) {
                    Some(target) if target != source => {
                        edges.insert((source, target));
                    }
                    Some(_) => {}
                    None => tracing::debug!(
                        project = %self.name_of(source),
                        dependency = %name,
                        "Unresolved oracle dependency dropped"
                    ),
                }
            }
        }
        edges
    }

    /// Restores oracle edges from a fresh cache file.
    ///
    /// Called once during construction. Nothing here fails the catalog: an
    /// unusable cache just leaves it unenriched. A non-empty cache without a
    /// single valid line counts as unusable.
    pub(super) async fn restore_cache(&self) {
        let Some(path) = self.options.cache_file.as_deref() else {
            return;
        };

        let timestamps = self.projects.iter().map(|p| p.timestamp);
        match check_freshness(path, timestamps).await {
            Ok(Freshness::Fresh { .. }) => {}
            Ok(Freshness::Missing) => {
                tracing::debug!(cache = %path.display(), "No edge cache");
                return;
            }
            Ok(Freshness::Stale { .. }) => {
                tracing::info!(cache = %path.display(), "Edge cache is stale, ignoring it");
                return;
            }
            Err(e) => {
                tracing::warn!(cache = %path.display(), error = %e, "Cannot check edge cache");
                return;
            }
        }

        let (records, warnings) = match read_edges_resilient(path).await {
            Ok(read) => read,
            Err(e) => {
                tracing::warn!(cache = %path.display(), error = %e, "Cannot read edge cache");
                return;
            }
        };
        if records.is_empty() && !warnings.is_empty() {
            tracing::warn!(
                cache = %path.display(),
                skipped = warnings.len(),
                "Edge cache has no valid records, ignoring it"
            );
            return;
        }

        let mut oracle_edges = BTreeSet::new();
        for record in &records {
            match (
                self.index.resolve_name(&record.source),
                self.index.resolve_name(&record.target),
            ) {
                (Some(source), Some(target)) if source != target => {
                    oracle_edges.insert((source, target));
                }
                _ => tracing::debug!(edge = %record, "Cached edge does not resolve, skipped"),
            }
        }

        let mut graph = self.base.clone();
        for &(source, target) in &oracle_edges {
            graph.add_edge(source, target);
        }
        tracing::debug!(
            cache = %path.display(),
            restored = oracle_edges.len(),
            skipped = warnings.len(),
            "Restored oracle edges from cache"
        );
        self.install(graph, oracle_edges);
        self.gate.store(EnrichmentState::Enriched);
    }

    /// Rewrites the cache file with the current oracle edges.
    async fn persist_cache(&self) {
        let Some(path) = self.options.cache_file.as_deref() else {
            return;
        };
        let records = self.oracle_edge_records();
        if let Err(e) = write_edges_atomic(path, &records).await {
            tracing::warn!(cache = %path.display(), error = %e, "Cannot write edge cache");
        } else {
            tracing::debug!(cache = %path.display(), edges = records.len(), "Edge cache written");
        }
    }

    fn oracle_edge_records(&self) -> Vec<EdgeRecord> {
        self.oracle_edges()
            .into_iter()
            .map(|(source, target)| EdgeRecord::new(source, target))
            .collect()
    }
}
