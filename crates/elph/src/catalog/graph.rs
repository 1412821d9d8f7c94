//! Dependency graph as an arena-indexed adjacency list.
//!
//! Nodes are projects, addressed by [`NodeId`] (their index in the catalog's
//! project arena). Edges point from **dependent -> dependency**: `a -> b`
//! means "a needs b to build or test". The graph is simple: at most one edge
//! per ordered pair and never a self-loop.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap, VecDeque};

/// Index of a project in the catalog arena.
pub type NodeId = usize;

/// A simple directed graph over a fixed node set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepGraph {
    /// Dependencies of each node.
    out_edges: Vec<BTreeSet<NodeId>>,
    /// Dependents of each node.
    in_edges: Vec<BTreeSet<NodeId>>,
}

impl DepGraph {
    /// Creates a graph with `nodes` nodes and no edges.
    #[must_use]
    pub fn with_nodes(nodes: usize) -> Self {
        Self {
            out_edges: vec![BTreeSet::new(); nodes],
            in_edges: vec![BTreeSet::new(); nodes],
        }
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.out_edges.len()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.out_edges.iter().map(BTreeSet::len).sum()
    }

    /// Adds `source -> target`.
    ///
    /// Returns `false` without changing the graph for a self-loop, a
    /// duplicate edge, or a node outside the graph.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId) -> bool {
        if source == target || source >= self.node_count() || target >= self.node_count() {
            return false;
        }
        if !self.out_edges[source].insert(target) {
            return false;
        }
        self.in_edges[target].insert(source);
        true
    }

    /// Returns `true` if `source -> target` exists.
    #[must_use]
    pub fn has_edge(&self, source: NodeId, target: NodeId) -> bool {
        self.out_edges
            .get(source)
            .is_some_and(|targets| targets.contains(&target))
    }

    /// Direct dependencies of `node`.
    pub fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.out_edges.get(node).into_iter().flatten().copied()
    }

    /// Direct dependents of `node`.
    pub fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.in_edges.get(node).into_iter().flatten().copied()
    }

    /// All edges in `(source, target)` order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.out_edges
            .iter()
            .enumerate()
            .flat_map(|(source, targets)| targets.iter().map(move |&target| (source, target)))
    }

    /// Nodes reachable from `start` by following edges forward, `start`
    /// included.
    ///
    /// Traversal is breadth-first, level by level, so every node is visited
    /// once however many paths lead to it.
    #[must_use]
    pub fn reachable_from(&self, start: impl IntoIterator<Item = NodeId>) -> BTreeSet<NodeId> {
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::new();

        for node in start {
            if node < self.node_count() && visited.insert(node) {
                queue.push_back(node);
            }
        }

        while let Some(current) = queue.pop_front() {
            for next in self.successors(current) {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        visited
    }

    /// Orders `nodes` so that every dependency comes before its dependents.
    ///
    /// Only edges between members of `nodes` are considered. When several
    /// nodes are ready at once, the one with the smallest `key` goes first,
    /// which makes the order deterministic.
    ///
    /// # Errors
    ///
    /// Returns the nodes that could not be ordered if the induced subgraph
    /// contains a cycle.
    pub fn topo_order<K, F>(
        &self,
        nodes: &BTreeSet<NodeId>,
        key: F,
    ) -> Result<Vec<NodeId>, Vec<NodeId>>
    where
        K: Ord,
        F: Fn(NodeId) -> K,
    {
        // Number of not-yet-emitted dependencies per node
        let mut pending: HashMap<NodeId, usize> = nodes
            .iter()
            .map(|&n| (n, self.successors(n).filter(|d| nodes.contains(d)).count()))
            .collect();

        let mut ready: BinaryHeap<Reverse<(K, NodeId)>> = pending
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(&n, _)| Reverse((key(n), n)))
            .collect();

        let mut order = Vec::with_capacity(nodes.len());
        while let Some(Reverse((_, node))) = ready.pop() {
            order.push(node);
            for dependent in self.predecessors(node) {
                if let Some(count) = pending.get_mut(&dependent) {
                    *count -= 1;
                    if *count == 0 {
                        ready.push(Reverse((key(dependent), dependent)));
                    }
                }
            }
        }

        if order.len() == nodes.len() {
            Ok(order)
        } else {
            let emitted: BTreeSet<NodeId> = order.into_iter().collect();
            Err(nodes.difference(&emitted).copied().collect())
        }
    }

    /// Nodes of `subset` with no edge to another member of `subset`.
    #[must_use]
    pub fn leaves_within(&self, subset: &BTreeSet<NodeId>) -> Vec<NodeId> {
        subset
            .iter()
            .copied()
            .filter(|&n| !self.successors(n).any(|d| subset.contains(&d)))
            .collect()
    }
}
