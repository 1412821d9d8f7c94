//! Property tests for ordering and leaf queries over random acyclic
//! workspaces.

use elph::catalog::Catalog;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;

mod common;
use common::{names, open, CountingOracle, TestWorkspace};

/// A random DAG: `deps[i]` holds indices below `i`.
#[derive(Debug, Clone)]
struct Dag {
    deps: Vec<BTreeSet<usize>>,
}

impl Dag {
    fn name(i: usize) -> String {
        format!("p{i:02}")
    }

    fn edges(&self) -> impl Iterator<Item = (String, String)> + '_ {
        self.deps.iter().enumerate().flat_map(|(i, deps)| {
            deps.iter().map(move |&j| (Self::name(i), Self::name(j)))
        })
    }
}

fn dag() -> impl Strategy<Value = Dag> {
    (1usize..10).prop_flat_map(|n| {
        (0..n)
            .map(|i| proptest::collection::btree_set(0..i.max(1), 0..=i.min(3)))
            .collect::<Vec<_>>()
            .prop_map(|sets| Dag {
                deps: sets
                    .into_iter()
                    .enumerate()
                    .map(|(i, set)| set.into_iter().filter(|&j| j < i).collect())
                    .collect(),
            })
    })
}

/// Builds a workspace for `dag`. Even projects declare their dependencies
/// in the descriptor; odd ones only report them through the oracle.
fn build(dag: &Dag) -> (TestWorkspace, Catalog) {
    let ws = TestWorkspace::new();
    let mut oracle = CountingOracle::new();
    for (i, deps) in dag.deps.iter().enumerate() {
        let dep_names: Vec<String> = deps.iter().map(|&j| Dag::name(j)).collect();
        let dep_refs: Vec<&str> = dep_names.iter().map(String::as_str).collect();
        if i % 2 == 0 {
            ws.project_with_deps(&Dag::name(i), &dep_refs);
        } else {
            ws.project(&Dag::name(i), "");
            oracle = oracle.build(&Dag::name(i), &dep_refs);
        }
    }
    let catalog = runtime().block_on(open(&ws, Arc::new(oracle)));
    (ws, catalog)
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn positions(order: &[PathBuf]) -> BTreeMap<String, usize> {
    names(order)
        .into_iter()
        .enumerate()
        .map(|(i, name)| (name, i))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn required_paths_put_dependencies_first(dag in dag()) {
        let (_ws, catalog) = build(&dag);
        let all: Vec<String> = (0..dag.deps.len()).map(Dag::name).collect();

        let order = runtime()
            .block_on(catalog.required_project_paths(&all))
            .unwrap();

        prop_assert_eq!(order.len(), dag.deps.len());
        let pos = positions(&order);
        prop_assert_eq!(pos.len(), order.len());
        for (source, target) in dag.edges() {
            prop_assert!(pos[&target] < pos[&source], "{} before {}", target, source);
        }
    }

    #[test]
    fn topological_order_is_a_permutation_of_the_input(
        dag in dag(),
        pick in proptest::collection::vec(any::<bool>(), 10),
    ) {
        let (ws, catalog) = build(&dag);
        let subset: Vec<PathBuf> = (0..dag.deps.len())
            .filter(|&i| pick[i])
            .map(|i| ws.path(&Dag::name(i)))
            .collect();

        let order = runtime()
            .block_on(catalog.in_topological_order(&subset))
            .unwrap();

        let mut sorted = order.clone();
        sorted.sort();
        prop_assert_eq!(&sorted, &subset);
        let pos = positions(&order);
        for (source, target) in dag.edges() {
            if let (Some(s), Some(t)) = (pos.get(&source), pos.get(&target)) {
                prop_assert!(t < s);
            }
        }
    }

    #[test]
    fn leaves_have_no_dependency_inside_the_subset(
        dag in dag(),
        pick in proptest::collection::vec(any::<bool>(), 10),
    ) {
        let (ws, catalog) = build(&dag);
        let members: BTreeSet<usize> = (0..dag.deps.len()).filter(|&i| pick[i]).collect();
        let subset: Vec<PathBuf> = members.iter().map(|&i| ws.path(&Dag::name(i))).collect();
        let limit = NonZeroUsize::new(16).unwrap();

        let leaves = runtime()
            .block_on(catalog.leaves_of_subset(&subset, limit))
            .unwrap();

        let expected: Vec<String> = members
            .iter()
            .filter(|&&i| dag.deps[i].is_disjoint(&members))
            .map(|&i| Dag::name(i))
            .collect();
        prop_assert_eq!(names(&leaves), expected);
    }
}
