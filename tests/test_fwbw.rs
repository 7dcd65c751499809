/*
 * SPDX-FileCopyrightText: 2024 Matteo Dell'Acqua
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::Result;
use dsi_progress_logger::no_logging;
use dsi_progress_logger::prelude::*;
use fwbw_scc::prelude::*;
use fwbw_scc::thread_pool;
use std::sync::OnceLock;

/// Sequential reference: the nodes of `nodes` reachable from `start` in the
/// subgraph induced by `nodes` in the given direction.
fn reachable(graph: &VecDigraph, nodes: &NodeSet, start: usize, direction: Direction) -> NodeSet {
    let result = NodeSet::new(graph.num_nodes());
    let mut stack = vec![start];
    result.insert(start);
    while let Some(node) = stack.pop() {
        for succ in graph.neighbors(node, direction) {
            if nodes.contains(succ) && result.insert(succ) {
                stack.push(succ);
            }
        }
    }
    result
}

/// Sequential reference: the pivot and its component by mutual reachability.
fn correct_root_scc(graph: &VecDigraph, nodes: &NodeSet) -> RootScc {
    let mut best = None;
    for node in nodes.iter() {
        let score = graph.outdegree(node) as u128 * graph.indegree(node) as u128;
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((node, score));
        }
    }
    let root = best.unwrap().0;
    let descendants = reachable(graph, nodes, root, Direction::Outgoing);
    let ancestors = reachable(graph, nodes, root, Direction::Incoming);
    RootScc {
        root,
        scc: descendants.intersection(&ancestors),
        descendants,
    }
}

macro_rules! test_fwbw {
    ($threads:expr, $name:ident) => {
        mod $name {
            use super::*;

            fn fwbw<G: DirectedGraph>(graph: G) -> FwBw<G> {
                FwBw::with_visit(breadth_first::ParFair::with_thread_pool(
                    graph,
                    thread_pool![$threads],
                    Granularity::Nodes(2),
                ))
            }

            #[test]
            fn test_single_node() -> Result<()> {
                let graph = VecDigraph::empty(1);
                let result = fwbw(&graph).compute(&NodeSet::full(1), no_logging![])?;
                assert_eq!(result.root, 0);
                assert_eq!(result.scc, NodeSet::full(1));
                assert_eq!(result.descendants, NodeSet::full(1));
                Ok(())
            }

            #[test]
            fn test_cycle() -> Result<()> {
                let graph = VecDigraph::from_arcs([(0, 1), (1, 2), (2, 0)]);
                let result = fwbw(&graph).compute(&NodeSet::full(3), no_logging![])?;
                assert_eq!(result.root, 0);
                assert_eq!(result.scc, NodeSet::full(3));
                assert_eq!(result.descendants, NodeSet::full(3));
                Ok(())
            }

            #[test]
            fn test_disjoint_cycles() -> Result<()> {
                let graph = VecDigraph::from_arcs([(0, 1), (1, 0), (2, 3), (3, 2)]);
                let mut fwbw = fwbw(&graph);
                let result = fwbw.compute(&NodeSet::full(4), no_logging![])?;
                assert_eq!(result.root, 0);
                assert_eq!(result.scc.iter().collect::<Vec<_>>(), vec![0, 1]);
                assert_eq!(result.descendants, result.scc);

                // Remove the component found and go on
                let rest = NodeSet::full(4).difference(&result.scc);
                let result = fwbw.compute(&rest, no_logging![])?;
                assert_eq!(result.root, 2);
                assert_eq!(result.scc, rest);
                Ok(())
            }

            #[test]
            fn test_path() -> Result<()> {
                let graph = VecDigraph::from_arcs([(0, 1), (1, 2)]);
                let result = fwbw(&graph).compute(&NodeSet::full(3), no_logging![])?;
                // Only node 1 has a nonzero score
                assert_eq!(result.root, 1);
                assert_eq!(result.scc.iter().collect::<Vec<_>>(), vec![1]);
                assert_eq!(result.descendants.iter().collect::<Vec<_>>(), vec![1, 2]);
                Ok(())
            }

            #[test]
            fn test_dag() -> Result<()> {
                let graph = VecDigraph::from_arcs([(0, 1), (1, 2), (0, 2)]);
                let result = fwbw(&graph).compute(&NodeSet::full(3), no_logging![])?;
                assert_eq!(result.root, 1);
                assert_eq!(result.scc.iter().collect::<Vec<_>>(), vec![1]);
                assert_eq!(result.descendants.iter().collect::<Vec<_>>(), vec![1, 2]);
                Ok(())
            }

            #[test]
            fn test_buckets() -> Result<()> {
                let graph = VecDigraph::from_arcs([
                    (0, 0),
                    (1, 0),
                    (1, 2),
                    (2, 1),
                    (2, 3),
                    (2, 4),
                    (2, 5),
                    (3, 4),
                    (4, 3),
                    (5, 5),
                    (5, 6),
                    (5, 7),
                    (5, 8),
                    (6, 7),
                    (8, 7),
                ]);
                let mut fwbw = fwbw(&graph);
                let mut remaining = NodeSet::full(graph.num_nodes());
                let mut components = vec![];
                // Peel off one component at a time
                while !remaining.is_empty() {
                    let result = fwbw.compute(&remaining, no_logging![])?;
                    assert_eq!(result, correct_root_scc(&graph, &remaining));
                    remaining = remaining.difference(&result.scc);
                    components.push(result.scc.iter().collect::<Vec<_>>());
                }
                components.sort();
                assert_eq!(
                    components,
                    vec![
                        vec![0],
                        vec![1, 2],
                        vec![3, 4],
                        vec![5],
                        vec![6],
                        vec![7],
                        vec![8]
                    ]
                );
                Ok(())
            }

            #[test]
            fn test_er() -> Result<()> {
                for (n, p, seed) in [(100, 0.01, 0), (200, 0.02, 1), (500, 0.004, 2)] {
                    let graph = ErdosRenyi::new(n, p, seed).graph();
                    let mut fwbw = fwbw(&graph);
                    let all = NodeSet::full(n);
                    let odd = NodeSet::from_nodes(n, (1..n).step_by(2))?;
                    for nodes in [all, odd] {
                        let result = fwbw.compute(&nodes, no_logging![])?;
                        assert_eq!(result, correct_root_scc(&graph, &nodes));
                        assert_eq!(fwbw.root(), Some(result.root));
                        assert!(result.scc.contains(result.root));
                        assert!(result.scc.is_subset(&result.descendants));
                        assert!(result.descendants.is_subset(&nodes));
                    }
                }
                Ok(())
            }

            #[test]
            fn test_idempotence() -> Result<()> {
                let graph = ErdosRenyi::new(300, 0.01, 3).graph();
                let nodes = NodeSet::full(300);
                let mut fwbw = fwbw(&graph);
                let first = fwbw.compute(&nodes, no_logging![])?;
                let second = fwbw.compute(&nodes, no_logging![])?;
                assert_eq!(first, second);
                Ok(())
            }
        }
    };
}

test_fwbw!(1, fwbw_1);
test_fwbw!(2, fwbw_2);
test_fwbw!(4, fwbw_4);

#[test]
fn test_concurrency_invariance() -> Result<()> {
    let graph = ErdosRenyi::new(1000, 0.003, 4).graph();
    let nodes = NodeSet::from_nodes(1000, (0..1000).filter(|node| node % 5 != 0))?;
    let expected = FwBw::new(&graph, 1)?.compute(&nodes, no_logging![])?;
    for concurrency in [2, 3, 8] {
        let result = FwBw::new(&graph, concurrency)?.compute(&nodes, no_logging![])?;
        assert_eq!(result, expected);
    }
    Ok(())
}

#[test]
fn test_progress_logger() -> Result<()> {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Info)
        .try_init();
    let graph = ErdosRenyi::new(100, 0.05, 5).graph();
    let mut pl = ProgressLogger::default();
    let result = FwBw::new(&graph, 2)?.compute(&NodeSet::full(100), &mut pl)?;
    assert_eq!(result, correct_root_scc(&graph, &NodeSet::full(100)));
    Ok(())
}

#[test]
fn test_errors() -> Result<()> {
    let graph = VecDigraph::from_arcs([(0, 1), (1, 0)]);
    let mut fwbw = FwBw::new(&graph, 2)?;

    assert!(matches!(
        fwbw.compute(&NodeSet::new(2), no_logging![]),
        Err(SccError::EmptySet)
    ));
    match fwbw.compute(&NodeSet::from_nodes(10, [0, 7])?, no_logging![]) {
        Err(SccError::InvalidNodeId(err)) => assert_eq!(
            err,
            InvalidNodeId {
                node: 7,
                num_nodes: 2
            }
        ),
        _ => panic!("Node 7 should be invalid"),
    }
    assert_eq!(fwbw.root(), None);

    let result = fwbw.compute(&NodeSet::full(2), no_logging![])?;
    assert_eq!(result.scc, NodeSet::full(2));
    assert_eq!(fwbw.root(), Some(0));

    // A failed computation forgets the previous pivot
    assert!(fwbw.compute(&NodeSet::new(2), no_logging![]).is_err());
    assert_eq!(fwbw.root(), None);
    Ok(())
}

/// A graph that cancels a token as soon as the neighbors of a node are
/// enumerated in a given direction.
struct CancellingGraph {
    graph: VecDigraph,
    direction: Direction,
    token: OnceLock<CancellationToken>,
}

impl CancellingGraph {
    fn new(arcs: impl IntoIterator<Item = (usize, usize)>, direction: Direction) -> Self {
        Self {
            graph: VecDigraph::from_arcs(arcs),
            direction,
            token: OnceLock::new(),
        }
    }
}

impl DirectedGraph for CancellingGraph {
    type Neighbors<'succ> = <VecDigraph as DirectedGraph>::Neighbors<'succ>;

    fn num_nodes(&self) -> usize {
        self.graph.num_nodes()
    }

    fn num_arcs(&self) -> u64 {
        self.graph.num_arcs()
    }

    fn degree(&self, node: usize, direction: Direction) -> usize {
        self.graph.degree(node, direction)
    }

    fn neighbors(&self, node: usize, direction: Direction) -> Self::Neighbors<'_> {
        if direction == self.direction {
            if let Some(token) = self.token.get() {
                token.cancel();
            }
        }
        self.graph.neighbors(node, direction)
    }
}

#[test]
fn test_cancel() -> Result<()> {
    let graph = CancellingGraph::new([(0, 1), (1, 2), (2, 0)], Direction::Outgoing);
    let mut fwbw = FwBw::new(&graph, 2)?;

    // Cancelling an idle extractor has no effect
    let token = fwbw.cancellation_token();
    token.cancel();
    let result = fwbw.compute(&NodeSet::full(3), no_logging![])?;
    assert_eq!(result.scc, NodeSet::full(3));

    graph.token.get_or_init(|| token.clone());
    assert!(matches!(
        fwbw.compute(&NodeSet::full(3), no_logging![]),
        Err(SccError::Interrupted)
    ));
    assert_eq!(fwbw.root(), None);
    Ok(())
}

#[test]
fn test_cancel_last_forward_round() -> Result<()> {
    // The forward visit from 0 has a single round, during which the token is
    // cancelled: the visit completes, but the backward visit must not run
    let graph = CancellingGraph::new([(0, 1), (1, 0)], Direction::Outgoing);
    let mut fwbw = FwBw::new(&graph, 2)?;
    graph.token.get_or_init(|| fwbw.cancellation_token());

    let nodes = NodeSet::from_nodes(2, [0])?;
    assert!(matches!(
        fwbw.compute(&nodes, no_logging![]),
        Err(SccError::Interrupted)
    ));
    assert_eq!(fwbw.root(), None);
    Ok(())
}

#[test]
fn test_cancel_backward() -> Result<()> {
    let graph = CancellingGraph::new([(0, 1), (1, 2), (2, 0)], Direction::Incoming);
    let mut fwbw = FwBw::new(&graph, 2)?;
    graph.token.get_or_init(|| fwbw.cancellation_token());

    assert!(matches!(
        fwbw.compute(&NodeSet::full(3), no_logging![]),
        Err(SccError::Interrupted)
    ));
    assert_eq!(fwbw.root(), None);
    Ok(())
}

#[test]
fn test_into_visit() -> Result<()> {
    let graph = VecDigraph::from_arcs([(0, 1), (1, 0), (1, 2)]);
    let mut fwbw = FwBw::with_visit(breadth_first::ParFair::with_thread_pool(
        &graph,
        thread_pool![3],
        Granularity::Nodes(1),
    ));
    assert_eq!(fwbw.visit().concurrency(), 3);

    let result = fwbw.compute(&NodeSet::full(3), no_logging![])?;
    assert_eq!(result.scc.iter().collect::<Vec<_>>(), vec![0, 1]);
    // The last visit was the backward one, restricted to the descendants
    assert!(fwbw.visit().is_visited(0));
    assert!(!fwbw.visit().is_visited(2));

    // The visit can be reused once the extractor is gone
    let mut visit = fwbw.into_visit();
    let stats = visit
        .reset()
        .bfs(
            2,
            Direction::Incoming,
            |_| true,
            |_| std::ops::ControlFlow::Continue::<std::convert::Infallible, _>(()),
        )?
        .await_termination()?;
    assert_eq!(stats, VisitStats { visited: 3, rounds: 3 });
    Ok(())
}

#[cfg_attr(feature = "slow_tests", test)]
#[cfg_attr(not(feature = "slow_tests"), allow(dead_code))]
fn test_er_large() -> Result<()> {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Info)
        .try_init();
    let n = 20_000;
    let graph = ErdosRenyi::new(n, 1.5 / n as f64, 6).graph();
    let mut fwbw = FwBw::new(&graph, 0)?;
    let mut remaining = NodeSet::full(n);
    let mut pl = ProgressLogger::default();
    for _ in 0..10 {
        let result = fwbw.compute(&remaining, &mut pl)?;
        assert_eq!(result, correct_root_scc(&graph, &remaining));
        remaining = remaining.difference(&result.scc);
    }
    Ok(())
}
