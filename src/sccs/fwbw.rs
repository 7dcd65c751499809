/*
 * SPDX-FileCopyrightText: 2024 Matteo Dell'Acqua
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::{pivot, score, SccError};
use crate::traits::{DirectedGraph, Direction};
use crate::utils::NodeSet;
use crate::visits::breadth_first::{Event, ParFair};
use crate::visits::CancellationToken;
use dsi_progress_logger::ProgressLog;
use log::info;
use std::convert::Infallible;
use std::ops::ControlFlow::{self, Continue};

/// The result of [`FwBw::compute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootScc {
    /// The pivot.
    pub root: usize,
    /// The strongly connected component of the pivot in the subgraph
    /// induced by the candidate set.
    pub scc: NodeSet,
    /// The nodes of the candidate set reachable from the pivot through
    /// nodes of the candidate set, pivot included.
    pub descendants: NodeSet,
}

/// Extracts the strongly connected component of a pivot using a forward and
/// a backward parallel breadth-first visit.
///
/// The extractor owns a [`ParFair`] visit, which is reset before each visit,
/// so [`compute`](FwBw::compute) can be called any number of times, also with
/// different candidate sets. The result depends only on the graph and on the
/// candidate set, and not on the number of threads.
pub struct FwBw<G: DirectedGraph> {
    visit: ParFair<G>,
    root: Option<usize>,
}

impl<G: DirectedGraph> FwBw<G> {
    /// Creates an extractor using a new [`ParFair`] visit with the given
    /// concurrency.
    pub fn new(graph: G, concurrency: usize) -> Result<Self, SccError> {
        Ok(Self::with_visit(ParFair::new(graph, concurrency)?))
    }

    /// Creates an extractor using the given visit.
    pub fn with_visit(visit: ParFair<G>) -> Self {
        Self { visit, root: None }
    }

    /// Returns the pivot chosen by the last successful call to
    /// [`compute`](FwBw::compute), if any.
    pub fn root(&self) -> Option<usize> {
        self.root
    }

    /// Returns a token that can be used to cancel a running computation from
    /// another thread.
    ///
    /// The token is cleared at the start of each call to
    /// [`compute`](FwBw::compute), so cancelling an idle extractor has no
    /// effect; a cancellation requested at any point of a computation, also
    /// between the forward and the backward visit, makes it fail with
    /// [`SccError::Interrupted`].
    pub fn cancellation_token(&self) -> CancellationToken {
        self.visit.cancellation_token()
    }

    /// Returns the underlying visit.
    pub fn visit(&self) -> &ParFair<G> {
        &self.visit
    }

    /// Returns the underlying visit, consuming the extractor.
    pub fn into_visit(self) -> ParFair<G> {
        self.visit
    }
}

impl<G: DirectedGraph + Sync> FwBw<G> {
    /// Computes the strongly connected component of the [pivot] of `nodes`
    /// in the subgraph induced by `nodes`.
    ///
    /// `nodes` may have a universe different from the number of nodes of the
    /// graph, but all its elements must be nodes of the graph. The
    /// progress logger is updated once for each visit with the number of
    /// nodes it found.
    ///
    /// # Errors
    ///
    /// [`SccError::EmptySet`] if `nodes` is empty,
    /// [`SccError::InvalidNodeId`] if `nodes` contains a node that is not in
    /// the graph, and [`SccError::Interrupted`] if the computation was
    /// [cancelled](FwBw::cancellation_token).
    pub fn compute(
        &mut self,
        nodes: &NodeSet,
        pl: &mut impl ProgressLog,
    ) -> Result<RootScc, SccError> {
        self.root = None;
        let graph = self.visit.graph();
        let num_nodes = graph.num_nodes();
        let root = pivot(graph, nodes)?;
        info!(
            "Pivot: node {} (outdegree {}, indegree {}, score {})",
            root,
            graph.outdegree(root),
            graph.indegree(root),
            score(graph, root)
        );

        pl.item_name("node");
        pl.expected_updates(Some(nodes.len()));
        pl.start("Computing the strongly connected component of the pivot...");

        let forward = Direction::Outgoing;
        let descendants = NodeSet::new(num_nodes);
        let stats = self
            .visit
            .reset()
            .bfs(
                root,
                forward,
                |args| nodes.contains(args.node),
                |event| -> ControlFlow<Infallible, ()> {
                    if let Event::Visit { node, .. } = event {
                        descendants.insert(node);
                    }
                    Continue(())
                },
            )?
            .await_termination()?;
        pl.update_with_count(descendants.len());
        info!(
            "Forward visit: {} descendants in {} rounds",
            descendants.len(),
            stats.rounds
        );

        // A cancellation requested during the forward visit must survive
        // into the backward visit
        let mut scc = NodeSet::new(num_nodes);
        let stats = self
            .visit
            .clear_visited()
            .bfs(
                root,
                forward.reverse(),
                |args| descendants.contains(args.node),
                |event| -> ControlFlow<Infallible, ()> {
                    if let Event::Visit { node, .. } = event {
                        scc.insert(node);
                    }
                    Continue(())
                },
            )?
            .await_termination()?;
        // The backward visit is confined to the descendants, so this is a
        // no-op unless the visit misbehaves
        scc.retain_all(&descendants);
        pl.update_with_count(scc.len());
        info!(
            "Backward visit: {} nodes in the component in {} rounds",
            scc.len(),
            stats.rounds
        );

        pl.done();
        self.root = Some(root);
        Ok(RootScc {
            root,
            scc,
            descendants,
        })
    }
}
