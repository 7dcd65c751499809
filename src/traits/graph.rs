/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The graph capability consumed by visits and by the SCC extractor.
//!
//! Nodes are identified by integers in the range `0..num_nodes`. A
//! [`DirectedGraph`] must provide, for each node, its degree and its
//! neighbors in both [directions](Direction): algorithms never need anything
//! else. Implementations must tolerate concurrent reads, which is
//! guaranteed by the [`Sync`] bound required by parallel visits.

use impl_tools::autoimpl;
use std::rc::Rc;
use thiserror::Error;

/// A node id outside the range `0..num_nodes` of a graph or of a
/// [node set](crate::utils::NodeSet).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Node {node} does not exist (the graph has {num_nodes} nodes)")]
pub struct InvalidNodeId {
    /// The offending node id.
    pub node: usize,
    /// The number of nodes of the graph.
    pub num_nodes: usize,
}

/// The endpoint of an arc followed during a visit.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Direction {
    /// Follow arcs from source to target (successors).
    Outgoing,
    /// Follow arcs from target to source (predecessors).
    Incoming,
}

impl Direction {
    /// Returns the opposite direction.
    pub fn reverse(self) -> Self {
        match self {
            Direction::Outgoing => Direction::Incoming,
            Direction::Incoming => Direction::Outgoing,
        }
    }
}

impl core::fmt::Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Direction::Outgoing => f.write_str("outgoing"),
            Direction::Incoming => f.write_str("incoming"),
        }
    }
}

/// A directed graph with random access to the neighbors of a node in both
/// directions.
///
/// Methods accepting a node may panic if the node is not smaller than
/// [`num_nodes`](DirectedGraph::num_nodes); callers are expected to validate
/// ids coming from outside the graph.
#[autoimpl(for<S: trait + ?Sized> &S, &mut S, Rc<S>)]
pub trait DirectedGraph {
    /// The type of the iterator over the neighbors of a node returned by
    /// [`neighbors`](DirectedGraph::neighbors).
    type Neighbors<'succ>: IntoIterator<Item = usize>
    where
        Self: 'succ;

    /// Returns the number of nodes in the graph.
    fn num_nodes(&self) -> usize;

    /// Returns the number of arcs in the graph.
    fn num_arcs(&self) -> u64;

    /// Returns the number of arcs incident to `node` in the given direction.
    fn degree(&self, node: usize, direction: Direction) -> usize;

    /// Returns the neighbors of `node` in the given direction.
    fn neighbors(&self, node: usize, direction: Direction) -> Self::Neighbors<'_>;

    /// Returns the outdegree of `node`.
    #[inline(always)]
    fn outdegree(&self, node: usize) -> usize {
        self.degree(node, Direction::Outgoing)
    }

    /// Returns the indegree of `node`.
    #[inline(always)]
    fn indegree(&self, node: usize) -> usize {
        self.degree(node, Direction::Incoming)
    }

    /// Calls `f` on each neighbor of `node` in the given direction.
    fn for_each_neighbor(&self, node: usize, direction: Direction, f: impl FnMut(usize)) {
        self.neighbors(node, direction).into_iter().for_each(f)
    }
}
