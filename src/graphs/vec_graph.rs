/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::traits::{DirectedGraph, Direction};

/// A mutable [`DirectedGraph`] implementation based on two vectors of
/// vectors, one for successors and one for predecessors.
///
/// Keeping both adjacency lists makes degrees and neighbors available in
/// constant time in both directions, at the cost of storing each arc twice.
/// Parallel arcs are not allowed, whereas loops are.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VecDigraph {
    /// The number of arcs in the graph.
    num_arcs: u64,
    /// For each node, its list of successors.
    succ: Vec<Vec<usize>>,
    /// For each node, its list of predecessors.
    pred: Vec<Vec<usize>>,
}

impl VecDigraph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new empty graph with `n` nodes.
    pub fn empty(n: usize) -> Self {
        Self {
            num_arcs: 0,
            succ: Vec::from_iter((0..n).map(|_| Vec::new())),
            pred: Vec::from_iter((0..n).map(|_| Vec::new())),
        }
    }

    /// Adds an isolated node to the graph and returns true if it is a new node.
    ///
    /// All nodes with a smaller id that do not exist yet are added, too.
    pub fn add_node(&mut self, node: usize) -> bool {
        let len = self.succ.len();
        self.succ.extend((len..=node).map(|_| Vec::new()));
        self.pred.extend((len..=node).map(|_| Vec::new()));
        len <= node
    }

    /// Adds an arc to the graph and returns true if the arc was not already
    /// present.
    ///
    /// # Panics
    ///
    /// This method will panic if one of the given nodes is greater or equal
    /// than the number of nodes in the graph.
    pub fn add_arc(&mut self, u: usize, v: usize) -> bool {
        let max = u.max(v);
        if max >= self.succ.len() {
            panic!(
                "Node {} does not exist (the graph has {} nodes)",
                max,
                self.succ.len(),
            );
        }
        if self.succ[u].contains(&v) {
            return false;
        }
        self.succ[u].push(v);
        self.pred[v].push(u);
        self.num_arcs += 1;
        true
    }

    /// Adds arcs from an [`IntoIterator`], adding new nodes as needed.
    ///
    /// The items must be pairs of the form `(usize, usize)` specifying an arc.
    pub fn add_arcs(&mut self, arcs: impl IntoIterator<Item = (usize, usize)>) -> &mut Self {
        let mut arcs = arcs.into_iter().collect::<Vec<_>>();
        arcs.sort_unstable();
        arcs.dedup();
        for (u, v) in arcs {
            self.add_node(u.max(v));
            self.add_arc(u, v);
        }
        self
    }

    /// Creates a new graph from an [`IntoIterator`].
    ///
    /// The items must be pairs of the form `(usize, usize)` specifying an arc.
    /// The graph will have as many nodes as the largest id appearing in an arc
    /// plus one; use [`empty`](Self::empty) followed by
    /// [`add_arcs`](Self::add_arcs) to get isolated nodes with larger ids.
    pub fn from_arcs(arcs: impl IntoIterator<Item = (usize, usize)>) -> Self {
        let mut g = Self::new();
        g.add_arcs(arcs);
        g
    }

    /// Returns an iterator over the arcs of the graph, in lexicographical
    /// order of source and insertion order of target.
    pub fn arcs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.succ
            .iter()
            .enumerate()
            .flat_map(|(u, succ)| succ.iter().map(move |&v| (u, v)))
    }

    /// Returns the transpose of this graph.
    pub fn transpose(&self) -> Self {
        Self {
            num_arcs: self.num_arcs,
            succ: self.pred.clone(),
            pred: self.succ.clone(),
        }
    }

    #[inline(always)]
    fn lists(&self, direction: Direction) -> &[Vec<usize>] {
        match direction {
            Direction::Outgoing => &self.succ,
            Direction::Incoming => &self.pred,
        }
    }
}

impl DirectedGraph for VecDigraph {
    type Neighbors<'succ> = core::iter::Copied<core::slice::Iter<'succ, usize>>;

    #[inline(always)]
    fn num_nodes(&self) -> usize {
        self.succ.len()
    }

    #[inline(always)]
    fn num_arcs(&self) -> u64 {
        self.num_arcs
    }

    #[inline(always)]
    fn degree(&self, node: usize, direction: Direction) -> usize {
        self.lists(direction)[node].len()
    }

    #[inline(always)]
    fn neighbors(&self, node: usize, direction: Direction) -> Self::Neighbors<'_> {
        self.lists(direction)[node].iter().copied()
    }
}
