/*
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use rand::{rngs::SmallRng, Rng, SeedableRng};

use super::vec_graph::VecDigraph;

/// Erdös-Rényi random directed graphs.
///
/// The Erdös-Rényi random graph model is a simple model for generating random
/// graphs. It is parameterized by the number of nodes `n` and the probability
/// `p` of an arc between any two nodes. In this implementation, loops are never
/// included.
///
/// The time required to generate the graph is quadratic in `n`. Arcs are
/// generated in lexicographical order, so the same parameters and seed always
/// yield the same graph.
#[derive(Debug, Clone)]
pub struct ErdosRenyi {
    n: usize,
    p: f64,
    seed: u64,
}

impl ErdosRenyi {
    /// Creates a new Erdös-Rényi random graph, given the number of
    /// nodes, the probability of an arc between any two nodes, and a
    /// seed for the [pseudorandom number generator](SmallRng).
    pub fn new(n: usize, p: f64, seed: u64) -> Self {
        assert!((0.0..=1.0).contains(&p), "p must be in [0..1]");
        Self { n, p, seed }
    }

    /// Returns an iterator over the arcs of the graph.
    pub fn arcs(&self) -> impl Iterator<Item = (usize, usize)> {
        let (n, p) = (self.n, self.p);
        let mut rng = SmallRng::seed_from_u64(self.seed);
        (0..n)
            .flat_map(move |u| (0..n).map(move |v| (u, v)))
            .filter(|&(u, v)| u != v)
            .filter(move |_| rng.random_bool(p))
    }

    /// Materializes the graph in a [`VecDigraph`] with exactly `n` nodes.
    pub fn graph(&self) -> VecDigraph {
        let mut g = VecDigraph::empty(self.n);
        g.add_arcs(self.arcs());
        g
    }
}
