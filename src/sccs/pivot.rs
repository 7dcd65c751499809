/*
 * SPDX-FileCopyrightText: 2024 Matteo Dell'Acqua
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::SccError;
use crate::traits::{DirectedGraph, InvalidNodeId};
use crate::utils::{argmax_by_key, NodeSet};

/// Returns the node of `nodes` maximizing the product of its outdegree and
/// of its indegree.
///
/// Ties are broken in favor of the node with the smallest id. Degrees are
/// those of the whole graph, not of the subgraph induced by `nodes`.
///
/// # Errors
///
/// [`SccError::EmptySet`] if `nodes` is empty, and
/// [`SccError::InvalidNodeId`] if `nodes` contains a node that is not in the
/// graph.
pub fn pivot(graph: impl DirectedGraph, nodes: &NodeSet) -> Result<usize, SccError> {
    let num_nodes = graph.num_nodes();
    if nodes.num_nodes() > num_nodes {
        if let Some(node) = nodes.iter().find(|&node| node >= num_nodes) {
            return Err(InvalidNodeId { node, num_nodes }.into());
        }
    }

    argmax_by_key(nodes.iter(), |&node| score(&graph, node)).ok_or(SccError::EmptySet)
}

/// The product of the outdegree and of the indegree of a node.
///
/// The product is computed on 128 bits, so it cannot overflow.
#[inline(always)]
pub fn score(graph: impl DirectedGraph, node: usize) -> u128 {
    graph.outdegree(node) as u128 * graph.indegree(node) as u128
}
