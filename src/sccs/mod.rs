/*
 * SPDX-FileCopyrightText: 2024 Matteo Dell'Acqua
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Extraction of strongly connected components by forward-backward visits.
//!
//! The strongly connected component of a node `v` is the intersection of the
//! set of nodes reachable from `v` and of the set of nodes that can reach
//! `v`. The [`FwBw`] extractor applies this idea to a subset of the nodes of
//! a graph: it chooses a [pivot] in the subset, computes by a parallel
//! breadth-first visit its descendants within the subset, and then the nodes
//! that can reach the pivot passing only through descendants. The latter set
//! is exactly the component of the pivot within the subgraph induced by the
//! subset.
//!
//! A complete decomposition is obtained by applying the extractor
//! recursively to the remaining partitions (descendants outside the
//! component, ancestors outside the component, and nodes that are neither);
//! this is the responsibility of the caller.
//!
//! # Examples
//! ```
//! use dsi_progress_logger::no_logging;
//! use fwbw_scc::graphs::vec_graph::VecDigraph;
//! use fwbw_scc::sccs::FwBw;
//! use fwbw_scc::utils::NodeSet;
//!
//! let graph = VecDigraph::from_arcs([(0, 1), (1, 2), (2, 0), (1, 3)]);
//! let mut fwbw = FwBw::new(&graph, 2)?;
//!
//! let result = fwbw.compute(&NodeSet::full(4), no_logging![])?;
//!
//! // Node 1 has the largest product of indegree and outdegree
//! assert_eq!(result.root, 1);
//! assert_eq!(fwbw.root(), Some(1));
//! assert_eq!(result.scc.iter().collect::<Vec<_>>(), vec![0, 1, 2]);
//! assert_eq!(result.descendants.len(), 4);
//! # Ok::<(), fwbw_scc::sccs::SccError>(())
//! ```

mod fwbw;
pub use fwbw::*;

mod pivot;
pub use pivot::*;

use crate::traits::InvalidNodeId;
use crate::visits::{Stopped, VisitError};
use std::convert::Infallible;
use thiserror::Error;

/// Errors of the [pivot] selector and of the [`FwBw`] extractor.
#[derive(Error, Debug)]
pub enum SccError {
    /// A pivot was requested for an empty set of nodes.
    #[error("Cannot choose a pivot in an empty set of nodes")]
    EmptySet,
    /// A node is not a node of the graph.
    #[error(transparent)]
    InvalidNodeId(#[from] InvalidNodeId),
    /// The underlying visit could not be built or started.
    #[error(transparent)]
    Visit(VisitError),
    /// One of the visits was cancelled.
    #[error("The computation was interrupted")]
    Interrupted,
}

impl From<VisitError> for SccError {
    fn from(err: VisitError) -> Self {
        match err {
            VisitError::InvalidNodeId(err) => SccError::InvalidNodeId(err),
            err => SccError::Visit(err),
        }
    }
}

impl From<Stopped<Infallible>> for SccError {
    #[allow(unreachable_patterns)]
    fn from(stopped: Stopped<Infallible>) -> Self {
        match stopped {
            Stopped::Interrupted => SccError::Interrupted,
            Stopped::Break(never) => match never {},
        }
    }
}
