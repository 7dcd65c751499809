/*
 * SPDX-FileCopyrightText: 2024 Matteo Dell'Acqua
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Breadth-first visits.
//!
//! Implementations must accept a callback function with argument [`Event`]
//! and a filter function with argument [`FilterArgs`].

mod par_fair;
pub use par_fair::*;

/// Types of callback events generated during breadth-first visits.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum Event {
    /// This event should be used to set up state at the start of the visit.
    Init {},
    /// The node has been encountered for the first time; the event happens
    /// exactly once for each node reached by the visit, start node included,
    /// before its neighbors are enumerated.
    Visit {
        /// The current node.
        node: usize,
        /// The distance of the current node from the start node.
        distance: usize,
    },
    /// The nodes at a new distance are about to be processed.
    ///
    /// This event is emitted by the thread driving the visit, before the
    /// round starts.
    FrontierSize {
        /// The distance of the nodes in the frontier.
        distance: usize,
        /// The number of nodes in the frontier.
        nodes: usize,
    },
    /// The visit has been completed.
    ///
    /// Note that this event will not happen if the visit is stopped by a
    /// callback or cancelled.
    Done {},
}

/// Filter arguments for breadth-first visits.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct FilterArgs {
    /// The node that has just been discovered.
    pub node: usize,
    /// The node whose neighbors are being enumerated.
    pub pred: usize,
    /// The distance of [node](`Self::node`) from the start node.
    pub distance: usize,
}
