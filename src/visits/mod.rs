/*
 * SPDX-FileCopyrightText: 2024 Matteo Dell'Acqua
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Visits on graphs.
//!
//! A visit is a reusable, stateful object: it owns the marker recording
//! which nodes have been visited, and must be [reset] before it can be used
//! for a new, independent visit. Starting a visit returns a handle that
//! borrows the visit mutably; nothing happens until the
//! `await_termination` method of the handle is called, which runs the visit
//! to completion and is the only synchronization point between the threads
//! performing the visit and the caller.
//!
//! Visits accept a callback function with argument an event (visit of a
//! node, start of a new round, etc.) and returning a `ControlFlow<E, ()>`,
//! where `E` is a type parameter of the visit method. If a callback returns a
//! [`Break`](ControlFlow::Break), the visit will be interrupted, and the
//! [`Break`](ControlFlow::Break) value will be returned to the caller wrapped
//! in [`Stopped::Break`]. For uninterruptible visits we suggest to use
//! [`Infallible`](std::convert::Infallible) as `E`.
//!
//! Note that an interruption does not necessarily denote an error condition.
//!
//! Additionally, visits accept a filter function that will be called when a
//! new node is discovered. If the filter returns false, the node will be
//! ignored, that is, not even marked as known. Note that in case of parallel
//! visits the filter might be called multiple times on the same node (and
//! with a different predecessor) due to race conditions.
//!
//! Visits can also be cancelled from outside using a [`CancellationToken`],
//! in which case the visit returns [`Stopped::Interrupted`]. In both cases
//! part of the current round might complete before the visit returns, and
//! the visit must be reset before it can be reused.
//!
//! [reset]: breadth_first::ParFair::reset
//! [`ControlFlow`]: std::ops::ControlFlow

pub mod breadth_first;

use crate::traits::InvalidNodeId;
use std::ops::ControlFlow;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use thiserror::Error;

/// Usage errors of visits.
#[derive(Error, Debug)]
pub enum VisitError {
    /// The start node is not a node of the graph.
    #[error(transparent)]
    InvalidNodeId(#[from] InvalidNodeId),
    /// The visit still holds the state of a previous run, which might have
    /// been completed or aborted.
    #[error("The visit holds the state of a previous run: reset it before starting a new one")]
    Busy,
    /// The thread pool of the visit could not be built.
    #[error("Cannot build the thread pool of the visit")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// The reason why a visit did not run to completion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Stopped<E> {
    /// The visit was cancelled using its [`CancellationToken`].
    #[error("The visit was interrupted")]
    Interrupted,
    /// A callback returned [`Break`](ControlFlow::Break) with the given value.
    #[error("The visit was stopped by a callback: {0}")]
    Break(E),
}

impl<E> Stopped<E> {
    #[inline(always)]
    pub(crate) fn lift(flow: ControlFlow<E, ()>) -> ControlFlow<Self, ()> {
        match flow {
            ControlFlow::Continue(()) => ControlFlow::Continue(()),
            ControlFlow::Break(e) => ControlFlow::Break(Stopped::Break(e)),
        }
    }
}

/// Statistics about a completed visit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisitStats {
    /// The number of visited nodes, including the start node.
    pub visited: usize,
    /// The number of rounds (i.e., of distinct distances from the start node).
    pub rounds: usize,
}

/// A cloneable flag used to cancel a running visit from another thread.
///
/// The flag is checked by the visit at the start of each round and of each
/// task within a round. Resetting the visit clears the flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Creates a new, non-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks the visits using this token to stop as soon as possible.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Returns true if [`cancel`](Self::cancel) has been called since the
    /// last reset.
    #[inline(always)]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub(crate) fn clear(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}
