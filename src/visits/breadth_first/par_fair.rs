/*
 * SPDX-FileCopyrightText: 2024 Matteo Dell'Acqua
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::traits::{DirectedGraph, Direction, InvalidNodeId};
use crate::utils::Granularity;
use crate::visits::{breadth_first::*, CancellationToken, Stopped, VisitError, VisitStats};
use log::debug;
use parallel_frontier::Frontier;
use rayon::{prelude::*, ThreadPool};
use std::{
    marker::PhantomData,
    ops::ControlFlow::{self, Break, Continue},
    sync::atomic::Ordering,
};
use sux::bits::AtomicBitVec;
use sux::traits::AtomicBitVecOps;

/// Fair parallel breadth-first visits.
///
/// “Fairness” refers to the fact that the visit is parallelized by dividing the
/// visit queue in chunks of approximately equal size; threads consume the
/// chunks, and visit the associated nodes. Thus, the visiting cost is
/// distributed evenly among the threads, albeit the work done on the
/// enumeration of neighbors depends on the sum of the degrees of the nodes in a
/// chunk, which might differ significantly between chunks.
///
/// The visit is level-synchronous: the nodes at distance *d* from the start
/// node form the frontier of round *d*, and round *d* + 1 starts only when
/// all threads have completed round *d*. A node discovered by several threads
/// in the same round is claimed by exactly one of them, using an atomic swap
/// on a bit vector with one bit per node. The visit owns a
/// [`ThreadPool`] whose size is fixed at construction time.
///
/// The visit can follow arcs in either [direction](Direction), and it is
/// stateful: after a visit it must be [reset](ParFair::reset) before being
/// started again, or [`bfs`](ParFair::bfs) will return [`VisitError::Busy`].
///
/// # Examples
///
/// Let's compute the set of nodes reachable from 0 and the set of nodes
/// that can reach 0:
///
/// ```
/// use fwbw_scc::graphs::vec_graph::VecDigraph;
/// use fwbw_scc::traits::Direction;
/// use fwbw_scc::utils::NodeSet;
/// use fwbw_scc::visits::breadth_first::{Event, ParFair};
/// use std::convert::Infallible;
/// use std::ops::ControlFlow::Continue;
///
/// let graph = VecDigraph::from_arcs([(0, 1), (1, 2), (2, 0), (1, 3)]);
/// let mut visit = ParFair::new(&graph, 2)?;
///
/// let reachable = NodeSet::new(4);
/// visit
///     .bfs(0, Direction::Outgoing, |_| true, |event| {
///         if let Event::Visit { node, .. } = event {
///             reachable.insert(node);
///         }
///         Continue::<Infallible, _>(())
///     })?
///     .await_termination()?;
/// assert_eq!(reachable.len(), 4);
///
/// let reaching = NodeSet::new(4);
/// visit
///     .reset()
///     .bfs(0, Direction::Incoming, |_| true, |event| {
///         if let Event::Visit { node, .. } = event {
///             reaching.insert(node);
///         }
///         Continue::<Infallible, _>(())
///     })?
///     .await_termination()?;
/// assert_eq!(reaching.iter().collect::<Vec<_>>(), vec![0, 1, 2]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct ParFair<G: DirectedGraph> {
    graph: G,
    granularity: usize,
    visited: AtomicBitVec,
    thread_pool: ThreadPool,
    cancel: CancellationToken,
    /// Whether the visited marker contains the state of a previous run.
    dirty: bool,
}

impl<G: DirectedGraph> ParFair<G> {
    /// Creates a fair parallel breadth-first visit using a new thread pool
    /// with `concurrency` threads.
    ///
    /// If `concurrency` is zero, the number of threads is chosen by
    /// [Rayon](rayon::ThreadPoolBuilder::num_threads).
    ///
    /// This constructor uses a default granularity of 128 nodes. Use
    /// [`with_granularity`](Self::with_granularity) to set a different
    /// granularity.
    #[inline(always)]
    pub fn new(graph: G, concurrency: usize) -> Result<Self, VisitError> {
        Self::with_granularity(graph, concurrency, Granularity::Nodes(128))
    }

    /// Creates a fair parallel breadth-first visit using a new thread pool
    /// with `concurrency` threads.
    ///
    /// # Arguments
    ///
    /// * `graph`: the graph to visit.
    ///
    /// * `concurrency`: the number of threads of the visit.
    ///
    /// * `granularity`: High granularity reduces overhead, but may lead to
    ///   decreased performance on graphs with a skewed degree distribution.
    ///   From this parameter, we derive a [node
    ///   granularity](Granularity::node_granularity).
    pub fn with_granularity(
        graph: G,
        concurrency: usize,
        granularity: Granularity,
    ) -> Result<Self, VisitError> {
        let thread_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(concurrency)
            .build()?;
        Ok(Self::with_thread_pool(graph, thread_pool, granularity))
    }

    /// Creates a fair parallel breadth-first visit using the given thread
    /// pool, for example one built with the [`thread_pool`](crate::thread_pool)
    /// macro.
    pub fn with_thread_pool(graph: G, thread_pool: ThreadPool, granularity: Granularity) -> Self {
        let num_nodes = graph.num_nodes();
        let num_arcs = graph.num_arcs();
        Self {
            graph,
            granularity: granularity.node_granularity(num_nodes, num_arcs),
            visited: AtomicBitVec::new(num_nodes),
            thread_pool,
            cancel: CancellationToken::new(),
            dirty: false,
        }
    }

    /// Returns the graph of this visit.
    #[inline(always)]
    pub fn graph(&self) -> &G {
        &self.graph
    }

    /// Returns the number of threads of this visit.
    #[inline(always)]
    pub fn concurrency(&self) -> usize {
        self.thread_pool.current_num_threads()
    }

    /// Returns a token that can be used to cancel visits from another thread.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Returns true if `node` has been visited since the last reset.
    ///
    /// Nodes that are not in the graph have never been visited.
    #[inline(always)]
    pub fn is_visited(&self, node: usize) -> bool {
        node < self.graph.num_nodes() && self.visited.get(node, Ordering::Relaxed)
    }

    /// Resets the visit status, making it possible to reuse the visit.
    ///
    /// Clears the visited marker and the [cancellation
    /// token](Self::cancellation_token), and returns the visit so that a new
    /// visit can be started by chaining.
    pub fn reset(&mut self) -> &mut Self {
        self.cancel.clear();
        self.clear_visited()
    }

    /// Clears the visited marker, leaving the cancellation token untouched.
    ///
    /// Used between visits that are part of the same computation, so that a
    /// cancellation requested during one of them stops the following ones.
    pub(crate) fn clear_visited(&mut self) -> &mut Self {
        if self.dirty {
            self.visited.fill(false, Ordering::Relaxed);
            self.dirty = false;
            debug!("Visit reset");
        }
        self
    }
}

impl<G: DirectedGraph + Sync> ParFair<G> {
    /// Starts a breadth-first visit from `start`.
    ///
    /// The returned handle does nothing until its
    /// [`await_termination`](Visit::await_termination) method is called.
    ///
    /// # Arguments
    ///
    /// * `start`: the start node; it is always visited, regardless of
    ///   `filter`.
    ///
    /// * `direction`: the direction of the arcs followed by the visit.
    ///
    /// * `filter`: called on each newly discovered node; if it returns false,
    ///   the node is neither visited nor used to continue the visit along
    ///   that path.
    ///
    /// * `callback`: called on the [events](Event) of the visit.
    ///
    /// # Errors
    ///
    /// [`VisitError::InvalidNodeId`] if `start` is not a node of the graph,
    /// and [`VisitError::Busy`] if the visit has not been reset after a
    /// previous run.
    pub fn bfs<E, C, F>(
        &mut self,
        start: usize,
        direction: Direction,
        filter: F,
        callback: C,
    ) -> Result<Visit<'_, G, E, C, F>, VisitError>
    where
        E: Send,
        C: Fn(Event) -> ControlFlow<E, ()> + Sync,
        F: Fn(FilterArgs) -> bool + Sync,
    {
        let num_nodes = self.graph.num_nodes();
        if start >= num_nodes {
            return Err(InvalidNodeId {
                node: start,
                num_nodes,
            }
            .into());
        }
        if self.dirty {
            return Err(VisitError::Busy);
        }

        self.dirty = true;
        self.visited.set(start, true, Ordering::Relaxed);

        Ok(Visit {
            par_fair: self,
            start,
            direction,
            filter,
            callback,
            _marker: PhantomData,
        })
    }
}

/// A breadth-first visit started by [`ParFair::bfs`] and not yet run.
#[must_use = "a visit does nothing until await_termination is called"]
pub struct Visit<'a, G: DirectedGraph, E, C, F> {
    par_fair: &'a mut ParFair<G>,
    start: usize,
    direction: Direction,
    filter: F,
    callback: C,
    _marker: PhantomData<fn() -> E>,
}

impl<G, E, C, F> Visit<'_, G, E, C, F>
where
    G: DirectedGraph + Sync,
    E: Send,
    C: Fn(Event) -> ControlFlow<E, ()> + Sync,
    F: Fn(FilterArgs) -> bool + Sync,
{
    /// Runs the visit, blocking until all rounds have been completed.
    ///
    /// No set filled by the callback is complete before this method returns.
    ///
    /// # Errors
    ///
    /// [`Stopped::Break`] if a callback returned
    /// [`Break`](ControlFlow::Break), and [`Stopped::Interrupted`] if the
    /// visit was [cancelled](ParFair::cancellation_token). In both cases the
    /// visit must be reset before it is started again.
    pub fn await_termination(self) -> Result<VisitStats, Stopped<E>> {
        match self.run() {
            Continue(stats) => Ok(stats),
            Break(stopped) => Err(stopped),
        }
    }

    fn run(self) -> ControlFlow<Stopped<E>, VisitStats> {
        let Visit {
            par_fair,
            start,
            direction,
            filter,
            callback,
            ..
        } = self;
        let ParFair {
            graph,
            granularity,
            visited,
            thread_pool,
            cancel,
            ..
        } = &*par_fair;
        let granularity = *granularity;

        debug!(
            "Starting {} visit from node {} using {} threads",
            direction,
            start,
            thread_pool.current_num_threads()
        );

        Stopped::lift(callback(Event::Init {}))?;
        // We do not provide a capacity in the hope of allocating dynamically
        // space as the frontiers grow.
        let mut curr_frontier = Frontier::with_threads(thread_pool, None);
        // Inject the start node in the frontier.
        curr_frontier.as_mut()[0] = vec![start];
        let mut next_frontier = Frontier::with_threads(thread_pool, None);
        let mut stats = VisitStats::default();

        while !curr_frontier.is_empty() {
            if cancel.is_cancelled() {
                debug!("Visit cancelled before round {}", stats.rounds);
                return Break(Stopped::Interrupted);
            }
            let distance = stats.rounds;
            let nodes = curr_frontier.len();
            debug!("Round {}: {} nodes in the frontier", distance, nodes);
            Stopped::lift(callback(Event::FrontierSize { distance, nodes }))?;

            let distance_plus_one = distance + 1;
            thread_pool.install(|| {
                curr_frontier
                    .par_iter()
                    .chunks(granularity)
                    .try_for_each(|chunk| {
                        if cancel.is_cancelled() {
                            return Break(Stopped::Interrupted);
                        }
                        chunk.into_iter().try_for_each(|&node| {
                            Stopped::lift(callback(Event::Visit { node, distance }))?;
                            graph
                                .neighbors(node, direction)
                                .into_iter()
                                .for_each(|succ| {
                                    if filter(FilterArgs {
                                        node: succ,
                                        pred: node,
                                        distance: distance_plus_one,
                                    }) && !visited.swap(succ, true, Ordering::Relaxed)
                                    {
                                        next_frontier.push(succ);
                                    }
                                });

                            Continue(())
                        })
                    })
            })?;

            stats.visited += nodes;
            stats.rounds += 1;
            // Swap the frontiers
            std::mem::swap(&mut curr_frontier, &mut next_frontier);
            // Clear the frontier we will fill in the next iteration
            next_frontier.clear();
        }

        Stopped::lift(callback(Event::Done {}))?;
        debug!(
            "Visit completed: {} nodes in {} rounds",
            stats.visited, stats.rounds
        );

        Continue(stats)
    }
}
