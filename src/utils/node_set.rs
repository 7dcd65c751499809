/*
 * SPDX-FileCopyrightText: 2024 Matteo Dell'Acqua
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::traits::InvalidNodeId;
use std::sync::atomic::{AtomicUsize, Ordering};
use sux::bits::AtomicBitVec;
use sux::traits::AtomicBitVecOps;

/// A set of nodes drawn from a fixed universe `0..num_nodes`.
///
/// The set is a bit vector plus a counter of its elements. Insertion takes a
/// shared reference and is atomic, so the same set can be filled by the
/// callbacks of a [parallel visit](crate::visits::breadth_first::ParFair):
/// if several threads insert the same node, exactly one of them sees
/// [`insert`](NodeSet::insert) return true. All other mutating operations
/// require an exclusive reference.
///
/// Iteration always happens in increasing node order.
///
/// # Examples
///
/// ```
/// use fwbw_scc::utils::NodeSet;
///
/// let a = NodeSet::from_nodes(8, [1, 3, 5])?;
/// let b = NodeSet::from_nodes(8, [3, 4, 5, 6])?;
/// assert_eq!(a.intersection(&b).iter().collect::<Vec<_>>(), vec![3, 5]);
/// assert_eq!(a.difference(&b).iter().collect::<Vec<_>>(), vec![1]);
/// assert_eq!(a.union(&b).len(), 5);
/// # Ok::<(), fwbw_scc::traits::InvalidNodeId>(())
/// ```
pub struct NodeSet {
    num_nodes: usize,
    len: AtomicUsize,
    bits: AtomicBitVec,
}

impl NodeSet {
    /// Creates an empty set over the universe `0..num_nodes`.
    pub fn new(num_nodes: usize) -> Self {
        Self {
            num_nodes,
            len: AtomicUsize::new(0),
            bits: AtomicBitVec::new(num_nodes),
        }
    }

    /// Creates a set containing all nodes of the universe `0..num_nodes`.
    pub fn full(num_nodes: usize) -> Self {
        let mut set = Self::new(num_nodes);
        set.bits.fill(true, Ordering::Relaxed);
        *set.len.get_mut() = num_nodes;
        set
    }

    /// Creates a set over the universe `0..num_nodes` containing the given
    /// nodes; duplicates are ignored.
    pub fn from_nodes(
        num_nodes: usize,
        nodes: impl IntoIterator<Item = usize>,
    ) -> Result<Self, InvalidNodeId> {
        let set = Self::new(num_nodes);
        for node in nodes {
            set.try_insert(node)?;
        }
        Ok(set)
    }

    /// Returns the size of the universe.
    #[inline(always)]
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Returns the number of nodes in the set.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    /// Returns true if the set contains no nodes.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if `node` is in the set.
    ///
    /// Nodes outside the universe are never in the set.
    #[inline(always)]
    pub fn contains(&self, node: usize) -> bool {
        node < self.num_nodes && self.bits.get(node, Ordering::Relaxed)
    }

    /// Adds a node to the set, returning true if it was not already present.
    ///
    /// # Panics
    ///
    /// If `node` is not in the universe of the set.
    #[inline(always)]
    pub fn insert(&self, node: usize) -> bool {
        assert!(
            node < self.num_nodes,
            "Node {} does not exist (the universe has {} nodes)",
            node,
            self.num_nodes
        );
        self.claim(node)
    }

    /// Adds a node to the set, returning true if it was not already present,
    /// or an error if `node` is not in the universe of the set.
    pub fn try_insert(&self, node: usize) -> Result<bool, InvalidNodeId> {
        if node >= self.num_nodes {
            return Err(InvalidNodeId {
                node,
                num_nodes: self.num_nodes,
            });
        }
        Ok(self.claim(node))
    }

    #[inline(always)]
    fn claim(&self, node: usize) -> bool {
        if self.bits.swap(node, true, Ordering::Relaxed) {
            false
        } else {
            self.len.fetch_add(1, Ordering::Relaxed);
            true
        }
    }

    /// Removes a node from the set, returning true if it was present.
    pub fn remove(&mut self, node: usize) -> bool {
        if !self.contains(node) {
            return false;
        }
        self.bits.set(node, false, Ordering::Relaxed);
        *self.len.get_mut() -= 1;
        true
    }

    /// Removes all nodes from the set.
    pub fn clear(&mut self) {
        self.bits.fill(false, Ordering::Relaxed);
        *self.len.get_mut() = 0;
    }

    /// Returns an iterator over the nodes of the set in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.num_nodes).filter(move |&node| self.bits.get(node, Ordering::Relaxed))
    }

    /// Retains only the nodes that are also in `other`.
    pub fn retain_all(&mut self, other: &NodeSet) {
        let removed = self
            .iter()
            .filter(|&node| !other.contains(node))
            .collect::<Vec<_>>();
        for node in removed {
            self.remove(node);
        }
    }

    /// Returns the nodes that are both in this set and in `other`, over the
    /// universe of this set.
    pub fn intersection(&self, other: &NodeSet) -> NodeSet {
        let result = NodeSet::new(self.num_nodes);
        self.iter()
            .filter(|&node| other.contains(node))
            .for_each(|node| {
                result.claim(node);
            });
        result
    }

    /// Returns the nodes that are in this set but not in `other`, over the
    /// universe of this set.
    pub fn difference(&self, other: &NodeSet) -> NodeSet {
        let result = NodeSet::new(self.num_nodes);
        self.iter()
            .filter(|&node| !other.contains(node))
            .for_each(|node| {
                result.claim(node);
            });
        result
    }

    /// Returns the nodes that are in this set or in `other`, over the larger
    /// of the two universes.
    pub fn union(&self, other: &NodeSet) -> NodeSet {
        let result = NodeSet::new(self.num_nodes.max(other.num_nodes));
        self.iter().chain(other.iter()).for_each(|node| {
            result.claim(node);
        });
        result
    }

    /// Returns true if every node of this set is also in `other`.
    pub fn is_subset(&self, other: &NodeSet) -> bool {
        self.len() <= other.len() && self.iter().all(|node| other.contains(node))
    }
}

impl Clone for NodeSet {
    fn clone(&self) -> Self {
        let result = NodeSet::new(self.num_nodes);
        self.iter().for_each(|node| {
            result.claim(node);
        });
        result
    }
}

impl PartialEq for NodeSet {
    fn eq(&self, other: &Self) -> bool {
        self.num_nodes == other.num_nodes
            && self.len() == other.len()
            && self.iter().all(|node| other.contains(node))
    }
}

impl Eq for NodeSet {}

impl core::fmt::Debug for NodeSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Extend<usize> for NodeSet {
    fn extend<T: IntoIterator<Item = usize>>(&mut self, iter: T) {
        iter.into_iter().for_each(|node| {
            self.insert(node);
        });
    }
}
