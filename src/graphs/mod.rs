/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! In-memory implementations of the [graph capability](crate::traits::DirectedGraph).

pub mod random;
pub mod vec_graph;

pub mod prelude {
    pub use super::random::ErdosRenyi;
    pub use super::vec_graph::VecDigraph;
}
