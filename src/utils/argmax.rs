/*
 * SPDX-FileCopyrightText: 2024 Matteo Dell'Acqua
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/// Returns the item of an iterator with the maximum key, or [`None`] if the
/// iterator is empty.
///
/// If the maximum appears several times, this methods returns the first
/// instance, unlike [`Iterator::max_by_key`], which returns the last one.
///
/// # Arguments
///
/// * `iter`: the iterator.
///
/// * `key`: the function computing the key of an item.
///
/// # Examples
/// ```
/// # use fwbw_scc::utils::argmax_by_key;
/// let v = vec![(0, 1), (1, 5), (2, 2), (3, 5)];
/// let item = argmax_by_key(v, |&(_, score)| score);
/// assert_eq!(item, Some((1, 5)));
/// ```
pub fn argmax_by_key<I: IntoIterator, K: Ord>(
    iter: I,
    mut key: impl FnMut(&I::Item) -> K,
) -> Option<I::Item> {
    iter.into_iter()
        .map(|item| (key(&item), item))
        .min_by(|(a, _), (b, _)| b.cmp(a))
        .map(|(_, item)| item)
}
