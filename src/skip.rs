//! Walklet skip transform.
//!
//! A walk `[v0, v1, v2, ...]` at scale `k` becomes `k` subsequences, the `i`-th holding every
//! `k`-th node from offset `i`. Training with window 1 on these relates nodes `k` hops apart.

use crate::random_walk::Walk;

/// Split `walk` into exactly `skip` interleaved subsequences.
///
/// Short walks give empty subsequences; those are kept. `skip == 0` yields nothing.
pub fn walk_skips<T: Clone>(walk: &[T], skip: usize) -> Vec<Vec<T>> {
    (0..skip)
        .map(|offset| walk.iter().skip(offset).step_by(skip).cloned().collect())
        .collect()
}

/// Trainer sentences for one scale: the skips of every walk, ids rendered as strings.
pub fn corpus_at_scale(walks: &[Walk], skip: usize) -> Vec<Vec<String>> {
    let mut sentences = Vec::with_capacity(walks.len() * skip);
    for walk in walks {
        for part in walk_skips(walk, skip) {
            sentences.push(part.iter().map(usize::to_string).collect());
        }
    }
    sentences
}
