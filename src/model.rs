//! Core traits shared by every problem model.
//!
//! A [`Model`] owns the current state of a solution together with a cached
//! objective value that is kept up to date by delta evaluation. Moves are
//! small values that identify a transformation; the model knows how to
//! evaluate, apply and undo them.
//!
//! # Minimization
//!
//! All models minimize their objective. Objectives are integers so that
//! apply/unapply round trips restore the cached value exactly.

use std::fmt;
use std::hash::Hash;

use rand::Rng;

use crate::error::{ModelError, SearchError};

/// Objective value type.
pub type Cost = i64;

/// A reversible transformation of a [`Model`].
///
/// The move itself owns no problem data. Two moves with equal keys are
/// the same transformation as far as tabu memory is concerned.
pub trait Move: Copy + fmt::Debug {
    /// Hashable identity of the move.
    type Key: Copy + Eq + Hash + fmt::Debug;

    /// Returns the identity used for tabu lookups.
    fn key(&self) -> Self::Key;

    /// Returns the move that undoes `self` on the state it was generated
    /// for. Swaps and inversions are their own inverse.
    fn inverse(&self) -> Self;
}

/// A solution state with an incrementally maintained objective.
///
/// Cloning a model produces an independent snapshot of the state and the
/// cached objective. Implementations share immutable problem data, so a
/// clone costs O(state), not O(problem).
pub trait Model: Clone {
    /// The closed set of moves applicable to this model.
    type Move: Move;

    /// Problem size (permutation length, node count, item count).
    fn size(&self) -> usize;

    /// Cached objective value, O(1).
    fn objective(&self) -> Cost;

    /// Objective value the model would have after `mv`, without mutating
    /// the state.
    fn evaluate(&self, mv: &Self::Move) -> Cost;

    /// Applies `mv` in place, updating the cached objective by delta.
    fn apply(&mut self, mv: &Self::Move);

    /// Undoes a previous [`apply`](Model::apply) of `mv`.
    fn unapply(&mut self, mv: &Self::Move) {
        self.apply(&mv.inverse());
    }

    /// Full recomputation of the objective from the state.
    ///
    /// Used as a correctness check, never on the hot path.
    fn recompute(&self) -> Cost;

    /// Replaces the state with a uniformly random one.
    fn randomize<R: Rng>(&mut self, rng: &mut R);

    /// Draws a random non-degenerate simple move, used for perturbation.
    ///
    /// Returns `None` when the problem is too small to have one.
    fn random_move<R: Rng>(&self, rng: &mut R) -> Option<Self::Move>;

    /// Compares the cached objective with a full recomputation.
    fn verify(&self) -> Result<(), SearchError> {
        let recomputed = self.recompute();
        let cached = self.objective();
        if cached == recomputed {
            Ok(())
        } else {
            Err(SearchError::ObjectiveMismatch { cached, recomputed })
        }
    }
}

/// A model whose state is a permutation, explored with swap moves.
pub trait PermutationModel: Model {
    /// The current permutation.
    fn permutation(&self) -> &[usize];

    /// Builds the move exchanging positions `i` and `j`.
    fn swap_move(i: usize, j: usize) -> Self::Move;
}

/// Applies a random number of random simple moves.
///
/// Returns the number of moves actually applied.
pub fn perturb<M: Model, R: Rng>(model: &mut M, moves: usize, rng: &mut R) -> usize {
    let mut applied = 0;
    for _ in 0..moves {
        match model.random_move(rng) {
            Some(mv) => {
                model.apply(&mv);
                applied += 1;
            }
            None => break,
        }
    }
    applied
}

/// Flattens a square matrix into row-major storage.
pub(crate) fn flatten_square(rows: Vec<Vec<Cost>>) -> Result<(usize, Vec<Cost>), ModelError> {
    let n = rows.len();
    if n == 0 {
        return Err(ModelError::Empty);
    }
    let mut flat = Vec::with_capacity(n * n);
    for (row, values) in rows.into_iter().enumerate() {
        if values.len() != n {
            return Err(ModelError::NotSquare {
                row,
                expected: n,
                found: values.len(),
            });
        }
        flat.extend(values);
    }
    Ok((n, flat))
}

/// Checks that `perm` is a permutation of `0..n`.
pub(crate) fn check_permutation(perm: &[usize], n: usize) -> Result<(), ModelError> {
    if perm.len() != n {
        return Err(ModelError::InvalidState(format!(
            "permutation has length {}, expected {n}",
            perm.len()
        )));
    }
    let mut seen = vec![false; n];
    for &v in perm {
        if v >= n || seen[v] {
            return Err(ModelError::InvalidState(format!(
                "{v} is out of range or repeated"
            )));
        }
        seen[v] = true;
    }
    Ok(())
}
