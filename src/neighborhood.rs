//! Candidate generation.
//!
//! A [`Neighborhood`] regenerates its candidate list against the current
//! state on every [`refresh`](Neighborhood::refresh). Candidates are
//! ranges into a [`MoveArena`] of primitive moves: a range of length one
//! is a simple move, a longer range is a compound move whose members are
//! applied in order as one atomic step. The arena is reused between
//! refreshes, so steady-state regeneration does not allocate.

use rand::Rng;

use crate::model::{Cost, Model, Move, PermutationModel};
use crate::random::distinct_pair;

/// A candidate: a range of primitive moves inside a [`MoveArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    start: usize,
    end: usize,
}

impl Candidate {
    /// Number of primitive moves in the candidate.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Always false for candidates built by a [`MoveArena`].
    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    /// Whether the candidate is made of two or more primitives.
    pub fn is_compound(&self) -> bool {
        self.len() > 1
    }
}

/// Storage for the primitive moves of a neighborhood.
#[derive(Debug, Clone)]
pub struct MoveArena<Mv> {
    moves: Vec<Mv>,
    candidates: Vec<Candidate>,
}

impl<Mv> Default for MoveArena<Mv> {
    fn default() -> Self {
        Self {
            moves: Vec::new(),
            candidates: Vec::new(),
        }
    }
}

impl<Mv: Copy> MoveArena<Mv> {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes all candidates, keeping the allocations.
    pub fn clear(&mut self) {
        self.moves.clear();
        self.candidates.clear();
    }

    /// Adds a simple candidate.
    pub fn push(&mut self, mv: Mv) {
        let start = self.moves.len();
        self.moves.push(mv);
        self.candidates.push(Candidate {
            start,
            end: start + 1,
        });
    }

    /// Adds a compound candidate made of `moves`, applied in order.
    ///
    /// An empty slice is ignored.
    pub fn push_compound(&mut self, moves: &[Mv]) {
        if moves.is_empty() {
            return;
        }
        let start = self.moves.len();
        self.moves.extend_from_slice(moves);
        self.candidates.push(Candidate {
            start,
            end: self.moves.len(),
        });
    }

    /// All candidates in generation order.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// The primitive moves of `candidate`.
    pub fn moves(&self, candidate: Candidate) -> &[Mv] {
        &self.moves[candidate.start..candidate.end]
    }

    /// Iterates candidates as move slices.
    pub fn iter(&self) -> impl Iterator<Item = &[Mv]> + '_ {
        self.candidates.iter().map(move |&c| self.moves(c))
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether there are no candidates.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// A generator of candidate moves for a model type.
pub trait Neighborhood<M: Model> {
    /// Regenerates the candidate list against the current state.
    fn refresh<R: Rng>(&mut self, model: &M, rng: &mut R);

    /// Read-only view of the candidates produced by the last refresh.
    fn arena(&self) -> &MoveArena<M::Move>;
}

/// Objective after applying all of `moves`, leaving `model` unchanged.
///
/// Compound candidates apply every member but the last, evaluate the
/// last one by delta and unapply the prefix in reverse order.
pub fn evaluate_candidate<M: Model>(model: &mut M, moves: &[M::Move]) -> Cost {
    match moves.split_last() {
        None => model.objective(),
        Some((last, [])) => model.evaluate(last),
        Some((last, prefix)) => {
            for mv in prefix {
                model.apply(mv);
            }
            let cost = model.evaluate(last);
            for mv in prefix.iter().rev() {
                model.unapply(mv);
            }
            cost
        }
    }
}

/// Applies the members of a candidate in order.
pub fn apply_candidate<M: Model>(model: &mut M, moves: &[M::Move]) {
    for mv in moves {
        model.apply(mv);
    }
}

/// Undoes a candidate, unapplying its members in reverse order.
pub fn unapply_candidate<M: Model>(model: &mut M, moves: &[M::Move]) {
    for mv in moves.iter().rev() {
        model.unapply(mv);
    }
}

/// Writes the identity of a candidate into `out`.
pub(crate) fn candidate_keys<Mv: Move>(moves: &[Mv], out: &mut Vec<Mv::Key>) {
    out.clear();
    out.extend(moves.iter().map(Move::key));
}

/// Writes the identity of the candidate that reverses `moves` into `out`.
pub(crate) fn reversal_keys<Mv: Move>(moves: &[Mv], out: &mut Vec<Mv::Key>) {
    out.clear();
    out.extend(moves.iter().rev().map(|mv| mv.inverse().key()));
}

/// Candidate generation policy for swap neighborhoods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sampling {
    /// Every pair `i < j`, generated once per problem size.
    Exhaustive,
    /// Fresh random swaps and double swaps on every refresh.
    Sampled {
        /// Number of single swaps.
        simple: usize,
        /// Number of compound double swaps.
        double: usize,
    },
}

/// Swap neighborhood for any [`PermutationModel`].
#[derive(Debug, Clone)]
pub struct SwapNeighborhood<M: Model> {
    sampling: Sampling,
    arena: MoveArena<M::Move>,
    built_for: Option<usize>,
}

impl<M: PermutationModel> SwapNeighborhood<M> {
    /// Every swap pair.
    pub fn full() -> Self {
        Self::with_sampling(Sampling::Exhaustive)
    }

    /// `simple` random swaps plus `double` random double swaps per refresh.
    pub fn sampled(simple: usize, double: usize) -> Self {
        Self::with_sampling(Sampling::Sampled { simple, double })
    }

    /// Creates a neighborhood with the given policy.
    pub fn with_sampling(sampling: Sampling) -> Self {
        Self {
            sampling,
            arena: MoveArena::new(),
            built_for: None,
        }
    }

    /// The generation policy.
    pub fn sampling(&self) -> Sampling {
        self.sampling
    }
}

impl<M: PermutationModel> Neighborhood<M> for SwapNeighborhood<M> {
    fn refresh<R: Rng>(&mut self, model: &M, rng: &mut R) {
        let n = model.permutation().len();
        match self.sampling {
            Sampling::Exhaustive => {
                // Swap moves do not depend on the state, only on its size.
                if self.built_for == Some(n) {
                    return;
                }
                self.arena.clear();
                for i in 0..n {
                    for j in (i + 1)..n {
                        self.arena.push(M::swap_move(i, j));
                    }
                }
                self.built_for = Some(n);
            }
            Sampling::Sampled { simple, double } => {
                self.arena.clear();
                self.built_for = None;
                if n < 2 {
                    return;
                }
                for _ in 0..simple {
                    if let Some((i, j)) = distinct_pair(n, rng) {
                        self.arena.push(M::swap_move(i, j));
                    }
                }
                // A double swap of the same pair is the identity.
                if n < 3 {
                    return;
                }
                for _ in 0..double {
                    let (a, b) = loop {
                        let a = ordered(distinct_pair(n, rng));
                        let b = ordered(distinct_pair(n, rng));
                        if a != b {
                            break (a, b);
                        }
                    };
                    self.arena
                        .push_compound(&[M::swap_move(a.0, a.1), M::swap_move(b.0, b.1)]);
                }
            }
        }
    }

    fn arena(&self) -> &MoveArena<M::Move> {
        &self.arena
    }
}

fn ordered(pair: Option<(usize, usize)>) -> (usize, usize) {
    match pair {
        Some((i, j)) if i < j => (i, j),
        Some((i, j)) => (j, i),
        None => (0, 0),
    }
}
