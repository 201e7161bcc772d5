//! Asymmetric traveling salesman problem.
//!
//! The last city of the instance is a fixed depot; the tour is a
//! permutation of the remaining `n - 1` cities and the cost is the length
//! of the closed walk `depot -> tour[0] -> ... -> tour[n-2] -> depot`.
//!
//! Because the matrix is asymmetric, inverting a subsequence changes the
//! cost of every edge inside it, not only of the two boundary edges. The
//! model keeps prefix sums of the tour edges in both directions so that an
//! inversion is still evaluated in O(1). Applying a move adds its delta to
//! the cached length and refreshes the prefix sums from the first touched
//! edge on.

use std::fmt;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::ModelError;
use crate::model::{flatten_square, Cost, Model, Move, PermutationModel};
use crate::neighborhood::{MoveArena, Neighborhood};
use crate::random::distinct_pair;

#[derive(Debug)]
struct AtspData {
    n: usize,
    matrix: Vec<Cost>,
}

impl AtspData {
    #[inline]
    fn w(&self, from: usize, to: usize) -> Cost {
        self.matrix[from * self.n + to]
    }

    #[inline]
    fn depot(&self) -> usize {
        self.n - 1
    }
}

/// A move on an ATSP tour. Indices are tour positions, `.0 < .1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AtspMove {
    /// Exchange the cities at two positions.
    Swap(usize, usize),
    /// Reverse the subsequence between two positions, inclusive.
    Invert(usize, usize),
}

impl AtspMove {
    /// Builds a swap with normalized index order.
    pub fn swap(a: usize, b: usize) -> Self {
        AtspMove::Swap(a.min(b), a.max(b))
    }

    /// Builds an inversion with normalized index order.
    pub fn invert(a: usize, b: usize) -> Self {
        AtspMove::Invert(a.min(b), a.max(b))
    }
}

impl Move for AtspMove {
    type Key = AtspMove;

    fn key(&self) -> AtspMove {
        *self
    }

    fn inverse(&self) -> Self {
        *self
    }
}

/// An ATSP tour with an incrementally maintained length.
#[derive(Debug, Clone)]
pub struct AtspModel {
    data: Arc<AtspData>,
    tour: Vec<usize>,
    /// `forward[e]` is the length of the first `e` edges of the closed walk.
    forward: Vec<Cost>,
    /// Same as `forward`, with every edge traversed backwards.
    backward: Vec<Cost>,
    cost: Cost,
}

impl AtspModel {
    /// Creates a model from a full distance matrix with the tour in index
    /// order. The matrix needs at least two cities.
    pub fn new(matrix: Vec<Vec<Cost>>) -> Result<Self, ModelError> {
        let (n, matrix) = flatten_square(matrix)?;
        if n < 2 {
            return Err(ModelError::InvalidState(
                "a tour needs a depot and at least one city".into(),
            ));
        }
        let mut model = Self {
            data: Arc::new(AtspData { n, matrix }),
            tour: (0..n - 1).collect(),
            forward: Vec::with_capacity(n + 1),
            backward: Vec::with_capacity(n + 1),
            cost: 0,
        };
        model.rebuild();
        Ok(model)
    }

    /// The tour, without the depot.
    pub fn tour(&self) -> &[usize] {
        &self.tour
    }

    /// Index of the depot city.
    pub fn depot(&self) -> usize {
        self.data.depot()
    }

    /// City at extended position `p`, where positions `0` and
    /// `tour.len() + 1` are the depot.
    #[inline]
    fn city(&self, p: usize) -> usize {
        city_at(&self.tour, self.data.depot(), p)
    }

    fn rebuild(&mut self) {
        let edges = self.tour.len() + 1;
        self.forward.clear();
        self.forward.resize(edges + 1, 0);
        self.backward.clear();
        self.backward.resize(edges + 1, 0);
        self.refresh_prefix(0);
        self.cost = self.forward[edges];
    }

    /// Recomputes the prefix sums of edge `from` and every later edge.
    fn refresh_prefix(&mut self, from: usize) {
        let data = &*self.data;
        let depot = data.depot();
        let m = self.tour.len();
        let (mut fwd, mut bwd) = (self.forward[from], self.backward[from]);
        for e in from..=m {
            let a = city_at(&self.tour, depot, e);
            let b = city_at(&self.tour, depot, e + 1);
            fwd += data.w(a, b);
            bwd += data.w(b, a);
            self.forward[e + 1] = fwd;
            self.backward[e + 1] = bwd;
        }
    }

    fn swap_delta(&self, i: usize, j: usize) -> Cost {
        let (a, b) = (i + 1, j + 1);
        let moved = |p: usize| {
            if p == a {
                self.city(b)
            } else if p == b {
                self.city(a)
            } else {
                self.city(p)
            }
        };
        let mut edges = [a - 1, a, b - 1, b];
        let count = if b == a + 1 {
            edges[2] = b;
            3
        } else {
            4
        };
        let data = &*self.data;
        edges[..count]
            .iter()
            .map(|&e| data.w(moved(e), moved(e + 1)) - data.w(self.city(e), self.city(e + 1)))
            .sum()
    }

    fn invert_delta(&self, i: usize, j: usize) -> Cost {
        let (a, b) = (i + 1, j + 1);
        let data = &*self.data;
        let (before, first, last, after) =
            (self.city(a - 1), self.city(a), self.city(b), self.city(b + 1));
        let boundary = data.w(before, last) + data.w(first, after)
            - data.w(before, first)
            - data.w(last, after);
        let internal =
            (self.backward[b] - self.backward[a]) - (self.forward[b] - self.forward[a]);
        boundary + internal
    }

    fn delta(&self, mv: &AtspMove) -> Cost {
        match *mv {
            AtspMove::Swap(i, j) => self.swap_delta(i, j),
            AtspMove::Invert(i, j) => self.invert_delta(i, j),
        }
    }
}

#[inline]
fn city_at(tour: &[usize], depot: usize, p: usize) -> usize {
    if p == 0 || p > tour.len() {
        depot
    } else {
        tour[p - 1]
    }
}

impl Model for AtspModel {
    type Move = AtspMove;

    fn size(&self) -> usize {
        self.tour.len()
    }

    fn objective(&self) -> Cost {
        self.cost
    }

    fn evaluate(&self, mv: &AtspMove) -> Cost {
        self.cost + self.delta(mv)
    }

    fn apply(&mut self, mv: &AtspMove) {
        self.cost += self.delta(mv);
        // edge `i` enters position `i + 1`, the first one the move touches
        let first = match *mv {
            AtspMove::Swap(i, j) => {
                debug_assert!(i < j && j < self.tour.len(), "{mv:?}");
                self.tour.swap(i, j);
                i
            }
            AtspMove::Invert(i, j) => {
                self.tour[i..=j].reverse();
                i
            }
        };
        self.refresh_prefix(first);
    }

    fn recompute(&self) -> Cost {
        let data = &*self.data;
        let depot = data.depot();
        let mut sum = 0;
        let mut prev = depot;
        for &c in &self.tour {
            sum += data.w(prev, c);
            prev = c;
        }
        sum + data.w(prev, depot)
    }

    fn randomize<R: Rng>(&mut self, rng: &mut R) {
        self.tour.shuffle(rng);
        self.rebuild();
    }

    fn random_move<R: Rng>(&self, rng: &mut R) -> Option<AtspMove> {
        distinct_pair(self.tour.len(), rng).map(|(i, j)| AtspMove::swap(i, j))
    }
}

impl PermutationModel for AtspModel {
    fn permutation(&self) -> &[usize] {
        &self.tour
    }

    fn swap_move(i: usize, j: usize) -> AtspMove {
        AtspMove::swap(i, j)
    }
}

/// Renders the tour 1-indexed, depot omitted.
impl fmt::Display for AtspModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (k, c) in self.tour.iter().enumerate() {
            if k > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", c + 1)?;
        }
        Ok(())
    }
}

/// Every subsequence inversion `i < j`.
#[derive(Debug, Clone, Default)]
pub struct InversionNeighborhood {
    arena: MoveArena<AtspMove>,
    built_for: Option<usize>,
}

impl InversionNeighborhood {
    /// Creates the neighborhood; moves are generated on first refresh.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Neighborhood<AtspModel> for InversionNeighborhood {
    fn refresh<R: Rng>(&mut self, model: &AtspModel, _rng: &mut R) {
        let m = model.tour.len();
        if self.built_for == Some(m) {
            return;
        }
        self.arena.clear();
        for i in 0..m {
            for j in (i + 1)..m {
                self.arena.push(AtspMove::invert(i, j));
            }
        }
        self.built_for = Some(m);
    }

    fn arena(&self) -> &MoveArena<AtspMove> {
        &self.arena
    }
}

/// Compound neighborhood: an inversion followed by an exchange of two
/// tour neighbours, which together reconnect three tour edges. The last
/// and first cities of the tour count as neighbours.
///
/// The neighborhood has O(n^3) candidates and suits small instances.
#[derive(Debug, Clone, Default)]
pub struct ThreeOptNeighborhood {
    arena: MoveArena<AtspMove>,
    built_for: Option<usize>,
}

impl ThreeOptNeighborhood {
    /// Creates the neighborhood; moves are generated on first refresh.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Neighborhood<AtspModel> for ThreeOptNeighborhood {
    fn refresh<R: Rng>(&mut self, model: &AtspModel, _rng: &mut R) {
        let m = model.tour.len();
        if self.built_for == Some(m) {
            return;
        }
        self.arena.clear();
        // with two cities the wrapping pair is the plain pair again
        let pairs = if m > 2 { m } else { m.saturating_sub(1) };
        for i in 0..m {
            for j in (i + 1)..m {
                for k in 0..pairs {
                    let exchange = AtspMove::swap(k, (k + 1) % m);
                    // Inverting and re-swapping the same adjacent pair cancels out.
                    if j == i + 1 && exchange == AtspMove::swap(i, j) {
                        continue;
                    }
                    self.arena
                        .push_compound(&[AtspMove::invert(i, j), exchange]);
                }
            }
        }
        self.built_for = Some(m);
    }

    fn arena(&self) -> &MoveArena<AtspMove> {
        &self.arena
    }
}
