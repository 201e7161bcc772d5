//! Best-seen solution recording.
//!
//! The same [`BestOf`] type is used at every nesting level of a run: the
//! best of one search phase, the best since the last restart, and the
//! overall incumbent. Promotion from an inner level to an outer one is an
//! ordinary [`accept`](BestOf::accept) of the inner best.

use crate::model::{Cost, Model};

/// Which way costs improve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Lower is better.
    #[default]
    Minimize,
    /// Higher is better.
    Maximize,
}

/// Whether a candidate of equal cost replaces the recorded one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Acceptance {
    /// Only strictly better candidates are recorded.
    #[default]
    Strict,
    /// Equal candidates are recorded too.
    AllowEqual,
}

/// Snapshot of the best state seen so far.
///
/// # Examples
///
/// ```
/// use u_mets::model::Model;
/// use u_mets::recorder::BestOf;
/// use u_mets::subset_sum::{SubsetSumModel, Toggle};
///
/// let mut model = SubsetSumModel::new(vec![4, 8], 10);
/// let mut best = BestOf::new(&model);
/// model.apply(&Toggle(1));
/// assert!(best.accept(&model));
/// assert_eq!(best.cost(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct BestOf<M> {
    best: M,
    cost: Cost,
    direction: Direction,
    acceptance: Acceptance,
    updates: usize,
}

impl<M: Model> BestOf<M> {
    /// Records `initial` as the best so far, minimizing with strict
    /// acceptance.
    pub fn new(initial: &M) -> Self {
        Self {
            best: initial.clone(),
            cost: initial.objective(),
            direction: Direction::Minimize,
            acceptance: Acceptance::Strict,
            updates: 0,
        }
    }

    /// Sets the comparison direction.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Sets the acceptance policy.
    pub fn with_acceptance(mut self, acceptance: Acceptance) -> Self {
        self.acceptance = acceptance;
        self
    }

    /// Whether a state of cost `cost` would be recorded.
    pub fn improves(&self, cost: Cost) -> bool {
        match (self.direction, self.acceptance) {
            (Direction::Minimize, Acceptance::Strict) => cost < self.cost,
            (Direction::Minimize, Acceptance::AllowEqual) => cost <= self.cost,
            (Direction::Maximize, Acceptance::Strict) => cost > self.cost,
            (Direction::Maximize, Acceptance::AllowEqual) => cost >= self.cost,
        }
    }

    /// Records `candidate` if it improves on the best so far.
    pub fn accept(&mut self, candidate: &M) -> bool {
        let cost = candidate.objective();
        if !self.improves(cost) {
            return false;
        }
        self.best.clone_from(candidate);
        self.cost = cost;
        self.updates += 1;
        true
    }

    /// Unconditionally records `state`, e.g. at the start of a new phase.
    pub fn reset_to(&mut self, state: &M) {
        self.best.clone_from(state);
        self.cost = state.objective();
    }

    /// The best state.
    pub fn best(&self) -> &M {
        &self.best
    }

    /// Cost of the best state.
    pub fn cost(&self) -> Cost {
        self.cost
    }

    /// Number of times a candidate was recorded.
    pub fn updates(&self) -> usize {
        self.updates
    }

    /// Consumes the recorder, returning the best state.
    pub fn into_best(self) -> M {
        self.best
    }
}
