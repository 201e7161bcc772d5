//! Subset sum, a small model for getting started with the engine.
//!
//! Choose a subset of `values` whose sum comes as close as possible to
//! `target` from below. Overshooting is allowed but penalized a hundred
//! times more than undershooting, so the search can cross infeasible
//! regions without settling there.

use std::fmt;
use std::sync::Arc;

use rand::Rng;

use crate::model::{Cost, Model, Move};
use crate::neighborhood::{MoveArena, Neighborhood};

const OVERSHOOT_PENALTY: Cost = 100;

/// Flips the membership of one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Toggle(pub usize);

impl Move for Toggle {
    type Key = usize;

    fn key(&self) -> usize {
        self.0
    }

    fn inverse(&self) -> Self {
        *self
    }
}

/// Subset selection with a running sum.
#[derive(Debug, Clone)]
pub struct SubsetSumModel {
    values: Arc<[Cost]>,
    target: Cost,
    chosen: Vec<bool>,
    sum: Cost,
}

impl SubsetSumModel {
    /// Creates a model with the empty subset selected.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_mets::model::Model;
    /// use u_mets::subset_sum::SubsetSumModel;
    ///
    /// let model = SubsetSumModel::new(vec![3, 5, 7], 10);
    /// assert_eq!(model.objective(), 10);
    /// ```
    pub fn new(values: Vec<Cost>, target: Cost) -> Self {
        let n = values.len();
        Self {
            values: values.into(),
            target,
            chosen: vec![false; n],
            sum: 0,
        }
    }

    /// The target sum.
    pub fn target(&self) -> Cost {
        self.target
    }

    /// Sum of the chosen values.
    pub fn sum(&self) -> Cost {
        self.sum
    }

    /// Whether item `i` is in the subset.
    pub fn is_chosen(&self, i: usize) -> bool {
        self.chosen[i]
    }

    /// The chosen values, in input order.
    pub fn chosen_values(&self) -> Vec<Cost> {
        self.values
            .iter()
            .zip(&self.chosen)
            .filter(|&(_, &c)| c)
            .map(|(&v, _)| v)
            .collect()
    }

    fn penalty(&self, sum: Cost) -> Cost {
        let diff = self.target - sum;
        if diff < 0 {
            -OVERSHOOT_PENALTY * diff
        } else {
            diff
        }
    }

    fn toggled_sum(&self, i: usize) -> Cost {
        if self.chosen[i] {
            self.sum - self.values[i]
        } else {
            self.sum + self.values[i]
        }
    }
}

impl Model for SubsetSumModel {
    type Move = Toggle;

    fn size(&self) -> usize {
        self.chosen.len()
    }

    fn objective(&self) -> Cost {
        self.penalty(self.sum)
    }

    fn evaluate(&self, mv: &Toggle) -> Cost {
        self.penalty(self.toggled_sum(mv.0))
    }

    fn apply(&mut self, mv: &Toggle) {
        self.sum = self.toggled_sum(mv.0);
        self.chosen[mv.0] = !self.chosen[mv.0];
    }

    fn recompute(&self) -> Cost {
        self.penalty(self.chosen_values().iter().sum())
    }

    fn randomize<R: Rng>(&mut self, rng: &mut R) {
        self.chosen.iter_mut().for_each(|c| *c = rng.random_bool(0.5));
        self.sum = self.chosen_values().iter().sum();
    }

    fn random_move<R: Rng>(&self, rng: &mut R) -> Option<Toggle> {
        if self.chosen.is_empty() {
            None
        } else {
            Some(Toggle(rng.random_range(0..self.chosen.len())))
        }
    }
}

/// Renders the chosen values separated by spaces.
impl fmt::Display for SubsetSumModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (k, v) in self.chosen_values().iter().enumerate() {
            if k > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Every single-item toggle.
#[derive(Debug, Clone, Default)]
pub struct ToggleNeighborhood {
    arena: MoveArena<Toggle>,
}

impl ToggleNeighborhood {
    /// Creates an empty neighborhood; candidates are built on refresh.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Neighborhood<SubsetSumModel> for ToggleNeighborhood {
    fn refresh<R: Rng>(&mut self, model: &SubsetSumModel, _rng: &mut R) {
        if self.arena.len() == model.size() {
            return;
        }
        self.arena.clear();
        for i in 0..model.size() {
            self.arena.push(Toggle(i));
        }
    }

    fn arena(&self) -> &MoveArena<Toggle> {
        &self.arena
    }
}
