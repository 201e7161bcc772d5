//! Quadratic assignment problem.
//!
//! Facilities `0..n` are assigned to locations by a permutation `pi`; the
//! cost is `sum_ij flow[i][j] * distance[pi[i]][pi[j]]`. A swap of two
//! assignments is evaluated in O(n) by removing and re-adding only the
//! interaction terms of the two swapped facilities.
//!
//! # Reference
//!
//! Taillard, É. (1991). "Robust taboo search for the quadratic assignment
//! problem", *Parallel Computing* 17, 443-455.

use std::fmt;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::ModelError;
use crate::model::{check_permutation, flatten_square, Cost, Model, Move, PermutationModel};
use crate::random::distinct_pair;

#[derive(Debug)]
struct QapData {
    n: usize,
    flow: Vec<Cost>,
    distance: Vec<Cost>,
}

/// Exchange of the locations assigned to two facilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QapMove {
    /// Swap positions `.0 < .1`.
    Swap(usize, usize),
}

impl QapMove {
    /// Builds a swap with normalized index order.
    pub fn swap(a: usize, b: usize) -> Self {
        QapMove::Swap(a.min(b), a.max(b))
    }
}

impl Move for QapMove {
    type Key = QapMove;

    fn key(&self) -> QapMove {
        *self
    }

    fn inverse(&self) -> Self {
        *self
    }
}

/// A QAP assignment with an incrementally maintained cost.
#[derive(Debug, Clone)]
pub struct QapModel {
    data: Arc<QapData>,
    assignment: Vec<usize>,
    cost: Cost,
}

impl QapModel {
    /// Creates a model with the identity assignment.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_mets::model::Model;
    /// use u_mets::qap::QapModel;
    ///
    /// let flow = vec![vec![0, 2], vec![2, 0]];
    /// let dist = vec![vec![0, 3], vec![3, 0]];
    /// let model = QapModel::new(flow, dist).unwrap();
    /// assert_eq!(model.objective(), 12);
    /// ```
    pub fn new(flow: Vec<Vec<Cost>>, distance: Vec<Vec<Cost>>) -> Result<Self, ModelError> {
        let (n, flow) = flatten_square(flow)?;
        let (m, distance) = flatten_square(distance)?;
        if n != m {
            return Err(ModelError::DimensionMismatch {
                expected: n,
                found: m,
            });
        }
        let mut model = Self {
            data: Arc::new(QapData { n, flow, distance }),
            assignment: (0..n).collect(),
            cost: 0,
        };
        model.cost = model.recompute();
        Ok(model)
    }

    /// Replaces the assignment, recomputing the cost.
    pub fn with_assignment(mut self, assignment: Vec<usize>) -> Result<Self, ModelError> {
        check_permutation(&assignment, self.data.n)?;
        self.assignment = assignment;
        self.cost = self.recompute();
        Ok(self)
    }

    /// Location of every facility.
    pub fn assignment(&self) -> &[usize] {
        &self.assignment
    }

    /// Sum of every term involving facility `i` or `j`, each counted once,
    /// under the assignment `pi`.
    fn interaction(&self, i: usize, j: usize, pi: impl Fn(usize) -> usize) -> Cost {
        let QapData { n, flow, distance } = &*self.data;
        let n = *n;
        let (pi_i, pi_j) = (pi(i), pi(j));
        let mut sum = 0;
        for k in 0..n {
            if k == i || k == j {
                continue;
            }
            let pk = pi(k);
            sum += flow[i * n + k] * distance[pi_i * n + pk]
                + flow[k * n + i] * distance[pk * n + pi_i]
                + flow[j * n + k] * distance[pi_j * n + pk]
                + flow[k * n + j] * distance[pk * n + pi_j];
        }
        sum + flow[i * n + i] * distance[pi_i * n + pi_i]
            + flow[i * n + j] * distance[pi_i * n + pi_j]
            + flow[j * n + i] * distance[pi_j * n + pi_i]
            + flow[j * n + j] * distance[pi_j * n + pi_j]
    }

    fn swap_delta(&self, i: usize, j: usize) -> Cost {
        let p = &self.assignment;
        let before = self.interaction(i, j, |k| p[k]);
        let after = self.interaction(i, j, |k| {
            if k == i {
                p[j]
            } else if k == j {
                p[i]
            } else {
                p[k]
            }
        });
        after - before
    }
}

impl Model for QapModel {
    type Move = QapMove;

    fn size(&self) -> usize {
        self.data.n
    }

    fn objective(&self) -> Cost {
        self.cost
    }

    fn evaluate(&self, mv: &QapMove) -> Cost {
        let QapMove::Swap(i, j) = *mv;
        self.cost + self.swap_delta(i, j)
    }

    fn apply(&mut self, mv: &QapMove) {
        let QapMove::Swap(i, j) = *mv;
        self.cost += self.swap_delta(i, j);
        self.assignment.swap(i, j);
    }

    fn recompute(&self) -> Cost {
        let QapData { n, flow, distance } = &*self.data;
        let n = *n;
        let p = &self.assignment;
        let mut sum = 0;
        for i in 0..n {
            for j in 0..n {
                sum += flow[i * n + j] * distance[p[i] * n + p[j]];
            }
        }
        sum
    }

    fn randomize<R: Rng>(&mut self, rng: &mut R) {
        self.assignment.shuffle(rng);
        self.cost = self.recompute();
    }

    fn random_move<R: Rng>(&self, rng: &mut R) -> Option<QapMove> {
        distinct_pair(self.data.n, rng).map(|(i, j)| QapMove::swap(i, j))
    }
}

impl PermutationModel for QapModel {
    fn permutation(&self) -> &[usize] {
        &self.assignment
    }

    fn swap_move(i: usize, j: usize) -> QapMove {
        QapMove::swap(i, j)
    }
}

/// Renders the assignment 1-indexed, as in QAPLIB solution files.
impl fmt::Display for QapModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (k, p) in self.assignment.iter().enumerate() {
            if k > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", p + 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    fn scenario_matrix() -> Vec<Vec<Cost>> {
        vec![
            vec![0, 1, 2, 3],
            vec![1, 0, 4, 5],
            vec![2, 4, 0, 6],
            vec![3, 5, 6, 0],
        ]
    }

    fn random_matrix<R: Rng>(n: usize, rng: &mut R) -> Vec<Vec<Cost>> {
        (0..n)
            .map(|_| (0..n).map(|_| rng.random_range(0..20)).collect())
            .collect()
    }

    #[test]
    fn test_identity_cost_matches_sum_of_squares() {
        let f = scenario_matrix();
        let expected: Cost = f.iter().flatten().map(|v| v * v).sum();
        let model = QapModel::new(f.clone(), f).unwrap();
        assert_eq!(model.objective(), expected);
        assert_eq!(model.recompute(), expected);
    }

    #[test]
    fn test_scenario_swap_matches_recompute() {
        let f = scenario_matrix();
        let mut model = QapModel::new(f.clone(), f).unwrap();
        let predicted = model.evaluate(&QapMove::swap(0, 1));
        model.apply(&QapMove::swap(0, 1));
        assert_eq!(model.assignment(), &[1, 0, 2, 3]);
        assert_eq!(model.objective(), predicted);
        assert_eq!(model.objective(), model.recompute());
    }

    #[test]
    fn test_asymmetric_with_diagonal() {
        let mut rng = create_rng(11);
        let f = random_matrix(7, &mut rng);
        let d = random_matrix(7, &mut rng);
        let mut model = QapModel::new(f, d).unwrap();
        for _ in 0..200 {
            let mv = model.random_move(&mut rng).unwrap();
            let predicted = model.evaluate(&mv);
            model.apply(&mv);
            assert_eq!(model.objective(), predicted);
            assert_eq!(model.objective(), model.recompute());
        }
    }

    #[test]
    fn test_apply_unapply_restores() {
        let mut rng = create_rng(3);
        let f = random_matrix(10, &mut rng);
        let d = random_matrix(10, &mut rng);
        let mut model = QapModel::new(f, d).unwrap();
        model.randomize(&mut rng);
        for _ in 0..1000 {
            let mv = model.random_move(&mut rng).unwrap();
            let perm = model.assignment().to_vec();
            let cost = model.objective();
            model.apply(&mv);
            model.unapply(&mv);
            assert_eq!(model.assignment(), perm.as_slice());
            assert_eq!(model.objective(), cost);
            model.apply(&mv);
        }
        assert!(model.verify().is_ok());
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = QapModel::new(scenario_matrix(), vec![vec![0, 1], vec![1, 0]]).unwrap_err();
        assert_eq!(
            err,
            ModelError::DimensionMismatch {
                expected: 4,
                found: 2
            }
        );
    }

    #[test]
    fn test_with_assignment_and_display() {
        let f = scenario_matrix();
        let model = QapModel::new(f.clone(), f)
            .unwrap()
            .with_assignment(vec![3, 2, 1, 0])
            .unwrap();
        assert_eq!(model.to_string(), "4 3 2 1");
        assert_eq!(model.objective(), model.recompute());
        assert!(QapModel::new(scenario_matrix(), scenario_matrix())
            .unwrap()
            .with_assignment(vec![0, 0, 1, 2])
            .is_err());
    }

    #[test]
    fn test_single_facility_has_no_moves() {
        let mut rng = create_rng(1);
        let model = QapModel::new(vec![vec![5]], vec![vec![2]]).unwrap();
        assert_eq!(model.objective(), 10);
        assert!(model.random_move(&mut rng).is_none());
    }

    #[test]
    fn test_randomize_is_seeded_permutation() {
        let mut rng = create_rng(8);
        let model = QapModel::new(random_matrix(12, &mut rng), random_matrix(12, &mut rng)).unwrap();
        let mut a = model.clone();
        let mut b = model;
        a.randomize(&mut create_rng(3));
        b.randomize(&mut create_rng(3));
        assert_eq!(a.assignment(), b.assignment());
        assert!(check_permutation(a.assignment(), 12).is_ok());
        assert_ne!(a.assignment(), (0..12).collect::<Vec<_>>().as_slice());
        assert_eq!(a.objective(), a.recompute());
    }
}
