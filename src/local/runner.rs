//! Local Search execution engine.

use rand::Rng;

use crate::error::SearchError;
use crate::model::{Cost, Model};
use crate::neighborhood::{apply_candidate, evaluate_candidate, Candidate, Neighborhood};
use crate::observer::{SearchEvent, SearchObserver, SearchStep};
use crate::recorder::BestOf;
use crate::tabu::{PhaseResult, Stop};
use crate::termination::Termination;

use super::config::{Descent, LocalSearchConfig};

/// One descent over borrowed search components.
///
/// # Examples
///
/// ```
/// use u_mets::local::{LocalSearch, LocalSearchConfig};
/// use u_mets::model::Model;
/// use u_mets::neighborhood::SwapNeighborhood;
/// use u_mets::observer::NoopObserver;
/// use u_mets::qap::QapModel;
/// use u_mets::random::create_rng;
/// use u_mets::recorder::BestOf;
///
/// let f = vec![vec![0, 5, 1], vec![5, 0, 2], vec![1, 2, 0]];
/// let d = vec![vec![0, 1, 4], vec![1, 0, 3], vec![4, 3, 0]];
/// let mut model = QapModel::new(f, d).unwrap();
/// let mut best = BestOf::new(&model);
/// let mut neighborhood = SwapNeighborhood::full();
/// let config = LocalSearchConfig::default();
///
/// LocalSearch::new(&config, &mut neighborhood, &mut NoopObserver)
///     .search(&mut model, &mut best, &mut create_rng(7))
///     .unwrap();
/// assert_eq!(best.cost(), model.objective());
/// ```
pub struct LocalSearch<'a, N, O> {
    config: &'a LocalSearchConfig,
    neighborhood: &'a mut N,
    observer: &'a mut O,
    step: SearchStep,
}

impl<'a, N, O: SearchObserver> LocalSearch<'a, N, O> {
    /// Prepares a descent.
    pub fn new(config: &'a LocalSearchConfig, neighborhood: &'a mut N, observer: &'a mut O) -> Self {
        Self {
            config,
            neighborhood,
            observer,
            step: SearchStep::Running,
        }
    }

    /// The state of the descent after its latest step.
    pub fn step(&self) -> SearchStep {
        self.step
    }

    /// Descends until a local optimum or the configured iteration cap.
    pub fn search<M, R>(
        &mut self,
        model: &mut M,
        best: &mut BestOf<M>,
        rng: &mut R,
    ) -> Result<PhaseResult, SearchError>
    where
        M: Model,
        N: Neighborhood<M>,
        R: Rng,
    {
        let mut termination = self.config.termination();
        self.search_until(model, best, termination.as_mut(), rng)
    }

    /// Descends until a local optimum or until `termination` fires.
    pub fn search_until<M, R>(
        &mut self,
        model: &mut M,
        best: &mut BestOf<M>,
        mut termination: Option<&mut Termination>,
        rng: &mut R,
    ) -> Result<PhaseResult, SearchError>
    where
        M: Model,
        N: Neighborhood<M>,
        R: Rng,
    {
        self.config.validate().map_err(SearchError::InvalidConfig)?;

        let mut result = PhaseResult {
            iterations: 0,
            improvements: 0,
            stop: Stop::LocalOptimum,
        };

        loop {
            self.step = SearchStep::Running;
            self.neighborhood.refresh(model, rng);
            let arena = self.neighborhood.arena();

            let current = model.objective();
            let mut chosen: Option<(Candidate, Cost)> = None;
            for &candidate in arena.candidates() {
                let cost = evaluate_candidate(model, arena.moves(candidate));
                if cost < chosen.map_or(current, |(_, c)| c) {
                    chosen = Some((candidate, cost));
                    if self.config.descent == Descent::FirstImprovement {
                        break;
                    }
                }
            }
            self.step = SearchStep::MoveEvaluated;

            let Some((candidate, cost)) = chosen else {
                break;
            };

            apply_candidate(model, arena.moves(candidate));
            result.iterations += 1;

            self.step = SearchStep::MoveMade;
            self.observer.on_event(&SearchEvent::MoveMade {
                iteration: result.iterations,
                objective: cost,
            });
            if best.accept(model) {
                result.improvements += 1;
                self.step = SearchStep::ImprovementMade;
                self.observer
                    .on_event(&SearchEvent::ImprovementMade { objective: cost });
            }

            let k = self.config.verify_every;
            if k > 0 && result.iterations % k == 0 {
                model.verify()?;
            }

            if let Some(t) = termination.as_deref_mut() {
                if t.check(best.cost()) {
                    result.stop = Stop::Criterion;
                    break;
                }
            }
        }

        self.step = SearchStep::Terminated;
        log::debug!(
            "descent: {} moves, best {}, {:?}",
            result.iterations,
            best.cost(),
            result.stop
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neighborhood::SwapNeighborhood;
    use crate::observer::NoopObserver;
    use crate::qap::{QapModel, QapMove};
    use crate::random::create_rng;
    use crate::subset_sum::{SubsetSumModel, ToggleNeighborhood};

    fn random_qap(n: usize, seed: u64) -> QapModel {
        let mut rng = create_rng(seed);
        let mut m = || -> Vec<Vec<Cost>> {
            (0..n)
                .map(|_| (0..n).map(|_| rng.random_range(0..30)).collect())
                .collect()
        };
        let f = m();
        let d = m();
        QapModel::new(f, d).unwrap()
    }

    #[test]
    fn test_best_improvement_ends_in_local_optimum() {
        let mut model = random_qap(9, 4);
        let mut best = BestOf::new(&model);
        let mut nh = SwapNeighborhood::full();
        let config = LocalSearchConfig::default().with_verify_every(1);
        let mut rng = create_rng(1);
        let result = LocalSearch::new(&config, &mut nh, &mut NoopObserver)
            .search(&mut model, &mut best, &mut rng)
            .unwrap();
        assert_eq!(result.stop, Stop::LocalOptimum);
        assert_eq!(result.iterations, result.improvements);
        for i in 0..9 {
            for j in (i + 1)..9 {
                assert!(model.evaluate(&QapMove::swap(i, j)) >= model.objective());
            }
        }
        assert_eq!(best.cost(), model.objective());
    }

    #[test]
    fn test_first_improvement_takes_first_candidate() {
        // values in the order they are scanned; the first toggle improves
        let mut model = SubsetSumModel::new(vec![1, 9], 10);
        let mut best = BestOf::new(&model);
        let mut nh = ToggleNeighborhood::new();
        let config = LocalSearchConfig::default()
            .with_descent(Descent::FirstImprovement)
            .with_max_iterations(1);
        let mut rng = create_rng(1);
        let result = LocalSearch::new(&config, &mut nh, &mut NoopObserver)
            .search(&mut model, &mut best, &mut rng)
            .unwrap();
        assert_eq!(result.stop, Stop::Criterion);
        assert!(model.is_chosen(0));
        assert!(!model.is_chosen(1));

        let mut model = SubsetSumModel::new(vec![1, 9], 10);
        let mut best = BestOf::new(&model);
        let config = config.with_descent(Descent::BestImprovement);
        LocalSearch::new(&config, &mut nh, &mut NoopObserver)
            .search(&mut model, &mut best, &mut rng)
            .unwrap();
        assert!(model.is_chosen(1));
    }

    #[test]
    fn test_descent_solves_small_subset_sum() {
        let mut model = SubsetSumModel::new(vec![1, 9], 10);
        let mut best = BestOf::new(&model);
        let mut nh = ToggleNeighborhood::new();
        let config = LocalSearchConfig::default();
        let mut rng = create_rng(1);
        let mut observer = NoopObserver;
        let mut ls = LocalSearch::new(&config, &mut nh, &mut observer);
        let result = ls.search(&mut model, &mut best, &mut rng).unwrap();
        assert_eq!(best.cost(), 0);
        assert_eq!(result.iterations, 2);
        assert_eq!(ls.step(), SearchStep::Terminated);
    }

    #[test]
    fn test_emits_one_event_per_move() {
        let mut model = random_qap(7, 12);
        let mut best = BestOf::new(&model);
        let mut nh = SwapNeighborhood::full();
        let config = LocalSearchConfig::default();
        let mut rng = create_rng(1);
        let mut made = 0;
        let mut observer = |e: &SearchEvent| {
            if let SearchEvent::MoveMade { .. } = e {
                made += 1;
            }
        };
        let result = LocalSearch::new(&config, &mut nh, &mut observer)
            .search(&mut model, &mut best, &mut rng)
            .unwrap();
        assert_eq!(made, result.iterations);
    }
}
