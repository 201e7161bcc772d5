//! Iterated search execution loop.
//!
//! # Algorithm
//!
//! For each start:
//!
//! 1. Randomize the state (unless this is the only start and
//!    `shuffle_initial` is off)
//! 2. While the start's stopping rule (polled with the best cost of the
//!    start) does not fire:
//!    a. Draw a tenure and run one phase, recording into a fresh recorder
//!    b. Promote the phase best to the start best, and the start best to
//!       the incumbent, each only when strictly better
//!    c. Restore the live state from the start best and perturb it
//! 3. Stop everything once the incumbent reaches the target cost
//!
//! # Reference
//!
//! Lourenço, H. R., Martin, O. C. & Stützle, T. (2003). "Iterated Local
//! Search", in *Handbook of Metaheuristics*, 320-353.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::SearchError;
use crate::local::LocalSearch;
use crate::model::{perturb, Cost, Model, Move};
use crate::neighborhood::Neighborhood;
use crate::observer::{SearchEvent, SearchObserver};
use crate::random::{between, create_rng};
use crate::recorder::BestOf;
use crate::tabu::{TabuMemory, TabuSearch};

use super::config::{IlsConfig, Phase};

/// Result of an iterated search run.
#[derive(Debug, Clone)]
pub struct IlsResult<M> {
    /// Best state found.
    pub best: M,
    /// Cost of the best state.
    pub best_cost: Cost,
    /// Starts begun.
    pub starts: usize,
    /// Phases run over all starts.
    pub phases: usize,
    /// Moves applied by the phases.
    pub moves: usize,
    /// Incumbent cost after every phase.
    pub cost_history: Vec<Cost>,
    /// Whether the run was cancelled externally.
    pub cancelled: bool,
}

/// Iterated search runner.
pub struct IteratedSearch;

impl IteratedSearch {
    /// Runs the iterated search from `model`.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_mets::ils::{IlsConfig, IteratedSearch};
    /// use u_mets::model::Model;
    /// use u_mets::neighborhood::SwapNeighborhood;
    /// use u_mets::observer::NoopObserver;
    /// use u_mets::qap::QapModel;
    ///
    /// let f = vec![vec![0, 3, 1, 2], vec![3, 0, 4, 1], vec![1, 4, 0, 5], vec![2, 1, 5, 0]];
    /// let d = vec![vec![0, 1, 2, 3], vec![1, 0, 1, 2], vec![2, 1, 0, 1], vec![3, 2, 1, 0]];
    /// let model = QapModel::new(f, d).unwrap();
    /// let config = IlsConfig::default()
    ///     .with_tenure_range(1, 2)
    ///     .with_major_no_improve(5)
    ///     .with_seed(1);
    /// let result = IteratedSearch::run(model, &mut SwapNeighborhood::full(), &config, &mut NoopObserver)
    ///     .unwrap();
    /// assert_eq!(result.best_cost, result.best.objective());
    /// assert!(result.phases > 0);
    /// ```
    pub fn run<M, N, O>(
        model: M,
        neighborhood: &mut N,
        config: &IlsConfig,
        observer: &mut O,
    ) -> Result<IlsResult<M>, SearchError>
    where
        M: Model,
        N: Neighborhood<M>,
        O: SearchObserver,
    {
        Self::run_with_cancel(model, neighborhood, config, observer, None)
    }

    /// Runs the iterated search with an optional cancellation token.
    ///
    /// The token is polled before every phase; a cancelled run still
    /// returns the incumbent found so far.
    pub fn run_with_cancel<M, N, O>(
        model: M,
        neighborhood: &mut N,
        config: &IlsConfig,
        observer: &mut O,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<IlsResult<M>, SearchError>
    where
        M: Model,
        N: Neighborhood<M>,
        O: SearchObserver,
    {
        config.validate().map_err(SearchError::InvalidConfig)?;

        let mut rng = create_rng(config.seed.unwrap_or(42));
        let mut model = model;
        let mut incumbent = BestOf::new(&model);
        let mut memory: TabuMemory<<M::Move as Move>::Key> = TabuMemory::new(config.tenure_min);
        let mut cost_history = Vec::new();
        let mut starts = 0;
        let mut phases = 0;
        let mut moves = 0;
        let mut cancelled = false;
        let target_reached =
            |cost: Cost| config.target.is_some_and(|target| cost <= target);

        'starts: for start in 0..config.restarts {
            starts += 1;
            observer.on_event(&SearchEvent::Restarted { start });
            if config.restarts > 1 || config.shuffle_initial {
                model.randomize(&mut rng);
            }
            memory.clear();
            incumbent.accept(&model);
            let mut major = BestOf::new(&model);
            let mut major_stop = config.major_termination();

            while !target_reached(incumbent.cost()) && !major_stop.check(major.cost()) {
                if let Some(ref flag) = cancel {
                    if flag.load(Ordering::Relaxed) {
                        cancelled = true;
                        break 'starts;
                    }
                }

                let mut minor = BestOf::new(&model);
                let phase = match &config.phase {
                    Phase::Tabu(tabu) => {
                        let tenure = between(config.tenure_min, config.tenure_max, &mut rng);
                        memory.set_tenure(tenure);
                        observer.on_event(&SearchEvent::PhaseStarted { tenure });
                        TabuSearch::new(tabu, neighborhood, &mut memory, observer).search(
                            &mut model,
                            &mut minor,
                            &mut rng,
                        )?
                    }
                    Phase::Local(local) => {
                        observer.on_event(&SearchEvent::PhaseStarted { tenure: 0 });
                        LocalSearch::new(local, neighborhood, observer).search(
                            &mut model,
                            &mut minor,
                            &mut rng,
                        )?
                    }
                };
                phases += 1;
                moves += phase.iterations;

                if major.accept(minor.best()) && incumbent.accept(major.best()) {
                    log::debug!("new incumbent {} in start {start}", incumbent.cost());
                }
                cost_history.push(incumbent.cost());
                if target_reached(incumbent.cost()) {
                    break 'starts;
                }

                model.clone_from(major.best());
                let kick = between(config.perturbation_min, config.perturbation_max, &mut rng);
                let applied = perturb(&mut model, kick, &mut rng);
                observer.on_event(&SearchEvent::Perturbed { moves: applied });
            }

            log::info!(
                "start {start}: best {}, incumbent {}",
                major.cost(),
                incumbent.cost()
            );
        }

        let best_cost = incumbent.cost();
        Ok(IlsResult {
            best: incumbent.into_best(),
            best_cost,
            starts,
            phases,
            moves,
            cost_history,
            cancelled,
        })
    }

    /// Runs one independent search per seed on the rayon pool and returns
    /// the best result; ties go to the earliest seed.
    ///
    /// Each run owns a clone of `model` and `neighborhood`.
    #[cfg(feature = "parallel")]
    pub fn run_parallel<M, N>(
        model: &M,
        neighborhood: &N,
        config: &IlsConfig,
        seeds: &[u64],
    ) -> Result<IlsResult<M>, SearchError>
    where
        M: Model + Send + Sync,
        N: Neighborhood<M> + Clone + Sync,
    {
        use rayon::prelude::*;

        let results = seeds
            .par_iter()
            .map(|&seed| {
                let mut neighborhood = neighborhood.clone();
                let config = config.clone().with_seed(seed);
                Self::run(
                    model.clone(),
                    &mut neighborhood,
                    &config,
                    &mut crate::observer::NoopObserver,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        results
            .into_iter()
            .min_by_key(|r| r.best_cost)
            .ok_or_else(|| SearchError::InvalidConfig("no seeds given".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ils::Phase;
    use crate::local::LocalSearchConfig;
    use crate::neighborhood::SwapNeighborhood;
    use crate::observer::NoopObserver;
    use crate::qap::QapModel;
    use crate::subset_sum::{SubsetSumModel, ToggleNeighborhood};
    use crate::tabu::TabuConfig;
    use rand::Rng;

    fn random_qap(n: usize, seed: u64) -> QapModel {
        let mut rng = create_rng(seed);
        let mut matrix = || -> Vec<Vec<Cost>> {
            (0..n)
                .map(|_| (0..n).map(|_| rng.random_range(0..20)).collect())
                .collect()
        };
        let f = matrix();
        let d = matrix();
        QapModel::new(f, d).unwrap()
    }

    fn brute_force(model: &QapModel) -> Cost {
        fn visit(model: &QapModel, perm: &mut Vec<usize>, k: usize, best: &mut Cost) {
            if k == perm.len() {
                let cost = model.clone().with_assignment(perm.clone()).unwrap().objective();
                *best = (*best).min(cost);
                return;
            }
            for i in k..perm.len() {
                perm.swap(k, i);
                visit(model, perm, k + 1, best);
                perm.swap(k, i);
            }
        }
        let mut perm: Vec<usize> = (0..model.size()).collect();
        let mut best = Cost::MAX;
        visit(model, &mut perm, 0, &mut best);
        best
    }

    fn small_config(seed: u64) -> IlsConfig {
        IlsConfig::default()
            .with_tenure_range(2, 4)
            .with_perturbation_range(1, 3)
            .with_major_no_improve(10)
            .with_phase(Phase::Tabu(
                TabuConfig::default()
                    .with_max_no_improve(50)
                    .with_verify_every(10),
            ))
            .with_seed(seed)
    }

    #[test]
    fn test_ils_finds_small_qap_optimum() {
        for seed in 0..3 {
            let model = random_qap(6, 100 + seed);
            let optimum = brute_force(&model);
            let result = IteratedSearch::run(
                model,
                &mut SwapNeighborhood::full(),
                &small_config(seed),
                &mut NoopObserver,
            )
            .unwrap();
            assert_eq!(result.best_cost, optimum, "seed {seed}");
            assert_eq!(result.best.recompute(), optimum);
            assert!(!result.cancelled);
        }
    }

    #[test]
    fn test_cost_history_non_increasing() {
        let model = random_qap(10, 8);
        let result = IteratedSearch::run(
            model,
            &mut SwapNeighborhood::sampled(20, 5),
            &small_config(8),
            &mut NoopObserver,
        )
        .unwrap();
        assert_eq!(result.cost_history.len(), result.phases);
        for window in result.cost_history.windows(2) {
            assert!(window[1] <= window[0]);
        }
        assert_eq!(result.cost_history.last(), Some(&result.best_cost));
    }

    #[test]
    fn test_identical_seeds_give_identical_runs() {
        let trace = |seed: u64| {
            let mut events = Vec::new();
            let result = IteratedSearch::run(
                random_qap(9, 77),
                &mut SwapNeighborhood::sampled(12, 4),
                &small_config(seed).with_restarts(2),
                &mut |e: &SearchEvent| events.push(*e),
            )
            .unwrap();
            (events, result.best.assignment().to_vec(), result.best_cost)
        };
        let a = trace(5);
        let b = trace(5);
        assert!(!a.0.is_empty());
        assert_eq!(a, b);
    }

    #[test]
    fn test_event_sequence_shape() {
        let mut restarts = 0;
        let mut phases = 0;
        let mut perturbations = 0;
        let result = IteratedSearch::run(
            random_qap(7, 3),
            &mut SwapNeighborhood::full(),
            &small_config(3).with_restarts(3).with_max_phases(4),
            &mut |e: &SearchEvent| match e {
                SearchEvent::Restarted { .. } => restarts += 1,
                SearchEvent::PhaseStarted { tenure } => {
                    assert!((2..=4).contains(tenure));
                    phases += 1;
                }
                SearchEvent::Perturbed { moves } => {
                    assert!((1..=3).contains(moves));
                    perturbations += 1;
                }
                _ => {}
            },
        )
        .unwrap();
        assert_eq!(restarts, 3);
        assert_eq!(result.starts, 3);
        assert_eq!(phases, result.phases);
        assert!(result.phases <= 12);
        assert_eq!(perturbations, result.phases);
    }

    #[test]
    fn test_target_stops_run() {
        let model = SubsetSumModel::new(vec![12, 5, 8, 3, 9, 14, 2], 20);
        let config = IlsConfig::default()
            .with_tenure_range(1, 2)
            .with_restarts(10)
            .with_target(0)
            .with_seed(4);
        let result =
            IteratedSearch::run(model, &mut ToggleNeighborhood::new(), &config, &mut NoopObserver)
                .unwrap();
        assert_eq!(result.best_cost, 0);
        assert_eq!(result.best.sum(), 20);
        assert!(result.starts < 10);
    }

    #[test]
    fn test_local_phase() {
        let model = random_qap(8, 21);
        let config = small_config(21).with_phase(Phase::Local(LocalSearchConfig::default()));
        let mut tenures = Vec::new();
        let result = IteratedSearch::run(
            model,
            &mut SwapNeighborhood::full(),
            &config,
            &mut |e: &SearchEvent| {
                if let SearchEvent::PhaseStarted { tenure } = e {
                    tenures.push(*tenure);
                }
            },
        )
        .unwrap();
        assert!(result.phases >= 10);
        assert!(tenures.iter().all(|&t| t == 0));
        assert_eq!(result.best.recompute(), result.best_cost);
    }

    #[test]
    fn test_cancelled_before_first_phase() {
        let flag = Arc::new(AtomicBool::new(true));
        let model = random_qap(6, 1);
        let result = IteratedSearch::run_with_cancel(
            model,
            &mut SwapNeighborhood::full(),
            &small_config(1),
            &mut NoopObserver,
            Some(flag),
        )
        .unwrap();
        assert!(result.cancelled);
        assert_eq!(result.phases, 0);
        assert_eq!(result.best.recompute(), result.best_cost);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let err = IteratedSearch::run(
            random_qap(4, 1),
            &mut SwapNeighborhood::full(),
            &IlsConfig::default().with_tenure_range(3, 1),
            &mut NoopObserver,
        )
        .unwrap_err();
        assert!(matches!(err, SearchError::InvalidConfig(_)));
    }

    #[test]
    fn test_drift_aborts_the_run() {
        use crate::model::tests::{DriftingModel, FlipNeighborhood};

        for phase in [
            Phase::Tabu(TabuConfig::default().with_verify_every(1)),
            Phase::Local(LocalSearchConfig::default().with_verify_every(1)),
        ] {
            let config = IlsConfig::default()
                .with_shuffle_initial(false)
                .with_phase(phase)
                .with_seed(11);
            let err = IteratedSearch::run(
                DriftingModel::new(5),
                &mut FlipNeighborhood::default(),
                &config,
                &mut NoopObserver,
            )
            .unwrap_err();
            assert!(matches!(err, SearchError::ObjectiveMismatch { .. }));
        }
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_best_sequential_seed() {
        let model = random_qap(8, 13);
        let seeds = [1, 2, 3, 4];
        let nh = SwapNeighborhood::sampled(16, 4);
        let parallel = IteratedSearch::run_parallel(&model, &nh, &small_config(0), &seeds).unwrap();
        let best_sequential = seeds
            .iter()
            .map(|&s| {
                IteratedSearch::run(
                    model.clone(),
                    &mut nh.clone(),
                    &small_config(s),
                    &mut NoopObserver,
                )
                .unwrap()
                .best_cost
            })
            .min()
            .unwrap();
        assert_eq!(parallel.best_cost, best_sequential);
    }
}
