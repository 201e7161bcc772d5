//! Tabu Search execution engine.
//!
//! # Algorithm
//!
//! 1. Refresh the neighborhood against the live state
//! 2. Evaluate every candidate by delta
//! 3. Select the lowest-cost admissible candidate (first one on ties): a
//!    candidate is admissible when it is not tabu, or when it is tabu and
//!    the aspiration criterion accepts its cost
//! 4. Apply it, make its reversal tabu, record the state if it improves
//!    the phase best
//! 5. Poll the stopping rule with the phase best
//!
//! A neighborhood without any admissible candidate ends the phase.
//!
//! # Reference
//!
//! Glover, F. (1989). "Tabu Search - Part I", *ORSA Journal on Computing* 1(3), 190-206.
//! Glover, F. (1990). "Tabu Search - Part II", *ORSA Journal on Computing* 2(1), 4-32.

use rand::Rng;

use crate::error::SearchError;
use crate::model::{Cost, Model, Move};
use crate::neighborhood::{
    apply_candidate, candidate_keys, evaluate_candidate, reversal_keys, Candidate, Neighborhood,
};
use crate::observer::{SearchEvent, SearchObserver, SearchStep};
use crate::recorder::BestOf;
use crate::termination::Termination;

use super::config::TabuConfig;
use super::memory::TabuMemory;

/// Why a search phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stop {
    /// The stopping rule fired.
    Criterion,
    /// No admissible candidate was left.
    DeadEnd,
    /// A descent reached a local optimum.
    LocalOptimum,
}

/// Outcome of one search phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhaseResult {
    /// Moves applied.
    pub iterations: usize,
    /// Moves that improved the recorded best.
    pub improvements: usize,
    /// Reason the phase ended.
    pub stop: Stop,
}

/// One Tabu Search phase over borrowed search components.
///
/// The neighborhood, memory and observer outlive the phase so that an
/// outer loop can reuse them, changing only the tenure in between.
///
/// # Examples
///
/// ```
/// use u_mets::observer::NoopObserver;
/// use u_mets::random::create_rng;
/// use u_mets::recorder::BestOf;
/// use u_mets::subset_sum::{SubsetSumModel, ToggleNeighborhood};
/// use u_mets::tabu::{TabuConfig, TabuMemory, TabuSearch};
///
/// let mut model = SubsetSumModel::new(vec![12, 5, 8, 3, 9], 20);
/// let mut best = BestOf::new(&model);
/// let mut neighborhood = ToggleNeighborhood::new();
/// let config = TabuConfig::default().with_tenure(2).with_target(0);
/// let mut memory = TabuMemory::new(config.tenure);
/// let mut observer = NoopObserver;
/// let mut rng = create_rng(42);
///
/// TabuSearch::new(&config, &mut neighborhood, &mut memory, &mut observer)
///     .search(&mut model, &mut best, &mut rng)
///     .unwrap();
/// assert_eq!(best.cost(), 0);
/// ```
pub struct TabuSearch<'a, M: Model, N, O> {
    config: &'a TabuConfig,
    neighborhood: &'a mut N,
    memory: &'a mut TabuMemory<<M::Move as Move>::Key>,
    observer: &'a mut O,
    step: SearchStep,
    keys: Vec<<M::Move as Move>::Key>,
}

impl<'a, M, N, O> TabuSearch<'a, M, N, O>
where
    M: Model,
    N: Neighborhood<M>,
    O: SearchObserver,
{
    /// Prepares a phase.
    pub fn new(
        config: &'a TabuConfig,
        neighborhood: &'a mut N,
        memory: &'a mut TabuMemory<<M::Move as Move>::Key>,
        observer: &'a mut O,
    ) -> Self {
        Self {
            config,
            neighborhood,
            memory,
            observer,
            step: SearchStep::Running,
            keys: Vec::new(),
        }
    }

    /// The state of the phase after its latest step.
    pub fn step(&self) -> SearchStep {
        self.step
    }

    /// Runs until the configured stopping rule fires, recording improving
    /// states into `best`.
    pub fn search<R: Rng>(
        &mut self,
        model: &mut M,
        best: &mut BestOf<M>,
        rng: &mut R,
    ) -> Result<PhaseResult, SearchError> {
        let mut termination = self.config.termination();
        self.search_until(model, best, &mut termination, rng)
    }

    /// Runs until `termination` fires, ignoring the configured stopping
    /// fields.
    pub fn search_until<R: Rng>(
        &mut self,
        model: &mut M,
        best: &mut BestOf<M>,
        termination: &mut Termination,
        rng: &mut R,
    ) -> Result<PhaseResult, SearchError> {
        self.config.validate().map_err(SearchError::InvalidConfig)?;

        let mut result = PhaseResult {
            iterations: 0,
            improvements: 0,
            stop: Stop::Criterion,
        };

        loop {
            self.step = SearchStep::Running;
            self.neighborhood.refresh(model, rng);
            let arena = self.neighborhood.arena();

            let mut chosen: Option<(Candidate, Cost)> = None;
            for &candidate in arena.candidates() {
                let moves = arena.moves(candidate);
                let cost = evaluate_candidate(model, moves);
                if chosen.is_some_and(|(_, chosen_cost)| cost >= chosen_cost) {
                    continue;
                }
                candidate_keys(moves, &mut self.keys);
                if self.memory.is_tabu(&self.keys)
                    && !self.config.aspiration.admits(cost, best.cost())
                {
                    continue;
                }
                chosen = Some((candidate, cost));
            }
            self.step = SearchStep::MoveEvaluated;

            let Some((candidate, cost)) = chosen else {
                result.stop = Stop::DeadEnd;
                break;
            };

            let moves = arena.moves(candidate);
            apply_candidate(model, moves);
            reversal_keys(moves, &mut self.keys);
            self.memory.insert(&self.keys);
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

            if termination.check(best.cost()) {
                break;
            }
        }

        self.step = SearchStep::Terminated;
        log::debug!(
            "tabu phase: {} moves, {} improvements, best {}, {:?}",
            result.iterations,
            result.improvements,
            best.cost(),
            result.stop
        );
        Ok(result)
    }
}
