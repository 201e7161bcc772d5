//! Search progress events.
//!
//! Runners report progress to a [`SearchObserver`]. Any
//! `FnMut(&SearchEvent)` closure is an observer, [`NoopObserver`] discards
//! everything and [`LogObserver`] forwards events to the `log` facade.

use crate::model::Cost;

/// Something that happened during a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchEvent {
    /// A candidate was applied to the live state.
    MoveMade {
        /// Iteration number within the current phase, starting at 1.
        iteration: usize,
        /// Objective after the move.
        objective: Cost,
    },
    /// The best cost of the current phase decreased.
    ImprovementMade {
        /// The new best cost.
        objective: Cost,
    },
    /// A search phase is about to start.
    PhaseStarted {
        /// Tabu tenure drawn for the phase; 0 for local search.
        tenure: usize,
    },
    /// The live state was perturbed between phases.
    Perturbed {
        /// Number of random moves applied.
        moves: usize,
    },
    /// A new start began.
    Restarted {
        /// Index of the start, from 0.
        start: usize,
    },
}

/// State of a search phase after its latest step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchStep {
    /// Created or running, no candidate evaluated yet in this iteration.
    #[default]
    Running,
    /// The neighborhood was refreshed and evaluated.
    MoveEvaluated,
    /// A candidate was applied.
    MoveMade,
    /// A candidate was applied and it improved the best cost.
    ImprovementMade,
    /// The phase is over.
    Terminated,
}

/// Receives [`SearchEvent`]s.
pub trait SearchObserver {
    /// Called synchronously by the runner.
    fn on_event(&mut self, event: &SearchEvent);
}

impl<F: FnMut(&SearchEvent)> SearchObserver for F {
    fn on_event(&mut self, event: &SearchEvent) {
        self(event)
    }
}

/// Ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SearchObserver for NoopObserver {
    fn on_event(&mut self, _event: &SearchEvent) {}
}

/// Writes events as log records: moves at `trace`, the rest at `debug`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl SearchObserver for LogObserver {
    fn on_event(&mut self, event: &SearchEvent) {
        match *event {
            SearchEvent::MoveMade {
                iteration,
                objective,
            } => log::trace!("{iteration}: {objective}"),
            SearchEvent::ImprovementMade { objective } => log::debug!("improved to {objective}"),
            SearchEvent::PhaseStarted { tenure } => log::debug!("phase started, tenure {tenure}"),
            SearchEvent::Perturbed { moves } => log::debug!("perturbed with {moves} moves"),
            SearchEvent::Restarted { start } => log::debug!("start {start}"),
        }
    }
}
