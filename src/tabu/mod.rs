//! Tabu Search (TS).
//!
//! Steepest descent that keeps moving past local optima: every step takes
//! the best admissible candidate even when it worsens the objective, and
//! a short-term memory forbids undoing recent moves so the trajectory
//! does not fall straight back.
//!
//! Candidates that would undo one of the last `tenure` applied moves are
//! tabu. The best-ever aspiration criterion lets a tabu candidate through
//! when it would improve on the best cost of the phase.
//!
//! # References
//!
//! - Glover, F. (1989). "Tabu Search - Part I", *ORSA Journal on Computing* 1(3), 190-206.
//! - Glover, F. (1990). "Tabu Search - Part II", *ORSA Journal on Computing* 2(1), 4-32.

mod config;
mod memory;
mod runner;

pub use config::TabuConfig;
pub use memory::{Aspiration, TabuMemory};
pub use runner::{PhaseResult, Stop, TabuSearch};
