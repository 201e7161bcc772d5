//! Local Search (LS).
//!
//! Plain descent: move to an improving neighbor until none is left. With
//! best improvement the whole neighborhood is scanned and the lowest-cost
//! candidate is taken; with first improvement the scan stops at the first
//! candidate that improves the current cost.
//!
//! Local search has no memory, so it stops at the first local optimum of
//! its neighborhood. It is used on its own for quick descents and as a
//! polishing stage after an iterated tabu search.

mod config;
mod runner;

pub use config::{Descent, LocalSearchConfig};
pub use runner::LocalSearch;
