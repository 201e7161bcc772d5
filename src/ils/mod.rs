//! Iterated Tabu Search (ITS) and Iterated Local Search (ILS).
//!
//! An outer loop around [`crate::tabu::TabuSearch`] or
//! [`crate::local::LocalSearch`]: every phase starts from the best state
//! of the current start after a random perturbation, with a freshly drawn
//! tabu tenure. Three recorders are kept (phase, start, run) and a state
//! moves outward only when it is strictly better.
//!
//! # References
//!
//! - Lourenço, H. R., Martin, O. C. & Stützle, T. (2003). "Iterated Local
//!   Search", in *Handbook of Metaheuristics*, 320-353.
//! - Misevicius, A. (2005). "A tabu search algorithm for the quadratic
//!   assignment problem", *Computational Optimization and Applications*
//!   30, 95-111.

mod config;
mod runner;

pub use config::{IlsConfig, Phase};
pub use runner::{IlsResult, IteratedSearch};
