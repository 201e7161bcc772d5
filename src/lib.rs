//! Local search and tabu search with incremental move evaluation.
//!
//! Provides a small search engine and its instantiation on classic hard
//! combinatorial problems:
//!
//! - **Models**: a [`model::Model`] owns a solution state and its cached
//!   objective, and evaluates, applies and undoes moves by delta.
//!   Included are the asymmetric TSP ([`atsp`]), the quadratic assignment
//!   problem ([`qap`]), graph vertex coloring ([`vcp`]) and a subset-sum
//!   toy model ([`subset_sum`]).
//! - **Neighborhoods**: exhaustive or sampled candidate lists, with
//!   compound moves stored as ranges of a reusable move arena
//!   ([`neighborhood`]).
//! - **Local Search (LS)**: best- or first-improvement descent ([`local`]).
//! - **Tabu Search (TS)**: recency memory over move identities with
//!   best-ever aspiration ([`tabu`]).
//! - **Iterated search**: restarts, perturbation and a redrawn tenure
//!   around LS or TS phases, with minor/major/incumbent recorders
//!   ([`ils`], [`recorder`]).
//! - **Termination**: composable stopping rules ([`termination`]).
//!
//! Every run is driven by one seeded generator ([`random`]), so a seed
//! reproduces the exact move sequence. Progress is reported through
//! [`observer::SearchObserver`]; [`observer::LogObserver`] forwards it to
//! the `log` facade.
//!
//! # Example
//!
//! ```
//! use u_mets::ils::{IlsConfig, IteratedSearch};
//! use u_mets::model::Model;
//! use u_mets::neighborhood::SwapNeighborhood;
//! use u_mets::observer::LogObserver;
//! use u_mets::qap::QapModel;
//!
//! let flow = vec![vec![0, 5, 2], vec![5, 0, 3], vec![2, 3, 0]];
//! let distance = vec![vec![0, 8, 15], vec![8, 0, 13], vec![15, 13, 0]];
//! let model = QapModel::new(flow, distance).unwrap();
//!
//! let config = IlsConfig::default().with_tenure_range(1, 2).with_seed(42);
//! let result = IteratedSearch::run(model, &mut SwapNeighborhood::full(), &config, &mut LogObserver)
//!     .unwrap();
//! assert_eq!(result.best.objective(), result.best_cost);
//! ```

pub mod atsp;
pub mod error;
pub mod ils;
pub mod local;
pub mod model;
pub mod neighborhood;
pub mod observer;
pub mod qap;
pub mod random;
pub mod recorder;
pub mod subset_sum;
pub mod tabu;
pub mod termination;
pub mod vcp;

pub use error::{ModelError, SearchError};
pub use model::{Cost, Model, Move};
