//! Error types.
//!
//! [`ModelError`] reports malformed problem data handed to a model
//! constructor; [`SearchError`] is returned by the search runners.

use std::fmt;

use crate::model::Cost;

/// Problem data rejected by a model constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A matrix had no rows.
    Empty,
    /// A matrix row has the wrong number of columns.
    NotSquare {
        /// Offending row.
        row: usize,
        /// Expected length.
        expected: usize,
        /// Actual length.
        found: usize,
    },
    /// Two matrices that must share a dimension do not.
    DimensionMismatch {
        /// Dimension of the first matrix.
        expected: usize,
        /// Dimension of the second matrix.
        found: usize,
    },
    /// An edge refers to a node outside `0..nodes`.
    EdgeOutOfRange {
        /// The edge as given.
        edge: (usize, usize),
        /// Number of nodes in the graph.
        nodes: usize,
    },
    /// An edge connects a node to itself.
    SelfLoop(usize),
    /// A coloring problem needs at least one color.
    NoColors,
    /// A state vector does not match the problem.
    InvalidState(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Empty => write!(f, "empty problem data"),
            ModelError::NotSquare {
                row,
                expected,
                found,
            } => write!(
                f,
                "matrix row {row} has {found} entries, expected {expected}"
            ),
            ModelError::DimensionMismatch { expected, found } => {
                write!(f, "dimension mismatch: expected {expected}, found {found}")
            }
            ModelError::EdgeOutOfRange { edge, nodes } => write!(
                f,
                "edge ({}, {}) out of range for {nodes} nodes",
                edge.0, edge.1
            ),
            ModelError::SelfLoop(v) => write!(f, "self loop on node {v}"),
            ModelError::NoColors => write!(f, "color count must be positive"),
            ModelError::InvalidState(msg) => write!(f, "invalid state: {msg}"),
        }
    }
}

impl std::error::Error for ModelError {}

/// Failure of a search run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// The configuration failed validation.
    InvalidConfig(String),
    /// The incrementally maintained objective diverged from a full
    /// recomputation.
    ObjectiveMismatch {
        /// Value cached by the model.
        cached: Cost,
        /// Value obtained from scratch.
        recomputed: Cost,
    },
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            SearchError::ObjectiveMismatch { cached, recomputed } => write!(
                f,
                "objective mismatch: cached {cached}, recomputed {recomputed}"
            ),
        }
    }
}

impl std::error::Error for SearchError {}
