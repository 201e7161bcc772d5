//! Local Search configuration.

use crate::termination::Termination;

/// Which improving neighbor a descent step takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Descent {
    /// The lowest-cost candidate, if it improves.
    #[default]
    BestImprovement,
    /// The first candidate that improves.
    FirstImprovement,
}

/// Configuration parameters for Local Search.
///
/// # Examples
///
/// ```
/// use u_mets::local::{Descent, LocalSearchConfig};
///
/// let config = LocalSearchConfig::default()
///     .with_descent(Descent::FirstImprovement)
///     .with_max_iterations(100);
/// assert_eq!(config.max_iterations, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocalSearchConfig {
    /// Step policy.
    pub descent: Descent,
    /// Hard cap on the number of moves (0 for none).
    pub max_iterations: usize,
    /// Check the cached objective against a full recomputation every this
    /// many moves (0 disables).
    pub verify_every: usize,
}

impl LocalSearchConfig {
    /// Sets the step policy.
    pub fn with_descent(mut self, descent: Descent) -> Self {
        self.descent = descent;
        self
    }

    /// Sets the hard iteration cap.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Enables objective verification every `k` moves.
    pub fn with_verify_every(mut self, k: usize) -> Self {
        self.verify_every = k;
        self
    }

    /// Validates the configuration. Every combination is currently valid.
    pub fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    /// The iteration cap as a stopping rule, if one is set.
    pub fn termination(&self) -> Option<Termination> {
        (self.max_iterations > 0).then(|| Termination::iterations(self.max_iterations))
    }
}
