//! Tabu Search phase configuration.

use crate::model::Cost;
use crate::termination::Termination;

use super::memory::Aspiration;

/// Configuration of one Tabu Search phase.
///
/// # Examples
///
/// ```
/// use u_mets::tabu::TabuConfig;
///
/// let config = TabuConfig::default()
///     .with_tenure(7)
///     .with_max_no_improve(200)
///     .with_target(0);
/// assert_eq!(config.tenure, 7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TabuConfig {
    /// How many recent moves stay forbidden.
    pub tenure: usize,
    /// Whether a tabu move that sets a new best may be taken anyway.
    pub aspiration: Aspiration,
    /// Moves tolerated since the last improvement of the phase best.
    pub max_no_improve: usize,
    /// Hard cap on the number of moves (0 for none).
    pub max_iterations: usize,
    /// Stop as soon as the phase best reaches this cost.
    pub target: Option<Cost>,
    /// Check the cached objective against a full recomputation every this
    /// many moves (0 disables).
    pub verify_every: usize,
}

impl Default for TabuConfig {
    fn default() -> Self {
        Self {
            tenure: 7,
            aspiration: Aspiration::BestEver,
            max_no_improve: 200,
            max_iterations: 0,
            target: None,
            verify_every: 0,
        }
    }
}

impl TabuConfig {
    /// Sets the tabu tenure.
    pub fn with_tenure(mut self, tenure: usize) -> Self {
        self.tenure = tenure;
        self
    }

    /// Sets the aspiration criterion.
    pub fn with_aspiration(mut self, aspiration: Aspiration) -> Self {
        self.aspiration = aspiration;
        self
    }

    /// Sets the number of non-improving moves before the phase stops.
    pub fn with_max_no_improve(mut self, n: usize) -> Self {
        self.max_no_improve = n;
        self
    }

    /// Sets the hard iteration cap.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    /// Sets the target cost.
    pub fn with_target(mut self, target: Cost) -> Self {
        self.target = Some(target);
        self
    }

    /// Enables objective verification every `k` moves.
    pub fn with_verify_every(mut self, k: usize) -> Self {
        self.verify_every = k;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_no_improve == 0 {
            return Err("max_no_improve must be positive".into());
        }
        Ok(())
    }

    /// Builds the stopping rule of a phase.
    pub fn termination(&self) -> Termination {
        let mut stop = Termination::no_improvement(self.max_no_improve);
        if self.max_iterations > 0 {
            stop = stop.chain(Termination::iterations(self.max_iterations));
        }
        if let Some(target) = self.target {
            stop = stop.chain(Termination::threshold(target));
        }
        stop
    }
}
