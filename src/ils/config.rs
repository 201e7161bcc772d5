//! Iterated search configuration and per-problem presets.

use crate::local::LocalSearchConfig;
use crate::model::Cost;
use crate::tabu::TabuConfig;
use crate::termination::Termination;

/// The search run between two perturbations.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// A Tabu Search phase; the tenure is redrawn before every phase.
    Tabu(TabuConfig),
    /// A plain descent.
    Local(LocalSearchConfig),
}

impl Phase {
    /// Objective verification period of the phase (0 when disabled).
    pub fn verify_every(&self) -> usize {
        match self {
            Phase::Tabu(c) => c.verify_every,
            Phase::Local(c) => c.verify_every,
        }
    }

    fn validate(&self) -> Result<(), String> {
        match self {
            Phase::Tabu(c) => c.validate(),
            Phase::Local(c) => c.validate(),
        }
    }
}

/// Configuration parameters for an iterated search.
///
/// Each start runs phases until `major_no_improve + 1` consecutive phases
/// fail to improve the best state of the start (or `max_phases` is hit).
/// Between phases the live state is reset to that best state and
/// perturbed with a random number of random moves.
///
/// # Examples
///
/// ```
/// use u_mets::ils::IlsConfig;
///
/// let config = IlsConfig::default()
///     .with_restarts(3)
///     .with_tenure_range(5, 15)
///     .with_perturbation_range(2, 6)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// assert!(config.clone().with_tenure_range(9, 2).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IlsConfig {
    /// Number of independent starts.
    pub restarts: usize,
    /// Randomize the state before the first start too.
    pub shuffle_initial: bool,
    /// Phases tolerated without improving the best of the current start.
    pub major_no_improve: usize,
    /// Hard cap on the phases of one start (0 for none).
    pub max_phases: usize,
    /// Smallest tenure drawn for a phase.
    pub tenure_min: usize,
    /// Largest tenure drawn for a phase.
    pub tenure_max: usize,
    /// Fewest random moves applied by a perturbation.
    pub perturbation_min: usize,
    /// Most random moves applied by a perturbation.
    pub perturbation_max: usize,
    /// The search run between perturbations.
    pub phase: Phase,
    /// Stop the whole run once the incumbent reaches this cost.
    pub target: Option<Cost>,
    /// Random seed (None for 42).
    pub seed: Option<u64>,
}

impl Default for IlsConfig {
    fn default() -> Self {
        Self {
            restarts: 1,
            shuffle_initial: true,
            major_no_improve: 20,
            max_phases: 0,
            tenure_min: 5,
            tenure_max: 10,
            perturbation_min: 1,
            perturbation_max: 3,
            phase: Phase::Tabu(TabuConfig::default()),
            target: None,
            seed: None,
        }
    }
}

impl IlsConfig {
    /// Iterated tabu search for QAP instances of size `n`.
    ///
    /// Tenure in `5..=n√n/2`, perturbations of `n/5..=n/2` random swaps,
    /// 750 non-improving moves per phase and 200 non-improving phases.
    pub fn qap(n: usize) -> Self {
        let tenure_max = ((n as f64) * (n as f64).sqrt() / 2.0) as usize;
        Self {
            restarts: 1,
            shuffle_initial: true,
            major_no_improve: 200,
            max_phases: 0,
            tenure_min: 5,
            tenure_max: tenure_max.max(5),
            perturbation_min: (n / 5).max(1),
            perturbation_max: (n / 2).max(1),
            phase: Phase::Tabu(TabuConfig::default().with_max_no_improve(750)),
            target: None,
            seed: None,
        }
    }

    /// Five random starts of ten tabu phases each for ATSP instances of
    /// `n` cities.
    ///
    /// Tenure in `3..=n`, 100 non-improving moves per phase and
    /// perturbations of `n/10` random swaps.
    pub fn atsp(n: usize) -> Self {
        let kick = (n / 10).max(1);
        Self {
            restarts: 5,
            shuffle_initial: true,
            major_no_improve: usize::MAX,
            max_phases: 10,
            tenure_min: 3,
            tenure_max: n.max(3),
            perturbation_min: kick,
            perturbation_max: kick,
            phase: Phase::Tabu(TabuConfig::default().with_max_no_improve(100)),
            target: None,
            seed: None,
        }
    }

    /// Iterated tabu search for coloring a graph of `nodes` nodes, stopping
    /// at the first conflict-free coloring.
    pub fn vcp(nodes: usize) -> Self {
        let tenure_min = (nodes / 10).max(1);
        Self {
            restarts: 1,
            shuffle_initial: true,
            major_no_improve: 10,
            max_phases: 0,
            tenure_min,
            tenure_max: (nodes / 4).max(tenure_min),
            perturbation_min: (nodes / 4).max(1),
            perturbation_max: (nodes / 2).max(1),
            phase: Phase::Tabu(
                TabuConfig::default()
                    .with_max_no_improve(2000)
                    .with_target(0),
            ),
            target: Some(0),
            seed: None,
        }
    }

    /// Sets the number of starts.
    pub fn with_restarts(mut self, n: usize) -> Self {
        self.restarts = n;
        self
    }

    /// Enables or disables randomizing the state before the first start.
    pub fn with_shuffle_initial(mut self, shuffle: bool) -> Self {
        self.shuffle_initial = shuffle;
        self
    }

    /// Sets the number of non-improving phases tolerated per start.
    pub fn with_major_no_improve(mut self, n: usize) -> Self {
        self.major_no_improve = n;
        self
    }

    /// Sets the phase cap per start.
    pub fn with_max_phases(mut self, n: usize) -> Self {
        self.max_phases = n;
        self
    }

    /// Sets the tenure range, both ends inclusive.
    pub fn with_tenure_range(mut self, min: usize, max: usize) -> Self {
        self.tenure_min = min;
        self.tenure_max = max;
        self
    }

    /// Sets the perturbation size range, both ends inclusive.
    pub fn with_perturbation_range(mut self, min: usize, max: usize) -> Self {
        self.perturbation_min = min;
        self.perturbation_max = max;
        self
    }

    /// Sets the phase search.
    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    /// Sets the global target cost.
    pub fn with_target(mut self, target: Cost) -> Self {
        self.target = Some(target);
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.restarts == 0 {
            return Err("restarts must be at least 1".into());
        }
        if self.tenure_min > self.tenure_max {
            return Err(format!(
                "tenure range {}..={} is empty",
                self.tenure_min, self.tenure_max
            ));
        }
        if self.perturbation_min > self.perturbation_max {
            return Err(format!(
                "perturbation range {}..={} is empty",
                self.perturbation_min, self.perturbation_max
            ));
        }
        self.phase.validate()
    }

    /// Stopping rule for the phases of one start.
    pub(crate) fn major_termination(&self) -> Termination {
        let stop = Termination::no_improvement(self.major_no_improve);
        if self.max_phases > 0 {
            stop.chain(Termination::iterations(self.max_phases + 1))
        } else {
            stop
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for n in [4, 12, 50, 150] {
            assert!(IlsConfig::qap(n).validate().is_ok(), "qap {n}");
            assert!(IlsConfig::atsp(n).validate().is_ok(), "atsp {n}");
            assert!(IlsConfig::vcp(n).validate().is_ok(), "vcp {n}");
        }
        let qap = IlsConfig::qap(100);
        assert_eq!(qap.tenure_max, 500);
        assert_eq!((qap.perturbation_min, qap.perturbation_max), (20, 50));
    }

    #[test]
    fn test_validate_rejects() {
        assert!(IlsConfig::default().with_restarts(0).validate().is_err());
        assert!(IlsConfig::default()
            .with_perturbation_range(4, 1)
            .validate()
            .is_err());
        let bad_phase = Phase::Tabu(TabuConfig::default().with_max_no_improve(0));
        assert!(IlsConfig::default()
            .with_phase(bad_phase)
            .validate()
            .is_err());
    }

    #[test]
    fn test_major_termination_counts_phases() {
        let config = IlsConfig::default()
            .with_major_no_improve(1000)
            .with_max_phases(3);
        let mut stop = config.major_termination();
        // polled once before every phase
        let polls = (0..10).take_while(|_| !stop.check(7)).count();
        assert_eq!(polls, 3);
    }
}
