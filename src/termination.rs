//! Composable stopping rules.
//!
//! A [`Termination`] is polled once per iteration with the best cost seen
//! so far and answers whether the search should stop. Counting criteria
//! are stateful, so a criterion must be polled exactly once per iteration
//! and [`reset`](Termination::reset) before it is reused.

use crate::model::Cost;

/// A stopping rule, possibly a chain of several.
///
/// # Examples
///
/// ```
/// use u_mets::termination::Termination;
///
/// // stop on the third poll without progress, or as soon as cost 0 is reached
/// let mut stop = Termination::no_improvement(2).chain(Termination::threshold(0));
/// assert!(!stop.check(10));
/// assert!(!stop.check(10));
/// assert!(stop.check(10));
///
/// stop.reset();
/// assert!(stop.check(0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Termination {
    /// True once polled `max` times.
    Iterations {
        /// Number of polls allowed.
        max: usize,
        /// Polls so far.
        calls: usize,
    },
    /// True on the `max + 1`-th poll, counting from the last one that saw
    /// a new best.
    NoImprovement {
        /// Polls allowed since the last improvement.
        max: usize,
        /// Polls since the last improvement, including it.
        stalled: usize,
        /// Best cost observed by this criterion.
        best: Option<Cost>,
    },
    /// True once the best cost is at or below the value.
    Threshold(Cost),
    /// True when either member is; both are polled on every call.
    Chain(Box<Termination>, Box<Termination>),
}

impl Termination {
    /// Stops after `max` polls.
    pub fn iterations(max: usize) -> Self {
        Termination::Iterations { max, calls: 0 }
    }

    /// Stops on the `max + 1`-th poll since the cost last strictly
    /// decreased.
    ///
    /// The first poll always counts as an improvement, so with a cost that
    /// never changes the criterion fires on poll `max + 1`.
    pub fn no_improvement(max: usize) -> Self {
        Termination::NoImprovement {
            max,
            stalled: 0,
            best: None,
        }
    }

    /// Stops once the best cost is `<= value`.
    pub fn threshold(value: Cost) -> Self {
        Termination::Threshold(value)
    }

    /// Combines `self` with `extra`; the result stops when either does.
    pub fn chain(self, extra: Termination) -> Self {
        Termination::Chain(Box::new(self), Box::new(extra))
    }

    /// Polls the criterion with the best cost seen so far.
    pub fn check(&mut self, best_cost: Cost) -> bool {
        match self {
            Termination::Iterations { max, calls } => {
                *calls += 1;
                *calls >= *max
            }
            Termination::NoImprovement { max, stalled, best } => {
                match *best {
                    Some(b) if best_cost >= b => {}
                    _ => {
                        *best = Some(best_cost);
                        *stalled = 0;
                    }
                }
                *stalled += 1;
                *stalled > *max
            }
            Termination::Threshold(value) => best_cost <= *value,
            Termination::Chain(inner, extra) => {
                let stop_inner = inner.check(best_cost);
                let stop_extra = extra.check(best_cost);
                stop_inner || stop_extra
            }
        }
    }

    /// Rearms every counter in the criterion.
    pub fn reset(&mut self) {
        match self {
            Termination::Iterations { calls, .. } => *calls = 0,
            Termination::NoImprovement { stalled, best, .. } => {
                *stalled = 0;
                *best = None;
            }
            Termination::Threshold(_) => {}
            Termination::Chain(inner, extra) => {
                inner.reset();
                extra.reset();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iterations() {
        let mut t = Termination::iterations(3);
        assert!(!t.check(5));
        assert!(!t.check(5));
        assert!(t.check(5));
        t.reset();
        assert!(!t.check(5));
    }

    #[test]
    fn test_no_improvement_fires_on_k_plus_one() {
        for k in 0..6 {
            let mut t = Termination::no_improvement(k);
            for _ in 0..k {
                assert!(!t.check(100), "k = {k}");
            }
            assert!(t.check(100), "k = {k}");
        }
    }

    #[test]
    fn test_no_improvement_resets_on_better() {
        let mut t = Termination::no_improvement(2);
        assert!(!t.check(10));
        assert!(!t.check(10));
        assert!(!t.check(9));
        assert!(!t.check(9));
        assert!(t.check(12));
        t.reset();
        assert!(!t.check(12));
    }

    #[test]
    fn test_threshold() {
        let mut t = Termination::threshold(0);
        assert!(!t.check(1));
        assert!(t.check(0));
        assert!(t.check(-3));
    }

    #[test]
    fn test_chain_polls_both_members() {
        let mut t = Termination::iterations(1).chain(Termination::no_improvement(5));
        assert!(t.check(4));
        if let Termination::Chain(_, extra) = &t {
            assert_eq!(
                **extra,
                Termination::NoImprovement {
                    max: 5,
                    stalled: 1,
                    best: Some(4)
                }
            );
        } else {
            panic!("expected chain");
        }
    }

    #[test]
    fn test_chain_threshold_short_circuits_search() {
        let mut t = Termination::no_improvement(750).chain(Termination::threshold(0));
        assert!(!t.check(12));
        assert!(t.check(0));
    }
}
