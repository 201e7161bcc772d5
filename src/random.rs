//! Seeded randomness shared by every search component.
//!
//! A single [`SearchRng`] is created per run and threaded explicitly
//! through neighborhood sampling, perturbation and restarts, so that a
//! fixed seed reproduces the exact move sequence.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// The generator used by the search runners.
pub type SearchRng = ChaCha8Rng;

/// Creates a deterministic generator from a seed.
///
/// # Examples
///
/// ```
/// use rand::Rng;
/// use u_mets::random::create_rng;
///
/// let mut a = create_rng(7);
/// let mut b = create_rng(7);
/// assert_eq!(a.random_range(0..1000), b.random_range(0..1000));
/// ```
pub fn create_rng(seed: u64) -> SearchRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Draws two distinct indices in `0..n`, resampling on collision.
///
/// Returns `None` when `n < 2`.
pub fn distinct_pair<R: Rng>(n: usize, rng: &mut R) -> Option<(usize, usize)> {
    if n < 2 {
        return None;
    }
    let i = rng.random_range(0..n);
    loop {
        let j = rng.random_range(0..n);
        if j != i {
            return Some((i, j));
        }
    }
}

/// Draws a value in `lo..=hi`; a reversed range collapses to `lo`.
pub fn between<R: Rng>(lo: usize, hi: usize, rng: &mut R) -> usize {
    if hi <= lo {
        lo
    } else {
        rng.random_range(lo..=hi)
    }
}
