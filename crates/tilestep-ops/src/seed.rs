//! Seed choice for new grid handles.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::requests::{RequestKind, Seed};

/// Random seeds are drawn from `[1, RANDOM_SEED_END)`.
pub const RANDOM_SEED_END: u64 = 1_000_000_000_000;

/// Picks the seed for each handle a session builds.
///
/// Explicit resets always use the requested value so a run can be
/// reproduced. Otherwise a random seed is drawn when the caller allows it.
#[derive(Debug)]
pub struct SeedPolicy {
    rng: StdRng,
}

impl SeedPolicy {
    /// Seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic random draws, for tests.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seed for a handle built while serving a `kind` request.
    pub fn choose(&mut self, seed: &Seed, kind: RequestKind) -> u64 {
        if kind == RequestKind::Reset || !seed.allow_randomization {
            return seed.value;
        }
        self.rng.random_range(1..RANDOM_SEED_END)
    }
}

impl Default for SeedPolicy {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_uses_the_value_verbatim() {
        let mut policy = SeedPolicy::from_seed(1);
        let seed = Seed {
            value: 42,
            allow_randomization: true,
        };
        assert_eq!(policy.choose(&seed, RequestKind::Reset), 42);
    }

    #[test]
    fn fixed_seed_is_kept_for_other_kinds() {
        let mut policy = SeedPolicy::from_seed(1);
        assert_eq!(policy.choose(&Seed::fixed(9), RequestKind::Tick), 9);
    }

    #[test]
    fn randomized_seeds_stay_in_range() {
        let mut policy = SeedPolicy::from_seed(1);
        for _ in 0..100 {
            let seed = policy.choose(&Seed::random(), RequestKind::Run);
            assert!((1..RANDOM_SEED_END).contains(&seed));
        }
    }
}
