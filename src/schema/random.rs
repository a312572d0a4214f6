//! Random generation of valid "pairs plus one singleton" arrays for exploratory use.

use rand::prelude::*;
use serde::{Deserialize, Serialize};

use super::{InputArray, MAX_INPUT_LEN};

/// Largest number of pairs that still leaves room for the singleton.
pub const MAX_PAIRS: usize = (MAX_INPUT_LEN - 1) / 2;

/// Specification for a random valid input array.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RandomInput {
    /// Number of duplicated values (clamped to `1..=MAX_PAIRS`). `None` picks 1-8.
    #[serde(default)]
    pub pairs: Option<usize>,
    /// Random seed. `None` draws from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl RandomInput {
    /// Generate a shuffled array holding `pairs` duplicated values and one singleton.
    ///
    /// Pair values colliding with the singleton or an earlier pair are bumped
    /// to a neighbouring value, so the result always validates.
    pub fn generate(&self) -> InputArray {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let pairs = self
            .pairs
            .unwrap_or_else(|| rng.gen_range(1..=8))
            .clamp(1, MAX_PAIRS);

        let singleton: u32 = rng.r#gen();
        let mut used = vec![singleton];
        let mut values = Vec::with_capacity(pairs * 2 + 1);

        for _ in 0..pairs {
            let mut value: u32 = rng.r#gen();
            while used.contains(&value) {
                value = if value == u32::MAX { value - 1 } else { value + 1 };
                if used.contains(&value) {
                    value = rng.r#gen();
                }
            }
            used.push(value);
            values.push(value);
            values.push(value);
        }
        values.push(singleton);
        values.shuffle(&mut rng);

        log::debug!("Generated random input with {pairs} pairs: {values:?}");

        // Length is 2 * pairs + 1 <= MAX_INPUT_LEN, so construction cannot fail.
        InputArray::new(values).unwrap_or_else(|_| unreachable!("random input length within bounds"))
    }
}
