//! Stock randomness port backed by the thread-local RNG.

use ludo_engine::{RandomnessError, RandomnessPort};
use rand::Rng;

/// Rolls dice with [`rand::rng()`]. Never fails.
///
/// Fine for casual play and tests of the table machinery; games with money
/// on them want a verifiable source plugged in through [`RandomnessPort`]
/// instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandomness;

impl RandomnessPort for ThreadRandomness {
    async fn next_dice_value(&self) -> Result<u8, RandomnessError> {
        Ok(rand::rng().random_range(1..=6))
    }

    async fn next_turn_seed(&self) -> Result<u64, RandomnessError> {
        Ok(rand::rng().random())
    }
}
