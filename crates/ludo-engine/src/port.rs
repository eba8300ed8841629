//! The randomness port: where dice values and the turn-order seed come
//! from.
//!
//! The engine never generates randomness. A session that needs some enters
//! a waiting state (`Starting` or `RollingDice`) and whoever drives it asks
//! a [`RandomnessPort`], then feeds the answer back in as an
//! [`Action`](crate::Action). Production code plugs in an RNG or an oracle;
//! tests plug in [`ScriptedRandomness`].

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::RandomnessError;

/// What a waiting session needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RandomnessRequest {
    /// Any `u64`; picks the first player once at game start.
    TurnSeed,
    /// A die face in 1..=6.
    DiceValue,
}

/// A source of dice values and turn-order seeds.
///
/// Both methods are asynchronous: an oracle may take a round trip to
/// answer. Failures are reported, not retried; retry policy belongs to
/// the caller.
///
/// - `Send + Sync + 'static` → one port is shared by every table task.
pub trait RandomnessPort: Send + Sync + 'static {
    /// The next die face. Values outside 1..=6 are rejected by the engine.
    fn next_dice_value(
        &self,
    ) -> impl std::future::Future<Output = Result<u8, RandomnessError>> + Send;

    /// A seed used once to choose who moves first.
    fn next_turn_seed(
        &self,
    ) -> impl std::future::Future<Output = Result<u64, RandomnessError>> + Send;
}

/// Replays a fixed script of seeds and dice values, in order.
///
/// Once a queue runs dry the port reports
/// [`RandomnessError::Exhausted`]. Useful for tests, replays, and forcing
/// specific rolls while debugging a position.
#[derive(Debug, Default)]
pub struct ScriptedRandomness {
    seeds: Mutex<VecDeque<u64>>,
    rolls: Mutex<VecDeque<u8>>,
}

impl ScriptedRandomness {
    /// A script with the given seeds and rolls.
    pub fn new(
        seeds: impl IntoIterator<Item = u64>,
        rolls: impl IntoIterator<Item = u8>,
    ) -> Self {
        Self {
            seeds: Mutex::new(seeds.into_iter().collect()),
            rolls: Mutex::new(rolls.into_iter().collect()),
        }
    }

    /// Appends dice values to the end of the script.
    pub fn push_rolls(&self, rolls: impl IntoIterator<Item = u8>) {
        script(&self.rolls).extend(rolls);
    }

    /// Appends a turn seed to the end of the script.
    pub fn push_seed(&self, seed: u64) {
        script(&self.seeds).push_back(seed);
    }

    /// Dice values not yet handed out.
    pub fn remaining_rolls(&self) -> usize {
        script(&self.rolls).len()
    }
}

/// Locks a queue. A panic while it was held can't leave a `VecDeque`
/// half-updated, so a poisoned lock is still usable.
fn script<T>(queue: &Mutex<VecDeque<T>>) -> MutexGuard<'_, VecDeque<T>> {
    queue.lock().unwrap_or_else(PoisonError::into_inner)
}

fn pop<T>(queue: &Mutex<VecDeque<T>>) -> Result<T, RandomnessError> {
    script(queue).pop_front().ok_or(RandomnessError::Exhausted)
}

impl RandomnessPort for ScriptedRandomness {
    async fn next_dice_value(&self) -> Result<u8, RandomnessError> {
        pop(&self.rolls)
    }

    async fn next_turn_seed(&self) -> Result<u64, RandomnessError> {
        pop(&self.seeds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_script_replays_in_order_then_runs_dry() {
        let port = ScriptedRandomness::new([9], [6, 2]);
        port.push_rolls([5]);
        assert_eq!(port.remaining_rolls(), 3);

        assert_eq!(port.next_turn_seed().await, Ok(9));
        assert_eq!(port.next_dice_value().await, Ok(6));
        assert_eq!(port.next_dice_value().await, Ok(2));
        assert_eq!(port.next_dice_value().await, Ok(5));
        assert_eq!(port.next_dice_value().await, Err(RandomnessError::Exhausted));
        assert_eq!(port.next_turn_seed().await, Err(RandomnessError::Exhausted));
    }

    #[tokio::test]
    async fn test_poisoned_script_keeps_its_values() {
        let port = ScriptedRandomness::new([], [4]);
        let _ = std::thread::scope(|scope| {
            scope
                .spawn(|| {
                    let _guard = port.rolls.lock();
                    panic!("poison the roll queue");
                })
                .join()
        });
        assert!(port.rolls.is_poisoned());

        port.push_rolls([3]);
        port.push_seed(1);
        assert_eq!(port.remaining_rolls(), 2);
        assert_eq!(port.next_dice_value().await, Ok(4));
        assert_eq!(port.next_dice_value().await, Ok(3));
        assert_eq!(port.next_turn_seed().await, Ok(1));
    }
}
