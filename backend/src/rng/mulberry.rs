//! Mulberry32 random number generator
//!
//! A small, fast PRNG with a single `u32` of state. All state arithmetic is
//! wrapping fixed-width integer math, so the stream is bit-identical on every
//! platform.
//!
//! # Determinism
//!
//! Same seed → same sequence of random numbers. The state word is persisted
//! inside the world state at the end of every tick, and restoring it with
//! [`RngManager::from_state`] resumes the stream exactly where it stopped.

use serde::{Deserialize, Serialize};

const INCREMENT: u32 = 0x6D2B_79F5;
const TWO_POW_32: f64 = 4_294_967_296.0;

/// Deterministic random number generator using Mulberry32
///
/// # Example
/// ```
/// use econ_sim_core::RngManager;
///
/// let mut rng = RngManager::new(1337);
/// let value = rng.next();
/// assert!((0.0..1.0).contains(&value));
/// let index = rng.range(0, 10); // [0, 10)
/// assert!((0..10).contains(&index));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngManager {
    /// Internal state (32-bit)
    state: u32,
}

impl RngManager {
    /// Create a new RNG with given seed
    ///
    /// Every `u32`, zero included, is a valid seed.
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Restore a generator from a state previously returned by [`get_state`](Self::get_state)
    ///
    /// # Example
    /// ```
    /// use econ_sim_core::RngManager;
    ///
    /// let mut rng = RngManager::new(42);
    /// rng.next();
    /// let mut resumed = RngManager::from_state(rng.get_state());
    /// assert_eq!(rng.next(), resumed.next());
    /// ```
    pub fn from_state(state: u32) -> Self {
        Self { state }
    }

    /// Advance the state and return the raw 32-bit output
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(INCREMENT);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Generate the next value in [0.0, 1.0)
    ///
    /// The float is derived from the integer output by a single exact
    /// division, so it carries no platform-dependent rounding.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> f64 {
        f64::from(self.next_u32()) / TWO_POW_32
    }

    /// Generate random value in range [min, max)
    ///
    /// # Panics
    /// Panics if min >= max
    pub fn range(&mut self, min: i64, max: i64) -> i64 {
        assert!(min < max, "min must be less than max");

        let span = (max - min) as f64;
        min + (self.next() * span).floor() as i64
    }

    /// Returns true with probability `p`
    pub fn chance(&mut self, p: f64) -> bool {
        self.next() < p
    }

    /// In-place Fisher–Yates shuffle, one `range` draw per remaining index
    ///
    /// # Example
    /// ```
    /// use econ_sim_core::RngManager;
    ///
    /// let mut rng = RngManager::new(7);
    /// let mut ids = vec![1, 2, 3, 4, 5];
    /// rng.shuffle(&mut ids);
    /// ids.sort();
    /// assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    /// ```
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.range(0, i as i64 + 1) as usize;
            items.swap(i, j);
        }
    }

    /// Get current RNG state (for checkpointing/replay)
    pub fn get_state(&self) -> u32 {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_first_outputs_for_seed_zero() {
        // Reference values of the canonical Mulberry32 stream
        let mut rng = RngManager::new(0);
        assert_eq!(rng.next_u32(), 1_144_304_738);
        assert_eq!(rng.next_u32(), 1_416_247);
    }

    #[test]
    #[should_panic(expected = "min must be less than max")]
    fn test_range_invalid_bounds() {
        let mut rng = RngManager::new(12345);
        rng.range(100, 50);
    }

    #[test]
    fn test_next_in_range() {
        let mut rng = RngManager::new(12345);

        for _ in 0..1000 {
            let val = rng.next();
            assert!(
                (0.0..1.0).contains(&val),
                "next() produced value {} outside [0.0, 1.0)",
                val
            );
        }
    }

    #[test]
    fn test_shuffle_empty_and_single() {
        let mut rng = RngManager::new(1);
        let mut empty: Vec<u8> = vec![];
        rng.shuffle(&mut empty);
        let mut one = vec![9];
        rng.shuffle(&mut one);
        assert_eq!(one, vec![9]);
        // No draws are consumed for lists shorter than two
        assert_eq!(rng.get_state(), 1);
    }

    #[test]
    fn test_shuffle_swaps_with_range_draws() {
        let mut items: Vec<u32> = (0..8).collect();
        RngManager::new(42).shuffle(&mut items);

        let mut replay = RngManager::new(42);
        let mut expected: Vec<u32> = (0..8).collect();
        for i in (1..expected.len()).rev() {
            let j = replay.range(0, i as i64 + 1) as usize;
            expected.swap(i, j);
        }
        assert_eq!(items, expected);
    }
}
