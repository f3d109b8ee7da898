//! Deterministic PRNG for simulation use (essence rolls, spawn velocity).
//!
//! Uses the SplitMix64 algorithm: fast, 8 bytes of state, excellent
//! statistical properties, and trivially serializable for snapshots.

use crate::fixed::Fixed64;

/// SplitMix64 pseudo-random number generator.
///
/// Deterministic across platforms.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SimRng {
    state: u64,
}

impl SimRng {
    /// Create a new RNG with the given seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform integer in the inclusive range `[min, max]`.
    pub fn range_u32(&mut self, min: u32, max: u32) -> u32 {
        assert!(min <= max, "inverted range [{min}, {max}]");
        let span = (max - min) as u64 + 1;
        min + (self.next_u64() % span) as u32
    }

    /// Uniform Fixed64 in `[-scale, scale]`, for small spawn-velocity jitter.
    pub fn jitter(&mut self, scale: Fixed64) -> Fixed64 {
        // Lower 32 random bits become the fractional part of a Q32.32 value
        // in [0, 1), mapped to [-1, 1) and scaled.
        let frac = Fixed64::from_bits((self.next_u64() >> 32) as i64);
        (frac * Fixed64::from_num(2) - Fixed64::from_num(1)) * scale
    }

    /// Get the internal state (for serialization).
    pub fn state(&self) -> u64 {
        self.state
    }
}
