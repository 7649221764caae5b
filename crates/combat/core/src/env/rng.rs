//! RNG oracle for deterministic random number generation.
//!
//! Proc chances and wave continuation rolls go through [`RngOracle`]. Every
//! roll draws a fresh seed from [`compute_seed`] mixed with a per-state roll
//! counter, so consecutive rolls are independent Bernoulli trials while a
//! whole simulation stays reproducible from its seed.

/// Probability expressed in hundredths of a percent (`10_000` = certain).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "f32", into = "f32"))]
pub struct Chance(u16);

impl Chance {
    pub const NEVER: Self = Self(0);
    pub const ALWAYS: Self = Self(10_000);

    /// Builds a chance from a percentage, clamped to `0.0..=100.0`.
    pub fn percent(pct: f32) -> Self {
        if pct.is_nan() {
            return Self::NEVER;
        }
        Self((pct.clamp(0.0, 100.0) * 100.0).round() as u16)
    }

    pub const fn from_basis_points(bp: u16) -> Self {
        Self(if bp > 10_000 { 10_000 } else { bp })
    }

    pub const fn basis_points(self) -> u16 {
        self.0
    }

    pub fn as_percent(self) -> f32 {
        f32::from(self.0) / 100.0
    }

    pub const fn is_certain(self) -> bool {
        self.0 >= 10_000
    }
}

impl From<f32> for Chance {
    fn from(pct: f32) -> Self {
        Self::percent(pct)
    }
}

impl From<Chance> for f32 {
    fn from(chance: Chance) -> Self {
        chance.as_percent()
    }
}

impl core::fmt::Display for Chance {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:.2}%", self.as_percent())
    }
}

/// RNG oracle for deterministic random number generation.
///
/// Implementations must be deterministic and produce the same values
/// given the same seed.
pub trait RngOracle: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Bernoulli trial succeeding with probability `chance`.
    fn chance(&self, seed: u64, chance: Chance) -> bool {
        if chance.is_certain() {
            return true;
        }
        if chance == Chance::NEVER {
            return false;
        }
        (self.next_u32(seed) % 10_000) < u32::from(chance.basis_points())
    }
}

/// PCG random number generator (PCG-XSH-RR, 64-bit state, 32-bit output).
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// XSH-RR output permutation.
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }
}

/// Oracle whose every roll returns the same value. Useful for tests and for
/// scripted encounters that must not branch.
#[derive(Clone, Copy, Debug)]
pub struct FixedRng(pub u32);

impl FixedRng {
    /// Every [`RngOracle::chance`] roll succeeds unless the chance is zero.
    pub const ALWAYS_SUCCEED: Self = Self(0);
    /// Every roll below certainty fails.
    pub const ALWAYS_FAIL: Self = Self(u32::MAX);
}

impl RngOracle for FixedRng {
    fn next_u32(&self, _seed: u64) -> u32 {
        self.0
    }

    fn chance(&self, _seed: u64, chance: Chance) -> bool {
        if chance.is_certain() {
            return true;
        }
        if chance == Chance::NEVER {
            return false;
        }
        (self.0 % 10_000) < u32::from(chance.basis_points())
    }
}

/// Compute deterministic seed from state components.
///
/// # Arguments
///
/// * `combat_seed` - Base seed set when the combat state is created
/// * `nonce` - Roll sequence number (increments on every roll)
/// * `actor_id` - Actor on whose behalf the roll happens
/// * `context` - Distinguishes roll purposes (proc vs. continuation)
pub fn compute_seed(combat_seed: u64, nonce: u64, actor_id: u32, context: u32) -> u64 {
    // SplitMix64 / FxHash style mixing
    let mut hash = combat_seed;

    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (actor_id as u64).wrapping_mul(0x517cc1b727220a95);
    hash ^= (context as u64).wrapping_mul(0x85ebca6b);

    // Final avalanche step
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}
