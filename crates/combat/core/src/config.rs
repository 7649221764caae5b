use crate::ledger::OverflowPolicy;

/// Combat configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CombatConfig {
    /// Ticks between two consecutive waves of a multi-strike sequence.
    pub wave_delay: u64,
    /// Waves a sequence executes unconditionally when its script does not say otherwise.
    pub base_waves: u32,
    /// Upper bound on waves for any sequence, bonus and rolled waves included.
    pub max_waves: u32,
    /// What happens to overflow units when the capacity-expanding modifier is removed.
    pub overflow_policy: OverflowPolicy,
}

impl CombatConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum number of actors held by the registry.
    pub const MAX_ACTORS: usize = 64;
    /// Distinct resource ledgers per actor.
    pub const MAX_LEDGERS: usize = 4;
    /// Derived states driven by a single ledger.
    pub const MAX_DERIVED: usize = 4;
    /// Payload strikes executed by one wave.
    pub const MAX_STRIKES_PER_WAVE: usize = 4;
    /// Modifier entries that can contribute bonus waves to one sequence.
    pub const MAX_BONUS_SOURCES: usize = 4;
    /// Nested trigger dispatch depth (strike procs feeding further procs).
    pub const MAX_TRIGGER_DEPTH: usize = 4;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_WAVE_DELAY: u64 = 2;
    pub const DEFAULT_BASE_WAVES: u32 = 2;
    pub const DEFAULT_MAX_WAVES: u32 = 6;

    pub fn new() -> Self {
        Self {
            wave_delay: Self::DEFAULT_WAVE_DELAY,
            base_waves: Self::DEFAULT_BASE_WAVES,
            max_waves: Self::DEFAULT_MAX_WAVES,
            overflow_policy: OverflowPolicy::default(),
        }
    }

    pub fn with_overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self::new()
    }
}
