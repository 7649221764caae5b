use arrayvec::ArrayVec;

use crate::config::CombatConfig;
use crate::env::Chance;
use crate::state::{AbilityId, EffectId, ModifierFlags, ModifierKind, TargetSelector};

/// One payload effect of a wave ("main hand", "off hand", ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Strike {
    pub effect: EffectId,
    pub magnitude: i32,
}

impl Strike {
    pub const fn new(effect: EffectId, magnitude: i32) -> Self {
        Self { effect, magnitude }
    }
}

/// Extra guaranteed waves granted while the owner holds `modifier`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BonusWaves {
    pub modifier: ModifierKind,
    pub waves: u32,
}

/// Data description of a multi-strike sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SequenceSpec {
    /// Ability the sequence belongs to; drives the re-entrancy guard.
    pub ability: AbilityId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub target: TargetSelector,
    pub strikes: ArrayVec<Strike, { CombatConfig::MAX_STRIKES_PER_WAVE }>,
    /// Unconditional waves; defaults to `CombatConfig::base_waves`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub base_waves: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub bonus_waves: ArrayVec<BonusWaves, { CombatConfig::MAX_BONUS_SOURCES }>,
    /// Per-wave roll extending the sequence past its guaranteed waves.
    #[cfg_attr(feature = "serde", serde(default))]
    pub continuation: Option<Chance>,
    /// Hard cap on waves; never above `CombatConfig::max_waves`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_waves: Option<u32>,
    /// Ticks between waves; defaults to `CombatConfig::wave_delay`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub wave_delay: Option<u64>,
}

impl SequenceSpec {
    pub fn new(ability: AbilityId, target: TargetSelector) -> Self {
        Self {
            ability,
            target,
            strikes: ArrayVec::new(),
            base_waves: None,
            bonus_waves: ArrayVec::new(),
            continuation: None,
            max_waves: None,
            wave_delay: None,
        }
    }

    /// Adds a strike; ignored once `MAX_STRIKES_PER_WAVE` strikes are present.
    pub fn with_strike(mut self, strike: Strike) -> Self {
        if !self.strikes.is_full() {
            self.strikes.push(strike);
        }
        self
    }

    pub fn with_base_waves(mut self, waves: u32) -> Self {
        self.base_waves = Some(waves);
        self
    }

    /// Adds a bonus source; ignored once `MAX_BONUS_SOURCES` sources are present.
    pub fn with_bonus(mut self, modifier: ModifierKind, waves: u32) -> Self {
        if !self.bonus_waves.is_full() {
            self.bonus_waves.push(BonusWaves { modifier, waves });
        }
        self
    }

    pub fn with_continuation(mut self, chance: Chance, max_waves: u32) -> Self {
        self.continuation = Some(chance);
        self.max_waves = Some(max_waves);
        self
    }

    pub fn with_max_waves(mut self, max_waves: u32) -> Self {
        self.max_waves = Some(max_waves);
        self
    }

    pub fn with_wave_delay(mut self, ticks: u64) -> Self {
        self.wave_delay = Some(ticks);
        self
    }

    /// Resolves wave counts for an owner holding `modifiers`.
    pub fn plan(&self, modifiers: ModifierFlags, config: &CombatConfig) -> WavePlan {
        let ceiling = config.max_waves.max(1);
        let max = self.max_waves.unwrap_or(ceiling).clamp(1, ceiling);

        let bonus: u32 = self
            .bonus_waves
            .iter()
            .filter(|bonus| modifiers.contains(bonus.modifier.flag()))
            .fold(0, |total, bonus| total.saturating_add(bonus.waves));
        let guaranteed = self
            .base_waves
            .unwrap_or(config.base_waves)
            .saturating_add(bonus)
            .clamp(1, max);

        // Without a continuation roll nothing can extend past the guaranteed waves.
        let (max, continuation) = match self.continuation {
            Some(chance) if guaranteed < max => (max, Some(chance)),
            _ => (guaranteed, None),
        };

        WavePlan {
            guaranteed,
            max,
            continuation,
            delay: self.wave_delay.unwrap_or(config.wave_delay).max(1),
        }
    }
}

/// Wave counts resolved for one launch of a sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WavePlan {
    /// Waves that run without any roll.
    pub guaranteed: u32,
    /// Upper bound, reached only if every continuation roll succeeds.
    pub max: u32,
    pub continuation: Option<Chance>,
    pub delay: u64,
}
