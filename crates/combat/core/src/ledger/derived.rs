//! Derived states: values computed purely from a ledger's stack count.
//!
//! A derived state has no lifecycle of its own. It is active exactly while
//! `count >= threshold`, and its magnitude is `min(count, cap) * per_unit`.
//! [`DerivedState::sync`] is the only mutator and is idempotent.

use crate::state::AuraId;

/// Static description of one derived state of a ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DerivedRule {
    /// Aura applied while the derived state is active.
    pub aura: AuraId,
    /// Minimum stack count at which the state is active.
    pub threshold: u32,
    /// Stack count beyond which the magnitude stops growing.
    pub cap: u32,
}

impl DerivedRule {
    pub const fn new(aura: AuraId, threshold: u32, cap: u32) -> Self {
        Self {
            aura,
            threshold,
            cap,
        }
    }

    /// Magnitude at the given count, or `None` below the threshold.
    ///
    /// A zero threshold is treated as one: an empty ledger never carries
    /// derived state.
    pub fn magnitude_at(&self, count: u32, per_unit_magnitude: i32) -> Option<i32> {
        if count < self.threshold.max(1) {
            return None;
        }
        let units = count.min(self.cap).min(i32::MAX as u32) as i32;
        Some(units.saturating_mul(per_unit_magnitude))
    }
}

/// Observable change of a derived state produced by a synchronization pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DerivedTransition {
    /// Threshold crossed upward.
    Activated { aura: AuraId, magnitude: i32 },
    /// Still active, magnitude changed.
    Rescaled { aura: AuraId, from: i32, to: i32 },
    /// Threshold crossed downward.
    Deactivated { aura: AuraId },
}

impl DerivedTransition {
    pub fn aura(&self) -> AuraId {
        match self {
            Self::Activated { aura, .. }
            | Self::Rescaled { aura, .. }
            | Self::Deactivated { aura } => *aura,
        }
    }
}

/// Live derived state owned by a [`super::StackLedger`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DerivedState {
    rule: DerivedRule,
    magnitude: Option<i32>,
}

impl DerivedState {
    pub fn new(rule: DerivedRule) -> Self {
        Self {
            rule,
            magnitude: None,
        }
    }

    pub fn rule(&self) -> &DerivedRule {
        &self.rule
    }

    pub fn aura(&self) -> AuraId {
        self.rule.aura
    }

    pub fn is_active(&self) -> bool {
        self.magnitude.is_some()
    }

    /// Current magnitude, `None` while inactive.
    pub fn magnitude(&self) -> Option<i32> {
        self.magnitude
    }

    /// Recomputes this state from the ledger count.
    ///
    /// Returns the transition that happened, if any. Calling it again with
    /// the same count returns `None`.
    pub(crate) fn sync(&mut self, count: u32, per_unit_magnitude: i32) -> Option<DerivedTransition> {
        let aura = self.rule.aura;
        let target = self.rule.magnitude_at(count, per_unit_magnitude);

        let transition = match (self.magnitude, target) {
            (None, None) => None,
            (None, Some(magnitude)) => Some(DerivedTransition::Activated { aura, magnitude }),
            (Some(_), None) => Some(DerivedTransition::Deactivated { aura }),
            (Some(from), Some(to)) if from == to => None,
            (Some(from), Some(to)) => Some(DerivedTransition::Rescaled { aura, from, to }),
        };

        self.magnitude = target;
        transition
    }
}
