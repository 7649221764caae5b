//! Effect application seam towards the surrounding engine.

use crate::state::{EffectId, EntityId};

/// Result reported by the engine for one effect application.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum EffectResult {
    Applied,
    /// Immune, out of range, evaded, ...; the core does not care why.
    Failed,
}

impl EffectResult {
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Applies effects on behalf of the core.
///
/// This is the only way the core affects other actors. Implementations own
/// combat math and must not call back into the engine that invoked them.
pub trait EffectSink {
    fn apply_effect(
        &mut self,
        source: EntityId,
        effect: EffectId,
        target: EntityId,
        magnitude: i32,
    ) -> EffectResult;
}

/// Sink that accepts every effect and forgets it.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EffectSink for NullSink {
    fn apply_effect(&mut self, _: EntityId, _: EffectId, _: EntityId, _: i32) -> EffectResult {
        EffectResult::Applied
    }
}

/// One effect application observed by a [`RecordingSink`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AppliedEffect {
    pub source: EntityId,
    pub effect: EffectId,
    pub target: EntityId,
    pub magnitude: i32,
}

/// Sink that records every application and reports success.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    applied: Vec<AppliedEffect>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn applied(&self) -> &[AppliedEffect] {
        &self.applied
    }

    pub fn take(&mut self) -> Vec<AppliedEffect> {
        std::mem::take(&mut self.applied)
    }
}

impl EffectSink for RecordingSink {
    fn apply_effect(
        &mut self,
        source: EntityId,
        effect: EffectId,
        target: EntityId,
        magnitude: i32,
    ) -> EffectResult {
        self.applied.push(AppliedEffect {
            source,
            effect,
            target,
            magnitude,
        });
        EffectResult::Applied
    }
}
