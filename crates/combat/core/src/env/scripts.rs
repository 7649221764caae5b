//! Script lookup oracle.

use crate::effect::{EffectDescriptor, TriggerKind};

/// Returns the descriptors registered for a trigger, in registration order.
pub trait ScriptOracle: Send + Sync {
    fn scripts(&self, trigger: &TriggerKind) -> &[EffectDescriptor];
}
