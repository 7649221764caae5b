mod actor;
mod common;
mod modifiers;
mod target;

pub use actor::ActorState;
pub use common::{AbilityId, AuraId, EffectId, EntityId, Tick};
pub use modifiers::{ModifierFlags, ModifierKind};
pub use target::TargetSelector;
