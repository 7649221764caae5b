//! Inputs queued for the next tick.
//!
//! Commands run at the start of the tick they are taken by, in submission
//! order, before any deferred action due that tick fires.
use combat_core::{
    CombatEngine, CombatEnv, ConsumeMode, EngineError, EntityId, FollowUp, ModifierKind,
    ResourceKind, TriggerEvent,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// A cast or proc reported by the dispatch layer.
    Trigger { actor: EntityId, event: TriggerEvent },
    Grant {
        actor: EntityId,
        resource: ResourceKind,
        units: u32,
    },
    Consume {
        actor: EntityId,
        resource: ResourceKind,
        units: u32,
        mode: ConsumeMode,
    },
    Spend {
        actor: EntityId,
        resource: ResourceKind,
        desired: u32,
        mode: ConsumeMode,
        follow_up: FollowUp,
    },
    ModifierGained {
        actor: EntityId,
        modifier: ModifierKind,
    },
    ModifierRemoved {
        actor: EntityId,
        modifier: ModifierKind,
    },
    /// The resource's aura was dispelled or expired.
    AuraRemoved {
        actor: EntityId,
        resource: ResourceKind,
    },
    SetTarget {
        actor: EntityId,
        target: Option<EntityId>,
    },
    Despawn { actor: EntityId },
}

impl Command {
    /// Actor the command acts on behalf of.
    pub fn actor(&self) -> EntityId {
        match self {
            Self::Trigger { actor, .. }
            | Self::Grant { actor, .. }
            | Self::Consume { actor, .. }
            | Self::Spend { actor, .. }
            | Self::ModifierGained { actor, .. }
            | Self::ModifierRemoved { actor, .. }
            | Self::AuraRemoved { actor, .. }
            | Self::SetTarget { actor, .. }
            | Self::Despawn { actor } => *actor,
        }
    }

    pub(crate) fn execute(
        self,
        engine: &mut CombatEngine<'_>,
        env: &CombatEnv<'_>,
    ) -> Result<(), EngineError> {
        match self {
            Self::Trigger { actor, event } => engine.on_trigger(env, actor, &event)?,
            Self::Grant {
                actor,
                resource,
                units,
            } => {
                engine.grant(env, actor, resource, units)?;
            }
            Self::Consume {
                actor,
                resource,
                units,
                mode,
            } => {
                engine.consume(actor, resource, units, mode);
            }
            Self::Spend {
                actor,
                resource,
                desired,
                mode,
                follow_up,
            } => {
                engine.spend(env, actor, resource, desired, mode, &follow_up)?;
            }
            Self::ModifierGained { actor, modifier } => {
                engine.on_modifier_gained(actor, modifier);
            }
            Self::ModifierRemoved { actor, modifier } => {
                engine.on_modifier_removed(actor, modifier);
            }
            Self::AuraRemoved { actor, resource } => {
                engine.on_aura_removed(actor, resource);
            }
            Self::SetTarget { actor, target } => {
                engine.set_target(actor, target);
            }
            Self::Despawn { actor } => {
                engine.despawn(actor);
            }
        }
        Ok(())
    }
}
