//! Observable outcomes recorded by the engine.
//!
//! Events are appended in execution order and drained by the runtime,
//! which turns them into its combat log. Nothing in the core reads them
//! back.

use crate::effect::TriggerKind;
use crate::env::{Chance, EffectResult};
use crate::ledger::{DerivedTransition, ResourceKind};
use crate::schedule::{ActionId, Termination};
use crate::sequence::SequenceId;
use crate::state::{AbilityId, EffectId, EntityId, ModifierKind, Tick};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatEvent {
    StacksGranted {
        actor: EntityId,
        resource: ResourceKind,
        added: u32,
        overflowed: u32,
        dropped: u32,
        count: u32,
    },
    StacksConsumed {
        actor: EntityId,
        resource: ResourceKind,
        removed: u32,
        /// Part of `removed` taken from the overflow bucket.
        from_overflow: u32,
        count: u32,
        overflow: u32,
    },
    /// Overflow settled after the expanding modifier was removed.
    OverflowCollapsed {
        actor: EntityId,
        resource: ResourceKind,
        retained: u32,
        discarded: u32,
    },
    DerivedChanged {
        actor: EntityId,
        resource: ResourceKind,
        transition: DerivedTransition,
    },
    /// Ledger destroyed after draining or an external removal.
    LedgerCleared {
        actor: EntityId,
        resource: ResourceKind,
    },
    ModifierChanged {
        actor: EntityId,
        modifier: ModifierKind,
        held: bool,
    },
    /// Actor left the registry; its id is never reused.
    ActorDespawned {
        actor: EntityId,
    },
    TargetChanged {
        actor: EntityId,
        target: Option<EntityId>,
    },
    /// A spend found nothing to consume; its follow-up was not applied.
    SpendSkipped {
        actor: EntityId,
        resource: ResourceKind,
    },
    Spent {
        actor: EntityId,
        resource: ResourceKind,
        spent: u32,
        magnitude: i32,
    },
    EffectApplied {
        source: EntityId,
        effect: EffectId,
        target: EntityId,
        magnitude: i32,
        result: EffectResult,
    },
    /// An immediate effect found no target; nothing was applied.
    TargetUnresolved {
        actor: EntityId,
        effect: EffectId,
    },
    ProcRolled {
        actor: EntityId,
        chance: Chance,
        success: bool,
    },
    TriggerDropped {
        actor: EntityId,
        trigger: TriggerKind,
        depth: usize,
    },
    ActionScheduled {
        action: ActionId,
        owner: EntityId,
        fire_at: Tick,
    },
    ActionFired {
        action: ActionId,
        owner: EntityId,
        target: EntityId,
    },
    ActionRescheduled {
        action: ActionId,
        fire_at: Tick,
    },
    ActionCompleted {
        action: ActionId,
        reason: Termination,
    },
    SequenceStarted {
        sequence: SequenceId,
        ability: AbilityId,
        owner: EntityId,
        guaranteed: u32,
        max: u32,
    },
    /// A strike tried to launch a sequence of an ability already in its ancestry.
    SequenceSuppressed {
        ability: AbilityId,
        origin: SequenceId,
    },
    WaveExecuted {
        sequence: SequenceId,
        wave: u32,
        target: EntityId,
    },
    SequenceCompleted {
        sequence: SequenceId,
        waves: u32,
        reason: Termination,
    },
}
