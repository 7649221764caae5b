//! The combat engine: the only writer of [`CombatState`].
//!
//! [`CombatEngine`] borrows the state and an [`EffectSink`] for the duration
//! of one batch of work (a trigger, a tick) and records every observable
//! outcome as a [`CombatEvent`]. Its methods are split by concern:
//!
//! - `ledger`: grant, consume, synchronize, external removals, modifiers
//! - `spend`: the consumption protocol
//! - `sequence`: multi-strike launches
//! - `schedule`: deferred actions and the tick firing pass
//! - `dispatch`: triggers and effect descriptors
mod dispatch;
mod errors;
mod ledger;
mod schedule;
mod sequence;
mod spend;

pub use dispatch::DispatchContext;
pub use errors::EngineError;

use tracing::debug;

use crate::env::{EffectResult, EffectSink};
use crate::event::CombatEvent;
use crate::ledger::{ResourceKind, StackLedger, Transitions};
use crate::state::{CombatState, EffectId, EntityId, Tick};

/// Roll contexts mixed into [`crate::env::compute_seed`].
const PROC_ROLL: u32 = 1;
const CONTINUATION_ROLL: u32 = 2;

pub struct CombatEngine<'a> {
    state: &'a mut CombatState,
    sink: &'a mut dyn EffectSink,
    events: Vec<CombatEvent>,
}

impl<'a> CombatEngine<'a> {
    pub fn new(state: &'a mut CombatState, sink: &'a mut dyn EffectSink) -> Self {
        Self {
            state,
            sink,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> &CombatState {
        self.state
    }

    pub fn clock(&self) -> Tick {
        self.state.clock
    }

    /// `GetStackCount`: zero for unknown actors or missing ledgers.
    pub fn stack_count(&self, actor: EntityId, resource: ResourceKind) -> u32 {
        self.state.stack_count(actor, resource)
    }

    pub fn events(&self) -> &[CombatEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    /// Removes `actor` from the registry. Actions it owns or targets
    /// complete the next time they come due.
    ///
    /// Every ledger the actor held is cleared first, so its derived states
    /// report their deactivation.
    pub fn despawn(&mut self, actor: EntityId) -> bool {
        let held: Vec<ResourceKind> = self
            .state
            .actor(actor)
            .map(|state| state.ledgers.iter().map(StackLedger::resource).collect())
            .unwrap_or_default();
        for resource in held {
            self.on_aura_removed(actor, resource);
        }

        if !self.state.despawn_actor(actor) {
            return false;
        }
        debug!(%actor, "actor despawned");
        self.record(CombatEvent::ActorDespawned { actor });
        true
    }

    /// Changes what `OwnerTarget` resolves to for `actor`.
    pub fn set_target(&mut self, actor: EntityId, target: Option<EntityId>) -> bool {
        if !self.state.set_target(actor, target) {
            return false;
        }
        self.record(CombatEvent::TargetChanged { actor, target });
        true
    }

    fn record(&mut self, event: CombatEvent) {
        tracing::trace!(?event, "combat event");
        self.events.push(event);
    }

    fn record_transitions(&mut self, actor: EntityId, resource: ResourceKind, transitions: &Transitions) {
        for &transition in transitions {
            tracing::debug!(%actor, %resource, ?transition, "derived state changed");
            self.record(CombatEvent::DerivedChanged {
                actor,
                resource,
                transition,
            });
        }
    }

    /// `ApplyEffect` through the sink, recorded whatever the result.
    fn apply_effect(
        &mut self,
        source: EntityId,
        effect: EffectId,
        target: EntityId,
        magnitude: i32,
    ) -> EffectResult {
        let result = self.sink.apply_effect(source, effect, target, magnitude);
        self.record(CombatEvent::EffectApplied {
            source,
            effect,
            target,
            magnitude,
            result,
        });
        result
    }
}

#[cfg(test)]
mod tests;
