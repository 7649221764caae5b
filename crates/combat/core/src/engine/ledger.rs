//! Ledger operations: grant, consume, synchronize and external changes.

use tracing::{debug, trace};

use super::{CombatEngine, EngineError};
use crate::env::CombatEnv;
use crate::event::CombatEvent;
use crate::ledger::{ConsumeMode, ConsumeOutcome, GrantOutcome, ResourceKind, Transitions};
use crate::state::{EntityId, ModifierKind};

impl CombatEngine<'_> {
    /// `Grant`: adds `units` stacks, creating the ledger on first use.
    ///
    /// A missing or dead actor is a no-op.
    ///
    /// # Errors
    ///
    /// Fails if an oracle is missing, the resource has no rules, or the
    /// actor already holds the maximum number of ledgers.
    pub fn grant(
        &mut self,
        env: &CombatEnv<'_>,
        actor: EntityId,
        resource: ResourceKind,
        units: u32,
    ) -> Result<GrantOutcome, EngineError> {
        if self.state.actor(actor).is_none() {
            trace!(%actor, %resource, "grant to missing actor ignored");
            return Ok(GrantOutcome::default());
        }

        let rules = env
            .ledgers()?
            .rules(resource)
            .ok_or(EngineError::MissingLedgerRules { actor, resource })?;
        let policy = env.config()?.overflow_policy;

        let Some(actor_state) = self.state.actor_mut(actor) else {
            return Ok(GrantOutcome::default());
        };
        let expanded = actor_state.holds(ModifierKind::ExpandedCapacity);
        let ledger = actor_state
            .ledgers
            .get_or_create(rules, policy)
            .ok_or(EngineError::LedgerCapacity { actor, resource })?;

        let outcome = ledger.grant(units, expanded);
        let count = ledger.count();
        let drained = ledger.is_drained();
        if drained {
            actor_state.ledgers.remove(resource);
        }

        debug!(
            %actor,
            %resource,
            units,
            added = outcome.added,
            overflowed = outcome.overflowed,
            dropped = outcome.dropped,
            count,
            "granted stacks"
        );
        self.record(CombatEvent::StacksGranted {
            actor,
            resource,
            added: outcome.added,
            overflowed: outcome.overflowed,
            dropped: outcome.dropped,
            count,
        });
        self.record_transitions(actor, resource, &outcome.transitions);
        if drained {
            self.record(CombatEvent::LedgerCleared { actor, resource });
        }
        Ok(outcome)
    }

    /// `Consume`: removes stacks per `mode` and returns what happened.
    ///
    /// Consuming from a missing ledger or actor removes nothing. A ledger
    /// that drains completely is destroyed.
    pub fn consume(
        &mut self,
        actor: EntityId,
        resource: ResourceKind,
        units: u32,
        mode: ConsumeMode,
    ) -> ConsumeOutcome {
        let Some(actor_state) = self.state.actor_mut(actor) else {
            return ConsumeOutcome::default();
        };
        let Some(ledger) = actor_state.ledgers.get_mut(resource) else {
            trace!(%actor, %resource, "consume from empty ledger");
            return ConsumeOutcome::default();
        };

        let outcome = ledger.consume(units, mode);
        let count = ledger.count();
        let overflow = ledger.overflow_count();
        let drained = ledger.is_drained();
        if drained {
            actor_state.ledgers.remove(resource);
        }

        if outcome.removed > 0 {
            debug!(
                %actor,
                %resource,
                removed = outcome.removed,
                from_overflow = outcome.from_overflow,
                count,
                overflow,
                "consumed stacks"
            );
            self.record(CombatEvent::StacksConsumed {
                actor,
                resource,
                removed: outcome.removed,
                from_overflow: outcome.from_overflow,
                count,
                overflow,
            });
        }
        self.record_transitions(actor, resource, &outcome.transitions);
        if drained {
            self.record(CombatEvent::LedgerCleared { actor, resource });
        }
        outcome
    }

    /// `Synchronize`: recomputes derived states from the current count.
    ///
    /// Safe to call redundantly; a second call reports no transitions.
    pub fn synchronize(&mut self, actor: EntityId, resource: ResourceKind) -> Transitions {
        let Some(ledger) = self
            .state
            .actor_mut(actor)
            .and_then(|actor| actor.ledgers.get_mut(resource))
        else {
            return Transitions::new();
        };

        let transitions = ledger.synchronize();
        self.record_transitions(actor, resource, &transitions);
        transitions
    }

    /// `OnAuraRemoved`: the resource was stripped externally (dispel, expiry).
    ///
    /// Clears the ledger, deactivates its derived states and destroys it.
    /// Returns false if there was no ledger.
    pub fn on_aura_removed(&mut self, actor: EntityId, resource: ResourceKind) -> bool {
        let Some(actor_state) = self.state.actor_mut(actor) else {
            return false;
        };
        let Some(mut ledger) = actor_state.ledgers.remove(resource) else {
            return false;
        };

        let transitions = ledger.clear();
        debug!(%actor, %resource, "ledger removed externally");
        self.record_transitions(actor, resource, &transitions);
        self.record(CombatEvent::LedgerCleared { actor, resource });
        true
    }

    /// Grants a modifier. Returns false if the actor is gone or already held it.
    pub fn on_modifier_gained(&mut self, actor: EntityId, modifier: ModifierKind) -> bool {
        let Some(actor_state) = self.state.actor_mut(actor) else {
            return false;
        };
        if actor_state.holds(modifier) {
            return false;
        }
        actor_state.modifiers.insert(modifier.flag());

        debug!(%actor, %modifier, "modifier gained");
        self.record(CombatEvent::ModifierChanged {
            actor,
            modifier,
            held: true,
        });
        true
    }

    /// Removes a modifier. Losing `ExpandedCapacity` settles every overflow
    /// bucket the actor holds according to its ledger's overflow policy.
    pub fn on_modifier_removed(&mut self, actor: EntityId, modifier: ModifierKind) -> bool {
        let Some(actor_state) = self.state.actor_mut(actor) else {
            return false;
        };
        if !actor_state.holds(modifier) {
            return false;
        }
        actor_state.modifiers.remove(modifier.flag());

        let collapsed: Vec<_> = if modifier == ModifierKind::ExpandedCapacity {
            actor_state
                .ledgers
                .iter_mut()
                .filter(|ledger| ledger.overflow().is_some())
                .map(|ledger| (ledger.resource(), ledger.collapse_overflow()))
                .collect()
        } else {
            Vec::new()
        };

        debug!(%actor, %modifier, "modifier removed");
        self.record(CombatEvent::ModifierChanged {
            actor,
            modifier,
            held: false,
        });
        for (resource, outcome) in collapsed {
            debug!(
                %actor,
                %resource,
                retained = outcome.retained,
                discarded = outcome.discarded,
                "overflow collapsed"
            );
            self.record(CombatEvent::OverflowCollapsed {
                actor,
                resource,
                retained: outcome.retained,
                discarded: outcome.discarded,
            });
            self.record_transitions(actor, resource, &outcome.transitions);
        }
        true
    }
}
