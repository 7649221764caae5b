//! Cooperative, tick-aligned scheduler for deferred actions.
//!
//! The queue is ordered by `(fire_at, ActionId)`, so actions due on the same
//! tick fire in scheduling order. [`DeferredActionScheduler::take_due`]
//! detaches everything due at once: actions scheduled while those fire land
//! in the queue with `fire_at > now` and are never picked up by the same
//! pass.
mod action;

use std::collections::BTreeMap;

pub use action::{
    ActionId, ActionPhase, ActionRequest, Continuation, DeferredAction, Payload, Repeats,
    Termination, WavePayload,
};

use crate::state::{EntityId, Tick};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeferredActionScheduler {
    queue: BTreeMap<(Tick, ActionId), DeferredAction>,
    next_id: u64,
}

impl DeferredActionScheduler {
    /// Registers `request` to fire `delay` ticks after `now`.
    ///
    /// A zero delay is bumped to one tick: nothing ever fires in the tick
    /// that scheduled it.
    pub fn schedule(&mut self, now: Tick, delay: u64, request: ActionRequest) -> ActionId {
        let id = ActionId(self.next_id);
        self.next_id += 1;

        let action = DeferredAction::new(id, now + delay.max(1), request);
        self.queue.insert((action.fire_at(), id), action);
        id
    }

    /// Detaches every action due at or before `now`, in firing order.
    pub fn take_due(&mut self, now: Tick) -> Vec<DeferredAction> {
        let later = self.queue.split_off(&(now + 1, ActionId(0)));
        std::mem::replace(&mut self.queue, later)
            .into_values()
            .collect()
    }

    /// Puts a rescheduled action back into the queue.
    pub fn rearm(&mut self, action: DeferredAction) {
        debug_assert_eq!(action.phase(), ActionPhase::Rescheduled);
        self.queue.insert((action.fire_at(), action.id()), action);
    }

    /// Returns detached actions that never fired to the queue, keeping
    /// their ids and due ticks.
    pub fn requeue(&mut self, actions: impl IntoIterator<Item = DeferredAction>) {
        for action in actions {
            debug_assert!(
                action.phase().is_pending(),
                "{} requeued in {:?}",
                action.id(),
                action.phase()
            );
            self.queue.insert((action.fire_at(), action.id()), action);
        }
    }

    pub fn get(&self, id: ActionId) -> Option<&DeferredAction> {
        self.queue.values().find(|action| action.id() == id)
    }

    /// Pending actions in firing order.
    pub fn pending(&self) -> impl Iterator<Item = &DeferredAction> {
        self.queue.values()
    }

    /// Pending chains owned by `owner`.
    pub fn chains_for(&self, owner: EntityId) -> impl Iterator<Item = &DeferredAction> {
        self.queue
            .values()
            .filter(move |action| action.owner() == owner)
    }

    /// Tick of the earliest pending action.
    pub fn next_due(&self) -> Option<Tick> {
        self.queue.keys().next().map(|(tick, _)| *tick)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{EffectId, TargetSelector};

    fn request(owner: u32) -> ActionRequest {
        ActionRequest::once(
            EntityId(owner),
            TargetSelector::OwnerTarget,
            Payload::Effect {
                effect: EffectId(1),
                magnitude: 1,
            },
        )
    }

    #[test]
    fn due_actions_come_out_in_tick_then_id_order() {
        let mut scheduler = DeferredActionScheduler::default();
        let late = scheduler.schedule(Tick(0), 3, request(1));
        let first = scheduler.schedule(Tick(0), 2, request(1));
        let second = scheduler.schedule(Tick(0), 2, request(2));

        assert!(scheduler.take_due(Tick(1)).is_empty());
        let due: Vec<_> = scheduler.take_due(Tick(3)).iter().map(|a| a.id()).collect();
        assert_eq!(due, vec![first, second, late]);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn zero_delay_fires_next_tick() {
        let mut scheduler = DeferredActionScheduler::default();
        scheduler.schedule(Tick(4), 0, request(1));
        assert!(scheduler.take_due(Tick(4)).is_empty());
        assert_eq!(scheduler.take_due(Tick(5)).len(), 1);
    }

    #[test]
    fn actions_scheduled_during_a_pass_wait_for_the_next_one() {
        let mut scheduler = DeferredActionScheduler::default();
        scheduler.schedule(Tick(0), 1, request(1));

        let due = scheduler.take_due(Tick(1));
        assert_eq!(due.len(), 1);
        scheduler.schedule(Tick(1), 1, request(1));
        assert!(scheduler.take_due(Tick(1)).is_empty());
        assert_eq!(scheduler.next_due(), Some(Tick(2)));
    }

    #[test]
    fn requeued_actions_are_due_again() {
        let mut scheduler = DeferredActionScheduler::default();
        let first = scheduler.schedule(Tick(0), 1, request(1));
        let second = scheduler.schedule(Tick(0), 1, request(2));

        let mut due = scheduler.take_due(Tick(1));
        due.remove(0);
        scheduler.requeue(due);

        assert_eq!(scheduler.next_due(), Some(Tick(1)));
        let ids: Vec<_> = scheduler.take_due(Tick(2)).iter().map(|a| a.id()).collect();
        assert_eq!(ids, vec![second]);
        assert!(scheduler.get(first).is_none());
    }

    #[test]
    fn rearm_keeps_id() {
        let mut scheduler = DeferredActionScheduler::default();
        let id = scheduler.schedule(
            Tick(0),
            1,
            request(1).repeating(Repeats::Bounded(2), 2, Continuation::ALWAYS),
        );
        let mut action = scheduler.take_due(Tick(1)).remove(0);
        action.begin_firing();
        action.settle(Tick(1), |_| true);
        scheduler.rearm(action);

        assert_eq!(scheduler.get(id).map(DeferredAction::fire_at), Some(Tick(3)));
        assert_eq!(scheduler.chains_for(EntityId(1)).count(), 1);
        assert_eq!(scheduler.chains_for(EntityId(2)).count(), 0);
    }
}
