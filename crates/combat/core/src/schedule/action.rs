//! A single deferred action and its state machine.
//!
//! ```text
//! Scheduled ──fire──▶ Firing ──settle──▶ Rescheduled ──fire──▶ Firing ...
//!                        │                    
//!                        ├──abort(TargetLost | OwnerLost | Faulted)──▶ Completed
//!                        └──settle──▶ Completed(Exhausted | RollFailed)
//! ```
//!
//! Transitions are pure: the engine decides when to call them, this module
//! decides where they lead.

use arrayvec::ArrayVec;
use std::fmt;

use crate::config::CombatConfig;
use crate::env::Chance;
use crate::sequence::{SequenceId, Strike};
use crate::state::{EffectId, EntityId, TargetSelector, Tick};

/// Handle of a scheduled action. Allocated monotonically, never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionId(pub u64);

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "action:{}", self.0)
    }
}

/// Firings left, counting the next one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Repeats {
    Bounded(u32),
    /// Ends only when a continuation roll fails.
    Unbounded,
}

impl Repeats {
    fn decrement(self) -> Self {
        match self {
            Self::Bounded(n) => Self::Bounded(n.saturating_sub(1)),
            Self::Unbounded => Self::Unbounded,
        }
    }

    fn has_more(self) -> bool {
        match self {
            Self::Bounded(n) => n > 0,
            Self::Unbounded => true,
        }
    }
}

/// When a re-arming action keeps going.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Continuation {
    /// Firings that re-arm without a roll.
    pub guaranteed: u32,
    /// Roll gating each re-arm past `guaranteed`. `None` re-arms unconditionally.
    pub chance: Option<Chance>,
}

impl Continuation {
    pub const ALWAYS: Self = Self {
        guaranteed: u32::MAX,
        chance: None,
    };
}

/// Why an action left the schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Termination {
    /// No repeats left.
    Exhausted,
    /// A continuation roll failed.
    RollFailed,
    /// The target did not resolve at fire time.
    TargetLost,
    /// The owner did not resolve at fire time.
    OwnerLost,
    /// The payload returned an engine error mid-firing.
    Faulted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionPhase {
    Scheduled,
    Firing,
    Rescheduled,
    Completed(Termination),
}

impl ActionPhase {
    pub fn is_pending(self) -> bool {
        matches!(self, Self::Scheduled | Self::Rescheduled)
    }
}

/// One wave of a multi-strike sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WavePayload {
    pub sequence: SequenceId,
    pub strikes: ArrayVec<Strike, { CombatConfig::MAX_STRIKES_PER_WAVE }>,
    /// Added to every strike's magnitude (stacks spent to launch the sequence).
    pub empower: i32,
}

/// What an action does when it fires.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Payload {
    Wave(WavePayload),
    Effect { effect: EffectId, magnitude: i32 },
}

impl Payload {
    pub fn sequence(&self) -> Option<SequenceId> {
        match self {
            Self::Wave(wave) => Some(wave.sequence),
            Self::Effect { .. } => None,
        }
    }
}

/// Everything needed to schedule an action; the scheduler assigns id and fire time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionRequest {
    pub owner: EntityId,
    pub target: TargetSelector,
    pub payload: Payload,
    pub interval: u64,
    pub repeats: Repeats,
    pub continuation: Continuation,
}

impl ActionRequest {
    /// A one-shot action.
    pub fn once(owner: EntityId, target: TargetSelector, payload: Payload) -> Self {
        Self {
            owner,
            target,
            payload,
            interval: 1,
            repeats: Repeats::Bounded(1),
            continuation: Continuation::ALWAYS,
        }
    }

    /// Re-arms `interval` ticks after each firing while `repeats` and `continuation` allow.
    pub fn repeating(mut self, repeats: Repeats, interval: u64, continuation: Continuation) -> Self {
        self.repeats = repeats;
        self.interval = interval;
        self.continuation = continuation;
        self
    }

    /// Whether some firing could re-arm forever.
    pub fn is_unterminated(&self) -> bool {
        self.repeats == Repeats::Unbounded
            && self.continuation.chance.is_none_or(Chance::is_certain)
    }
}

/// A scheduled action.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeferredAction {
    id: ActionId,
    owner: EntityId,
    target: TargetSelector,
    fire_at: Tick,
    interval: u64,
    remaining: Repeats,
    continuation: Continuation,
    fired: u32,
    payload: Payload,
    phase: ActionPhase,
}

impl DeferredAction {
    pub(crate) fn new(id: ActionId, fire_at: Tick, request: ActionRequest) -> Self {
        let mut remaining = request.repeats;
        if request.is_unterminated() {
            debug_assert!(false, "{id} would re-arm forever");
            remaining = Repeats::Bounded(1);
        }
        Self {
            id,
            owner: request.owner,
            target: request.target,
            fire_at,
            interval: request.interval.max(1),
            remaining,
            continuation: request.continuation,
            fired: 0,
            payload: request.payload,
            phase: ActionPhase::Scheduled,
        }
    }

    pub fn id(&self) -> ActionId {
        self.id
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn target(&self) -> TargetSelector {
        self.target
    }

    pub fn fire_at(&self) -> Tick {
        self.fire_at
    }

    pub fn remaining(&self) -> Repeats {
        self.remaining
    }

    /// Number of times the payload ran.
    pub fn fired(&self) -> u32 {
        self.fired
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn phase(&self) -> ActionPhase {
        self.phase
    }

    /// Scheduled/Rescheduled → Firing.
    pub fn begin_firing(&mut self) {
        debug_assert!(self.phase.is_pending(), "{} fired in {:?}", self.id, self.phase);
        self.phase = ActionPhase::Firing;
    }

    /// Firing → Completed without running the payload.
    pub fn abort(&mut self, reason: Termination) -> ActionPhase {
        self.phase = ActionPhase::Completed(reason);
        self.phase
    }

    /// Firing → Rescheduled | Completed, after the payload ran at `now`.
    ///
    /// `roll` is consulted only when the next firing is past the guaranteed
    /// count and a continuation chance is set.
    pub fn settle(&mut self, now: Tick, roll: impl FnOnce(Chance) -> bool) -> ActionPhase {
        debug_assert_eq!(self.phase, ActionPhase::Firing);

        self.fired = self.fired.saturating_add(1);
        self.remaining = self.remaining.decrement();

        self.phase = if !self.remaining.has_more() {
            ActionPhase::Completed(Termination::Exhausted)
        } else if self.fired < self.continuation.guaranteed {
            ActionPhase::Rescheduled
        } else {
            match self.continuation.chance {
                None => ActionPhase::Rescheduled,
                Some(chance) if roll(chance) => ActionPhase::Rescheduled,
                Some(_) => ActionPhase::Completed(Termination::RollFailed),
            }
        };

        if self.phase == ActionPhase::Rescheduled {
            self.fire_at = now + self.interval;
        }
        self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn effect_request(repeats: Repeats, continuation: Continuation) -> ActionRequest {
        ActionRequest::once(
            EntityId(1),
            TargetSelector::OwnerTarget,
            Payload::Effect {
                effect: EffectId(1),
                magnitude: 1,
            },
        )
        .repeating(repeats, 3, continuation)
    }

    fn fire(action: &mut DeferredAction, now: u64, roll: bool) -> ActionPhase {
        action.begin_firing();
        action.settle(Tick(now), |_| roll)
    }

    #[test]
    fn one_shot_completes_after_first_firing() {
        let request = ActionRequest::once(
            EntityId(1),
            TargetSelector::Owner,
            Payload::Effect {
                effect: EffectId(1),
                magnitude: 1,
            },
        );
        let mut action = DeferredAction::new(ActionId(0), Tick(5), request);
        assert_eq!(action.phase(), ActionPhase::Scheduled);
        assert_eq!(
            fire(&mut action, 5, true),
            ActionPhase::Completed(Termination::Exhausted)
        );
        assert_eq!(action.fired(), 1);
    }

    #[test]
    fn bounded_chain_reschedules_until_exhausted() {
        let mut action = DeferredAction::new(
            ActionId(0),
            Tick(1),
            effect_request(Repeats::Bounded(3), Continuation::ALWAYS),
        );
        assert_eq!(fire(&mut action, 1, false), ActionPhase::Rescheduled);
        assert_eq!(action.fire_at(), Tick(4));
        assert_eq!(fire(&mut action, 4, false), ActionPhase::Rescheduled);
        assert_eq!(
            fire(&mut action, 7, false),
            ActionPhase::Completed(Termination::Exhausted)
        );
        assert_eq!(action.fired(), 3);
    }

    #[test]
    fn roll_gates_only_past_guaranteed_firings() {
        let continuation = Continuation {
            guaranteed: 2,
            chance: Some(Chance::percent(50.0)),
        };
        let mut action =
            DeferredAction::new(ActionId(0), Tick(1), effect_request(Repeats::Bounded(5), continuation));

        let mut rolled = false;
        action.begin_firing();
        action.settle(Tick(1), |_| {
            rolled = true;
            false
        });
        assert!(!rolled, "first re-arm is guaranteed");

        assert_eq!(
            fire(&mut action, 4, false),
            ActionPhase::Completed(Termination::RollFailed)
        );
        assert_eq!(action.fired(), 2);
    }

    #[test]
    fn abort_skips_settlement() {
        let mut action = DeferredAction::new(
            ActionId(0),
            Tick(1),
            effect_request(Repeats::Bounded(3), Continuation::ALWAYS),
        );
        action.begin_firing();
        assert_eq!(
            action.abort(Termination::TargetLost),
            ActionPhase::Completed(Termination::TargetLost)
        );
        assert_eq!(action.fired(), 0);
    }

    #[test]
    fn unbounded_chain_ends_on_failed_roll() {
        let continuation = Continuation {
            guaranteed: 0,
            chance: Some(Chance::percent(90.0)),
        };
        let mut action =
            DeferredAction::new(ActionId(0), Tick(1), effect_request(Repeats::Unbounded, continuation));
        for now in 0..10 {
            assert_eq!(fire(&mut action, now, true), ActionPhase::Rescheduled);
        }
        assert_eq!(
            fire(&mut action, 10, false),
            ActionPhase::Completed(Termination::RollFailed)
        );
    }

    #[test]
    fn unterminated_request_is_detected() {
        assert!(effect_request(Repeats::Unbounded, Continuation::ALWAYS).is_unterminated());
        assert!(
            !effect_request(
                Repeats::Unbounded,
                Continuation {
                    guaranteed: 0,
                    chance: Some(Chance::percent(10.0))
                }
            )
            .is_unterminated()
        );
    }
}
