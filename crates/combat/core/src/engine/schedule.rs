//! Deferred actions and the per-tick firing pass.
//!
//! Every firing re-resolves the owner and the target from the registry.
//! An action whose owner or target is gone completes without running its
//! payload.

use tracing::{debug, trace, warn};

use super::{CONTINUATION_ROLL, CombatEngine, EngineError};
use crate::effect::{ProcKind, TriggerEvent};
use crate::env::{CombatEnv, RngOracle};
use crate::event::CombatEvent;
use crate::schedule::{
    ActionId, ActionPhase, ActionRequest, DeferredAction, Payload, Termination, WavePayload,
};
use crate::state::{EffectId, EntityId, TargetSelector, Tick};

impl CombatEngine<'_> {
    /// `ScheduleCallback`: registers `request` to fire `delay` ticks from now.
    pub fn schedule(&mut self, delay: u64, request: ActionRequest) -> ActionId {
        let owner = request.owner;
        let now = self.state.clock;
        let action = self.state.scheduler.schedule(now, delay, request);
        let fire_at = self
            .state
            .scheduler
            .get(action)
            .map_or(now + delay.max(1), DeferredAction::fire_at);

        debug!(%action, %owner, %fire_at, "action scheduled");
        self.record(CombatEvent::ActionScheduled {
            action,
            owner,
            fire_at,
        });
        action
    }

    /// Schedules a single effect application.
    pub fn schedule_effect(
        &mut self,
        owner: EntityId,
        target: TargetSelector,
        delay: u64,
        effect: EffectId,
        magnitude: i32,
    ) -> ActionId {
        self.schedule(
            delay,
            ActionRequest::once(owner, target, Payload::Effect { effect, magnitude }),
        )
    }

    /// Moves the clock forward by one tick and returns the new tick.
    ///
    /// Runtimes call this, run the tick's triggers, then [`Self::fire_due`].
    pub fn begin_tick(&mut self) -> Tick {
        self.state.clock = self.state.clock + 1;
        self.state.clock
    }

    /// Fires every action due at the current tick, in `(fire_at, ActionId)`
    /// order. Actions scheduled by this pass wait for a later tick.
    ///
    /// Returns the number of actions fired.
    ///
    /// # Errors
    ///
    /// Fails before firing anything if an oracle is missing. If a payload
    /// fails, its action completes as [`Termination::Faulted`] and the
    /// actions not yet fired go back into the queue for the next pass.
    pub fn fire_due(&mut self, env: &CombatEnv<'_>) -> Result<usize, EngineError> {
        let rng = env.rng()?;
        env.scripts()?;
        env.ledgers()?;
        env.config()?;

        let now = self.state.clock;
        let mut due = self.state.scheduler.take_due(now).into_iter();
        let mut fired = 0;
        while let Some(action) = due.next() {
            let id = action.id();
            if let Err(err) = self.fire(env, rng, action) {
                let unfired: Vec<_> = due.collect();
                warn!(action = %id, requeued = unfired.len(), "firing pass aborted: {err}");
                self.state.scheduler.requeue(unfired);
                return Err(err);
            }
            fired += 1;
        }
        Ok(fired)
    }

    /// `begin_tick` followed by `fire_due`, for callers without triggers of their own.
    pub fn advance_tick(&mut self, env: &CombatEnv<'_>) -> Result<usize, EngineError> {
        self.begin_tick();
        self.fire_due(env)
    }

    fn fire(
        &mut self,
        env: &CombatEnv<'_>,
        rng: &dyn RngOracle,
        mut action: DeferredAction,
    ) -> Result<(), EngineError> {
        let now = self.state.clock;
        action.begin_firing();

        let owner = action.owner();
        let resolved = match self.state.actor(owner) {
            None => Err(Termination::OwnerLost),
            Some(_) => self
                .state
                .resolve_target(owner, action.target())
                .ok_or(Termination::TargetLost),
        };
        let target = match resolved {
            Ok(target) => target,
            Err(reason) => {
                action.abort(reason);
                self.finish(&action, reason);
                return Ok(());
            }
        };

        trace!(action = %action.id(), %owner, %target, "action firing");
        self.record(CombatEvent::ActionFired {
            action: action.id(),
            owner,
            target,
        });
        let ran = match action.payload() {
            Payload::Wave(wave) => self.execute_wave(env, owner, target, wave),
            Payload::Effect { effect, magnitude } => {
                self.apply_effect(owner, *effect, target, *magnitude);
                Ok(())
            }
        };
        if let Err(err) = ran {
            action.abort(Termination::Faulted);
            self.finish(&action, Termination::Faulted);
            return Err(err);
        }

        let state = &mut *self.state;
        let phase = action.settle(now, |chance| {
            rng.chance(state.next_roll_seed(owner, CONTINUATION_ROLL), chance)
        });
        match phase {
            ActionPhase::Rescheduled => {
                let fire_at = action.fire_at();
                debug!(action = %action.id(), %fire_at, "action rescheduled");
                self.record(CombatEvent::ActionRescheduled {
                    action: action.id(),
                    fire_at,
                });
                self.state.scheduler.rearm(action);
            }
            ActionPhase::Completed(reason) => self.finish(&action, reason),
            ActionPhase::Scheduled | ActionPhase::Firing => {
                debug_assert!(false, "settle left {} in {phase:?}", action.id());
            }
        }
        Ok(())
    }

    /// One wave: every strike hits the resolved target, and each landed
    /// strike raises a `StrikeLanded` proc tagged with the sequence.
    fn execute_wave(
        &mut self,
        env: &CombatEnv<'_>,
        owner: EntityId,
        target: EntityId,
        wave: &WavePayload,
    ) -> Result<(), EngineError> {
        let number = self.state.sequences.record_wave(wave.sequence);
        debug!(sequence = %wave.sequence, wave = number, %target, "wave executing");
        self.record(CombatEvent::WaveExecuted {
            sequence: wave.sequence,
            wave: number,
            target,
        });

        for strike in &wave.strikes {
            let magnitude = strike.magnitude.saturating_add(wave.empower);
            if self
                .apply_effect(owner, strike.effect, target, magnitude)
                .is_applied()
            {
                let proc = TriggerEvent::proc(ProcKind::StrikeLanded)
                    .with_target(target)
                    .from_sequence(wave.sequence);
                self.dispatch_trigger(env, owner, &proc, 1)?;
            }
        }
        Ok(())
    }

    fn finish(&mut self, action: &DeferredAction, reason: Termination) {
        debug!(action = %action.id(), %reason, fired = action.fired(), "action completed");
        self.record(CombatEvent::ActionCompleted {
            action: action.id(),
            reason,
        });

        let Some(sequence) = action.payload().sequence() else {
            return;
        };
        if let Some(waves) = self
            .state
            .sequences
            .complete(sequence, reason)
            .map(|state| state.waves_executed)
        {
            debug!(%sequence, waves, %reason, "sequence completed");
            self.record(CombatEvent::SequenceCompleted {
                sequence,
                waves,
                reason,
            });
        }
    }
}
