//! Trigger entry point and the effect descriptor dispatcher.

use tracing::{debug, trace, warn};

use super::{CombatEngine, EngineError, PROC_ROLL};
use crate::config::CombatConfig;
use crate::effect::{EffectDescriptor, TriggerEvent};
use crate::env::CombatEnv;
use crate::event::CombatEvent;
use crate::sequence::SequenceId;
use crate::state::EntityId;

/// Who a descriptor runs for and what triggered it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchContext {
    pub actor: EntityId,
    pub event_target: Option<EntityId>,
    /// Sequence whose strike raised the trigger.
    pub origin: Option<SequenceId>,
    pub depth: usize,
}

impl DispatchContext {
    pub fn root(actor: EntityId) -> Self {
        Self {
            actor,
            event_target: None,
            origin: None,
            depth: 0,
        }
    }

    fn for_event(actor: EntityId, event: &TriggerEvent, depth: usize) -> Self {
        Self {
            actor,
            event_target: event.target,
            origin: event.origin,
            depth,
        }
    }
}

impl CombatEngine<'_> {
    /// `OnTrigger`: runs every script registered for the event's trigger.
    ///
    /// A missing or dead actor is a no-op.
    ///
    /// # Errors
    ///
    /// Fails if an oracle is missing or a script's resource has no rules.
    pub fn on_trigger(
        &mut self,
        env: &CombatEnv<'_>,
        actor: EntityId,
        event: &TriggerEvent,
    ) -> Result<(), EngineError> {
        self.dispatch_trigger(env, actor, event, 0)
    }

    pub(super) fn dispatch_trigger(
        &mut self,
        env: &CombatEnv<'_>,
        actor: EntityId,
        event: &TriggerEvent,
        depth: usize,
    ) -> Result<(), EngineError> {
        if depth > CombatConfig::MAX_TRIGGER_DEPTH {
            warn!(%actor, trigger = %event.kind, depth, "trigger chain too deep, dropped");
            self.record(CombatEvent::TriggerDropped {
                actor,
                trigger: event.kind,
                depth,
            });
            return Ok(());
        }
        if self.state.actor(actor).is_none() {
            trace!(%actor, trigger = %event.kind, "trigger for missing actor ignored");
            return Ok(());
        }

        let scripts = env.scripts()?.scripts(&event.kind);
        if scripts.is_empty() {
            return Ok(());
        }

        trace!(%actor, trigger = %event.kind, scripts = scripts.len(), "dispatching trigger");
        let ctx = DispatchContext::for_event(actor, event, depth);
        for descriptor in scripts {
            self.dispatch(env, descriptor, &ctx)?;
        }
        Ok(())
    }

    /// Executes one descriptor. The single place descriptors are interpreted.
    pub fn dispatch(
        &mut self,
        env: &CombatEnv<'_>,
        descriptor: &EffectDescriptor,
        ctx: &DispatchContext,
    ) -> Result<(), EngineError> {
        match descriptor {
            EffectDescriptor::GrantStacks(grant) => {
                self.grant(env, ctx.actor, grant.resource, grant.amount)?;
            }
            EffectDescriptor::ConsumeStacks(consume) => {
                self.spend_in(
                    env,
                    ctx,
                    consume.resource,
                    consume.desired,
                    consume.mode,
                    &consume.follow_up,
                )?;
            }
            EffectDescriptor::ScheduleWaves(spec) => {
                self.launch_sequence(env, ctx, spec, 0)?;
            }
            EffectDescriptor::ConditionalProc(proc) => {
                let Some(actor) = self.state.actor(ctx.actor) else {
                    return Ok(());
                };
                if proc.requires.is_some_and(|modifier| !actor.holds(modifier)) {
                    trace!(actor = %ctx.actor, "proc requirement not met");
                    return Ok(());
                }

                let seed = self.state.next_roll_seed(ctx.actor, PROC_ROLL);
                let success = env.rng()?.chance(seed, proc.chance);
                debug!(actor = %ctx.actor, chance = %proc.chance, success, "proc rolled");
                self.record(CombatEvent::ProcRolled {
                    actor: ctx.actor,
                    chance: proc.chance,
                    success,
                });
                if success {
                    self.dispatch(env, &proc.then, ctx)?;
                }
            }
            EffectDescriptor::ApplyEffect(apply) => {
                let selector = apply.target.bind(ctx.event_target);
                match self.state.resolve_target(ctx.actor, selector) {
                    Some(target) => {
                        self.apply_effect(ctx.actor, apply.effect, target, apply.magnitude);
                    }
                    None => self.record(CombatEvent::TargetUnresolved {
                        actor: ctx.actor,
                        effect: apply.effect,
                    }),
                }
            }
            EffectDescriptor::Delayed(delayed) => {
                self.schedule_effect(
                    ctx.actor,
                    delayed.target.bind(ctx.event_target),
                    delayed.delay,
                    delayed.effect,
                    delayed.magnitude,
                );
            }
        }
        Ok(())
    }
}
