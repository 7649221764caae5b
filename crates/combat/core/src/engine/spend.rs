//! The consumption protocol, wired to the ledger and the sequencer.

use tracing::debug;

use super::{CombatEngine, DispatchContext, EngineError};
use crate::consume::{FollowUpResult, SpendOutcome, SpendPlan};
use crate::effect::FollowUp;
use crate::env::CombatEnv;
use crate::event::CombatEvent;
use crate::ledger::{ConsumeMode, ResourceKind};
use crate::state::EntityId;

impl CombatEngine<'_> {
    /// `Spend`: converts up to `desired` stacks into one follow-up.
    ///
    /// The follow-up's magnitude is computed from the ledger before anything
    /// is removed, it is applied at most once, and it is not applied at all
    /// when nothing would be spent.
    ///
    /// # Errors
    ///
    /// Only oracle failures while launching a follow-up sequence.
    pub fn spend(
        &mut self,
        env: &CombatEnv<'_>,
        actor: EntityId,
        resource: ResourceKind,
        desired: u32,
        mode: ConsumeMode,
        follow_up: &FollowUp,
    ) -> Result<SpendOutcome, EngineError> {
        let ctx = DispatchContext::root(actor);
        self.spend_in(env, &ctx, resource, desired, mode, follow_up)
    }

    pub(super) fn spend_in(
        &mut self,
        env: &CombatEnv<'_>,
        ctx: &DispatchContext,
        resource: ResourceKind,
        desired: u32,
        mode: ConsumeMode,
        follow_up: &FollowUp,
    ) -> Result<SpendOutcome, EngineError> {
        let actor = ctx.actor;
        let plan = SpendPlan::compute(
            self.state
                .actor(actor)
                .and_then(|state| state.ledgers.get(resource)),
            desired,
            mode,
        );

        if plan.is_empty() {
            debug!(%actor, %resource, desired, %mode, "spend skipped, nothing to consume");
            self.record(CombatEvent::SpendSkipped { actor, resource });
            return Ok(SpendOutcome::Skipped);
        }

        // Everything that could make the follow-up impossible is checked
        // before the ledger is touched.
        let follow_up = match follow_up {
            FollowUp::Effect { effect, target } => {
                let selector = target.bind(ctx.event_target);
                let Some(target) = self.state.resolve_target(actor, selector) else {
                    debug!(%actor, %effect, "spend follow-up has no target");
                    self.record(CombatEvent::TargetUnresolved {
                        actor,
                        effect: *effect,
                    });
                    return Ok(SpendOutcome::TargetLost);
                };
                FollowUpResult::Effect(self.apply_effect(actor, *effect, target, plan.magnitude))
            }
            FollowUp::Waves(spec) => {
                if self.is_reentrant(spec, ctx.origin) {
                    self.record_suppressed(spec.ability, ctx.origin);
                    return Ok(SpendOutcome::Suppressed);
                }
                match self.launch_sequence(env, ctx, spec, plan.magnitude)? {
                    Some(sequence) => FollowUpResult::Sequence(sequence),
                    None => return Ok(SpendOutcome::TargetLost),
                }
            }
        };

        self.record(CombatEvent::Spent {
            actor,
            resource,
            spent: plan.spent,
            magnitude: plan.magnitude,
        });
        let consumed = self.consume(actor, resource, plan.spent, ConsumeMode::Exact);
        debug_assert_eq!(consumed.removed, plan.spent);

        Ok(SpendOutcome::Spent {
            spent: plan.spent,
            magnitude: plan.magnitude,
            follow_up,
        })
    }
}
