//! Multi-strike sequence launches.

use tracing::debug;

use super::{CombatEngine, DispatchContext, EngineError};
use crate::env::CombatEnv;
use crate::event::CombatEvent;
use crate::schedule::{ActionRequest, Continuation, Payload, Repeats, WavePayload};
use crate::sequence::{SequenceId, SequenceSpec};
use crate::state::{AbilityId, EntityId};

impl CombatEngine<'_> {
    /// Launches a sequence outside any trigger (no event target, no origin).
    ///
    /// Returns `None` when the owner or the target cannot be resolved now.
    ///
    /// # Errors
    ///
    /// Fails if the configuration oracle is missing.
    pub fn start_sequence(
        &mut self,
        env: &CombatEnv<'_>,
        owner: EntityId,
        spec: &SequenceSpec,
    ) -> Result<Option<SequenceId>, EngineError> {
        self.launch_sequence(env, &DispatchContext::root(owner), spec, 0)
    }

    /// Plans the waves and schedules the re-arming action driving them.
    ///
    /// `empower` is added to every strike's magnitude.
    pub(super) fn launch_sequence(
        &mut self,
        env: &CombatEnv<'_>,
        ctx: &DispatchContext,
        spec: &SequenceSpec,
        empower: i32,
    ) -> Result<Option<SequenceId>, EngineError> {
        let owner = ctx.actor;
        if self.is_reentrant(spec, ctx.origin) {
            self.record_suppressed(spec.ability, ctx.origin);
            return Ok(None);
        }

        let config = env.config()?;
        let Some(modifiers) = self.state.actor(owner).map(|actor| actor.modifiers) else {
            return Ok(None);
        };
        let target = spec.target.bind(ctx.event_target);
        if self.state.resolve_target(owner, target).is_none() {
            debug!(%owner, ability = %spec.ability, "sequence has no target at launch");
            return Ok(None);
        }

        let plan = spec.plan(modifiers, config);
        let now = self.state.clock;
        let sequence = self
            .state
            .sequences
            .open(spec.ability, owner, ctx.origin, now, plan);

        let request = ActionRequest::once(
            owner,
            target,
            Payload::Wave(WavePayload {
                sequence,
                strikes: spec.strikes.clone(),
                empower,
            }),
        )
        .repeating(
            Repeats::Bounded(plan.max),
            plan.delay,
            Continuation {
                guaranteed: plan.guaranteed,
                chance: plan.continuation,
            },
        );
        let action = self.schedule(plan.delay, request);
        self.state.sequences.attach(sequence, action);

        debug!(
            %owner,
            %sequence,
            ability = %spec.ability,
            guaranteed = plan.guaranteed,
            max = plan.max,
            "sequence started"
        );
        self.record(CombatEvent::SequenceStarted {
            sequence,
            ability: spec.ability,
            owner,
            guaranteed: plan.guaranteed,
            max: plan.max,
        });
        Ok(Some(sequence))
    }

    /// True when launching `spec` from `origin` would re-trigger a sequence
    /// of the same ability from within its own strikes.
    pub(super) fn is_reentrant(&self, spec: &SequenceSpec, origin: Option<SequenceId>) -> bool {
        origin.is_some_and(|origin| self.state.sequences.descends_from(origin, spec.ability))
    }

    pub(super) fn record_suppressed(&mut self, ability: AbilityId, origin: Option<SequenceId>) {
        if let Some(origin) = origin {
            debug!(%ability, %origin, "sequence suppressed inside its own chain");
            self.record(CombatEvent::SequenceSuppressed { ability, origin });
        }
    }
}
