use super::*;
use crate::consume::{FollowUpResult, SpendOutcome};
use crate::effect::{EffectDescriptor, FollowUp, ProcKind, TriggerEvent, TriggerKind};
use crate::env::{
    AppliedEffect, Chance, CombatEnv, EffectCatalog, FixedRng, LedgerTable, OracleError,
    RecordingSink,
};
use crate::ledger::{ConsumeMode, DerivedRule, DerivedTransition, LedgerRules, OverflowPolicy};
use crate::schedule::Termination;
use crate::script::ScriptRegistry;
use crate::sequence::{SequenceSpec, SequenceStatus, Strike};
use crate::state::{AbilityId, AuraId, ModifierKind, TargetSelector};
use crate::CombatConfig;

const OVERLAY: AuraId = AuraId(1);
const EMPOWER: AuraId = AuraId(2);

const MAIN_HAND: EffectId = EffectId(100);
const OFF_HAND: EffectId = EffectId(101);
const FINISHER: EffectId = EffectId(102);
const BOLT: EffectId = EffectId(103);

const STORMSTRIKE: AbilityId = AbilityId(1);
const WINDFURY: AbilityId = AbilityId(2);

struct Fixture {
    catalog: EffectCatalog,
    ledgers: LedgerTable,
    scripts: ScriptRegistry,
    rng: FixedRng,
    config: CombatConfig,
}

impl Fixture {
    fn new(rng: FixedRng) -> Self {
        Self {
            catalog: EffectCatalog::new()
                .with_effects([MAIN_HAND, OFF_HAND, FINISHER, BOLT])
                .with_auras([OVERLAY, EMPOWER]),
            ledgers: LedgerTable::new()
                .with(
                    LedgerRules::new(ResourceKind::Maelstrom, 20, 3)
                        .with_overflow_cap(10)
                        .with_derived(DerivedRule::new(OVERLAY, 5, 5))
                        .with_derived(DerivedRule::new(EMPOWER, 1, 10)),
                )
                .with(LedgerRules::new(ResourceKind::ComboPoints, 5, 2)),
            scripts: ScriptRegistry::new(),
            rng,
            config: CombatConfig::default(),
        }
    }

    fn script(mut self, trigger: TriggerKind, descriptor: EffectDescriptor) -> Self {
        self.scripts
            .register(trigger, descriptor, &self.catalog, &self.ledgers)
            .unwrap();
        self
    }

    fn env(&self) -> CombatEnv<'_> {
        CombatEnv::with_all(&self.ledgers, &self.scripts, &self.rng, &self.config)
    }
}

/// Owner targeting an enemy.
fn duel() -> (CombatState, EntityId, EntityId) {
    let mut state = CombatState::new(42);
    let owner = state.spawn_actor().unwrap();
    let enemy = state.spawn_actor().unwrap();
    state.set_target(owner, Some(enemy));
    (state, owner, enemy)
}

fn derived_active(state: &CombatState, actor: EntityId, aura: AuraId) -> bool {
    state
        .actor(actor)
        .and_then(|actor| actor.ledgers.get(ResourceKind::Maelstrom))
        .and_then(|ledger| ledger.derived().find(|d| d.aura() == aura).copied())
        .is_some_and(|derived| derived.is_active())
}

fn strike_spec(ability: AbilityId) -> SequenceSpec {
    SequenceSpec::new(ability, TargetSelector::OwnerTarget)
        .with_strike(Strike::new(MAIN_HAND, 10))
        .with_strike(Strike::new(OFF_HAND, 5))
        .with_wave_delay(1)
}

#[test]
fn derived_state_activates_at_threshold() {
    let fx = Fixture::new(FixedRng::ALWAYS_SUCCEED);
    let env = fx.env();
    let (mut state, owner, _) = duel();
    let mut sink = RecordingSink::new();

    let mut active = Vec::new();
    let mut engine = CombatEngine::new(&mut state, &mut sink);
    for _ in 0..6 {
        engine.grant(&env, owner, ResourceKind::Maelstrom, 1).unwrap();
        active.push(derived_active(engine.state(), owner, OVERLAY));
    }

    assert_eq!(active, vec![false, false, false, false, true, true]);
    let activations = engine
        .events()
        .iter()
        .filter(|event| {
            matches!(
                event,
                CombatEvent::DerivedChanged {
                    transition: DerivedTransition::Activated { aura: OVERLAY, .. },
                    ..
                }
            )
        })
        .count();
    assert_eq!(activations, 1);
}

#[test]
fn consume_up_to_drains_and_destroys_ledger() {
    let fx = Fixture::new(FixedRng::ALWAYS_SUCCEED);
    let env = fx.env();
    let (mut state, owner, _) = duel();
    let mut sink = RecordingSink::new();
    let mut engine = CombatEngine::new(&mut state, &mut sink);

    engine.grant(&env, owner, ResourceKind::Maelstrom, 8).unwrap();
    assert!(derived_active(engine.state(), owner, OVERLAY));

    let outcome = engine.consume(owner, ResourceKind::Maelstrom, 10, ConsumeMode::UpTo);
    assert_eq!(outcome.removed, 8);
    assert_eq!(engine.stack_count(owner, ResourceKind::Maelstrom), 0);
    assert!(!derived_active(engine.state(), owner, OVERLAY));
    assert!(
        engine
            .state()
            .actor(owner)
            .is_some_and(|actor| actor.ledgers.get(ResourceKind::Maelstrom).is_none())
    );
    assert!(engine.events().iter().any(|event| matches!(
        event,
        CombatEvent::DerivedChanged {
            transition: DerivedTransition::Deactivated { aura: OVERLAY },
            ..
        }
    )));
}

#[test]
fn consume_from_empty_ledger_is_silent() {
    let (mut state, owner, _) = duel();
    let mut sink = RecordingSink::new();
    let mut engine = CombatEngine::new(&mut state, &mut sink);

    let outcome = engine.consume(owner, ResourceKind::Maelstrom, 3, ConsumeMode::Exact);
    assert_eq!(outcome.removed, 0);
    assert!(engine.events().is_empty());
}

#[test]
fn spend_scales_follow_up_by_available_stacks() {
    let fx = Fixture::new(FixedRng::ALWAYS_SUCCEED);
    let env = fx.env();
    let (mut state, owner, enemy) = duel();
    let mut sink = RecordingSink::new();

    let mut engine = CombatEngine::new(&mut state, &mut sink);
    engine.grant(&env, owner, ResourceKind::ComboPoints, 3).unwrap();
    let outcome = engine
        .spend(
            &env,
            owner,
            ResourceKind::ComboPoints,
            10,
            ConsumeMode::UpTo,
            &FollowUp::Effect {
                effect: FINISHER,
                target: TargetSelector::OwnerTarget,
            },
        )
        .unwrap();
    assert_eq!(engine.stack_count(owner, ResourceKind::ComboPoints), 0);
    drop(engine);

    assert!(matches!(
        outcome,
        SpendOutcome::Spent {
            spent: 3,
            magnitude: 6,
            follow_up: FollowUpResult::Effect(EffectResult::Applied),
        }
    ));
    assert_eq!(
        sink.applied(),
        &[AppliedEffect {
            source: owner,
            effect: FINISHER,
            target: enemy,
            magnitude: 6,
        }]
    );
}

#[test]
fn spend_with_nothing_to_spend_never_applies_follow_up() {
    let fx = Fixture::new(FixedRng::ALWAYS_SUCCEED);
    let env = fx.env();
    let (mut state, owner, _) = duel();
    let mut sink = RecordingSink::new();
    let follow_up = FollowUp::Effect {
        effect: FINISHER,
        target: TargetSelector::OwnerTarget,
    };

    let mut engine = CombatEngine::new(&mut state, &mut sink);
    let empty = engine
        .spend(&env, owner, ResourceKind::ComboPoints, 5, ConsumeMode::UpTo, &follow_up)
        .unwrap();
    engine.grant(&env, owner, ResourceKind::ComboPoints, 2).unwrap();
    let short = engine
        .spend(&env, owner, ResourceKind::ComboPoints, 5, ConsumeMode::Exact, &follow_up)
        .unwrap();
    assert_eq!(engine.stack_count(owner, ResourceKind::ComboPoints), 2);
    drop(engine);

    assert_eq!(empty, SpendOutcome::Skipped);
    assert_eq!(short, SpendOutcome::Skipped);
    assert!(sink.applied().is_empty());
}

#[test]
fn spend_without_target_keeps_stacks() {
    let fx = Fixture::new(FixedRng::ALWAYS_SUCCEED);
    let env = fx.env();
    let (mut state, owner, _) = duel();
    state.set_target(owner, None);
    let mut sink = RecordingSink::new();

    let mut engine = CombatEngine::new(&mut state, &mut sink);
    engine.grant(&env, owner, ResourceKind::ComboPoints, 4).unwrap();
    let outcome = engine
        .spend(
            &env,
            owner,
            ResourceKind::ComboPoints,
            4,
            ConsumeMode::Exact,
            &FollowUp::Effect {
                effect: FINISHER,
                target: TargetSelector::OwnerTarget,
            },
        )
        .unwrap();
    assert_eq!(outcome, SpendOutcome::TargetLost);
    assert_eq!(engine.stack_count(owner, ResourceKind::ComboPoints), 4);
}

#[test]
fn spend_into_waves_empowers_every_strike() {
    let fx = Fixture::new(FixedRng::ALWAYS_SUCCEED);
    let env = fx.env();
    let (mut state, owner, _) = duel();
    let mut sink = RecordingSink::new();
    let spec = strike_spec(STORMSTRIKE).with_base_waves(1).with_max_waves(1);

    let mut engine = CombatEngine::new(&mut state, &mut sink);
    engine.grant(&env, owner, ResourceKind::ComboPoints, 3).unwrap();
    let outcome = engine
        .spend(
            &env,
            owner,
            ResourceKind::ComboPoints,
            5,
            ConsumeMode::UpTo,
            &FollowUp::Waves(spec),
        )
        .unwrap();
    assert_eq!(outcome.spent(), 3);
    assert_eq!(engine.stack_count(owner, ResourceKind::ComboPoints), 0);
    engine.advance_tick(&env).unwrap();
    drop(engine);

    let magnitudes: Vec<_> = sink.applied().iter().map(|a| a.magnitude).collect();
    assert_eq!(magnitudes, vec![16, 11]);
}

#[test]
fn sequence_runs_every_wave_when_rolls_succeed() {
    let fx = Fixture::new(FixedRng::ALWAYS_SUCCEED);
    let env = fx.env();
    let (mut state, owner, _) = duel();
    let mut sink = RecordingSink::new();
    let spec = strike_spec(STORMSTRIKE)
        .with_base_waves(1)
        .with_continuation(Chance::percent(50.0), 4);

    let mut engine = CombatEngine::new(&mut state, &mut sink);
    let sequence = engine.start_sequence(&env, owner, &spec).unwrap().unwrap();
    for _ in 0..10 {
        engine.advance_tick(&env).unwrap();
    }
    let done = engine.state().sequences.get(sequence).cloned().unwrap();
    drop(engine);

    assert_eq!(done.waves_executed, 4);
    assert_eq!(
        done.status,
        SequenceStatus::Completed {
            reason: Termination::Exhausted
        }
    );
    assert_eq!(sink.applied().len(), 8);
}

#[test]
fn failed_roll_stops_after_guaranteed_waves() {
    let fx = Fixture::new(FixedRng::ALWAYS_FAIL);
    let env = fx.env();
    let (mut state, owner, _) = duel();
    let mut sink = RecordingSink::new();
    let spec = strike_spec(STORMSTRIKE)
        .with_base_waves(2)
        .with_continuation(Chance::percent(50.0), 5);

    let mut engine = CombatEngine::new(&mut state, &mut sink);
    let sequence = engine.start_sequence(&env, owner, &spec).unwrap().unwrap();
    for _ in 0..10 {
        engine.advance_tick(&env).unwrap();
    }
    let done = engine.state().sequences.get(sequence).cloned().unwrap();

    assert_eq!(done.waves_executed, 2);
    assert_eq!(
        done.status,
        SequenceStatus::Completed {
            reason: Termination::RollFailed
        }
    );
}

#[test]
fn bonus_waves_follow_modifiers() {
    let fx = Fixture::new(FixedRng::ALWAYS_FAIL);
    let env = fx.env();
    let (mut state, owner, _) = duel();
    let mut sink = RecordingSink::new();
    let spec = strike_spec(STORMSTRIKE)
        .with_base_waves(2)
        .with_bonus(ModifierKind::Flurry, 1);

    let mut engine = CombatEngine::new(&mut state, &mut sink);
    engine.on_modifier_gained(owner, ModifierKind::Flurry);
    let sequence = engine.start_sequence(&env, owner, &spec).unwrap().unwrap();
    for _ in 0..10 {
        engine.advance_tick(&env).unwrap();
    }
    assert_eq!(
        engine.state().sequences.get(sequence).map(|s| s.waves_executed),
        Some(3)
    );
}

#[test]
fn sequence_ends_cleanly_when_target_is_destroyed() {
    let fx = Fixture::new(FixedRng::ALWAYS_SUCCEED);
    let env = fx.env();
    let (mut state, owner, enemy) = duel();
    let mut sink = RecordingSink::new();
    let spec = strike_spec(STORMSTRIKE).with_base_waves(3);

    let sequence = {
        let mut engine = CombatEngine::new(&mut state, &mut sink);
        let sequence = engine.start_sequence(&env, owner, &spec).unwrap().unwrap();
        assert_eq!(engine.advance_tick(&env).unwrap(), 1);
        sequence
    };
    state.despawn_actor(enemy);

    let mut engine = CombatEngine::new(&mut state, &mut sink);
    for _ in 0..5 {
        engine.advance_tick(&env).unwrap();
    }
    let done = engine.state().sequences.get(sequence).cloned().unwrap();
    assert!(engine.state().scheduler.is_empty());
    drop(engine);

    assert_eq!(done.waves_executed, 1);
    assert_eq!(
        done.status,
        SequenceStatus::Completed {
            reason: Termination::TargetLost
        }
    );
    assert_eq!(sink.applied().len(), 2);
}

#[test]
fn owner_loss_completes_pending_actions() {
    let fx = Fixture::new(FixedRng::ALWAYS_SUCCEED);
    let env = fx.env();
    let (mut state, owner, _) = duel();
    let mut sink = RecordingSink::new();

    let action = CombatEngine::new(&mut state, &mut sink).schedule_effect(
        owner,
        TargetSelector::OwnerTarget,
        2,
        BOLT,
        4,
    );
    state.despawn_actor(owner);

    let mut engine = CombatEngine::new(&mut state, &mut sink);
    engine.advance_tick(&env).unwrap();
    engine.advance_tick(&env).unwrap();
    assert!(engine.events().contains(&CombatEvent::ActionCompleted {
        action,
        reason: Termination::OwnerLost,
    }));
    drop(engine);
    assert!(sink.applied().is_empty());
}

#[test]
fn failing_payload_completes_its_action_and_requeues_the_rest() {
    let fx = Fixture::new(FixedRng::ALWAYS_SUCCEED).script(
        TriggerKind::Proc(ProcKind::StrikeLanded),
        EffectDescriptor::grant(ResourceKind::Maelstrom, 1),
    );
    let (mut state, owner, _) = duel();
    let mut sink = RecordingSink::new();
    let spec = strike_spec(STORMSTRIKE).with_base_waves(3);

    let mut engine = CombatEngine::new(&mut state, &mut sink);
    let sequence = engine
        .start_sequence(&fx.env(), owner, &spec)
        .unwrap()
        .unwrap();
    let bolt = engine.schedule_effect(owner, TargetSelector::OwnerTarget, 1, BOLT, 4);

    // Rules missing at fire time: the strike's grant fails mid-wave.
    let bare = LedgerTable::new();
    let broken = CombatEnv::with_all(&bare, &fx.scripts, &fx.rng, &fx.config);
    assert!(matches!(
        engine.advance_tick(&broken),
        Err(EngineError::MissingLedgerRules { .. })
    ));

    assert_eq!(
        engine.state().sequences.get(sequence).map(|s| s.status),
        Some(SequenceStatus::Completed {
            reason: Termination::Faulted
        })
    );
    assert!(engine.events().iter().any(|event| matches!(
        event,
        CombatEvent::ActionCompleted {
            reason: Termination::Faulted,
            ..
        }
    )));
    let pending: Vec<_> = engine.state().scheduler.pending().map(|a| a.id()).collect();
    assert_eq!(pending, vec![bolt]);

    assert_eq!(engine.advance_tick(&fx.env()).unwrap(), 1);
    assert!(engine.state().scheduler.is_empty());
    drop(engine);
    assert_eq!(sink.applied().last().map(|applied| applied.effect), Some(BOLT));
}

#[test]
fn delayed_effect_resolves_event_target_at_fire_time() {
    let fx = Fixture::new(FixedRng::ALWAYS_SUCCEED).script(
        TriggerKind::Cast(WINDFURY),
        EffectDescriptor::delayed(2, BOLT, TargetSelector::EventTarget, 5),
    );
    let env = fx.env();
    let (mut state, owner, _) = duel();
    let bystander = state.spawn_actor().unwrap();
    let mut sink = RecordingSink::new();

    let mut engine = CombatEngine::new(&mut state, &mut sink);
    engine
        .on_trigger(&env, owner, &TriggerEvent::cast(WINDFURY).with_target(bystander))
        .unwrap();
    assert_eq!(engine.advance_tick(&env).unwrap(), 0);
    assert_eq!(engine.advance_tick(&env).unwrap(), 1);
    drop(engine);

    assert_eq!(sink.applied().len(), 1);
    assert_eq!(sink.applied()[0].target, bystander);
}

#[test]
fn overflow_routes_excess_under_expanded_capacity() {
    let fx = Fixture::new(FixedRng::ALWAYS_SUCCEED);
    let env = fx.env();
    let (mut state, owner, _) = duel();
    let mut sink = RecordingSink::new();

    let mut engine = CombatEngine::new(&mut state, &mut sink);
    assert!(engine.on_modifier_gained(owner, ModifierKind::ExpandedCapacity));
    engine.grant(&env, owner, ResourceKind::Maelstrom, 20).unwrap();
    let outcome = engine.grant(&env, owner, ResourceKind::Maelstrom, 4).unwrap();

    assert_eq!(outcome.overflowed, 4);
    let ledger = engine
        .state()
        .actor(owner)
        .and_then(|actor| actor.ledgers.get(ResourceKind::Maelstrom))
        .cloned()
        .unwrap();
    assert_eq!(ledger.count(), 20);
    assert_eq!(ledger.overflow_count(), 4);

    assert!(engine.on_modifier_removed(owner, ModifierKind::ExpandedCapacity));
    assert!(engine.events().contains(&CombatEvent::OverflowCollapsed {
        actor: owner,
        resource: ResourceKind::Maelstrom,
        retained: 0,
        discarded: 4,
    }));
    assert_eq!(engine.stack_count(owner, ResourceKind::Maelstrom), 20);
}

#[test]
fn spend_counts_overflow_and_drains_ledger() {
    let fx = Fixture::new(FixedRng::ALWAYS_SUCCEED);
    let env = fx.env();
    let finisher = FollowUp::Effect {
        effect: FINISHER,
        target: TargetSelector::OwnerTarget,
    };

    for (desired, mode) in [(30, ConsumeMode::UpTo), (24, ConsumeMode::Exact)] {
        let (mut state, owner, _) = duel();
        let mut sink = RecordingSink::new();
        let mut engine = CombatEngine::new(&mut state, &mut sink);
        engine.on_modifier_gained(owner, ModifierKind::ExpandedCapacity);
        engine.grant(&env, owner, ResourceKind::Maelstrom, 24).unwrap();

        let outcome = engine
            .spend(&env, owner, ResourceKind::Maelstrom, desired, mode, &finisher)
            .unwrap();
        assert!(
            matches!(outcome, SpendOutcome::Spent { spent: 24, magnitude: 72, .. }),
            "{mode}: {outcome:?}"
        );
        assert_eq!(engine.stack_count(owner, ResourceKind::Maelstrom), 0);
        assert!(
            engine
                .state()
                .actor(owner)
                .is_some_and(|actor| actor.ledgers.get(ResourceKind::Maelstrom).is_none())
        );
        assert!(engine.events().contains(&CombatEvent::StacksConsumed {
            actor: owner,
            resource: ResourceKind::Maelstrom,
            removed: 24,
            from_overflow: 4,
            count: 0,
            overflow: 0,
        }));
    }
}

#[test]
fn modifier_removal_after_spending_follows_policy() {
    for (policy, retained, discarded, left) in [
        (OverflowPolicy::Collapse, 4, 2, 20),
        (OverflowPolicy::Discard, 0, 6, 16),
    ] {
        let mut fx = Fixture::new(FixedRng::ALWAYS_SUCCEED);
        fx.config = CombatConfig::default().with_overflow_policy(policy);
        let env = fx.env();
        let (mut state, owner, _) = duel();
        let mut sink = RecordingSink::new();
        let mut engine = CombatEngine::new(&mut state, &mut sink);

        engine.on_modifier_gained(owner, ModifierKind::ExpandedCapacity);
        engine.grant(&env, owner, ResourceKind::Maelstrom, 26).unwrap();
        engine.consume(owner, ResourceKind::Maelstrom, 4, ConsumeMode::Exact);
        assert_eq!(engine.stack_count(owner, ResourceKind::Maelstrom), 16);

        assert!(engine.on_modifier_removed(owner, ModifierKind::ExpandedCapacity));
        assert!(
            engine.events().contains(&CombatEvent::OverflowCollapsed {
                actor: owner,
                resource: ResourceKind::Maelstrom,
                retained,
                discarded,
            }),
            "{policy}"
        );
        assert_eq!(engine.stack_count(owner, ResourceKind::Maelstrom), left);
    }
}

#[test]
fn aura_removal_clears_ledger_and_derived_states() {
    let fx = Fixture::new(FixedRng::ALWAYS_SUCCEED);
    let env = fx.env();
    let (mut state, owner, _) = duel();
    let mut sink = RecordingSink::new();

    let mut engine = CombatEngine::new(&mut state, &mut sink);
    engine.grant(&env, owner, ResourceKind::Maelstrom, 7).unwrap();
    assert!(engine.on_aura_removed(owner, ResourceKind::Maelstrom));
    assert!(!engine.on_aura_removed(owner, ResourceKind::Maelstrom));

    assert_eq!(engine.stack_count(owner, ResourceKind::Maelstrom), 0);
    let deactivated = engine
        .events()
        .iter()
        .filter(|event| {
            matches!(
                event,
                CombatEvent::DerivedChanged {
                    transition: DerivedTransition::Deactivated { .. },
                    ..
                }
            )
        })
        .count();
    assert_eq!(deactivated, 2);
    assert!(engine.synchronize(owner, ResourceKind::Maelstrom).is_empty());
}

#[test]
fn despawn_deactivates_derived_states_before_dropping_ledgers() {
    let fx = Fixture::new(FixedRng::ALWAYS_SUCCEED);
    let env = fx.env();
    let (mut state, owner, _) = duel();
    let mut sink = RecordingSink::new();

    let mut engine = CombatEngine::new(&mut state, &mut sink);
    engine.grant(&env, owner, ResourceKind::Maelstrom, 7).unwrap();
    engine.grant(&env, owner, ResourceKind::ComboPoints, 2).unwrap();
    let before = engine.events().len();
    assert!(engine.despawn(owner));

    let tail = &engine.events()[before..];
    let deactivated = tail
        .iter()
        .filter(|event| {
            matches!(
                event,
                CombatEvent::DerivedChanged {
                    transition: DerivedTransition::Deactivated { .. },
                    ..
                }
            )
        })
        .count();
    assert_eq!(deactivated, 2);
    let cleared = tail
        .iter()
        .filter(|event| matches!(event, CombatEvent::LedgerCleared { actor, .. } if *actor == owner))
        .count();
    assert_eq!(cleared, 2);
    assert_eq!(tail.last(), Some(&CombatEvent::ActorDespawned { actor: owner }));
    assert!(!engine.despawn(owner));
}

#[test]
fn strike_cannot_relaunch_its_own_sequence() {
    let spec = strike_spec(STORMSTRIKE).with_base_waves(1).with_max_waves(1);
    let fx = Fixture::new(FixedRng::ALWAYS_SUCCEED)
        .script(
            TriggerKind::Cast(STORMSTRIKE),
            EffectDescriptor::ScheduleWaves(spec.clone()),
        )
        .script(
            TriggerKind::Proc(ProcKind::StrikeLanded),
            EffectDescriptor::ScheduleWaves(spec),
        );
    let env = fx.env();
    let (mut state, owner, _) = duel();
    let mut sink = RecordingSink::new();

    let mut engine = CombatEngine::new(&mut state, &mut sink);
    engine
        .on_trigger(&env, owner, &TriggerEvent::cast(STORMSTRIKE))
        .unwrap();
    for _ in 0..5 {
        engine.advance_tick(&env).unwrap();
    }

    assert_eq!(engine.state().sequences.len(), 1);
    let suppressed = engine
        .events()
        .iter()
        .filter(|event| matches!(event, CombatEvent::SequenceSuppressed { .. }))
        .count();
    // One per landed strike of the single wave.
    assert_eq!(suppressed, 2);
}

#[test]
fn strike_may_launch_another_ability_once() {
    let stormstrike = strike_spec(STORMSTRIKE).with_base_waves(1).with_max_waves(1);
    let windfury = SequenceSpec::new(WINDFURY, TargetSelector::EventTarget)
        .with_strike(Strike::new(BOLT, 1))
        .with_base_waves(1)
        .with_max_waves(1)
        .with_wave_delay(1);
    let fx = Fixture::new(FixedRng::ALWAYS_SUCCEED)
        .script(
            TriggerKind::Cast(STORMSTRIKE),
            EffectDescriptor::ScheduleWaves(stormstrike),
        )
        .script(
            TriggerKind::Proc(ProcKind::StrikeLanded),
            EffectDescriptor::ScheduleWaves(windfury),
        );
    let env = fx.env();
    let (mut state, owner, _) = duel();
    let mut sink = RecordingSink::new();

    let mut engine = CombatEngine::new(&mut state, &mut sink);
    engine
        .on_trigger(&env, owner, &TriggerEvent::cast(STORMSTRIKE))
        .unwrap();
    for _ in 0..6 {
        engine.advance_tick(&env).unwrap();
    }

    // Stormstrike's two strikes each launch one windfury; windfury's own
    // strikes are suppressed.
    let windfury_runs = engine
        .state()
        .sequences
        .iter()
        .filter(|sequence| sequence.ability == WINDFURY)
        .count();
    assert_eq!(windfury_runs, 2);
    drop(engine);
    assert_eq!(sink.applied().len(), 4);
}

#[test]
fn conditional_proc_requires_modifier() {
    let fx = Fixture::new(FixedRng::ALWAYS_SUCCEED).script(
        TriggerKind::Proc(ProcKind::MeleeHit),
        EffectDescriptor::proc(
            Chance::percent(50.0),
            Some(ModifierKind::Relentless),
            EffectDescriptor::apply(BOLT, TargetSelector::OwnerTarget, 7),
        ),
    );
    let env = fx.env();
    let (mut state, owner, enemy) = duel();
    let mut sink = RecordingSink::new();
    let hit = TriggerEvent::proc(ProcKind::MeleeHit);

    let mut engine = CombatEngine::new(&mut state, &mut sink);
    engine.on_trigger(&env, owner, &hit).unwrap();
    assert!(engine.events().is_empty());

    engine.on_modifier_gained(owner, ModifierKind::Relentless);
    engine.on_trigger(&env, owner, &hit).unwrap();
    assert!(engine.events().iter().any(|event| matches!(
        event,
        CombatEvent::ProcRolled { success: true, .. }
    )));
    drop(engine);

    assert_eq!(sink.applied().len(), 1);
    assert_eq!(sink.applied()[0].target, enemy);
    assert_eq!(sink.applied()[0].magnitude, 7);
}

#[test]
fn trigger_past_depth_limit_is_dropped() {
    let fx = Fixture::new(FixedRng::ALWAYS_SUCCEED).script(
        TriggerKind::Proc(ProcKind::MeleeHit),
        EffectDescriptor::grant(ResourceKind::ComboPoints, 1),
    );
    let env = fx.env();
    let (mut state, owner, _) = duel();
    let mut sink = RecordingSink::new();

    let mut engine = CombatEngine::new(&mut state, &mut sink);
    engine
        .dispatch_trigger(
            &env,
            owner,
            &TriggerEvent::proc(ProcKind::MeleeHit),
            CombatConfig::MAX_TRIGGER_DEPTH + 1,
        )
        .unwrap();

    assert_eq!(engine.stack_count(owner, ResourceKind::ComboPoints), 0);
    assert!(matches!(
        engine.events(),
        [CombatEvent::TriggerDropped { .. }]
    ));
}

#[test]
fn dead_actor_is_a_silent_no_op() {
    let fx = Fixture::new(FixedRng::ALWAYS_SUCCEED);
    let env = fx.env();
    let (mut state, owner, _) = duel();
    state.despawn_actor(owner);
    let mut sink = RecordingSink::new();

    let mut engine = CombatEngine::new(&mut state, &mut sink);
    let outcome = engine.grant(&env, owner, ResourceKind::Maelstrom, 3).unwrap();
    assert_eq!(outcome.added, 0);
    assert!(!engine.on_modifier_gained(owner, ModifierKind::Flurry));
    assert!(engine.events().is_empty());
}

#[test]
fn missing_oracle_is_reported() {
    let (mut state, owner, _) = duel();
    let mut sink = RecordingSink::new();
    let mut engine = CombatEngine::new(&mut state, &mut sink);

    assert_eq!(
        engine.grant(&CombatEnv::empty(), owner, ResourceKind::Maelstrom, 1),
        Err(EngineError::Oracle(OracleError::LedgersNotAvailable))
    );
    assert_eq!(
        engine.advance_tick(&CombatEnv::empty()),
        Err(EngineError::Oracle(OracleError::RngNotAvailable))
    );
}
