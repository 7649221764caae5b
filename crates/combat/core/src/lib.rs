//! Deterministic combat-resource core.
//!
//! `combat-core` owns stacking resource ledgers (with their overflow buckets
//! and derived states), the spend protocol that turns stacks into a
//! follow-up, a tick-aligned scheduler for deferred actions and the
//! multi-strike sequencer built on it. All state mutation flows through
//! [`engine::CombatEngine`]; everything the core needs from the surrounding
//! engine arrives through the oracles in [`env`].
pub mod config;
pub mod consume;
pub mod effect;
pub mod engine;
pub mod env;
pub mod error;
pub mod event;
pub mod ledger;
pub mod schedule;
pub mod script;
pub mod sequence;
pub mod state;

pub use config::CombatConfig;
pub use consume::{FollowUpResult, SpendOutcome, SpendPlan};
pub use effect::{
    ApplyEffect, ConditionalProc, ConsumeStacks, DelayedEffect, EffectDescriptor, FollowUp,
    GrantStacks, ProcKind, TriggerEvent, TriggerKind,
};
pub use engine::{CombatEngine, DispatchContext, EngineError};
pub use env::{
    AppliedEffect, CatalogOracle, Chance, CombatEnv, EffectCatalog, EffectResult, EffectSink,
    Env, FixedRng, LedgerOracle, LedgerTable, NullSink, OracleError, PcgRng, RecordingSink,
    RngOracle, ScriptOracle,
};
pub use error::{CombatError, ErrorSeverity};
pub use event::CombatEvent;
pub use ledger::{
    ConsumeMode, DerivedRule, DerivedState, DerivedTransition, LedgerRules, Ledgers,
    OverflowBucket, OverflowPolicy, ResourceKind, StackLedger,
};
pub use schedule::{
    ActionId, ActionPhase, ActionRequest, Continuation, DeferredAction, DeferredActionScheduler,
    Payload, Repeats, Termination,
};
pub use script::{RegistrationError, ScriptRegistry, validate_ledger_rules};
pub use sequence::{
    ActionSequenceState, SequenceBook, SequenceId, SequenceSpec, SequenceStatus, Strike, WavePlan,
};
pub use state::{
    AbilityId, ActorState, AuraId, CombatState, EffectId, EntityId, ModifierFlags, ModifierKind,
    StateError, TargetSelector, Tick,
};
