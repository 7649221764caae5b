//! Effect descriptors: the closed set of primitives scripts are made of.
//!
//! Each variant is a plain data struct. [`crate::engine::CombatEngine`]
//! executes them through a single `match`; content files select and
//! parameterize them without code.
mod trigger;

pub use trigger::{ProcKind, TriggerEvent, TriggerKind};

use crate::env::Chance;
use crate::ledger::{ConsumeMode, ResourceKind};
use crate::sequence::SequenceSpec;
use crate::state::{EffectId, ModifierKind, TargetSelector};

/// Adds stacks to the acting actor's ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GrantStacks {
    pub resource: ResourceKind,
    pub amount: u32,
}

/// What a successful spend turns into.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FollowUp {
    /// One effect whose magnitude is the spent stacks' magnitude.
    Effect {
        effect: EffectId,
        #[cfg_attr(feature = "serde", serde(default))]
        target: TargetSelector,
    },
    /// A multi-strike sequence empowered by the spent stacks' magnitude.
    Waves(SequenceSpec),
}

/// Spends stacks from the acting actor's ledger into a follow-up.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConsumeStacks {
    pub resource: ResourceKind,
    pub desired: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub mode: ConsumeMode,
    pub follow_up: FollowUp,
}

/// Rolls once and, on success, runs `then`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConditionalProc {
    pub chance: Chance,
    /// Modifier the actor must hold for the roll to happen at all.
    #[cfg_attr(feature = "serde", serde(default))]
    pub requires: Option<ModifierKind>,
    pub then: Box<EffectDescriptor>,
}

/// Applies an effect right away.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ApplyEffect {
    pub effect: EffectId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub target: TargetSelector,
    pub magnitude: i32,
}

/// Applies an effect `delay` ticks later, resolving the target then.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DelayedEffect {
    pub delay: u64,
    pub effect: EffectId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub target: TargetSelector,
    pub magnitude: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectDescriptor {
    GrantStacks(GrantStacks),
    ConsumeStacks(ConsumeStacks),
    ScheduleWaves(SequenceSpec),
    ConditionalProc(ConditionalProc),
    ApplyEffect(ApplyEffect),
    Delayed(DelayedEffect),
}

impl EffectDescriptor {
    pub fn grant(resource: ResourceKind, amount: u32) -> Self {
        Self::GrantStacks(GrantStacks { resource, amount })
    }

    pub fn spend(resource: ResourceKind, desired: u32, mode: ConsumeMode, follow_up: FollowUp) -> Self {
        Self::ConsumeStacks(ConsumeStacks {
            resource,
            desired,
            mode,
            follow_up,
        })
    }

    pub fn proc(chance: Chance, requires: Option<ModifierKind>, then: EffectDescriptor) -> Self {
        Self::ConditionalProc(ConditionalProc {
            chance,
            requires,
            then: Box::new(then),
        })
    }

    pub fn apply(effect: EffectId, target: TargetSelector, magnitude: i32) -> Self {
        Self::ApplyEffect(ApplyEffect {
            effect,
            target,
            magnitude,
        })
    }

    pub fn delayed(delay: u64, effect: EffectId, target: TargetSelector, magnitude: i32) -> Self {
        Self::Delayed(DelayedEffect {
            delay,
            effect,
            target,
            magnitude,
        })
    }

    /// Short name used in logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::GrantStacks(_) => "grant_stacks",
            Self::ConsumeStacks(_) => "consume_stacks",
            Self::ScheduleWaves(_) => "schedule_waves",
            Self::ConditionalProc(_) => "conditional_proc",
            Self::ApplyEffect(_) => "apply_effect",
            Self::Delayed(_) => "delayed",
        }
    }
}
