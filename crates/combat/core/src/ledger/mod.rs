//! Stacking combat-resource ledgers.
//!
//! Each actor owns at most one [`StackLedger`] per [`ResourceKind`]. A ledger
//! is created on the first grant, mutated by grants and consumptions, and
//! destroyed once it drains to zero. Everything else (overflow bucket,
//! derived states) is recomputed from the count and never written directly.
mod derived;
mod overflow;
mod stack;

use arrayvec::ArrayVec;

pub use derived::{DerivedRule, DerivedState, DerivedTransition};
pub use overflow::{OverflowBucket, OverflowPolicy};
pub use stack::{CollapseOutcome, ConsumeOutcome, GrantOutcome, StackLedger, Transitions};

use crate::config::CombatConfig;

/// Kinds of stacking resources.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ResourceKind {
    /// Built by melee hits, spent on finishers.
    ComboPoints,
    /// Built by weapon procs, spent to empower spells.
    Maelstrom,
    /// Built by casts, spent by barrage-style abilities.
    ArcaneCharges,
    /// Built by strikes, spent to launch follow-up flurries.
    Ferocity,
}

/// Semantics of a consumption request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum ConsumeMode {
    /// Remove as many as available, up to the requested amount.
    #[default]
    UpTo,
    /// Remove exactly the requested amount, or nothing.
    Exact,
}

/// Static rules for one resource kind.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LedgerRules {
    pub resource: ResourceKind,
    /// Primary capacity.
    pub max: u32,
    /// Strength contributed by each stack when spent or when driving derived states.
    pub per_unit_magnitude: i32,
    /// Extra capacity unlocked by the expanding modifier. Zero disables overflow.
    #[cfg_attr(feature = "serde", serde(default))]
    pub overflow_cap: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub derived: ArrayVec<DerivedRule, { CombatConfig::MAX_DERIVED }>,
}

impl LedgerRules {
    pub fn new(resource: ResourceKind, max: u32, per_unit_magnitude: i32) -> Self {
        Self {
            resource,
            max,
            per_unit_magnitude,
            overflow_cap: 0,
            derived: ArrayVec::new(),
        }
    }

    pub fn with_overflow_cap(mut self, overflow_cap: u32) -> Self {
        self.overflow_cap = overflow_cap;
        self
    }

    /// Adds a derived state; ignored once `MAX_DERIVED` rules are present.
    pub fn with_derived(mut self, rule: DerivedRule) -> Self {
        if !self.derived.is_full() {
            self.derived.push(rule);
        }
        self
    }
}

/// All ledgers owned by one actor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ledgers {
    entries: ArrayVec<StackLedger, { CombatConfig::MAX_LEDGERS }>,
}

impl Ledgers {
    pub fn get(&self, resource: ResourceKind) -> Option<&StackLedger> {
        self.entries.iter().find(|l| l.resource() == resource)
    }

    pub fn get_mut(&mut self, resource: ResourceKind) -> Option<&mut StackLedger> {
        self.entries.iter_mut().find(|l| l.resource() == resource)
    }

    /// Returns the ledger for `rules.resource`, creating it if needed.
    ///
    /// Returns `None` only when the actor already holds `MAX_LEDGERS` other ledgers.
    pub fn get_or_create(
        &mut self,
        rules: &LedgerRules,
        policy: OverflowPolicy,
    ) -> Option<&mut StackLedger> {
        let index = match self
            .entries
            .iter()
            .position(|l| l.resource() == rules.resource)
        {
            Some(index) => index,
            None => {
                self.entries
                    .try_push(StackLedger::new(rules, policy))
                    .ok()?;
                self.entries.len() - 1
            }
        };
        self.entries.get_mut(index)
    }

    /// Destroys the ledger for `resource`.
    pub fn remove(&mut self, resource: ResourceKind) -> Option<StackLedger> {
        let index = self.entries.iter().position(|l| l.resource() == resource)?;
        Some(self.entries.remove(index))
    }

    /// Current stack count, zero when no ledger exists.
    pub fn count(&self, resource: ResourceKind) -> u32 {
        self.get(resource).map_or(0, StackLedger::count)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StackLedger> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut StackLedger> {
        self.entries.iter_mut()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
