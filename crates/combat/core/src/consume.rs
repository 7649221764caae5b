//! Consumption protocol: turning spent stacks into one follow-up.
//!
//! A spend is planned against the ledger as it is *before* anything is
//! removed. The follow-up is applied with the planned magnitude, and only
//! then is the ledger consumed. A plan that spends nothing short-circuits:
//! the follow-up is not applied at all. Units held in an overflow bucket
//! are spendable like primary ones.

use crate::env::EffectResult;
use crate::ledger::{ConsumeMode, StackLedger};
use crate::sequence::SequenceId;

/// What a spend will take, computed without mutating the ledger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpendPlan {
    pub spent: u32,
    /// Strength of the follow-up: `spent * per_unit_magnitude`.
    pub magnitude: i32,
}

impl SpendPlan {
    pub fn compute(ledger: Option<&StackLedger>, desired: u32, mode: ConsumeMode) -> Self {
        let Some(ledger) = ledger else {
            return Self::default();
        };

        let available = ledger.available();
        let spent = match mode {
            ConsumeMode::UpTo => desired.min(available),
            ConsumeMode::Exact if available >= desired => desired,
            ConsumeMode::Exact => 0,
        };
        Self {
            spent,
            magnitude: ledger.magnitude_of(spent),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.spent == 0
    }
}

/// What happened to the follow-up of a successful spend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FollowUpResult {
    Effect(EffectResult),
    Sequence(SequenceId),
}

/// Result of one spend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpendOutcome {
    /// Nothing to spend (empty ledger, or `Exact` short). No follow-up.
    Skipped,
    /// The follow-up had no live target. Nothing was spent.
    TargetLost,
    /// The follow-up sequence would re-trigger itself. Nothing was spent.
    Suppressed,
    Spent {
        spent: u32,
        magnitude: i32,
        follow_up: FollowUpResult,
    },
}

impl SpendOutcome {
    /// Units removed from the ledger.
    pub fn spent(&self) -> u32 {
        match self {
            Self::Spent { spent, .. } => *spent,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{LedgerRules, OverflowPolicy, ResourceKind};

    fn ledger_with(count: u32) -> StackLedger {
        let rules = LedgerRules::new(ResourceKind::ComboPoints, 10, 4);
        let mut ledger = StackLedger::new(&rules, OverflowPolicy::Collapse);
        ledger.grant(count, false);
        ledger
    }

    #[test]
    fn up_to_spends_what_is_there() {
        let plan = SpendPlan::compute(Some(&ledger_with(3)), 10, ConsumeMode::UpTo);
        assert_eq!(plan, SpendPlan { spent: 3, magnitude: 12 });
    }

    #[test]
    fn exact_short_spends_nothing() {
        let plan = SpendPlan::compute(Some(&ledger_with(3)), 5, ConsumeMode::Exact);
        assert!(plan.is_empty());
        assert_eq!(plan.magnitude, 0);
    }

    #[test]
    fn missing_ledger_spends_nothing() {
        assert!(SpendPlan::compute(None, 5, ConsumeMode::UpTo).is_empty());
    }

    #[test]
    fn overflow_units_are_spendable() {
        let rules = LedgerRules::new(ResourceKind::Maelstrom, 20, 1).with_overflow_cap(10);
        let mut ledger = StackLedger::new(&rules, OverflowPolicy::Collapse);
        ledger.grant(24, true);

        let plan = SpendPlan::compute(Some(&ledger), 30, ConsumeMode::UpTo);
        assert_eq!(plan, SpendPlan { spent: 24, magnitude: 24 });
        let exact = SpendPlan::compute(Some(&ledger), 24, ConsumeMode::Exact);
        assert_eq!(exact.spent, 24);
    }

    #[test]
    fn planning_does_not_touch_the_ledger() {
        let ledger = ledger_with(6);
        let before = ledger.clone();
        SpendPlan::compute(Some(&ledger), 4, ConsumeMode::Exact);
        assert_eq!(ledger, before);
    }
}
