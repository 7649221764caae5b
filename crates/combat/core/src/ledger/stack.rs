//! The stack ledger itself.

use arrayvec::ArrayVec;

use super::derived::{DerivedState, DerivedTransition};
use super::overflow::{OverflowBucket, OverflowPolicy};
use super::{ConsumeMode, LedgerRules, ResourceKind};
use crate::config::CombatConfig;

/// Derived-state changes produced by one synchronization pass.
pub type Transitions = ArrayVec<DerivedTransition, { CombatConfig::MAX_DERIVED }>;

/// Result of [`StackLedger::grant`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GrantOutcome {
    /// Units added to the primary count.
    pub added: u32,
    /// Units routed to the overflow bucket.
    pub overflowed: u32,
    /// Units discarded (ledger and bucket both full, or no expanding modifier).
    pub dropped: u32,
    pub transitions: Transitions,
}

/// Result of [`StackLedger::consume`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConsumeOutcome {
    /// Units removed in total, overflow included.
    pub removed: u32,
    /// Part of `removed` taken from the overflow bucket.
    pub from_overflow: u32,
    pub transitions: Transitions,
}

/// Result of [`StackLedger::collapse_overflow`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollapseOutcome {
    /// Overflow units merged into the primary count.
    pub retained: u32,
    /// Overflow units lost.
    pub discarded: u32,
    pub transitions: Transitions,
}

/// Bounded counter of one resource for one actor, plus everything derived from it.
///
/// # Invariants
///
/// - `count <= max` at all times; units beyond `max` live in the overflow bucket
/// - the overflow bucket exists only while it holds units
/// - the bucket is never drawn back into `count` while the expanding modifier
///   is held; only [`StackLedger::collapse_overflow`] merges it
/// - every derived state reflects the current `count` after each mutation
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StackLedger {
    resource: ResourceKind,
    count: u32,
    max: u32,
    per_unit_magnitude: i32,
    overflow_cap: u32,
    overflow_policy: OverflowPolicy,
    overflow: Option<OverflowBucket>,
    derived: ArrayVec<DerivedState, { CombatConfig::MAX_DERIVED }>,
}

impl StackLedger {
    /// Creates an empty ledger from static rules.
    pub fn new(rules: &LedgerRules, overflow_policy: OverflowPolicy) -> Self {
        Self {
            resource: rules.resource,
            count: 0,
            max: rules.max,
            per_unit_magnitude: rules.per_unit_magnitude,
            overflow_cap: rules.overflow_cap,
            overflow_policy,
            overflow: None,
            derived: rules.derived.iter().copied().map(DerivedState::new).collect(),
        }
    }

    pub fn resource(&self) -> ResourceKind {
        self.resource
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn per_unit_magnitude(&self) -> i32 {
        self.per_unit_magnitude
    }

    pub fn overflow_policy(&self) -> OverflowPolicy {
        self.overflow_policy
    }

    pub fn overflow(&self) -> Option<&OverflowBucket> {
        self.overflow.as_ref()
    }

    pub fn overflow_count(&self) -> u32 {
        self.overflow.map_or(0, |bucket| bucket.count())
    }

    /// Magnitude of `units` stacks of this resource.
    pub fn magnitude_of(&self, units: u32) -> i32 {
        (units.min(i32::MAX as u32) as i32).saturating_mul(self.per_unit_magnitude)
    }

    pub fn derived(&self) -> impl Iterator<Item = &DerivedState> {
        self.derived.iter()
    }

    /// Units a consumption can take: primary count plus overflow.
    pub fn available(&self) -> u32 {
        self.count.saturating_add(self.overflow_count())
    }

    /// True once the ledger holds nothing and can be destroyed.
    pub fn is_drained(&self) -> bool {
        self.count == 0 && self.overflow_count() == 0
    }

    /// Adds `units` stacks.
    ///
    /// Without `expanded`, units past `max` are dropped. With it, they go to
    /// the overflow bucket until `overflow_cap` is reached.
    pub fn grant(&mut self, units: u32, expanded: bool) -> GrantOutcome {
        let room = self.max.saturating_sub(self.count);
        let added = units.min(room);
        self.count += added;

        let excess = units - added;
        let (overflowed, dropped) = if excess > 0 && expanded && self.overflow_cap > 0 {
            let cap = self.overflow_cap;
            let bucket = self.overflow.get_or_insert_with(|| OverflowBucket::new(cap));
            let rejected = bucket.absorb(excess);
            (excess - rejected, rejected)
        } else {
            (0, excess)
        };

        GrantOutcome {
            added,
            overflowed,
            dropped,
            transitions: self.synchronize(),
        }
    }

    /// Removes stacks according to `mode`.
    ///
    /// Overflow units count as held: `UpTo` removes `min(units, available)`
    /// and `Exact` removes nothing unless `available >= units`. The primary
    /// count is drawn down first, the overflow bucket after it. An empty
    /// ledger is a no-op.
    pub fn consume(&mut self, units: u32, mode: ConsumeMode) -> ConsumeOutcome {
        let available = self.available();
        let removed = match mode {
            ConsumeMode::UpTo => units.min(available),
            ConsumeMode::Exact if available >= units => units,
            ConsumeMode::Exact => 0,
        };

        let from_primary = removed.min(self.count);
        self.count -= from_primary;
        let from_overflow = match self.overflow.as_mut() {
            Some(bucket) => bucket.release(removed - from_primary),
            None => 0,
        };
        debug_assert_eq!(from_primary + from_overflow, removed);

        ConsumeOutcome {
            removed,
            from_overflow,
            transitions: self.synchronize(),
        }
    }

    /// Recomputes every derived state from the current count.
    ///
    /// Idempotent: a second call without an intervening mutation returns no
    /// transitions.
    pub fn synchronize(&mut self) -> Transitions {
        self.enforce_invariants();

        let count = self.count;
        let per_unit = self.per_unit_magnitude;
        self.derived
            .iter_mut()
            .filter_map(|state| state.sync(count, per_unit))
            .collect()
    }

    /// Applies the overflow policy after the expanding modifier is gone.
    ///
    /// The bucket is always destroyed. `Collapse` first merges what fits in
    /// the room spending left under `max`; `Discard` merges nothing.
    pub fn collapse_overflow(&mut self) -> CollapseOutcome {
        let Some(bucket) = self.overflow.take() else {
            return CollapseOutcome::default();
        };

        let retained = match self.overflow_policy {
            OverflowPolicy::Collapse => bucket.count().min(self.max.saturating_sub(self.count)),
            OverflowPolicy::Discard => 0,
        };
        self.count += retained;

        CollapseOutcome {
            retained,
            discarded: bucket.count() - retained,
            transitions: self.synchronize(),
        }
    }

    /// Empties the ledger after an external removal (dispel, expiry).
    pub fn clear(&mut self) -> Transitions {
        self.count = 0;
        self.overflow = None;
        self.synchronize()
    }

    /// Fails fast in debug builds, clamps in release builds.
    fn enforce_invariants(&mut self) {
        debug_assert!(
            self.count <= self.max,
            "{} ledger count {} exceeds max {}",
            self.resource,
            self.count,
            self.max
        );
        self.count = self.count.min(self.max);

        if self.overflow.is_some_and(|bucket| bucket.is_empty()) {
            self.overflow = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::DerivedRule;
    use crate::state::AuraId;

    const OVERLAY: AuraId = AuraId(1);
    const EMPOWER: AuraId = AuraId(2);

    fn rules() -> LedgerRules {
        LedgerRules::new(ResourceKind::Maelstrom, 20, 3)
            .with_overflow_cap(10)
            .with_derived(DerivedRule::new(OVERLAY, 5, 5))
            .with_derived(DerivedRule::new(EMPOWER, 1, 10))
    }

    fn overlay_active(ledger: &StackLedger) -> bool {
        ledger
            .derived()
            .find(|state| state.aura() == OVERLAY)
            .is_some_and(DerivedState::is_active)
    }

    #[test]
    fn single_grants_activate_at_threshold() {
        let mut ledger = StackLedger::new(&rules(), OverflowPolicy::Collapse);

        for _ in 0..4 {
            ledger.grant(1, false);
            assert!(!overlay_active(&ledger));
        }
        let outcome = ledger.grant(1, false);
        assert!(overlay_active(&ledger));
        assert!(outcome.transitions.contains(&DerivedTransition::Activated {
            aura: OVERLAY,
            magnitude: 15
        }));

        let outcome = ledger.grant(1, false);
        assert!(overlay_active(&ledger));
        assert!(
            outcome.transitions.iter().all(|t| t.aura() != OVERLAY),
            "capped derived state must not be re-activated"
        );
    }

    #[test]
    fn grant_clamps_without_expanding_modifier() {
        let mut ledger = StackLedger::new(&rules(), OverflowPolicy::Collapse);
        let outcome = ledger.grant(25, false);
        assert_eq!(outcome.added, 20);
        assert_eq!(outcome.dropped, 5);
        assert_eq!(ledger.count(), 20);
        assert!(ledger.overflow().is_none());
    }

    #[test]
    fn grant_routes_excess_to_overflow_when_expanded() {
        let mut ledger = StackLedger::new(&rules(), OverflowPolicy::Collapse);
        ledger.grant(20, true);

        let outcome = ledger.grant(4, true);
        assert_eq!(outcome.added, 0);
        assert_eq!(outcome.overflowed, 4);
        assert_eq!(ledger.count(), 20);
        assert_eq!(ledger.overflow_count(), 4);

        let outcome = ledger.grant(8, true);
        assert_eq!(outcome.overflowed, 6);
        assert_eq!(outcome.dropped, 2);
        assert_eq!(ledger.count() + ledger.overflow_count(), 20 + 10);
    }

    #[test]
    fn consume_up_to_drains_and_deactivates() {
        let mut ledger = StackLedger::new(&rules(), OverflowPolicy::Collapse);
        ledger.grant(8, false);

        let outcome = ledger.consume(10, ConsumeMode::UpTo);
        assert_eq!(outcome.removed, 8);
        assert_eq!(ledger.count(), 0);
        assert!(!overlay_active(&ledger));
        assert!(ledger.is_drained());
        assert!(outcome.transitions.contains(&DerivedTransition::Deactivated { aura: OVERLAY }));
    }

    #[test]
    fn consume_exact_is_noop_when_short() {
        let mut ledger = StackLedger::new(&rules(), OverflowPolicy::Collapse);
        ledger.grant(3, false);
        let before = ledger.clone();

        let outcome = ledger.consume(4, ConsumeMode::Exact);
        assert_eq!(outcome.removed, 0);
        assert_eq!(ledger, before);
    }

    #[test]
    fn consume_on_empty_ledger_returns_zero() {
        let mut ledger = StackLedger::new(&rules(), OverflowPolicy::Collapse);
        assert_eq!(ledger.consume(5, ConsumeMode::UpTo).removed, 0);
        assert_eq!(ledger.consume(5, ConsumeMode::Exact).removed, 0);
    }

    #[test]
    fn grant_then_exact_consume_round_trips() {
        for n in 0..=20 {
            let mut ledger = StackLedger::new(&rules(), OverflowPolicy::Collapse);
            ledger.grant(2, false);
            let before = ledger.clone();
            let capped = n.min(20 - 2);

            ledger.grant(capped, false);
            ledger.consume(capped, ConsumeMode::Exact);
            assert_eq!(ledger, before, "round trip failed for n = {capped}");
        }
    }

    #[test]
    fn consume_draws_primary_before_overflow() {
        let mut ledger = StackLedger::new(&rules(), OverflowPolicy::Collapse);
        ledger.grant(24, true);
        assert_eq!(ledger.available(), 24);

        let outcome = ledger.consume(3, ConsumeMode::UpTo);
        assert_eq!(outcome.removed, 3);
        assert_eq!(outcome.from_overflow, 0);
        assert_eq!(ledger.count(), 17);
        assert_eq!(ledger.overflow_count(), 4);

        let outcome = ledger.consume(20, ConsumeMode::UpTo);
        assert_eq!(outcome.removed, 20);
        assert_eq!(outcome.from_overflow, 3);
        assert_eq!(ledger.count(), 0);
        assert_eq!(ledger.overflow_count(), 1);
        assert!(!ledger.is_drained());

        ledger.consume(5, ConsumeMode::UpTo);
        assert!(ledger.is_drained());
        assert!(ledger.overflow().is_none());
    }

    #[test]
    fn exact_consume_counts_overflow_units() {
        let mut ledger = StackLedger::new(&rules(), OverflowPolicy::Discard);
        ledger.grant(24, true);

        assert_eq!(ledger.consume(25, ConsumeMode::Exact).removed, 0);
        let outcome = ledger.consume(24, ConsumeMode::Exact);
        assert_eq!(outcome.removed, 24);
        assert_eq!(outcome.from_overflow, 4);
        assert!(ledger.is_drained());
    }

    #[test]
    fn modifier_loss_on_saturated_ledger_keeps_max() {
        for policy in [OverflowPolicy::Collapse, OverflowPolicy::Discard] {
            let mut ledger = StackLedger::new(&rules(), policy);
            ledger.grant(26, true);

            let outcome = ledger.collapse_overflow();
            assert_eq!(outcome.retained, 0);
            assert_eq!(outcome.discarded, 6);
            assert_eq!(ledger.count(), 20);
            assert!(ledger.overflow().is_none());
        }
    }

    #[test]
    fn modifier_loss_after_spending_depends_on_policy() {
        let mut collapse = StackLedger::new(&rules(), OverflowPolicy::Collapse);
        let mut discard = StackLedger::new(&rules(), OverflowPolicy::Discard);
        for ledger in [&mut collapse, &mut discard] {
            ledger.grant(26, true);
            ledger.consume(4, ConsumeMode::Exact);
            assert_eq!(ledger.count(), 16);
            assert_eq!(ledger.overflow_count(), 6);
        }

        let merged = collapse.collapse_overflow();
        assert_eq!((merged.retained, merged.discarded), (4, 2));
        assert_eq!(collapse.count(), 20);

        let dropped = discard.collapse_overflow();
        assert_eq!((dropped.retained, dropped.discarded), (0, 6));
        assert_eq!(discard.count(), 16);
        assert!(discard.overflow().is_none());
    }

    #[test]
    fn collapse_without_bucket_is_noop() {
        let mut ledger = StackLedger::new(&rules(), OverflowPolicy::Collapse);
        ledger.grant(3, true);
        assert_eq!(ledger.collapse_overflow(), CollapseOutcome::default());
        assert_eq!(ledger.count(), 3);
    }

    #[test]
    fn synchronize_is_idempotent() {
        let mut ledger = StackLedger::new(&rules(), OverflowPolicy::Collapse);
        ledger.grant(6, false);
        assert!(ledger.synchronize().is_empty());
        assert!(ledger.synchronize().is_empty());
    }

    #[test]
    fn oscillating_around_threshold_never_double_activates() {
        let mut ledger = StackLedger::new(&rules(), OverflowPolicy::Collapse);
        ledger.grant(4, false);
        let mut activations = 0;
        let mut deactivations = 0;

        for _ in 0..5 {
            for t in ledger.grant(1, false).transitions {
                if matches!(t, DerivedTransition::Activated { aura, .. } if aura == OVERLAY) {
                    activations += 1;
                }
            }
            for t in ledger.consume(1, ConsumeMode::Exact).transitions {
                if matches!(t, DerivedTransition::Deactivated { aura } if aura == OVERLAY) {
                    deactivations += 1;
                }
            }
        }

        assert_eq!(activations, 5);
        assert_eq!(deactivations, 5);
        assert!(!overlay_active(&ledger));
    }

    #[test]
    fn clear_deactivates_everything() {
        let mut ledger = StackLedger::new(&rules(), OverflowPolicy::Collapse);
        ledger.grant(22, true);
        let transitions = ledger.clear();
        assert_eq!(transitions.len(), 2);
        assert!(ledger.is_drained());
    }
}
