//! Multi-strike sequences built on the deferred action scheduler.
//!
//! A launched sequence is one re-arming [`crate::schedule::DeferredAction`]
//! whose every firing is one wave. The [`SequenceBook`] keeps an
//! [`ActionSequenceState`] per launch so strikes can be traced back to the
//! cast that started them, which is what the re-entrancy guard walks.
mod spec;

use std::collections::BTreeMap;
use std::fmt;

pub use spec::{BonusWaves, SequenceSpec, Strike, WavePlan};

use crate::config::CombatConfig;
use crate::schedule::{ActionId, Termination};
use crate::state::{AbilityId, EntityId, Tick};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SequenceId(pub u64);

impl fmt::Display for SequenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seq:{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SequenceStatus {
    Running,
    Completed { reason: Termination },
}

/// Bookkeeping for one launched sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionSequenceState {
    pub id: SequenceId,
    pub ability: AbilityId,
    pub owner: EntityId,
    /// Sequence whose strike launched this one.
    pub origin: Option<SequenceId>,
    pub started_at: Tick,
    pub plan: WavePlan,
    pub action: Option<ActionId>,
    pub waves_executed: u32,
    pub status: SequenceStatus,
}

impl ActionSequenceState {
    pub fn is_running(&self) -> bool {
        self.status == SequenceStatus::Running
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SequenceBook {
    entries: BTreeMap<SequenceId, ActionSequenceState>,
    next_id: u64,
}

impl SequenceBook {
    /// Records a new running sequence. The driving action is attached separately.
    pub fn open(
        &mut self,
        ability: AbilityId,
        owner: EntityId,
        origin: Option<SequenceId>,
        now: Tick,
        plan: WavePlan,
    ) -> SequenceId {
        let id = SequenceId(self.next_id);
        self.next_id += 1;
        self.entries.insert(
            id,
            ActionSequenceState {
                id,
                ability,
                owner,
                origin,
                started_at: now,
                plan,
                action: None,
                waves_executed: 0,
                status: SequenceStatus::Running,
            },
        );
        id
    }

    pub fn attach(&mut self, id: SequenceId, action: ActionId) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.action = Some(action);
        }
    }

    pub fn record_wave(&mut self, id: SequenceId) -> u32 {
        match self.entries.get_mut(&id) {
            Some(entry) => {
                entry.waves_executed += 1;
                entry.waves_executed
            }
            None => 0,
        }
    }

    /// Marks a sequence completed. Returns its final state if it was running.
    pub fn complete(&mut self, id: SequenceId, reason: Termination) -> Option<&ActionSequenceState> {
        let entry = self.entries.get_mut(&id)?;
        if !entry.is_running() {
            return None;
        }
        entry.status = SequenceStatus::Completed { reason };
        Some(entry)
    }

    pub fn get(&self, id: SequenceId) -> Option<&ActionSequenceState> {
        self.entries.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionSequenceState> {
        self.entries.values()
    }

    pub fn running(&self) -> impl Iterator<Item = &ActionSequenceState> {
        self.entries.values().filter(|entry| entry.is_running())
    }

    /// True if `origin` or any sequence it descends from belongs to `ability`.
    ///
    /// The walk is bounded by `MAX_TRIGGER_DEPTH`, the deepest a strike can
    /// nest sequence launches.
    pub fn descends_from(&self, origin: SequenceId, ability: AbilityId) -> bool {
        let mut cursor = Some(origin);
        for _ in 0..=CombatConfig::MAX_TRIGGER_DEPTH {
            let Some(entry) = cursor.and_then(|id| self.entries.get(&id)) else {
                return false;
            };
            if entry.ability == ability {
                return true;
            }
            cursor = entry.origin;
        }
        false
    }

    /// Removes and returns completed sequences.
    pub fn drain_completed(&mut self) -> Vec<ActionSequenceState> {
        let done: Vec<SequenceId> = self
            .entries
            .values()
            .filter(|entry| !entry.is_running())
            .map(|entry| entry.id)
            .collect();
        done.into_iter()
            .filter_map(|id| self.entries.remove(&id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
