//! Per-tick record of everything the engine reported.
use std::path::Path;

use serde::{Deserialize, Serialize};

use combat_core::{CombatEvent, EffectId, EntityId, Tick};

use crate::error::{Result, RuntimeError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub tick: Tick,
    pub event: CombatEvent,
}

/// Append-only combat log, in execution order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatLog {
    entries: Vec<LogEntry>,
}

impl CombatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn extend(&mut self, tick: Tick, events: impl IntoIterator<Item = CombatEvent>) {
        self.entries
            .extend(events.into_iter().map(|event| LogEntry { tick, event }));
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn events(&self) -> impl Iterator<Item = &CombatEvent> {
        self.entries.iter().map(|entry| &entry.event)
    }

    /// Events recorded during `tick`, in order.
    pub fn at(&self, tick: Tick) -> impl Iterator<Item = &CombatEvent> {
        self.entries
            .iter()
            .filter(move |entry| entry.tick == tick)
            .map(|entry| &entry.event)
    }

    /// Number of events matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&CombatEvent) -> bool) -> usize {
        self.events().filter(|event| predicate(event)).count()
    }

    /// Successful effect applications as `(effect, target, magnitude)`.
    pub fn applied_effects(&self) -> impl Iterator<Item = (EffectId, EntityId, i32)> + '_ {
        self.events().filter_map(|event| match event {
            CombatEvent::EffectApplied {
                effect,
                target,
                magnitude,
                result,
                ..
            } if result.is_applied() => Some((*effect, *target, *magnitude)),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes the log as pretty RON.
    pub fn write_ron(&self, path: &Path) -> Result<()> {
        let encoded = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(RuntimeError::LogEncode)?;
        std::fs::write(path, encoded).map_err(|source| RuntimeError::LogWrite {
            path: path.to_path_buf(),
            source,
        })
    }
}
