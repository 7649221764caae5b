//! End-of-run report printed by the simulator.
use std::collections::BTreeMap;
use std::fmt;

use combat_core::{CombatEvent, SequenceStatus, Tick};
use runtime::{Runtime, RuntimeError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Summary {
    pub ticks: Tick,
    pub events: usize,
    pub effects_applied: usize,
    pub total_magnitude: i64,
    pub procs_rolled: usize,
    pub procs_succeeded: usize,
    pub spends: usize,
    pub spends_skipped: usize,
    pub overflow_discarded: u32,
    pub waves: u32,
    pub suppressed: usize,
    /// Finished sequences keyed by termination reason.
    pub sequences: BTreeMap<String, usize>,
    pub digest: String,
}

impl Summary {
    pub fn collect(runtime: &Runtime) -> Result<Self, RuntimeError> {
        let log = runtime.log();

        let mut procs_rolled = 0;
        let mut procs_succeeded = 0;
        let mut overflow_discarded = 0;
        for event in log.events() {
            match event {
                CombatEvent::ProcRolled { success, .. } => {
                    procs_rolled += 1;
                    procs_succeeded += usize::from(*success);
                }
                CombatEvent::OverflowCollapsed { discarded, .. } => overflow_discarded += discarded,
                _ => {}
            }
        }

        let mut sequences = BTreeMap::new();
        let mut waves = 0;
        for sequence in runtime.completed_sequences() {
            waves += sequence.waves_executed;
            if let SequenceStatus::Completed { reason } = sequence.status {
                *sequences.entry(reason.to_string()).or_insert(0) += 1;
            }
        }

        Ok(Self {
            ticks: runtime.clock(),
            events: log.len(),
            effects_applied: log.applied_effects().count(),
            total_magnitude: log
                .applied_effects()
                .map(|(_, _, magnitude)| i64::from(magnitude))
                .sum(),
            procs_rolled,
            procs_succeeded,
            spends: log.count(|e| matches!(e, CombatEvent::Spent { .. })),
            spends_skipped: log.count(|e| matches!(e, CombatEvent::SpendSkipped { .. })),
            overflow_discarded,
            waves,
            suppressed: log.count(|e| matches!(e, CombatEvent::SequenceSuppressed { .. })),
            sequences,
            digest: runtime.digest_hex()?,
        })
    }

    pub fn sequences_finished(&self) -> usize {
        self.sequences.values().sum()
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ticks            {}", self.ticks)?;
        writeln!(f, "events           {}", self.events)?;
        writeln!(
            f,
            "effects applied  {} (total magnitude {})",
            self.effects_applied, self.total_magnitude
        )?;
        writeln!(
            f,
            "procs            {}/{} succeeded",
            self.procs_succeeded, self.procs_rolled
        )?;
        writeln!(
            f,
            "spends           {} ({} skipped)",
            self.spends, self.spends_skipped
        )?;
        writeln!(f, "overflow lost    {}", self.overflow_discarded)?;
        writeln!(
            f,
            "sequences        {} ({} waves, {} suppressed)",
            self.sequences_finished(),
            self.waves,
            self.suppressed
        )?;
        for (reason, count) in &self.sequences {
            writeln!(f, "  {reason:<15}{count}")?;
        }
        write!(f, "state digest     {}", self.digest)
    }
}
