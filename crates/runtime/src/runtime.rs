//! The tick loop and its builder.
//!
//! One [`Runtime::tick`] is, in order:
//! 1. advance the clock
//! 2. execute every queued [`Command`] in submission order
//! 3. fire the deferred actions due at the new tick
//! 4. move the tick's events into the [`CombatLog`]
//!
//! Step 2 finishing before step 3 is what guarantees that a wave never sees
//! a ledger that is still being updated in the same tick.
use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, info, warn};

use combat_content::Content;
use combat_core::{
    ActionSequenceState, CombatConfig, CombatEngine, CombatState, EffectDescriptor, EffectSink,
    EntityId, NullSink, ResourceKind, RngOracle, Tick, TriggerKind,
};

use crate::command::Command;
use crate::error::{Result, RuntimeError};
use crate::log::CombatLog;
use crate::oracle::OracleManager;

/// What one tick did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick: Tick,
    pub commands: usize,
    pub fired: usize,
    pub events: usize,
    pub sequences_completed: usize,
}

/// Single-threaded owner of the combat state.
pub struct Runtime {
    state: CombatState,
    oracles: OracleManager,
    sink: Box<dyn EffectSink>,
    pending: VecDeque<Command>,
    log: CombatLog,
    completed: Vec<ActionSequenceState>,
}

impl Runtime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Adds an actor to the registry right away.
    pub fn spawn_actor(&mut self) -> Result<EntityId> {
        let actor = self.state.spawn_actor()?;
        debug!(%actor, "actor spawned");
        Ok(actor)
    }

    /// Spawns an actor already targeting `target`.
    pub fn spawn_targeting(&mut self, target: EntityId) -> Result<EntityId> {
        let actor = self.spawn_actor()?;
        self.state.set_target(actor, Some(target));
        Ok(actor)
    }

    /// Queues `command` for the next tick.
    pub fn submit(&mut self, command: Command) {
        self.pending.push_back(command);
    }

    pub fn submit_all(&mut self, commands: impl IntoIterator<Item = Command>) {
        self.pending.extend(commands);
    }

    /// Runs one tick.
    ///
    /// # Errors
    ///
    /// Engine failures abort the tick; commands not yet executed are dropped.
    /// Events recorded before the failure still reach the log.
    pub fn tick(&mut self) -> Result<TickReport> {
        let env = self.oracles.as_combat_env();
        let mut engine = CombatEngine::new(&mut self.state, self.sink.as_mut());

        let tick = engine.begin_tick();
        let commands = self.pending.len();
        let fired = self
            .pending
            .drain(..)
            .try_for_each(|command| command.execute(&mut engine, &env))
            .and_then(|()| engine.fire_due(&env));
        let events = engine.drain_events();

        let report_events = events.len();
        self.log.extend(tick, events);

        let completed = self.state.sequences.drain_completed();
        for sequence in &completed {
            info!(
                sequence = %sequence.id,
                ability = %sequence.ability,
                owner = %sequence.owner,
                waves = sequence.waves_executed,
                status = ?sequence.status,
                "sequence finished"
            );
        }
        let sequences_completed = completed.len();
        self.completed.extend(completed);

        let fired = fired.inspect_err(|err| {
            warn!(%tick, events = report_events, "tick aborted: {err}");
        })?;

        debug!(%tick, commands, fired, events = report_events, "tick complete");
        Ok(TickReport {
            tick,
            commands,
            fired,
            events: report_events,
            sequences_completed,
        })
    }

    /// Runs `ticks` ticks back to back.
    pub fn run(&mut self, ticks: u64) -> Result<Vec<TickReport>> {
        (0..ticks).map(|_| self.tick()).collect()
    }

    /// Runs until nothing is queued or scheduled, at most `limit` ticks.
    pub fn run_until_idle(&mut self, limit: u64) -> Result<u64> {
        let mut ran = 0;
        while ran < limit && !self.is_idle() {
            self.tick()?;
            ran += 1;
        }
        Ok(ran)
    }

    /// True when no command is queued and no action is pending.
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.state.scheduler.is_empty()
    }

    pub fn clock(&self) -> Tick {
        self.state.clock
    }

    pub fn state(&self) -> &CombatState {
        &self.state
    }

    pub fn stack_count(&self, actor: EntityId, resource: ResourceKind) -> u32 {
        self.state.stack_count(actor, resource)
    }

    pub fn log(&self) -> &CombatLog {
        &self.log
    }

    /// Sequences that reached a terminal status, oldest first.
    pub fn completed_sequences(&self) -> &[ActionSequenceState] {
        &self.completed
    }

    pub fn oracles(&self) -> &OracleManager {
        &self.oracles
    }

    /// SHA-256 of the combat state; equal for equal seeds and inputs.
    pub fn digest(&self) -> Result<[u8; 32]> {
        Ok(self.state.digest()?)
    }

    pub fn digest_hex(&self) -> Result<String> {
        self.digest().map(hex::encode)
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    content: Option<Content>,
    config: Option<CombatConfig>,
    seed: u64,
    rng: Option<Arc<dyn RngOracle>>,
    sink: Option<Box<dyn EffectSink>>,
    scripts: Vec<(TriggerKind, EffectDescriptor)>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            content: None,
            config: None,
            seed: 0,
            rng: None,
            sink: None,
            scripts: Vec::new(),
        }
    }

    /// Set required content (ledger rules, catalog, scripts, tunables).
    pub fn content(mut self, content: Content) -> Self {
        self.content = Some(content);
        self
    }

    /// Override the tunables that came with the content.
    pub fn config(mut self, config: CombatConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Seed every roll of the simulation derives from.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Replace the default [`combat_core::PcgRng`].
    pub fn rng(mut self, rng: impl RngOracle + 'static) -> Self {
        self.rng = Some(Arc::new(rng));
        self
    }

    /// Where effect applications go. Defaults to [`NullSink`].
    pub fn sink(mut self, sink: impl EffectSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Registers an extra script on top of the content's own.
    pub fn script(mut self, trigger: TriggerKind, descriptor: EffectDescriptor) -> Self {
        self.scripts.push((trigger, descriptor));
        self
    }

    pub fn build(self) -> Result<Runtime> {
        let mut content = self.content.ok_or(RuntimeError::MissingContent)?;
        if let Some(config) = self.config {
            content.config = config;
        }
        for (trigger, descriptor) in self.scripts {
            content
                .scripts
                .register(trigger, descriptor, &content.catalog, &content.ledgers)?;
        }

        let mut oracles = OracleManager::new(content);
        if let Some(rng) = self.rng {
            oracles = oracles.with_rng(rng);
        }

        info!(seed = self.seed, scripts = oracles.scripts().len(), "runtime ready");
        Ok(Runtime {
            state: CombatState::new(self.seed),
            oracles,
            sink: self.sink.unwrap_or_else(|| Box::new(NullSink)),
            pending: VecDeque::new(),
            log: CombatLog::new(),
            completed: Vec::new(),
        })
    }
}
