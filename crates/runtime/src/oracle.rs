//! Runtime wrapper around static combat content.
//!
//! [`OracleManager`] keeps the loaded tables behind `Arc`s so the runtime
//! can build a [`CombatEnv`] snapshot for every tick. The data is immutable
//! once built; dynamic state lives in [`combat_core::CombatState`].
use std::sync::Arc;

use combat_content::Content;
use combat_core::{CombatConfig, CombatEnv, LedgerTable, PcgRng, RngOracle, ScriptRegistry};

/// Manages all oracle implementations and provides unified access.
#[derive(Clone)]
pub struct OracleManager {
    pub(crate) ledgers: Arc<LedgerTable>,
    pub(crate) scripts: Arc<ScriptRegistry>,
    pub(crate) config: Arc<CombatConfig>,
    pub(crate) rng: Arc<dyn RngOracle>,
}

impl OracleManager {
    /// Wraps validated content, rolling with [`PcgRng`].
    pub fn new(content: Content) -> Self {
        Self {
            ledgers: Arc::new(content.ledgers),
            scripts: Arc::new(content.scripts),
            config: Arc::new(content.config),
            rng: Arc::new(PcgRng),
        }
    }

    /// Replaces the roll oracle.
    pub fn with_rng(mut self, rng: Arc<dyn RngOracle>) -> Self {
        self.rng = rng;
        self
    }

    /// Builds the oracle aggregate the engine reads from.
    pub fn as_combat_env(&self) -> CombatEnv<'_> {
        CombatEnv::with_all(
            self.ledgers.as_ref(),
            self.scripts.as_ref(),
            self.rng.as_ref(),
            self.config.as_ref(),
        )
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn ledgers(&self) -> &LedgerTable {
        &self.ledgers
    }

    pub fn scripts(&self) -> &ScriptRegistry {
        &self.scripts
    }
}

impl std::fmt::Debug for OracleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleManager")
            .field("ledgers", &self.ledgers.len())
            .field("scripts", &self.scripts.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
