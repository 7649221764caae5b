//! Traits describing what the core consumes from the surrounding engine.
//!
//! Oracles expose static ledger rules, registered scripts, tunables and
//! deterministic rolls. The [`Env`] aggregate bundles them so the engine can
//! access everything it needs without hard coupling to concrete
//! implementations. Effect application is mutable and travels separately as
//! an [`EffectSink`].
mod catalog;
mod error;
mod ledgers;
mod rng;
mod scripts;
mod sink;

pub use catalog::{CatalogOracle, EffectCatalog};
pub use error::OracleError;
pub use ledgers::{LedgerOracle, LedgerTable};
pub use rng::{Chance, FixedRng, PcgRng, RngOracle, compute_seed};
pub use scripts::ScriptOracle;
pub use sink::{AppliedEffect, EffectResult, EffectSink, NullSink, RecordingSink};

use crate::config::CombatConfig;

/// Aggregates read-only oracles required by the combat engine.
#[derive(Clone, Copy, Debug)]
pub struct Env<'a, L, S, R>
where
    L: LedgerOracle + ?Sized,
    S: ScriptOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    ledgers: Option<&'a L>,
    scripts: Option<&'a S>,
    rng: Option<&'a R>,
    config: Option<&'a CombatConfig>,
}

pub type CombatEnv<'a> = Env<'a, dyn LedgerOracle + 'a, dyn ScriptOracle + 'a, dyn RngOracle + 'a>;

impl<'a, L, S, R> Env<'a, L, S, R>
where
    L: LedgerOracle + ?Sized,
    S: ScriptOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    pub fn new(
        ledgers: Option<&'a L>,
        scripts: Option<&'a S>,
        rng: Option<&'a R>,
        config: Option<&'a CombatConfig>,
    ) -> Self {
        Self {
            ledgers,
            scripts,
            rng,
            config,
        }
    }

    pub fn with_all(ledgers: &'a L, scripts: &'a S, rng: &'a R, config: &'a CombatConfig) -> Self {
        Self::new(Some(ledgers), Some(scripts), Some(rng), Some(config))
    }

    pub fn empty() -> Self {
        Self {
            ledgers: None,
            scripts: None,
            rng: None,
            config: None,
        }
    }

    /// Returns the LedgerOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::LedgersNotAvailable` if no ledger oracle was provided.
    pub fn ledgers(&self) -> Result<&'a L, OracleError> {
        self.ledgers.ok_or(OracleError::LedgersNotAvailable)
    }

    /// Returns the ScriptOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::ScriptsNotAvailable` if no script oracle was provided.
    pub fn scripts(&self) -> Result<&'a S, OracleError> {
        self.scripts.ok_or(OracleError::ScriptsNotAvailable)
    }

    /// Returns the RngOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::RngNotAvailable` if no rng oracle was provided.
    pub fn rng(&self) -> Result<&'a R, OracleError> {
        self.rng.ok_or(OracleError::RngNotAvailable)
    }

    /// Returns the combat configuration, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::ConfigNotAvailable` if no configuration was provided.
    pub fn config(&self) -> Result<&'a CombatConfig, OracleError> {
        self.config.ok_or(OracleError::ConfigNotAvailable)
    }
}

impl<'a, L, S, R> Env<'a, L, S, R>
where
    L: LedgerOracle + 'a,
    S: ScriptOracle + 'a,
    R: RngOracle + 'a,
{
    /// Converts this environment into a trait-object based `CombatEnv` (consumes self).
    pub fn into_combat_env(self) -> CombatEnv<'a> {
        self.as_combat_env()
    }

    /// Converts this environment into a trait-object based `CombatEnv` (borrows self).
    ///
    /// Use this when you need to convert multiple times (e.g., in a loop).
    pub fn as_combat_env(&self) -> CombatEnv<'a> {
        let ledgers: Option<&'a dyn LedgerOracle> = self.ledgers.map(|ledgers| ledgers as _);
        let scripts: Option<&'a dyn ScriptOracle> = self.scripts.map(|scripts| scripts as _);
        let rng: Option<&'a dyn RngOracle> = self.rng.map(|rng| rng as _);
        Env::new(ledgers, scripts, rng, self.config)
    }
}
