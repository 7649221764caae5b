//! Content factory for building oracles from data files.

use std::path::{Path, PathBuf};

use combat_core::{
    CombatConfig, EffectCatalog, LedgerTable, ScriptRegistry, validate_ledger_rules,
};

use crate::loaders::{
    ConfigLoader, EffectCatalogLoader, LedgerRulesLoader, LoadResult, ScriptEntry, ScriptLoader,
};

const EMBEDDED_CONFIG: &str = include_str!("../../data/config.toml");
const EMBEDDED_LEDGERS: &str = include_str!("../../data/ledgers.ron");
const EMBEDDED_EFFECTS: &str = include_str!("../../data/effects.ron");
const EMBEDDED_SCRIPTS: &str = include_str!("../../data/scripts.ron");

/// A validated content set: everything the combat oracles serve.
#[derive(Debug, Clone)]
pub struct Content {
    pub config: CombatConfig,
    pub ledgers: LedgerTable,
    pub catalog: EffectCatalog,
    pub scripts: ScriptRegistry,
}

impl Content {
    /// Validates ledger rules against the catalog, then registers scripts.
    pub fn assemble(
        config: CombatConfig,
        ledgers: LedgerTable,
        catalog: EffectCatalog,
        scripts: Vec<ScriptEntry>,
    ) -> LoadResult<Self> {
        for rules in ledgers.iter() {
            validate_ledger_rules(rules, &catalog)
                .map_err(|e| anyhow::anyhow!("Invalid ledger rules: {}", e))?;
        }
        let scripts = ScriptLoader::register(scripts, &catalog, &ledgers)?;

        tracing::info!(
            ledgers = ledgers.len(),
            effects = catalog.effects.len(),
            auras = catalog.auras.len(),
            triggers = scripts.triggers().count(),
            "combat content loaded"
        );
        Ok(Self {
            config,
            ledgers,
            catalog,
            scripts,
        })
    }
}

/// Content factory that loads all combat content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── ledgers.ron
/// ├── effects.ron
/// └── scripts.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load combat tunables from `config.toml`.
    pub fn load_config(&self) -> LoadResult<CombatConfig> {
        ConfigLoader::load(&self.data_dir.join("config.toml"))
    }

    /// Load ledger rules from `ledgers.ron`.
    pub fn load_ledgers(&self) -> LoadResult<LedgerTable> {
        LedgerRulesLoader::load(&self.data_dir.join("ledgers.ron"))
    }

    /// Load the effect catalog from `effects.ron`.
    pub fn load_catalog(&self) -> LoadResult<EffectCatalog> {
        EffectCatalogLoader::load(&self.data_dir.join("effects.ron"))
    }

    /// Load raw script entries from `scripts.ron`.
    pub fn load_scripts(&self) -> LoadResult<Vec<ScriptEntry>> {
        ScriptLoader::load(&self.data_dir.join("scripts.ron"))
    }

    /// Loads and validates the whole directory.
    pub fn load(&self) -> LoadResult<Content> {
        Content::assemble(
            self.load_config()?,
            self.load_ledgers()?,
            self.load_catalog()?,
            self.load_scripts()?,
        )
    }

    /// Loads the data set compiled into this crate.
    pub fn load_embedded() -> LoadResult<Content> {
        Content::assemble(
            ConfigLoader::parse(EMBEDDED_CONFIG)?,
            LedgerRulesLoader::parse(EMBEDDED_LEDGERS)?,
            EffectCatalogLoader::parse(EMBEDDED_EFFECTS)?,
            ScriptLoader::parse(EMBEDDED_SCRIPTS)?,
        )
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
