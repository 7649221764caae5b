//! Ability script loader.

use std::path::Path;

use combat_core::{
    CatalogOracle, EffectDescriptor, LedgerOracle, ScriptRegistry, TriggerKind,
};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// One `(trigger, descriptor)` pair as written in a script file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptEntry {
    pub trigger: TriggerKind,
    pub effect: EffectDescriptor,
}

/// Script file structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptFile {
    pub scripts: Vec<ScriptEntry>,
}

/// Loader for ability scripts from RON files.
pub struct ScriptLoader;

impl ScriptLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<ScriptEntry>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Vec<ScriptEntry>> {
        let file: ScriptFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse script RON: {}", e))?;
        Ok(file.scripts)
    }

    /// Validates and registers every entry, in file order.
    ///
    /// # Errors
    ///
    /// Stops at the first entry the registry rejects, naming its position.
    pub fn register<C, L>(
        entries: Vec<ScriptEntry>,
        catalog: &C,
        ledgers: &L,
    ) -> LoadResult<ScriptRegistry>
    where
        C: CatalogOracle + ?Sized,
        L: LedgerOracle + ?Sized,
    {
        let mut registry = ScriptRegistry::new();
        for (index, entry) in entries.into_iter().enumerate() {
            registry
                .register(entry.trigger, entry.effect, catalog, ledgers)
                .map_err(|e| anyhow::anyhow!("Invalid script #{}: {}", index, e))?;
        }
        tracing::debug!(scripts = registry.len(), "scripts registered");
        Ok(registry)
    }
}
