//! Ledger rules loader.

use std::path::Path;

use combat_core::{LedgerRules, LedgerTable};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Ledger rules file structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerRulesFile {
    pub ledgers: Vec<LedgerRules>,
}

/// Loader for per-resource ledger rules from RON files.
pub struct LedgerRulesLoader;

impl LedgerRulesLoader {
    pub fn load(path: &Path) -> LoadResult<LedgerTable> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parses the file, rejecting a resource listed twice.
    ///
    /// Rules are only checked for shape here; aura ids are validated against
    /// the catalog once both are loaded.
    pub fn parse(content: &str) -> LoadResult<LedgerTable> {
        let file: LedgerRulesFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse ledger rules RON: {}", e))?;

        let mut table = LedgerTable::new();
        for rules in file.ledgers {
            let resource = rules.resource;
            if table.insert(rules).is_some() {
                anyhow::bail!("Duplicate ledger rules for {}", resource);
            }
        }
        Ok(table)
    }
}
