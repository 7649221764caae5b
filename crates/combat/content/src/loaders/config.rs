//! Combat configuration loader.

use std::path::Path;

use combat_core::CombatConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for combat tunables from TOML files.
///
/// Missing keys fall back to [`CombatConfig::default`].
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    pub fn load(path: &Path) -> LoadResult<CombatConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<CombatConfig> {
        let config: CombatConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        if config.max_waves == 0 {
            anyhow::bail!("max_waves must be at least 1");
        }
        if config.base_waves > config.max_waves {
            anyhow::bail!(
                "base_waves ({}) exceeds max_waves ({})",
                config.base_waves,
                config.max_waves
            );
        }
        Ok(config)
    }
}
