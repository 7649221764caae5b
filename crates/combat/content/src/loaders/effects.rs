//! Effect catalog loader.

use std::path::Path;

use combat_core::EffectCatalog;

use crate::loaders::{LoadResult, read_file};

/// Loader for the catalog of known effect and aura ids from RON files.
pub struct EffectCatalogLoader;

impl EffectCatalogLoader {
    pub fn load(path: &Path) -> LoadResult<EffectCatalog> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<EffectCatalog> {
        ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse effect catalog RON: {}", e))
    }
}
