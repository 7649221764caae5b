//! Content loaders for reading combat data from files.
//!
//! Each loader reads one file format into a `combat-core` type. Files can be
//! read from disk (`load`) or from an in-memory string (`parse`), which is
//! how the embedded data set is loaded.

pub mod config;
pub mod effects;
pub mod factory;
pub mod ledgers;
pub mod scripts;

pub use config::ConfigLoader;
pub use effects::EffectCatalogLoader;
pub use factory::{Content, ContentFactory};
pub use ledgers::LedgerRulesLoader;
pub use scripts::{ScriptEntry, ScriptLoader};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
