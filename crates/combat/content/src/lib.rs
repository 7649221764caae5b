//! Data-driven combat content and its loaders.
//!
//! This crate turns TOML/RON data files into the static tables the combat
//! core reads through its oracles:
//! - combat tunables (`config.toml`)
//! - ledger rules per resource kind (`ledgers.ron`)
//! - the effect and aura catalog (`effects.ron`)
//! - ability scripts keyed by trigger (`scripts.ron`)
//!
//! Everything is validated while loading, so a bad data file fails before
//! the first tick. Content never appears in combat state.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    Content, ContentFactory, ConfigLoader, EffectCatalogLoader, LedgerRulesLoader, LoadResult,
    ScriptEntry, ScriptLoader,
};
