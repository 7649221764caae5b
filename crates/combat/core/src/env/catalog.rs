//! Static effect and aura identifiers known to the surrounding engine.

use std::collections::BTreeSet;

use crate::state::{AuraId, EffectId};

/// Answers whether an id exists in static data.
///
/// Only consulted at registration time; the tick loop never looks ids up.
pub trait CatalogOracle {
    fn has_effect(&self, effect: EffectId) -> bool;
    fn has_aura(&self, aura: AuraId) -> bool;
}

/// Set-backed catalog.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectCatalog {
    #[cfg_attr(feature = "serde", serde(default))]
    pub effects: BTreeSet<EffectId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub auras: BTreeSet<AuraId>,
}

impl EffectCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = EffectId>) -> Self {
        self.effects.extend(effects);
        self
    }

    pub fn with_auras(mut self, auras: impl IntoIterator<Item = AuraId>) -> Self {
        self.auras.extend(auras);
        self
    }
}

impl CatalogOracle for EffectCatalog {
    fn has_effect(&self, effect: EffectId) -> bool {
        self.effects.contains(&effect)
    }

    fn has_aura(&self, aura: AuraId) -> bool {
        self.auras.contains(&aura)
    }
}
