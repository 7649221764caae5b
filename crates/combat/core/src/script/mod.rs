//! Script registry: which descriptors run for which trigger.
//!
//! Every descriptor is validated against static data when it is registered.
//! A script referencing a missing effect, aura or ledger is rejected here so
//! the tick loop never meets one.
mod error;
mod validate;

use std::collections::BTreeMap;

pub use error::RegistrationError;
pub use validate::validate_ledger_rules;

use crate::effect::{EffectDescriptor, TriggerKind};
use crate::env::{CatalogOracle, LedgerOracle, ScriptOracle};
use validate::DescriptorValidator;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScriptRegistry {
    scripts: BTreeMap<TriggerKind, Vec<EffectDescriptor>>,
}

impl ScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and appends a descriptor to `trigger`'s script.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistrationError`] naming the first unknown id or
    /// malformed sequence found; nothing is registered in that case.
    pub fn register<C, L>(
        &mut self,
        trigger: TriggerKind,
        descriptor: EffectDescriptor,
        catalog: &C,
        ledgers: &L,
    ) -> Result<(), RegistrationError>
    where
        C: CatalogOracle + ?Sized,
        L: LedgerOracle + ?Sized,
    {
        DescriptorValidator {
            trigger,
            catalog,
            ledgers,
        }
        .validate(&descriptor)?;

        tracing::debug!(%trigger, kind = descriptor.kind_name(), "registered script");
        self.scripts.entry(trigger).or_default().push(descriptor);
        Ok(())
    }

    pub fn triggers(&self) -> impl Iterator<Item = &TriggerKind> {
        self.scripts.keys()
    }

    /// Number of registered descriptors across all triggers.
    pub fn len(&self) -> usize {
        self.scripts.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

impl ScriptOracle for ScriptRegistry {
    fn scripts(&self, trigger: &TriggerKind) -> &[EffectDescriptor] {
        self.scripts.get(trigger).map_or(&[], Vec::as_slice)
    }
}
