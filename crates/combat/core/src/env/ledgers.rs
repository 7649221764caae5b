//! Ledger rules oracle.

use std::collections::BTreeMap;

use crate::ledger::{LedgerRules, ResourceKind};

/// Provides the static rules of every resource kind.
pub trait LedgerOracle: Send + Sync {
    fn rules(&self, resource: ResourceKind) -> Option<&LedgerRules>;
}

/// In-memory table of ledger rules keyed by resource kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LedgerTable {
    rules: BTreeMap<ResourceKind, LedgerRules>,
}

impl LedgerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts rules, replacing any previous entry for the same resource.
    pub fn insert(&mut self, rules: LedgerRules) -> Option<LedgerRules> {
        self.rules.insert(rules.resource, rules)
    }

    pub fn with(mut self, rules: LedgerRules) -> Self {
        self.insert(rules);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &LedgerRules> {
        self.rules.values()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl FromIterator<LedgerRules> for LedgerTable {
    fn from_iter<I: IntoIterator<Item = LedgerRules>>(iter: I) -> Self {
        let mut table = Self::new();
        for rules in iter {
            table.insert(rules);
        }
        table
    }
}

impl LedgerOracle for LedgerTable {
    fn rules(&self, resource: ResourceKind) -> Option<&LedgerRules> {
        self.rules.get(&resource)
    }
}
