//! Errors surfaced by the combat engine.
//!
//! Empty ledgers, dead actors and failed rolls are outcomes, not errors.
//! What is left are wiring problems the runtime cannot paper over.

use crate::env::OracleError;
use crate::error::{CombatError, ErrorSeverity};
use crate::ledger::ResourceKind;
use crate::state::EntityId;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// Scripts are validated against ledger rules, so this means an
    /// unregistered grant reached the engine.
    #[error("no ledger rules for {resource} (actor {actor})")]
    MissingLedgerRules {
        actor: EntityId,
        resource: ResourceKind,
    },

    #[error("actor {actor} cannot hold another ledger ({resource})")]
    LedgerCapacity {
        actor: EntityId,
        resource: ResourceKind,
    },
}

impl CombatError for EngineError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Oracle(err) => err.severity(),
            Self::MissingLedgerRules { .. } => ErrorSeverity::Internal,
            Self::LedgerCapacity { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Oracle(err) => err.error_code(),
            Self::MissingLedgerRules { .. } => "ENGINE_MISSING_LEDGER_RULES",
            Self::LedgerCapacity { .. } => "ENGINE_LEDGER_CAPACITY",
        }
    }
}
