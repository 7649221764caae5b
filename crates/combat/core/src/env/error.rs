//! Oracle access errors.

use crate::error::{CombatError, ErrorSeverity};

/// Errors that occur when accessing oracle data.
///
/// A missing oracle is a wiring problem in the embedding engine; the core
/// cannot proceed without ledger rules, scripts, configuration or rolls.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    /// LedgerOracle is not available in the environment.
    #[error("LedgerOracle not available")]
    LedgersNotAvailable,

    /// ScriptOracle is not available in the environment.
    #[error("ScriptOracle not available")]
    ScriptsNotAvailable,

    /// CombatConfig is not available in the environment.
    #[error("CombatConfig not available")]
    ConfigNotAvailable,

    /// RngOracle is not available in the environment.
    #[error("RngOracle not available")]
    RngNotAvailable,
}

impl CombatError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        use OracleError::*;
        match self {
            LedgersNotAvailable => "ORACLE_LEDGERS_NOT_AVAILABLE",
            ScriptsNotAvailable => "ORACLE_SCRIPTS_NOT_AVAILABLE",
            ConfigNotAvailable => "ORACLE_CONFIG_NOT_AVAILABLE",
            RngNotAvailable => "ORACLE_RNG_NOT_AVAILABLE",
        }
    }
}
