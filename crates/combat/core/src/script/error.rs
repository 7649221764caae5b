//! Registration-time configuration errors.

use crate::effect::TriggerKind;
use crate::error::{CombatError, ErrorSeverity};
use crate::ledger::ResourceKind;
use crate::state::{AbilityId, AuraId, EffectId};

/// A script or ledger rule that must be fixed before the simulation runs.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    #[error("{trigger}: unknown {effect}")]
    UnknownEffect { trigger: TriggerKind, effect: EffectId },

    #[error("{resource} ledger: unknown {aura}")]
    UnknownAura { resource: ResourceKind, aura: AuraId },

    #[error("{trigger}: no ledger rules for {resource}")]
    MissingLedgerRules {
        trigger: TriggerKind,
        resource: ResourceKind,
    },

    #[error("{resource} ledger: {reason}")]
    InvalidLedgerRules {
        resource: ResourceKind,
        reason: &'static str,
    },

    #[error("{trigger}: sequence of {ability} has no strikes")]
    EmptyWave {
        trigger: TriggerKind,
        ability: AbilityId,
    },

    #[error("{trigger}: sequence of {ability} allows zero waves")]
    ZeroWaves {
        trigger: TriggerKind,
        ability: AbilityId,
    },

    #[error("{trigger}: conditional procs nested deeper than {max}")]
    NestingTooDeep { trigger: TriggerKind, max: usize },
}

impl CombatError for RegistrationError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        use RegistrationError::*;
        match self {
            UnknownEffect { .. } => "REGISTRATION_UNKNOWN_EFFECT",
            UnknownAura { .. } => "REGISTRATION_UNKNOWN_AURA",
            MissingLedgerRules { .. } => "REGISTRATION_MISSING_LEDGER_RULES",
            InvalidLedgerRules { .. } => "REGISTRATION_INVALID_LEDGER_RULES",
            EmptyWave { .. } => "REGISTRATION_EMPTY_WAVE",
            ZeroWaves { .. } => "REGISTRATION_ZERO_WAVES",
            NestingTooDeep { .. } => "REGISTRATION_NESTING_TOO_DEEP",
        }
    }
}
