//! Registry errors.

use crate::error::{CombatError, ErrorSeverity};

/// Errors raised while populating the actor registry.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StateError {
    /// Actor registry is full (max capacity reached).
    #[error("Actor registry is full (max: {max})")]
    ActorListFull {
        /// Maximum capacity.
        max: usize,
    },

    /// Entity ID allocation overflow (all IDs exhausted).
    #[error("Entity ID overflow (current: {current})")]
    EntityIdOverflow {
        /// Current ID value when overflow occurred.
        current: u32,
    },

    /// The state could not be encoded for hashing.
    #[error("state encoding failed: {reason}")]
    Encoding { reason: String },
}

impl CombatError for StateError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ActorListFull { .. } => ErrorSeverity::Validation,
            Self::EntityIdOverflow { .. } => ErrorSeverity::Fatal,
            Self::Encoding { .. } => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ActorListFull { .. } => "STATE_ACTOR_LIST_FULL",
            Self::EntityIdOverflow { .. } => "STATE_ENTITY_ID_OVERFLOW",
            Self::Encoding { .. } => "STATE_ENCODING",
        }
    }
}
