//! Unified error types surfaced by the runtime API.
//!
//! Routine combat outcomes never show up here. These are wiring problems:
//! missing content, rejected scripts, a full registry, log I/O.
use std::path::PathBuf;

use thiserror::Error;

use combat_core::{CombatError, EngineError, ErrorSeverity, RegistrationError, StateError};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runtime requires content to be configured before building")]
    MissingContent,

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error("failed to encode combat log")]
    LogEncode(#[source] ron::Error),

    #[error("failed to write combat log to {}", path.display())]
    LogWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RuntimeError {
    /// Severity of the underlying failure.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::MissingContent => ErrorSeverity::Fatal,
            Self::Engine(err) => err.severity(),
            Self::Registration(err) => err.severity(),
            Self::State(err) => err.severity(),
            Self::LogEncode(_) | Self::LogWrite { .. } => ErrorSeverity::Recoverable,
        }
    }
}
