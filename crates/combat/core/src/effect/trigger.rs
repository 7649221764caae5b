use crate::sequence::SequenceId;
use crate::state::{AbilityId, EntityId};

/// Reactive combat events the dispatch layer forwards as procs.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ProcKind {
    MeleeHit,
    SpellHit,
    CriticalHit,
    /// Raised by the core for every applied wave strike.
    StrikeLanded,
}

/// Key scripts are registered under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TriggerKind {
    Cast(AbilityId),
    Proc(ProcKind),
}

impl std::fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cast(ability) => write!(f, "cast({ability})"),
            Self::Proc(kind) => write!(f, "proc({kind})"),
        }
    }
}

/// A trigger as delivered to `on_trigger`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TriggerEvent {
    pub kind: TriggerKind,
    /// Actor the event concerns (spell target, hit victim).
    pub target: Option<EntityId>,
    /// Set on procs raised by a sequence's own strikes.
    pub origin: Option<SequenceId>,
}

impl TriggerEvent {
    pub fn cast(ability: AbilityId) -> Self {
        Self {
            kind: TriggerKind::Cast(ability),
            target: None,
            origin: None,
        }
    }

    pub fn proc(kind: ProcKind) -> Self {
        Self {
            kind: TriggerKind::Proc(kind),
            target: None,
            origin: None,
        }
    }

    pub fn with_target(mut self, target: EntityId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn from_sequence(mut self, sequence: SequenceId) -> Self {
        self.origin = Some(sequence);
        self
    }
}
