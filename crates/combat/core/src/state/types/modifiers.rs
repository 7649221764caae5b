//! Capability modifiers held by an actor.
//!
//! Modifiers are externally granted auras that change how the ledger and the
//! sequencer behave. Scripts name them through [`ModifierKind`]; actor state
//! stores them compactly as [`ModifierFlags`].

use bitflags::bitflags;

bitflags! {
    /// Set of modifiers currently held by an actor.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ModifierFlags: u8 {
        const EXPANDED_CAPACITY = 1 << 0;
        const ECHOING_STRIKES   = 1 << 1;
        const FLURRY            = 1 << 2;
        const RELENTLESS        = 1 << 3;
    }
}

/// Named modifier used by scripts and content files.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ModifierKind {
    /// Unlocks the overflow bucket once a ledger is saturated.
    ExpandedCapacity,
    /// Grants bonus waves to multi-strike sequences.
    EchoingStrikes,
    /// Grants bonus waves to multi-strike sequences.
    Flurry,
    /// Gate used by conditional procs.
    Relentless,
}

impl ModifierKind {
    /// Returns the flag bit backing this modifier.
    pub const fn flag(self) -> ModifierFlags {
        match self {
            Self::ExpandedCapacity => ModifierFlags::EXPANDED_CAPACITY,
            Self::EchoingStrikes => ModifierFlags::ECHOING_STRIKES,
            Self::Flurry => ModifierFlags::FLURRY,
            Self::Relentless => ModifierFlags::RELENTLESS,
        }
    }
}

impl From<ModifierKind> for ModifierFlags {
    fn from(kind: ModifierKind) -> Self {
        kind.flag()
    }
}
