//! Overflow bucket: secondary capacity unlocked by the expanding modifier.
//!
//! The bucket is never written by callers. [`super::StackLedger`] routes
//! excess units into it on grant, draws on it once a consumption has used up
//! the primary count, and settles it according to [`OverflowPolicy`] when
//! the modifier goes away.

/// Fate of overflow units when the capacity-expanding modifier is removed.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum OverflowPolicy {
    /// Overflow merges into the room left under `max`; the rest is lost.
    #[default]
    Collapse,
    /// Overflow is dropped outright, whatever room is left.
    Discard,
}

/// Units held beyond a saturated ledger's `max`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OverflowBucket {
    count: u32,
    cap: u32,
}

impl OverflowBucket {
    pub(crate) fn new(cap: u32) -> Self {
        Self { count: 0, cap }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn cap(&self) -> u32 {
        self.cap
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Stores up to `units`, returning the part that did not fit.
    pub(crate) fn absorb(&mut self, units: u32) -> u32 {
        let room = self.cap.saturating_sub(self.count);
        let taken = units.min(room);
        self.count += taken;
        units - taken
    }

    /// Takes up to `units` out of the bucket, returning how many were taken.
    pub(crate) fn release(&mut self, units: u32) -> u32 {
        let taken = units.min(self.count);
        self.count -= taken;
        taken
    }
}
