use super::EntityId;

/// How a deferred payload finds its target.
///
/// Selectors are stored instead of references and resolved against the
/// registry every time a payload fires.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetSelector {
    /// The owning actor itself.
    Owner,
    /// Whatever the owner is targeting at fire time.
    #[default]
    OwnerTarget,
    /// The target of the triggering event, pinned when the action is scheduled.
    EventTarget,
    /// A specific actor.
    Entity(EntityId),
}

impl TargetSelector {
    /// Pins [`TargetSelector::EventTarget`] to the event's target.
    ///
    /// Without an event target it falls back to the owner's current target.
    pub fn bind(self, event_target: Option<EntityId>) -> Self {
        match self {
            Self::EventTarget => event_target.map_or(Self::OwnerTarget, Self::Entity),
            other => other,
        }
    }
}
