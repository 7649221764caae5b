use super::{EntityId, ModifierFlags, ModifierKind};
use crate::ledger::Ledgers;

/// Everything the combat core tracks about one actor.
///
/// Deferred action chains owned by the actor live in the scheduler and are
/// looked up by owner id; the actor itself never references them.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorState {
    pub id: EntityId,
    alive: bool,
    /// Current target, as selected by the surrounding engine.
    pub target: Option<EntityId>,
    pub modifiers: ModifierFlags,
    pub ledgers: Ledgers,
}

impl ActorState {
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            alive: true,
            target: None,
            modifiers: ModifierFlags::empty(),
            ledgers: Ledgers::default(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn holds(&self, modifier: ModifierKind) -> bool {
        self.modifiers.contains(modifier.flag())
    }

    /// Marks the actor as gone. Ledgers and modifiers are dropped with it.
    pub(crate) fn despawn(&mut self) {
        self.alive = false;
        self.target = None;
        self.modifiers = ModifierFlags::empty();
        self.ledgers = Ledgers::default();
    }
}
