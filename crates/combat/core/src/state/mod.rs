//! Authoritative combat state.
//!
//! [`CombatState`] owns the actor registry, the simulation clock, the
//! deferred action queue and the sequence book. Everything that refers to an
//! actor stores its [`EntityId`] and resolves it here on use, so a despawned
//! actor turns into a failed lookup instead of a dangling reference.
mod error;
pub mod types;

pub use bounded_vector::BoundedVec;
pub use error::StateError;
pub use types::{
    AbilityId, ActorState, AuraId, EffectId, EntityId, ModifierFlags, ModifierKind,
    TargetSelector, Tick,
};

use crate::config::CombatConfig;
use crate::env::compute_seed;
use crate::ledger::ResourceKind;
use crate::schedule::DeferredActionScheduler;
use crate::sequence::SequenceBook;

/// Canonical snapshot of the deterministic combat state.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatState {
    /// RNG seed, set once at creation and combined with `roll_nonce` for every roll.
    pub seed: u64,

    /// Current simulation tick.
    pub clock: Tick,

    /// Number of rolls made so far.
    roll_nonce: u64,

    /// Sequential entity ID allocator. Never reused; `u32::MAX` is reserved.
    next_entity_id: u32,

    /// Every actor ever spawned. Despawned actors stay as tombstones.
    actors: BoundedVec<ActorState, 0, { CombatConfig::MAX_ACTORS }>,

    pub scheduler: DeferredActionScheduler,
    pub sequences: SequenceBook,
}

impl CombatState {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            clock: Tick::ZERO,
            roll_nonce: 0,
            next_entity_id: 1,
            actors: BoundedVec::default(),
            scheduler: DeferredActionScheduler::default(),
            sequences: SequenceBook::default(),
        }
    }

    /// Registers a fresh actor and returns its id.
    ///
    /// # Errors
    ///
    /// Returns `StateError::ActorListFull` once `MAX_ACTORS` actors were
    /// spawned (tombstones included).
    pub fn spawn_actor(&mut self) -> Result<EntityId, StateError> {
        if self.actors.len() >= CombatConfig::MAX_ACTORS {
            return Err(StateError::ActorListFull {
                max: CombatConfig::MAX_ACTORS,
            });
        }

        let id = self.allocate_entity_id()?;
        self.actors
            .push(ActorState::new(id))
            .map_err(|_| StateError::ActorListFull {
                max: CombatConfig::MAX_ACTORS,
            })?;
        Ok(id)
    }

    /// Removes an actor from relevance. Returns false if it was unknown or already gone.
    ///
    /// Pending actions owned by or aimed at the actor are not touched; they
    /// fail resolution and complete when they next fire.
    pub fn despawn_actor(&mut self, id: EntityId) -> bool {
        match self.actors.iter_mut().find(|actor| actor.id == id) {
            Some(actor) if actor.is_alive() => {
                actor.despawn();
                true
            }
            _ => false,
        }
    }

    /// Points `actor` at `target`. Returns false if the actor is not alive.
    pub fn set_target(&mut self, actor: EntityId, target: Option<EntityId>) -> bool {
        match self.actor_mut(actor) {
            Some(actor) => {
                actor.target = target;
                true
            }
            None => false,
        }
    }

    /// Returns a living actor.
    pub fn actor(&self, id: EntityId) -> Option<&ActorState> {
        self.actors
            .iter()
            .find(|actor| actor.id == id && actor.is_alive())
    }

    pub(crate) fn actor_mut(&mut self, id: EntityId) -> Option<&mut ActorState> {
        self.actors
            .iter_mut()
            .find(|actor| actor.id == id && actor.is_alive())
    }

    /// Iterates over living actors in spawn order.
    pub fn actors(&self) -> impl Iterator<Item = &ActorState> {
        self.actors.iter().filter(|actor| actor.is_alive())
    }

    /// Current stack count of `resource` on `actor`; zero for unknown actors.
    pub fn stack_count(&self, actor: EntityId, resource: ResourceKind) -> u32 {
        self.actor(actor)
            .map_or(0, |actor| actor.ledgers.count(resource))
    }

    /// Resolves a selector on behalf of `owner` against the live registry.
    ///
    /// Returns `None` when the owner or the selected actor is gone, or when
    /// the selector was never bound to an event target.
    pub fn resolve_target(&self, owner: EntityId, selector: TargetSelector) -> Option<EntityId> {
        let owner = self.actor(owner)?;
        let candidate = match selector {
            TargetSelector::Owner => owner.id,
            TargetSelector::OwnerTarget => owner.target?,
            TargetSelector::Entity(id) => id,
            TargetSelector::EventTarget => return None,
        };
        self.actor(candidate).map(|actor| actor.id)
    }

    /// Draws the seed for the next roll made on behalf of `actor`.
    pub(crate) fn next_roll_seed(&mut self, actor: EntityId, context: u32) -> u64 {
        let seed = compute_seed(self.seed, self.roll_nonce, actor.0, context);
        self.roll_nonce = self.roll_nonce.wrapping_add(1);
        seed
    }

    pub fn rolls_made(&self) -> u64 {
        self.roll_nonce
    }

    /// SHA-256 over the bincode encoding of the whole state.
    ///
    /// Two runs with the same seed and the same inputs produce the same digest.
    ///
    /// # Errors
    ///
    /// [`StateError::Encoding`] if bincode rejects the state.
    #[cfg(feature = "serde")]
    pub fn digest(&self) -> Result<[u8; 32], StateError> {
        use sha2::{Digest, Sha256};

        let bytes = bincode::serialize(self).map_err(|err| StateError::Encoding {
            reason: err.to_string(),
        })?;
        Ok(Sha256::digest(&bytes).into())
    }

    fn allocate_entity_id(&mut self) -> Result<EntityId, StateError> {
        if self.next_entity_id == EntityId::SYSTEM.0 {
            return Err(StateError::EntityIdOverflow {
                current: self.next_entity_id,
            });
        }
        let id = EntityId(self.next_entity_id);
        self.next_entity_id += 1;
        Ok(id)
    }
}

impl Default for CombatState {
    fn default() -> Self {
        Self::new(0)
    }
}
