//! The scripted encounter the simulator plays.
//!
//! Three attackers fight a boss. Halfway through, the shaman swaps to an add
//! that despawns a few ticks later, which cuts any sequence still aimed at it.
//! Ability ids match the bundled `scripts.ron`.
use combat_core::{AbilityId, EntityId, ModifierKind, ProcKind, ResourceKind, TriggerEvent};
use runtime::{Command, Runtime};

pub const SINISTER_STRIKE: AbilityId = AbilityId(1);
pub const EVISCERATE: AbilityId = AbilityId(2);
pub const STORMSTRIKE: AbilityId = AbilityId(3);
pub const LIGHTNING_BOLT: AbilityId = AbilityId(4);
pub const FLURRY: AbilityId = AbilityId(6);
pub const FLAME_SHOCK: AbilityId = AbilityId(7);
pub const ARCANE_BLAST: AbilityId = AbilityId(8);
pub const ARCANE_BARRAGE: AbilityId = AbilityId(9);

/// Tick the shaman switches to the add.
pub const ADD_ENGAGED: u64 = 20;
/// Tick the add leaves the fight.
pub const ADD_DESPAWNED: u64 = 24;
/// Tick the shaman loses expanded capacity.
pub const CAPACITY_LOST: u64 = 36;
/// Tick the maelstrom aura gets dispelled.
pub const MAELSTROM_DISPELLED: u64 = 48;

#[derive(Clone, Copy, Debug)]
pub struct Encounter {
    pub boss: EntityId,
    pub add: EntityId,
    pub shaman: EntityId,
    pub rogue: EntityId,
    pub mage: EntityId,
}

impl Encounter {
    pub fn spawn(runtime: &mut Runtime) -> runtime::Result<Self> {
        let boss = runtime.spawn_actor()?;
        let add = runtime.spawn_actor()?;
        Ok(Self {
            boss,
            add,
            shaman: runtime.spawn_targeting(boss)?,
            rogue: runtime.spawn_targeting(boss)?,
            mage: runtime.spawn_targeting(boss)?,
        })
    }

    /// Commands to run at `tick`.
    pub fn commands(&self, tick: u64) -> Vec<Command> {
        let mut commands = Vec::new();

        match tick {
            1 => {
                for modifier in [
                    ModifierKind::ExpandedCapacity,
                    ModifierKind::EchoingStrikes,
                    ModifierKind::Relentless,
                ] {
                    commands.push(Command::ModifierGained {
                        actor: self.shaman,
                        modifier,
                    });
                }
            }
            ADD_ENGAGED => commands.push(self.retarget(Some(self.add))),
            ADD_DESPAWNED => {
                commands.push(Command::Despawn { actor: self.add });
                commands.push(self.retarget(Some(self.boss)));
            }
            CAPACITY_LOST => commands.push(Command::ModifierRemoved {
                actor: self.shaman,
                modifier: ModifierKind::ExpandedCapacity,
            }),
            MAELSTROM_DISPELLED => commands.push(Command::AuraRemoved {
                actor: self.shaman,
                resource: ResourceKind::Maelstrom,
            }),
            _ => {}
        }

        let victim = self.shaman_victim(tick);
        commands.push(Command::Trigger {
            actor: self.shaman,
            event: TriggerEvent::proc(ProcKind::MeleeHit).with_target(victim),
        });
        if tick % 3 == 0 {
            commands.push(Command::Trigger {
                actor: self.shaman,
                event: TriggerEvent::proc(ProcKind::CriticalHit).with_target(victim),
            });
        }
        if tick % 4 == 0 {
            commands.push(cast(self.shaman, STORMSTRIKE));
        }
        if tick % 6 == 3 {
            commands.push(cast(self.shaman, LIGHTNING_BOLT));
        }
        if tick % 10 == 5 {
            commands.push(cast(self.shaman, FLURRY));
        }
        if tick % 8 == 2 {
            commands.push(Command::Trigger {
                actor: self.shaman,
                event: TriggerEvent::cast(FLAME_SHOCK).with_target(victim),
            });
        }

        if tick % 10 == 0 {
            commands.push(cast(self.rogue, EVISCERATE));
        } else if tick % 2 == 1 {
            commands.push(cast(self.rogue, SINISTER_STRIKE));
        }

        if tick % 9 == 0 {
            commands.push(cast(self.mage, ARCANE_BARRAGE));
        } else {
            commands.push(cast(self.mage, ARCANE_BLAST));
        }

        commands
    }

    fn shaman_victim(&self, tick: u64) -> EntityId {
        if (ADD_ENGAGED..ADD_DESPAWNED).contains(&tick) {
            self.add
        } else {
            self.boss
        }
    }

    fn retarget(&self, target: Option<EntityId>) -> Command {
        Command::SetTarget {
            actor: self.shaman,
            target,
        }
    }
}

fn cast(actor: EntityId, ability: AbilityId) -> Command {
    Command::Trigger {
        actor,
        event: TriggerEvent::cast(ability),
    }
}
