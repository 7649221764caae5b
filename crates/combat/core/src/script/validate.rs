//! Static checks run before anything is registered.

use super::RegistrationError;
use crate::config::CombatConfig;
use crate::effect::{EffectDescriptor, FollowUp, TriggerKind};
use crate::env::{CatalogOracle, LedgerOracle};
use crate::ledger::LedgerRules;
use crate::sequence::SequenceSpec;
use crate::state::EffectId;

/// Checks one resource's rules against the catalog.
pub fn validate_ledger_rules<C>(rules: &LedgerRules, catalog: &C) -> Result<(), RegistrationError>
where
    C: CatalogOracle + ?Sized,
{
    let invalid = |reason| RegistrationError::InvalidLedgerRules {
        resource: rules.resource,
        reason,
    };

    if rules.max == 0 {
        return Err(invalid("max must be positive"));
    }
    for derived in &rules.derived {
        if !catalog.has_aura(derived.aura) {
            return Err(RegistrationError::UnknownAura {
                resource: rules.resource,
                aura: derived.aura,
            });
        }
        if derived.threshold == 0 || derived.threshold > rules.max {
            return Err(invalid("derived threshold must be within 1..=max"));
        }
        if derived.cap < derived.threshold {
            return Err(invalid("derived cap must not be below its threshold"));
        }
    }
    Ok(())
}

/// Walks a descriptor tree checking every id it references.
pub(super) struct DescriptorValidator<'a, C: ?Sized, L: ?Sized> {
    pub trigger: TriggerKind,
    pub catalog: &'a C,
    pub ledgers: &'a L,
}

impl<C, L> DescriptorValidator<'_, C, L>
where
    C: CatalogOracle + ?Sized,
    L: LedgerOracle + ?Sized,
{
    pub fn validate(&self, descriptor: &EffectDescriptor) -> Result<(), RegistrationError> {
        self.visit(descriptor, 0)
    }

    fn visit(&self, descriptor: &EffectDescriptor, depth: usize) -> Result<(), RegistrationError> {
        match descriptor {
            EffectDescriptor::GrantStacks(grant) => self.resource(grant.resource),
            EffectDescriptor::ConsumeStacks(consume) => {
                self.resource(consume.resource)?;
                match &consume.follow_up {
                    FollowUp::Effect { effect, .. } => self.effect(*effect),
                    FollowUp::Waves(spec) => self.sequence(spec),
                }
            }
            EffectDescriptor::ScheduleWaves(spec) => self.sequence(spec),
            EffectDescriptor::ConditionalProc(proc) => {
                if depth >= CombatConfig::MAX_TRIGGER_DEPTH {
                    return Err(RegistrationError::NestingTooDeep {
                        trigger: self.trigger,
                        max: CombatConfig::MAX_TRIGGER_DEPTH,
                    });
                }
                self.visit(&proc.then, depth + 1)
            }
            EffectDescriptor::ApplyEffect(apply) => self.effect(apply.effect),
            EffectDescriptor::Delayed(delayed) => self.effect(delayed.effect),
        }
    }

    fn effect(&self, effect: EffectId) -> Result<(), RegistrationError> {
        if self.catalog.has_effect(effect) {
            Ok(())
        } else {
            Err(RegistrationError::UnknownEffect {
                trigger: self.trigger,
                effect,
            })
        }
    }

    fn resource(&self, resource: crate::ledger::ResourceKind) -> Result<(), RegistrationError> {
        if self.ledgers.rules(resource).is_some() {
            Ok(())
        } else {
            Err(RegistrationError::MissingLedgerRules {
                trigger: self.trigger,
                resource,
            })
        }
    }

    fn sequence(&self, spec: &SequenceSpec) -> Result<(), RegistrationError> {
        if spec.strikes.is_empty() {
            return Err(RegistrationError::EmptyWave {
                trigger: self.trigger,
                ability: spec.ability,
            });
        }
        if spec.base_waves == Some(0) || spec.max_waves == Some(0) {
            return Err(RegistrationError::ZeroWaves {
                trigger: self.trigger,
                ability: spec.ability,
            });
        }
        spec.strikes
            .iter()
            .try_for_each(|strike| self.effect(strike.effect))
    }
}
