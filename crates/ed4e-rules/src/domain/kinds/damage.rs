//! Damage tests: an effect roll whose step depends on where the damage
//! comes from.

use ed4e_core::document::Attribute;
use ed4e_core::error::DomainError;

use super::{KindRules, RollType, TestContext, TestType, apply_bonuses, no_strain, no_target};
use crate::domain::config::{CombatChannel, RulesConfig};
use crate::domain::data::DamageSource;
use crate::domain::step_value::StepValue;

pub(super) static RULES: KindRules = KindRules {
    test_type: TestType::Effect,
    roll_type: RollType::Damage,
    actor_independent: false,
    public_target: false,
    prepare_step,
    prepare_strain: no_strain,
    prepare_target: no_target,
};

/// Source named by the data bag, or implied by the supplied documents.
fn source(ctx: &TestContext) -> Option<DamageSource> {
    ctx.data.damage_source.or_else(|| {
        if ctx.weapon.is_some() {
            Some(DamageSource::Weapon)
        } else if ctx.spell.is_some() {
            Some(DamageSource::Spell)
        } else {
            None
        }
    })
}

fn prepare_step(ctx: &TestContext, config: &RulesConfig) -> Result<StepValue, DomainError> {
    match source(ctx).ok_or_else(|| DomainError::missing("damage_source"))? {
        DamageSource::Weapon => {
            let weapon = ctx
                .weapon
                .as_ref()
                .ok_or_else(|| DomainError::missing("weapon_id"))?;
            let channel = CombatChannel::from(weapon.weapon_type);
            // A weapon with no wielder (a trap, a falling rock) deals its
            // damage step alone.
            let mut step = StepValue::new(
                ctx.actor
                    .as_ref()
                    .map_or(0, |a| a.attribute_step(Attribute::Strength)),
            )
            .with_modifier(weapon.name.clone(), weapon.damage_step);
            if let Some(actor) = &ctx.actor {
                apply_bonuses(&mut step, actor, config.damage_bonuses(channel));
            }
            Ok(step)
        }
        DamageSource::Unarmed => {
            let actor = ctx.require_actor()?;
            let mut step = StepValue::new(actor.attribute_step(Attribute::Strength));
            apply_bonuses(&mut step, actor, config.damage_bonuses(CombatChannel::Unarmed));
            Ok(step)
        }
        DamageSource::Spell => {
            let actor = ctx.require_actor()?;
            let spell = ctx.require_spell()?;
            let bonus = spell.effect_bonus.ok_or_else(|| {
                DomainError::Validation(format!("spell `{}` has no damage effect", spell.name))
            })?;
            let mut step = StepValue::new(actor.attribute_step(Attribute::Willpower))
                .with_modifier(spell.name.clone(), bonus);
            apply_bonuses(&mut step, actor, config.damage_bonuses(CombatChannel::Spell));
            Ok(step)
        }
        DamageSource::Arbitrary => Err(DomainError::missing("step")),
    }
}
