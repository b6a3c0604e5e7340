//! Attack tests: ability or attribute step plus the global bonuses of the
//! combat channel, against the highest defense among the targets.

use ed4e_core::document::{Attribute, Defense};
use ed4e_core::error::DomainError;

use super::{KindRules, RollType, TestContext, TestType, apply_bonuses, opposed_or_fixed};
use crate::domain::config::{CombatChannel, RulesConfig};
use crate::domain::step_value::StepValue;

pub(super) static RULES: KindRules = KindRules {
    test_type: TestType::Action,
    roll_type: RollType::Attack,
    actor_independent: false,
    public_target: false,
    prepare_step,
    prepare_strain,
    prepare_target,
};

/// Channel named by the data bag, or implied by the weapon.
fn channel(ctx: &TestContext) -> Option<CombatChannel> {
    ctx.data
        .combat_channel
        .or_else(|| ctx.weapon.as_ref().map(|w| w.weapon_type.into()))
}

fn prepare_step(ctx: &TestContext, config: &RulesConfig) -> Result<StepValue, DomainError> {
    let actor = ctx.require_actor()?;
    let channel = channel(ctx).ok_or_else(|| DomainError::missing("weapon_id"))?;
    let fallback = match channel {
        CombatChannel::Spell => Attribute::Perception,
        CombatChannel::Melee | CombatChannel::Ranged | CombatChannel::Unarmed => {
            Attribute::Dexterity
        }
    };
    let mut step = StepValue::new(ctx.ability_or_attribute_step(actor, fallback));
    apply_bonuses(&mut step, actor, config.attack_bonuses(channel));
    Ok(step)
}

fn prepare_strain(ctx: &TestContext, _config: &RulesConfig) -> StepValue {
    let mut strain = ctx.ability_strain();
    if let Some(weapon) = &ctx.weapon {
        strain.add_modifier(weapon.name.clone(), weapon.strain);
    }
    strain
}

fn prepare_target(
    ctx: &TestContext,
    config: &RulesConfig,
) -> Result<Option<StepValue>, DomainError> {
    let defense = ctx
        .ability
        .as_ref()
        .and_then(|a| a.defense_target)
        .unwrap_or(match channel(ctx) {
            Some(CombatChannel::Spell) => Defense::Mystical,
            _ => Defense::Physical,
        });
    Ok(Some(opposed_or_fixed(ctx, config, Some(defense), None)))
}
