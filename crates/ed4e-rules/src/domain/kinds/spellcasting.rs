//! Spellcasting tests.

use ed4e_core::document::{Attribute, CastingDifficulty};
use ed4e_core::error::DomainError;

use super::{KindRules, RollType, TestContext, TestType, apply_bonuses, opposed_or_fixed};
use crate::domain::config::RulesConfig;
use crate::domain::step_value::StepValue;

pub(super) static RULES: KindRules = KindRules {
    test_type: TestType::Action,
    roll_type: RollType::Spellcasting,
    actor_independent: false,
    public_target: false,
    prepare_step,
    prepare_strain,
    prepare_target,
};

/// Step shared by spellcasting and thread weaving: the spellcasting
/// ability, or perception without one, plus spell test bonuses.
pub(super) fn spell_test_step(
    ctx: &TestContext,
    config: &RulesConfig,
) -> Result<StepValue, DomainError> {
    let actor = ctx.require_actor()?;
    ctx.require_spell()?;
    let mut step = StepValue::new(ctx.ability_or_attribute_step(actor, Attribute::Perception));
    apply_bonuses(&mut step, actor, &config.spell_test_bonuses);
    Ok(step)
}

fn prepare_step(ctx: &TestContext, config: &RulesConfig) -> Result<StepValue, DomainError> {
    spell_test_step(ctx, config)
}

pub(super) fn prepare_strain(ctx: &TestContext, _config: &RulesConfig) -> StepValue {
    ctx.ability_strain()
}

fn prepare_target(
    ctx: &TestContext,
    config: &RulesConfig,
) -> Result<Option<StepValue>, DomainError> {
    let spell = ctx.require_spell()?;
    let target = match spell.casting_difficulty {
        CastingDifficulty::Fixed(difficulty) => StepValue::new(difficulty),
        CastingDifficulty::TargetDefense(defense) => {
            opposed_or_fixed(ctx, config, Some(defense), None)
        }
    };
    Ok(Some(target))
}
