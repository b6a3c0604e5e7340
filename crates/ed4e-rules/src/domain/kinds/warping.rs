//! Warping tests: the astral space of a polluted region tests the caster.
//!
//! The roll belongs to no actor. Its step comes from the pollution level
//! and the spell circle; its target is the caster's mystic defense.

use ed4e_core::document::Defense;
use ed4e_core::error::DomainError;

use super::{KindRules, RollType, TestContext, TestType, no_strain};
use crate::domain::config::RulesConfig;
use crate::domain::step_value::StepValue;

pub(super) static RULES: KindRules = KindRules {
    test_type: TestType::Action,
    roll_type: RollType::Warping,
    actor_independent: true,
    public_target: false,
    prepare_step,
    prepare_strain: no_strain,
    prepare_target,
};

pub const SPELL_CIRCLE: &str = "spell circle";

fn prepare_step(ctx: &TestContext, config: &RulesConfig) -> Result<StepValue, DomainError> {
    let pollution = ctx
        .data
        .astral_pollution
        .ok_or_else(|| DomainError::missing("astral_pollution"))?;
    let base = config.warping_steps.get(&pollution).copied().ok_or_else(|| {
        DomainError::Validation(format!("no warping step for {pollution:?} astral space"))
    })?;
    let spell = ctx.require_spell()?;
    let circle = i32::try_from(spell.circle).unwrap_or(i32::MAX);
    Ok(StepValue::new(base).with_modifier(SPELL_CIRCLE, circle))
}

fn prepare_target(
    ctx: &TestContext,
    _config: &RulesConfig,
) -> Result<Option<StepValue>, DomainError> {
    let defense = ctx
        .highest_defense(Defense::Mystical)
        .ok_or_else(|| DomainError::missing("target_ids"))?;
    Ok(Some(StepValue::new(defense)))
}
