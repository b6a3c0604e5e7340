//! Initiative tests: dexterity less armor penalties, an effect roll.

use ed4e_core::document::Attribute;
use ed4e_core::error::DomainError;

use super::{KindRules, RollType, TestContext, TestType, apply_bonuses, no_strain, no_target};
use crate::domain::config::RulesConfig;
use crate::domain::step_value::StepValue;

pub(super) static RULES: KindRules = KindRules {
    test_type: TestType::Effect,
    roll_type: RollType::Initiative,
    actor_independent: false,
    public_target: false,
    prepare_step,
    prepare_strain: no_strain,
    prepare_target: no_target,
};

pub const ARMOR_PENALTY: &str = "armor penalty";

fn prepare_step(ctx: &TestContext, config: &RulesConfig) -> Result<StepValue, DomainError> {
    let actor = ctx.require_actor()?;
    let penalty = actor.armor_initiative_penalty.saturating_abs().saturating_neg();
    let mut step = StepValue::new(actor.attribute_step(Attribute::Dexterity))
        .with_modifier(ARMOR_PENALTY, penalty);
    apply_bonuses(&mut step, actor, &config.initiative_bonuses);
    Ok(step)
}
