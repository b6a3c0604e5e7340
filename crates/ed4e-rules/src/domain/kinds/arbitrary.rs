//! Arbitrary tests: a raw step, or a bare attribute, against a difficulty.

use ed4e_core::error::DomainError;

use super::{KindRules, RollType, TestContext, TestType, no_strain, opposed_or_fixed};
use crate::domain::config::RulesConfig;
use crate::domain::step_value::StepValue;

pub(super) static RULES: KindRules = KindRules {
    test_type: TestType::Arbitrary,
    roll_type: RollType::Arbitrary,
    actor_independent: false,
    public_target: false,
    prepare_step,
    prepare_strain: no_strain,
    prepare_target,
};

/// Only reached when the caller supplied no step: the roll must then be an
/// attribute test of the rolling actor.
fn prepare_step(ctx: &TestContext, _config: &RulesConfig) -> Result<StepValue, DomainError> {
    match (&ctx.actor, ctx.data.attribute) {
        (Some(actor), Some(attribute)) => Ok(StepValue::new(actor.attribute_step(attribute))),
        _ => Err(DomainError::missing("step")),
    }
}

fn prepare_target(
    ctx: &TestContext,
    config: &RulesConfig,
) -> Result<Option<StepValue>, DomainError> {
    Ok(Some(opposed_or_fixed(ctx, config, None, None)))
}
