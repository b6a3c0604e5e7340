//! Thread weaving tests: the spell's weaving difficulty, shown to players.

use ed4e_core::error::DomainError;

use super::spellcasting::{prepare_strain, spell_test_step};
use super::{KindRules, RollType, TestContext, TestType};
use crate::domain::config::RulesConfig;
use crate::domain::step_value::StepValue;

pub(super) static RULES: KindRules = KindRules {
    test_type: TestType::Action,
    roll_type: RollType::ThreadWeaving,
    actor_independent: false,
    public_target: true,
    prepare_step: spell_test_step,
    prepare_strain,
    prepare_target,
};

fn prepare_target(
    ctx: &TestContext,
    _config: &RulesConfig,
) -> Result<Option<StepValue>, DomainError> {
    let base = match ctx.data.difficulty {
        Some(difficulty) => difficulty,
        None => ctx.require_spell()?.weaving_difficulty,
    };
    Ok(Some(StepValue::new(base)))
}
