//! Ability tests: a talent, skill, or bare attribute against a difficulty.

use ed4e_core::error::DomainError;

use super::{KindRules, RollType, TestContext, TestType, apply_bonuses, opposed_or_fixed};
use crate::domain::config::RulesConfig;
use crate::domain::step_value::StepValue;

pub(super) static RULES: KindRules = KindRules {
    test_type: TestType::Action,
    roll_type: RollType::Ability,
    actor_independent: false,
    public_target: false,
    prepare_step,
    prepare_strain,
    prepare_target,
};

fn prepare_step(ctx: &TestContext, config: &RulesConfig) -> Result<StepValue, DomainError> {
    let actor = ctx.require_actor()?;
    let base = match (&ctx.ability, ctx.data.attribute) {
        (Some(ability), _) => actor.ability_step(ability),
        (None, Some(attribute)) => actor.attribute_step(attribute),
        (None, None) => return Err(DomainError::missing("ability_id")),
    };
    let mut step = StepValue::new(base);
    apply_bonuses(&mut step, actor, &config.action_bonuses);
    Ok(step)
}

fn prepare_strain(ctx: &TestContext, _config: &RulesConfig) -> StepValue {
    ctx.ability_strain()
}

fn prepare_target(
    ctx: &TestContext,
    config: &RulesConfig,
) -> Result<Option<StepValue>, DomainError> {
    let ability = ctx.ability.as_ref();
    Ok(Some(opposed_or_fixed(
        ctx,
        config,
        ability.and_then(|a| a.defense_target),
        ability.and_then(|a| a.difficulty),
    )))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::domain::data::TestData;
    use crate::domain::kinds::TestKind;
    use ed4e_core::document::{
        AbilitySnapshot, ActorSnapshot, Attribute, Defense, Defenses, GlobalBonus,
    };
    use uuid::Uuid;

    fn actor() -> ActorSnapshot {
        ActorSnapshot {
            id: Uuid::new_v4(),
            attributes: BTreeMap::from([(Attribute::Perception, 6), (Attribute::Charisma, 5)]),
            global_bonuses: BTreeMap::from([(GlobalBonus::AllActions, 1)]),
            ..ActorSnapshot::default()
        }
    }

    fn awareness() -> AbilitySnapshot {
        AbilitySnapshot {
            id: Uuid::new_v4(),
            name: "Awareness".to_owned(),
            attribute: Some(Attribute::Perception),
            rank: 3,
            strain: 1,
            difficulty: Some(7),
            ..AbilitySnapshot::default()
        }
    }

    #[test]
    fn test_step_is_ability_step_plus_action_bonus() {
        let ctx = TestContext {
            actor: Some(actor()),
            ability: Some(awareness()),
            ..TestContext::new(TestData::new(TestKind::Ability))
        };
        let step = prepare_step(&ctx, &RulesConfig::default()).unwrap();
        assert_eq!(step.base(), 9);
        assert_eq!(step.modifiers().get("all actions"), Some(&1));
        assert_eq!(step.total(), 10);
    }

    #[test]
    fn test_attribute_only_test() {
        let ctx = TestContext {
            actor: Some(actor()),
            data: TestData {
                attribute: Some(Attribute::Charisma),
                ..TestData::new(TestKind::Ability)
            },
            ..TestContext::default()
        };
        let step = prepare_step(&ctx, &RulesConfig::default()).unwrap();
        assert_eq!(step.base(), 5);
    }

    #[test]
    fn test_neither_ability_nor_attribute_is_missing_reference() {
        let ctx = TestContext {
            actor: Some(actor()),
            ..TestContext::new(TestData::new(TestKind::Ability))
        };
        let err = prepare_step(&ctx, &RulesConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            DomainError::MissingReference { field: "ability_id", .. }
        ));
    }

    #[test]
    fn test_strain_comes_from_ability() {
        let ctx = TestContext {
            ability: Some(awareness()),
            ..TestContext::default()
        };
        assert_eq!(prepare_strain(&ctx, &RulesConfig::default()).total(), 1);
    }

    #[test]
    fn test_target_uses_ability_difficulty_without_targets() {
        let ctx = TestContext {
            ability: Some(awareness()),
            ..TestContext::default()
        };
        let target = prepare_target(&ctx, &RulesConfig::default()).unwrap().unwrap();
        assert_eq!(target.total(), 7);
    }

    #[test]
    fn test_opposed_ability_uses_targets_defense() {
        let ability = AbilitySnapshot {
            defense_target: Some(Defense::Social),
            ..awareness()
        };
        let opponent = ActorSnapshot {
            defenses: Defenses {
                social: 12,
                ..Defenses::default()
            },
            ..ActorSnapshot::default()
        };
        let ctx = TestContext {
            ability: Some(ability),
            targets: vec![opponent],
            ..TestContext::default()
        };
        let target = prepare_target(&ctx, &RulesConfig::default()).unwrap().unwrap();
        assert_eq!(target.total(), 12);
    }
}
