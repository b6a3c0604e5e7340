//! Test parameters: the frozen step, strain, and target of one test.
//!
//! Construction resolves the data bag's references, asks the kind's rules
//! for every quantity the caller did not supply, and injects situational
//! modifiers. The result is immutable and consumed once by a
//! [`TestRoll`](super::roll::TestRoll).

use std::collections::{BTreeMap, BTreeSet};

use ed4e_core::document::DocumentResolver;
use ed4e_core::error::DomainError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::config::RulesConfig;
use super::data::{Successes, TestData};
use super::kinds::{KindRules, RollType, TestContext, TestKind, TestType};
use super::step_value::{StepSource, StepValue, TargetDifficulty, TargetSource};

/// Modifier label of the penalty for casting from someone else's grimoire.
pub const GRIMOIRE_PENALTY: &str = "grimoire penalty";

/// Modifier label of the wound penalty.
pub const WOUNDS: &str = "wounds";

/// Spendable point pools that add bonus dice to a roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Karma,
    Devotion,
}

impl ResourceKind {
    /// Label prefix of the dice groups this resource adds.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Karma => "karma",
            Self::Devotion => "devotion",
        }
    }
}

/// Points of one resource spent on a test, each rolled at `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceSpend {
    pub step: i32,
    pub points_used: u32,
}

/// Identity of the actor making the roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Roller {
    pub id: Uuid,
    pub name: String,
}

/// Rule constants that govern evaluation, captured from the configuration
/// at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationRules {
    pub max_explosions: u32,
    pub extra_success_interval: i32,
}

impl From<&RulesConfig> for EvaluationRules {
    fn from(config: &RulesConfig) -> Self {
        Self {
            max_explosions: config.max_explosions,
            extra_success_interval: config.extra_success_interval,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestParameters {
    pub(crate) kind: TestKind,
    pub(crate) test_type: TestType,
    pub(crate) roll_type: RollType,
    pub(crate) roller: Option<Roller>,
    pub(crate) step: StepValue,
    pub(crate) strain: StepValue,
    /// `None` exactly for effect tests.
    pub(crate) target: Option<TargetDifficulty>,
    pub(crate) resources: BTreeMap<ResourceKind, ResourceSpend>,
    pub(crate) extra_dice: BTreeMap<String, i32>,
    pub(crate) successes: Successes,
    #[serde(skip)]
    pub(crate) evaluation: EvaluationRules,
}

impl TestParameters {
    /// Resolves the references in `data` and prepares the test.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MissingReference` if a reference does not
    /// resolve or a kind's required input is absent, `ActorNotAccepted` if
    /// an actor-independent kind names a rolling actor, `Validation` for
    /// inconsistent input or more resource points or extra dice than the
    /// configuration allows, or the resolver's own error.
    pub async fn from_data(
        data: TestData,
        config: &RulesConfig,
        resolver: &dyn DocumentResolver,
    ) -> Result<Self, DomainError> {
        let ctx = TestContext::resolve(data, resolver).await?;
        Self::from_context(&ctx, config)
    }

    /// Prepares a test rolled by `actor_id`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ActorNotAccepted` for kinds that are rolled
    /// without an actor; otherwise as [`Self::from_data`].
    pub async fn from_actor(
        mut data: TestData,
        actor_id: Uuid,
        config: &RulesConfig,
        resolver: &dyn DocumentResolver,
    ) -> Result<Self, DomainError> {
        if data.kind.rules().actor_independent {
            return Err(DomainError::ActorNotAccepted(data.kind.to_string()));
        }
        data.rolling_actor_id = Some(actor_id);
        Self::from_data(data, config, resolver).await
    }

    /// Prepares a test from an already resolved context.
    ///
    /// # Errors
    ///
    /// See [`Self::from_data`].
    pub fn from_context(ctx: &TestContext, config: &RulesConfig) -> Result<Self, DomainError> {
        let data = &ctx.data;
        let rules = data.kind.rules();

        if rules.actor_independent && data.rolling_actor_id.is_some() {
            return Err(DomainError::ActorNotAccepted(data.kind.to_string()));
        }
        check_dice_limits(data, config)?;

        let mut step = match &data.step {
            Some(source) => StepValue::from(source.clone()),
            None => {
                let mut step = (rules.prepare_step)(ctx, config)?;
                for (label, &value) in &data.modifiers {
                    step.add_modifier(label.clone(), value);
                }
                step
            }
        };
        inject_situational_modifiers(&mut step, ctx, rules, config);

        let strain = data
            .strain
            .clone()
            .map_or_else(|| (rules.prepare_strain)(ctx, config), StepValue::from);

        let target = prepare_target(ctx, rules, config)?;
        if rules.test_type.has_outcome() && target.is_none() {
            return Err(DomainError::MissingTarget(data.kind.to_string()));
        }

        Ok(Self {
            kind: data.kind,
            test_type: rules.test_type,
            roll_type: data.roll_type.unwrap_or(rules.roll_type),
            roller: ctx.actor.as_ref().map(|actor| Roller {
                id: actor.id,
                name: actor.name.clone(),
            }),
            step,
            strain,
            target,
            resources: resources(ctx, config),
            extra_dice: data.extra_dice.clone(),
            successes: data.successes,
            evaluation: EvaluationRules::from(config),
        })
    }

    #[must_use]
    pub fn kind(&self) -> TestKind {
        self.kind
    }

    #[must_use]
    pub fn test_type(&self) -> TestType {
        self.test_type
    }

    #[must_use]
    pub fn roll_type(&self) -> RollType {
        self.roll_type
    }

    #[must_use]
    pub fn roller(&self) -> Option<&Roller> {
        self.roller.as_ref()
    }

    #[must_use]
    pub fn step(&self) -> &StepValue {
        &self.step
    }

    /// Cost paid by the roller; not a dice factor.
    #[must_use]
    pub fn strain(&self) -> &StepValue {
        &self.strain
    }

    #[must_use]
    pub fn target(&self) -> Option<&TargetDifficulty> {
        self.target.as_ref()
    }

    #[must_use]
    pub fn resources(&self) -> &BTreeMap<ResourceKind, ResourceSpend> {
        &self.resources
    }

    #[must_use]
    pub fn extra_dice(&self) -> &BTreeMap<String, i32> {
        &self.extra_dice
    }

    #[must_use]
    pub fn successes(&self) -> Successes {
        self.successes
    }

    #[must_use]
    pub fn evaluation(&self) -> EvaluationRules {
        self.evaluation
    }
}

/// Rejects resource spends and extra dice beyond the configured limits.
fn check_dice_limits(data: &TestData, config: &RulesConfig) -> Result<(), DomainError> {
    for (resource, points) in [
        (ResourceKind::Karma, data.karma),
        (ResourceKind::Devotion, data.devotion),
    ] {
        if points > config.max_resource_points {
            return Err(DomainError::Validation(format!(
                "{} points {points} exceed the limit of {}",
                resource.label(),
                config.max_resource_points
            )));
        }
    }
    if data.extra_dice.len() > config.max_extra_dice {
        return Err(DomainError::Validation(format!(
            "{} extra dice exceed the limit of {}",
            data.extra_dice.len(),
            config.max_extra_dice
        )));
    }
    Ok(())
}

/// Situational penalties. Labels already present in the step are left
/// alone, so a caller can pre-empt an injection by supplying the label.
fn inject_situational_modifiers(
    step: &mut StepValue,
    ctx: &TestContext,
    rules: &KindRules,
    config: &RulesConfig,
) {
    let Some(actor) = &ctx.actor else {
        return;
    };
    if let Some(grimoire) = &ctx.grimoire
        && !grimoire.is_owned_by(actor.id)
    {
        step.inject_modifier(GRIMOIRE_PENALTY, config.foreign_grimoire_penalty);
    }
    if rules.test_type == TestType::Action && actor.wounds > 0 {
        let wounds = i32::try_from(actor.wounds).unwrap_or(i32::MAX);
        step.inject_modifier(WOUNDS, config.wound_penalty.saturating_mul(wounds));
    }
}

fn prepare_target(
    ctx: &TestContext,
    rules: &KindRules,
    config: &RulesConfig,
) -> Result<Option<TargetDifficulty>, DomainError> {
    let data = &ctx.data;
    let default_tokens = || data.target_ids.iter().copied().collect::<BTreeSet<Uuid>>();

    match &data.target {
        Some(_) if !rules.test_type.has_outcome() => Err(DomainError::Validation(format!(
            "{} tests take no target difficulty",
            data.kind
        ))),
        Some(TargetSource {
            base,
            modifiers,
            public,
            tokens,
        }) => Ok(Some(TargetDifficulty {
            value: StepValue::from(StepSource {
                base: *base,
                modifiers: modifiers.clone(),
            }),
            public: public
                .or(data.public_target)
                .unwrap_or(rules.public_target),
            tokens: if tokens.is_empty() {
                default_tokens()
            } else {
                tokens.clone()
            },
        })),
        None => Ok((rules.prepare_target)(ctx, config)?.map(|value| TargetDifficulty {
            value,
            public: data.public_target.unwrap_or(rules.public_target),
            tokens: default_tokens(),
        })),
    }
}

fn resources(ctx: &TestContext, config: &RulesConfig) -> BTreeMap<ResourceKind, ResourceSpend> {
    let data = &ctx.data;
    let actor = ctx.actor.as_ref();
    BTreeMap::from([
        (
            ResourceKind::Karma,
            ResourceSpend {
                step: data
                    .karma_step
                    .or_else(|| actor.and_then(|a| a.karma_step))
                    .unwrap_or(config.default_karma_step),
                points_used: data.karma,
            },
        ),
        (
            ResourceKind::Devotion,
            ResourceSpend {
                step: data
                    .devotion_step
                    .or_else(|| actor.and_then(|a| a.devotion_step))
                    .unwrap_or(config.default_devotion_step),
                points_used: data.devotion,
            },
        ),
    ])
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::domain::config::AstralPollution;
    use ed4e_core::document::{
        AbilitySnapshot, ActorSnapshot, Attribute, Defenses, DocumentSet, GrimoireSnapshot,
        SpellSnapshot,
    };
    use ed4e_test_support::FailingDocuments;

    fn caster() -> ActorSnapshot {
        ActorSnapshot {
            id: Uuid::new_v4(),
            name: "Aelthia".to_owned(),
            attributes: BTreeMap::from([(Attribute::Perception, 7), (Attribute::Dexterity, 5)]),
            defenses: Defenses {
                physical: 6,
                mystical: 8,
                social: 6,
            },
            karma_step: Some(5),
            ..ActorSnapshot::default()
        }
    }

    fn spell() -> SpellSnapshot {
        SpellSnapshot {
            id: Uuid::new_v4(),
            name: "Mind Dagger".to_owned(),
            circle: 2,
            weaving_difficulty: 6,
            ..SpellSnapshot::default()
        }
    }

    fn documents(actor: &ActorSnapshot, spell: &SpellSnapshot) -> DocumentSet {
        DocumentSet::default()
            .with_actor(actor.clone())
            .with_spell(spell.clone())
    }

    fn weaving_data(actor: &ActorSnapshot, spell: &SpellSnapshot) -> TestData {
        TestData {
            rolling_actor_id: Some(actor.id),
            spell_id: Some(spell.id),
            ..TestData::new(TestKind::ThreadWeaving)
        }
    }

    #[tokio::test]
    async fn test_from_data_prepares_every_quantity() {
        let actor = caster();
        let spell = spell();
        let params = TestParameters::from_data(
            weaving_data(&actor, &spell),
            &RulesConfig::default(),
            &documents(&actor, &spell),
        )
        .await
        .unwrap();

        assert_eq!(params.kind(), TestKind::ThreadWeaving);
        assert_eq!(params.test_type(), TestType::Action);
        assert_eq!(params.roll_type(), RollType::ThreadWeaving);
        assert_eq!(params.step().total(), 7);
        assert_eq!(params.strain().total(), 0);
        let target = params.target().unwrap();
        assert_eq!(target.total(), 6);
        assert!(target.public);
        assert_eq!(params.roller().map(|r| r.name.as_str()), Some("Aelthia"));
    }

    #[tokio::test]
    async fn test_supplied_values_skip_derivation() {
        // No actor or spell: deriving anything would fail.
        let data = TestData {
            step: Some(StepSource {
                base: 9,
                modifiers: BTreeMap::from([("aggressive".to_owned(), 3)]),
            }),
            strain: Some(StepSource {
                base: 1,
                ..StepSource::default()
            }),
            target: Some(TargetSource {
                base: 7,
                ..TargetSource::default()
            }),
            ..TestData::new(TestKind::Attack)
        };

        let params = TestParameters::from_data(data, &RulesConfig::default(), &FailingDocuments)
            .await
            .unwrap();

        assert_eq!(params.step().total(), 12);
        assert_eq!(params.strain().total(), 1);
        assert_eq!(params.target().map(TargetDifficulty::total), Some(7));
        assert!(params.roller().is_none());
    }

    #[tokio::test]
    async fn test_situational_modifiers_added_to_derived_step() {
        let actor = caster();
        let spell = spell();
        let data = TestData {
            modifiers: BTreeMap::from([("harried".to_owned(), -2)]),
            ..weaving_data(&actor, &spell)
        };
        let params =
            TestParameters::from_data(data, &RulesConfig::default(), &documents(&actor, &spell))
                .await
                .unwrap();
        assert_eq!(params.step().modifiers().get("harried"), Some(&-2));
        assert_eq!(params.step().total(), 5);
    }

    #[tokio::test]
    async fn test_foreign_grimoire_injects_named_penalty() {
        let actor = caster();
        let spell = spell();
        let grimoire = GrimoireSnapshot {
            id: Uuid::new_v4(),
            owner_id: Some(Uuid::new_v4()),
            spell_ids: vec![spell.id],
        };
        let data = TestData {
            grimoire_id: Some(grimoire.id),
            ..weaving_data(&actor, &spell)
        };
        let resolver = documents(&actor, &spell).with_grimoire(grimoire);

        let params = TestParameters::from_data(data, &RulesConfig::default(), &resolver)
            .await
            .unwrap();

        assert_eq!(params.step().modifiers().get(GRIMOIRE_PENALTY), Some(&-2));
        assert_eq!(params.step().total(), 5);
    }

    #[tokio::test]
    async fn test_own_grimoire_has_no_penalty() {
        let actor = caster();
        let spell = spell();
        let grimoire = GrimoireSnapshot {
            id: Uuid::new_v4(),
            owner_id: Some(actor.id),
            spell_ids: vec![spell.id],
        };
        let data = TestData {
            grimoire_id: Some(grimoire.id),
            ..weaving_data(&actor, &spell)
        };
        let resolver = documents(&actor, &spell).with_grimoire(grimoire);

        let params = TestParameters::from_data(data, &RulesConfig::default(), &resolver)
            .await
            .unwrap();

        assert!(!params.step().modifiers().contains_key(GRIMOIRE_PENALTY));
    }

    #[test]
    fn test_wounds_penalise_action_tests_only() {
        let actor = ActorSnapshot {
            wounds: 2,
            ..caster()
        };
        let ability = AbilitySnapshot {
            attribute: Some(Attribute::Dexterity),
            rank: 3,
            ..AbilitySnapshot::default()
        };
        let action = TestContext {
            actor: Some(actor.clone()),
            ability: Some(ability),
            ..TestContext::new(TestData::new(TestKind::Ability))
        };
        let params = TestParameters::from_context(&action, &RulesConfig::default()).unwrap();
        assert_eq!(params.step().modifiers().get(WOUNDS), Some(&-2));
        assert_eq!(params.step().total(), 6);

        let effect = TestContext {
            actor: Some(actor),
            ..TestContext::new(TestData::new(TestKind::Initiative))
        };
        let params = TestParameters::from_context(&effect, &RulesConfig::default()).unwrap();
        assert!(!params.step().modifiers().contains_key(WOUNDS));
    }

    #[test]
    fn test_resource_steps_fall_back_to_actor_then_config() {
        let ctx = TestContext {
            actor: Some(caster()),
            ..TestContext::new(TestData {
                attribute: Some(Attribute::Perception),
                karma: 2,
                ..TestData::new(TestKind::Arbitrary)
            })
        };
        let params = TestParameters::from_context(&ctx, &RulesConfig::default()).unwrap();
        let karma = params.resources()[&ResourceKind::Karma];
        assert_eq!(karma, ResourceSpend { step: 5, points_used: 2 });
        let devotion = params.resources()[&ResourceKind::Devotion];
        assert_eq!(devotion.step, RulesConfig::default().default_devotion_step);
        assert_eq!(devotion.points_used, 0);
    }

    fn supplied(data: TestData) -> TestContext {
        TestContext::new(TestData {
            step: Some(StepSource {
                base: 7,
                ..StepSource::default()
            }),
            target: Some(TargetSource::default()),
            ..data
        })
    }

    #[test]
    fn test_resource_points_up_to_the_limit_are_accepted() {
        let config = RulesConfig::default();
        let ctx = supplied(TestData {
            karma: config.max_resource_points,
            devotion: config.max_resource_points,
            ..TestData::new(TestKind::Arbitrary)
        });
        let params = TestParameters::from_context(&ctx, &config).unwrap();
        let karma = params.resources()[&ResourceKind::Karma];
        assert_eq!(karma.points_used, config.max_resource_points);
    }

    #[test]
    fn test_resource_points_over_the_limit_are_rejected() {
        let config = RulesConfig::default();
        for data in [
            TestData {
                karma: config.max_resource_points + 1,
                ..TestData::new(TestKind::Arbitrary)
            },
            TestData {
                devotion: u32::MAX,
                ..TestData::new(TestKind::Arbitrary)
            },
        ] {
            let err = TestParameters::from_context(&supplied(data), &config).unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)));
        }
    }

    #[test]
    fn test_extra_dice_over_the_limit_are_rejected() {
        let config = RulesConfig {
            max_extra_dice: 2,
            ..RulesConfig::default()
        };
        let extra = |n: usize| -> BTreeMap<String, i32> {
            (0..n).map(|i| (format!("extra {i}"), 4)).collect()
        };

        let within = supplied(TestData {
            extra_dice: extra(2),
            ..TestData::new(TestKind::Arbitrary)
        });
        assert_eq!(
            TestParameters::from_context(&within, &config).unwrap().extra_dice().len(),
            2
        );

        let over = supplied(TestData {
            extra_dice: extra(3),
            ..TestData::new(TestKind::Arbitrary)
        });
        let err = TestParameters::from_context(&over, &config).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn test_extreme_supplied_step_saturates() {
        let ctx = TestContext::new(TestData {
            step: Some(StepSource {
                base: i32::MAX,
                modifiers: BTreeMap::from([("a".to_owned(), 1)]),
            }),
            target: Some(TargetSource {
                base: i32::MIN,
                modifiers: BTreeMap::from([("b".to_owned(), -1)]),
                ..TargetSource::default()
            }),
            ..TestData::new(TestKind::Arbitrary)
        });
        let params = TestParameters::from_context(&ctx, &RulesConfig::default()).unwrap();
        assert_eq!(params.step().total(), i32::MAX);
        assert_eq!(params.target().map(TargetDifficulty::total), Some(i32::MIN));
    }

    #[test]
    fn test_effect_test_has_no_target() {
        let ctx = TestContext {
            actor: Some(caster()),
            ..TestContext::new(TestData::new(TestKind::Initiative))
        };
        let params = TestParameters::from_context(&ctx, &RulesConfig::default()).unwrap();
        assert_eq!(params.test_type(), TestType::Effect);
        assert!(params.target().is_none());
    }

    #[test]
    fn test_effect_test_rejects_supplied_target() {
        let ctx = TestContext {
            actor: Some(caster()),
            ..TestContext::new(TestData {
                target: Some(TargetSource::default()),
                ..TestData::new(TestKind::Initiative)
            })
        };
        let err = TestParameters::from_context(&ctx, &RulesConfig::default()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn test_target_visibility_and_tokens() {
        let opponent = Uuid::new_v4();
        let ctx = TestContext::new(TestData {
            step: Some(StepSource::default()),
            target_ids: vec![opponent],
            public_target: Some(true),
            difficulty: Some(4),
            ..TestData::new(TestKind::Arbitrary)
        });
        let params = TestParameters::from_context(&ctx, &RulesConfig::default()).unwrap();
        let target = params.target().unwrap();
        assert!(target.public);
        assert_eq!(target.tokens, BTreeSet::from([opponent]));
        assert_eq!(target.total(), 4);
    }

    #[tokio::test]
    async fn test_from_actor_seeds_rolling_actor() {
        let actor = caster();
        let spell = spell();
        let data = TestData {
            spell_id: Some(spell.id),
            ..TestData::new(TestKind::Spellcasting)
        };
        let params = TestParameters::from_actor(
            data,
            actor.id,
            &RulesConfig::default(),
            &documents(&actor, &spell),
        )
        .await
        .unwrap();
        assert_eq!(params.roller().map(|r| r.id), Some(actor.id));
        assert_eq!(params.step().total(), 7);
    }

    #[tokio::test]
    async fn test_warping_refuses_an_actor() {
        let actor = caster();
        let data = TestData {
            astral_pollution: Some(AstralPollution::Open),
            ..TestData::new(TestKind::Warping)
        };
        let err = TestParameters::from_actor(
            data.clone(),
            actor.id,
            &RulesConfig::default(),
            &FailingDocuments,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DomainError::ActorNotAccepted(_)));

        let seeded = TestData {
            rolling_actor_id: Some(actor.id),
            ..data
        };
        let err = TestParameters::from_data(
            seeded,
            &RulesConfig::default(),
            &DocumentSet::default().with_actor(actor),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DomainError::ActorNotAccepted(_)));
    }

    #[tokio::test]
    async fn test_warping_tests_the_caster() {
        let actor = caster();
        let spell = spell();
        let data = TestData {
            astral_pollution: Some(AstralPollution::Open),
            spell_id: Some(spell.id),
            target_ids: vec![actor.id],
            ..TestData::new(TestKind::Warping)
        };
        let params =
            TestParameters::from_data(data, &RulesConfig::default(), &documents(&actor, &spell))
                .await
                .unwrap();
        assert!(params.roller().is_none());
        assert_eq!(params.step().total(), 12);
        assert_eq!(params.target().map(TargetDifficulty::total), Some(8));
        assert_eq!(params.strain().total(), 0);
    }

    #[tokio::test]
    async fn test_unresolved_reference_fails_construction() {
        let data = TestData {
            rolling_actor_id: Some(Uuid::new_v4()),
            ..TestData::new(TestKind::Ability)
        };
        let err = TestParameters::from_data(data, &RulesConfig::default(), &DocumentSet::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::MissingReference {
                field: "rolling_actor_id",
                ..
            }
        ));
    }
}
