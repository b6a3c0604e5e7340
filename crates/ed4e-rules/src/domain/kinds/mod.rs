//! Test kinds and the per-kind preparation rules.
//!
//! Each kind contributes a [`KindRules`] entry: its test type, whether an
//! actor may roll it, and three pure functions deriving the step, strain,
//! and target difficulty from a resolved [`TestContext`]. The generic
//! constructor in `parameters` only calls a function when the caller did
//! not supply that value.

mod ability;
mod arbitrary;
mod attack;
mod damage;
mod initiative;
mod spellcasting;
mod thread_weaving;
mod warping;

use std::fmt;
use std::future::Future;

use ed4e_core::document::{
    AbilitySnapshot, ActorSnapshot, Attribute, Defense, DocumentResolver, GlobalBonus,
    GrimoireSnapshot, SpellSnapshot, WeaponSnapshot,
};
use ed4e_core::error::DomainError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::config::RulesConfig;
use super::data::TestData;
use super::step_value::StepValue;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    Ability,
    #[default]
    Arbitrary,
    Attack,
    Damage,
    Initiative,
    Spellcasting,
    ThreadWeaving,
    Warping,
}

impl TestKind {
    pub const ALL: [Self; 8] = [
        Self::Ability,
        Self::Arbitrary,
        Self::Attack,
        Self::Damage,
        Self::Initiative,
        Self::Spellcasting,
        Self::ThreadWeaving,
        Self::Warping,
    ];

    #[must_use]
    pub fn rules(self) -> &'static KindRules {
        match self {
            Self::Ability => &ability::RULES,
            Self::Arbitrary => &arbitrary::RULES,
            Self::Attack => &attack::RULES,
            Self::Damage => &damage::RULES,
            Self::Initiative => &initiative::RULES,
            Self::Spellcasting => &spellcasting::RULES,
            Self::ThreadWeaving => &thread_weaving::RULES,
            Self::Warping => &warping::RULES,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ability => "ability",
            Self::Arbitrary => "arbitrary",
            Self::Attack => "attack",
            Self::Damage => "damage",
            Self::Initiative => "initiative",
            Self::Spellcasting => "spellcasting",
            Self::ThreadWeaving => "thread_weaving",
            Self::Warping => "warping",
        }
    }
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether, and how, a test is judged against a difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    Arbitrary,
    Action,
    /// A magnitude roll (damage, initiative) with no pass or fail.
    Effect,
}

impl TestType {
    /// Whether the test succeeds or fails against a target difficulty.
    #[must_use]
    pub fn has_outcome(self) -> bool {
        matches!(self, Self::Arbitrary | Self::Action)
    }
}

/// Finer-grained classification used only for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollType {
    Ability,
    Arbitrary,
    Attack,
    Damage,
    Initiative,
    Spellcasting,
    ThreadWeaving,
    Warping,
    Recovery,
    Knockdown,
}

pub type StepFn = fn(&TestContext, &RulesConfig) -> Result<StepValue, DomainError>;
pub type StrainFn = fn(&TestContext, &RulesConfig) -> StepValue;
pub type TargetFn = fn(&TestContext, &RulesConfig) -> Result<Option<StepValue>, DomainError>;

/// Preparation rules of one test kind.
#[derive(Debug)]
pub struct KindRules {
    pub test_type: TestType,
    pub roll_type: RollType,
    /// Rolled without a participating actor; the actor-seeded factory is
    /// refused.
    pub actor_independent: bool,
    /// Default visibility of the target difficulty.
    pub public_target: bool,
    pub prepare_step: StepFn,
    pub prepare_strain: StrainFn,
    /// Returns `None` exactly for effect tests.
    pub prepare_target: TargetFn,
}

/// A test's data with every reference resolved to a snapshot.
#[derive(Debug, Clone, Default)]
pub struct TestContext {
    pub data: TestData,
    pub actor: Option<ActorSnapshot>,
    pub ability: Option<AbilitySnapshot>,
    pub weapon: Option<WeaponSnapshot>,
    pub spell: Option<SpellSnapshot>,
    pub grimoire: Option<GrimoireSnapshot>,
    pub targets: Vec<ActorSnapshot>,
}

async fn lookup<T, Fut>(
    field: &'static str,
    id: Option<Uuid>,
    fetch: impl FnOnce(Uuid) -> Fut,
) -> Result<Option<T>, DomainError>
where
    Fut: Future<Output = Result<Option<T>, DomainError>>,
{
    let Some(id) = id else {
        return Ok(None);
    };
    fetch(id)
        .await?
        .map(Some)
        .ok_or_else(|| DomainError::unresolved(field, id))
}

impl TestContext {
    /// A context with no resolved documents.
    #[must_use]
    pub fn new(data: TestData) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    /// Resolves every reference named in `data`.
    ///
    /// This is the only suspension point of test preparation; everything
    /// after it is synchronous.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MissingReference` for a supplied reference
    /// that does not resolve, or the resolver's own error.
    pub async fn resolve(
        data: TestData,
        resolver: &dyn DocumentResolver,
    ) -> Result<Self, DomainError> {
        let actor = lookup("rolling_actor_id", data.rolling_actor_id, |id| {
            resolver.actor(id)
        })
        .await?;
        let ability = lookup("ability_id", data.ability_id, |id| resolver.ability(id)).await?;
        let weapon = lookup("weapon_id", data.weapon_id, |id| resolver.weapon(id)).await?;
        let spell = lookup("spell_id", data.spell_id, |id| resolver.spell(id)).await?;
        let grimoire = lookup("grimoire_id", data.grimoire_id, |id| resolver.grimoire(id)).await?;

        let mut targets = Vec::with_capacity(data.target_ids.len());
        for &id in &data.target_ids {
            let target = lookup("target_ids", Some(id), |id| resolver.actor(id)).await?;
            targets.extend(target);
        }

        Ok(Self {
            data,
            actor,
            ability,
            weapon,
            spell,
            grimoire,
            targets,
        })
    }

    /// The rolling actor, required by most kinds.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MissingReference` if no actor was supplied.
    pub fn require_actor(&self) -> Result<&ActorSnapshot, DomainError> {
        self.actor
            .as_ref()
            .ok_or_else(|| DomainError::missing("rolling_actor_id"))
    }

    /// # Errors
    ///
    /// Returns `DomainError::MissingReference` if no spell was supplied.
    pub fn require_spell(&self) -> Result<&SpellSnapshot, DomainError> {
        self.spell
            .as_ref()
            .ok_or_else(|| DomainError::missing("spell_id"))
    }

    /// Highest rating of `defense` among all targets; the hardest target
    /// governs a multi-target test.
    #[must_use]
    pub fn highest_defense(&self, defense: Defense) -> Option<i32> {
        self.targets.iter().map(|t| t.defenses.get(defense)).max()
    }

    /// Step of the ability in use, or of the fallback attribute when no
    /// ability was supplied.
    fn ability_or_attribute_step(&self, actor: &ActorSnapshot, fallback: Attribute) -> i32 {
        match &self.ability {
            Some(ability) => actor.ability_step(ability),
            None => actor.attribute_step(self.data.attribute.unwrap_or(fallback)),
        }
    }

    fn ability_strain(&self) -> StepValue {
        StepValue::new(self.ability.as_ref().map_or(0, |a| a.strain))
    }
}

/// Adds each listed global bonus of the actor as a named modifier.
fn apply_bonuses(step: &mut StepValue, actor: &ActorSnapshot, bonuses: &[GlobalBonus]) {
    for &bonus in bonuses {
        step.add_modifier(bonus.label(), actor.global_bonus(bonus));
    }
}

/// Target difficulty of a test that is opposed by `defense` when targets
/// are present, and uses a fixed difficulty otherwise. The data bag's
/// `defense` and `difficulty` take precedence over the kind's defaults.
fn opposed_or_fixed(
    ctx: &TestContext,
    config: &RulesConfig,
    defense: Option<Defense>,
    fixed: Option<i32>,
) -> StepValue {
    let defense = ctx.data.defense.or(defense);
    let opposed = defense.and_then(|d| ctx.highest_defense(d));
    let base = opposed
        .or(ctx.data.difficulty)
        .or(fixed)
        .unwrap_or(config.default_difficulty);
    StepValue::new(base)
}

fn no_strain(_ctx: &TestContext, _config: &RulesConfig) -> StepValue {
    StepValue::new(0)
}

fn no_target(_ctx: &TestContext, _config: &RulesConfig) -> Result<Option<StepValue>, DomainError> {
    Ok(None)
}
