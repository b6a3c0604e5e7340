//! Read-only document snapshots and the resolver that produces them.
//!
//! The host owns actors and items. Before a test is prepared, every
//! reference the test names is resolved to one of these snapshots; the
//! rules crate never touches a live document.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// The six attributes of an ED4E character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Dexterity,
    Strength,
    Toughness,
    Perception,
    Willpower,
    Charisma,
}

/// The three defense ratings used as target difficulties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Defense {
    Physical,
    Mystical,
    Social,
}

/// Defense ratings of an actor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defenses {
    pub physical: i32,
    pub mystical: i32,
    pub social: i32,
}

impl Defenses {
    /// Returns the rating for one defense.
    #[must_use]
    pub fn get(&self, defense: Defense) -> i32 {
        match defense {
            Defense::Physical => self.physical,
            Defense::Mystical => self.mystical,
            Defense::Social => self.social,
        }
    }
}

/// Named actor-wide bonuses that apply to whole categories of tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlobalBonus {
    AllActions,
    AllAttacks,
    AllCloseAttacks,
    AllRangedAttacks,
    AllUnarmedAttacks,
    AllSpellTests,
    AllEffects,
    AllDamage,
    AllCloseDamage,
    AllRangedDamage,
    AllSpellEffects,
    Initiative,
}

impl GlobalBonus {
    /// Display label, also used as the modifier name on step values.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::AllActions => "all actions",
            Self::AllAttacks => "all attacks",
            Self::AllCloseAttacks => "all close attacks",
            Self::AllRangedAttacks => "all ranged attacks",
            Self::AllUnarmedAttacks => "all unarmed attacks",
            Self::AllSpellTests => "all spell tests",
            Self::AllEffects => "all effects",
            Self::AllDamage => "all damage",
            Self::AllCloseDamage => "all close damage",
            Self::AllRangedDamage => "all ranged damage",
            Self::AllSpellEffects => "all spell effects",
            Self::Initiative => "initiative",
        }
    }
}

/// Snapshot of an actor's numeric state at the time of the test.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorSnapshot {
    pub id: Uuid,
    pub name: String,
    /// Attribute steps, keyed by attribute.
    pub attributes: BTreeMap<Attribute, i32>,
    pub defenses: Defenses,
    /// Karma step, if the actor can spend karma.
    pub karma_step: Option<i32>,
    /// Devotion step, if the actor follows a passion.
    pub devotion_step: Option<i32>,
    pub global_bonuses: BTreeMap<GlobalBonus, i32>,
    /// Current number of wounds.
    pub wounds: u32,
    /// Initiative penalty of worn armor and shields, as a non-negative number.
    pub armor_initiative_penalty: i32,
}

impl ActorSnapshot {
    /// Returns the step of an attribute, or 0 if the actor does not have it.
    #[must_use]
    pub fn attribute_step(&self, attribute: Attribute) -> i32 {
        self.attributes.get(&attribute).copied().unwrap_or_default()
    }

    /// Returns the value of a global bonus, or 0 if unset.
    #[must_use]
    pub fn global_bonus(&self, bonus: GlobalBonus) -> i32 {
        self.global_bonuses.get(&bonus).copied().unwrap_or_default()
    }

    /// Returns the step of an ability used by this actor: the linked
    /// attribute step plus the ability's rank.
    #[must_use]
    pub fn ability_step(&self, ability: &AbilitySnapshot) -> i32 {
        ability
            .attribute
            .map_or(0, |attribute| self.attribute_step(attribute))
            .saturating_add(ability.rank)
    }
}

/// A talent, skill, or devotion the actor rolls with.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilitySnapshot {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Option<Uuid>,
    pub attribute: Option<Attribute>,
    pub rank: i32,
    /// Strain paid each time the ability is used.
    pub strain: i32,
    /// Defense of the target the ability is tested against, if any.
    pub defense_target: Option<Defense>,
    /// Fixed difficulty for abilities that are not opposed.
    pub difficulty: Option<i32>,
}

/// How a weapon is used, which decides the combat channel of its attacks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponType {
    #[default]
    Melee,
    Missile,
    Thrown,
    Unarmed,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponSnapshot {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Option<Uuid>,
    pub weapon_type: WeaponType,
    /// Damage step added to the wielder's strength step.
    pub damage_step: i32,
    pub strain: i32,
}

/// Target difficulty of casting a spell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum CastingDifficulty {
    /// A fixed difficulty number.
    Fixed(i32),
    /// The highest given defense among the spell's targets.
    TargetDefense(Defense),
}

impl Default for CastingDifficulty {
    fn default() -> Self {
        Self::TargetDefense(Defense::Mystical)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellSnapshot {
    pub id: Uuid,
    pub name: String,
    pub circle: u32,
    /// Number of threads that must be woven before casting.
    pub threads: u32,
    pub weaving_difficulty: i32,
    pub casting_difficulty: CastingDifficulty,
    /// Effect step bonus added to the caster's willpower step.
    pub effect_bonus: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GrimoireSnapshot {
    pub id: Uuid,
    pub owner_id: Option<Uuid>,
    pub spell_ids: Vec<Uuid>,
}

impl GrimoireSnapshot {
    /// Whether the grimoire belongs to the given actor.
    #[must_use]
    pub fn is_owned_by(&self, actor_id: Uuid) -> bool {
        self.owner_id == Some(actor_id)
    }
}

/// Resolves opaque document references to snapshots.
///
/// `Ok(None)` means the reference does not exist; `Err` is reserved for
/// failures of the lookup itself.
#[async_trait]
pub trait DocumentResolver: Send + Sync {
    async fn actor(&self, id: Uuid) -> Result<Option<ActorSnapshot>, DomainError>;

    async fn ability(&self, id: Uuid) -> Result<Option<AbilitySnapshot>, DomainError>;

    async fn weapon(&self, id: Uuid) -> Result<Option<WeaponSnapshot>, DomainError>;

    async fn spell(&self, id: Uuid) -> Result<Option<SpellSnapshot>, DomainError>;

    async fn grimoire(&self, id: Uuid) -> Result<Option<GrimoireSnapshot>, DomainError>;
}

/// An in-memory bundle of snapshots, typically posted by the host along
/// with the test it wants resolved.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSet {
    pub actors: Vec<ActorSnapshot>,
    pub abilities: Vec<AbilitySnapshot>,
    pub weapons: Vec<WeaponSnapshot>,
    pub spells: Vec<SpellSnapshot>,
    pub grimoires: Vec<GrimoireSnapshot>,
}

impl DocumentSet {
    #[must_use]
    pub fn with_actor(mut self, actor: ActorSnapshot) -> Self {
        self.actors.push(actor);
        self
    }

    #[must_use]
    pub fn with_ability(mut self, ability: AbilitySnapshot) -> Self {
        self.abilities.push(ability);
        self
    }

    #[must_use]
    pub fn with_weapon(mut self, weapon: WeaponSnapshot) -> Self {
        self.weapons.push(weapon);
        self
    }

    #[must_use]
    pub fn with_spell(mut self, spell: SpellSnapshot) -> Self {
        self.spells.push(spell);
        self
    }

    #[must_use]
    pub fn with_grimoire(mut self, grimoire: GrimoireSnapshot) -> Self {
        self.grimoires.push(grimoire);
        self
    }
}

#[async_trait]
impl DocumentResolver for DocumentSet {
    async fn actor(&self, id: Uuid) -> Result<Option<ActorSnapshot>, DomainError> {
        Ok(self.actors.iter().find(|a| a.id == id).cloned())
    }

    async fn ability(&self, id: Uuid) -> Result<Option<AbilitySnapshot>, DomainError> {
        Ok(self.abilities.iter().find(|a| a.id == id).cloned())
    }

    async fn weapon(&self, id: Uuid) -> Result<Option<WeaponSnapshot>, DomainError> {
        Ok(self.weapons.iter().find(|w| w.id == id).cloned())
    }

    async fn spell(&self, id: Uuid) -> Result<Option<SpellSnapshot>, DomainError> {
        Ok(self.spells.iter().find(|s| s.id == id).cloned())
    }

    async fn grimoire(&self, id: Uuid) -> Result<Option<GrimoireSnapshot>, DomainError> {
        Ok(self.grimoires.iter().find(|g| g.id == id).cloned())
    }
}
