//! Rules configuration injected into test preparation.
//!
//! Holds the rule constants and lookup tables that the preparation
//! functions consult. A `RulesConfig` is built once (from defaults or a
//! YAML document) and passed by reference; nothing reads it globally.

use std::collections::BTreeMap;

use ed4e_core::document::{GlobalBonus, WeaponType};
use ed4e_core::error::DomainError;
use serde::{Deserialize, Serialize};

/// The channel an attack or its damage travels through. Decides which
/// global bonuses apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatChannel {
    Melee,
    Ranged,
    Unarmed,
    Spell,
}

impl From<WeaponType> for CombatChannel {
    fn from(weapon_type: WeaponType) -> Self {
        match weapon_type {
            WeaponType::Melee => Self::Melee,
            WeaponType::Missile | WeaponType::Thrown => Self::Ranged,
            WeaponType::Unarmed => Self::Unarmed,
        }
    }
}

/// Astral pollution of the region a spell is cast in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AstralPollution {
    Safe,
    Open,
    Tainted,
    Corrupt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Global bonuses added to attack tests, per channel.
    pub attack_bonuses: BTreeMap<CombatChannel, Vec<GlobalBonus>>,
    /// Global bonuses added to damage tests, per channel.
    pub damage_bonuses: BTreeMap<CombatChannel, Vec<GlobalBonus>>,
    /// Global bonuses added to spellcasting and thread weaving tests.
    pub spell_test_bonuses: Vec<GlobalBonus>,
    /// Global bonuses added to every ability test.
    pub action_bonuses: Vec<GlobalBonus>,
    pub initiative_bonuses: Vec<GlobalBonus>,
    /// Step modifier for spellcasting from a grimoire the caster does not own.
    pub foreign_grimoire_penalty: i32,
    /// Step modifier per wound on non-effect tests.
    pub wound_penalty: i32,
    pub default_karma_step: i32,
    pub default_devotion_step: i32,
    /// Warping test step per pollution level; levels without an entry
    /// cannot produce a warping test.
    pub warping_steps: BTreeMap<AstralPollution, i32>,
    /// Margin over the target difficulty worth one extra success.
    pub extra_success_interval: i32,
    /// Upper bound on rerolls of a single exploding die.
    pub max_explosions: u32,
    /// Most karma or devotion points a single test may spend, per resource.
    pub max_resource_points: u32,
    /// Most extra dice entries a single test may carry.
    pub max_extra_dice: usize,
    /// Difficulty of unopposed tests that name no difficulty of their own.
    pub default_difficulty: i32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            attack_bonuses: BTreeMap::from([
                (
                    CombatChannel::Melee,
                    vec![GlobalBonus::AllAttacks, GlobalBonus::AllCloseAttacks],
                ),
                (
                    CombatChannel::Ranged,
                    vec![GlobalBonus::AllAttacks, GlobalBonus::AllRangedAttacks],
                ),
                (
                    CombatChannel::Unarmed,
                    vec![
                        GlobalBonus::AllAttacks,
                        GlobalBonus::AllCloseAttacks,
                        GlobalBonus::AllUnarmedAttacks,
                    ],
                ),
                (
                    CombatChannel::Spell,
                    vec![GlobalBonus::AllAttacks, GlobalBonus::AllSpellTests],
                ),
            ]),
            damage_bonuses: BTreeMap::from([
                (
                    CombatChannel::Melee,
                    vec![GlobalBonus::AllDamage, GlobalBonus::AllCloseDamage],
                ),
                (
                    CombatChannel::Ranged,
                    vec![GlobalBonus::AllDamage, GlobalBonus::AllRangedDamage],
                ),
                (
                    CombatChannel::Unarmed,
                    vec![GlobalBonus::AllDamage, GlobalBonus::AllCloseDamage],
                ),
                (
                    CombatChannel::Spell,
                    vec![GlobalBonus::AllEffects, GlobalBonus::AllSpellEffects],
                ),
            ]),
            spell_test_bonuses: vec![GlobalBonus::AllSpellTests],
            action_bonuses: vec![GlobalBonus::AllActions],
            initiative_bonuses: vec![GlobalBonus::Initiative],
            foreign_grimoire_penalty: -2,
            wound_penalty: -1,
            default_karma_step: 3,
            default_devotion_step: 3,
            warping_steps: BTreeMap::from([
                (AstralPollution::Open, 10),
                (AstralPollution::Tainted, 15),
                (AstralPollution::Corrupt, 20),
            ]),
            extra_success_interval: 5,
            max_explosions: 1000,
            max_resource_points: 10,
            max_extra_dice: 10,
            default_difficulty: 0,
        }
    }
}

impl RulesConfig {
    /// Parses a configuration from YAML. Keys that are omitted keep their
    /// default value.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the document does not parse or
    /// describes an unusable configuration.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, DomainError> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| DomainError::Validation(format!("invalid rules configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `DomainError::Validation` if a constant is out of range.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.extra_success_interval < 1 {
            return Err(DomainError::Validation(
                "extra_success_interval must be at least 1".to_owned(),
            ));
        }
        if self.max_explosions == 0 {
            return Err(DomainError::Validation(
                "max_explosions must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn attack_bonuses(&self, channel: CombatChannel) -> &[GlobalBonus] {
        self.attack_bonuses.get(&channel).map(Vec::as_slice).unwrap_or_default()
    }

    #[must_use]
    pub fn damage_bonuses(&self, channel: CombatChannel) -> &[GlobalBonus] {
        self.damage_bonuses.get(&channel).map(Vec::as_slice).unwrap_or_default()
    }
}
