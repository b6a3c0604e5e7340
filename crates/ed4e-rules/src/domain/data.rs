//! The loosely-typed data bag a caller supplies to prepare a test.

use std::collections::BTreeMap;

use ed4e_core::document::{Attribute, Defense};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::config::{AstralPollution, CombatChannel};
use super::kinds::{RollType, TestKind};
use super::step_value::{StepSource, TargetSource};

/// Where the damage of a damage test comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageSource {
    Weapon,
    Unarmed,
    Spell,
    /// Damage with no source document; the step must be supplied.
    Arbitrary,
}

/// Successes granted independently of the dice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Successes {
    pub guaranteed: u32,
    pub additional_extra: u32,
}

/// Input for preparing a test. Each kind reads the subset it needs; the
/// `step`, `strain`, and `target` fields, when present, are used as-is
/// instead of being derived.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TestData {
    pub kind: TestKind,
    /// Presentation override; defaults to the kind's own roll type.
    pub roll_type: Option<RollType>,
    pub rolling_actor_id: Option<Uuid>,
    pub ability_id: Option<Uuid>,
    pub attribute: Option<Attribute>,
    pub weapon_id: Option<Uuid>,
    pub spell_id: Option<Uuid>,
    pub grimoire_id: Option<Uuid>,
    /// Actors being tested against.
    pub target_ids: Vec<Uuid>,
    /// Defense of the targets to test against, overriding the kind's default.
    pub defense: Option<Defense>,
    /// Fixed difficulty for tests without targets.
    pub difficulty: Option<i32>,
    pub combat_channel: Option<CombatChannel>,
    pub damage_source: Option<DamageSource>,
    pub astral_pollution: Option<AstralPollution>,
    /// Situational step modifiers added to a derived step.
    pub modifiers: BTreeMap<String, i32>,
    pub step: Option<StepSource>,
    pub strain: Option<StepSource>,
    pub target: Option<TargetSource>,
    pub public_target: Option<bool>,
    /// Karma points spent.
    pub karma: u32,
    /// Devotion points spent.
    pub devotion: u32,
    pub karma_step: Option<i32>,
    pub devotion_step: Option<i32>,
    /// Additional exploding dice groups, keyed by label, valued by step.
    pub extra_dice: BTreeMap<String, i32>,
    pub successes: Successes,
}

impl TestData {
    #[must_use]
    pub fn new(kind: TestKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }
}
