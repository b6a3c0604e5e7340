//! Step values: a base plus individually named modifiers.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A quantity made of a base value and named modifiers.
///
/// `total` is kept equal to `base + Σ modifiers` by every mutator, so it
/// can be read without recomputation and is never stale. The sum saturates
/// at the bounds of `i32`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StepValue {
    base: i32,
    modifiers: BTreeMap<String, i32>,
    total: i32,
}

impl StepValue {
    #[must_use]
    pub fn new(base: i32) -> Self {
        Self {
            base,
            modifiers: BTreeMap::new(),
            total: base,
        }
    }

    /// Builder form of [`Self::add_modifier`].
    #[must_use]
    pub fn with_modifier(mut self, label: impl Into<String>, value: i32) -> Self {
        self.add_modifier(label, value);
        self
    }

    #[must_use]
    pub fn base(&self) -> i32 {
        self.base
    }

    #[must_use]
    pub fn modifiers(&self) -> &BTreeMap<String, i32> {
        &self.modifiers
    }

    #[must_use]
    pub fn total(&self) -> i32 {
        self.total
    }

    pub fn set_base(&mut self, base: i32) {
        self.base = base;
        self.recompute();
    }

    /// Adds `value` to the modifier named `label`, creating it if absent.
    /// Zero-valued modifiers are not recorded.
    pub fn add_modifier(&mut self, label: impl Into<String>, value: i32) {
        if value == 0 {
            return;
        }
        let label = label.into();
        let entry = self.modifiers.entry(label).or_insert(0);
        *entry = entry.saturating_add(value);
        if *entry == 0 {
            self.modifiers.retain(|_, v| *v != 0);
        }
        self.recompute();
    }

    /// Inserts a modifier only if no modifier with that label exists yet.
    /// Returns whether it was inserted.
    pub fn inject_modifier(&mut self, label: &str, value: i32) -> bool {
        if value == 0 || self.modifiers.contains_key(label) {
            return false;
        }
        self.modifiers.insert(label.to_owned(), value);
        self.recompute();
        true
    }

    pub fn remove_modifier(&mut self, label: &str) -> Option<i32> {
        let removed = self.modifiers.remove(label);
        self.recompute();
        removed
    }

    fn recompute(&mut self) {
        self.total = self
            .modifiers
            .values()
            .fold(self.base, |total, &m| total.saturating_add(m));
    }
}

/// Caller-supplied step value. `total` is always derived, never accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepSource {
    pub base: i32,
    pub modifiers: BTreeMap<String, i32>,
}

impl From<StepSource> for StepValue {
    fn from(source: StepSource) -> Self {
        source
            .modifiers
            .into_iter()
            .fold(Self::new(source.base), |value, (label, m)| {
                value.with_modifier(label, m)
            })
    }
}

/// A target difficulty: a step value with visibility and the tokens that
/// are being tested against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetDifficulty {
    #[serde(flatten)]
    pub value: StepValue,
    /// Whether players may see the difficulty.
    pub public: bool,
    pub tokens: BTreeSet<Uuid>,
}

impl TargetDifficulty {
    #[must_use]
    pub fn total(&self) -> i32 {
        self.value.total()
    }
}

/// Caller-supplied target difficulty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetSource {
    pub base: i32,
    pub modifiers: BTreeMap<String, i32>,
    pub public: Option<bool>,
    pub tokens: BTreeSet<Uuid>,
}
