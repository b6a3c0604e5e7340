//! The roll engine: evaluates prepared test parameters into a result.
//!
//! A [`TestRoll`] moves through three phases and never back:
//! `Unconfigured → DiceAssembled → Evaluated`. Evaluation happens at most
//! once; every later call returns the cached [`RollResult`].

use ed4e_core::error::DomainError;
use ed4e_core::rng::DeterministicRng;
use serde::Serialize;

use super::data::Successes;
use super::dice::{GroupOutcome, RollFormula};
use super::flavor::ChatFlavor;
use super::kinds::TestType;
use super::parameters::TestParameters;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RollPhase {
    Unconfigured,
    DiceAssembled,
    Evaluated,
}

/// Evaluated outcome of one test. Never changes once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RollResult {
    /// Sum of every group, never below 1.
    pub total: i32,
    /// Faces rolled across all groups, explosions included.
    pub num_dice: u32,
    pub is_rule_of_one: bool,
    pub is_basic_success: bool,
    pub is_success: bool,
    pub is_failure: bool,
    pub num_basic_extra_successes: u32,
    pub num_successes: u32,
    pub num_extra_successes: u32,
    pub groups: Vec<GroupOutcome>,
}

/// How a test is judged once its dice are known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Judgement {
    pub test_type: TestType,
    /// Target total; present for every test type with an outcome.
    pub target: Option<i32>,
    pub successes: Successes,
    pub extra_success_interval: i32,
}

/// Success counts of a non-effect test.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuccessCount {
    pub is_basic_success: bool,
    pub num_basic_extra_successes: u32,
    pub num_successes: u32,
    pub num_extra_successes: u32,
}

/// Counts successes of a roll of `total` against `target`.
///
/// Successes are only reported when the basic threshold was met or a
/// success was guaranteed. Extra successes below the target are clamped
/// to 0. A Rule of One roll scores nothing, basic extra successes
/// included. Counts saturate at `u32::MAX`.
#[must_use]
pub fn count_successes(
    total: i32,
    target: i32,
    successes: Successes,
    interval: i32,
    is_rule_of_one: bool,
) -> SuccessCount {
    let is_basic_success = total >= target;
    let margin = total.saturating_sub(target) / interval.max(1);
    let num_basic_extra_successes = u32::try_from(margin).unwrap_or(0);

    if is_rule_of_one || (!is_basic_success && successes.guaranteed == 0) {
        return SuccessCount {
            is_basic_success,
            ..SuccessCount::default()
        };
    }

    SuccessCount {
        is_basic_success,
        num_basic_extra_successes,
        num_successes: u32::from(is_basic_success)
            .saturating_add(num_basic_extra_successes)
            .saturating_add(successes.guaranteed)
            .saturating_add(successes.additional_extra),
        num_extra_successes: num_basic_extra_successes.saturating_add(successes.additional_extra),
    }
}

impl RollResult {
    /// Totals evaluated dice groups and judges the outcome.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MissingTarget` if a test with an outcome has
    /// no target.
    pub fn judge(groups: Vec<GroupOutcome>, judgement: &Judgement) -> Result<Self, DomainError> {
        let sum = groups.iter().map(|g| g.total).fold(0, i32::saturating_add);
        let total = sum.max(1);
        let num_dice = u32::try_from(groups.iter().map(GroupOutcome::num_faces).sum::<usize>())
            .unwrap_or(u32::MAX);
        let is_rule_of_one = num_dice >= 2 && i64::from(total) == i64::from(num_dice);

        if !judgement.test_type.has_outcome() {
            return Ok(Self {
                total,
                num_dice,
                is_rule_of_one,
                is_basic_success: false,
                is_success: true,
                is_failure: false,
                num_basic_extra_successes: 0,
                num_successes: 0,
                num_extra_successes: 0,
                groups,
            });
        }

        let target = judgement
            .target
            .ok_or_else(|| DomainError::MissingTarget(format!("{:?} test", judgement.test_type)))?;
        let count = count_successes(
            total,
            target,
            judgement.successes,
            judgement.extra_success_interval,
            is_rule_of_one,
        );
        let is_success = !is_rule_of_one && count.num_successes > 0;

        Ok(Self {
            total,
            num_dice,
            is_rule_of_one,
            is_basic_success: count.is_basic_success,
            is_success,
            is_failure: !is_success,
            num_basic_extra_successes: count.num_basic_extra_successes,
            num_successes: count.num_successes,
            num_extra_successes: count.num_extra_successes,
            groups,
        })
    }
}

/// One roll of a prepared test.
#[derive(Debug, Clone)]
pub struct TestRoll {
    parameters: TestParameters,
    formula: Option<RollFormula>,
    result: Option<RollResult>,
}

impl TestRoll {
    #[must_use]
    pub fn new(parameters: TestParameters) -> Self {
        Self {
            parameters,
            formula: None,
            result: None,
        }
    }

    #[must_use]
    pub fn parameters(&self) -> &TestParameters {
        &self.parameters
    }

    #[must_use]
    pub fn phase(&self) -> RollPhase {
        match (&self.formula, &self.result) {
            (_, Some(_)) => RollPhase::Evaluated,
            (Some(_), None) => RollPhase::DiceAssembled,
            (None, None) => RollPhase::Unconfigured,
        }
    }

    /// Builds the dice expression, once.
    pub fn assemble(&mut self) -> &RollFormula {
        let parameters = &self.parameters;
        self.formula
            .get_or_insert_with(|| RollFormula::assemble(parameters))
    }

    /// Rolls the dice and judges the outcome. Later calls return the same
    /// result without touching `rng`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MissingTarget` if a test with an outcome has
    /// no target; no dice are rolled in that case.
    pub fn evaluate(&mut self, rng: &mut dyn DeterministicRng) -> Result<&RollResult, DomainError> {
        let result = match self.result.take() {
            Some(result) => result,
            None => self.roll(rng)?,
        };
        Ok(self.result.insert(result))
    }

    #[must_use]
    pub fn result(&self) -> Option<&RollResult> {
        self.result.as_ref()
    }

    /// Presentation data for the chat layer, available once evaluated.
    #[must_use]
    pub fn flavor(&self) -> Option<ChatFlavor> {
        let formula = self.formula.as_ref()?;
        let result = self.result.as_ref()?;
        Some(ChatFlavor::new(&self.parameters, formula, result))
    }

    fn roll(&mut self, rng: &mut dyn DeterministicRng) -> Result<RollResult, DomainError> {
        let judgement = Judgement {
            test_type: self.parameters.test_type(),
            target: self.parameters.target().map(|t| t.total()),
            successes: self.parameters.successes(),
            extra_success_interval: self.parameters.evaluation().extra_success_interval,
        };
        if judgement.test_type.has_outcome() && judgement.target.is_none() {
            return Err(DomainError::MissingTarget(self.parameters.kind().to_string()));
        }
        let max_explosions = self.parameters.evaluation().max_explosions;

        let groups = self
            .assemble()
            .groups
            .iter()
            .map(|group| group.roll(&mut *rng, max_explosions))
            .collect();
        RollResult::judge(groups, &judgement)
    }
}
