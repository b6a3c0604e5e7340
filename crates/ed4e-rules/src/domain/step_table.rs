//! The universal step table.
//!
//! Every test in the game starts here: a step number is looked up and the
//! dice pool printed next to it is rolled. The table is static rules data
//! and must match the published progression exactly.

/// Lowest step in the table. Anything below is clamped to it.
pub const MIN_STEP: i32 = 0;

/// Highest step in the table. Anything above is clamped to it.
pub const MAX_STEP: i32 = 39;

/// A run of identical dice, e.g. `2d6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DieTerm {
    pub count: u32,
    pub faces: u32,
}

/// The dice pool for one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepDice {
    /// Printed formula, e.g. `1d12+1d8+1d6`.
    pub formula: &'static str,
    pub terms: &'static [DieTerm],
    /// Static modifier added to the dice sum.
    pub modifier: i32,
}

impl StepDice {
    /// Number of dice rolled before any explosion.
    #[must_use]
    pub fn dice_count(&self) -> u32 {
        self.terms.iter().map(|t| t.count).sum()
    }
}

macro_rules! row {
    ($formula:literal, [$(($count:literal, $faces:literal)),+], $modifier:literal) => {
        StepDice {
            formula: $formula,
            terms: &[$(DieTerm { count: $count, faces: $faces }),+],
            modifier: $modifier,
        }
    };
}

#[allow(clippy::cast_sign_loss)]
const TABLE_LEN: usize = (MAX_STEP - MIN_STEP + 1) as usize;

static STEP_TABLE: [StepDice; TABLE_LEN] = [
    // Step 0 and below: a single die with a penalty.
    row!("1d4-2", [(1, 4)], -2),
    row!("1d4-1", [(1, 4)], -1),
    row!("1d4", [(1, 4)], 0),
    row!("1d6", [(1, 6)], 0),
    row!("1d8", [(1, 8)], 0),
    row!("1d10", [(1, 10)], 0),
    row!("1d12", [(1, 12)], 0),
    row!("2d6", [(2, 6)], 0),
    row!("1d8+1d6", [(1, 8), (1, 6)], 0),
    row!("2d8", [(2, 8)], 0),
    // 10
    row!("1d10+1d8", [(1, 10), (1, 8)], 0),
    row!("2d10", [(2, 10)], 0),
    row!("1d12+1d10", [(1, 12), (1, 10)], 0),
    row!("2d12", [(2, 12)], 0),
    row!("1d12+2d6", [(1, 12), (2, 6)], 0),
    row!("1d12+1d8+1d6", [(1, 12), (1, 8), (1, 6)], 0),
    row!("1d12+2d8", [(1, 12), (2, 8)], 0),
    row!("1d12+1d10+1d8", [(1, 12), (1, 10), (1, 8)], 0),
    row!("1d20+2d6", [(1, 20), (2, 6)], 0),
    row!("1d20+1d8+1d6", [(1, 20), (1, 8), (1, 6)], 0),
    // 20
    row!("1d20+2d8", [(1, 20), (2, 8)], 0),
    row!("1d20+1d10+1d8", [(1, 20), (1, 10), (1, 8)], 0),
    row!("1d20+2d10", [(1, 20), (2, 10)], 0),
    row!("1d20+1d12+1d10", [(1, 20), (1, 12), (1, 10)], 0),
    row!("1d20+2d12", [(1, 20), (2, 12)], 0),
    row!("1d20+1d12+2d6", [(1, 20), (1, 12), (2, 6)], 0),
    row!("1d20+1d12+1d8+1d6", [(1, 20), (1, 12), (1, 8), (1, 6)], 0),
    row!("1d20+1d12+2d8", [(1, 20), (1, 12), (2, 8)], 0),
    row!("1d20+1d12+1d10+1d8", [(1, 20), (1, 12), (1, 10), (1, 8)], 0),
    row!("2d20+2d6", [(2, 20), (2, 6)], 0),
    // 30
    row!("2d20+1d8+1d6", [(2, 20), (1, 8), (1, 6)], 0),
    row!("2d20+2d8", [(2, 20), (2, 8)], 0),
    row!("2d20+1d10+1d8", [(2, 20), (1, 10), (1, 8)], 0),
    row!("2d20+2d10", [(2, 20), (2, 10)], 0),
    row!("2d20+1d12+1d10", [(2, 20), (1, 12), (1, 10)], 0),
    row!("2d20+2d12", [(2, 20), (2, 12)], 0),
    row!("2d20+1d12+2d6", [(2, 20), (1, 12), (2, 6)], 0),
    row!("2d20+1d12+1d8+1d6", [(2, 20), (1, 12), (1, 8), (1, 6)], 0),
    row!("2d20+1d12+2d8", [(2, 20), (1, 12), (2, 8)], 0),
    row!("2d20+1d12+1d10+1d8", [(2, 20), (1, 12), (1, 10), (1, 8)], 0),
];

/// Clamps a step into the table's domain.
#[must_use]
pub fn clamp_step(step: i32) -> i32 {
    step.clamp(MIN_STEP, MAX_STEP)
}

/// Returns the dice pool for a step. Total over all integers.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub fn step_dice(step: i32) -> &'static StepDice {
    &STEP_TABLE[(clamp_step(step) - MIN_STEP) as usize]
}

/// Returns the printed dice formula for a step.
#[must_use]
pub fn dice_formula(step: i32) -> &'static str {
    step_dice(step).formula
}
