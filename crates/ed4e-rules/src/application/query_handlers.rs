//! Query handlers for the test resolution engine.
//!
//! Queries never roll dice. They expose the step table and let a host
//! preview a prepared test before committing to the roll.

use ed4e_core::document::DocumentResolver;
use ed4e_core::error::DomainError;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::config::RulesConfig;
use crate::domain::data::TestData;
use crate::domain::dice::RollFormula;
use crate::domain::parameters::TestParameters;
use crate::domain::step_table::{clamp_step, step_dice};

/// Read-only view of one row of the step table.
#[derive(Debug, Serialize)]
pub struct StepView {
    /// The step asked for.
    pub step: i32,
    /// The table row it resolves to.
    pub table_step: i32,
    /// Printed dice pool, e.g. `2d6`.
    pub dice: &'static str,
    /// Dice rolled before explosions.
    pub dice_count: u32,
}

/// Read-only view of a prepared, unrolled test.
#[derive(Debug, Serialize)]
pub struct PreparedTestView {
    pub parameters: TestParameters,
    /// The exploding dice expression the roll would use.
    pub formula: String,
}

/// Looks up a step in the step table. Every integer has an answer.
#[must_use]
pub fn describe_step(step: i32) -> StepView {
    let dice = step_dice(step);
    StepView {
        step,
        table_step: clamp_step(step),
        dice: dice.formula,
        dice_count: dice.dice_count(),
    }
}

/// Prepares a test without rolling it.
///
/// # Errors
///
/// Returns `DomainError` under the same conditions as preparing the test
/// for a roll.
pub async fn handle_prepare_test(
    data: TestData,
    actor_id: Option<Uuid>,
    config: &RulesConfig,
    resolver: &dyn DocumentResolver,
) -> Result<PreparedTestView, DomainError> {
    let parameters = match actor_id {
        Some(actor_id) => TestParameters::from_actor(data, actor_id, config, resolver).await?,
        None => TestParameters::from_data(data, config, resolver).await?,
    };
    let formula = RollFormula::assemble(&parameters).to_string();
    Ok(PreparedTestView {
        parameters,
        formula,
    })
}
