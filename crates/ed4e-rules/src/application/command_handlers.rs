//! Command handlers for the test resolution engine.
//!
//! Handlers resolve documents, prepare the test, and roll it. Document
//! resolution is the only await; the RNG is locked only for the
//! synchronous evaluation that follows.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use ed4e_core::clock::Clock;
use ed4e_core::command::Command;
use ed4e_core::document::DocumentResolver;
use ed4e_core::error::DomainError;
use ed4e_core::rng::DeterministicRng;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::domain::commands::RollTest;
use crate::domain::config::RulesConfig;
use crate::domain::flavor::ChatFlavor;
use crate::domain::parameters::TestParameters;
use crate::domain::roll::{RollResult, TestRoll};

/// Immutable record of one rolled test, ready to be persisted or posted
/// to chat by the host.
#[derive(Debug, Clone, Serialize)]
pub struct RollRecord {
    pub roll_id: Uuid,
    pub correlation_id: Uuid,
    pub rolled_at: DateTime<Utc>,
    pub parameters: TestParameters,
    pub result: RollResult,
    pub flavor: ChatFlavor,
}

/// Handles the `RollTest` command: prepares the test from its data and
/// documents, then rolls and evaluates it.
///
/// # Errors
///
/// Returns `DomainError` if a reference does not resolve, the data is
/// inconsistent with the test kind, or the RNG mutex is poisoned.
pub async fn handle_roll_test(
    command: &RollTest,
    config: &RulesConfig,
    clock: &dyn Clock,
    rng: &Mutex<dyn DeterministicRng + Send>,
    resolver: &dyn DocumentResolver,
) -> Result<RollRecord, DomainError> {
    let data = command.data.clone();
    let parameters = match command.actor_id {
        Some(actor_id) => TestParameters::from_actor(data, actor_id, config, resolver).await?,
        None => TestParameters::from_data(data, config, resolver).await?,
    };

    let mut roll = TestRoll::new(parameters);
    // Lock RNG only for the synchronous evaluation, never across an await.
    {
        let mut rng_guard = rng
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("RNG mutex poisoned: {e}")))?;
        roll.evaluate(&mut *rng_guard)?;
    }

    let (Some(result), Some(flavor)) = (roll.result().cloned(), roll.flavor()) else {
        return Err(DomainError::Infrastructure(
            "evaluated roll has no result".to_owned(),
        ));
    };
    debug!(
        command_type = command.command_type(),
        formula = %flavor.formula,
        total = result.total,
        successes = result.num_successes,
        rule_of_one = result.is_rule_of_one,
        "test rolled"
    );

    Ok(RollRecord {
        roll_id: Uuid::now_v7(),
        correlation_id: command.correlation_id(),
        rolled_at: clock.now(),
        parameters: roll.parameters().clone(),
        result,
        flavor,
    })
}
