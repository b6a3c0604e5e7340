//! Routes that prepare and roll tests.

use axum::extract::State;
use axum::{Json, Router, routing::post};
use ed4e_core::document::DocumentSet;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use ed4e_rules::application::command_handlers::{self, RollRecord};
use ed4e_rules::application::query_handlers::{self, PreparedTestView};
use ed4e_rules::domain::commands;
use ed4e_rules::domain::data::TestData;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /prepare and POST /roll.
#[derive(Debug, Deserialize)]
pub struct TestRequest {
    /// The test's data bag.
    pub test: TestData,
    /// Actor rolling the test, if rolled through an actor.
    #[serde(default)]
    pub actor_id: Option<Uuid>,
    /// Snapshots of every document the test references.
    #[serde(default)]
    pub documents: DocumentSet,
}

/// POST /prepare
#[instrument(skip(state, request), fields(kind = %request.test.kind))]
async fn prepare_test(
    State(state): State<AppState>,
    Json(request): Json<TestRequest>,
) -> Result<Json<PreparedTestView>, ApiError> {
    let view = query_handlers::handle_prepare_test(
        request.test,
        request.actor_id,
        &state.config,
        &request.documents,
    )
    .await?;

    Ok(Json(view))
}

/// POST /roll
#[instrument(skip(state, request), fields(kind = %request.test.kind))]
async fn roll_test(
    State(state): State<AppState>,
    Json(request): Json<TestRequest>,
) -> Result<Json<RollRecord>, ApiError> {
    let command = commands::RollTest {
        correlation_id: Uuid::new_v4(),
        data: request.test,
        actor_id: request.actor_id,
    };

    info!(correlation_id = %command.correlation_id, "handling roll_test command");

    let record = command_handlers::handle_roll_test(
        &command,
        &state.config,
        state.clock.as_ref(),
        &state.rng,
        &request.documents,
    )
    .await?;

    Ok(Json(record))
}

/// Returns the router for test resolution.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/prepare", post(prepare_test))
        .route("/roll", post(roll_test))
}
