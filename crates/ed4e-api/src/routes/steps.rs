//! Step table lookups.

use axum::extract::Path;
use axum::{Json, Router, routing::get};

use ed4e_rules::application::query_handlers::{self, StepView};

use crate::state::AppState;

/// GET /{step}
async fn get_step(Path(step): Path<i32>) -> Json<StepView> {
    Json(query_handlers::describe_step(step))
}

/// Returns the router for step table lookups.
pub fn router() -> Router<AppState> {
    Router::new().route("/{step}", get(get_step))
}
