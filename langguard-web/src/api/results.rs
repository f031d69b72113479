//! Stored pipeline results

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::models::{PipelineResult, SessionId};
use crate::AppState;

/// GET /results/:session_id
pub async fn get_result(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<PipelineResult>> {
    let session = SessionId::parse(&session_id)
        .ok_or_else(|| ApiError::NotFound(format!("Session {}", session_id)))?;

    db::results::load_result(&state.db, &session)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Session {}", session)))
}

pub fn result_routes() -> Router<AppState> {
    Router::new().route("/results/:session_id", get(get_result))
}
