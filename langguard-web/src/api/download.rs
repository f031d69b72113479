//! Artifact downloads
//!
//! Artifacts are served as attachments under fixed names
//! (`transcript.txt`, `translation.txt`, `translated_audio.mp3`).

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tracing::debug;

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::models::{ArtifactKind, SessionId};
use crate::AppState;

/// GET /download/:artifact/:session_id
pub async fn download_artifact(
    State(state): State<AppState>,
    Path((artifact, session_id)): Path<(String, String)>,
) -> ApiResult<Response> {
    let kind: ArtifactKind = artifact.parse().map_err(ApiError::NotFound)?;
    let session = SessionId::parse(&session_id)
        .ok_or_else(|| ApiError::NotFound(format!("Session {}", session_id)))?;

    let content = db::artifacts::load_artifact(&state.db, &session, kind)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("{} for session {}", kind, session)))?;

    debug!(session_id = %session, artifact = %kind, bytes = content.len(), "Serving artifact");

    Ok((
        [
            (header::CONTENT_TYPE, kind.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", kind.download_name()),
            ),
        ],
        content,
    )
        .into_response())
}

pub fn download_routes() -> Router<AppState> {
    Router::new().route("/download/:artifact/:session_id", get(download_artifact))
}
