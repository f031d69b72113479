//! Server-Sent Events for pipeline progress

use crate::AppState;
use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;

/// GET /events
///
/// Streams every `PipelineEvent`:
/// - SessionStarted
/// - StageCompleted (one per finished stage)
/// - SessionCompleted
/// - SessionFailed
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    langguard_common::sse::pipeline_event_stream(&state.event_bus, "langguard-web")
}
