//! Error types for langguard-web
//!
//! `PipelineError` is the stage-level taxonomy: every variant aborts the
//! invocation that raised it. `ApiError` is what HTTP handlers return; it
//! renders as `{ "error": { "code", "message" } }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Pipeline stage failures
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Neither an upload nor a URL was supplied
    #[error("Please either upload a file or provide a URL")]
    MissingInput,

    /// Extension outside the allow-list of the declared media kind
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// URL without scheme or host
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Transport error or non-success status while fetching a URL
    #[error("Failed to download file from URL: {0}")]
    DownloadFailed(String),

    /// Document, image or video could not be turned into text/audio
    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    /// Recognition job failed, or the provider rejected a call
    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    /// Recognition job did not reach a terminal state in time
    #[error("Transcription timed out after {0:?}")]
    TranscriptionTimeout(Duration),

    /// Every translation provider in the chain failed
    #[error("Translation failed: {0}")]
    TranslationFailed(String),

    /// Speech synthesis failed
    #[error("Text-to-speech failed: {0}")]
    SynthesisFailed(String),

    /// Caller cancelled the invocation (server shutdown)
    #[error("Processing cancelled")]
    Cancelled,

    /// Artifact store failure
    #[error("Storage error: {0}")]
    Storage(String),
}

impl PipelineError {
    /// Stable machine-readable code for the error body
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::MissingInput => "MISSING_INPUT",
            PipelineError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            PipelineError::InvalidUrl(_) => "INVALID_URL",
            PipelineError::DownloadFailed(_) => "DOWNLOAD_FAILED",
            PipelineError::ExtractionFailed(_) => "EXTRACTION_FAILED",
            PipelineError::TranscriptionFailed(_) => "TRANSCRIPTION_FAILED",
            PipelineError::TranscriptionTimeout(_) => "TRANSCRIPTION_TIMEOUT",
            PipelineError::TranslationFailed(_) => "TRANSLATION_FAILED",
            PipelineError::SynthesisFailed(_) => "SYNTHESIS_FAILED",
            PipelineError::Cancelled => "CANCELLED",
            PipelineError::Storage(_) => "STORAGE_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            PipelineError::MissingInput
            | PipelineError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            PipelineError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            PipelineError::ExtractionFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PipelineError::DownloadFailed(_)
            | PipelineError::TranscriptionFailed(_)
            | PipelineError::TranslationFailed(_)
            | PipelineError::SynthesisFailed(_) => StatusCode::BAD_GATEWAY,
            PipelineError::TranscriptionTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            PipelineError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            PipelineError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<langguard_common::Error> for PipelineError {
    fn from(err: langguard_common::Error) -> Self {
        PipelineError::Storage(err.to_string())
    }
}

impl From<sqlx::Error> for PipelineError {
    fn from(err: sqlx::Error) -> Self {
        PipelineError::Storage(err.to_string())
    }
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Pipeline stage failure, status depends on the stage
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Artifact store failure (500)
    #[error("Artifact store error: {0}")]
    Store(#[from] langguard_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Pipeline(ref err) => (err.status(), err.code(), err.to_string()),
            ApiError::Store(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                err.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
