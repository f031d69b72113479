//! Submission endpoint
//!
//! `POST /translate/:kind` accepts a multipart form with `file` (upload),
//! `file_url`, `source_lang` and `target_lang`, runs the pipeline and returns
//! the `PipelineResult` as JSON.

use axum::{
    extract::{Multipart, Path, State},
    routing::post,
    Json, Router,
};
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::languages;
use crate::models::{MediaKind, PipelineResult, UploadedFile};
use crate::workflow::pipeline::{PipelineRequest, DEFAULT_TARGET_LANGUAGE};
use crate::AppState;

/// Parsed multipart form
#[derive(Debug, Default)]
struct SubmissionForm {
    upload: Option<UploadedFile>,
    url: Option<String>,
    source_lang: Option<String>,
    target_lang: Option<String>,
}

/// POST /translate/:kind
pub async fn translate_media(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    multipart: Multipart,
) -> ApiResult<Json<PipelineResult>> {
    let kind: MediaKind = kind.parse().map_err(ApiError::NotFound)?;
    let form = read_form(multipart).await?;

    debug!(
        kind = %kind,
        has_upload = form.upload.is_some(),
        has_url = form.url.is_some(),
        "Submission received"
    );

    let request = PipelineRequest {
        kind,
        upload: form.upload,
        url: form.url,
        source_lang: form
            .source_lang
            .unwrap_or_else(|| languages::AUTO_DETECT.to_string()),
        target_lang: form
            .target_lang
            .unwrap_or_else(|| DEFAULT_TARGET_LANGUAGE.to_string()),
    };

    // Shutdown cancels every in-flight invocation
    let cancel = state.shutdown.child_token();

    match state.pipeline.run(request, &cancel).await {
        Ok(result) => {
            info!(session_id = %result.session_id, "Submission processed");
            Ok(Json(result))
        }
        Err(e) => {
            *state.last_error.write().await = Some(e.to_string());
            Err(e.into())
        }
    }
}

async fn read_form(mut multipart: Multipart) -> ApiResult<SubmissionForm> {
    let mut form = SubmissionForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed form: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
                if !filename.is_empty() {
                    form.upload = Some(UploadedFile {
                        filename,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            "file_url" | "source_lang" | "target_lang" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read {}: {}", name, e)))?;
                let value = Some(value.trim().to_string()).filter(|v| !v.is_empty());
                match name.as_str() {
                    "file_url" => form.url = value,
                    "source_lang" => form.source_lang = value,
                    _ => form.target_lang = value,
                }
            }
            other => debug!(field = other, "Ignoring unknown form field"),
        }
    }

    Ok(form)
}

pub fn translate_routes() -> Router<AppState> {
    Router::new().route("/translate/:kind", post(translate_media))
}
