//! Language table for the form selectors

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::languages::{self, LanguageEntry};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct LanguagesResponse {
    pub languages: &'static [LanguageEntry],
    /// Value of the "detect automatically" source option
    pub auto_detect: &'static str,
}

/// GET /api/languages
pub async fn list_languages() -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        languages: languages::all(),
        auto_detect: languages::AUTO_DETECT,
    })
}

pub fn language_routes() -> Router<AppState> {
    Router::new().route("/api/languages", get(list_languages))
}
