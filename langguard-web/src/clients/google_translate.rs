//! Public Google translation endpoint
//!
//! First link of the translation chain. Calls the keyless `client=gtx`
//! endpoint and joins the returned segments.
//!
//! # API Reference
//! - Endpoint: https://translate.googleapis.com/translate_a/single
//! - Response: `[[["segment", "original", ...], ...], ...]`

use crate::services::synthesis::chunk_text;
use crate::types::{ProviderError, TranslationProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const GOOGLE_TRANSLATE_URL: &str = "https://translate.googleapis.com/translate_a/single";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Characters per request; the endpoint rejects long query strings
const MAX_REQUEST_CHARS: usize = 4500;

pub struct GooglePublicTranslator {
    http_client: Client,
    endpoint: String,
}

impl GooglePublicTranslator {
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_endpoint(GOOGLE_TRANSLATE_URL)
    }

    /// Point at another endpoint speaking the same protocol (tests)
    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self, ProviderError> {
        let http_client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(format!("langguard/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
        })
    }

    async fn translate_piece(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, ProviderError> {
        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(status.as_u16(), body));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(format!("Invalid JSON: {}", e)))?;

        parse_translate_response(&value)
    }
}

/// Join the first element of every segment in the response's first list
pub fn parse_translate_response(value: &Value) -> Result<String, ProviderError> {
    let segments = value
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| ProviderError::Parse("Empty response from translation endpoint".into()))?;

    let parts: Vec<&str> = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .filter(|part| !part.is_empty())
        .collect();

    if parts.is_empty() {
        return Err(ProviderError::Parse(
            "Empty response from translation endpoint".into(),
        ));
    }

    Ok(parts.join(" "))
}

#[async_trait]
impl TranslationProvider for GooglePublicTranslator {
    fn name(&self) -> &'static str {
        "google-public"
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, ProviderError> {
        let pieces = chunk_text(text, MAX_REQUEST_CHARS);
        debug!(pieces = pieces.len(), source, target, "Calling public translation endpoint");

        let mut translated = Vec::with_capacity(pieces.len());
        for piece in &pieces {
            translated.push(self.translate_piece(piece, source, target).await?);
        }
        Ok(translated.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn segments_are_joined_with_spaces() {
        let value = json!([
            [["Helo dunia.", "Hello world.", null, null, 10], ["Apa khabar?", "How are you?"]],
            null,
            "en"
        ]);
        assert_eq!(
            parse_translate_response(&value).unwrap(),
            "Helo dunia. Apa khabar?"
        );
    }

    #[test]
    fn empty_segment_list_is_an_error() {
        assert!(parse_translate_response(&json!([[], null, "en"])).is_err());
        assert!(parse_translate_response(&json!([null])).is_err());
        assert!(parse_translate_response(&json!({})).is_err());
    }

    #[test]
    fn segments_with_null_text_are_skipped() {
        let value = json!([[[null, "x"], ["Bonjour", "Hello"]]]);
        assert_eq!(parse_translate_response(&value).unwrap(), "Bonjour");
    }
}
