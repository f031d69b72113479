//! Generic text-to-speech via Google `translate_tts`
//!
//! Used for languages without a premium voice. The endpoint accepts at most
//! 100 characters per request; longer text is split on whitespace and the
//! returned MP3 segments are concatenated.

use crate::types::{ProviderError, SpeechSynthesizer};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

const GOOGLE_TTS_URL: &str = "https://translate.google.com/translate_tts";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Request size limit of the endpoint
pub const MAX_REQUEST_CHARS: usize = 100;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

pub struct GoogleTtsSynthesizer {
    http_client: Client,
    endpoint: String,
}

impl GoogleTtsSynthesizer {
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_endpoint(GOOGLE_TTS_URL)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self, ProviderError> {
        let http_client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(BROWSER_USER_AGENT)
            .build()?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
        })
    }
}

/// Split text into pieces of at most `max_chars` characters
///
/// Breaks on whitespace; a single word longer than the limit is cut at
/// character boundaries.
pub fn split_for_requests(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for slice in chars.chunks(max_chars) {
                pieces.push(slice.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() { word_len } else { current_len + 1 + word_len };
        if needed > max_chars {
            pieces.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

#[async_trait]
impl SpeechSynthesizer for GoogleTtsSynthesizer {
    /// `voice` is the bare language code
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, ProviderError> {
        let pieces = split_for_requests(text, MAX_REQUEST_CHARS);
        if pieces.is_empty() {
            return Err(ProviderError::Parse("No text to synthesize".into()));
        }

        let total = pieces.len().to_string();
        debug!(language = voice, requests = pieces.len(), "Calling generic TTS endpoint");

        let mut audio = Vec::new();
        for (idx, piece) in pieces.iter().enumerate() {
            let idx = idx.to_string();
            let textlen = piece.chars().count().to_string();
            let response = self
                .http_client
                .get(&self.endpoint)
                .query(&[
                    ("ie", "UTF-8"),
                    ("client", "tw-ob"),
                    ("tl", voice),
                    ("q", piece.as_str()),
                    ("total", total.as_str()),
                    ("idx", idx.as_str()),
                    ("textlen", textlen.as_str()),
                ])
                .send()
                .await?
                .error_for_status()?;

            audio.extend_from_slice(&response.bytes().await?);
        }

        Ok(audio)
    }
}
