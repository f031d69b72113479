//! Language detection with a keyword fallback

use crate::languages;
use crate::types::LanguageIdentifier;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Identification input limit (bytes)
const MAX_IDENTIFY_BYTES: usize = 99_000;

const ENGLISH_MARKERS: &[&str] = &["the", "and", "is", "are", "to"];
const MALAY_MARKERS: &[&str] = &["dan", "atau", "yang", "di", "akan"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectedLanguage {
    pub code: String,
    pub name: String,
    pub confidence: f32,
}

impl DetectedLanguage {
    fn new(code: &str, confidence: f32) -> Self {
        Self {
            code: code.to_string(),
            name: languages::name_for_code(code).to_string(),
            confidence,
        }
    }
}

pub struct LanguageDetector {
    identifier: Arc<dyn LanguageIdentifier>,
}

impl LanguageDetector {
    pub fn new(identifier: Arc<dyn LanguageIdentifier>) -> Self {
        Self { identifier }
    }

    /// Highest-scoring candidate from the identifier, or the heuristic
    ///
    /// Never fails: identifier errors and empty answers fall back to
    /// [`heuristic_detect`].
    pub async fn detect(&self, text: &str) -> DetectedLanguage {
        match self.identifier.identify(truncate_bytes(text, MAX_IDENTIFY_BYTES)).await {
            Ok(candidates) => {
                let best = candidates
                    .into_iter()
                    .max_by(|a, b| a.score.total_cmp(&b.score));
                match best {
                    Some(candidate) => {
                        debug!(code = %candidate.code, score = candidate.score, "Language identified");
                        DetectedLanguage::new(&candidate.code, candidate.score.clamp(0.0, 1.0))
                    }
                    None => {
                        warn!("Language identifier returned no candidates, using heuristic");
                        heuristic_detect(text)
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Language identification failed, using heuristic");
                heuristic_detect(text)
            }
        }
    }
}

/// Whole-word marker check: English, then Malay, else low-confidence English
pub fn heuristic_detect(text: &str) -> DetectedLanguage {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let contains_any = |markers: &[&str]| words.iter().any(|w| markers.contains(w));

    if contains_any(ENGLISH_MARKERS) {
        DetectedLanguage::new("en", 0.9)
    } else if contains_any(MALAY_MARKERS) {
        DetectedLanguage::new("ms", 0.9)
    } else {
        DetectedLanguage::new("en", 0.5)
    }
}

fn truncate_bytes(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
