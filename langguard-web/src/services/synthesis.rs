//! Speech synthesis
//!
//! Targets with a premium voice are synthesized chunk by chunk and the MP3
//! segments concatenated in order. Other targets go to the generic
//! synthesizer keyed by the bare language code.

use crate::error::PipelineError;
use crate::languages;
use crate::types::SpeechSynthesizer;
use std::sync::Arc;
use tracing::{debug, info};

/// Characters per premium synthesis request
pub const DEFAULT_CHUNK_BUDGET: usize = 2500;

/// Split text into chunks of at most `budget` characters
///
/// Text within budget is returned whole. Longer text is split on `". "`,
/// the period restored on every sentence but the last, and sentences packed
/// greedily (joined by a space). A single sentence over budget becomes its
/// own chunk, undivided.
pub fn chunk_text(text: &str, budget: usize) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    if text.chars().count() <= budget {
        return vec![text.to_string()];
    }

    let pieces: Vec<&str> = text.split(". ").collect();
    let last = pieces.len() - 1;
    let sentences = pieces.iter().enumerate().filter_map(|(i, piece)| {
        let piece = piece.trim();
        if piece.is_empty() {
            None
        } else if i < last {
            Some(format!("{}.", piece))
        } else {
            Some(piece.to_string())
        }
    });

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for sentence in sentences {
        let sentence_len = sentence.chars().count();
        if !current.is_empty() && current_len + 1 + sentence_len > budget {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(&sentence);
        current_len += sentence_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

pub struct Synthesizer {
    premium: Arc<dyn SpeechSynthesizer>,
    generic: Arc<dyn SpeechSynthesizer>,
    chunk_budget: usize,
}

impl Synthesizer {
    pub fn new(
        premium: Arc<dyn SpeechSynthesizer>,
        generic: Arc<dyn SpeechSynthesizer>,
        chunk_budget: usize,
    ) -> Self {
        Self {
            premium,
            generic,
            chunk_budget: chunk_budget.max(1),
        }
    }

    /// MP3 audio for `text` spoken in `target`
    pub async fn synthesize(&self, text: &str, target: &str) -> Result<Vec<u8>, PipelineError> {
        if text.trim().is_empty() {
            return Err(PipelineError::SynthesisFailed("No text to synthesize".into()));
        }

        match languages::premium_voice(target) {
            Some(voice) => self.synthesize_premium(text, voice).await,
            None => {
                debug!(target, "No premium voice, using generic synthesizer");
                self.generic
                    .synthesize(text, target)
                    .await
                    .map_err(|e| PipelineError::SynthesisFailed(e.to_string()))
            }
        }
    }

    async fn synthesize_premium(&self, text: &str, voice: &str) -> Result<Vec<u8>, PipelineError> {
        let chunks = chunk_text(text, self.chunk_budget);
        info!(voice, chunks = chunks.len(), "Synthesizing with premium voice");

        let mut audio = Vec::new();
        for (i, chunk) in chunks.iter().enumerate() {
            let segment = self.premium.synthesize(chunk, voice).await.map_err(|e| {
                PipelineError::SynthesisFailed(format!(
                    "chunk {}/{} with voice {}: {}",
                    i + 1,
                    chunks.len(),
                    voice,
                    e
                ))
            })?;
            audio.extend_from_slice(&segment);
        }
        Ok(audio)
    }
}
