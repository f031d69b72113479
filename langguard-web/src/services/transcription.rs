//! Speech-to-text through the object store and an asynchronous recognition job
//!
//! 1. upload the audio as `audio/<job>.<ext>`
//! 2. start the job (fixed locale, or automatic identification for `auto`)
//! 3. poll until completed, failed, timed out or cancelled
//! 4. read `<job>.json` and return the first transcript

use crate::error::PipelineError;
use crate::languages;
use crate::types::{
    JobStatus, LanguageHint, ObjectStore, ProviderError, RecognitionRequest, SpeechRecognizer,
};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Polling and locale settings
#[derive(Debug, Clone)]
pub struct TranscriptionSettings {
    pub poll_interval: Duration,
    pub poll_timeout: Duration,
    pub default_locale: String,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            poll_timeout: Duration::from_secs(600),
            default_locale: "en-US".to_string(),
        }
    }
}

/// Recognized text plus any warnings to surface to the user
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub text: String,
    pub notices: Vec<String>,
}

pub struct Transcriber {
    object_store: Arc<dyn ObjectStore>,
    recognizer: Arc<dyn SpeechRecognizer>,
    settings: TranscriptionSettings,
}

impl Transcriber {
    pub fn new(
        object_store: Arc<dyn ObjectStore>,
        recognizer: Arc<dyn SpeechRecognizer>,
        settings: TranscriptionSettings,
    ) -> Self {
        Self {
            object_store,
            recognizer,
            settings,
        }
    }

    pub async fn transcribe(
        &self,
        audio_path: &Path,
        source: &str,
        cancel: &CancellationToken,
    ) -> Result<Transcript, PipelineError> {
        let extension = audio_path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| "mp3".to_string());

        let job_name = format!("transcribe-job-{}", Uuid::new_v4().simple());
        let media_key = format!("audio/{}.{}", job_name, extension);

        let audio = tokio::fs::read(audio_path).await.map_err(|e| {
            PipelineError::TranscriptionFailed(format!(
                "Read {} failed: {}",
                audio_path.display(),
                e
            ))
        })?;

        self.object_store
            .put(&media_key, audio)
            .await
            .map_err(|e| {
                PipelineError::TranscriptionFailed(format!("Audio upload failed: {}", e))
            })?;

        let mut notices = Vec::new();
        let request = RecognitionRequest {
            job_name: job_name.clone(),
            media_key,
            media_format: media_format(&extension).to_string(),
            language: language_hint(source, &self.settings.default_locale, &mut notices),
        };

        let job_id = self
            .recognizer
            .start(&request)
            .await
            .map_err(|e| PipelineError::TranscriptionFailed(format!("Job start failed: {}", e)))?;
        info!(job = %job_id, "Transcription job started");

        self.wait_for_completion(&job_id, cancel).await?;

        let result_key = format!("{}.json", job_name);
        let raw = self.object_store.get(&result_key).await.map_err(|e| {
            PipelineError::TranscriptionFailed(format!("Transcript download failed: {}", e))
        })?;

        Ok(Transcript {
            text: parse_transcript(&raw)?,
            notices,
        })
    }

    /// Poll until the job reaches a terminal state
    ///
    /// `NotReady` from the provider is retried. Cancellation is honoured at
    /// every iteration, including while sleeping between polls.
    pub async fn wait_for_completion(
        &self,
        job_id: &str,
        cancel: &CancellationToken,
    ) -> Result<(), PipelineError> {
        let started = Instant::now();
        let timeout = self.settings.poll_timeout;

        loop {
            if cancel.is_cancelled() {
                return Err(PipelineError::Cancelled);
            }

            match self.recognizer.poll(job_id).await {
                Ok(JobStatus::Completed) => {
                    info!(job = %job_id, elapsed_ms = started.elapsed().as_millis() as u64, "Transcription completed");
                    return Ok(());
                }
                Ok(JobStatus::Failed(reason)) => {
                    return Err(PipelineError::TranscriptionFailed(reason));
                }
                Ok(JobStatus::Running) => {
                    debug!(job = %job_id, "Transcription in progress");
                }
                Err(ProviderError::NotReady(msg)) => {
                    debug!(job = %job_id, "Job not visible yet: {}", msg);
                }
                Err(e) => {
                    return Err(PipelineError::TranscriptionFailed(format!("Status check failed: {}", e)));
                }
            }

            if started.elapsed() >= timeout {
                return Err(PipelineError::TranscriptionTimeout(timeout));
            }

            tokio::select! {
                _ = cancel.cancelled() => return Err(PipelineError::Cancelled),
                _ = tokio::time::sleep(self.settings.poll_interval) => {}
            }
        }
    }
}

/// Recognition guidance for a source language
///
/// `auto` asks for identification over every known locale. A code without a
/// locale falls back to `default_locale`; that fallback is logged and
/// recorded in `notices`.
pub fn language_hint(source: &str, default_locale: &str, notices: &mut Vec<String>) -> LanguageHint {
    if languages::is_auto(source) {
        return LanguageHint::Identify(
            languages::recognition_locales()
                .into_iter()
                .map(str::to_string)
                .collect(),
        );
    }

    match languages::recognition_locale(source) {
        Some(locale) => LanguageHint::Locale(locale.to_string()),
        None => {
            warn!(source, default_locale, "No recognition locale for source language, using default");
            notices.push(format!(
                "Speech recognition does not support '{}'; audio was transcribed as {}",
                source, default_locale
            ));
            LanguageHint::Locale(default_locale.to_string())
        }
    }
}

/// Provider media format for a file extension
pub fn media_format(extension: &str) -> &str {
    match extension {
        "m4a" => "mp4",
        other => other,
    }
}

/// `results.transcripts[0].transcript` of a recognition result document
pub fn parse_transcript(raw: &[u8]) -> Result<String, PipelineError> {
    let value: Value = serde_json::from_slice(raw)
        .map_err(|e| PipelineError::TranscriptionFailed(format!("Invalid transcript JSON: {}", e)))?;

    value
        .pointer("/results/transcripts/0/transcript")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| PipelineError::TranscriptionFailed("Transcript missing from result".into()))
}
