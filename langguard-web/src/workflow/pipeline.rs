//! Pipeline Orchestrator
//!
//! Runs one invocation from submitted input to stored artifacts:
//!
//! ```text
//! acquire ─┬─ document/image ─ extract text ──────────────┐
//!          ├─ audio ─────────────────── transcribe ───────┤
//!          └─ video ─ demux ─────────── transcribe ───────┤
//!                                                         ▼
//!            detect (source = auto) → translate → synthesize → store
//! ```
//!
//! Every stage failure aborts the invocation. Nothing is stored until every
//! stage has succeeded, so a failed invocation leaves no result behind.
//! Input with no text skips synthesis and stores the text artifacts only.

use crate::config::AppConfig;
use crate::db;
use crate::error::PipelineError;
use crate::languages;
use crate::models::{
    AcquiredMedia, ArtifactKind, LanguageRef, MediaKind, PipelineResult, SessionId, UploadedFile,
};
use crate::services::acquisition::Acquirer;
use crate::services::detection::LanguageDetector;
use crate::services::extraction::Extractor;
use crate::services::synthesis::Synthesizer;
use crate::services::transcription::{Transcriber, TranscriptionSettings};
use crate::services::translation::TranslationChain;
use crate::types::Capabilities;
use chrono::Utc;
use langguard_common::events::{EventBus, PipelineEvent, PipelineStage};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Target language used when the form leaves it blank
pub const DEFAULT_TARGET_LANGUAGE: &str = "en";

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Where acquired and demuxed files are written
    pub upload_dir: PathBuf,
    pub transcription: TranscriptionSettings,
    /// Characters per premium synthesis request
    pub chunk_budget: usize,
}

impl PipelineConfig {
    pub fn from_app_config(config: &AppConfig, upload_dir: PathBuf) -> Self {
        Self {
            upload_dir,
            transcription: TranscriptionSettings {
                poll_interval: config.poll_interval(),
                poll_timeout: config.poll_timeout(),
                default_locale: config.transcription.default_locale.clone(),
            },
            chunk_budget: config.synthesis.chunk_budget,
        }
    }
}

/// One submission
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub kind: MediaKind,
    pub upload: Option<UploadedFile>,
    pub url: Option<String>,
    /// Bare code or `auto`
    pub source_lang: String,
    pub target_lang: String,
}

/// Pipeline orchestrator
pub struct Pipeline {
    acquirer: Acquirer,
    extractor: Extractor,
    transcriber: Transcriber,
    detector: LanguageDetector,
    translator: TranslationChain,
    synthesizer: Synthesizer,
    db: SqlitePool,
    event_bus: EventBus,
}

impl Pipeline {
    pub fn new(
        capabilities: &Capabilities,
        config: PipelineConfig,
        db: SqlitePool,
        event_bus: EventBus,
    ) -> Result<Self, PipelineError> {
        let translator = TranslationChain::new(capabilities.translators.clone());
        info!(providers = ?translator.provider_names(), "Translation chain ready");

        Ok(Self {
            acquirer: Acquirer::new(config.upload_dir)?,
            extractor: Extractor::new(
                capabilities.text_recognizer.clone(),
                capabilities.audio_demuxer.clone(),
            ),
            transcriber: Transcriber::new(
                capabilities.object_store.clone(),
                capabilities.speech_recognizer.clone(),
                config.transcription,
            ),
            detector: LanguageDetector::new(capabilities.language_identifier.clone()),
            translator,
            synthesizer: Synthesizer::new(
                capabilities.premium_synthesizer.clone(),
                capabilities.generic_synthesizer.clone(),
                config.chunk_budget,
            ),
            db,
            event_bus,
        })
    }

    /// Run one invocation to completion
    pub async fn run(
        &self,
        request: PipelineRequest,
        cancel: &CancellationToken,
    ) -> Result<PipelineResult, PipelineError> {
        let session = SessionId::new();
        let started = Instant::now();

        info!(session_id = %session, kind = %request.kind, "Pipeline started");
        self.event_bus.emit_lossy(PipelineEvent::SessionStarted {
            session_id: session.to_string(),
            media_kind: request.kind.to_string(),
            timestamp: Utc::now(),
        });

        match self.execute(&session, request, cancel).await {
            Ok(result) => {
                info!(
                    session_id = %session,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    has_translation = result.has_translation,
                    "Pipeline completed"
                );
                self.event_bus.emit_lossy(PipelineEvent::SessionCompleted {
                    session_id: session.to_string(),
                    has_translation: result.has_translation,
                    timestamp: Utc::now(),
                });
                Ok(result)
            }
            Err(e) => {
                error!(session_id = %session, error = %e, "Pipeline failed");
                self.event_bus.emit_lossy(PipelineEvent::SessionFailed {
                    session_id: session.to_string(),
                    message: e.to_string(),
                    timestamp: Utc::now(),
                });
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        session: &SessionId,
        request: PipelineRequest,
        cancel: &CancellationToken,
    ) -> Result<PipelineResult, PipelineError> {
        let source_lang = normalize_code(&request.source_lang, languages::AUTO_DETECT);
        let target_lang = normalize_code(&request.target_lang, DEFAULT_TARGET_LANGUAGE);
        let mut notices = Vec::new();

        let stage_started = Instant::now();
        let media = self
            .acquirer
            .acquire(request.upload, request.url, request.kind, session)
            .await?;
        self.stage_done(session, PipelineStage::Acquisition, stage_started);
        ensure_active(cancel)?;

        let source_text = self
            .source_text(session, &media, &source_lang, cancel, &mut notices)
            .await?;
        ensure_active(cancel)?;

        let (source_code, confidence) = if languages::is_auto(&source_lang) {
            let stage_started = Instant::now();
            let detected = self.detector.detect(&source_text).await;
            self.stage_done(session, PipelineStage::LanguageDetection, stage_started);
            (detected.code, detected.confidence)
        } else {
            (source_lang.clone(), 1.0)
        };

        let stage_started = Instant::now();
        let translation = self
            .translator
            .translate(&source_text, &source_code, &target_lang)
            .await?;
        self.stage_done(session, PipelineStage::Translation, stage_started);
        if translation.degraded {
            notices.push(format!(
                "No translation service was reachable; the text is shown untranslated ({} -> {})",
                source_code, target_lang
            ));
        }
        ensure_active(cancel)?;

        let mut outputs = vec![
            (ArtifactKind::Transcript, source_text.clone().into_bytes()),
            (ArtifactKind::Translation, translation.text.clone().into_bytes()),
        ];

        if translation.text.trim().is_empty() {
            info!(session_id = %session, "No text found, skipping synthesis");
            notices.push("No text was found in the input, so no audio was produced".to_string());
        } else {
            let stage_started = Instant::now();
            let audio = self
                .synthesizer
                .synthesize(&translation.text, &target_lang)
                .await?;
            self.stage_done(session, PipelineStage::Synthesis, stage_started);
            ensure_active(cancel)?;
            outputs.push((ArtifactKind::Audio, audio));
        }

        let result = PipelineResult {
            session_id: session.clone(),
            media_kind: request.kind,
            source_language: LanguageRef::from_code(&source_code),
            target_language: LanguageRef::from_code(&target_lang),
            confidence,
            source_text,
            translated_text: translation.text,
            has_translation: !source_code.eq_ignore_ascii_case(&target_lang),
            translation_provider: translation.provider,
            degraded: translation.degraded,
            artifacts: outputs.iter().map(|(kind, _)| *kind).collect(),
            notices,
            created_at: Utc::now(),
        };

        let stage_started = Instant::now();
        db::save_session_outputs(&self.db, &result, &outputs).await?;
        self.stage_done(session, PipelineStage::Storage, stage_started);

        Ok(result)
    }

    /// Text of the acquired media: extracted for documents and images,
    /// transcribed for audio and (demuxed) video
    async fn source_text(
        &self,
        session: &SessionId,
        media: &AcquiredMedia,
        source_lang: &str,
        cancel: &CancellationToken,
        notices: &mut Vec<String>,
    ) -> Result<String, PipelineError> {
        let stage_started = Instant::now();

        let audio_path = match media.kind {
            MediaKind::Document | MediaKind::Image => {
                let text = self.extractor.extract_text(&media.path, &media.extension).await?;
                self.stage_done(session, PipelineStage::Extraction, stage_started);
                return Ok(text);
            }
            MediaKind::Audio => media.path.clone(),
            MediaKind::Video => {
                let audio_path = self
                    .acquirer
                    .upload_dir()
                    .join(format!("{}_audio.wav", session));
                self.extractor.extract_audio(&media.path, &audio_path).await?;
                self.stage_done(session, PipelineStage::Demux, stage_started);
                audio_path
            }
        };

        let stage_started = Instant::now();
        let transcript = self
            .transcriber
            .transcribe(&audio_path, source_lang, cancel)
            .await?;
        self.stage_done(session, PipelineStage::Transcription, stage_started);

        notices.extend(transcript.notices);
        Ok(transcript.text)
    }

    fn stage_done(&self, session: &SessionId, stage: PipelineStage, stage_started: Instant) {
        let elapsed_ms = stage_started.elapsed().as_millis() as u64;
        info!(session_id = %session, stage = %stage, elapsed_ms, "Stage completed");
        self.event_bus.emit_lossy(PipelineEvent::StageCompleted {
            session_id: session.to_string(),
            stage,
            elapsed_ms,
            timestamp: Utc::now(),
        });
    }
}

fn ensure_active(cancel: &CancellationToken) -> Result<(), PipelineError> {
    if cancel.is_cancelled() {
        Err(PipelineError::Cancelled)
    } else {
        Ok(())
    }
}

/// Blank takes `default`; a canonical name ("Malay") becomes its code
fn normalize_code(value: &str, default: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        return default.to_string();
    }
    languages::code_for_name(value)
        .map(str::to_string)
        .unwrap_or_else(|| value.to_string())
}
