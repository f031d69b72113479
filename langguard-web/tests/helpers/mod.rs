//! Test Helper Utilities
//!
//! In-memory capability fakes and a harness that wires them into a real
//! `Pipeline`, `AppState` and router backed by an in-memory database.

#![allow(dead_code)]

pub mod fakes;

pub use fakes::{
    CopyingDemuxer, FailingTranslator, FixedIdentifier, FixedTranslator, MemoryStore, PollStep,
    RecordingSynthesizer, ScriptedOcr, ScriptedRecognizer,
};

use langguard_common::events::EventBus;
use langguard_web::config::AppConfig;
use langguard_web::services::TranscriptionSettings;
use langguard_web::types::{Capabilities, TranslationProvider};
use langguard_web::workflow::{Pipeline, PipelineConfig};
use langguard_web::AppState;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

/// In-memory database with the artifact tables
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    langguard_web::db::init_tables(&pool).await.unwrap();
    pool
}

/// Fast polling so recognizer scripts finish in milliseconds
pub fn fast_transcription() -> TranscriptionSettings {
    TranscriptionSettings {
        poll_interval: Duration::from_millis(5),
        poll_timeout: Duration::from_millis(500),
        default_locale: "en-US".to_string(),
    }
}

/// Every fake, kept so tests can inspect calls after a run
pub struct Fakes {
    pub store: Arc<MemoryStore>,
    pub recognizer: Arc<ScriptedRecognizer>,
    pub identifier: Arc<FixedIdentifier>,
    pub translator: Arc<FixedTranslator>,
    pub premium: Arc<RecordingSynthesizer>,
    pub generic: Arc<RecordingSynthesizer>,
    pub ocr: Arc<ScriptedOcr>,
    pub demuxer: Arc<CopyingDemuxer>,
}

impl Fakes {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::default());
        Self {
            recognizer: Arc::new(ScriptedRecognizer::new(store.clone(), "hello from the recording")),
            store,
            identifier: Arc::new(FixedIdentifier::new("en", 0.97)),
            translator: Arc::new(FixedTranslator::new("fake-cloud", "Hola mundo")),
            premium: Arc::new(RecordingSynthesizer::new(b"PREMIUM")),
            generic: Arc::new(RecordingSynthesizer::new(b"GENERIC")),
            ocr: Arc::new(ScriptedOcr::new(&["Hello from the image"])),
            demuxer: Arc::new(CopyingDemuxer::default()),
        }
    }

    /// Capabilities with the given translation chain
    pub fn capabilities_with(&self, translators: Vec<Arc<dyn TranslationProvider>>) -> Capabilities {
        Capabilities {
            object_store: self.store.clone(),
            speech_recognizer: self.recognizer.clone(),
            language_identifier: self.identifier.clone(),
            translators,
            premium_synthesizer: self.premium.clone(),
            generic_synthesizer: self.generic.clone(),
            text_recognizer: self.ocr.clone(),
            audio_demuxer: self.demuxer.clone(),
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities_with(vec![self.translator.clone()])
    }
}

/// Pipeline plus everything it writes to
pub struct Harness {
    /// Upload area; dropped with the harness
    pub dir: TempDir,
    pub pool: SqlitePool,
    pub event_bus: EventBus,
    pub fakes: Fakes,
    pub pipeline: Pipeline,
}

impl Harness {
    pub async fn new() -> Self {
        let fakes = Fakes::new();
        let capabilities = fakes.capabilities();
        Self::with_capabilities(fakes, capabilities).await
    }

    pub async fn with_capabilities(fakes: Fakes, capabilities: Capabilities) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let pool = memory_pool().await;
        let event_bus = EventBus::new(100);

        let pipeline = Pipeline::new(
            &capabilities,
            PipelineConfig {
                upload_dir: dir.path().join("uploads"),
                transcription: fast_transcription(),
                chunk_budget: 2500,
            },
            pool.clone(),
            event_bus.clone(),
        )
        .unwrap();

        Self {
            dir,
            pool,
            event_bus,
            fakes,
            pipeline,
        }
    }

    pub fn upload_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("uploads")
    }

    /// Turn the harness into shared HTTP state
    pub fn into_state(self) -> (AppState, TempDir, Fakes) {
        let state = AppState::new(
            self.pool,
            self.event_bus,
            self.pipeline,
            AppConfig::default(),
            CancellationToken::new(),
        );
        (state, self.dir, self.fakes)
    }
}
