//! Capability traits for external services
//!
//! Every cloud or subprocess collaborator sits behind one of these traits so
//! the pipeline can be driven by real adapters (see `clients`) or by fakes in
//! tests. All calls fail with [`ProviderError`].
//!
//! | Capability | Production adapter |
//! |---|---|
//! | [`ObjectStore`] | S3 |
//! | [`SpeechRecognizer`] | Transcribe |
//! | [`LanguageIdentifier`] | Comprehend |
//! | [`TranslationProvider`] | public Google endpoint, AWS Translate, passthrough |
//! | [`SpeechSynthesizer`] | Polly (premium), Google translate_tts (generic) |
//! | [`TextRecognizer`] | Textract |
//! | [`AudioDemuxer`] | ffmpeg subprocess |

use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Failure reported by a capability adapter
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport-level failure (connect, timeout, body read)
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status
    #[error("API error {0}: {1}")]
    Api(u16, String),

    /// Provider-side rejection reported through an SDK
    #[error("Service error: {0}")]
    Service(String),

    /// Response did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Resource not visible yet (recognition job just started)
    #[error("Not ready: {0}")]
    NotReady(String),

    /// Capability not compiled in or not configured
    #[error("Capability not available: {0}")]
    Unavailable(String),

    /// Local I/O failure (subprocess, temp files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => ProviderError::Api(status.as_u16(), err.to_string()),
            None => ProviderError::Network(err.to_string()),
        }
    }
}

// ============================================================================
// Object store
// ============================================================================

/// Blob storage used to hand audio to the speech recognizer
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), ProviderError>;

    async fn get(&self, key: &str) -> Result<Vec<u8>, ProviderError>;
}

// ============================================================================
// Speech recognition
// ============================================================================

/// Language guidance for a recognition job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageHint {
    /// Recognize in one locale
    Locale(String),
    /// Let the provider identify the language among these locales
    Identify(Vec<String>),
}

/// Parameters of one recognition job
#[derive(Debug, Clone)]
pub struct RecognitionRequest {
    pub job_name: String,
    /// Object-store key of the uploaded audio
    pub media_key: String,
    /// Provider media format (mp3, wav, flac, mp4)
    pub media_format: String,
    pub language: LanguageHint,
}

/// Observed state of a recognition job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Running,
    Completed,
    Failed(String),
}

/// Asynchronous speech-to-text jobs
///
/// The transcript of a completed job is written to the object store as
/// `<job name>.json`.
#[async_trait::async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Start a job, returning the id to poll
    async fn start(&self, request: &RecognitionRequest) -> Result<String, ProviderError>;

    /// Current job state; `ProviderError::NotReady` while the job is not visible
    async fn poll(&self, job_id: &str) -> Result<JobStatus, ProviderError>;
}

// ============================================================================
// Language identification
// ============================================================================

/// One scored language guess
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageCandidate {
    pub code: String,
    pub score: f32,
}

#[async_trait::async_trait]
pub trait LanguageIdentifier: Send + Sync {
    async fn identify(&self, text: &str) -> Result<Vec<LanguageCandidate>, ProviderError>;
}

// ============================================================================
// Translation
// ============================================================================

/// One link of the translation fallback chain
#[async_trait::async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Provider name recorded in results and logs
    fn name(&self) -> &'static str;

    /// Output is a placeholder rather than a real translation
    fn is_degraded(&self) -> bool {
        false
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, ProviderError>;
}

// ============================================================================
// Speech synthesis
// ============================================================================

/// Text-to-speech producing MP3 bytes
///
/// `voice` is a premium voice id for the premium synthesizer and a bare
/// language code for the generic one.
#[async_trait::async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, ProviderError>;
}

// ============================================================================
// OCR
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBlockKind {
    Page,
    Line,
    Word,
    Other,
}

/// Text block returned by OCR
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    pub kind: TextBlockKind,
    pub text: String,
}

#[async_trait::async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn detect(&self, image: &[u8]) -> Result<Vec<TextBlock>, ProviderError>;
}

// ============================================================================
// Demux
// ============================================================================

/// Extracts the audio track of a video file
#[async_trait::async_trait]
pub trait AudioDemuxer: Send + Sync {
    async fn extract_audio(&self, video: &Path, output: &Path) -> Result<(), ProviderError>;
}

// ============================================================================
// Capabilities context
// ============================================================================

/// Provider handles built once at startup and shared by every invocation
#[derive(Clone)]
pub struct Capabilities {
    pub object_store: Arc<dyn ObjectStore>,
    pub speech_recognizer: Arc<dyn SpeechRecognizer>,
    pub language_identifier: Arc<dyn LanguageIdentifier>,
    /// Translation fallback chain, tried in order
    pub translators: Vec<Arc<dyn TranslationProvider>>,
    /// Voice-specific synthesizer
    pub premium_synthesizer: Arc<dyn SpeechSynthesizer>,
    /// Fallback keyed by bare language code
    pub generic_synthesizer: Arc<dyn SpeechSynthesizer>,
    pub text_recognizer: Arc<dyn TextRecognizer>,
    pub audio_demuxer: Arc<dyn AudioDemuxer>,
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let translators: Vec<&str> = self.translators.iter().map(|t| t.name()).collect();
        f.debug_struct("Capabilities")
            .field("translators", &translators)
            .finish_non_exhaustive()
    }
}
