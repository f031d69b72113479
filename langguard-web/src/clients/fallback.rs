//! Last-resort adapters
//!
//! `PassthroughTranslator` ends the translation chain so the pipeline can
//! still answer with the source text. `Unavailable` stands in for any
//! capability that is not compiled in.

use crate::types::{
    AudioDemuxer, JobStatus, LanguageCandidate, LanguageIdentifier, ObjectStore, ProviderError,
    RecognitionRequest, SpeechRecognizer, SpeechSynthesizer, TextBlock, TextRecognizer,
    TranslationProvider,
};
use async_trait::async_trait;
use std::path::Path;
use tracing::warn;

/// Returns the input with an "unavailable" marker; never fails
pub struct PassthroughTranslator;

#[async_trait]
impl TranslationProvider for PassthroughTranslator {
    fn name(&self) -> &'static str {
        "passthrough"
    }

    fn is_degraded(&self) -> bool {
        true
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, ProviderError> {
        warn!(source, target, "Using passthrough translation");
        Ok(format!(
            "[Translation unavailable: {} -> {}] {}",
            source, target, text
        ))
    }
}

/// Capability that is not available in this build
#[derive(Debug, Clone, Copy)]
pub struct Unavailable {
    capability: &'static str,
}

impl Unavailable {
    pub fn new(capability: &'static str) -> Self {
        Self { capability }
    }

    fn error(&self) -> ProviderError {
        ProviderError::Unavailable(self.capability.to_string())
    }
}

#[async_trait]
impl ObjectStore for Unavailable {
    async fn put(&self, _key: &str, _bytes: Vec<u8>) -> Result<(), ProviderError> {
        Err(self.error())
    }

    async fn get(&self, _key: &str) -> Result<Vec<u8>, ProviderError> {
        Err(self.error())
    }
}

#[async_trait]
impl SpeechRecognizer for Unavailable {
    async fn start(&self, _request: &RecognitionRequest) -> Result<String, ProviderError> {
        Err(self.error())
    }

    async fn poll(&self, _job_id: &str) -> Result<JobStatus, ProviderError> {
        Err(self.error())
    }
}

#[async_trait]
impl LanguageIdentifier for Unavailable {
    async fn identify(&self, _text: &str) -> Result<Vec<LanguageCandidate>, ProviderError> {
        Err(self.error())
    }
}

#[async_trait]
impl TranslationProvider for Unavailable {
    fn name(&self) -> &'static str {
        self.capability
    }

    async fn translate(&self, _: &str, _: &str, _: &str) -> Result<String, ProviderError> {
        Err(self.error())
    }
}

#[async_trait]
impl SpeechSynthesizer for Unavailable {
    async fn synthesize(&self, _text: &str, _voice: &str) -> Result<Vec<u8>, ProviderError> {
        Err(self.error())
    }
}

#[async_trait]
impl TextRecognizer for Unavailable {
    async fn detect(&self, _image: &[u8]) -> Result<Vec<TextBlock>, ProviderError> {
        Err(self.error())
    }
}

#[async_trait]
impl AudioDemuxer for Unavailable {
    async fn extract_audio(&self, _video: &Path, _output: &Path) -> Result<(), ProviderError> {
        Err(self.error())
    }
}
