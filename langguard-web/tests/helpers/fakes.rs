//! Fake capability implementations
//!
//! Each fake records what it was asked to do so tests can assert on routing
//! (which synthesizer ran, how often the translator was called, ...).

use async_trait::async_trait;
use langguard_web::types::{
    AudioDemuxer, JobStatus, LanguageCandidate, LanguageIdentifier, ObjectStore, ProviderError,
    RecognitionRequest, SpeechRecognizer, SpeechSynthesizer, TextBlock, TextBlockKind,
    TextRecognizer, TranslationProvider,
};
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ============================================================================
// Object store
// ============================================================================

#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn insert(&self, key: &str, bytes: Vec<u8>) {
        self.objects.lock().unwrap().insert(key.to_string(), bytes);
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), ProviderError> {
        self.insert(key, bytes);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, ProviderError> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| ProviderError::Api(404, format!("NoSuchKey: {}", key)))
    }
}

// ============================================================================
// Speech recognition
// ============================================================================

/// One scripted answer to `poll`
#[derive(Debug, Clone)]
pub enum PollStep {
    NotReady,
    Running,
    Completed,
    Failed(String),
}

/// Writes the transcript JSON into the store on `start`, then answers
/// `poll` from a script; an exhausted script keeps answering `Running`
pub struct ScriptedRecognizer {
    store: Arc<MemoryStore>,
    transcript: Mutex<String>,
    script: Mutex<VecDeque<PollStep>>,
    requests: Mutex<Vec<RecognitionRequest>>,
    polls: AtomicUsize,
}

impl ScriptedRecognizer {
    pub fn new(store: Arc<MemoryStore>, transcript: &str) -> Self {
        Self {
            store,
            transcript: Mutex::new(transcript.to_string()),
            script: Mutex::new(VecDeque::from(vec![PollStep::Running, PollStep::Completed])),
            requests: Mutex::new(Vec::new()),
            polls: AtomicUsize::new(0),
        }
    }

    pub fn set_script(&self, steps: Vec<PollStep>) {
        *self.script.lock().unwrap() = steps.into();
    }

    pub fn set_transcript(&self, text: &str) {
        *self.transcript.lock().unwrap() = text.to_string();
    }

    pub fn requests(&self) -> Vec<RecognitionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn poll_count(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechRecognizer for ScriptedRecognizer {
    async fn start(&self, request: &RecognitionRequest) -> Result<String, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());

        let transcript = self.transcript.lock().unwrap().clone();
        let body = json!({
            "jobName": request.job_name,
            "results": { "transcripts": [ { "transcript": transcript } ] }
        });
        self.store.insert(
            &format!("{}.json", request.job_name),
            serde_json::to_vec(&body).unwrap(),
        );

        Ok(request.job_name.clone())
    }

    async fn poll(&self, job_id: &str) -> Result<JobStatus, ProviderError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(PollStep::NotReady) => Err(ProviderError::NotReady(job_id.to_string())),
            Some(PollStep::Completed) => Ok(JobStatus::Completed),
            Some(PollStep::Failed(reason)) => Ok(JobStatus::Failed(reason)),
            Some(PollStep::Running) | None => Ok(JobStatus::Running),
        }
    }
}

// ============================================================================
// Language identification
// ============================================================================

pub struct FixedIdentifier {
    candidates: Vec<LanguageCandidate>,
}

impl FixedIdentifier {
    pub fn new(code: &str, score: f32) -> Self {
        Self {
            candidates: vec![LanguageCandidate {
                code: code.to_string(),
                score,
            }],
        }
    }
}

#[async_trait]
impl LanguageIdentifier for FixedIdentifier {
    async fn identify(&self, _text: &str) -> Result<Vec<LanguageCandidate>, ProviderError> {
        Ok(self.candidates.clone())
    }
}

// ============================================================================
// Translation
// ============================================================================

/// Always answers with the same text
pub struct FixedTranslator {
    name: &'static str,
    output: String,
    calls: AtomicUsize,
}

impl FixedTranslator {
    pub fn new(name: &'static str, output: &str) -> Self {
        Self {
            name,
            output: output.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationProvider for FixedTranslator {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn translate(
        &self,
        _text: &str,
        _source: &str,
        _target: &str,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.output.clone())
    }
}

/// Always fails with a network error
pub struct FailingTranslator {
    name: &'static str,
    calls: AtomicUsize,
}

impl FailingTranslator {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationProvider for FailingTranslator {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn translate(
        &self,
        _text: &str,
        _source: &str,
        _target: &str,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ProviderError::Network("connection refused".to_string()))
    }
}

// ============================================================================
// Synthesis
// ============================================================================

/// Records `(text, voice)` per call and answers with fixed bytes
pub struct RecordingSynthesizer {
    audio: Vec<u8>,
    calls: Mutex<Vec<(String, String)>>,
}

impl RecordingSynthesizer {
    pub fn new(audio: &[u8]) -> Self {
        Self {
            audio: audio.to_vec(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for RecordingSynthesizer {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), voice.to_string()));
        Ok(self.audio.clone())
    }
}

// ============================================================================
// OCR and demux
// ============================================================================

/// Answers every image with one page block, the given lines, and word blocks
pub struct ScriptedOcr {
    lines: Vec<String>,
}

impl ScriptedOcr {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }
}

#[async_trait]
impl TextRecognizer for ScriptedOcr {
    async fn detect(&self, _image: &[u8]) -> Result<Vec<TextBlock>, ProviderError> {
        let mut blocks = vec![TextBlock {
            kind: TextBlockKind::Page,
            text: String::new(),
        }];
        for line in &self.lines {
            blocks.push(TextBlock {
                kind: TextBlockKind::Line,
                text: line.clone(),
            });
            blocks.extend(line.split_whitespace().map(|word| TextBlock {
                kind: TextBlockKind::Word,
                text: word.to_string(),
            }));
        }
        Ok(blocks)
    }
}

/// "Demuxes" by copying the video bytes to the output path
#[derive(Default)]
pub struct CopyingDemuxer {
    calls: AtomicUsize,
}

impl CopyingDemuxer {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AudioDemuxer for CopyingDemuxer {
    async fn extract_audio(&self, video: &Path, output: &Path) -> Result<(), ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::fs::copy(video, output).await?;
        Ok(())
    }
}
