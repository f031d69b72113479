//! AWS capability adapters
//!
//! S3 (object store), Transcribe (speech recognition), Comprehend (language
//! identification), Translate, Polly (premium voices) and Textract (OCR),
//! all built from one shared SDK config.

use crate::types::{
    JobStatus, LanguageCandidate, LanguageHint, LanguageIdentifier, ObjectStore, ProviderError,
    RecognitionRequest, SpeechRecognizer, SpeechSynthesizer, TextBlock, TextBlockKind,
    TextRecognizer, TranslationProvider,
};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use tracing::debug;

/// Connection settings for the AWS adapters
#[derive(Debug, Clone, Default)]
pub struct AwsSettings {
    pub profile: Option<String>,
    pub region: Option<String>,
    pub bucket: String,
}

/// Load the SDK config from the default provider chain
///
/// Profile and region override the chain when configured.
pub async fn load_sdk_config(settings: &AwsSettings) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(profile) = &settings.profile {
        loader = loader.profile_name(profile);
    }
    if let Some(region) = &settings.region {
        loader = loader.region(Region::new(region.clone()));
    }
    loader.load().await
}

// ============================================================================
// S3
// ============================================================================

pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(config: &SdkConfig, bucket: impl Into<String>) -> Self {
        Self {
            client: aws_sdk_s3::Client::new(config),
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), ProviderError> {
        debug!(bucket = %self.bucket, key, size = bytes.len(), "S3 put_object");
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(aws_sdk_s3::primitives::ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| {
                ProviderError::Service(format!(
                    "S3 put_object failed: {}",
                    aws_sdk_s3::error::DisplayErrorContext(&e)
                ))
            })?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, ProviderError> {
        debug!(bucket = %self.bucket, key, "S3 get_object");
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                ProviderError::Service(format!(
                    "S3 get_object failed: {}",
                    aws_sdk_s3::error::DisplayErrorContext(&e)
                ))
            })?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| ProviderError::Network(format!("S3 body read failed: {}", e)))?;
        Ok(data.into_bytes().to_vec())
    }
}

// ============================================================================
// Transcribe
// ============================================================================

pub struct TranscribeRecognizer {
    client: aws_sdk_transcribe::Client,
    bucket: String,
}

impl TranscribeRecognizer {
    pub fn new(config: &SdkConfig, bucket: impl Into<String>) -> Self {
        Self {
            client: aws_sdk_transcribe::Client::new(config),
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl SpeechRecognizer for TranscribeRecognizer {
    async fn start(&self, request: &RecognitionRequest) -> Result<String, ProviderError> {
        use aws_sdk_transcribe::types::{LanguageCode, Media, MediaFormat};

        let media = Media::builder()
            .media_file_uri(format!("s3://{}/{}", self.bucket, request.media_key))
            .build();

        let mut call = self
            .client
            .start_transcription_job()
            .transcription_job_name(&request.job_name)
            .media(media)
            .media_format(MediaFormat::from(request.media_format.as_str()))
            .output_bucket_name(&self.bucket);

        call = match &request.language {
            LanguageHint::Locale(locale) => call.language_code(LanguageCode::from(locale.as_str())),
            LanguageHint::Identify(options) => call.identify_language(true).set_language_options(
                Some(
                    options
                        .iter()
                        .map(|locale| LanguageCode::from(locale.as_str()))
                        .collect(),
                ),
            ),
        };

        debug!(job = %request.job_name, "Starting transcription job");
        call.send().await.map_err(|e| {
            ProviderError::Service(format!(
                "StartTranscriptionJob failed: {}",
                aws_sdk_transcribe::error::DisplayErrorContext(&e)
            ))
        })?;

        Ok(request.job_name.clone())
    }

    async fn poll(&self, job_id: &str) -> Result<JobStatus, ProviderError> {
        use aws_sdk_transcribe::types::TranscriptionJobStatus;

        let output = match self
            .client
            .get_transcription_job()
            .transcription_job_name(job_id)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) => {
                let not_visible = err
                    .as_service_error()
                    .map(|e| e.is_bad_request_exception() || e.is_not_found_exception())
                    .unwrap_or(false);
                let message = format!("{}", aws_sdk_transcribe::error::DisplayErrorContext(&err));
                return Err(if not_visible {
                    ProviderError::NotReady(message)
                } else {
                    ProviderError::Service(message)
                });
            }
        };

        let job = output
            .transcription_job()
            .ok_or_else(|| ProviderError::Parse("Response has no transcription job".into()))?;

        Ok(match job.transcription_job_status() {
            Some(TranscriptionJobStatus::Completed) => JobStatus::Completed,
            Some(TranscriptionJobStatus::Failed) => JobStatus::Failed(
                job.failure_reason().unwrap_or("no reason given").to_string(),
            ),
            _ => JobStatus::Running,
        })
    }
}

// ============================================================================
// Comprehend
// ============================================================================

pub struct ComprehendIdentifier {
    client: aws_sdk_comprehend::Client,
}

impl ComprehendIdentifier {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_comprehend::Client::new(config),
        }
    }
}

#[async_trait]
impl LanguageIdentifier for ComprehendIdentifier {
    async fn identify(&self, text: &str) -> Result<Vec<LanguageCandidate>, ProviderError> {
        let output = self
            .client
            .detect_dominant_language()
            .text(text)
            .send()
            .await
            .map_err(|e| {
                ProviderError::Service(format!(
                    "DetectDominantLanguage failed: {}",
                    aws_sdk_comprehend::error::DisplayErrorContext(&e)
                ))
            })?;

        Ok(output
            .languages()
            .iter()
            .filter_map(|lang| {
                Some(LanguageCandidate {
                    code: lang.language_code()?.to_string(),
                    score: lang.score().unwrap_or(0.0),
                })
            })
            .collect())
    }
}

// ============================================================================
// Translate
// ============================================================================

pub struct AwsTranslator {
    client: aws_sdk_translate::Client,
}

impl AwsTranslator {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_translate::Client::new(config),
        }
    }
}

#[async_trait]
impl TranslationProvider for AwsTranslator {
    fn name(&self) -> &'static str {
        "aws-translate"
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, ProviderError> {
        let output = self
            .client
            .translate_text()
            .text(text)
            .source_language_code(source)
            .target_language_code(target)
            .send()
            .await
            .map_err(|e| {
                ProviderError::Service(format!(
                    "TranslateText failed: {}",
                    aws_sdk_translate::error::DisplayErrorContext(&e)
                ))
            })?;

        Ok(output.translated_text().to_string())
    }
}

// ============================================================================
// Polly
// ============================================================================

pub struct PollySynthesizer {
    client: aws_sdk_polly::Client,
}

impl PollySynthesizer {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_polly::Client::new(config),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for PollySynthesizer {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, ProviderError> {
        use aws_sdk_polly::types::{OutputFormat, VoiceId};

        let output = self
            .client
            .synthesize_speech()
            .text(text)
            .output_format(OutputFormat::Mp3)
            .voice_id(VoiceId::from(voice))
            .send()
            .await
            .map_err(|e| {
                ProviderError::Service(format!(
                    "SynthesizeSpeech failed: {}",
                    aws_sdk_polly::error::DisplayErrorContext(&e)
                ))
            })?;

        let data = output
            .audio_stream
            .collect()
            .await
            .map_err(|e| ProviderError::Network(format!("Polly stream read failed: {}", e)))?;
        Ok(data.into_bytes().to_vec())
    }
}

// ============================================================================
// Textract
// ============================================================================

pub struct TextractRecognizer {
    client: aws_sdk_textract::Client,
}

impl TextractRecognizer {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_textract::Client::new(config),
        }
    }
}

#[async_trait]
impl TextRecognizer for TextractRecognizer {
    async fn detect(&self, image: &[u8]) -> Result<Vec<TextBlock>, ProviderError> {
        use aws_sdk_textract::primitives::Blob;
        use aws_sdk_textract::types::{BlockType, Document};

        let document = Document::builder().bytes(Blob::new(image.to_vec())).build();
        let output = self
            .client
            .detect_document_text()
            .document(document)
            .send()
            .await
            .map_err(|e| {
                ProviderError::Service(format!(
                    "DetectDocumentText failed: {}",
                    aws_sdk_textract::error::DisplayErrorContext(&e)
                ))
            })?;

        Ok(output
            .blocks()
            .iter()
            .filter_map(|block| {
                let kind = match block.block_type() {
                    Some(BlockType::Page) => TextBlockKind::Page,
                    Some(BlockType::Line) => TextBlockKind::Line,
                    Some(BlockType::Word) => TextBlockKind::Word,
                    _ => TextBlockKind::Other,
                };
                block.text().map(|text| TextBlock {
                    kind,
                    text: text.to_string(),
                })
            })
            .collect())
    }
}
