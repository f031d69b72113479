//! Capability adapters for external services

#[cfg(feature = "aws")]
pub mod aws;
pub mod fallback;
pub mod ffmpeg;
pub mod google_translate;
pub mod google_tts;

use crate::config::AppConfig;
use crate::types::{Capabilities, ProviderError, TranslationProvider};
use std::sync::Arc;

pub use fallback::{PassthroughTranslator, Unavailable};
pub use ffmpeg::FfmpegDemuxer;
pub use google_translate::GooglePublicTranslator;
pub use google_tts::GoogleTtsSynthesizer;

/// Build the production capability set from configuration
///
/// Translation chain order: public endpoint, cloud translation, passthrough.
pub async fn build_capabilities(config: &AppConfig) -> Result<Capabilities, ProviderError> {
    let demuxer = Arc::new(FfmpegDemuxer::new(config.ffmpeg_path.clone()));
    let generic_synthesizer = Arc::new(GoogleTtsSynthesizer::new()?);
    let mut translators: Vec<Arc<dyn TranslationProvider>> =
        vec![Arc::new(GooglePublicTranslator::new()?)];

    #[cfg(feature = "aws")]
    let capabilities = {
        let settings = aws::AwsSettings {
            profile: config.aws.profile.clone(),
            region: config.aws.region.clone(),
            bucket: config.storage.bucket.clone(),
        };
        let sdk_config = aws::load_sdk_config(&settings).await;
        tracing::info!(
            bucket = %settings.bucket,
            region = ?sdk_config.region().map(|r| r.to_string()),
            "AWS capabilities configured"
        );

        translators.push(Arc::new(aws::AwsTranslator::new(&sdk_config)));
        translators.push(Arc::new(PassthroughTranslator));

        Capabilities {
            object_store: Arc::new(aws::S3ObjectStore::new(&sdk_config, &settings.bucket)),
            speech_recognizer: Arc::new(aws::TranscribeRecognizer::new(
                &sdk_config,
                &settings.bucket,
            )),
            language_identifier: Arc::new(aws::ComprehendIdentifier::new(&sdk_config)),
            translators,
            premium_synthesizer: Arc::new(aws::PollySynthesizer::new(&sdk_config)),
            generic_synthesizer,
            text_recognizer: Arc::new(aws::TextractRecognizer::new(&sdk_config)),
            audio_demuxer: demuxer,
        }
    };

    #[cfg(not(feature = "aws"))]
    let capabilities = {
        tracing::warn!("Built without the `aws` feature: recognition, identification, premium voices and OCR are unavailable");
        translators.push(Arc::new(Unavailable::new("cloud-translation")));
        translators.push(Arc::new(PassthroughTranslator));

        Capabilities {
            object_store: Arc::new(Unavailable::new("object-store")),
            speech_recognizer: Arc::new(Unavailable::new("speech-recognition")),
            language_identifier: Arc::new(Unavailable::new("language-identification")),
            translators,
            premium_synthesizer: Arc::new(Unavailable::new("premium-synthesis")),
            generic_synthesizer,
            text_recognizer: Arc::new(Unavailable::new("ocr")),
            audio_demuxer: demuxer,
        }
    };

    Ok(capabilities)
}
