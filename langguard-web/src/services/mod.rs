//! Pipeline stage services

pub mod acquisition;
pub mod cleanup;
pub mod detection;
pub mod extraction;
pub mod retention;
pub mod synthesis;
pub mod transcription;
pub mod translation;

pub use acquisition::Acquirer;
pub use detection::{DetectedLanguage, LanguageDetector};
pub use extraction::Extractor;
pub use synthesis::Synthesizer;
pub use transcription::{Transcriber, TranscriptionSettings};
pub use translation::{Translation, TranslationChain};
