//! Pipeline result record and artifact kinds

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{MediaKind, SessionId};
use crate::languages;

/// Named blob stored per session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Extracted or transcribed source text
    Transcript,
    /// Translated text
    Translation,
    /// Synthesized speech (MP3)
    Audio,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::Transcript,
        ArtifactKind::Translation,
        ArtifactKind::Audio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Transcript => "transcript",
            ArtifactKind::Translation => "translation",
            ArtifactKind::Audio => "audio",
        }
    }

    /// File name offered in the download's Content-Disposition
    pub fn download_name(&self) -> &'static str {
        match self {
            ArtifactKind::Transcript => "transcript.txt",
            ArtifactKind::Translation => "translation.txt",
            ArtifactKind::Audio => "translated_audio.mp3",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ArtifactKind::Transcript | ArtifactKind::Translation => "text/plain; charset=utf-8",
            ArtifactKind::Audio => "audio/mpeg",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| format!("Unknown artifact: {}", name))
    }
}

/// Language code with its canonical name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageRef {
    pub code: String,
    pub name: String,
}

impl LanguageRef {
    /// Name looked up from the language table
    pub fn from_code(code: &str) -> Self {
        Self {
            code: code.to_string(),
            name: languages::name_for_code(code).to_string(),
        }
    }
}

/// Immutable outcome of one pipeline invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub session_id: SessionId,
    pub media_kind: MediaKind,
    pub source_language: LanguageRef,
    pub target_language: LanguageRef,
    /// Detection confidence in `[0, 1]`; 1.0 when the source was given
    pub confidence: f32,
    pub source_text: String,
    pub translated_text: String,
    /// False when source and target languages were equal
    pub has_translation: bool,
    /// Provider that produced the translated text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation_provider: Option<String>,
    /// True when the text came from the passthrough provider
    #[serde(default)]
    pub degraded: bool,
    pub artifacts: Vec<ArtifactKind>,
    /// Warnings surfaced to the user (locale fallback, degraded translation)
    #[serde(default)]
    pub notices: Vec<String>,
    pub created_at: DateTime<Utc>,
}
