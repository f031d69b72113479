//! Media kinds, submitted inputs and acquired files

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Declared kind of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Document,
    Video,
    Image,
}

impl MediaKind {
    pub const ALL: [MediaKind; 4] = [
        MediaKind::Audio,
        MediaKind::Document,
        MediaKind::Video,
        MediaKind::Image,
    ];

    /// Lower-case extensions accepted for this kind
    pub fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            MediaKind::Audio => &["mp3", "wav", "m4a", "flac"],
            MediaKind::Document => &["pdf", "docx", "txt"],
            MediaKind::Video => &["mp4", "mov", "avi", "mkv"],
            MediaKind::Image => &["jpg", "jpeg", "png", "gif"],
        }
    }

    /// Extension assumed for a URL whose path has none
    pub fn default_extension(&self) -> &'static str {
        match self {
            MediaKind::Audio => "mp3",
            MediaKind::Document => "txt",
            MediaKind::Video => "mp4",
            MediaKind::Image => "png",
        }
    }

    pub fn allows(&self, extension: &str) -> bool {
        self.allowed_extensions()
            .iter()
            .any(|e| e.eq_ignore_ascii_case(extension))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Document => "document",
            MediaKind::Video => "video",
            MediaKind::Image => "image",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "audio" => Ok(MediaKind::Audio),
            "document" => Ok(MediaKind::Document),
            "video" => Ok(MediaKind::Video),
            "image" => Ok(MediaKind::Image),
            other => Err(format!("Unknown media kind: {}", other)),
        }
    }
}

/// File received in a multipart form
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Resolved submission: exactly one source of bytes
#[derive(Debug, Clone)]
pub enum MediaInput {
    Upload(UploadedFile),
    Url(String),
}

impl MediaInput {
    /// Pick the usable input, preferring the upload
    ///
    /// An upload with an empty filename and a blank URL both count as absent.
    pub fn from_parts(upload: Option<UploadedFile>, url: Option<String>) -> Option<Self> {
        if let Some(file) = upload.filter(|f| !f.filename.trim().is_empty()) {
            return Some(MediaInput::Upload(file));
        }
        url.map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .map(MediaInput::Url)
    }
}

/// Local, type-tagged input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquiredMedia {
    pub path: PathBuf,
    /// Lower-case extension, always in the kind's allow-list
    pub extension: String,
    pub kind: MediaKind,
}
