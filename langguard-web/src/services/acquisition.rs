//! Input acquisition
//!
//! Turns a direct upload or a remote URL into one local file under the upload
//! area, named after the session. The extension is checked against the
//! declared kind's allow-list before anything is written or fetched.

use crate::error::PipelineError;
use crate::models::{AcquiredMedia, MediaInput, MediaKind, SessionId, UploadedFile};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Browser-like agent; some media hosts refuse unknown clients
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

pub struct Acquirer {
    upload_dir: PathBuf,
    http_client: Client,
}

impl Acquirer {
    /// Creates the upload area if it does not exist yet
    pub fn new(upload_dir: impl Into<PathBuf>) -> Result<Self, PipelineError> {
        let upload_dir = upload_dir.into();
        std::fs::create_dir_all(&upload_dir).map_err(|e| {
            PipelineError::Storage(format!("Create {} failed: {}", upload_dir.display(), e))
        })?;

        let http_client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .map_err(|e| PipelineError::DownloadFailed(format!("HTTP client setup: {}", e)))?;

        Ok(Self {
            upload_dir,
            http_client,
        })
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Resolve the submitted parts and write exactly one local file
    pub async fn acquire(
        &self,
        upload: Option<UploadedFile>,
        url: Option<String>,
        kind: MediaKind,
        session: &SessionId,
    ) -> Result<AcquiredMedia, PipelineError> {
        match MediaInput::from_parts(upload, url).ok_or(PipelineError::MissingInput)? {
            MediaInput::Upload(file) => self.save_upload(file, kind, session).await,
            MediaInput::Url(url) => self.download(&url, kind, session).await,
        }
    }

    async fn save_upload(
        &self,
        file: UploadedFile,
        kind: MediaKind,
        session: &SessionId,
    ) -> Result<AcquiredMedia, PipelineError> {
        let extension = extension_of(&file.filename)
            .filter(|ext| kind.allows(ext))
            .ok_or_else(|| unsupported(kind, &file.filename))?;

        let path = self
            .upload_dir
            .join(format!("{}_{}", session, sanitize_filename(&file.filename)));
        write_file(&path, &file.bytes).await?;

        info!(session_id = %session, path = %path.display(), size = file.bytes.len(), "Saved upload");
        Ok(AcquiredMedia {
            path,
            extension,
            kind,
        })
    }

    async fn download(
        &self,
        raw_url: &str,
        kind: MediaKind,
        session: &SessionId,
    ) -> Result<AcquiredMedia, PipelineError> {
        let url = Url::parse(raw_url)
            .map_err(|e| PipelineError::InvalidUrl(format!("{} ({})", raw_url, e)))?;
        if url.host_str().map_or(true, str::is_empty) {
            return Err(PipelineError::InvalidUrl(format!("{} (missing host)", raw_url)));
        }
        if !matches!(url.scheme(), "http" | "https") {
            return Err(PipelineError::InvalidUrl(format!(
                "{} (unsupported scheme '{}')",
                raw_url,
                url.scheme()
            )));
        }

        let extension = url_extension(&url).unwrap_or_else(|| kind.default_extension().to_string());
        if !kind.allows(&extension) {
            return Err(unsupported(kind, &format!(".{}", extension)));
        }

        debug!(session_id = %session, url = %url, "Downloading media");
        let response = self
            .http_client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| PipelineError::DownloadFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::DownloadFailed(format!("HTTP {} from {}", status, url)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PipelineError::DownloadFailed(e.to_string()))?;

        let path = self.upload_dir.join(format!("{}.{}", session, extension));
        write_file(&path, &bytes).await?;

        info!(session_id = %session, path = %path.display(), size = bytes.len(), "Downloaded media");
        Ok(AcquiredMedia {
            path,
            extension,
            kind,
        })
    }
}

fn unsupported(kind: MediaKind, name: &str) -> PipelineError {
    PipelineError::UnsupportedFormat(format!(
        "'{}' is not a supported {} file (allowed: {})",
        name,
        kind,
        kind.allowed_extensions().join(", ")
    ))
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<(), PipelineError> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| PipelineError::Storage(format!("Write {} failed: {}", path.display(), e)))
}

/// Lower-cased text after the last `.` of a file name
pub fn extension_of(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn url_extension(url: &Url) -> Option<String> {
    let last_segment = url.path_segments()?.next_back()?;
    extension_of(last_segment)
}

/// Reduce a client-supplied file name to a safe single path component
///
/// Directory parts are dropped and anything outside `[A-Za-z0-9._-]` becomes
/// `_`.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .trim();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_text_after_last_dot() {
        assert_eq!(extension_of("talk.MP3").as_deref(), Some("mp3"));
        assert_eq!(extension_of("archive.tar.gz").as_deref(), Some("gz"));
        assert_eq!(extension_of("README"), None);
        assert_eq!(extension_of(".hidden"), None);
        assert_eq!(extension_of("trailing."), None);
    }

    #[test]
    fn url_extension_ignores_query() {
        let url = Url::parse("https://cdn.example.com/media/clip.MP4?token=abc").unwrap();
        assert_eq!(url_extension(&url).as_deref(), Some("mp4"));
        let bare = Url::parse("https://example.com/watch").unwrap();
        assert_eq!(url_extension(&bare), None);
    }

    #[test]
    fn sanitize_strips_directories_and_odd_characters() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\notes.txt"), "notes.txt");
        assert_eq!(sanitize_filename("my talk (final).mp3"), "my_talk__final_.mp3");
        assert_eq!(sanitize_filename(".."), "upload");
    }
}
