//! Audio demux through an `ffmpeg` subprocess

use crate::types::{AudioDemuxer, ProviderError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tracing::debug;

pub struct FfmpegDemuxer {
    ffmpeg_path: PathBuf,
}

impl FfmpegDemuxer {
    pub fn new(ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }
}

#[async_trait]
impl AudioDemuxer for FfmpegDemuxer {
    /// Write the first audio stream as 16 kHz mono PCM WAV
    async fn extract_audio(&self, video: &Path, output: &Path) -> Result<(), ProviderError> {
        debug!(video = %video.display(), output = %output.display(), "Running ffmpeg demux");

        let result = tokio::process::Command::new(&self.ffmpeg_path)
            .args([
                "-hide_banner",
                "-loglevel",
                "error",
                "-i",
                &video.to_string_lossy(),
                "-vn",
                "-acodec",
                "pcm_s16le",
                "-ac",
                "1",
                "-ar",
                "16000",
                "-y", // Overwrite output
                &output.to_string_lossy(),
            ])
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(ProviderError::Service(format!(
                "ffmpeg exited with {}: {}",
                result.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}
