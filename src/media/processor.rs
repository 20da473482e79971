use async_trait::async_trait;
use std::path::Path;
use std::process::Command;
use std::time::Duration;
use tracing::info;

use super::{MediaCommandBuilder, MediaProcessorTrait};
use crate::config::MediaConfig;
use crate::error::{Result, SublateError};

/// Concrete implementation of media processor (FFmpeg-based)
pub struct MediaProcessorImpl {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
}

impl MediaProcessorImpl {
    /// Create a new media processor implementation
    pub fn new(config: MediaConfig) -> Self {
        let command_builder =
            MediaCommandBuilder::new(&config.binary_path, &config.probe_binary_path);

        Self {
            config,
            command_builder,
        }
    }
}

#[async_trait]
impl MediaProcessorTrait for MediaProcessorImpl {
    /// Extract the audio track from a video into an MP3 file
    async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> Result<()> {
        info!(
            "Extracting audio from {} to {}",
            video_path.display(),
            audio_path.display()
        );

        let command = self.command_builder.extract_audio(video_path, audio_path);
        command.execute().await?;

        info!("Audio extraction completed");
        Ok(())
    }

    /// Total duration of a media file
    async fn probe_duration(&self, media_path: &Path) -> Result<Duration> {
        let command = self.command_builder.probe_duration(media_path);
        let stdout = command.execute_capture().await?;

        let seconds: f64 = stdout.parse().map_err(|_| {
            SublateError::Media(format!("Unexpected duration probe output: {}", stdout))
        })?;

        Ok(Duration::from_secs_f64(seconds))
    }

    /// Cut a stream-copied slice of the input
    async fn cut_segment(
        &self,
        input_path: &Path,
        output_path: &Path,
        start: Duration,
        length: Duration,
    ) -> Result<()> {
        info!(
            "Cutting segment [{:?}, {:?}) of {} into {}",
            start,
            start + length,
            input_path.display(),
            output_path.display()
        );

        let command = self.command_builder.cut_segment(
            input_path,
            output_path,
            start.as_secs_f64(),
            length.as_secs_f64(),
        );
        command.execute().await
    }

    /// Check if the media toolkit is available
    fn check_availability(&self) -> Result<()> {
        let output = Command::new(&self.config.binary_path)
            .arg("-version")
            .output()
            .map_err(|e| SublateError::Media(format!("Media processor not found: {}", e)))?;

        if output.status.success() {
            info!("Media processor is available");
            Ok(())
        } else {
            Err(SublateError::Media(
                "Media processor version check failed".to_string(),
            ))
        }
    }
}
