// Media processing abstraction
//
// This module provides a clean abstraction over the external media
// toolkit (ffmpeg/ffprobe): audio demuxing, duration probing, and
// stream-copy segment cuts.

pub mod commands;
pub mod processor;

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

pub use commands::*;
pub use processor::*;

use crate::config::MediaConfig;
use crate::error::Result;

/// Main trait for media processing operations
#[async_trait]
pub trait MediaProcessorTrait: Send + Sync {
    /// Extract the audio track from a video into an MP3 file
    async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> Result<()>;

    /// Total duration of a media file
    async fn probe_duration(&self, media_path: &Path) -> Result<Duration>;

    /// Cut a stream-copied slice `[start, start + length)` of the input
    async fn cut_segment(
        &self,
        input_path: &Path,
        output_path: &Path,
        start: Duration,
        length: Duration,
    ) -> Result<()>;

    /// Check if the media toolkit is available
    fn check_availability(&self) -> Result<()>;
}

/// Factory for creating media processor instances
pub struct MediaProcessorFactory;

impl MediaProcessorFactory {
    /// Create the default media processor implementation (FFmpeg-based)
    pub fn create_processor(config: MediaConfig) -> Box<dyn MediaProcessorTrait> {
        Box::new(processor::MediaProcessorImpl::new(config))
    }
}
