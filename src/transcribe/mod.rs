// Speech-to-text abstraction
//
// Transcription happens through an external whisper CLI; the trait keeps
// the pipeline independent of the concrete engine.

pub mod whisper;

use async_trait::async_trait;
use std::path::Path;

pub use whisper::WhisperTranscriber;

use crate::config::TranscriberConfig;
use crate::error::Result;
use crate::subtitle::SubtitleCue;

/// A transcribed audio file: the flat text plus its time-coded cues.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub text: String,
    pub cues: Vec<SubtitleCue>,
}

/// Main trait for transcription operations
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file, optionally hinting the source language
    async fn transcribe(&self, audio_path: &Path, language: Option<&str>) -> Result<Transcript>;
}

/// Factory for creating transcriber instances
pub struct TranscriberFactory;

impl TranscriberFactory {
    /// Create the default transcriber implementation (whisper CLI)
    pub fn create_default(config: TranscriberConfig) -> Box<dyn Transcriber> {
        Box::new(WhisperTranscriber::new(config))
    }
}
