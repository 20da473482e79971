use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::Command;
use tracing::info;

use super::{Transcriber, Transcript};
use crate::config::TranscriberConfig;
use crate::error::{Result, SublateError};
use crate::subtitle::{SrtTime, SubtitleCue};

/// Whisper CLI JSON output format
#[derive(Debug, Clone, Deserialize)]
pub struct WhisperOutput {
    pub text: String,
    pub segments: Vec<WhisperSegment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WhisperSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl WhisperOutput {
    fn into_transcript(self) -> Transcript {
        let cues = self
            .segments
            .into_iter()
            .enumerate()
            .map(|(index, segment)| SubtitleCue {
                index: index + 1,
                start: SrtTime::from_secs_f64(segment.start),
                end: SrtTime::from_secs_f64(segment.end),
                text: segment.text.trim().to_string(),
            })
            .collect();

        Transcript {
            text: self.text.trim().to_string(),
            cues,
        }
    }
}

/// Transcriber invoking the whisper CLI with JSON output.
pub struct WhisperTranscriber {
    config: TranscriberConfig,
}

impl WhisperTranscriber {
    pub fn new(config: TranscriberConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, audio_path: &Path, language: Option<&str>) -> Result<Transcript> {
        info!(
            "Transcribing {} with whisper model '{}'",
            audio_path.display(),
            self.config.model
        );

        let temp_dir = tempfile::tempdir()
            .map_err(|e| SublateError::Transcriber(format!("Failed to create temp directory: {}", e)))?;
        let output_dir = temp_dir.path();

        let mut cmd = Command::new(&self.config.binary_path);
        cmd.arg(audio_path)
            .arg("--model")
            .arg(&self.config.model)
            .arg("--output_dir")
            .arg(output_dir)
            .arg("--output_format")
            .arg("json");

        if let Some(lang) = language {
            cmd.arg("--language").arg(lang);
        }

        let output = cmd
            .output()
            .map_err(|e| SublateError::Transcriber(format!("Failed to execute whisper: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SublateError::Transcriber(format!(
                "Whisper failed: {}",
                stderr
            )));
        }

        let audio_filename = audio_path
            .file_stem()
            .ok_or_else(|| SublateError::Transcriber("Invalid audio filename".to_string()))?;
        let json_file = output_dir.join(format!("{}.json", audio_filename.to_string_lossy()));

        let json_content = std::fs::read_to_string(&json_file)
            .map_err(|e| SublateError::Transcriber(format!("Failed to read output: {}", e)))?;

        let whisper_output: WhisperOutput = serde_json::from_str(&json_content)
            .map_err(|e| SublateError::Transcriber(format!("Failed to parse whisper JSON: {}", e)))?;

        Ok(whisper_output.into_transcript())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whisper_output_conversion() {
        let json = r#"{
            "text": " Hello world. ",
            "segments": [
                {"start": 0.0, "end": 2.5, "text": " Hello"},
                {"start": 2.5, "end": 4.0, "text": " world."}
            ]
        }"#;

        let output: WhisperOutput = serde_json::from_str(json).unwrap();
        let transcript = output.into_transcript();

        assert_eq!(transcript.text, "Hello world.");
        assert_eq!(transcript.cues.len(), 2);
        assert_eq!(transcript.cues[0].index, 1);
        assert_eq!(transcript.cues[1].index, 2);
        assert_eq!(transcript.cues[1].start, SrtTime::from_secs_f64(2.5));
        assert_eq!(transcript.cues[1].text, "world.");
    }
}
