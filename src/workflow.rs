use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::fs;
use tracing::info;

use crate::config::Config;
use crate::error::{Result, SublateError};
use crate::extract::VideoTextExtractor;
use crate::gemini::GeminiClient;
use crate::media::{MediaProcessorFactory, MediaProcessorTrait};
use crate::subtitle::format_srt;
use crate::transcribe::{Transcriber, TranscriberFactory};
use crate::translate::{GeminiTranslator, SubtitleTranslator, build_prompt};

/// Output format for transcription results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptFormat {
    Text,
    Srt,
}

impl TranscriptFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Srt => "srt",
        }
    }
}

pub struct Workflow {
    config: Config,
    media: Box<dyn MediaProcessorTrait>,
    transcriber: Box<dyn Transcriber>,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let media = MediaProcessorFactory::create_processor(config.media.clone());
        let transcriber = TranscriberFactory::create_default(config.transcriber.clone());

        Ok(Self {
            config,
            media,
            transcriber,
        })
    }

    /// Translate an SRT subtitle file.
    pub async fn translate_subtitles<P: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: P,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<()> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();

        if !input_path.exists() {
            return Err(SublateError::FileNotFound(input_path.display().to_string()));
        }

        info!(
            "Translating {} from {} to {} using {} parallel requests with {} max requests per minute",
            input_path.display(),
            source_lang,
            target_lang,
            self.config.translate.parallel_requests,
            self.config.translate.max_requests_per_minute
        );

        let client = GeminiClient::new(&self.config.gemini)?;
        let prompt = build_prompt(
            self.config.translate.prompt.as_deref(),
            source_lang,
            target_lang,
        );
        let transform = Arc::new(GeminiTranslator::new(
            client,
            self.config.gemini.translate_model.clone(),
            prompt,
        ));
        let translator = SubtitleTranslator::new(&self.config.translate, transform);

        let content = fs::read_to_string(input_path).await?;
        let translated = translator.translate_document(&content).await?;

        write_output(output_path, &translated).await?;

        info!("Translation completed. Output saved to: {}", output_path.display());
        Ok(())
    }

    /// Transcribe an audio file; the output path is derived from the
    /// input stem.
    pub async fn transcribe_audio<P: AsRef<Path>>(
        &self,
        audio_path: P,
        language: Option<&str>,
        format: TranscriptFormat,
    ) -> Result<PathBuf> {
        let audio_path = audio_path.as_ref();

        if !audio_path.exists() {
            return Err(SublateError::FileNotFound(audio_path.display().to_string()));
        }

        let transcript = self.transcriber.transcribe(audio_path, language).await?;

        let output_path =
            derived_path(audio_path, "transcript", format.extension());
        let content = match format {
            TranscriptFormat::Text => transcript.text,
            TranscriptFormat::Srt => format_srt(&transcript.cues),
        };
        write_output(&output_path, &content).await?;

        info!("Transcription saved to: {}", output_path.display());
        Ok(output_path)
    }

    /// Extract the audio track from a video into an MP3 file.
    pub async fn extract_audio<P: AsRef<Path>>(
        &self,
        video_path: P,
        output_path: Option<PathBuf>,
    ) -> Result<PathBuf> {
        let video_path = video_path.as_ref();

        if !video_path.exists() {
            return Err(SublateError::FileNotFound(video_path.display().to_string()));
        }

        self.media.check_availability()?;

        let audio_path =
            output_path.unwrap_or_else(|| derived_path(video_path, "audio", "mp3"));
        if let Some(parent) = audio_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        self.media.extract_audio(video_path, &audio_path).await?;
        Ok(audio_path)
    }

    /// Extract audio from a video, then transcribe it.
    pub async fn process_video<P: AsRef<Path>>(
        &self,
        video_path: P,
        audio_output: Option<PathBuf>,
        language: Option<&str>,
        format: TranscriptFormat,
    ) -> Result<PathBuf> {
        let audio_path = self.extract_audio(video_path, audio_output).await?;
        let transcript_path = self.transcribe_audio(&audio_path, language, format).await?;

        info!("Video processing completed successfully");
        Ok(transcript_path)
    }

    /// Extract on-screen text from a video into an SRT file, segmenting
    /// sources longer than the configured chunk duration.
    pub async fn extract_video_text<P: AsRef<Path>>(
        &self,
        video_path: P,
        output_path: Option<PathBuf>,
        chunk_duration: Option<Duration>,
        model: Option<String>,
    ) -> Result<PathBuf> {
        let video_path = video_path.as_ref();

        if !video_path.exists() {
            return Err(SublateError::FileNotFound(video_path.display().to_string()));
        }

        self.media.check_availability()?;

        let client = GeminiClient::new(&self.config.gemini)?;
        let extractor = VideoTextExtractor::new(
            &client,
            self.media.as_ref(),
            model.unwrap_or_else(|| self.config.gemini.extract_model.clone()),
            chunk_duration
                .unwrap_or_else(|| Duration::from_secs(self.config.media.chunk_duration_secs)),
            Duration::from_secs(self.config.gemini.poll_interval_secs),
            Duration::from_secs(self.config.gemini.extract_timeout_secs),
        );

        let document = extractor.extract(video_path).await?;

        let output_path =
            output_path.unwrap_or_else(|| derived_path(video_path, "extracted", "srt"));
        write_output(&output_path, &format_srt(&document)).await?;

        info!(
            "Successfully processed video. Output saved to: {}",
            output_path.display()
        );
        Ok(output_path)
    }
}

/// Derive an output path next to the input: `{stem}_{suffix}.{extension}`.
fn derived_path(input: &Path, suffix: &str, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}_{}.{}", stem, suffix, extension))
}

async fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    fs::write(path, content).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_path() {
        assert_eq!(
            derived_path(Path::new("/videos/movie.mp4"), "audio", "mp3"),
            PathBuf::from("/videos/movie_audio.mp3")
        );
        assert_eq!(
            derived_path(Path::new("clip.wav"), "transcript", "srt"),
            PathBuf::from("clip_transcript.srt")
        );
    }

    #[test]
    fn test_transcript_format_extension() {
        assert_eq!(TranscriptFormat::Text.extension(), "txt");
        assert_eq!(TranscriptFormat::Srt.extension(), "srt");
    }
}
