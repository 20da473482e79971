use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::error::{Result, SublateError};
use crate::gemini::{FileState, GeminiClient, RemoteFile};
use crate::media::MediaProcessorTrait;
use crate::segment::{MediaSegment, MediaSegmenter};
use crate::subtitle::{SrtTime, SubtitleCue};
use crate::timeline::{SegmentTranscript, stitch};

const EXTRACTION_PROMPT: &str = "\
Extract all text that appears in the video (labels, intertitles, subtitles) with their exact timestamps.
Format the output as a list of entries with timestamps in HH:MM:SS format and the corresponding text.
Only include entries where text actually appears.";

/// On-screen text has no spoken end point; give every record a fixed
/// display duration.
const DISPLAY_DURATION: Duration = Duration::from_secs(3);

/// Extracts on-screen text from a video through the Gemini Files API,
/// segmenting sources that exceed the configured duration threshold and
/// stitching the per-segment results into one timeline.
pub struct VideoTextExtractor<'a> {
    gemini: &'a GeminiClient,
    media: &'a dyn MediaProcessorTrait,
    model: String,
    chunk_duration: Duration,
    poll_interval: Duration,
    request_timeout: Duration,
}

impl<'a> VideoTextExtractor<'a> {
    pub fn new(
        gemini: &'a GeminiClient,
        media: &'a dyn MediaProcessorTrait,
        model: String,
        chunk_duration: Duration,
        poll_interval: Duration,
        request_timeout: Duration,
    ) -> Self {
        Self {
            gemini,
            media,
            model,
            chunk_duration,
            poll_interval,
            request_timeout,
        }
    }

    /// Run the whole extraction and return the merged document.
    ///
    /// Segment files are transient; they are deleted when the segmented
    /// media is dropped, whether or not the merge succeeds.
    pub async fn extract(&self, input_path: &Path) -> Result<Vec<SubtitleCue>> {
        let segmenter = MediaSegmenter::new(self.media, self.chunk_duration);
        let segmented = segmenter.segment(input_path).await?;

        let mut transcripts = Vec::with_capacity(segmented.segments.len());
        for segment in &segmented.segments {
            let cues = self.extract_segment(segment).await?;
            transcripts.push(SegmentTranscript {
                cues,
                duration: segment.span.length(),
            });
        }

        stitch(transcripts)
    }

    async fn extract_segment(&self, segment: &MediaSegment) -> Result<Vec<SubtitleCue>> {
        info!("Processing {}", segment.path.display());

        let mime_type = mime_type_for(&segment.path);
        let uploaded = self.gemini.upload_file(&segment.path, mime_type).await?;
        let ready = self.wait_until_active(uploaded).await?;

        let response = self
            .gemini
            .generate_with_file(&self.model, &ready, EXTRACTION_PROMPT, self.request_timeout)
            .await?;

        if let Err(e) = self.gemini.delete_file(&ready.name).await {
            warn!("Failed to delete uploaded file {}: {}", ready.name, e);
        }

        Ok(parse_timestamped_lines(&response))
    }

    /// Poll the Files API until the upload finishes processing.
    async fn wait_until_active(&self, mut file: RemoteFile) -> Result<RemoteFile> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .expect("static spinner template is valid"),
        );
        spinner.set_message("Waiting for remote file processing");

        while file.state == FileState::Processing {
            spinner.tick();
            tokio::time::sleep(self.poll_interval).await;
            file = self.gemini.get_file(&file.name).await?;
        }
        spinner.finish_and_clear();

        match file.state {
            FileState::Active => Ok(file),
            _ => Err(SublateError::Gemini(format!(
                "File processing failed: {}",
                file.name
            ))),
        }
    }
}

/// Parse the extraction model's response into time-coded records.
///
/// Expected lines look like `HH:MM:SS some text` or `MM:SS some text`;
/// anything else is surrounding prose and is skipped.
pub fn parse_timestamped_lines(text: &str) -> Vec<SubtitleCue> {
    let mut cues = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || !line.contains(':') {
            continue;
        }

        let Some((timestamp, content)) = line.split_once(' ') else {
            continue;
        };
        let content = content.trim();
        if content.is_empty() {
            continue;
        }

        match SrtTime::parse_clock(timestamp) {
            Ok(start) => {
                cues.push(SubtitleCue {
                    index: cues.len() + 1,
                    start,
                    end: start.offset_by(DISPLAY_DURATION),
                    text: content.to_string(),
                });
            }
            Err(_) => {
                debug!("Skipping non-timestamped line: {}", line);
            }
        }
    }

    cues
}

fn mime_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("mov") => "video/quicktime",
        Some("mkv") => "video/x-matroska",
        Some("avi") => "video/x-msvideo",
        Some("webm") => "video/webm",
        _ => "video/mp4",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_timestamped_lines() {
        let response = "Here are the entries:\n\
                        00:00:05 Opening title\n\
                        01:30 Chapter one\n\
                        \n\
                        01:00:00 The end\n\
                        no timestamp here";

        let cues = parse_timestamped_lines(response);

        assert_eq!(cues.len(), 3);
        assert_eq!(cues[0].start, SrtTime::from_secs(5));
        assert_eq!(cues[0].end, SrtTime::from_secs(8));
        assert_eq!(cues[0].text, "Opening title");
        assert_eq!(cues[1].start, SrtTime::from_secs(90));
        assert_eq!(cues[2].start, SrtTime::from_secs(3600));
        assert_eq!(cues[2].index, 3);
    }

    #[test]
    fn test_parse_skips_lines_without_text() {
        let cues = parse_timestamped_lines("00:00:05\n00:10 ");
        assert!(cues.is_empty());
    }

    #[test]
    fn test_mime_type_for() {
        assert_eq!(mime_type_for(&PathBuf::from("clip.mov")), "video/quicktime");
        assert_eq!(mime_type_for(&PathBuf::from("clip.MKV")), "video/x-matroska");
        assert_eq!(mime_type_for(&PathBuf::from("clip.mp4")), "video/mp4");
        assert_eq!(mime_type_for(&PathBuf::from("clip")), "video/mp4");
    }
}
