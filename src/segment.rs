use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;
use tracing::info;

use crate::error::{Result, SublateError};
use crate::media::MediaProcessorTrait;

/// A contiguous time slice `[start, end)` of a media source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentSpan {
    pub start: Duration,
    pub end: Duration,
}

impl SegmentSpan {
    pub fn length(&self) -> Duration {
        self.end - self.start
    }
}

/// One materialized media segment, consumable by the transcription
/// collaborator.
#[derive(Debug)]
pub struct MediaSegment {
    pub path: PathBuf,
    pub span: SegmentSpan,
}

/// Segments of one source video. Cut segments live in a temporary
/// directory that is removed on drop, so transient artifacts never
/// outlive the run even when a downstream merge fails.
#[derive(Debug)]
pub struct SegmentedMedia {
    pub segments: Vec<MediaSegment>,
    _workdir: Option<TempDir>,
}

/// Partition `[0, total)` into spans of at most `chunk_duration`, the
/// last one truncated to `total`.
pub fn plan_segments(total: Duration, chunk_duration: Duration) -> Vec<SegmentSpan> {
    if total <= chunk_duration {
        return vec![SegmentSpan {
            start: Duration::ZERO,
            end: total,
        }];
    }

    let mut spans = Vec::new();
    let mut start = Duration::ZERO;
    while start < total {
        let end = (start + chunk_duration).min(total);
        spans.push(SegmentSpan { start, end });
        start = end;
    }
    spans
}

/// Splits a long media source into fixed-duration segments.
pub struct MediaSegmenter<'a> {
    media: &'a dyn MediaProcessorTrait,
    chunk_duration: Duration,
}

impl<'a> MediaSegmenter<'a> {
    pub fn new(media: &'a dyn MediaProcessorTrait, chunk_duration: Duration) -> Self {
        Self {
            media,
            chunk_duration,
        }
    }

    /// Probe the source duration and cut it into segments when it
    /// exceeds the threshold; a short source passes through untouched.
    pub async fn segment(&self, input_path: &Path) -> Result<SegmentedMedia> {
        let total = self.media.probe_duration(input_path).await?;

        let spans = plan_segments(total, self.chunk_duration);
        if spans.len() == 1 {
            return Ok(SegmentedMedia {
                segments: vec![MediaSegment {
                    path: input_path.to_path_buf(),
                    span: spans[0],
                }],
                _workdir: None,
            });
        }

        info!(
            "Splitting {:?} of media into {} segments of at most {:?}",
            total,
            spans.len(),
            self.chunk_duration
        );

        let workdir = tempfile::tempdir()?;
        let stem = input_path
            .file_stem()
            .ok_or_else(|| SublateError::Media("Invalid media filename".to_string()))?
            .to_string_lossy()
            .to_string();

        let mut segments = Vec::with_capacity(spans.len());
        for (index, span) in spans.into_iter().enumerate() {
            let segment_path = workdir.path().join(format!("{}_segment_{}.mp4", stem, index));
            self.media
                .cut_segment(input_path, &segment_path, span.start, span.length())
                .await?;
            segments.push(MediaSegment {
                path: segment_path,
                span,
            });
        }

        Ok(SegmentedMedia {
            segments,
            _workdir: Some(workdir),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(value: u64) -> Duration {
        Duration::from_secs(value)
    }

    #[test]
    fn test_plan_splits_long_media_with_truncated_tail() {
        let spans = plan_segments(secs(2500), secs(1200));
        assert_eq!(
            spans,
            vec![
                SegmentSpan { start: secs(0), end: secs(1200) },
                SegmentSpan { start: secs(1200), end: secs(2400) },
                SegmentSpan { start: secs(2400), end: secs(2500) },
            ]
        );
    }

    #[test]
    fn test_plan_keeps_short_media_whole() {
        let spans = plan_segments(secs(900), secs(1200));
        assert_eq!(spans, vec![SegmentSpan { start: secs(0), end: secs(900) }]);
    }

    #[test]
    fn test_plan_exact_multiple_has_no_empty_tail() {
        let spans = plan_segments(secs(2400), secs(1200));
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[1].end, secs(2400));
    }

    #[test]
    fn test_plan_boundary_equality_is_single_segment() {
        let spans = plan_segments(secs(1200), secs(1200));
        assert_eq!(spans.len(), 1);
    }

    #[test]
    fn test_span_length() {
        let span = SegmentSpan { start: secs(2400), end: secs(2500) };
        assert_eq!(span.length(), secs(100));
    }
}
