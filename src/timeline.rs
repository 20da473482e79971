use std::time::Duration;

use crate::error::{Result, SublateError};
use crate::subtitle::{SrtTime, SubtitleCue};

/// The records extracted from one media segment, with timestamps
/// relative to the segment's own beginning.
#[derive(Debug, Clone)]
pub struct SegmentTranscript {
    pub cues: Vec<SubtitleCue>,
    pub duration: Duration,
}

/// Merge per-segment records into one continuous document.
///
/// Each segment's cues are shifted by the cumulative actual duration of
/// all preceding segments and re-indexed densely from 1. A start that
/// fails to increase over its predecessor means the upstream extraction
/// is malformed; that is surfaced as an error, never silently reordered.
pub fn stitch(segments: Vec<SegmentTranscript>) -> Result<Vec<SubtitleCue>> {
    let mut merged: Vec<SubtitleCue> = Vec::new();
    let mut offset = Duration::ZERO;
    let mut previous_start: Option<SrtTime> = None;

    for (segment_index, segment) in segments.into_iter().enumerate() {
        for cue in segment.cues {
            let start = cue.start.offset_by(offset);
            let end = cue.end.offset_by(offset);

            if let Some(previous) = previous_start {
                if start <= previous {
                    return Err(SublateError::Timeline(format!(
                        "Start {} in segment {} does not advance past {}",
                        start,
                        segment_index + 1,
                        previous
                    )));
                }
            }
            previous_start = Some(start);

            merged.push(SubtitleCue {
                index: merged.len() + 1,
                start,
                end,
                text: cue.text,
            });
        }

        offset += segment.duration;
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cue(index: usize, start_secs: u64, end_secs: u64) -> SubtitleCue {
        SubtitleCue {
            index,
            start: SrtTime::from_secs(start_secs),
            end: SrtTime::from_secs(end_secs),
            text: format!("cue {}", index),
        }
    }

    #[test]
    fn test_stitch_applies_cumulative_offsets_and_reindexes() {
        let segments = vec![
            SegmentTranscript {
                cues: vec![cue(1, 10, 13), cue(2, 50, 53)],
                duration: Duration::from_secs(1200),
            },
            SegmentTranscript {
                cues: vec![cue(1, 5, 8), cue(2, 30, 33)],
                duration: Duration::from_secs(800),
            },
        ];

        let merged = stitch(segments).unwrap();

        let starts: Vec<SrtTime> = merged.iter().map(|c| c.start).collect();
        assert_eq!(
            starts,
            vec![
                SrtTime::from_secs(10),
                SrtTime::from_secs(50),
                SrtTime::from_secs(1205),
                SrtTime::from_secs(1230),
            ]
        );

        let indices: Vec<usize> = merged.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_stitch_uses_actual_durations_not_nominal_ones() {
        // A short middle segment must shift the following segment by its
        // real length, not the configured chunk duration.
        let segments = vec![
            SegmentTranscript {
                cues: vec![cue(1, 10, 13)],
                duration: Duration::from_secs(700),
            },
            SegmentTranscript {
                cues: vec![cue(1, 20, 23)],
                duration: Duration::from_secs(1200),
            },
        ];

        let merged = stitch(segments).unwrap();
        assert_eq!(merged[1].start, SrtTime::from_secs(720));
    }

    #[test]
    fn test_stitch_rejects_unsorted_segment_records() {
        let segments = vec![SegmentTranscript {
            cues: vec![cue(1, 50, 53), cue(2, 10, 13)],
            duration: Duration::from_secs(1200),
        }];

        assert!(matches!(
            stitch(segments),
            Err(SublateError::Timeline(_))
        ));
    }

    #[test]
    fn test_stitch_rejects_non_advancing_start_across_segments() {
        // Second segment's shifted start equals the previous record's.
        let segments = vec![
            SegmentTranscript {
                cues: vec![cue(1, 100, 103)],
                duration: Duration::from_secs(100),
            },
            SegmentTranscript {
                cues: vec![cue(1, 0, 3)],
                duration: Duration::from_secs(100),
            },
        ];

        assert!(matches!(
            stitch(segments),
            Err(SublateError::Timeline(_))
        ));
    }

    #[test]
    fn test_stitch_tolerates_empty_segments() {
        let segments = vec![
            SegmentTranscript {
                cues: vec![],
                duration: Duration::from_secs(1200),
            },
            SegmentTranscript {
                cues: vec![cue(1, 5, 8)],
                duration: Duration::from_secs(800),
            },
        ];

        let merged = stitch(segments).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].start, SrtTime::from_secs(1205));
        assert_eq!(merged[0].index, 1);
    }
}
