use std::fmt;
use std::time::Duration;

use crate::error::{Result, SublateError};

/// Millisecond-precision timestamp used for all subtitle timing.
///
/// Timestamps exist as strings only at the SRT boundary; every offset
/// calculation happens on this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SrtTime {
    millis: u64,
}

impl SrtTime {
    pub fn from_secs(secs: u64) -> Self {
        Self { millis: secs * 1000 }
    }

    pub fn from_secs_f64(secs: f64) -> Self {
        Self {
            millis: (secs * 1000.0) as u64,
        }
    }

    /// Shift this timestamp forward by an offset.
    pub fn offset_by(self, offset: Duration) -> Self {
        Self {
            millis: self.millis + offset.as_millis() as u64,
        }
    }

    /// Parse the SRT timestamp format `HH:MM:SS,mmm`.
    pub fn parse(input: &str) -> Result<Self> {
        let (clock, millis) = input
            .split_once(',')
            .ok_or_else(|| SublateError::Subtitle(format!("Invalid SRT timestamp: {}", input)))?;
        let millis: u64 = millis
            .parse()
            .map_err(|_| SublateError::Subtitle(format!("Invalid milliseconds: {}", input)))?;
        Ok(Self::parse_clock(clock)?.offset_by(Duration::from_millis(millis)))
    }

    /// Parse clock timestamps as emitted by the extraction model:
    /// `HH:MM:SS` or `MM:SS`.
    pub fn parse_clock(input: &str) -> Result<Self> {
        let parts: Vec<&str> = input.split(':').collect();
        let (hours, minutes, seconds) = match parts.as_slice() {
            [h, m, s] => (*h, *m, *s),
            [m, s] => ("0", *m, *s),
            _ => {
                return Err(SublateError::Subtitle(format!(
                    "Invalid clock timestamp: {}",
                    input
                )));
            }
        };

        let parse_field = |field: &str| -> Result<u64> {
            field
                .parse()
                .map_err(|_| SublateError::Subtitle(format!("Invalid clock timestamp: {}", input)))
        };

        let total = parse_field(hours)? * 3600 + parse_field(minutes)? * 60 + parse_field(seconds)?;
        Ok(Self::from_secs(total))
    }
}

impl fmt::Display for SrtTime {
    /// Format as SRT time `HH:MM:SS,mmm`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.millis / 3_600_000;
        let minutes = (self.millis % 3_600_000) / 60_000;
        let secs = (self.millis % 60_000) / 1_000;
        let millis = self.millis % 1_000;
        write!(f, "{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
    }
}

/// One subtitle entry. Indices are 1-based and dense within a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleCue {
    pub index: usize,
    pub start: SrtTime,
    pub end: SrtTime,
    pub text: String,
}

/// Render cues as an SRT document: index line, timestamp line, text,
/// blocks separated by exactly one blank line.
pub fn format_srt(cues: &[SubtitleCue]) -> String {
    let mut content = String::new();
    for cue in cues {
        content.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            cue.index,
            cue.start,
            cue.end,
            cue.text.trim()
        ));
    }
    content
}
