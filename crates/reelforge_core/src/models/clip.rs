//! Clip specification: the immutable description of one candidate short clip.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One timestamped word or phrase from the transcription collaborator.
///
/// Times are absolute seconds in the source video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptToken {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

impl TranscriptToken {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }
}

/// Immutable description of one candidate clip: time range plus metadata.
///
/// A `ClipSpec` is validated once when a render job picks it up and is
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipSpec {
    /// Source video the clip is cut from.
    pub source: PathBuf,
    /// Clip start in seconds (absolute source time).
    pub start: f64,
    /// Clip end in seconds (absolute source time).
    pub end: f64,
    /// Short title used for the output filename and logs.
    pub title: String,
    /// Transcript text covering the clip's range.
    pub text_segment: String,
    /// Viral potential score, 0-100.
    pub score: u8,
    /// Timestamped tokens covering the clip's range (absolute times).
    #[serde(default)]
    pub tokens: Vec<TranscriptToken>,
    /// Optional attention line drawn over the first seconds of the clip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook_text: Option<String>,
}

impl ClipSpec {
    /// Clip duration in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Validate the clip's own data.
    ///
    /// Checks the time range and score bounds. Source readability is a
    /// preparation concern, not a validation concern, and is checked when
    /// the job starts work.
    pub fn validate(&self, max_duration_secs: f64) -> Result<(), ValidationError> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(ValidationError::BadTimeRange {
                start: self.start,
                end: self.end,
            });
        }
        if self.end <= self.start || self.start < 0.0 {
            return Err(ValidationError::BadTimeRange {
                start: self.start,
                end: self.end,
            });
        }
        if self.duration() > max_duration_secs {
            return Err(ValidationError::ClipTooLong {
                duration: self.duration(),
                max: max_duration_secs,
            });
        }
        if self.score > 100 {
            return Err(ValidationError::ScoreOutOfRange(self.score));
        }
        Ok(())
    }

    /// Title reduced to a filesystem-safe stem (used in output filenames).
    pub fn sanitized_title(&self) -> String {
        let cleaned: String = self
            .title
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-' || *c == '_')
            .take(30)
            .collect();
        let cleaned = cleaned.trim().replace(' ', "_");
        if cleaned.is_empty() {
            "clip".to_string()
        } else {
            cleaned
        }
    }
}

/// Errors from clip and config validation.
///
/// These are fatal to the affected job only and are surfaced immediately,
/// before any external call is made.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid time range: start={start}, end={end}")]
    BadTimeRange { start: f64, end: f64 },

    #[error("clip duration {duration:.1}s exceeds maximum {max:.1}s")]
    ClipTooLong { duration: f64, max: f64 },

    #[error("viral score {0} is out of range (0-100)")]
    ScoreOutOfRange(u8),

    #[error("dub voice {0} has no synthesis voice")]
    UnresolvableVoice(String),

    #[error("watermark image not found: {0}")]
    WatermarkNotFound(PathBuf),

    #[error("watermark is not a raster image: {0}")]
    WatermarkNotRaster(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(start: f64, end: f64) -> ClipSpec {
        ClipSpec {
            source: PathBuf::from("/video/source.mp4"),
            start,
            end,
            title: "The Hook: why it works?!".to_string(),
            text_segment: "some words here".to_string(),
            score: 92,
            tokens: Vec::new(),
            hook_text: None,
        }
    }

    #[test]
    fn accepts_valid_range() {
        assert!(spec(10.0, 40.0).validate(180.0).is_ok());
    }

    #[test]
    fn rejects_reversed_range() {
        let err = spec(40.0, 10.0).validate(180.0).unwrap_err();
        assert!(matches!(err, ValidationError::BadTimeRange { .. }));
    }

    #[test]
    fn rejects_overlong_clip() {
        let err = spec(0.0, 300.0).validate(180.0).unwrap_err();
        assert!(matches!(err, ValidationError::ClipTooLong { .. }));
    }

    #[test]
    fn sanitized_title_strips_punctuation() {
        let s = spec(10.0, 40.0);
        assert_eq!(s.sanitized_title(), "The_Hook_why_it_works");
    }
}
