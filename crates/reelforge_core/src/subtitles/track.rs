//! Subtitle track and cue types.

use serde::{Deserialize, Serialize};

use super::style::SubtitleStyle;

/// One timed subtitle display unit.
///
/// Times are seconds relative to the clip start. The builder guarantees
/// `end > start` and that consecutive cues never overlap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl Cue {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Display duration in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Ordered, non-overlapping sequence of cues with an attached style.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleTrack {
    cues: Vec<Cue>,
    style: SubtitleStyle,
}

impl SubtitleTrack {
    /// Create a track from cues produced by the builder.
    pub(crate) fn new(cues: Vec<Cue>, style: SubtitleStyle) -> Self {
        Self { cues, style }
    }

    /// A track with no cues (subtitle burn-in is skipped).
    pub fn empty() -> Self {
        Self {
            cues: Vec::new(),
            style: SubtitleStyle::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    pub fn style(&self) -> &SubtitleStyle {
        &self.style
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_track() {
        let track = SubtitleTrack::empty();
        assert!(track.is_empty());
        assert_eq!(track.len(), 0);
    }

    #[test]
    fn cue_duration() {
        let cue = Cue::new(1.0, 2.5, "hello there friend");
        assert!((cue.duration() - 1.5).abs() < 1e-9);
    }
}
