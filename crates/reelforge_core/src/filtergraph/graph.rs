//! Filter graph types.
//!
//! A [`FilterGraph`] is the ordered, declarative description of the
//! video/audio transformation stages for one render, plus everything
//! needed to turn it into an executor argument list.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Output frame width (9:16 vertical).
pub const FRAME_WIDTH: u32 = 1080;
/// Output frame height.
pub const FRAME_HEIGHT: u32 = 1920;

/// One transformation stage in the fixed pipeline order.
///
/// The order of the variants is the only order stages may appear in a
/// graph. Later stages assume specific upstream resolution/aspect (the
/// watermark anchor, for one, assumes the crop already fixed the frame
/// to 9:16), so reordering is never permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Restrict to the clip's time range. Always present.
    Trim,
    /// Center-crop to 9:16 and scale to the output frame. Always present.
    Crop,
    /// Named color grading filter.
    ColorFilter,
    /// Attention line drawn during the first seconds.
    HookText,
    /// Burn the materialized subtitle track into the video stream.
    SubtitleBurnIn,
    /// Watermark image overlaid on the final video stream.
    WatermarkOverlay,
    /// Animated progress bar along the bottom edge.
    ProgressBar,
    /// Original audio attenuated under the boosted dub, mixed to one
    /// stream.
    AudioMix,
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageKind::Trim => write!(f, "trim"),
            StageKind::Crop => write!(f, "crop"),
            StageKind::ColorFilter => write!(f, "color filter"),
            StageKind::HookText => write!(f, "hook text"),
            StageKind::SubtitleBurnIn => write!(f, "subtitle burn-in"),
            StageKind::WatermarkOverlay => write!(f, "watermark overlay"),
            StageKind::ProgressBar => write!(f, "progress bar"),
            StageKind::AudioMix => write!(f, "audio mix"),
        }
    }
}

/// Where the output's audio stream comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioMap {
    /// Original audio passed through unchanged.
    Passthrough,
    /// A labeled node produced by the audio mix stage.
    Mixed(String),
}

/// Ordered transformation graph for one clip render.
#[derive(Debug, Clone)]
pub struct FilterGraph {
    pub(crate) stages: Vec<StageKind>,
    pub(crate) source: PathBuf,
    pub(crate) seek_secs: f64,
    pub(crate) duration_secs: f64,
    /// Inputs after the source, in `-i` order (watermark image, dub audio).
    pub(crate) extra_inputs: Vec<PathBuf>,
    pub(crate) filter_complex: String,
    /// Label of the final video node.
    pub(crate) video_out: String,
    pub(crate) audio_map: AudioMap,
}

impl FilterGraph {
    /// Stages in execution order.
    pub fn stages(&self) -> &[StageKind] {
        &self.stages
    }

    /// Whether the graph contains the given stage.
    pub fn has_stage(&self, kind: StageKind) -> bool {
        self.stages.contains(&kind)
    }

    /// The assembled filter_complex expression.
    pub fn filter_complex(&self) -> &str {
        &self.filter_complex
    }

    /// The clip duration this graph renders.
    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    /// Full executor argument list producing `output`.
    pub fn to_args(&self, output: &Path) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "-y".into(),
            "-ss".into(),
            format!("{:.3}", self.seek_secs),
            "-t".into(),
            format!("{:.3}", self.duration_secs),
            "-i".into(),
            self.source.display().to_string(),
        ];

        for input in &self.extra_inputs {
            args.push("-i".into());
            args.push(input.display().to_string());
        }

        args.push("-filter_complex".into());
        args.push(self.filter_complex.clone());

        args.push("-map".into());
        args.push(format!("[{}]", self.video_out));
        args.push("-map".into());
        match &self.audio_map {
            AudioMap::Passthrough => args.push("0:a?".into()),
            AudioMap::Mixed(label) => args.push(format!("[{}]", label)),
        }

        args.extend(super::encode::video_encode_args());
        args.extend(super::encode::audio_encode_args());
        args.push("-movflags".into());
        args.push("+faststart".into());
        args.push(output.display().to_string());

        args
    }
}
