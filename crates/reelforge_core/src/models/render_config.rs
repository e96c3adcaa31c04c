//! Per-run render configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::clip::ValidationError;
use super::enums::{ColorFilter, DubVoice, SubtitleLanguage, WatermarkAnchor};

/// File extensions accepted for watermark images.
const RASTER_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "webp"];

/// Configuration shared by all jobs in one render batch.
///
/// The target aspect ratio is fixed to 9:16 and is not part of the
/// configuration. The scheduler may override the dub voice and the
/// subtitle language per clip; everything else is batch-wide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Dub voice. `DubVoice::original()` disables dubbing.
    #[serde(default)]
    pub dub: DubVoice,
    /// Subtitle target language. `None` disables subtitle burn-in.
    #[serde(default)]
    pub subtitles: Option<SubtitleLanguage>,
    /// Watermark image overlaid on the final video stream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watermark: Option<PathBuf>,
    /// Corner the watermark is anchored to.
    #[serde(default)]
    pub watermark_anchor: WatermarkAnchor,
    /// Named color grading filter, identity when `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_filter: Option<ColorFilter>,
    /// Render from a reduced-resolution working copy of the source.
    ///
    /// Affects only the pre-render source resolution, never the filter
    /// graph itself.
    #[serde(default)]
    pub performance_mode: bool,
    /// Draw the animated progress bar along the bottom edge.
    #[serde(default = "default_true")]
    pub progress_bar: bool,
}

fn default_true() -> bool {
    true
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            dub: DubVoice::original(),
            subtitles: None,
            watermark: None,
            watermark_anchor: WatermarkAnchor::default(),
            color_filter: None,
            performance_mode: false,
            progress_bar: true,
        }
    }
}

impl RenderConfig {
    /// Validate the configuration before any job starts.
    ///
    /// A non-Original dub language must resolve to a synthesis voice, and
    /// a watermark path, if set, must reference an existing raster image.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.dub.is_original() && self.dub.synthesis_voice().is_none() {
            return Err(ValidationError::UnresolvableVoice(self.dub.to_string()));
        }

        if let Some(ref watermark) = self.watermark {
            if !watermark.is_file() {
                return Err(ValidationError::WatermarkNotFound(watermark.clone()));
            }
            if !is_raster_image(watermark) {
                return Err(ValidationError::WatermarkNotRaster(watermark.clone()));
            }
        }

        Ok(())
    }

    /// Copy with the per-clip dub/subtitle overrides applied.
    pub fn with_overrides(&self, overrides: &JobOverrides) -> Self {
        let mut resolved = self.clone();
        if let Some(dub) = overrides.dub {
            resolved.dub = dub;
        }
        if let Some(subtitles) = overrides.subtitles {
            resolved.subtitles = subtitles;
        }
        resolved
    }
}

/// Per-clip overrides allowed on top of the batch configuration.
///
/// Only the dub voice and the subtitle language can vary per clip.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct JobOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dub: Option<DubVoice>,
    /// `Some(None)` explicitly disables subtitles for this clip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitles: Option<Option<SubtitleLanguage>>,
}

fn is_raster_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let lower = ext.to_ascii_lowercase();
            RASTER_EXTENSIONS.iter().any(|known| *known == lower)
        })
        .unwrap_or(false)
}
