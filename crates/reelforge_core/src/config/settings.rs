//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Every field carries a serde default so partial config files load
//! cleanly.

use serde::{Deserialize, Serialize};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Render job settings.
    #[serde(default)]
    pub render: RenderSettings,

    /// Audio mix settings.
    #[serde(default)]
    pub audio: AudioSettings,

    /// Subtitle track settings.
    #[serde(default)]
    pub subtitles: SubtitleSettings,

    /// Dub audio settings.
    #[serde(default)]
    pub dub: DubSettings,
}

/// Path configuration for output, temp, logs, and tool discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Output folder for rendered clips.
    #[serde(default = "default_output_folder")]
    pub output_folder: String,

    /// Root folder for temporary files.
    #[serde(default = "default_temp_root")]
    pub temp_root: String,

    /// Folder for per-job log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,

    /// Extra folders searched for the render executor binaries, in order,
    /// before falling back to PATH.
    #[serde(default)]
    pub tool_folders: Vec<String>,
}

fn default_output_folder() -> String {
    "clips_output".to_string()
}

fn default_temp_root() -> String {
    ".temp".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            output_folder: default_output_folder(),
            temp_root: default_temp_root(),
            logs_folder: default_logs_folder(),
            tool_folders: Vec::new(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Use compact log format (progress filtered, tail shown on error).
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of executor output lines kept for error diagnosis.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Progress update step percentage.
    #[serde(default = "default_progress_step")]
    pub progress_step: u32,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

fn default_progress_step() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            compact: true,
            error_tail: default_error_tail(),
            progress_step: default_progress_step(),
        }
    }
}

/// Render job settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Maximum number of concurrent render jobs.
    ///
    /// Each render is itself CPU-bound, so the default stays low.
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,

    /// Maximum accepted clip duration in seconds.
    #[serde(default = "default_max_clip_duration")]
    pub max_clip_duration_secs: f64,

    /// Minimum output size accepted as a real render result.
    ///
    /// Outputs below this are treated as corrupt even when the executor
    /// reported success.
    #[serde(default = "default_min_output_bytes")]
    pub min_output_bytes: u64,
}

fn default_max_concurrent_jobs() -> usize {
    2
}

fn default_max_clip_duration() -> f64 {
    180.0
}

fn default_min_output_bytes() -> u64 {
    1024
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: default_max_concurrent_jobs(),
            max_clip_duration_secs: default_max_clip_duration(),
            min_output_bytes: default_min_output_bytes(),
        }
    }
}

/// Audio mix levels for dubbed clips.
///
/// The mechanism is fixed (original attenuated, dub boosted, mixed to one
/// stream); the exact levels are tunable defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioSettings {
    /// Volume applied to the original audio under a dub.
    #[serde(default = "default_original_level")]
    pub original_level: f64,

    /// Volume applied to the dub track.
    #[serde(default = "default_dub_level")]
    pub dub_level: f64,

    /// How far a dub may overrun the clip duration before a warning is
    /// recorded, in seconds.
    #[serde(default = "default_duration_tolerance")]
    pub duration_tolerance_secs: f64,
}

fn default_original_level() -> f64 {
    0.1
}

fn default_dub_level() -> f64 {
    1.2
}

fn default_duration_tolerance() -> f64 {
    1.5
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            original_level: default_original_level(),
            dub_level: default_dub_level(),
            duration_tolerance_secs: default_duration_tolerance(),
        }
    }
}

/// Subtitle track settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleSettings {
    /// Number of tokens grouped into one cue.
    #[serde(default = "default_words_per_cue")]
    pub words_per_cue: usize,

    /// Gap enforced between consecutive cues, in seconds.
    #[serde(default = "default_cue_gap")]
    pub cue_gap_secs: f64,
}

fn default_words_per_cue() -> usize {
    3
}

fn default_cue_gap() -> f64 {
    0.01
}

impl Default for SubtitleSettings {
    fn default() -> Self {
        Self {
            words_per_cue: default_words_per_cue(),
            cue_gap_secs: default_cue_gap(),
        }
    }
}

/// Dub audio settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DubSettings {
    /// Speaking-rate offset passed to the synthesis collaborator, in
    /// percent relative to the voice's natural rate.
    #[serde(default = "default_rate_offset")]
    pub rate_offset_percent: i32,
}

fn default_rate_offset() -> i32 {
    5
}

impl Default for DubSettings {
    fn default() -> Self {
        Self {
            rate_offset_percent: default_rate_offset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let settings = Settings::default();
        assert_eq!(settings.render.max_concurrent_jobs, 2);
        assert_eq!(settings.subtitles.words_per_cue, 3);
        assert!(settings.audio.original_level < settings.audio.dub_level);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml = r#"
            [render]
            max_concurrent_jobs = 4
        "#;
        let settings: Settings = toml::from_str(toml).unwrap();
        assert_eq!(settings.render.max_concurrent_jobs, 4);
        assert_eq!(settings.paths.temp_root, ".temp");
        assert_eq!(settings.audio.original_level, 0.1);
    }

    #[test]
    fn round_trips_through_toml() {
        let settings = Settings::default();
        let serialized = toml::to_string(&settings).unwrap();
        let parsed: Settings = toml::from_str(&serialized).unwrap();
        assert_eq!(
            parsed.render.max_clip_duration_secs,
            settings.render.max_clip_duration_secs
        );
    }
}
