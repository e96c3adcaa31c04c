//! Data model: clip specs, render configuration, results.

mod clip;
mod enums;
pub mod moments;
mod render_config;
mod results;

pub use clip::{ClipSpec, TranscriptToken, ValidationError};
pub use enums::{
    ColorFilter, DubLanguage, DubVoice, SubtitleLanguage, VoiceGender, WatermarkAnchor,
};
pub use render_config::{JobOverrides, RenderConfig};
pub use results::{FailureCategory, JobState, RenderJobResult};
