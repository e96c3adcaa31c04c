//! Subtitle track building and ASS materialization.

mod builder;
mod style;
mod track;
mod writer;

pub use builder::SubtitleBuilder;
pub use style::SubtitleStyle;
pub use track::{Cue, SubtitleTrack};
pub use writer::{escape_filter_path, format_ass_time, materialize, write_ass};
