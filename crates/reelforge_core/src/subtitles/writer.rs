//! ASS subtitle writer.
//!
//! Materializes a [`SubtitleTrack`] to the ASS format consumed by the
//! render executor's `subtitles=` filter.

use std::fs;
use std::io;
use std::path::Path;

use super::track::SubtitleTrack;

/// Render a track to ASS file content.
pub fn write_ass(track: &SubtitleTrack) -> String {
    let style = track.style();

    let mut events = String::new();
    for cue in track.cues() {
        events.push_str(&format!(
            "Dialogue: 0,{},{},Default,,0,0,0,,{}\n",
            format_ass_time(cue.start),
            format_ass_time(cue.end),
            cue.text
        ));
    }

    format!(
        "[Script Info]\n\
         Title: ReelForge Subtitles\n\
         ScriptType: v4.00+\n\
         PlayResX: {}\n\
         PlayResY: {}\n\
         ScaledBorderAndShadow: yes\n\
         \n\
         [V4+ Styles]\n\
         Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\n\
         {}\n\
         \n\
         [Events]\n\
         Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n\
         {}",
        style.play_res_x,
        style.play_res_y,
        style.style_line(),
        events
    )
}

/// Write a track to disk at the given path.
pub fn materialize(track: &SubtitleTrack, path: &Path) -> io::Result<()> {
    fs::write(path, write_ass(track))
}

/// Format seconds as an ASS timestamp (H:MM:SS.CS).
pub fn format_ass_time(secs: f64) -> String {
    let secs = secs.max(0.0);
    let h = (secs / 3600.0).floor() as u64;
    let m = ((secs % 3600.0) / 60.0).floor() as u64;
    let s = secs % 60.0;
    format!("{}:{:02}:{:05.2}", h, m, s)
}

/// Escape a path for use inside an ffmpeg filter expression.
///
/// Backslashes become forward slashes, then the filter-language special
/// characters are escaped.
pub fn escape_filter_path(path: &Path) -> String {
    path.display()
        .to_string()
        .replace('\\', "/")
        .replace(':', "\\:")
        .replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subtitles::track::Cue;
    use crate::subtitles::SubtitleStyle;

    fn track() -> SubtitleTrack {
        SubtitleTrack::new(
            vec![
                Cue::new(0.0, 1.49, "first words here"),
                Cue::new(1.5, 3.0, "second cue text"),
            ],
            SubtitleStyle::default(),
        )
    }

    #[test]
    fn format_time_matches_ass_layout() {
        assert_eq!(format_ass_time(5.0), "0:00:05.00");
        assert_eq!(format_ass_time(90.5), "0:01:30.50");
        assert_eq!(format_ass_time(3600.0), "1:00:00.00");
    }

    #[test]
    fn writes_script_sections() {
        let content = write_ass(&track());
        assert!(content.contains("[Script Info]"));
        assert!(content.contains("PlayResX: 1080"));
        assert!(content.contains("PlayResY: 1920"));
        assert!(content.contains("[V4+ Styles]"));
        assert!(content.contains("Dialogue: 0,0:00:00.00,0:00:01.49,Default,,0,0,0,,first words here"));
    }

    #[test]
    fn materialize_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cues.ass");
        materialize(&track(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("second cue text"));
    }

    #[test]
    fn escapes_filter_special_characters() {
        let escaped = escape_filter_path(Path::new("C:\\temp\\o'brien.ass"));
        assert_eq!(escaped, "C\\:/temp/o\\'brien.ass");
    }
}
