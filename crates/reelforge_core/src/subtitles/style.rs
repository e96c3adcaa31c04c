//! Fixed declarative subtitle styling.

use serde::{Deserialize, Serialize};

/// Declarative ASS style attached to a subtitle track.
///
/// The style is fixed per track, never computed per cue. The default is
/// the engine's short-form look: heavy white text with a black outline
/// and a translucent box, anchored top-center with a large vertical
/// margin so it clears faces in the middle of a 9:16 frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleStyle {
    pub font_name: String,
    pub font_size: u32,
    /// Primary fill color (ASS &HAABBGGRR).
    pub primary_colour: String,
    pub secondary_colour: String,
    pub outline_colour: String,
    pub back_colour: String,
    pub bold: bool,
    pub outline: u32,
    pub shadow: u32,
    /// ASS numpad alignment (8 = top center).
    pub alignment: u32,
    pub margin_l: u32,
    pub margin_r: u32,
    pub margin_v: u32,
    /// Script playback resolution the margins are authored against.
    pub play_res_x: u32,
    pub play_res_y: u32,
}

impl Default for SubtitleStyle {
    fn default() -> Self {
        Self {
            font_name: "Arial Black".to_string(),
            font_size: 80,
            primary_colour: "&H00FFFFFF".to_string(),
            secondary_colour: "&H000000FF".to_string(),
            outline_colour: "&H00000000".to_string(),
            back_colour: "&H80000000".to_string(),
            bold: true,
            outline: 5,
            shadow: 2,
            alignment: 8,
            margin_l: 40,
            margin_r: 40,
            margin_v: 300,
            play_res_x: 1080,
            play_res_y: 1920,
        }
    }
}

impl SubtitleStyle {
    /// Render the `[V4+ Styles]` style line for this style.
    pub fn style_line(&self) -> String {
        format!(
            "Style: Default,{},{},{},{},{},{},{},0,0,0,100,100,0,0,1,{},{},{},{},{},{},1",
            self.font_name,
            self.font_size,
            self.primary_colour,
            self.secondary_colour,
            self.outline_colour,
            self.back_colour,
            if self.bold { 1 } else { 0 },
            self.outline,
            self.shadow,
            self.alignment,
            self.margin_l,
            self.margin_r,
            self.margin_v,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_style_line_matches_expected_fields() {
        let line = SubtitleStyle::default().style_line();
        assert!(line.starts_with("Style: Default,Arial Black,80,"));
        assert!(line.contains("&H00FFFFFF"));
        // bold flag and outline width
        assert!(line.contains(",1,0,0,0,100,100,0,0,1,5,2,8,"));
    }
}
