//! Fixed output encode parameters.
//!
//! The encode is speed-optimized for constrained hardware: one preset,
//! one quality factor. Nothing here varies per clip; the performance
//! toggle only changes the pre-render source resolution upstream.

/// Video encode arguments for the final render.
pub fn video_encode_args() -> Vec<String> {
    [
        "-c:v",
        "libx264",
        "-profile:v",
        "high",
        "-level:v",
        "4.0",
        "-pix_fmt",
        "yuv420p",
        "-preset",
        "veryfast",
        "-crf",
        "23",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Audio encode arguments for the final render.
pub fn audio_encode_args() -> Vec<String> {
    ["-c:a", "aac", "-b:a", "192k", "-ar", "48000"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Video encode arguments for the reduced-resolution working copy made in
/// performance mode. Same preset family, lower cost source.
pub fn working_copy_args(height: u32) -> Vec<String> {
    vec![
        "-vf".to_string(),
        format!("scale=-2:{}", height),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-preset".to_string(),
        "veryfast".to_string(),
        "-crf".to_string(),
        "23".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-b:a".to_string(),
        "192k".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_args_are_speed_preset() {
        let args = video_encode_args();
        let preset_pos = args.iter().position(|a| a == "-preset").unwrap();
        assert_eq!(args[preset_pos + 1], "veryfast");
        assert!(args.contains(&"libx264".to_string()));
    }

    #[test]
    fn working_copy_scales_by_height() {
        let args = working_copy_args(720);
        assert!(args.contains(&"scale=-2:720".to_string()));
    }
}
