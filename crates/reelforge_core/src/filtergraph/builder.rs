//! Filter graph builder.
//!
//! Assembles the fixed-stage transformation pipeline for one clip. Every
//! optional stage is either present in its canonical slot or absent;
//! there are no conditional orderings. Disabled stages simply do not
//! appear, so the emitted graph is always internally consistent.

use std::path::Path;

use crate::config::AudioSettings;
use crate::dub::DubAsset;
use crate::models::{ColorFilter, WatermarkAnchor};
use crate::subtitles::escape_filter_path;

use super::graph::{AudioMap, FilterGraph, StageKind, FRAME_HEIGHT, FRAME_WIDTH};

/// Fixed width the watermark is scaled to before overlay.
const WATERMARK_WIDTH: u32 = 108;
/// Fixed margin between the watermark and its anchor corner.
const WATERMARK_MARGIN: u32 = 40;
/// How long the hook text stays on screen.
const HOOK_SECONDS: u32 = 5;
/// Maximum characters per hook line.
const HOOK_LINE_CHARS: usize = 30;
/// Progress bar fill height in pixels.
const BAR_HEIGHT: u32 = 10;
/// Progress bar border thickness.
const BAR_BORDER: u32 = 2;
/// Progress bar distance from the bottom edge.
const BAR_BOTTOM_OFFSET: u32 = 25;

/// Everything the builder needs for one clip's graph.
///
/// `source` is the file the render actually reads: the original source
/// video, or the reduced-resolution working copy in performance mode (in
/// which case `seek_secs` is zero because the copy is already cut).
pub struct GraphSpec<'a> {
    pub source: &'a Path,
    pub seek_secs: f64,
    pub duration_secs: f64,
    pub color_filter: Option<ColorFilter>,
    pub hook_text: Option<&'a str>,
    /// Materialized subtitle file; `None` when the track is empty.
    pub subtitle_file: Option<&'a Path>,
    pub watermark: Option<&'a Path>,
    pub watermark_anchor: WatermarkAnchor,
    pub progress_bar: bool,
    pub dub: &'a DubAsset,
    pub audio: &'a AudioSettings,
}

/// Build the transformation graph for one clip.
///
/// Stage order is fixed: trim, crop, color filter, hook text, subtitle
/// burn-in, watermark overlay, progress bar, audio mix. Trim and crop are
/// unconditional; each optional stage appears iff its input is present.
pub fn build_filter_graph(spec: &GraphSpec<'_>) -> FilterGraph {
    let mut stages = vec![StageKind::Trim, StageKind::Crop];
    let mut chains: Vec<String> = Vec::new();
    let mut extra_inputs = Vec::new();
    let mut label_seq = 0usize;

    // Trim is realized as input seek options; the filter chain starts at
    // the crop. Center-crop to 9:16 by computing width from height, then
    // scale up to the fixed output frame.
    let mut current = next_label(&mut label_seq);
    chains.push(format!(
        "[0:v]crop=ih*(9/16):ih,scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2[{out}]",
        w = FRAME_WIDTH,
        h = FRAME_HEIGHT,
        out = current,
    ));

    if let Some(filter) = spec.color_filter {
        stages.push(StageKind::ColorFilter);
        let out = next_label(&mut label_seq);
        chains.push(format!("[{}]{}[{}]", current, filter.ffmpeg_filter(), out));
        current = out;
    }

    if let Some(hook) = spec.hook_text {
        if let Some(drawtext) = hook_text_filter(hook) {
            stages.push(StageKind::HookText);
            let out = next_label(&mut label_seq);
            chains.push(format!("[{}]{}[{}]", current, drawtext, out));
            current = out;
        }
    }

    if let Some(subtitle_file) = spec.subtitle_file {
        stages.push(StageKind::SubtitleBurnIn);
        let out = next_label(&mut label_seq);
        chains.push(format!(
            "[{}]subtitles='{}'[{}]",
            current,
            escape_filter_path(subtitle_file),
            out
        ));
        current = out;
    }

    if let Some(watermark) = spec.watermark {
        stages.push(StageKind::WatermarkOverlay);
        extra_inputs.push(watermark.to_path_buf());
        let wm_input = extra_inputs.len(); // source is input 0
        let out = next_label(&mut label_seq);
        chains.push(format!(
            "[{}:v]scale={}:-1[wm];[{}][wm]overlay={}[{}]",
            wm_input,
            WATERMARK_WIDTH,
            current,
            spec.watermark_anchor.overlay_position(WATERMARK_MARGIN),
            out
        ));
        current = out;
    }

    if spec.progress_bar {
        stages.push(StageKind::ProgressBar);
        let bordered = next_label(&mut label_seq);
        let out = next_label(&mut label_seq);
        // Color sources must carry an explicit duration or the graph
        // never reaches EOF.
        chains.push(format!(
            "color=c=black:s={w}x{bh}:d={d:.3}[pbborder];\
             color=c=0x00FFFF:s={w}x{fh}:d={d:.3}[pbfill];\
             [{cur}][pbborder]overlay=0:H-{border_y}:shortest=1[{bordered}];\
             [{bordered}][pbfill]overlay=x='W*(t/{d:.3}-1)':y=H-{fill_y}:shortest=1[{out}]",
            w = FRAME_WIDTH,
            bh = BAR_HEIGHT + BAR_BORDER * 2,
            fh = BAR_HEIGHT,
            d = spec.duration_secs,
            cur = current,
            border_y = BAR_HEIGHT + BAR_BORDER * 2 + BAR_BOTTOM_OFFSET,
            bordered = bordered,
            fill_y = BAR_HEIGHT + BAR_BORDER + BAR_BOTTOM_OFFSET,
            out = out,
        ));
        current = out;
    }

    let audio_map = match (spec.dub.is_synthesized(), &spec.dub.path) {
        (true, Some(dub_path)) => {
            stages.push(StageKind::AudioMix);
            extra_inputs.push(dub_path.clone());
            let dub_input = extra_inputs.len();
            chains.push(format!(
                "[0:a]volume={orig}[aorig];[{dub}:a]volume={boost}[adub];\
                 [aorig][adub]amix=inputs=2:duration=first[aout]",
                orig = spec.audio.original_level,
                dub = dub_input,
                boost = spec.audio.dub_level,
            ));
            AudioMap::Mixed("aout".to_string())
        }
        _ => AudioMap::Passthrough,
    };

    FilterGraph {
        stages,
        source: spec.source.to_path_buf(),
        seek_secs: spec.seek_secs,
        duration_secs: spec.duration_secs,
        extra_inputs,
        filter_complex: chains.join(";"),
        video_out: current,
        audio_map,
    }
}

fn next_label(seq: &mut usize) -> String {
    let label = format!("v{}", seq);
    *seq += 1;
    label
}

/// Build the drawtext filter for the hook line.
///
/// The text is sanitized for the filter language, clipped to 60 chars,
/// and split into at most two lines drawn in a white box near the top of
/// the frame during the first seconds of the clip.
fn hook_text_filter(hook: &str) -> Option<String> {
    let sanitized: String = hook
        .chars()
        .filter(|c| !matches!(c, '\\' | '\'' | '"'))
        .map(|c| match c {
            ':' | '\n' | '\r' => ' ',
            other => other,
        })
        .take(60)
        .collect();
    let sanitized = sanitized.trim();
    if sanitized.is_empty() {
        return None;
    }

    let (line1, line2) = split_hook_lines(sanitized);

    let mut filter = drawtext_line(&line1, 100);
    if let Some(line2) = line2 {
        filter.push(',');
        filter.push_str(&drawtext_line(&line2, 190));
    }
    Some(filter)
}

fn drawtext_line(text: &str, y: u32) -> String {
    format!(
        "drawtext=text='{}':fontsize=64:fontcolor=black:x=(w-text_w)/2:y={}:\
         enable='between(t,0,{})':box=1:boxcolor=white@0.95:boxborderw=25",
        text, y, HOOK_SECONDS
    )
}

/// Split hook text into up to two lines of at most `HOOK_LINE_CHARS`.
fn split_hook_lines(text: &str) -> (String, Option<String>) {
    let mut line1 = String::new();
    let mut line2 = String::new();
    for word in text.split_whitespace() {
        if line1.is_empty() || line1.len() + 1 + word.len() <= HOOK_LINE_CHARS {
            if !line1.is_empty() {
                line1.push(' ');
            }
            line1.push_str(word);
        } else {
            if !line2.is_empty() {
                line2.push(' ');
            }
            line2.push_str(word);
        }
    }

    if line2.is_empty() {
        (line1, None)
    } else {
        (line1, Some(line2))
    }
}
