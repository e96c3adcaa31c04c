//! Subtitle track builder.
//!
//! Groups transcript tokens into fixed-size chunks and emits one cue per
//! chunk. Cue timing comes from the tokens themselves; a translation, when
//! supplied, is re-segmented proportionally across the same chunk
//! boundaries and never re-timed, so translated subtitles cannot desync
//! from the audio.

use crate::config::SubtitleSettings;
use crate::models::TranscriptToken;

use super::style::SubtitleStyle;
use super::track::{Cue, SubtitleTrack};

/// Builds subtitle tracks for one clip's time range.
#[derive(Debug, Clone)]
pub struct SubtitleBuilder {
    words_per_cue: usize,
    cue_gap_secs: f64,
}

impl SubtitleBuilder {
    /// Create a builder from the subtitle settings section.
    pub fn new(settings: &SubtitleSettings) -> Self {
        Self {
            words_per_cue: settings.words_per_cue.max(1),
            cue_gap_secs: settings.cue_gap_secs.max(0.0),
        }
    }

    /// Build a track from tokens covering `[clip_start, clip_end]`.
    ///
    /// Token times are absolute source times; the resulting cues are
    /// relative to the clip start. Tokens outside the range are ignored,
    /// zero usable tokens produce an empty track, and cues whose computed
    /// end would not be after their start are dropped.
    pub fn build(
        &self,
        tokens: &[TranscriptToken],
        clip_start: f64,
        clip_end: f64,
        translation: Option<&str>,
    ) -> SubtitleTrack {
        let duration = clip_end - clip_start;
        if duration <= 0.0 {
            return SubtitleTrack::empty();
        }

        // Rebase overlapping tokens to clip-relative time.
        let mut rebased: Vec<(String, f64)> = tokens
            .iter()
            .filter(|t| t.end > clip_start && t.start < clip_end && !t.text.trim().is_empty())
            .map(|t| (t.text.trim().to_string(), (t.start - clip_start).max(0.0)))
            .collect();

        if rebased.is_empty() {
            return SubtitleTrack::empty();
        }
        rebased.sort_by(|a, b| a.1.total_cmp(&b.1));

        let chunks: Vec<&[(String, f64)]> = rebased.chunks(self.words_per_cue).collect();
        let chunk_sizes: Vec<usize> = chunks.iter().map(|c| c.len()).collect();

        let texts: Vec<String> = match translation {
            Some(translated) => resegment(translated, &chunk_sizes),
            None => chunks
                .iter()
                .map(|chunk| {
                    chunk
                        .iter()
                        .map(|(text, _)| text.as_str())
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect(),
        };

        let mut cues = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            let start = chunk[0].1;
            let end = match chunks.get(i + 1) {
                Some(next) => next[0].1 - self.cue_gap_secs,
                None => duration,
            };

            // Degenerate cues must not reach the renderer.
            if end <= start {
                continue;
            }
            let text = texts[i].trim();
            if text.is_empty() {
                continue;
            }
            cues.push(Cue::new(start, end, text));
        }

        SubtitleTrack::new(cues, SubtitleStyle::default())
    }
}

/// Split a translated sentence across chunk boundaries in proportion to
/// each chunk's token count.
fn resegment(translated: &str, chunk_sizes: &[usize]) -> Vec<String> {
    let words: Vec<&str> = translated.split_whitespace().collect();
    let total_tokens: usize = chunk_sizes.iter().sum();
    if total_tokens == 0 {
        return vec![String::new(); chunk_sizes.len()];
    }

    let mut texts = Vec::with_capacity(chunk_sizes.len());
    let mut cumulative = 0usize;
    let mut prev_boundary = 0usize;
    for size in chunk_sizes {
        cumulative += size;
        let boundary =
            ((words.len() as f64 * cumulative as f64 / total_tokens as f64).round()) as usize;
        let boundary = boundary.min(words.len());
        texts.push(words[prev_boundary..boundary].join(" "));
        prev_boundary = boundary;
    }
    texts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(text: &str, start: f64, end: f64) -> TranscriptToken {
        TranscriptToken::new(text, start, end)
    }

    fn default_builder() -> SubtitleBuilder {
        SubtitleBuilder::new(&SubtitleSettings::default())
    }

    fn word_tokens(count: usize, base: f64, step: f64) -> Vec<TranscriptToken> {
        (0..count)
            .map(|i| {
                let start = base + i as f64 * step;
                token(&format!("w{}", i), start, start + step * 0.9)
            })
            .collect()
    }

    #[test]
    fn zero_tokens_produce_empty_track() {
        let track = default_builder().build(&[], 10.0, 40.0, None);
        assert!(track.is_empty());
    }

    #[test]
    fn groups_three_words_per_cue() {
        let tokens = word_tokens(7, 10.0, 0.5);
        let track = default_builder().build(&tokens, 10.0, 40.0, None);

        assert_eq!(track.len(), 3);
        assert_eq!(track.cues()[0].text, "w0 w1 w2");
        assert_eq!(track.cues()[1].text, "w3 w4 w5");
        assert_eq!(track.cues()[2].text, "w6");
    }

    #[test]
    fn cues_never_overlap() {
        let tokens = word_tokens(20, 5.0, 0.37);
        let track = default_builder().build(&tokens, 5.0, 30.0, None);

        for pair in track.cues().windows(2) {
            assert!(
                pair[0].end <= pair[1].start,
                "cue ending at {} overlaps next starting at {}",
                pair[0].end,
                pair[1].start
            );
        }
    }

    #[test]
    fn final_cue_ends_at_clip_end() {
        let tokens = word_tokens(6, 10.0, 0.5);
        let track = default_builder().build(&tokens, 10.0, 40.0, None);

        let last = track.cues().last().unwrap();
        assert!((last.end - 30.0).abs() < 1e-9);
    }

    #[test]
    fn tokens_outside_range_are_ignored() {
        let mut tokens = word_tokens(3, 10.0, 0.5);
        tokens.push(token("early", 2.0, 2.4));
        tokens.push(token("late", 90.0, 90.4));

        let track = default_builder().build(&tokens, 10.0, 40.0, None);
        assert_eq!(track.len(), 1);
        assert_eq!(track.cues()[0].text, "w0 w1 w2");
    }

    #[test]
    fn degenerate_cues_are_dropped() {
        // Two tokens at the same instant force the first chunk's computed
        // end behind its start once the gap is subtracted.
        let tokens = vec![token("a", 10.0, 10.4), token("b", 10.0, 10.4)];
        let settings = SubtitleSettings {
            words_per_cue: 1,
            ..SubtitleSettings::default()
        };
        let track = SubtitleBuilder::new(&settings).build(&tokens, 10.0, 40.0, None);

        assert_eq!(track.len(), 1);
        assert_eq!(track.cues()[0].text, "b");
    }

    #[test]
    fn translation_is_resegmented_not_retimed() {
        let tokens = word_tokens(6, 10.0, 1.0);
        let untranslated = default_builder().build(&tokens, 10.0, 40.0, None);
        let translated =
            default_builder().build(&tokens, 10.0, 40.0, Some("empat kata saja ya"));

        assert_eq!(untranslated.len(), translated.len());
        for (a, b) in untranslated.cues().iter().zip(translated.cues()) {
            assert_eq!(a.start, b.start);
            assert_eq!(a.end, b.end);
        }
        assert_eq!(translated.cues()[0].text, "empat kata");
        assert_eq!(translated.cues()[1].text, "saja ya");
    }

    #[test]
    fn short_translation_drops_empty_cues() {
        let tokens = word_tokens(9, 10.0, 1.0);
        let track = default_builder().build(&tokens, 10.0, 40.0, Some("satu"));

        // One translated word lands in one chunk; chunks left without any
        // words produce no cue.
        assert!(track.len() < 3);
        assert!(track.cues().iter().all(|c| !c.text.is_empty()));
    }

    #[test]
    fn resegment_distributes_proportionally() {
        let texts = resegment("a b c d e f", &[3, 3]);
        assert_eq!(texts, vec!["a b c".to_string(), "d e f".to_string()]);

        let texts = resegment("a b c d", &[3, 3]);
        assert_eq!(texts, vec!["a b".to_string(), "c d".to_string()]);
    }
}
