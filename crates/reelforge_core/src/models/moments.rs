//! Moment-analysis candidates and their validation into clip specs.
//!
//! The moment-analysis collaborator returns clip candidates as JSON. The
//! payload is untrusted: timestamps may be reversed, out of bounds, or
//! missing entirely. Everything is validated here before a `ClipSpec`
//! is constructed.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::clip::{ClipSpec, TranscriptToken};

/// One raw clip candidate as returned by the moment-analysis collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentCandidate {
    pub start: f64,
    pub end: f64,
    pub title: String,
    pub score: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub text_segment: Option<String>,
    #[serde(default)]
    pub hook_text: Option<String>,
}

/// A candidate that failed validation, with the reason it was dropped.
#[derive(Debug, Clone)]
pub struct RejectedMoment {
    pub title: String,
    pub reason: String,
}

/// Errors from parsing the moment-analysis payload.
#[derive(Debug, Error)]
pub enum MomentError {
    #[error("no JSON array found in moment-analysis response")]
    NoJsonArray,

    #[error("failed to parse moment candidates: {0}")]
    ParseFailed(#[from] serde_json::Error),
}

/// Parse candidates out of a raw collaborator response.
///
/// The response may wrap the JSON array in markdown code fences or
/// surrounding prose; both are stripped before parsing.
pub fn parse_candidates(raw: &str) -> Result<Vec<MomentCandidate>, MomentError> {
    let cleaned = raw.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();

    // Prefer the outermost array if the response carries extra prose.
    let json = match (cleaned.find('['), cleaned.rfind(']')) {
        (Some(open), Some(close)) if close > open => &cleaned[open..=close],
        _ => return Err(MomentError::NoJsonArray),
    };

    Ok(serde_json::from_str(json)?)
}

/// Validate candidates into clip specs.
///
/// Each candidate's time range is checked against the source duration and
/// the configured maximum clip length; its score is clamped to 0-100.
/// Tokens overlapping the accepted range are attached to the clip. Invalid
/// candidates are collected as rejects, never silently dropped.
pub fn validate_candidates(
    candidates: Vec<MomentCandidate>,
    source: &Path,
    source_duration_secs: f64,
    max_clip_duration_secs: f64,
    tokens: &[TranscriptToken],
) -> (Vec<ClipSpec>, Vec<RejectedMoment>) {
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();

    for candidate in candidates {
        match validate_one(
            candidate,
            source,
            source_duration_secs,
            max_clip_duration_secs,
            tokens,
        ) {
            Ok(spec) => accepted.push(spec),
            Err(reject) => {
                tracing::warn!(
                    "Rejected moment candidate '{}': {}",
                    reject.title,
                    reject.reason
                );
                rejected.push(reject);
            }
        }
    }

    (accepted, rejected)
}

fn validate_one(
    candidate: MomentCandidate,
    source: &Path,
    source_duration_secs: f64,
    max_clip_duration_secs: f64,
    tokens: &[TranscriptToken],
) -> Result<ClipSpec, RejectedMoment> {
    let reject = |reason: String| RejectedMoment {
        title: candidate.title.clone(),
        reason,
    };

    if !candidate.start.is_finite() || !candidate.end.is_finite() {
        return Err(reject("non-finite timestamps".to_string()));
    }
    if candidate.start < 0.0 || candidate.end <= candidate.start {
        return Err(reject(format!(
            "bad time range {:.2}..{:.2}",
            candidate.start, candidate.end
        )));
    }
    if candidate.end > source_duration_secs {
        return Err(reject(format!(
            "end {:.2}s past source duration {:.2}s",
            candidate.end, source_duration_secs
        )));
    }
    let duration = candidate.end - candidate.start;
    if duration > max_clip_duration_secs {
        return Err(reject(format!(
            "duration {:.1}s exceeds maximum {:.1}s",
            duration, max_clip_duration_secs
        )));
    }

    let clip_tokens: Vec<TranscriptToken> = tokens
        .iter()
        .filter(|t| t.end > candidate.start && t.start < candidate.end)
        .cloned()
        .collect();

    let text_segment = candidate
        .text_segment
        .clone()
        .unwrap_or_else(|| candidate.title.clone());

    Ok(ClipSpec {
        source: source.to_path_buf(),
        start: candidate.start,
        end: candidate.end,
        title: candidate.title,
        text_segment,
        score: candidate.score.clamp(0.0, 100.0).round() as u8,
        tokens: clip_tokens,
        hook_text: candidate.hook_text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn parses_fenced_json() {
        let raw = "Here you go:\n```json\n[{\"start\": 10.0, \"end\": 40.0, \
                   \"title\": \"Hook\", \"score\": 92}]\n```";
        let candidates = parse_candidates(raw).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title, "Hook");
    }

    #[test]
    fn missing_array_is_an_error() {
        assert!(matches!(
            parse_candidates("sorry, nothing found"),
            Err(MomentError::NoJsonArray)
        ));
    }

    #[test]
    fn rejects_out_of_bounds_candidates() {
        let candidates = vec![
            MomentCandidate {
                start: 10.0,
                end: 40.0,
                title: "Good".to_string(),
                score: 80.0,
                category: None,
                reason: None,
                text_segment: Some("words".to_string()),
                hook_text: None,
            },
            MomentCandidate {
                start: 50.0,
                end: 20.0,
                title: "Reversed".to_string(),
                score: 70.0,
                category: None,
                reason: None,
                text_segment: None,
                hook_text: None,
            },
            MomentCandidate {
                start: 100.0,
                end: 400.0,
                title: "Past the end".to_string(),
                score: 60.0,
                category: None,
                reason: None,
                text_segment: None,
                hook_text: None,
            },
        ];

        let (accepted, rejected) = validate_candidates(
            candidates,
            &PathBuf::from("/video/source.mp4"),
            120.0,
            180.0,
            &[],
        );

        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].title, "Good");
        assert_eq!(rejected.len(), 2);
    }

    #[test]
    fn attaches_overlapping_tokens() {
        let tokens = vec![
            TranscriptToken::new("before", 0.0, 5.0),
            TranscriptToken::new("inside", 12.0, 13.0),
            TranscriptToken::new("straddling", 39.5, 41.0),
            TranscriptToken::new("after", 50.0, 51.0),
        ];
        let candidates = vec![MomentCandidate {
            start: 10.0,
            end: 40.0,
            title: "Hook".to_string(),
            score: 92.0,
            category: None,
            reason: None,
            text_segment: Some("inside".to_string()),
            hook_text: None,
        }];

        let (accepted, _) = validate_candidates(
            candidates,
            &PathBuf::from("/video/source.mp4"),
            120.0,
            180.0,
            &tokens,
        );

        let texts: Vec<&str> = accepted[0].tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["inside", "straddling"]);
    }

    #[test]
    fn score_is_clamped() {
        let candidates = vec![MomentCandidate {
            start: 0.0,
            end: 30.0,
            title: "Overscored".to_string(),
            score: 250.0,
            category: None,
            reason: None,
            text_segment: None,
            hook_text: None,
        }];
        let (accepted, _) = validate_candidates(
            candidates,
            &PathBuf::from("/video/source.mp4"),
            120.0,
            180.0,
            &[],
        );
        assert_eq!(accepted[0].score, 100);
    }
}
