//! Dub audio builder.
//!
//! Orchestrates translation and speech synthesis into a dub asset for one
//! clip. Every external step retries once; a second failure degrades to
//! `FallbackOriginal` with a warning. A dub problem never aborts a clip.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::{AudioSettings, DubSettings};
use crate::logging::JobLogger;
use crate::models::DubVoice;
use crate::temp::{TempKind, TempScope};

use super::collaborators::{
    CollaboratorError, CollaboratorResult, MediaProber, SpeechSynthesizer, Translator,
};

/// How a dub asset came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DubProvenance {
    /// Speech was synthesized in the target language.
    Synthesized,
    /// Dubbing could not be produced; the original audio is used
    /// unchanged.
    FallbackOriginal,
}

/// Produced dub audio for one clip.
///
/// Created during a render job, deleted with the job's temp scope after
/// the final render step regardless of outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DubAsset {
    pub provenance: DubProvenance,
    /// Synthesized audio path (present iff synthesized).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Measured asset duration, when the probe succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
}

impl DubAsset {
    /// The degraded-but-safe outcome: original audio, unchanged.
    pub fn fallback_original() -> Self {
        Self {
            provenance: DubProvenance::FallbackOriginal,
            path: None,
            duration_secs: None,
        }
    }

    fn synthesized(path: PathBuf, duration_secs: Option<f64>) -> Self {
        Self {
            provenance: DubProvenance::Synthesized,
            path: Some(path),
            duration_secs,
        }
    }

    /// Whether this asset carries synthesized audio.
    pub fn is_synthesized(&self) -> bool {
        self.provenance == DubProvenance::Synthesized
    }
}

/// Builds dub assets for render jobs.
pub struct DubBuilder<'a> {
    translator: &'a dyn Translator,
    synthesizer: &'a dyn SpeechSynthesizer,
    prober: &'a dyn MediaProber,
    dub_settings: &'a DubSettings,
    audio_settings: &'a AudioSettings,
}

impl<'a> DubBuilder<'a> {
    pub fn new(
        translator: &'a dyn Translator,
        synthesizer: &'a dyn SpeechSynthesizer,
        prober: &'a dyn MediaProber,
        dub_settings: &'a DubSettings,
        audio_settings: &'a AudioSettings,
    ) -> Self {
        Self {
            translator,
            synthesizer,
            prober,
            dub_settings,
            audio_settings,
        }
    }

    /// Build the dub asset for one clip.
    ///
    /// `Original` voices return immediately with no network calls. Any
    /// collaborator failing twice degrades to `FallbackOriginal`; this
    /// method never fails the job.
    pub fn build(
        &self,
        text_segment: &str,
        voice: DubVoice,
        clip_duration_secs: f64,
        scope: &mut TempScope<'_>,
        logger: &JobLogger,
    ) -> DubAsset {
        if voice.is_original() {
            return DubAsset::fallback_original();
        }

        let Some(voice_id) = voice.synthesis_voice() else {
            // Config validation rejects these before a job starts; an
            // override slipping through still must not abort the clip.
            logger.warn(&format!("No synthesis voice for {}, keeping original audio", voice));
            return DubAsset::fallback_original();
        };
        let Some(target_lang) = voice.language.translation_code() else {
            return DubAsset::fallback_original();
        };

        // Translate, one retry, then degrade.
        let translated = match retry_once(logger, "translation", || {
            self.translator.translate(text_segment, target_lang)
        }) {
            Ok(text) => text,
            Err(e) => {
                logger.warn(&format!(
                    "Translation failed twice ({}), keeping original audio",
                    e
                ));
                return DubAsset::fallback_original();
            }
        };

        // Synthesize to a temp path, one retry, then degrade.
        let output = scope.acquire(TempKind::Audio);
        let synthesis = retry_once(logger, "speech synthesis", || {
            self.synthesizer.synthesize(
                &translated,
                voice_id,
                self.dub_settings.rate_offset_percent,
                &output,
            )
        });
        if let Err(e) = synthesis {
            logger.warn(&format!(
                "Speech synthesis failed twice ({}), keeping original audio",
                e
            ));
            return DubAsset::fallback_original();
        }
        if !output.is_file() {
            logger.warn("Speech synthesis reported success but wrote no asset, keeping original audio");
            return DubAsset::fallback_original();
        }

        // Measure the asset. An overrun is recorded here; the audio mix
        // stage bounds the stream, not this builder.
        let duration = match self.prober.duration_secs(&output) {
            Ok(duration) => {
                let tolerance = self.audio_settings.duration_tolerance_secs;
                if duration > clip_duration_secs + tolerance {
                    logger.warn(&format!(
                        "Dub runs {:.2}s against a {:.2}s clip (tolerance {:.2}s)",
                        duration, clip_duration_secs, tolerance
                    ));
                }
                Some(duration)
            }
            Err(e) => {
                logger.warn(&format!("Could not measure dub duration: {}", e));
                None
            }
        };

        logger.success(&format!("Dub synthesized with voice {}", voice_id));
        DubAsset::synthesized(output, duration)
    }
}

/// Run a collaborator call, retrying once on failure.
pub(crate) fn retry_once<T>(
    logger: &JobLogger,
    what: &str,
    call: impl Fn() -> CollaboratorResult<T>,
) -> CollaboratorResult<T> {
    match call() {
        Ok(value) => Ok(value),
        Err(first) => {
            logger.warn(&format!("{} failed ({}), retrying once", what, first));
            call()
        }
    }
}
