//! Collaborator contracts consumed by the dub builder.
//!
//! The engine owns only these traits; production implementations are thin
//! wrappers around whatever translation / speech services the caller
//! uses. Failures here are recoverable: the builder retries once and then
//! degrades to the original audio.

use std::io;
use std::path::Path;

use thiserror::Error;

/// Errors from external collaborator calls.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// The service could not be reached at all.
    #[error("{service} unavailable: {reason}")]
    Unavailable { service: String, reason: String },

    /// The service was reached but the call failed.
    #[error("{service} call failed: {reason}")]
    CallFailed { service: String, reason: String },

    /// Local I/O around the call failed.
    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },
}

impl CollaboratorError {
    /// Create an unavailable error.
    pub fn unavailable(service: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            service: service.into(),
            reason: reason.into(),
        }
    }

    /// Create a call failed error.
    pub fn call_failed(service: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CallFailed {
            service: service.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for collaborator calls.
pub type CollaboratorResult<T> = Result<T, CollaboratorError>;

/// Translates text into a target language.
pub trait Translator: Send + Sync {
    /// Translate `text` into the language identified by `target_lang`
    /// (two-letter code).
    fn translate(&self, text: &str, target_lang: &str) -> CollaboratorResult<String>;
}

/// Synthesizes speech for translated text.
///
/// Implementations are typically driven by their own internal event loop;
/// `synthesize` must run that flow to completion and only then return, so
/// the calling job blocks until the asset is fully written. Two synthesis
/// calls never interleave within one job.
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` with the given voice into `output`.
    ///
    /// `rate_offset_percent` shifts the speaking rate relative to the
    /// voice's natural rate.
    fn synthesize(
        &self,
        text: &str,
        voice: &str,
        rate_offset_percent: i32,
        output: &Path,
    ) -> CollaboratorResult<()>;
}

/// Measures media assets.
pub trait MediaProber: Send + Sync {
    /// Duration of the asset at `path`, in seconds.
    fn duration_secs(&self, path: &Path) -> CollaboratorResult<f64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_display_service_context() {
        let err = CollaboratorError::call_failed("translator", "timeout after 30s");
        let msg = err.to_string();
        assert!(msg.contains("translator"));
        assert!(msg.contains("timeout"));
    }
}
