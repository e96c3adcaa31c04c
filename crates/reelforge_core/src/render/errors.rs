//! Error types for render jobs and the scheduler.
//!
//! Job errors never cross job boundaries: whatever happens inside a job
//! becomes one failed result entry, and sibling jobs keep running. The
//! only batch-fatal condition is the executor binary missing at scheduler
//! startup.

use thiserror::Error;

use crate::models::{FailureCategory, ValidationError};
use crate::temp::TempError;

/// Terminal error of one render job.
#[derive(Debug, Error)]
pub enum JobError {
    /// Bad clip spec or render config; surfaced before any work starts.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Local asset build failed (source unreadable, subtitle write, ...).
    #[error("preparation failed: {0}")]
    Preparation(String),

    /// The render executor failed, or its output is corrupt/empty.
    #[error("render failed: {0}")]
    RenderExecution(String),

    /// Temp filesystem failure; may indicate disk exhaustion.
    #[error("resource failure: {0}")]
    Resource(#[from] TempError),

    /// The caller cancelled the job.
    #[error("cancelled")]
    Cancelled,
}

impl JobError {
    /// Create a preparation error.
    pub fn preparation(message: impl Into<String>) -> Self {
        Self::Preparation(message.into())
    }

    /// Create a render execution error.
    pub fn render_execution(message: impl Into<String>) -> Self {
        Self::RenderExecution(message.into())
    }

    /// The human-readable failure category reported to the caller.
    pub fn category(&self) -> FailureCategory {
        match self {
            JobError::Validation(_) => FailureCategory::Validation,
            JobError::Preparation(_) => FailureCategory::Preparation,
            JobError::RenderExecution(_) => FailureCategory::RenderExecution,
            JobError::Resource(_) => FailureCategory::Resource,
            JobError::Cancelled => FailureCategory::Cancelled,
        }
    }
}

/// Result type for job-internal operations.
pub type JobResult<T> = Result<T, JobError>;

/// Batch-level scheduler errors.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The render executor binary was not found in any configured
    /// location. Reported before any job starts.
    #[error("render executor unavailable: {0}")]
    ExecutorNotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_match_variants() {
        assert_eq!(
            JobError::preparation("no source").category(),
            FailureCategory::Preparation
        );
        assert_eq!(
            JobError::render_execution("exit 1").category(),
            FailureCategory::RenderExecution
        );
        assert_eq!(JobError::Cancelled.category(), FailureCategory::Cancelled);
    }

    #[test]
    fn validation_error_converts() {
        let err: JobError = ValidationError::ScoreOutOfRange(120).into();
        assert_eq!(err.category(), FailureCategory::Validation);
    }
}
