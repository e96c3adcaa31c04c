//! Job lifecycle states and per-clip results.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a render job.
///
/// Jobs move strictly forward: `Pending` → `Preparing` → `Rendering` →
/// `Validating` → terminal. `Succeeded` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Preparing,
    Rendering,
    Validating,
    Succeeded,
    Failed,
}

impl JobState {
    /// Whether this state ends the job.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Failed)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::Pending => write!(f, "Pending"),
            JobState::Preparing => write!(f, "Preparing"),
            JobState::Rendering => write!(f, "Rendering"),
            JobState::Validating => write!(f, "Validating"),
            JobState::Succeeded => write!(f, "Succeeded"),
            JobState::Failed => write!(f, "Failed"),
        }
    }
}

/// Human-readable category for a failed job.
///
/// Callers see the category plus a detail string, never a raw error chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    /// Bad clip spec or render config.
    Validation,
    /// Local asset build failed (source unreadable, subtitle write, ...).
    Preparation,
    /// Render executor failed or produced a corrupt/empty output.
    RenderExecution,
    /// Temp filesystem failure; may indicate disk exhaustion.
    Resource,
    /// The job was cancelled by the caller.
    Cancelled,
}

impl std::fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureCategory::Validation => write!(f, "validation"),
            FailureCategory::Preparation => write!(f, "preparation"),
            FailureCategory::RenderExecution => write!(f, "render execution"),
            FailureCategory::Resource => write!(f, "resource"),
            FailureCategory::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Immutable result of one render job, collected by the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderJobResult {
    /// Clip identifier (sanitized title plus batch position).
    pub clip_id: String,
    /// 1-based position in the submitted batch.
    pub number: usize,
    /// Terminal state, `Succeeded` or `Failed`.
    pub state: JobState,
    /// Output file path (present iff succeeded).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    /// Failure category (present iff failed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureCategory>,
    /// Failure detail for logs and the caller's report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Wall-clock time the job took, in seconds.
    pub elapsed_secs: f64,
}

impl RenderJobResult {
    /// Create a successful result.
    pub fn success(
        clip_id: impl Into<String>,
        number: usize,
        output_path: PathBuf,
        elapsed: Duration,
    ) -> Self {
        Self {
            clip_id: clip_id.into(),
            number,
            state: JobState::Succeeded,
            output_path: Some(output_path),
            failure: None,
            error: None,
            elapsed_secs: elapsed.as_secs_f64(),
        }
    }

    /// Create a failed result.
    pub fn failure(
        clip_id: impl Into<String>,
        number: usize,
        category: FailureCategory,
        error: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            clip_id: clip_id.into(),
            number,
            state: JobState::Failed,
            output_path: None,
            failure: Some(category),
            error: Some(error.into()),
            elapsed_secs: elapsed.as_secs_f64(),
        }
    }

    /// Whether the job succeeded.
    pub fn is_success(&self) -> bool {
        self.state == JobState::Succeeded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(JobState::Succeeded.is_terminal());
        assert!(JobState::Failed.is_terminal());
        assert!(!JobState::Rendering.is_terminal());
    }

    #[test]
    fn success_result_carries_output() {
        let result = RenderJobResult::success(
            "clip_01_Hook",
            1,
            PathBuf::from("/out/clip_01_Hook.mp4"),
            Duration::from_secs_f64(12.5),
        );
        assert!(result.is_success());
        assert!(result.output_path.is_some());
        assert!(result.failure.is_none());
    }

    #[test]
    fn failure_result_carries_category() {
        let result = RenderJobResult::failure(
            "clip_02_Bad",
            2,
            FailureCategory::Validation,
            "invalid time range",
            Duration::from_millis(3),
        );
        assert!(!result.is_success());
        assert_eq!(result.failure, Some(FailureCategory::Validation));
        assert!(result.output_path.is_none());
    }

    #[test]
    fn result_serializes() {
        let result = RenderJobResult::success(
            "clip_01_Hook",
            1,
            PathBuf::from("/out/clip_01_Hook.mp4"),
            Duration::from_secs(1),
        );
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"clip_id\":\"clip_01_Hook\""));
        assert!(json.contains("\"state\":\"succeeded\""));
    }
}
