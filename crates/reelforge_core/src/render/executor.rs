//! Render executor: the external blocking process that turns a filter
//! graph into an encoded output file.
//!
//! The engine talks to the executor through the [`RenderExecutor`] trait;
//! [`FfmpegExecutor`] is the production implementation over an ffmpeg
//! binary discovered in the configured tool folders or PATH.

use std::collections::VecDeque;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;

use crate::logging::JobLogger;

/// How often a running executor is polled for exit and cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How many trailing stderr lines are kept as the failure diagnostic.
const DIAGNOSTIC_TAIL: usize = 30;

/// Errors from the render executor.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// The executor binary was not found anywhere.
    #[error("'{tool}' not found in any configured tool folder or PATH")]
    NotFound { tool: String },

    /// The process could not be launched.
    #[error("failed to launch {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// The process ran and exited with a failure.
    #[error("{tool} exited with code {exit_code}: {diagnostic}")]
    Failed {
        tool: String,
        exit_code: i32,
        diagnostic: String,
    },

    /// I/O error while supervising the process.
    #[error("I/O error while running {tool}: {source}")]
    Io {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// The run was cancelled and the process terminated.
    #[error("render cancelled")]
    Cancelled,
}

/// Handle for cancelling running work.
///
/// Cloned freely; all clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Create a fresh, uncancelled handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    ///
    /// Jobs stop at their next stage boundary; a running executor process
    /// is terminated.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// External render executor contract.
///
/// `run` blocks until the process finishes, streaming its diagnostic
/// output to the job logger. Implementations must terminate the process
/// when the cancel handle fires.
pub trait RenderExecutor: Send + Sync {
    /// Verify the executor can actually be invoked.
    ///
    /// Called once at scheduler startup, before any job starts.
    fn check_available(&self) -> Result<(), ExecutorError>;

    /// Run the executor with the given argument list.
    fn run(
        &self,
        args: &[String],
        logger: &JobLogger,
        cancel: &CancelHandle,
    ) -> Result<(), ExecutorError>;
}

/// ffmpeg-backed render executor.
pub struct FfmpegExecutor {
    binary: PathBuf,
}

impl FfmpegExecutor {
    /// Locate ffmpeg in the configured tool folders, then PATH.
    pub fn locate(tool_folders: &[String]) -> Result<Self, ExecutorError> {
        match locate_tool("ffmpeg", tool_folders) {
            Some(binary) => {
                tracing::info!("Using ffmpeg at {}", binary.display());
                Ok(Self { binary })
            }
            None => Err(ExecutorError::NotFound {
                tool: "ffmpeg".to_string(),
            }),
        }
    }

    /// Use a specific binary path.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// The resolved binary path.
    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl RenderExecutor for FfmpegExecutor {
    fn check_available(&self) -> Result<(), ExecutorError> {
        if self.binary.is_file() {
            Ok(())
        } else {
            Err(ExecutorError::NotFound {
                tool: self.binary.display().to_string(),
            })
        }
    }

    fn run(
        &self,
        args: &[String],
        logger: &JobLogger,
        cancel: &CancelHandle,
    ) -> Result<(), ExecutorError> {
        let tool = "ffmpeg";

        let mut child = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ExecutorError::Spawn {
                tool: tool.to_string(),
                source: e,
            })?;

        let tail: Arc<Mutex<VecDeque<String>>> = Arc::new(Mutex::new(VecDeque::new()));
        let stderr = child.stderr.take();

        let status = std::thread::scope(|scope| {
            if let Some(stderr) = stderr {
                let tail = Arc::clone(&tail);
                scope.spawn(move || {
                    for line in BufReader::new(stderr).lines().map_while(Result::ok) {
                        logger.output_line(&line);
                        let mut tail = tail.lock();
                        if tail.len() >= DIAGNOSTIC_TAIL {
                            tail.pop_front();
                        }
                        tail.push_back(line);
                    }
                });
            }

            loop {
                if cancel.is_cancelled() {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ExecutorError::Cancelled);
                }
                match child.try_wait() {
                    Ok(Some(status)) => return Ok(status),
                    Ok(None) => std::thread::sleep(POLL_INTERVAL),
                    Err(e) => {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(ExecutorError::Io {
                            tool: tool.to_string(),
                            source: e,
                        });
                    }
                }
            }
        })?;

        if !status.success() {
            let diagnostic = tail.lock().iter().cloned().collect::<Vec<_>>().join("\n");
            return Err(ExecutorError::Failed {
                tool: tool.to_string(),
                exit_code: status.code().unwrap_or(-1),
                diagnostic,
            });
        }
        Ok(())
    }
}

/// Find a tool binary in the given folders, then in PATH.
pub(crate) fn locate_tool(tool: &str, tool_folders: &[String]) -> Option<PathBuf> {
    let file_name = if cfg!(windows) {
        format!("{}.exe", tool)
    } else {
        tool.to_string()
    };

    for folder in tool_folders {
        let candidate = Path::new(folder).join(&file_name);
        if candidate.is_file() {
            return Some(candidate);
        }
    }

    std::env::var_os("PATH").and_then(|paths| {
        std::env::split_paths(&paths)
            .map(|dir| dir.join(&file_name))
            .find(|candidate| candidate.is_file())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logger() -> JobLogger {
        JobLogger::disabled("executor_test")
    }

    #[test]
    fn cancel_handle_propagates() {
        let handle = CancelHandle::new();
        let clone = handle.clone();
        assert!(!clone.is_cancelled());
        handle.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn locate_finds_tool_in_folder() {
        let dir = tempfile::tempdir().unwrap();
        let name = if cfg!(windows) { "ffmpeg.exe" } else { "ffmpeg" };
        std::fs::write(dir.path().join(name), b"").unwrap();

        let folders = vec![dir.path().display().to_string()];
        let found = locate_tool("ffmpeg", &folders).unwrap();
        assert!(found.starts_with(dir.path()));
    }

    #[test]
    fn locate_missing_tool_is_none() {
        assert!(locate_tool("definitely_not_a_real_tool_name", &[]).is_none());
    }

    #[test]
    fn unavailable_binary_fails_check() {
        let executor = FfmpegExecutor::with_binary("/nonexistent/ffmpeg");
        assert!(matches!(
            executor.check_available(),
            Err(ExecutorError::NotFound { .. })
        ));
    }

    #[test]
    fn spawn_failure_is_reported() {
        let executor = FfmpegExecutor::with_binary("/nonexistent/ffmpeg");
        let result = executor.run(&["-version".to_string()], &logger(), &CancelHandle::new());
        assert!(matches!(result, Err(ExecutorError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn successful_process_returns_ok() {
        let executor = FfmpegExecutor::with_binary("/bin/sh");
        let args = vec!["-c".to_string(), "exit 0".to_string()];
        assert!(executor.run(&args, &logger(), &CancelHandle::new()).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn failing_process_reports_exit_code_and_diagnostic() {
        let executor = FfmpegExecutor::with_binary("/bin/sh");
        let args = vec![
            "-c".to_string(),
            "echo boom >&2; exit 3".to_string(),
        ];
        match executor.run(&args, &logger(), &CancelHandle::new()) {
            Err(ExecutorError::Failed {
                exit_code,
                diagnostic,
                ..
            }) => {
                assert_eq!(exit_code, 3);
                assert!(diagnostic.contains("boom"));
            }
            other => panic!("expected Failed, got {:?}", other.map(|_| ())),
        }
    }

    #[cfg(unix)]
    #[test]
    fn cancellation_terminates_the_process() {
        let executor = FfmpegExecutor::with_binary("/bin/sh");
        let cancel = CancelHandle::new();
        cancel.cancel();
        let args = vec!["-c".to_string(), "sleep 30".to_string()];
        let started = std::time::Instant::now();
        let result = executor.run(&args, &logger(), &cancel);
        assert!(matches!(result, Err(ExecutorError::Cancelled)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
