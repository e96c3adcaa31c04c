//! Media probing via ffprobe.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::dub::{CollaboratorError, CollaboratorResult, MediaProber};

use super::executor::locate_tool;

/// ffprobe-backed media prober.
pub struct FfprobeProber {
    binary: PathBuf,
}

impl FfprobeProber {
    /// Locate ffprobe in the configured tool folders, then PATH.
    pub fn locate(tool_folders: &[String]) -> Option<Self> {
        locate_tool("ffprobe", tool_folders).map(|binary| {
            tracing::info!("Using ffprobe at {}", binary.display());
            Self { binary }
        })
    }

    /// Use a specific binary path.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl MediaProber for FfprobeProber {
    fn duration_secs(&self, path: &Path) -> CollaboratorResult<f64> {
        let output = Command::new(&self.binary)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .output()
            .map_err(|e| CollaboratorError::Io {
                operation: "run ffprobe".to_string(),
                source: e,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CollaboratorError::call_failed(
                "ffprobe",
                stderr.trim().to_string(),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout.trim().parse::<f64>().map_err(|_| {
            CollaboratorError::call_failed(
                "ffprobe",
                format!("unparseable duration: {:?}", stdout.trim()),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_is_io_error() {
        let prober = FfprobeProber::with_binary("/nonexistent/ffprobe");
        let result = prober.duration_secs(Path::new("/media/a.mp4"));
        assert!(matches!(result, Err(CollaboratorError::Io { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn parses_duration_from_stdout() {
        // A shell standing in for ffprobe: prints a duration and exits 0.
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("ffprobe");
        std::fs::write(&fake, "#!/bin/sh\necho 29.97\n").unwrap();
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();

        let prober = FfprobeProber::with_binary(&fake);
        let duration = prober.duration_secs(Path::new("/media/a.mp4")).unwrap();
        assert!((duration - 29.97).abs() < 1e-9);
    }

    #[cfg(unix)]
    #[test]
    fn tool_failure_is_call_failed() {
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("ffprobe");
        std::fs::write(&fake, "#!/bin/sh\necho 'no such file' >&2\nexit 1\n").unwrap();
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();

        let prober = FfprobeProber::with_binary(&fake);
        let result = prober.duration_secs(Path::new("/media/a.mp4"));
        assert!(matches!(result, Err(CollaboratorError::CallFailed { .. })));
    }
}
