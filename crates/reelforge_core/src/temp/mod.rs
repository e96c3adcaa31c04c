//! Scoped temporary file management for render jobs.
//!
//! Every job acquires its temp paths through a [`TempScope`], which
//! guarantees exactly one release per acquisition on every exit path
//! (including failure paths) via RAII. The per-run temp root is a shared
//! namespace, but acquired paths embed the owning job id and a monotonic
//! counter, so jobs never collide.
//!
//! Nothing can release files on a process crash, so creating a new
//! [`TempManager`] first sweeps stale run roots left behind by previous
//! aborted runs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

/// Prefix for per-run directories under the temp root.
const RUN_PREFIX: &str = "run_";

/// Sequence number making run roots unique within one process.
static RUN_SEQ: AtomicU64 = AtomicU64::new(0);

/// Errors from temp resource operations.
///
/// These are fatal to the affected job and logged as process-level
/// warnings, since they may indicate disk exhaustion affecting all jobs.
#[derive(Debug, Error)]
pub enum TempError {
    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },
}

impl TempError {
    fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }
}

/// Result type for temp operations.
pub type TempResult<T> = Result<T, TempError>;

/// Kind of temporary asset, determines the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempKind {
    /// Intermediate video (working copies).
    Video,
    /// Synthesized dub audio.
    Audio,
    /// Materialized subtitle track.
    Subtitle,
}

impl TempKind {
    fn extension(&self) -> &'static str {
        match self {
            TempKind::Video => "mp4",
            TempKind::Audio => "mp3",
            TempKind::Subtitle => "ass",
        }
    }
}

/// Manager for one run's temporary files.
///
/// Owns a unique directory under the configured temp root. All paths
/// handed out live under that directory; `remove_run_root` (or drop)
/// deletes whatever is left.
#[derive(Debug)]
pub struct TempManager {
    run_root: PathBuf,
    counter: AtomicU64,
}

impl TempManager {
    /// Create a manager for a new run.
    ///
    /// Sweeps stale run roots from previous aborted runs, then creates a
    /// fresh unique run directory.
    pub fn create(temp_root: &Path) -> TempResult<Self> {
        let swept = sweep_stale(temp_root)?;
        if swept > 0 {
            tracing::info!("Removed {} stale temp run root(s)", swept);
        }

        let seq = RUN_SEQ.fetch_add(1, Ordering::SeqCst);
        let run_root = temp_root.join(format!(
            "{}{}_{}_{}",
            RUN_PREFIX,
            chrono::Local::now().format("%Y%m%d_%H%M%S"),
            std::process::id(),
            seq
        ));
        fs::create_dir_all(&run_root)
            .map_err(|e| TempError::io(format!("create {}", run_root.display()), e))?;

        Ok(Self {
            run_root,
            counter: AtomicU64::new(0),
        })
    }

    /// The run's root directory.
    pub fn run_root(&self) -> &Path {
        &self.run_root
    }

    /// Open a scope that tracks acquisitions for one job.
    pub fn scope(&self, job_id: impl Into<String>) -> TempScope<'_> {
        TempScope {
            manager: self,
            job_id: job_id.into(),
            acquired: Vec::new(),
        }
    }

    /// Hand out a unique path for the given kind, owned by `job_id`.
    ///
    /// The file itself is not created; the caller writes it. Prefer
    /// acquiring through a [`TempScope`] so release is guaranteed.
    fn acquire(&self, job_id: &str, kind: TempKind) -> PathBuf {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        self.run_root
            .join(format!("{}_{:03}.{}", job_id, n, kind.extension()))
    }

    /// Whether the run root currently holds no files.
    pub fn is_empty(&self) -> TempResult<bool> {
        let mut entries = fs::read_dir(&self.run_root)
            .map_err(|e| TempError::io(format!("read {}", self.run_root.display()), e))?;
        Ok(entries.next().is_none())
    }

    /// Delete the run root and anything left inside it.
    pub fn remove_run_root(&self) -> TempResult<()> {
        release(&self.run_root)
    }
}

/// Delete a temp file or directory.
///
/// A missing path is a no-op (already cleaned up), not an error.
pub fn release(path: &Path) -> TempResult<()> {
    let result = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(TempError::io(format!("stat {}", path.display()), e)),
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(TempError::io(format!("remove {}", path.display()), e)),
    }
}

/// Remove stale run roots under the temp root.
///
/// Returns the number of roots removed. A missing temp root counts as
/// nothing to sweep.
pub fn sweep_stale(temp_root: &Path) -> TempResult<usize> {
    let entries = match fs::read_dir(temp_root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(TempError::io(format!("read {}", temp_root.display()), e)),
    };

    let mut removed = 0;
    for entry in entries {
        let entry = entry.map_err(|e| TempError::io("read temp root entry", e))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name.starts_with(RUN_PREFIX) {
            release(&entry.path())?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Tracks one job's temp acquisitions and releases them on drop.
///
/// Dropping the scope is the guaranteed-release block around a job: it
/// runs on success, on failure, and on cancellation alike.
#[derive(Debug)]
pub struct TempScope<'a> {
    manager: &'a TempManager,
    job_id: String,
    acquired: Vec<PathBuf>,
}

impl TempScope<'_> {
    /// Acquire a unique temp path of the given kind.
    pub fn acquire(&mut self, kind: TempKind) -> PathBuf {
        let path = self.manager.acquire(&self.job_id, kind);
        self.acquired.push(path.clone());
        path
    }

    /// Number of paths this scope currently tracks.
    pub fn acquired_count(&self) -> usize {
        self.acquired.len()
    }

    /// Release everything acquired so far.
    ///
    /// Called automatically on drop; calling it twice is harmless.
    pub fn release_all(&mut self) {
        for path in self.acquired.drain(..) {
            if let Err(e) = release(&path) {
                // Deletion failure may mean the disk is in trouble; make
                // it visible beyond this job.
                tracing::warn!("Failed to release temp path {}: {}", path.display(), e);
            }
        }
    }
}

impl Drop for TempScope<'_> {
    fn drop(&mut self) {
        self.release_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquired_paths_are_unique_per_job() {
        let dir = tempfile::tempdir().unwrap();
        let manager = TempManager::create(dir.path()).unwrap();

        let mut scope_a = manager.scope("job_a");
        let mut scope_b = manager.scope("job_b");

        let a1 = scope_a.acquire(TempKind::Audio);
        let a2 = scope_a.acquire(TempKind::Audio);
        let b1 = scope_b.acquire(TempKind::Audio);

        assert_ne!(a1, a2);
        assert_ne!(a1, b1);
        assert!(a1.starts_with(manager.run_root()));
    }

    #[test]
    fn scope_drop_releases_files() {
        let dir = tempfile::tempdir().unwrap();
        let manager = TempManager::create(dir.path()).unwrap();

        {
            let mut scope = manager.scope("job_a");
            let path = scope.acquire(TempKind::Subtitle);
            fs::write(&path, "content").unwrap();
            assert!(path.exists());
        }

        assert!(manager.is_empty().unwrap());
    }

    #[test]
    fn release_of_missing_path_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        assert!(release(&dir.path().join("never_created.mp4")).is_ok());
    }

    #[test]
    fn release_all_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let manager = TempManager::create(dir.path()).unwrap();

        let mut scope = manager.scope("job_a");
        let path = scope.acquire(TempKind::Video);
        fs::write(&path, "x").unwrap();

        scope.release_all();
        scope.release_all();
        assert_eq!(scope.acquired_count(), 0);
    }

    #[test]
    fn stale_roots_are_swept_on_create() {
        let dir = tempfile::tempdir().unwrap();

        let stale = dir.path().join("run_20240101_000000_1_0");
        fs::create_dir_all(&stale).unwrap();
        fs::write(stale.join("leftover.mp4"), "junk").unwrap();

        let manager = TempManager::create(dir.path()).unwrap();
        assert!(!stale.exists());
        assert!(manager.run_root().exists());
    }

    #[test]
    fn remove_run_root_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let manager = TempManager::create(dir.path()).unwrap();
        let root = manager.run_root().to_path_buf();

        manager.remove_run_root().unwrap();
        assert!(!root.exists());
    }
}
