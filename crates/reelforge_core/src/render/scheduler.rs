//! Render scheduler: bounded-concurrency execution of a clip batch.
//!
//! The scheduler owns a small fixed pool of worker threads; each job runs
//! on exactly one worker for its whole lifetime. Jobs may finish in any
//! order, results are returned in submission order, and one clip's
//! failure never cancels its siblings.

use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::Settings;
use crate::dub::{MediaProber, SpeechSynthesizer, Translator};
use crate::models::{ClipSpec, FailureCategory, JobOverrides, RenderConfig, RenderJobResult};
use crate::temp::TempManager;

use super::errors::SchedulerError;
use super::executor::{CancelHandle, RenderExecutor};
use super::job::{JobContext, RenderJob};
use super::progress::ProgressSink;

/// One submitted clip plus its optional per-clip overrides.
///
/// Only the dub voice and the subtitle language may vary per clip;
/// everything else comes from the batch config.
pub struct ClipJob {
    pub spec: ClipSpec,
    pub overrides: JobOverrides,
}

impl ClipJob {
    pub fn new(spec: ClipSpec) -> Self {
        Self {
            spec,
            overrides: JobOverrides::default(),
        }
    }

    pub fn with_overrides(spec: ClipSpec, overrides: JobOverrides) -> Self {
        Self { spec, overrides }
    }
}

impl From<ClipSpec> for ClipJob {
    fn from(spec: ClipSpec) -> Self {
        Self::new(spec)
    }
}

/// Runs render job batches with bounded concurrency.
pub struct RenderScheduler {
    settings: Settings,
    executor: Arc<dyn RenderExecutor>,
    translator: Arc<dyn Translator>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    prober: Arc<dyn MediaProber>,
    cancel: CancelHandle,
}

impl RenderScheduler {
    pub fn new(
        settings: Settings,
        executor: Arc<dyn RenderExecutor>,
        translator: Arc<dyn Translator>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        prober: Arc<dyn MediaProber>,
    ) -> Self {
        Self {
            settings,
            executor,
            translator,
            synthesizer,
            prober,
            cancel: CancelHandle::new(),
        }
    }

    /// Handle for cancelling the current (or next) batch.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Run a batch of clips to completion.
    ///
    /// Returns one result per submitted clip, in submission order,
    /// whatever mixture of success and failure the jobs produced. The
    /// only error is the executor being unavailable, which is checked
    /// before any job starts.
    pub fn run_batch(
        &self,
        clips: Vec<ClipJob>,
        config: &RenderConfig,
        progress: Option<ProgressSink>,
    ) -> Result<Vec<RenderJobResult>, SchedulerError> {
        self.executor
            .check_available()
            .map_err(|e| SchedulerError::ExecutorNotFound(e.to_string()))?;

        if clips.is_empty() {
            return Ok(Vec::new());
        }

        let jobs: Vec<RenderJob> = clips
            .into_iter()
            .enumerate()
            .map(|(i, clip)| {
                RenderJob::new(i + 1, clip.spec, config.with_overrides(&clip.overrides))
            })
            .collect();
        let total = jobs.len();

        // A temp setup failure dooms every job the same way, but the
        // caller still gets a complete, per-clip result set.
        let temp = match TempManager::create(Path::new(&self.settings.paths.temp_root)) {
            Ok(temp) => temp,
            Err(e) => {
                tracing::warn!("Temp root setup failed, failing batch: {}", e);
                return Ok(jobs
                    .iter()
                    .map(|job| {
                        RenderJobResult::failure(
                            job.clip_id(),
                            job.number,
                            FailureCategory::Resource,
                            e.to_string(),
                            Duration::ZERO,
                        )
                    })
                    .collect());
            }
        };

        let workers = self.settings.render.max_concurrent_jobs.max(1).min(total);
        tracing::info!("Rendering {} clip(s) on {} worker(s)", total, workers);

        let queue: Mutex<VecDeque<RenderJob>> = Mutex::new(jobs.into());
        let (tx, rx) = mpsc::channel::<RenderJobResult>();

        std::thread::scope(|scope| {
            for worker_id in 0..workers {
                let tx = tx.clone();
                let queue = &queue;
                let temp = &temp;
                let progress = progress.clone();
                scope.spawn(move || loop {
                    let job = queue.lock().pop_front();
                    let Some(job) = job else { break };
                    tracing::debug!("Worker {} picked up {}", worker_id, job.clip_id());

                    let ctx = JobContext {
                        settings: &self.settings,
                        executor: self.executor.as_ref(),
                        translator: self.translator.as_ref(),
                        synthesizer: self.synthesizer.as_ref(),
                        prober: self.prober.as_ref(),
                        temp,
                        progress: progress.clone(),
                        cancel: &self.cancel,
                    };

                    let clip_id = job.clip_id();
                    let number = job.number;
                    let result = catch_unwind(AssertUnwindSafe(|| job.run(&ctx)))
                        .unwrap_or_else(|_| {
                            tracing::error!("Job {} panicked", clip_id);
                            RenderJobResult::failure(
                                clip_id,
                                number,
                                FailureCategory::Preparation,
                                "internal job error",
                                Duration::ZERO,
                            )
                        });

                    // A closed channel means the batch is being torn
                    // down; nothing left to report to.
                    let _ = tx.send(result);
                });
            }
        });
        drop(tx);

        let mut slots: Vec<Option<RenderJobResult>> = (0..total).map(|_| None).collect();
        for result in rx.iter() {
            let index = result.number.saturating_sub(1);
            if index < total {
                slots[index] = Some(result);
            }
        }

        if let Err(e) = temp.remove_run_root() {
            tracing::warn!("Could not remove temp run root: {}", e);
        }

        let results: Vec<RenderJobResult> = slots.into_iter().flatten().collect();
        if results.len() != total {
            tracing::error!(
                "Batch produced {} of {} expected results",
                results.len(),
                total
            );
        }
        Ok(results)
    }
}
