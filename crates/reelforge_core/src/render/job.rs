//! Render job: one clip, one configuration, one worker.
//!
//! A job moves strictly forward through `Pending` → `Preparing` →
//! `Rendering` → `Validating` and ends in `Succeeded` or `Failed`. Temp
//! resources are released on every terminal path before the result is
//! reported, and nothing a job does can affect a sibling job.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::Settings;
use crate::dub::{DubAsset, DubBuilder, MediaProber, SpeechSynthesizer, Translator};
use crate::filtergraph::{build_filter_graph, working_copy_args, GraphSpec};
use crate::logging::{JobLogger, LogConfig};
use crate::models::{ClipSpec, JobState, RenderConfig, RenderJobResult};
use crate::subtitles::{materialize, SubtitleBuilder};
use crate::temp::{self, TempKind, TempManager, TempScope};

use super::errors::{JobError, JobResult};
use super::executor::{CancelHandle, ExecutorError, RenderExecutor};
use super::progress::{emit, ProgressEvent, ProgressSink};

/// Height of the reduced working copy rendered in performance mode.
const WORKING_COPY_HEIGHT: u32 = 720;

/// Shared resources and collaborators handed to each job by the
/// scheduler. Everything here is read-only from the job's perspective.
pub struct JobContext<'a> {
    pub settings: &'a Settings,
    pub executor: &'a dyn RenderExecutor,
    pub translator: &'a dyn Translator,
    pub synthesizer: &'a dyn SpeechSynthesizer,
    pub prober: &'a dyn MediaProber,
    pub temp: &'a TempManager,
    pub progress: Option<ProgressSink>,
    pub cancel: &'a CancelHandle,
}

/// The unit of work: one clip rendered under one resolved configuration.
pub struct RenderJob {
    /// 1-based position in the submitted batch.
    pub number: usize,
    pub spec: ClipSpec,
    /// Batch config with per-clip overrides already applied.
    pub config: RenderConfig,
}

impl RenderJob {
    pub fn new(number: usize, spec: ClipSpec, config: RenderConfig) -> Self {
        Self {
            number,
            spec,
            config,
        }
    }

    /// Stable identifier: batch position plus sanitized title.
    pub fn clip_id(&self) -> String {
        format!("clip_{:02}_{}", self.number, self.spec.sanitized_title())
    }

    /// Run the job to a terminal state.
    ///
    /// Always returns a result; errors become a `Failed` entry with a
    /// category the caller can show. Temp resources are released before
    /// the result is returned, whichever path ends the job.
    pub fn run(&self, ctx: &JobContext<'_>) -> RenderJobResult {
        let started = Instant::now();
        let clip_id = self.clip_id();

        let logger = JobLogger::new(
            &clip_id,
            &ctx.settings.paths.logs_folder,
            LogConfig::from_settings(&ctx.settings.logging),
            None,
        )
        .unwrap_or_else(|e| {
            tracing::warn!("Could not create log file for {}: {}", clip_id, e);
            JobLogger::disabled(&clip_id)
        });

        logger.info(&format!(
            "Job {}: '{}' [{:.2}s..{:.2}s], score {}",
            clip_id, self.spec.title, self.spec.start, self.spec.end, self.spec.score
        ));

        let mut scope = ctx.temp.scope(&clip_id);
        let outcome = self.run_inner(ctx, &logger, &mut scope);

        // The guaranteed-release block: runs before any result leaves
        // this job, on success and failure alike.
        scope.release_all();

        match outcome {
            Ok(output_path) => {
                logger.success(&format!("Output: {}", output_path.display()));
                self.transition(ctx, &logger, JobState::Succeeded, Some(output_path.display().to_string()));
                RenderJobResult::success(clip_id, self.number, output_path, started.elapsed())
            }
            Err(error) => {
                logger.error(&error.to_string());
                logger.show_tail("executor");
                self.transition(ctx, &logger, JobState::Failed, Some(error.to_string()));
                RenderJobResult::failure(
                    clip_id,
                    self.number,
                    error.category(),
                    error.to_string(),
                    started.elapsed(),
                )
            }
        }
    }

    fn run_inner(
        &self,
        ctx: &JobContext<'_>,
        logger: &JobLogger,
        scope: &mut TempScope<'_>,
    ) -> JobResult<PathBuf> {
        if ctx.cancel.is_cancelled() {
            return Err(JobError::Cancelled);
        }

        self.transition(ctx, logger, JobState::Preparing, None);

        self.config.validate()?;
        self.spec
            .validate(ctx.settings.render.max_clip_duration_secs)?;
        if !self.spec.source.is_file() {
            return Err(JobError::preparation(format!(
                "source video not readable: {}",
                self.spec.source.display()
            )));
        }

        let output_dir = Path::new(&ctx.settings.paths.output_folder);
        fs::create_dir_all(output_dir).map_err(|e| {
            JobError::preparation(format!("cannot create output folder: {}", e))
        })?;

        let (render_source, seek_secs) = self.prepare_source(ctx, logger, scope)?;
        let subtitle_file = self.prepare_subtitles(ctx, logger, scope)?;
        let dub = self.prepare_dub(ctx, logger, scope);

        if ctx.cancel.is_cancelled() {
            return Err(JobError::Cancelled);
        }

        self.transition(ctx, logger, JobState::Rendering, None);

        let output_path = output_dir.join(format!("{}.mp4", self.clip_id()));
        self.render(
            ctx,
            logger,
            &render_source,
            seek_secs,
            subtitle_file.as_deref(),
            &dub,
            &output_path,
        )?;

        self.transition(ctx, logger, JobState::Validating, None);
        self.validate_output(ctx, &output_path)?;

        Ok(output_path)
    }

    /// Resolve the source the render reads from.
    ///
    /// In performance mode the clip range is pre-rendered into a reduced
    /// working copy, so the expensive filter pass reads less data; the
    /// graph itself is unchanged, only its input seek becomes zero.
    fn prepare_source(
        &self,
        ctx: &JobContext<'_>,
        logger: &JobLogger,
        scope: &mut TempScope<'_>,
    ) -> JobResult<(PathBuf, f64)> {
        if !self.config.performance_mode {
            return Ok((self.spec.source.clone(), self.spec.start));
        }

        let copy = scope.acquire(TempKind::Video);
        let mut args: Vec<String> = vec![
            "-y".into(),
            "-ss".into(),
            format!("{:.3}", self.spec.start),
            "-t".into(),
            format!("{:.3}", self.spec.duration()),
            "-i".into(),
            self.spec.source.display().to_string(),
        ];
        args.extend(working_copy_args(WORKING_COPY_HEIGHT));
        args.push(copy.display().to_string());

        logger.info(&format!(
            "Performance mode: pre-rendering source at {}p",
            WORKING_COPY_HEIGHT
        ));
        logger.command(&args.join(" "));

        ctx.executor
            .run(&args, logger, ctx.cancel)
            .map_err(|e| match e {
                ExecutorError::Cancelled => JobError::Cancelled,
                other => JobError::preparation(format!("working copy failed: {}", other)),
            })?;

        Ok((copy, 0.0))
    }

    /// Build and materialize the subtitle track, if enabled.
    fn prepare_subtitles(
        &self,
        ctx: &JobContext<'_>,
        logger: &JobLogger,
        scope: &mut TempScope<'_>,
    ) -> JobResult<Option<PathBuf>> {
        let Some(language) = self.config.subtitles else {
            return Ok(None);
        };

        // Translation is recoverable: after a retry the cue text simply
        // stays in the transcript's language.
        let translation = match language.translation_code() {
            Some(code) => {
                match crate::dub::retry_once(logger, "subtitle translation", || {
                    ctx.translator.translate(&self.spec.text_segment, code)
                }) {
                    Ok(text) => Some(text),
                    Err(e) => {
                        logger.warn(&format!(
                            "Subtitle translation failed twice ({}), keeping original text",
                            e
                        ));
                        None
                    }
                }
            }
            None => None,
        };

        let builder = SubtitleBuilder::new(&ctx.settings.subtitles);
        let track = builder.build(
            &self.spec.tokens,
            self.spec.start,
            self.spec.end,
            translation.as_deref(),
        );

        if track.is_empty() {
            logger.info("No transcript tokens in range, skipping subtitle burn-in");
            return Ok(None);
        }

        let path = scope.acquire(TempKind::Subtitle);
        materialize(&track, &path)
            .map_err(|e| JobError::preparation(format!("cannot write subtitle track: {}", e)))?;
        logger.info(&format!("Subtitle track: {} cue(s)", track.len()));
        Ok(Some(path))
    }

    /// Build the dub asset. Never fails the job; degraded outcomes keep
    /// the original audio.
    fn prepare_dub(
        &self,
        ctx: &JobContext<'_>,
        logger: &JobLogger,
        scope: &mut TempScope<'_>,
    ) -> DubAsset {
        DubBuilder::new(
            ctx.translator,
            ctx.synthesizer,
            ctx.prober,
            &ctx.settings.dub,
            &ctx.settings.audio,
        )
        .build(
            &self.spec.text_segment,
            self.config.dub,
            self.spec.duration(),
            scope,
            logger,
        )
    }

    /// Build the filter graph and drive the executor.
    #[allow(clippy::too_many_arguments)]
    fn render(
        &self,
        ctx: &JobContext<'_>,
        logger: &JobLogger,
        render_source: &Path,
        seek_secs: f64,
        subtitle_file: Option<&Path>,
        dub: &DubAsset,
        output_path: &Path,
    ) -> JobResult<()> {
        let graph = build_filter_graph(&GraphSpec {
            source: render_source,
            seek_secs,
            duration_secs: self.spec.duration(),
            color_filter: self.config.color_filter,
            hook_text: self.spec.hook_text.as_deref(),
            subtitle_file,
            watermark: self.config.watermark.as_deref(),
            watermark_anchor: self.config.watermark_anchor,
            progress_bar: self.config.progress_bar,
            dub,
            audio: &ctx.settings.audio,
        });

        let stage_names: Vec<String> = graph.stages().iter().map(|s| s.to_string()).collect();
        logger.info(&format!("Stages: {}", stage_names.join(" -> ")));

        let args = graph.to_args(output_path);
        logger.command(&args.join(" "));

        ctx.executor
            .run(&args, logger, ctx.cancel)
            .map_err(|e| match e {
                ExecutorError::Cancelled => {
                    // A force-terminated render must never leave a partial
                    // file that could be mistaken for output.
                    if let Err(cleanup) = temp::release(output_path) {
                        tracing::warn!(
                            "Could not remove partial output {}: {}",
                            output_path.display(),
                            cleanup
                        );
                    }
                    JobError::Cancelled
                }
                other => {
                    if let Err(cleanup) = temp::release(output_path) {
                        tracing::warn!(
                            "Could not remove partial output {}: {}",
                            output_path.display(),
                            cleanup
                        );
                    }
                    JobError::render_execution(other.to_string())
                }
            })?;

        Ok(())
    }

    /// Confirm the executor produced a real output file.
    ///
    /// A zero- or near-zero-byte file after a reported success is a known
    /// failure mode of bad graph construction and is treated as a render
    /// failure, never a success.
    fn validate_output(&self, ctx: &JobContext<'_>, output_path: &Path) -> JobResult<()> {
        let metadata = fs::metadata(output_path).map_err(|_| {
            JobError::render_execution("executor reported success but wrote no output file")
        })?;

        let min_bytes = ctx.settings.render.min_output_bytes;
        if metadata.len() < min_bytes {
            if let Err(cleanup) = temp::release(output_path) {
                tracing::warn!(
                    "Could not remove truncated output {}: {}",
                    output_path.display(),
                    cleanup
                );
            }
            return Err(JobError::render_execution(format!(
                "output file is {} bytes (minimum {})",
                metadata.len(),
                min_bytes
            )));
        }
        Ok(())
    }

    fn transition(
        &self,
        ctx: &JobContext<'_>,
        logger: &JobLogger,
        state: JobState,
        message: Option<String>,
    ) {
        logger.phase(&state.to_string());
        emit(
            ctx.progress.as_ref(),
            ProgressEvent {
                clip_id: self.clip_id(),
                number: self.number,
                state,
                message,
            },
        );
    }
}
