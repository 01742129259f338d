//! Batch orchestration.
//!
//! Turns an input path into a list of containers and runs each one through
//! validation, inspection, filtering, naming and extraction. Per-file and
//! per-stream failures are recorded and the batch moves on; only problems
//! with the input path itself abort a run.

mod discover;

pub use discover::discover_containers;

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use subforge_av::{
    inspect_container, resolve_output_path, select_qualifying, validate_container, ClaimedPaths,
    Error, Extractor, FfmpegEngine, MediaEngine, ToolPaths, ToolRegistry,
};
use subforge_common::paths::is_container_file;
use subforge_common::{
    BatchSummary, ExtractionJob, ExtractionOutcome, FileReport, FileStatus, SubtitleStream,
};

use crate::report::{Reporter, Status};

/// Where the orchestrator gets its engine from.
#[derive(Clone)]
pub enum EngineSource {
    /// Discover ffmpeg/ffprobe on every call.
    Tools(ToolPaths),
    /// Always use this engine.
    Fixed(Arc<dyn MediaEngine>),
}

impl EngineSource {
    /// Resolve an engine.
    ///
    /// # Errors
    ///
    /// [`Error::EnvironmentMissing`] when a required tool cannot be found.
    pub fn engine(&self) -> subforge_av::Result<Arc<dyn MediaEngine>> {
        match self {
            EngineSource::Tools(paths) => {
                let registry = ToolRegistry::discover(paths);
                Ok(Arc::new(FfmpegEngine::from_registry(&registry)?))
            }
            EngineSource::Fixed(engine) => Ok(engine.clone()),
        }
    }
}

/// How the input path was interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    File,
    Directory,
}

/// Everything a finished run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub input: PathBuf,
    pub mode: RunMode,
    pub files: Vec<FileReport>,
    pub summary: BatchSummary,
}

/// Drives the per-file pipeline over a file or directory.
pub struct Orchestrator {
    engine: Arc<dyn MediaEngine>,
    extractor: Extractor,
    claimed: ClaimedPaths,
    jobs: usize,
    cancellation: CancellationToken,
}

impl Orchestrator {
    pub fn new(engine: Arc<dyn MediaEngine>) -> Self {
        let cancellation = CancellationToken::new();
        Self {
            extractor: Extractor::new(engine.clone()).with_cancellation(cancellation.clone()),
            engine,
            claimed: ClaimedPaths::new(),
            jobs: 1,
            cancellation,
        }
    }

    /// Number of containers processed concurrently (minimum 1).
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Bound each decode.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.extractor = self.extractor.with_timeout(timeout);
        self
    }

    /// Share output claims with other runs, so overlapping runs over the
    /// same containers never aim at one path.
    pub fn with_claimed(mut self, claimed: ClaimedPaths) -> Self {
        self.claimed = claimed;
        self
    }

    /// Stop launching work and kill in-flight decodes when `token` fires.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.extractor = self.extractor.with_cancellation(token.clone());
        self.cancellation = token;
        self
    }

    /// Run over a single container or a directory tree.
    ///
    /// # Errors
    ///
    /// Only fatal input problems are returned: a missing path, a non-Matroska
    /// single file, an unreadable directory, or a path that is neither a
    /// file nor a directory. Everything else ends up in the [`RunReport`].
    pub async fn run(&self, input: &Path, reporter: &dyn Reporter) -> subforge_av::Result<RunReport> {
        let (mode, containers) = self.plan(input).await?;

        if mode == RunMode::Directory {
            reporter.line(
                Status::Info,
                &format!(
                    "Found {} Matroska file(s) under {}",
                    containers.len(),
                    input.display()
                ),
            );
        }

        let files = self.process_all(containers, reporter).await;

        let mut summary = BatchSummary::default();
        for report in &files {
            summary.record(report);
        }

        if mode == RunMode::Directory {
            reporter.summary(&summary);
        }

        tracing::info!(
            "Run over {:?} finished: {} found, {} extracted, {} failed validation",
            input,
            summary.files_found,
            summary.subtitles_extracted,
            summary.files_failed_validation
        );

        Ok(RunReport {
            input: input.to_path_buf(),
            mode,
            files,
            summary,
        })
    }

    async fn plan(&self, input: &Path) -> subforge_av::Result<(RunMode, Vec<PathBuf>)> {
        let metadata = tokio::fs::metadata(input).await.map_err(|e| {
            let reason = if e.kind() == std::io::ErrorKind::NotFound {
                "path does not exist".to_string()
            } else {
                e.to_string()
            };
            Error::InputPathInvalid {
                path: input.to_path_buf(),
                reason,
            }
        })?;

        if metadata.is_file() {
            if !is_container_file(input) {
                return Err(Error::InvalidInputType {
                    path: input.to_path_buf(),
                });
            }
            return Ok((RunMode::File, vec![input.to_path_buf()]));
        }

        if metadata.is_dir() {
            let root = input.to_path_buf();
            let listed = tokio::task::spawn_blocking(move || -> std::io::Result<Vec<PathBuf>> {
                std::fs::read_dir(&root)?;
                Ok(discover_containers(&root))
            })
            .await
            .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?;

            return match listed {
                Ok(containers) => Ok((RunMode::Directory, containers)),
                Err(e) => Err(Error::InputPathInvalid {
                    path: input.to_path_buf(),
                    reason: format!("cannot read directory: {}", e),
                }),
            };
        }

        Err(Error::InputPathInvalid {
            path: input.to_path_buf(),
            reason: "neither a regular file nor a directory".to_string(),
        })
    }

    async fn process_all(&self, containers: Vec<PathBuf>, reporter: &dyn Reporter) -> Vec<FileReport> {
        let mut reports = Vec::with_capacity(containers.len());

        if self.jobs <= 1 {
            for path in containers {
                if self.cancellation.is_cancelled() {
                    break;
                }
                let report = self.process_file(&path).await;
                reporter.file(&report);
                reports.push(report);
            }
            return reports;
        }

        let semaphore = Arc::new(Semaphore::new(self.jobs));
        let mut handles = Vec::with_capacity(containers.len());

        for path in containers {
            let sem = semaphore.clone();
            let worker = self.worker();

            handles.push(tokio::spawn(async move {
                let _permit = sem.acquire_owned().await.ok()?;
                if worker.cancellation.is_cancelled() {
                    return None;
                }
                Some(worker.process_file(&path).await)
            }));
        }

        // Awaiting in discovery order keeps output deterministic.
        for handle in handles {
            match handle.await {
                Ok(Some(report)) => {
                    reporter.file(&report);
                    reports.push(report);
                }
                Ok(None) => {}
                Err(e) => tracing::error!("Container task failed: {}", e),
            }
        }

        reports
    }

    fn worker(&self) -> Orchestrator {
        Orchestrator {
            engine: self.engine.clone(),
            extractor: self.extractor.clone(),
            claimed: self.claimed.clone(),
            jobs: 1,
            cancellation: self.cancellation.clone(),
        }
    }

    /// Run one container through the full pipeline.
    pub async fn process_file(&self, path: &Path) -> FileReport {
        tracing::info!("Processing {:?}", path);

        if let Err(e) = validate_container(self.engine.as_ref(), path).await {
            tracing::warn!("{}", e);
            return FileReport::new(path.to_path_buf(), FileStatus::Rejected { reason: e.to_string() });
        }

        let streams = match inspect_container(self.engine.as_ref(), path).await {
            Ok(streams) => streams,
            Err(e) => {
                tracing::warn!("{}", e);
                return FileReport::new(
                    path.to_path_buf(),
                    FileStatus::InspectionFailed { reason: e.to_string() },
                );
            }
        };

        if streams.is_empty() {
            return FileReport::new(path.to_path_buf(), FileStatus::NoSubtitles);
        }

        let total = streams.len();
        let qualifying = select_qualifying(streams);
        if qualifying.is_empty() {
            return FileReport::new(
                path.to_path_buf(),
                FileStatus::NoQualifying {
                    subtitle_streams: total,
                },
            );
        }

        tracing::debug!("{:?}: {} of {} stream(s) qualify", path, qualifying.len(), total);

        let mut report = FileReport::new(path.to_path_buf(), FileStatus::Processed);
        for stream in qualifying {
            if self.cancellation.is_cancelled() {
                report.status = FileStatus::Cancelled;
                break;
            }

            match self.extract_stream(path, stream).await {
                Some(outcome) => report.outcomes.push(outcome),
                None => {
                    report.status = FileStatus::Cancelled;
                    break;
                }
            }
        }

        report
    }

    /// `None` when the run was cancelled mid-decode.
    async fn extract_stream(&self, container: &Path, stream: SubtitleStream) -> Option<ExtractionOutcome> {
        let index = stream.index;

        let output = match resolve_output_path(container, &stream, &self.claimed) {
            Ok(output) => output,
            Err(Error::PathAlreadyExists { path }) => {
                tracing::warn!("Skipping stream {} of {:?}: {:?} already exists", index, container, path);
                let reason = format!("output already exists: {}", path.display());
                return Some(ExtractionOutcome::skipped(index, Some(path), reason));
            }
            Err(e) => return Some(ExtractionOutcome::failed(index, e.to_string())),
        };

        let job = ExtractionJob {
            container: container.to_path_buf(),
            stream,
            output,
        };

        let result = self.extractor.run(&job).await;
        self.claimed.release(&job.output);

        match result {
            Ok(bytes) => {
                tracing::info!("Wrote {:?} ({} bytes)", job.output, bytes);
                Some(ExtractionOutcome::extracted(index, job.output))
            }
            Err(Error::PathAlreadyExists { path }) => {
                let reason = format!("output already exists: {}", path.display());
                Some(ExtractionOutcome::skipped(index, Some(path), reason))
            }
            Err(Error::Cancelled) => {
                tracing::info!("Extraction of stream {} of {:?} cancelled", index, container);
                None
            }
            Err(e) => {
                tracing::warn!("{}", e);
                Some(ExtractionOutcome::failed(index, e.to_string()))
            }
        }
    }
}
