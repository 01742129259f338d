//! Extraction executor.
//!
//! Runs one decode per [`ExtractionJob`] and only reports success for a
//! non-empty output file. The decoder writes into a private staging
//! directory next to the output; the result is moved into place without
//! replacing anything, so a failed, timed out, or cancelled job never
//! touches the output path.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tempfile::{TempDir, TempPath};
use tokio_util::sync::CancellationToken;

use subforge_common::{ExtractionJob, TARGET_FORMAT};

use crate::engine::{DecodeRequest, MediaEngine};
use crate::{Error, Result};

const STAGING_PREFIX: &str = ".subforge-";

/// Executes extraction jobs against a [`MediaEngine`].
#[derive(Clone)]
pub struct Extractor {
    engine: Arc<dyn MediaEngine>,
    timeout: Option<Duration>,
    cancellation: CancellationToken,
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("engine", &self.engine.name())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Extractor {
    /// Create an executor with no timeout and its own cancellation token.
    pub fn new(engine: Arc<dyn MediaEngine>) -> Self {
        Self {
            engine,
            timeout: None,
            cancellation: CancellationToken::new(),
        }
    }

    /// Builder: bound each decode.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder: abort in-flight decodes when the token is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn engine(&self) -> &Arc<dyn MediaEngine> {
        &self.engine
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Run one job.
    ///
    /// # Errors
    ///
    /// - [`Error::PathAlreadyExists`] if the output exists before the decode
    ///   or appears while it runs.
    /// - [`Error::ExtractionFailed`] if the decode fails, times out, or
    ///   leaves a missing or zero-byte file.
    /// - [`Error::Cancelled`] if the token fires first.
    pub async fn run(&self, job: &ExtractionJob) -> Result<u64> {
        let output = job.output.as_path();

        if self.cancellation.is_cancelled() {
            return Err(Error::Cancelled);
        }

        if tokio::fs::try_exists(output).await.unwrap_or(true) {
            return Err(Error::PathAlreadyExists {
                path: output.to_path_buf(),
            });
        }

        let staging = staging_dir(output)?;
        let staged = staged_path(&staging, output)?;

        tracing::info!(
            "Extracting stream {} of {:?} to {:?}",
            job.stream.index,
            job.container,
            output
        );

        let request = DecodeRequest {
            input: &job.container,
            stream_index: job.stream.index,
            format: TARGET_FORMAT,
            output: &staged,
        };

        let decode = self.decode_with_timeout(request, output);
        let result = tokio::select! {
            result = decode => result,
            _ = self.cancellation.cancelled() => {
                discard(staging);
                return Err(Error::Cancelled);
            }
        };

        if let Err(e) = result {
            discard(staging);
            return Err(e);
        }

        let len = match tokio::fs::metadata(&staged).await {
            Ok(m) if m.len() > 0 => m.len(),
            Ok(_) => {
                discard(staging);
                return Err(Error::extraction_failed(output, "decoder produced an empty file"));
            }
            Err(_) => {
                discard(staging);
                return Err(Error::extraction_failed(output, "decoder produced no output file"));
            }
        };

        let result = publish(staged, output).await;
        discard(staging);
        result.map(|()| len)
    }

    async fn decode_with_timeout(&self, request: DecodeRequest<'_>, output: &Path) -> Result<()> {
        let decode = self.engine.decode_stream(request);
        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, decode).await {
                Ok(result) => result,
                Err(_elapsed) => {
                    return Err(Error::extraction_failed(
                        output,
                        format!("timed out after {:?}", limit),
                    ))
                }
            },
            None => decode.await,
        };

        result.map_err(|e| match e {
            Error::ExtractionFailed { .. } | Error::Cancelled => e,
            other => Error::extraction_failed(output, other.to_string()),
        })
    }
}

/// Private directory beside `output`, so publishing is a same-filesystem link.
fn staging_dir(output: &Path) -> Result<TempDir> {
    let parent = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(parent)
        .map_err(|e| Error::extraction_failed(output, format!("cannot create staging directory: {}", e)))
}

fn staged_path(staging: &TempDir, output: &Path) -> Result<PathBuf> {
    output
        .file_name()
        .map(|name| staging.path().join(name))
        .ok_or_else(|| Error::extraction_failed(output, "output path has no file name"))
}

/// Move the staged file to `output`, failing if anything is already there.
async fn publish(staged: PathBuf, output: &Path) -> Result<()> {
    let target = output.to_path_buf();
    let persisted = tokio::task::spawn_blocking(move || {
        TempPath::from_path(staged).persist_noclobber(&target)
    })
    .await
    .map_err(|e| Error::extraction_failed(output, e.to_string()))?;

    match persisted {
        Ok(()) => Ok(()),
        Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => {
            tracing::debug!("{:?} appeared during the decode, keeping it", output);
            Err(Error::PathAlreadyExists {
                path: output.to_path_buf(),
            })
        }
        Err(e) => Err(Error::extraction_failed(output, e.error.to_string())),
    }
}

fn discard(staging: TempDir) {
    let path = staging.path().to_path_buf();
    if let Err(e) = staging.close() {
        tracing::warn!("Failed to remove staging directory {:?}: {}", path, e);
    }
}
