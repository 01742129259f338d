//! Output path resolution.
//!
//! Names follow `<base>.<label>.srt`, where the label is the track language
//! when usable and the absolute stream index otherwise. A taken name is
//! retried once as `<base>.<label>.<index>.srt`; if that is taken too the
//! stream is skipped.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use subforge_common::paths::subtitle_output_path;
use subforge_common::SubtitleStream;

use crate::{Error, Result};

/// Output paths reserved while their extraction is in flight.
///
/// Clones share the same set, so every worker of a run (and every run
/// handed the same set) sees every claim. Once a job finishes its path is
/// released; a published file is then guarded by its presence on disk.
#[derive(Debug, Clone, Default)]
pub struct ClaimedPaths {
    inner: Arc<Mutex<HashSet<PathBuf>>>,
}

impl ClaimedPaths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.inner.lock().contains(path)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Drop a claim. Returns whether it was held.
    pub fn release(&self, path: &Path) -> bool {
        self.inner.lock().remove(path)
    }
}

/// Resolve and claim the output path for one stream.
///
/// The existence check and the claim happen under one lock, so concurrent
/// resolutions can never hand out the same path.
///
/// # Errors
///
/// Returns [`Error::PathAlreadyExists`] with the disambiguated path when both
/// candidates are taken.
pub fn resolve_output_path(
    container: &Path,
    stream: &SubtitleStream,
    claimed: &ClaimedPaths,
) -> Result<PathBuf> {
    let index = stream.index.to_string();
    let label = stream.language.usable().unwrap_or(index.as_str());

    let mut set = claimed.inner.lock();
    let taken = |p: &Path| set.contains(p) || p.exists();

    let preferred = subtitle_output_path(container, &[label]);
    let chosen = if !taken(&preferred) {
        preferred
    } else {
        let disambiguated = subtitle_output_path(container, &[label, index.as_str()]);
        if taken(&disambiguated) {
            return Err(Error::PathAlreadyExists {
                path: disambiguated,
            });
        }
        tracing::debug!(
            "{:?} is taken, using {:?} for stream {}",
            preferred,
            disambiguated,
            stream.index
        );
        disambiguated
    };

    set.insert(chosen.clone());
    Ok(chosen)
}
