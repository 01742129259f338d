//! The media engine seam.
//!
//! Everything subforge knows about container internals comes through
//! [`MediaEngine`]: a format probe, a subtitle stream listing, and a
//! single-stream decode. The probe and the listing return the engine's raw
//! JSON payload; typed parsing happens in [`crate::validate`] and
//! [`crate::inspect`], so any engine emitting the same shape can be plugged in.

mod ffmpeg;

pub use ffmpeg::FfmpegEngine;

use async_trait::async_trait;
use std::path::Path;

use crate::Result;

/// Parameters for decoding one stream to a file.
#[derive(Debug, Clone, Copy)]
pub struct DecodeRequest<'a> {
    /// Source container.
    pub input: &'a Path,
    /// Container-wide stream index.
    pub stream_index: u32,
    /// Target subtitle format name (e.g. `srt`).
    pub format: &'a str,
    /// Output file. The engine must refuse to overwrite an existing file.
    pub output: &'a Path,
}

/// A media parsing and transcoding backend.
///
/// Implementations must be safe to share across threads (`Send + Sync`).
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Human-readable name identifying this engine.
    fn name(&self) -> &'static str;

    /// Probe basic container format metadata.
    ///
    /// Returns a JSON object with a `format` member on success.
    async fn probe_format(&self, path: &Path) -> Result<String>;

    /// List the subtitle streams of a container.
    ///
    /// Returns a JSON object whose `streams` array holds `index`,
    /// `codec_name` and optional `tags.language` for each subtitle stream.
    async fn list_subtitle_streams(&self, path: &Path) -> Result<String>;

    /// Decode one stream into the requested format at the requested path.
    ///
    /// Fails if the engine reports failure. A success return does not by
    /// itself guarantee a usable file; callers verify the output.
    async fn decode_stream(&self, request: DecodeRequest<'_>) -> Result<()>;
}
