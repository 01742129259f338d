//! ffprobe/ffmpeg command-line engine.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::{DecodeRequest, MediaEngine};
use crate::command::ToolCommand;
use crate::tools::ToolRegistry;
use crate::Result;

/// [`MediaEngine`] backed by the ffprobe and ffmpeg executables.
#[derive(Debug, Clone)]
pub struct FfmpegEngine {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl FfmpegEngine {
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    /// Build an engine from discovered tools.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::EnvironmentMissing`] if either tool is absent.
    pub fn from_registry(tools: &ToolRegistry) -> Result<Self> {
        tools.require_all()?;
        Ok(Self::new(tools.require("ffmpeg")?, tools.require("ffprobe")?))
    }

    fn probe_args(path: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> =
            ["-v", "error", "-print_format", "json", "-show_format"]
                .iter()
                .map(OsString::from)
                .collect();
        args.push(path.into());
        args
    }

    fn stream_list_args(path: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-v",
            "error",
            "-select_streams",
            "s",
            "-show_entries",
            "stream=index,codec_name,codec_type:stream_tags=language",
            "-print_format",
            "json",
        ]
        .iter()
        .map(OsString::from)
        .collect();
        args.push(path.into());
        args
    }

    fn decode_args(request: &DecodeRequest<'_>) -> Vec<OsString> {
        let mut args: Vec<OsString> =
            ["-nostdin", "-hide_banner", "-loglevel", "error", "-n", "-i"]
                .iter()
                .map(OsString::from)
                .collect();
        args.push(request.input.into());
        args.push("-map".into());
        args.push(format!("0:{}", request.stream_index).into());
        args.push("-c:s".into());
        args.push(request.format.into());
        args.push("-f".into());
        args.push(request.format.into());
        args.push(request.output.into());
        args
    }
}

#[async_trait]
impl MediaEngine for FfmpegEngine {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    async fn probe_format(&self, path: &Path) -> Result<String> {
        let output = ToolCommand::new(self.ffprobe.clone())
            .args(Self::probe_args(path))
            .execute()
            .await?;
        Ok(output.stdout)
    }

    async fn list_subtitle_streams(&self, path: &Path) -> Result<String> {
        let output = ToolCommand::new(self.ffprobe.clone())
            .args(Self::stream_list_args(path))
            .execute()
            .await?;
        Ok(output.stdout)
    }

    async fn decode_stream(&self, request: DecodeRequest<'_>) -> Result<()> {
        // Bounded by the caller; a large container can take minutes.
        ToolCommand::new(self.ffmpeg.clone())
            .args(Self::decode_args(&request))
            .timeout(None)
            .execute()
            .await?;
        Ok(())
    }
}
