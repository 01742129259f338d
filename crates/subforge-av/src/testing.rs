//! Scripted [`MediaEngine`] for tests.
//!
//! Containers are scripted per path: format probe result, stream listing
//! payload, and what each decode does. Unscripted paths probe as valid
//! Matroska with no subtitle streams.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use subforge_common::{LanguageTag, SubtitleStream};

use crate::engine::{DecodeRequest, MediaEngine};
use crate::{Error, Result};

const MATROSKA_FORMAT: &str = r#"{"format": {"format_name": "matroska,webm", "duration": "60.0"}}"#;

/// Subtitle payload written by a successful scripted decode.
pub const SAMPLE_SRT: &str = "1\n00:00:01,000 --> 00:00:02,500\nHello there\n\n";

/// What a scripted decode does.
#[derive(Debug, Clone)]
pub enum DecodeBehavior {
    /// Write [`SAMPLE_SRT`] and succeed.
    Succeed,
    /// Create an empty file and report success.
    SucceedEmpty,
    /// Report success without creating anything.
    SucceedWithoutOutput,
    /// Write some bytes, then fail.
    FailAfterPartial,
    /// Fail without touching the filesystem.
    Fail,
    /// Write some bytes, then run for the given time before succeeding.
    Slow(Duration),
    /// Write some bytes, run for the given time, then fail.
    SlowFail(Duration),
}

#[derive(Debug, Clone)]
enum Listing {
    Payload(String),
    Fail,
}

#[derive(Debug, Clone)]
struct ContainerScript {
    corrupt: bool,
    listing: Listing,
    decode: HashMap<u32, DecodeBehavior>,
}

impl Default for ContainerScript {
    fn default() -> Self {
        Self {
            corrupt: false,
            listing: Listing::Payload(r#"{"streams": []}"#.to_string()),
            decode: HashMap::new(),
        }
    }
}

/// A [`MediaEngine`] whose answers are scripted per container path.
#[derive(Debug)]
pub struct ScriptedEngine {
    scripts: Mutex<HashMap<PathBuf, ContainerScript>>,
    default_decode: DecodeBehavior,
    probe_calls: AtomicUsize,
    decoded: Mutex<Vec<(PathBuf, u32)>>,
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            default_decode: DecodeBehavior::Succeed,
            probe_calls: AtomicUsize::new(0),
            decoded: Mutex::new(Vec::new()),
        }
    }

    fn edit(self, path: &Path, f: impl FnOnce(&mut ContainerScript)) -> Self {
        f(self.scripts.lock().entry(path.to_path_buf()).or_default());
        self
    }

    /// Script the subtitle streams reported for a container.
    pub fn with_streams(self, path: &Path, streams: Vec<SubtitleStream>) -> Self {
        let payload = streams_json(&streams);
        self.edit(path, |s| s.listing = Listing::Payload(payload))
    }

    /// Script a raw stream listing payload.
    pub fn with_listing(self, path: &Path, payload: &str) -> Self {
        let payload = payload.to_string();
        self.edit(path, |s| s.listing = Listing::Payload(payload))
    }

    /// Make the stream listing call fail.
    pub fn failing_listing(self, path: &Path) -> Self {
        self.edit(path, |s| s.listing = Listing::Fail)
    }

    /// Make the format probe fail.
    pub fn corrupt(self, path: &Path) -> Self {
        self.edit(path, |s| s.corrupt = true)
    }

    /// Script the decode of one stream.
    pub fn decode(self, path: &Path, stream_index: u32, behavior: DecodeBehavior) -> Self {
        self.edit(path, |s| {
            s.decode.insert(stream_index, behavior);
        })
    }

    /// Behavior for decodes without a per-stream script.
    pub fn default_decode(mut self, behavior: DecodeBehavior) -> Self {
        self.default_decode = behavior;
        self
    }

    /// Number of format probes performed.
    pub fn probe_calls(&self) -> usize {
        self.probe_calls.load(Ordering::SeqCst)
    }

    /// Every `(container, stream index)` handed to decode, in call order.
    pub fn decoded(&self) -> Vec<(PathBuf, u32)> {
        self.decoded.lock().clone()
    }

    fn script(&self, path: &Path) -> ContainerScript {
        self.scripts.lock().get(path).cloned().unwrap_or_default()
    }
}

/// Render streams the way `ffprobe -of json` lists them.
pub fn streams_json(streams: &[SubtitleStream]) -> String {
    let streams: Vec<Value> = streams
        .iter()
        .map(|s| {
            let mut stream = json!({
                "index": s.index,
                "codec_name": s.codec,
                "codec_type": "subtitle",
            });
            let language = match &s.language {
                LanguageTag::Absent => None,
                LanguageTag::Undefined => Some("und"),
                LanguageTag::Null => Some("null"),
                LanguageTag::Empty => Some(""),
                LanguageTag::Code(code) => Some(code.as_str()),
            };
            if let Some(language) = language {
                stream["tags"] = json!({ "language": language });
            }
            stream
        })
        .collect();
    json!({ "streams": streams }).to_string()
}

#[async_trait]
impl MediaEngine for ScriptedEngine {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn probe_format(&self, path: &Path) -> Result<String> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        if self.script(path).corrupt {
            return Err(Error::tool_failed(
                "ffprobe",
                "Invalid data found when processing input",
            ));
        }
        Ok(MATROSKA_FORMAT.to_string())
    }

    async fn list_subtitle_streams(&self, path: &Path) -> Result<String> {
        match self.script(path).listing {
            Listing::Payload(payload) => Ok(payload),
            Listing::Fail => Err(Error::tool_failed("ffprobe", "exited with status 1")),
        }
    }

    async fn decode_stream(&self, request: DecodeRequest<'_>) -> Result<()> {
        self.decoded
            .lock()
            .push((request.input.to_path_buf(), request.stream_index));

        if request.output.exists() {
            return Err(Error::tool_failed(
                "ffmpeg",
                format!("File '{}' already exists. Exiting.", request.output.display()),
            ));
        }

        let behavior = self
            .script(request.input)
            .decode
            .get(&request.stream_index)
            .cloned()
            .unwrap_or_else(|| self.default_decode.clone());

        match behavior {
            DecodeBehavior::Succeed => {
                tokio::fs::write(request.output, SAMPLE_SRT).await?;
                Ok(())
            }
            DecodeBehavior::SucceedEmpty => {
                tokio::fs::write(request.output, b"").await?;
                Ok(())
            }
            DecodeBehavior::SucceedWithoutOutput => Ok(()),
            DecodeBehavior::FailAfterPartial => {
                tokio::fs::write(request.output, "1\n00:00:01,000 --> ").await?;
                Err(Error::tool_failed("ffmpeg", "exited with status 1: Conversion failed!"))
            }
            DecodeBehavior::Fail => Err(Error::tool_failed(
                "ffmpeg",
                "exited with status 1: Subtitle encoding failed",
            )),
            DecodeBehavior::Slow(duration) => {
                tokio::fs::write(request.output, "1\n").await?;
                tokio::time::sleep(duration).await;
                tokio::fs::write(request.output, SAMPLE_SRT).await?;
                Ok(())
            }
            DecodeBehavior::SlowFail(duration) => {
                tokio::fs::write(request.output, "1\n").await?;
                tokio::time::sleep(duration).await;
                Err(Error::tool_failed("ffmpeg", "exited with status 1: Conversion failed!"))
            }
        }
    }
}
