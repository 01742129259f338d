//! # subforge-av
//!
//! Subtitle discovery and extraction for Matroska containers, driven by
//! external ffprobe/ffmpeg tools.
//!
//! This crate provides:
//!
//! - **Tool discovery** ([`ToolRegistry`]) -- find ffmpeg and ffprobe and
//!   fail fast when either is missing.
//! - **Command execution** ([`ToolCommand`]) -- async builder with timeout
//!   support for running external processes.
//! - **Engine seam** ([`MediaEngine`], [`FfmpegEngine`]) -- format probe,
//!   stream listing, and single-stream decode.
//! - **Pipeline stages** -- [`validate_container`], [`inspect_container`],
//!   [`select_qualifying`], [`resolve_output_path`], and the [`Extractor`].

mod error;

pub mod command;
pub mod engine;
pub mod extract;
pub mod filter;
pub mod inspect;
pub mod naming;
pub mod tools;
pub mod validate;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// ---- Re-exports for convenience ----

pub use command::{ToolCommand, ToolOutput};
pub use engine::{DecodeRequest, FfmpegEngine, MediaEngine};
pub use error::{ContainerDefect, Error, Result};
pub use extract::Extractor;
pub use filter::select_qualifying;
pub use inspect::inspect_container;
pub use naming::{resolve_output_path, ClaimedPaths};
pub use tools::{ToolInfo, ToolPaths, ToolRegistry, REQUIRED_TOOLS};
pub use validate::{validate_container, ContainerFormat};
