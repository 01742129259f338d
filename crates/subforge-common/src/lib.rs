//! Subforge-Common: Shared types, constants, and utilities.
//!
//! This crate provides the vocabulary shared by the extraction library and
//! the command-line front end:
//!
//! - **Stream Types**: subtitle stream descriptors and language tags
//! - **Job Types**: extraction jobs, per-stream outcomes, per-file reports
//! - **Accounting**: the [`BatchSummary`] folded over a run
//! - **Path Utilities**: container detection and output file naming
//!
//! # Examples
//!
//! ```
//! use subforge_common::{LanguageTag, SubtitleStream};
//! use subforge_common::paths::is_container_file;
//! use std::path::Path;
//!
//! let stream = SubtitleStream::new(2, "ass", LanguageTag::from_raw(Some("eng")));
//! assert!(stream.is_qualifying());
//! assert!(is_container_file(Path::new("movie.mkv")));
//! ```

pub mod paths;
pub mod types;

pub use types::*;
