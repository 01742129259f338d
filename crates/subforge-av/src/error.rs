//! Error types for subforge-av.

use std::fmt;
use std::path::PathBuf;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a container failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerDefect {
    /// Path does not exist.
    NotFound,
    /// Path exists but cannot be opened for reading.
    NotReadable(String),
    /// File has zero length.
    Empty,
    /// The engine could not read basic format metadata.
    Corrupt(String),
}

impl fmt::Display for ContainerDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "file not found"),
            Self::NotReadable(why) => write!(f, "file not readable: {}", why),
            Self::Empty => write!(f, "file is empty"),
            Self::Corrupt(why) => write!(f, "not a valid container: {}", why),
        }
    }
}

/// Errors that can occur while discovering and extracting subtitles.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// One or more required external tools are missing. Fatal for the run.
    #[error("required tools not found: {}", tools.join(", "))]
    EnvironmentMissing { tools: Vec<String> },

    /// A required external tool is not available.
    #[error("tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// An external tool failed to execute.
    #[error("tool execution failed: {tool}: {message}")]
    ToolFailed { tool: String, message: String },

    /// The top-level input path cannot be processed.
    #[error("invalid input path {}: {reason}", path.display())]
    InputPathInvalid { path: PathBuf, reason: String },

    /// A single-file input does not have the container extension.
    #[error("not a Matroska file: {}", path.display())]
    InvalidInputType { path: PathBuf },

    /// A container failed validation.
    #[error("invalid container {}: {defect}", path.display())]
    ContainerInvalid {
        path: PathBuf,
        defect: ContainerDefect,
    },

    /// The engine could not list the container's streams.
    #[error("failed to query streams of {}: {message}", path.display())]
    StreamQueryFailed { path: PathBuf, message: String },

    /// The engine's stream listing could not be parsed.
    #[error("malformed stream metadata for {}: {message}", path.display())]
    MalformedMetadata { path: PathBuf, message: String },

    /// Both the preferred and the disambiguated output names are taken.
    #[error("output already exists: {}", path.display())]
    PathAlreadyExists { path: PathBuf },

    /// Decoding a stream failed or produced no usable output.
    #[error("extraction to {} failed: {message}", path.display())]
    ExtractionFailed { path: PathBuf, message: String },

    /// The run was cancelled before the operation finished.
    #[error("cancelled")]
    Cancelled,

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a tool not found error.
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    /// Create a tool execution failed error.
    pub fn tool_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a container validation error.
    pub fn container_invalid(path: impl Into<PathBuf>, defect: ContainerDefect) -> Self {
        Self::ContainerInvalid {
            path: path.into(),
            defect,
        }
    }

    /// Create an extraction failure for the given output path.
    pub fn extraction_failed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ExtractionFailed {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether this error must stop the whole invocation rather than one file
    /// or stream.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::EnvironmentMissing { .. }
                | Self::InputPathInvalid { .. }
                | Self::InvalidInputType { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::EnvironmentMissing {
            tools: vec!["ffmpeg".to_string(), "ffprobe".to_string()],
        };
        assert_eq!(err.to_string(), "required tools not found: ffmpeg, ffprobe");

        let err = Error::container_invalid("/m/a.mkv", ContainerDefect::Empty);
        assert_eq!(err.to_string(), "invalid container /m/a.mkv: file is empty");

        let err = Error::PathAlreadyExists {
            path: PathBuf::from("/m/a.eng.2.srt"),
        };
        assert_eq!(err.to_string(), "output already exists: /m/a.eng.2.srt");
    }

    #[test]
    fn test_fatal_classification() {
        assert!(Error::EnvironmentMissing { tools: vec![] }.is_fatal());
        assert!(Error::InvalidInputType {
            path: PathBuf::from("a.mp4")
        }
        .is_fatal());
        assert!(!Error::container_invalid("a.mkv", ContainerDefect::NotFound).is_fatal());
        assert!(!Error::extraction_failed("a.srt", "exit 1").is_fatal());
        assert!(!Error::Cancelled.is_fatal());
    }
}
