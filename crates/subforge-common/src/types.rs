//! Core type definitions for subtitle streams, extraction jobs, and batch
//! accounting.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Codec identifiers of the subtitle markup family subforge extracts.
pub const QUALIFYING_CODECS: [&str; 2] = ["ass", "ssa"];

/// Format name handed to the decoder for every extracted track.
pub const TARGET_FORMAT: &str = "srt";

/// Language tag of a subtitle track as reported by the container.
///
/// The container can omit the tag, mark it undetermined (`und`), or carry a
/// literal `null`; none of those are usable in an output file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageTag {
    /// No language field at all.
    Absent,
    /// The ISO 639-2 "undetermined" code, `und`.
    Undefined,
    /// The literal string `null`.
    Null,
    /// Field present but blank.
    Empty,
    /// A real language code such as `eng` or `jpn`.
    Code(String),
}

impl LanguageTag {
    /// Classify a raw tag value. `None` means the field was absent.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None => Self::Absent,
            Some("") => Self::Empty,
            Some("und") => Self::Undefined,
            Some("null") => Self::Null,
            Some(code) => Self::Code(code.to_string()),
        }
    }

    /// The tag if it can be used as a file name label.
    ///
    /// Codes that could leave the container's directory (path separators,
    /// `..`, NUL) are not usable either.
    pub fn usable(&self) -> Option<&str> {
        match self {
            Self::Code(code) if is_plain_label(code) => Some(code),
            _ => None,
        }
    }
}

fn is_plain_label(code: &str) -> bool {
    !code.contains(['/', '\\', '\0']) && !code.contains("..")
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "none"),
            Self::Undefined => write!(f, "und"),
            Self::Null => write!(f, "null"),
            Self::Empty => write!(f, "empty"),
            Self::Code(code) => write!(f, "{}", code),
        }
    }
}

/// One subtitle track inside a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleStream {
    /// Container-wide stream index (not counted among subtitle tracks only).
    pub index: u32,
    /// Codec identifier, e.g. `ass`, `subrip`, `hdmv_pgs_subtitle`.
    pub codec: String,
    /// Language tag.
    pub language: LanguageTag,
}

impl SubtitleStream {
    pub fn new(index: u32, codec: impl Into<String>, language: LanguageTag) -> Self {
        Self {
            index,
            codec: codec.into(),
            language,
        }
    }

    /// Whether the codec belongs to the qualifying markup family.
    ///
    /// Comparison is case-sensitive: engines report codec names in lowercase.
    pub fn is_qualifying(&self) -> bool {
        QUALIFYING_CODECS.contains(&self.codec.as_str())
    }
}

/// Unit of work for one qualifying stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionJob {
    /// Source container.
    pub container: PathBuf,
    /// Stream to decode.
    pub stream: SubtitleStream,
    /// Resolved, claimed output path.
    pub output: PathBuf,
}

/// How a single stream ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    /// Subtitle file written and verified.
    Extracted,
    /// Not attempted (output name already taken).
    Skipped,
    /// Attempted and failed; any partial output was removed.
    Failed,
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extracted => write!(f, "extracted"),
            Self::Skipped => write!(f, "skipped"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Result of one extraction job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    /// Absolute index of the stream this outcome belongs to.
    pub stream_index: u32,
    /// Outcome classification.
    pub kind: OutcomeKind,
    /// Output path; set when the file was written, or the path that blocked a skip.
    pub output: Option<PathBuf>,
    /// Human-readable reason for a skip or failure.
    pub reason: Option<String>,
}

impl ExtractionOutcome {
    pub fn extracted(stream_index: u32, output: PathBuf) -> Self {
        Self {
            stream_index,
            kind: OutcomeKind::Extracted,
            output: Some(output),
            reason: None,
        }
    }

    pub fn skipped(stream_index: u32, output: Option<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            stream_index,
            kind: OutcomeKind::Skipped,
            output,
            reason: Some(reason.into()),
        }
    }

    pub fn failed(stream_index: u32, reason: impl Into<String>) -> Self {
        Self {
            stream_index,
            kind: OutcomeKind::Failed,
            output: None,
            reason: Some(reason.into()),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.kind == OutcomeKind::Extracted
    }
}

/// Final state of one container after the pipeline ran over it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    /// Failed validation (missing, unreadable, empty, corrupt).
    Rejected { reason: String },
    /// Validated, but the stream listing could not be obtained or parsed.
    InspectionFailed { reason: String },
    /// No subtitle tracks at all.
    NoSubtitles,
    /// Subtitle tracks exist but none use a qualifying codec.
    NoQualifying { subtitle_streams: usize },
    /// At least one qualifying stream was handed to the executor.
    Processed,
    /// Run was cancelled before this file was finished.
    Cancelled,
}

/// Everything the pipeline learned about one container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub status: FileStatus,
    #[serde(default)]
    pub outcomes: Vec<ExtractionOutcome>,
}

impl FileReport {
    pub fn new(path: PathBuf, status: FileStatus) -> Self {
        Self {
            path,
            status,
            outcomes: Vec::new(),
        }
    }

    /// Number of streams written successfully.
    pub fn extracted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    fn count(&self, kind: OutcomeKind) -> usize {
        self.outcomes.iter().filter(|o| o.kind == kind).count()
    }
}

/// Running totals for a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Containers discovered.
    pub files_found: usize,
    /// Containers that passed validation.
    pub files_validated: usize,
    /// Containers with at least one successful extraction.
    pub files_with_subtitles: usize,
    /// Subtitle files written.
    pub subtitles_extracted: usize,
    /// Containers that failed validation.
    pub files_failed_validation: usize,
    /// Containers whose stream listing failed.
    pub files_failed_inspection: usize,
    /// Streams skipped because their output name was taken.
    pub streams_skipped: usize,
    /// Streams whose extraction failed.
    pub streams_failed: usize,
}

impl BatchSummary {
    /// Fold one finished file into the totals.
    pub fn record(&mut self, report: &FileReport) {
        self.files_found += 1;

        match report.status {
            FileStatus::Rejected { .. } => {
                self.files_failed_validation += 1;
                return;
            }
            FileStatus::InspectionFailed { .. } => self.files_failed_inspection += 1,
            _ => {}
        }
        self.files_validated += 1;

        let extracted = report.extracted();
        if extracted > 0 {
            self.files_with_subtitles += 1;
        }
        self.subtitles_extracted += extracted;
        self.streams_skipped += report.count(OutcomeKind::Skipped);
        self.streams_failed += report.count(OutcomeKind::Failed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_tag_classification() {
        assert_eq!(LanguageTag::from_raw(None), LanguageTag::Absent);
        assert_eq!(LanguageTag::from_raw(Some("")), LanguageTag::Empty);
        assert_eq!(LanguageTag::from_raw(Some("  ")), LanguageTag::Empty);
        assert_eq!(LanguageTag::from_raw(Some("und")), LanguageTag::Undefined);
        assert_eq!(LanguageTag::from_raw(Some("null")), LanguageTag::Null);
        assert_eq!(
            LanguageTag::from_raw(Some("eng")),
            LanguageTag::Code("eng".to_string())
        );
    }

    #[test]
    fn test_language_tag_usable() {
        assert_eq!(LanguageTag::from_raw(Some("jpn")).usable(), Some("jpn"));
        assert_eq!(LanguageTag::Absent.usable(), None);
        assert_eq!(LanguageTag::Undefined.usable(), None);
        assert_eq!(LanguageTag::Null.usable(), None);
        assert_eq!(LanguageTag::Empty.usable(), None);
    }

    #[test]
    fn test_path_like_language_tag_is_not_usable() {
        for raw in ["../../tmp/x", "eng/sub", "..\\evil", "..", "a\0b"] {
            assert_eq!(LanguageTag::from_raw(Some(raw)).usable(), None, "{:?}", raw);
        }
        assert_eq!(LanguageTag::from_raw(Some("pt-BR")).usable(), Some("pt-BR"));
        assert_eq!(LanguageTag::from_raw(Some("en.forced")).usable(), Some("en.forced"));
    }

    #[test]
    fn test_qualifying_codecs_are_case_sensitive() {
        assert!(SubtitleStream::new(2, "ass", LanguageTag::Absent).is_qualifying());
        assert!(SubtitleStream::new(3, "ssa", LanguageTag::Absent).is_qualifying());
        assert!(!SubtitleStream::new(4, "ASS", LanguageTag::Absent).is_qualifying());
        assert!(!SubtitleStream::new(5, "subrip", LanguageTag::Absent).is_qualifying());
        assert!(!SubtitleStream::new(6, "hdmv_pgs_subtitle", LanguageTag::Absent).is_qualifying());
    }

    #[test]
    fn test_summary_counts_rejected_file() {
        let mut summary = BatchSummary::default();
        summary.record(&FileReport::new(
            PathBuf::from("bad.mkv"),
            FileStatus::Rejected {
                reason: "corrupt".to_string(),
            },
        ));

        assert_eq!(summary.files_found, 1);
        assert_eq!(summary.files_failed_validation, 1);
        assert_eq!(summary.files_validated, 0);
        assert_eq!(summary.files_with_subtitles, 0);
    }

    #[test]
    fn test_summary_requires_one_success_per_file() {
        let mut report = FileReport::new(PathBuf::from("a.mkv"), FileStatus::Processed);
        report
            .outcomes
            .push(ExtractionOutcome::failed(2, "decoder exited with status 1"));
        report.outcomes.push(ExtractionOutcome::skipped(
            3,
            Some(PathBuf::from("a.eng.3.srt")),
            "already exists",
        ));

        let mut summary = BatchSummary::default();
        summary.record(&report);
        assert_eq!(summary.files_validated, 1);
        assert_eq!(summary.files_with_subtitles, 0);
        assert_eq!(summary.streams_failed, 1);
        assert_eq!(summary.streams_skipped, 1);

        report
            .outcomes
            .push(ExtractionOutcome::extracted(4, PathBuf::from("a.4.srt")));
        summary.record(&report);
        assert_eq!(summary.files_found, 2);
        assert_eq!(summary.files_with_subtitles, 1);
        assert_eq!(summary.subtitles_extracted, 1);
    }

    #[test]
    fn test_file_report_serializes_status_inline() {
        let report = FileReport::new(
            PathBuf::from("/m/none.mkv"),
            FileStatus::NoQualifying {
                subtitle_streams: 2,
            },
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "no_qualifying");
        assert_eq!(json["subtitle_streams"], 2);
        assert_eq!(json["path"], "/m/none.mkv");
    }
}
