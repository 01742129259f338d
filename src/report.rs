//! Console reporting.
//!
//! The orchestrator talks to a [`Reporter`]; the CLI prints colored status
//! lines, the HTTP service collects a plain transcript.

use colored::*;
use parking_lot::Mutex;
use std::path::Path;

use subforge_common::{BatchSummary, FileReport, FileStatus, OutcomeKind};

/// Status prefix of a report line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Skip,
    Fail,
    Info,
}

impl Status {
    pub fn tag(self) -> &'static str {
        match self {
            Status::Ok => "[OK]",
            Status::Skip => "[SKIP]",
            Status::Fail => "[FAIL]",
            Status::Info => "[INFO]",
        }
    }
}

/// Sink for user-facing progress lines.
pub trait Reporter: Send + Sync {
    /// Emit one status line.
    fn line(&self, status: Status, message: &str);

    /// Emit a line without a status prefix.
    fn plain(&self, message: &str);

    /// Per-stream lines followed by the per-file line.
    fn file(&self, report: &FileReport) {
        let name = display_name(&report.path);

        for outcome in &report.outcomes {
            let reason = outcome.reason.as_deref().unwrap_or("unknown error");
            match outcome.kind {
                OutcomeKind::Extracted => {
                    let output = outcome
                        .output
                        .as_deref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default();
                    self.line(
                        Status::Ok,
                        &format!("{}: stream {} -> {}", name, outcome.stream_index, output),
                    );
                }
                OutcomeKind::Skipped => self.line(
                    Status::Skip,
                    &format!("{}: stream {}: {}", name, outcome.stream_index, reason),
                ),
                OutcomeKind::Failed => self.line(
                    Status::Fail,
                    &format!("{}: stream {}: {}", name, outcome.stream_index, reason),
                ),
            }
        }

        let (status, message) = match &report.status {
            FileStatus::Rejected { reason } => (Status::Fail, reason.clone()),
            FileStatus::InspectionFailed { reason } => (Status::Fail, reason.clone()),
            FileStatus::NoSubtitles => (Status::Info, "no subtitle streams found".to_string()),
            FileStatus::NoQualifying { subtitle_streams } => (
                Status::Info,
                format!(
                    "no ASS/SSA subtitle streams ({} subtitle stream(s) in other formats)",
                    subtitle_streams
                ),
            ),
            FileStatus::Processed => {
                let extracted = report.extracted();
                let status = if extracted > 0 {
                    Status::Ok
                } else {
                    Status::Fail
                };
                (
                    status,
                    format!(
                        "extracted {} of {} ASS/SSA subtitle stream(s)",
                        extracted,
                        report.outcomes.len()
                    ),
                )
            }
            FileStatus::Cancelled => (Status::Skip, "cancelled".to_string()),
        };
        self.line(status, &format!("{}: {}", name, message));
    }

    /// End-of-run totals.
    fn summary(&self, summary: &BatchSummary) {
        self.plain("");
        self.plain("Summary:");
        for (label, value) in summary_rows(summary) {
            self.plain(&format!("  {:<36}{}", label, value));
        }
    }
}

fn summary_rows(summary: &BatchSummary) -> Vec<(&'static str, usize)> {
    let mut rows = vec![
        ("Containers found:", summary.files_found),
        ("Containers with ASS/SSA subtitles:", summary.files_with_subtitles),
        ("Subtitles extracted:", summary.subtitles_extracted),
        ("Containers failing validation:", summary.files_failed_validation),
    ];
    if summary.files_failed_inspection > 0 {
        rows.push(("Containers failing inspection:", summary.files_failed_inspection));
    }
    if summary.streams_skipped > 0 {
        rows.push(("Streams skipped:", summary.streams_skipped));
    }
    if summary.streams_failed > 0 {
        rows.push(("Streams failed:", summary.streams_failed));
    }
    rows
}

fn display_name(path: &Path) -> String {
    path.display().to_string()
}

/// Prints colored lines to stdout.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn line(&self, status: Status, message: &str) {
        let tag = match status {
            Status::Ok => status.tag().green().bold(),
            Status::Skip => status.tag().yellow().bold(),
            Status::Fail => status.tag().red().bold(),
            Status::Info => status.tag().cyan(),
        };
        println!("{} {}", tag, message);
    }

    fn plain(&self, message: &str) {
        println!("{}", message);
    }
}

/// Collects uncolored lines in memory.
#[derive(Debug, Default)]
pub struct TranscriptReporter {
    lines: Mutex<Vec<String>>,
}

impl TranscriptReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// All lines joined with newlines.
    pub fn text(&self) -> String {
        let lines = self.lines.lock();
        let mut text = lines.join("\n");
        if !lines.is_empty() {
            text.push('\n');
        }
        text
    }
}

impl Reporter for TranscriptReporter {
    fn line(&self, status: Status, message: &str) {
        self.lines
            .lock()
            .push(format!("{} {}", status.tag(), message));
    }

    fn plain(&self, message: &str) {
        self.lines.lock().push(message.to_string());
    }
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn line(&self, _status: Status, _message: &str) {}

    fn plain(&self, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use subforge_common::ExtractionOutcome;

    #[test]
    fn file_report_lines() {
        let mut report = FileReport::new(PathBuf::from("/m/ep.mkv"), FileStatus::Processed);
        report
            .outcomes
            .push(ExtractionOutcome::extracted(2, PathBuf::from("/m/ep.eng.srt")));
        report.outcomes.push(ExtractionOutcome::skipped(
            3,
            Some(PathBuf::from("/m/ep.eng.3.srt")),
            "output already exists: /m/ep.eng.3.srt",
        ));
        report
            .outcomes
            .push(ExtractionOutcome::failed(4, "decoder produced an empty file"));

        let transcript = TranscriptReporter::new();
        transcript.file(&report);

        assert_eq!(
            transcript.lines(),
            vec![
                "[OK] /m/ep.mkv: stream 2 -> /m/ep.eng.srt",
                "[SKIP] /m/ep.mkv: stream 3: output already exists: /m/ep.eng.3.srt",
                "[FAIL] /m/ep.mkv: stream 4: decoder produced an empty file",
                "[OK] /m/ep.mkv: extracted 1 of 3 ASS/SSA subtitle stream(s)",
            ]
        );
    }

    #[test]
    fn no_subtitles_is_info() {
        let transcript = TranscriptReporter::new();
        transcript.file(&FileReport::new(PathBuf::from("a.mkv"), FileStatus::NoSubtitles));
        assert_eq!(transcript.lines(), vec!["[INFO] a.mkv: no subtitle streams found"]);
    }

    #[test]
    fn summary_hides_zero_extras() {
        let transcript = TranscriptReporter::new();
        transcript.summary(&BatchSummary {
            files_found: 3,
            files_validated: 2,
            files_with_subtitles: 1,
            subtitles_extracted: 1,
            files_failed_validation: 1,
            ..Default::default()
        });

        let text = transcript.text();
        assert!(text.contains("Containers found:"));
        assert!(text.contains("Containers failing validation:"));
        assert!(!text.contains("Streams failed"));
        assert!(text.ends_with('\n'));
    }
}
