//! Progress reporting collaborator.
//!
//! The pipeline only writes to a [`ProgressSink`]; it never reads lines back
//! and nothing a sink does can influence a decision.

use std::sync::{Mutex, PoisonError};

/// Severity of a progress line, mirroring the host's presentation styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Neutral status.
    Default,
    /// The item finished successfully.
    Success,
    /// The item (or the run) failed.
    Fail,
}

impl Severity {
    /// Returns the stable label for this severity.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Success => "success",
            Self::Fail => "fail",
        }
    }
}

/// One human-readable status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressLine {
    /// Zero-based index of the item the line belongs to; `None` for run-level lines.
    ///
    /// Lines sharing an index form one group: a later line replaces the
    /// earlier one in presenters that update in place.
    pub item: Option<usize>,
    /// The message text.
    pub text: String,
    /// Presentation severity.
    pub severity: Severity,
}

impl ProgressLine {
    /// Creates a run-level line.
    pub fn run(text: impl Into<String>, severity: Severity) -> Self {
        Self {
            item: None,
            text: text.into(),
            severity,
        }
    }

    /// Creates a line belonging to item `index`.
    pub fn item(index: usize, text: impl Into<String>, severity: Severity) -> Self {
        Self {
            item: Some(index),
            text: text.into(),
            severity,
        }
    }
}

/// Write-only sink for progress lines.
pub trait ProgressSink: Send + Sync {
    /// Appends a line.
    fn report(&self, line: ProgressLine);
}

/// Sink that keeps every line in memory, for hosts that render after the run.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    lines: Mutex<Vec<ProgressLine>>,
}

impl RecordingProgress {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all recorded lines.
    #[must_use]
    pub fn lines(&self) -> Vec<ProgressLine> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the distinct item indices that produced lines, in first-seen order.
    #[must_use]
    pub fn item_groups(&self) -> Vec<usize> {
        let mut groups: Vec<usize> = Vec::new();
        for index in self.lines().iter().filter_map(|line| line.item) {
            if !groups.contains(&index) {
                groups.push(index);
            }
        }
        groups
    }

    /// Returns the last line reported for item `index`.
    #[must_use]
    pub fn final_line(&self, index: usize) -> Option<ProgressLine> {
        self.lines()
            .into_iter()
            .rev()
            .find(|line| line.item == Some(index))
    }
}

impl ProgressSink for RecordingProgress {
    fn report(&self, line: ProgressLine) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line);
    }
}
