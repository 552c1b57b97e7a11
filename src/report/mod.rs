//! Run reporting: per-stage failure tally and terminal output.

use std::fmt::Display;

pub mod format;

pub use format::format_report;

/// Which stage dropped a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Read,
    Transform,
    Submit,
}

impl FailureStage {
    pub fn label(self) -> &'static str {
        match self {
            FailureStage::Read => "read",
            FailureStage::Transform => "transform",
            FailureStage::Submit => "submit",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordFailure {
    pub index: usize,
    pub stage: FailureStage,
    pub message: String,
}

/// Aggregate result of one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// Data rows seen in the input, including ones that failed validation.
    /// Blank rows are not counted, though they still take up a failure index.
    pub records_read: usize,
    pub warehouses: usize,
    pub transformed: usize,
    pub submitted: usize,
    pub failures: Vec<RecordFailure>,
}

impl BatchReport {
    pub fn record_failure(&mut self, index: usize, stage: FailureStage, error: impl Display) {
        self.failures.push(RecordFailure {
            index,
            stage,
            message: error.to_string(),
        });
    }

    pub fn failed_in(&self, stage: FailureStage) -> usize {
        self.failures.iter().filter(|f| f.stage == stage).count()
    }
}
