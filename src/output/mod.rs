//! Output module for batch results
//!
//! This module handles:
//! - Collecting a result-or-error per archived entry (`BatchReport`)
//! - Printing the batch summary to stdout
//! - Rendering the summary as markdown

mod markdown;
mod stats;

pub use markdown::{format_markdown_report, write_markdown_report};
pub use stats::print_report;

use crate::archive::ArchivedEntry;
use crate::entry::EntryRef;
use crate::ArchiveError;
use chrono::{DateTime, Utc};

/// Result of archiving one entry
#[derive(Debug)]
pub struct EntryOutcome {
    pub entry: EntryRef,
    pub result: Result<ArchivedEntry, ArchiveError>,
}

/// Per-entry results of a batch run
#[derive(Debug)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub outcomes: Vec<EntryOutcome>,
}

impl BatchReport {
    /// Starts an empty report stamped with the current time
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            outcomes: Vec::new(),
        }
    }

    pub fn record(&mut self, entry: EntryRef, result: Result<ArchivedEntry, ArchiveError>) {
        self.outcomes.push(EntryOutcome { entry, result });
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn archived_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.total() - self.archived_count()
    }

    /// Description images left remote across all archived entries
    pub fn description_failure_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .map(|a| a.description_failures.len())
            .sum()
    }

    /// Entries that failed, with their error
    pub fn failures(&self) -> impl Iterator<Item = (&EntryRef, &ArchiveError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (&o.entry, e)))
    }

    pub fn outcome_for(&self, id: &str) -> Option<&EntryOutcome> {
        self.outcomes.iter().find(|o| o.entry.id == id)
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }
}
