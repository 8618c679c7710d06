//! Report store - ordered in-memory history of experiment reports.

use crate::error::{Error, Result};
use crate::report::Report;

/// Newest-first list of reports.
///
/// Reports are never removed. A report enters as `In Progress` through
/// [`ReportStore::append_pending`] and is replaced exactly once by its
/// terminal version through [`ReportStore::finalize`].
#[derive(Debug, Default, Clone)]
pub struct ReportStore {
    reports: Vec<Report>,
}

impl ReportStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from reports already ordered newest first.
    #[must_use]
    pub fn with_reports(reports: Vec<Report>) -> Self {
        Self { reports }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Snapshot of every report, newest first.
    #[must_use]
    pub fn list_reports(&self) -> Vec<Report> {
        self.reports.clone()
    }

    #[must_use]
    pub fn newest(&self) -> Option<&Report> {
        self.reports.first()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Report> {
        self.reports.iter().find(|r| r.id == id)
    }

    pub fn append_pending(&mut self, report: Report) {
        self.reports.insert(0, report);
    }

    /// Replace the report with `id` by its terminal version, keeping its
    /// position. Unknown ids, reports that are already terminal and
    /// replacements that are still `In Progress` are reported as errors.
    pub fn finalize(&mut self, id: &str, report: Report) -> Result<Report> {
        if !report.is_terminal() {
            return Err(Error::InvalidInput(format!(
                "report {id} can only be finalized with a terminal status"
            )));
        }
        let slot = self
            .reports
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::ReportNotFound(id.to_string()))?;
        if slot.is_terminal() {
            return Err(Error::AlreadyFinalized(id.to_string()));
        }
        *slot = Report {
            id: id.to_string(),
            ..report
        };
        Ok(slot.clone())
    }
}
