use serde::Serialize;
use std::fmt::Display;

/// Counters accumulated over one job run, returned to the caller and logged
/// at the end of the run. Every job uses the subset of counters that applies
/// to it and leaves the rest at zero.
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    pub scraped: usize,
    pub matched: usize,
    pub updated: usize,
    pub skipped: usize,
    pub removed: usize,
    pub refreshed: usize,
    pub unchanged: usize,
    pub no_match: usize,
    /// Set when the catalog sync held back its removal pass, with the why.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removal_skipped_reason: Option<String>,
    pub errors: Vec<RunError>,
}

/// A per-record failure that did not abort the run.
#[derive(Debug, Serialize)]
pub struct RunError {
    pub record: String,
    pub error: String,
}

impl RunReport {
    pub fn record_error(&mut self, record: &str, error: impl Display) {
        self.errors.push(RunError {
            record: record.to_string(),
            error: error.to_string(),
        });
    }
}
