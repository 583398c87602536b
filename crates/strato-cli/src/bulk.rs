//! Bulk delete aggregation.
//!
//! Deletes run one identifier at a time, in input order. Each outcome is
//! recorded and failures are logged as they happen; once every item has been
//! attempted the report collapses into a single result.

use tracing::error;

use crate::error::CliError;

/// Per-item outcomes of one bulk delete, in input order.
#[derive(Debug)]
pub struct BulkDeleteReport {
    resource: &'static str,
    outcomes: Vec<(String, Result<(), CliError>)>,
}

impl BulkDeleteReport {
    /// Start a report for the plural resource noun (`routers`, `rules`).
    #[must_use]
    pub const fn new(resource: &'static str) -> Self {
        Self {
            resource,
            outcomes: Vec::new(),
        }
    }

    /// Record the outcome for one identifier.
    pub fn record(&mut self, id: &str, result: Result<(), CliError>) {
        if let Err(err) = &result {
            error!(resource = self.resource, "Failed to delete '{id}': {err}");
        }
        self.outcomes.push((id.to_string(), result));
    }

    /// Number of items attempted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of items that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|(_, result)| result.is_err()).count()
    }

    /// Collapse into the command result.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::BulkDelete`] if any item failed.
    pub fn finish(self) -> Result<(), CliError> {
        match self.failed() {
            0 => Ok(()),
            failed => Err(CliError::BulkDelete {
                failed,
                total: self.total(),
                resource: self.resource,
            }),
        }
    }
}
