//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Roster file not found
    #[error("Roster file not found: {path}")]
    RosterNotFound { path: String },

    /// Some notifications did not go out
    #[error("{failed} of {total} notifications failed ({cancelled} cancelled)")]
    PartialDelivery {
        total: usize,
        failed: usize,
        cancelled: usize,
    },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn roster_not_found(path: impl Into<String>) -> Self {
        Self::RosterNotFound { path: path.into() }
    }

    pub fn partial_delivery(summary: &contracts::DispatchSummary) -> Self {
        Self::PartialDelivery {
            total: summary.total,
            failed: summary.failed + summary.cancelled,
            cancelled: summary.cancelled,
        }
    }
}
