//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
///
/// Per-recipient failures never show up here, they live in the outcome slots.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Batch size or worker limit that cannot be planned
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// Two outcomes arrived for the same recipient index
    #[error("outcome slot {index} written twice")]
    SlotConflict { index: usize },

    /// Outcome arrived for an index outside the recipient sequence
    #[error("outcome index {index} out of range for {len} recipients")]
    SlotOutOfRange { index: usize, len: usize },

    /// A slot was never written before the sequence was finished
    #[error("outcome slot {index} left unwritten")]
    UnwrittenSlot { index: usize },

    /// Error from a shared contract
    #[error("contract error: {0}")]
    Contract(#[from] contracts::ContractError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DispatchError {
    /// Create an invalid configuration error
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }
}
