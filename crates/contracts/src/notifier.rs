//! Notifier trait - capability consumed by the Dispatcher
//!
//! Delivers one notification to one recipient. Transport, addressing and
//! templating are the implementation's business.

use thiserror::Error;

use crate::FailureReason;

/// Failure a notifier reports for a single recipient
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotifyError {
    /// Delivery attempted and failed
    #[error("transport error: {message}")]
    Transport { message: String },

    /// Recipient cannot be delivered to at all
    #[error("recipient rejected: {message}")]
    Rejected { message: String },
}

impl NotifyError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

impl From<NotifyError> for FailureReason {
    fn from(err: NotifyError) -> Self {
        match err {
            NotifyError::Transport { message } => FailureReason::Transport(message),
            NotifyError::Rejected { message } => FailureReason::Rejected(message),
        }
    }
}

/// Notification capability
///
/// Implementations must be shareable across workers; one instance serves
/// every partition of a dispatch.
#[trait_variant::make(Notifier: Send)]
pub trait LocalNotifier<R> {
    /// Notifier name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Deliver one notification
    ///
    /// # Errors
    /// Returns the reported failure for this recipient only
    async fn send_one(&self, recipient: &R) -> Result<(), NotifyError>;
}
