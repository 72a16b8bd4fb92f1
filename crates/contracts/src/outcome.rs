//! Outcome - per-recipient dispatch result

use serde::{Deserialize, Serialize};

/// Why a notification did not go out
///
/// Free-form detail is kept, the variant gives callers a stable category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    /// Transport reported an error for this recipient
    Transport(String),
    /// Recipient could not be addressed
    Rejected(String),
    /// Worker exited abnormally before reaching this recipient
    WorkerAborted(String),
    /// Dispatch was cancelled before this recipient was handled
    Cancelled,
}

impl FailureReason {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "transport: {msg}"),
            Self::Rejected(msg) => write!(f, "rejected: {msg}"),
            Self::WorkerAborted(msg) => write!(f, "worker aborted: {msg}"),
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Result for one recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Sent,
    Failed { reason: FailureReason },
}

impl Outcome {
    pub fn failed(reason: FailureReason) -> Self {
        Self::Failed { reason }
    }

    pub fn cancelled() -> Self {
        Self::failed(FailureReason::Cancelled)
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent)
    }

    pub fn is_failed(&self) -> bool {
        !self.is_sent()
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Failed { reason } if reason.is_cancelled())
    }

    /// Failure reason, if any
    pub fn reason(&self) -> Option<&FailureReason> {
        match self {
            Self::Sent => None,
            Self::Failed { reason } => Some(reason),
        }
    }
}

/// Aggregate counts for one dispatch call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchSummary {
    /// Recipients in the call
    pub total: usize,
    pub sent: usize,
    /// Failed for any reason other than cancellation
    pub failed: usize,
    pub cancelled: usize,
    /// Workers spawned (one per partition)
    pub workers: usize,
}

impl DispatchSummary {
    /// Count outcomes of a finished dispatch
    pub fn from_outcomes(outcomes: &[Outcome], workers: usize) -> Self {
        let mut summary = Self {
            total: outcomes.len(),
            workers,
            ..Self::default()
        };
        for outcome in outcomes {
            match outcome {
                Outcome::Sent => summary.sent += 1,
                o if o.is_cancelled() => summary.cancelled += 1,
                _ => summary.failed += 1,
            }
        }
        summary
    }

    pub fn all_sent(&self) -> bool {
        self.sent == self.total
    }
}
