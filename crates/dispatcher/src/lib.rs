//! # Dispatcher
//!
//! Batch notification dispatch.
//!
//! Responsibilities:
//! - Partition recipients into bounded batches (`BatchPlanner`)
//! - Fan out one worker per batch, optionally throttled
//! - Fan in per-recipient outcomes in input order, isolating failures

pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod notifiers;
pub mod outcomes;
pub mod planner;
mod worker;

pub use contracts::{FailureReason, Notifier, NotifyError, Outcome, Partition};
pub use dispatcher::{dispatch, DispatchConfig, DispatchReport, Dispatcher, DispatcherBuilder};
pub use error::DispatchError;
pub use metrics::{DispatchMetrics, MetricsSnapshot};
pub use notifiers::{
    create_mail_notifier, ConfiguredTransport, LogTransport, MailMessage, MailNotifier,
    MailTransport, SpoolTransport,
};
pub use outcomes::OutcomeSequence;
pub use planner::{plan, BatchPlanner};
pub use tokio_util::sync::CancellationToken;
