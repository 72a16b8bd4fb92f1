//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! Business crates depend on this crate only, reverse dependencies are prohibited.
//!
//! ## Dispatch Model
//! - Recipients are addressed by their position in the input sequence
//! - A `Partition` is a half-open index range handled by exactly one worker
//! - Every recipient ends with exactly one `Outcome` at its own index

mod blueprint;
mod error;
mod notifier;
mod outcome;
mod partition;
mod record;

pub use blueprint::*;
pub use error::*;
pub use notifier::{LocalNotifier, Notifier, NotifyError};
pub use outcome::*;
pub use partition::Partition;
pub use record::*;
