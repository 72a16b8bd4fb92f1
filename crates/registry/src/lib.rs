//! # Registry
//!
//! Course and student records plus the result announcement that drives
//! the dispatcher.

pub mod announce;
pub mod error;
pub mod store;

pub use announce::{announce_course_results, Announcement, AnnouncementEntry};
pub use error::{RegistryError, Result};
pub use store::RecordStore;
