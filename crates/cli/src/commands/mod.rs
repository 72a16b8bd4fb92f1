//! Command implementations.

mod announce;
mod plan;
mod validate;

pub use announce::run_announce;
pub use plan::run_plan;
pub use validate::run_validate;
