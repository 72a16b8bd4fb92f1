//! BatchPlanner - splits a recipient count into worker partitions
//!
//! Partitions are contiguous, non-overlapping and cover `[0, total)` exactly.
//! The dispatcher writes outcomes without locking on the strength of this,
//! so any change here must keep partitions disjoint.

use std::num::NonZeroUsize;

use contracts::Partition;

use crate::error::DispatchError;

/// Stateless partition planner with a validated batch size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPlanner {
    max_batch_size: NonZeroUsize,
}

impl BatchPlanner {
    /// Create a planner
    ///
    /// # Errors
    /// `InvalidConfiguration` when `max_batch_size` is zero
    pub fn new(max_batch_size: usize) -> Result<Self, DispatchError> {
        let max_batch_size = NonZeroUsize::new(max_batch_size).ok_or_else(|| {
            DispatchError::invalid_configuration("max_batch_size must be > 0")
        })?;
        Ok(Self { max_batch_size })
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size.get()
    }

    /// `ceil(total / max_batch_size)`
    pub fn partition_count(&self, total: usize) -> usize {
        total.div_ceil(self.max_batch_size.get())
    }

    /// Partition `[0, total)` into batches of at most `max_batch_size`
    pub fn plan(&self, total: usize) -> Vec<Partition> {
        let size = self.max_batch_size.get();
        (0..self.partition_count(total))
            .map(|i| {
                let begin = i * size;
                Partition::new(begin, begin.saturating_add(size).min(total))
            })
            .collect()
    }
}

/// Plan partitions for `total` recipients
///
/// # Errors
/// `InvalidConfiguration` when `max_batch_size` is zero
pub fn plan(total: usize, max_batch_size: usize) -> Result<Vec<Partition>, DispatchError> {
    Ok(BatchPlanner::new(max_batch_size)?.plan(total))
}
