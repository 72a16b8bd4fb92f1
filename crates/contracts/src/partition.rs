//! Partition - one worker's slice of the recipient sequence

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Half-open index range `[begin, end)` over the recipient sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Partition {
    pub begin: usize,
    pub end: usize,
}

impl Partition {
    /// Create a partition, `begin <= end` is required
    pub fn new(begin: usize, end: usize) -> Self {
        debug_assert!(begin <= end, "partition begin {begin} > end {end}");
        Self { begin, end }
    }

    /// Number of recipients covered
    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// Indices in ascending order
    pub fn indices(&self) -> Range<usize> {
        self.begin..self.end
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.begin && index < self.end
    }
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.begin, self.end)
    }
}
