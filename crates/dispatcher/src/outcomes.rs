//! OutcomeSequence - pre-sized, write-once result slots

use contracts::{FailureReason, Outcome};

use crate::error::DispatchError;

/// One slot per recipient, each written exactly once
///
/// Sized before any worker starts. Only the dispatcher task writes here,
/// workers hand their outcomes over the report channel.
#[derive(Debug)]
pub struct OutcomeSequence {
    slots: Vec<Option<Outcome>>,
    written: usize,
}

impl OutcomeSequence {
    /// Allocate `len` empty slots
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![None; len],
            written: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots written so far
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn is_complete(&self) -> bool {
        self.written == self.slots.len()
    }

    /// Write the outcome for `index`
    ///
    /// # Errors
    /// - `SlotOutOfRange` for an index past the end
    /// - `SlotConflict` if the slot already holds an outcome
    pub fn write(&mut self, index: usize, outcome: Outcome) -> Result<(), DispatchError> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(DispatchError::SlotOutOfRange { index, len })?;

        if slot.is_some() {
            return Err(DispatchError::SlotConflict { index });
        }
        *slot = Some(outcome);
        self.written += 1;
        Ok(())
    }

    /// Fill every unwritten slot with `reason`, returns how many were filled
    pub fn fill_unwritten(&mut self, reason: &FailureReason) -> usize {
        let mut filled = 0;
        for slot in self.slots.iter_mut().filter(|s| s.is_none()) {
            *slot = Some(Outcome::failed(reason.clone()));
            filled += 1;
        }
        self.written += filled;
        filled
    }

    /// Finish the sequence in input order
    ///
    /// # Errors
    /// `UnwrittenSlot` for the first slot still empty
    pub fn into_outcomes(self) -> Result<Vec<Outcome>, DispatchError> {
        self.slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| slot.ok_or(DispatchError::UnwrittenSlot { index }))
            .collect()
    }
}
