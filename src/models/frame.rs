use std::ops::Index;

use super::{TimeStep, Work};
use crate::utils::constants::EPSILON;

/// Remaining capacity of every frame of the major cycle during one assignment run.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameTable {
    remaining: Vec<Work>, // One entry per frame, starts at the frame size
}

impl Index<usize> for FrameTable {
    type Output = Work;

    fn index(&self, frame: usize) -> &Self::Output {
        &self.remaining[frame]
    }
}

impl FrameTable {
    /// Creates `frame_count` frames, all at full capacity.
    pub fn new(frame_count: usize, frame_size: TimeStep) -> Self {
        Self {
            remaining: vec![frame_size as Work; frame_count],
        }
    }

    pub fn frame_count(&self) -> usize {
        self.remaining.len()
    }

    pub fn remaining(&self, frame: usize) -> Work {
        self.remaining[frame]
    }

    /// Whether `amount` still fits into the frame.
    pub fn fits(&self, frame: usize, amount: Work) -> bool {
        self.remaining[frame] + EPSILON >= amount
    }

    /// Commits `amount` of execution time to the frame.
    ///
    /// # Returns
    /// * `bool` - `false` (and nothing committed) if the frame lacks the capacity.
    pub fn commit(&mut self, frame: usize, amount: Work) -> bool {
        if !self.fits(frame, amount) {
            return false;
        }
        self.remaining[frame] = (self.remaining[frame] - amount).max(0.0);
        true
    }

    /// Charges `amount` unconditionally, used for flow already known to fit.
    pub fn charge(&mut self, frame: usize, amount: Work) {
        self.remaining[frame] = (self.remaining[frame] - amount).max(0.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Work> {
        self.remaining.iter()
    }
}
