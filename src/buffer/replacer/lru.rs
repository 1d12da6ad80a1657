//! LRU (Least Recently Used) replacement policy.

use super::{LogicalClock, ReplacementPolicy};
use crate::buffer::Frame;
use crate::common::FrameId;

/// Evicts the frame touched longest ago.
///
/// A frame is touched when its page is loaded and on every unpin (pins do
/// not count). Each touch stores a fresh logical timestamp in the frame's
/// metadata word. Ties go to the lowest frame index.
#[derive(Debug, Default)]
pub struct LruPolicy {
    clock: LogicalClock,
}

impl LruPolicy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReplacementPolicy for LruPolicy {
    fn on_load(&mut self, frame: &mut Frame) {
        frame.set_meta(self.clock.tick());
    }

    fn on_pin(&mut self, _frame: &mut Frame) {}

    fn on_unpin(&mut self, frame: &mut Frame) {
        frame.set_meta(self.clock.tick());
    }

    fn select_victim(&mut self, frames: &mut [Frame]) -> Option<FrameId> {
        // min_by_key keeps the first of equal minima, i.e. the lowest index
        frames
            .iter()
            .enumerate()
            .filter(|(_, frame)| frame.is_evictable())
            .min_by_key(|(_, frame)| frame.meta())
            .map(|(index, _)| FrameId::new(index))
    }
}
