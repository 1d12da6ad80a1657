//! CLOCK (second chance) replacement policy.

use super::ReplacementPolicy;
use crate::buffer::Frame;
use crate::common::FrameId;

const REFERENCED: u64 = 1;

/// Second-chance replacement with one circular hand.
///
/// Each frame's metadata word is a reference bit, set on load and on every
/// pin (unpins leave it alone). The sweep:
/// - pinned (or free) frame: advance
/// - evictable, bit set: clear the bit, advance
/// - evictable, bit clear: that is the victim; the hand moves past it
///
/// The sweep gives up after two full turns, which leaves the hand where it
/// started.
#[derive(Debug, Default)]
pub struct ClockPolicy {
    hand: usize,
}

impl ClockPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current hand position.
    pub fn hand(&self) -> usize {
        self.hand
    }
}

impl ReplacementPolicy for ClockPolicy {
    fn on_load(&mut self, frame: &mut Frame) {
        frame.set_meta(REFERENCED);
    }

    fn on_pin(&mut self, frame: &mut Frame) {
        frame.set_meta(REFERENCED);
    }

    fn on_unpin(&mut self, _frame: &mut Frame) {}

    fn select_victim(&mut self, frames: &mut [Frame]) -> Option<FrameId> {
        let n = frames.len();
        if n == 0 {
            return None;
        }

        for _ in 0..2 * n {
            let index = self.hand;
            self.hand = (self.hand + 1) % n;

            let frame = &mut frames[index];
            if !frame.is_evictable() {
                continue;
            }
            if frame.meta() == REFERENCED {
                frame.set_meta(0);
                continue;
            }
            return Some(FrameId::new(index));
        }
        None
    }
}
