//! MRU (Most Recently Used) replacement policy.

use std::cmp::Reverse;

use super::{LogicalClock, ReplacementPolicy};
use crate::buffer::Frame;
use crate::common::FrameId;

/// Evicts the frame touched most recently.
///
/// Same touch rule as [`LruPolicy`](super::LruPolicy): load and every
/// unpin. Suits looping sequential scans larger than the pool, where the
/// page just released is the one needed furthest in the future.
#[derive(Debug, Default)]
pub struct MruPolicy {
    clock: LogicalClock,
}

impl MruPolicy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReplacementPolicy for MruPolicy {
    fn on_load(&mut self, frame: &mut Frame) {
        frame.set_meta(self.clock.tick());
    }

    fn on_pin(&mut self, _frame: &mut Frame) {}

    fn on_unpin(&mut self, frame: &mut Frame) {
        frame.set_meta(self.clock.tick());
    }

    fn select_victim(&mut self, frames: &mut [Frame]) -> Option<FrameId> {
        // Reverse(index) makes the lowest index win among equal stamps
        frames
            .iter()
            .enumerate()
            .filter(|(_, frame)| frame.is_evictable())
            .max_by_key(|&(index, frame)| (frame.meta(), Reverse(index)))
            .map(|(index, _)| FrameId::new(index))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::{loaded_frames, unpin};
    use super::*;

    #[test]
    fn test_mru_evicts_most_recently_unpinned() {
        let mut policy = MruPolicy::new();
        let mut frames = loaded_frames(3);
        for frame in &mut frames {
            policy.on_load(frame);
        }

        for i in [2, 0, 1] {
            unpin(&mut frames[i]);
            policy.on_unpin(&mut frames[i]);
        }

        assert_eq!(policy.select_victim(&mut frames), Some(FrameId::new(1)));
    }

    #[test]
    fn test_mru_load_counts_as_touch() {
        let mut policy = MruPolicy::new();
        let mut frames = loaded_frames(2);

        policy.on_load(&mut frames[0]);
        unpin(&mut frames[0]);
        policy.on_unpin(&mut frames[0]);

        // Frame 1 loaded after frame 0's unpin, then unpinned without
        // notifying the policy: its load stamp is still the newest
        policy.on_load(&mut frames[1]);
        unpin(&mut frames[1]);

        assert_eq!(policy.select_victim(&mut frames), Some(FrameId::new(1)));
    }

    #[test]
    fn test_mru_tie_breaks_on_lowest_index() {
        let mut policy = MruPolicy::new();
        let mut frames = loaded_frames(3);
        for frame in &mut frames {
            frame.set_meta(9);
            unpin(frame);
        }
        assert_eq!(policy.select_victim(&mut frames), Some(FrameId::new(0)));
    }
}
