//! Random replacement policy.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::ReplacementPolicy;
use crate::buffer::Frame;
use crate::common::FrameId;

/// Evicts a uniformly chosen evictable frame.
///
/// The choice is among evictable frames only, never among all frames. The
/// generator is seeded at construction, so a given seed and event sequence
/// always produce the same victims.
pub struct RandomPolicy {
    rng: StdRng,
    /// Scratch list of candidates, reused between selections.
    candidates: Vec<FrameId>,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            candidates: Vec::new(),
        }
    }
}

impl ReplacementPolicy for RandomPolicy {
    fn on_load(&mut self, _frame: &mut Frame) {}

    fn on_pin(&mut self, _frame: &mut Frame) {}

    fn on_unpin(&mut self, _frame: &mut Frame) {}

    fn select_victim(&mut self, frames: &mut [Frame]) -> Option<FrameId> {
        self.candidates.clear();
        self.candidates.extend(
            frames
                .iter()
                .enumerate()
                .filter(|(_, frame)| frame.is_evictable())
                .map(|(index, _)| FrameId::new(index)),
        );

        if self.candidates.is_empty() {
            return None;
        }
        let pick = self.rng.gen_range(0..self.candidates.len());
        Some(self.candidates[pick])
    }
}

impl std::fmt::Debug for RandomPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomPolicy").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::{loaded_frames, unpin};
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_random_only_picks_evictable() {
        let mut policy = RandomPolicy::new(42);
        let mut frames = loaded_frames(8);
        unpin(&mut frames[3]);
        unpin(&mut frames[6]);

        let mut seen = HashSet::new();
        for _ in 0..200 {
            let victim = policy.select_victim(&mut frames).unwrap();
            assert!(victim == FrameId::new(3) || victim == FrameId::new(6));
            seen.insert(victim);
        }
        // Both candidates come up over 200 draws
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_random_is_deterministic_per_seed() {
        let mut frames = loaded_frames(16);
        for frame in &mut frames {
            unpin(frame);
        }

        let mut a = RandomPolicy::new(7);
        let mut b = RandomPolicy::new(7);
        for _ in 0..50 {
            assert_eq!(
                a.select_victim(&mut frames),
                b.select_victim(&mut frames)
            );
        }
    }

    #[test]
    fn test_random_none_when_all_pinned() {
        let mut policy = RandomPolicy::new(1);
        let mut frames = loaded_frames(3);
        assert_eq!(policy.select_victim(&mut frames), None);
    }
}
