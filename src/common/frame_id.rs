//! Frame identifier type.

use std::fmt;

/// Index of a frame in the buffer pool.
///
/// Frames live in a fixed `Vec<Frame>`, so the id is a plain `usize` that
/// indexes it directly: `frames[frame_id.0]`. Ordering follows the index,
/// which is what replacement policies use for tie-breaking.
///
/// # Example
/// ```
/// use pinpool::FrameId;
///
/// let frame_id = FrameId::new(5);
/// assert_eq!(frame_id.index(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub usize);

impl FrameId {
    #[inline]
    pub fn new(id: usize) -> Self {
        FrameId(id)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({})", self.0)
    }
}
