//! Page handles returned by pin operations.

use std::fmt;

use crate::common::{FileId, FrameId, PageId, PageKey};

/// A reference to a pinned page.
///
/// A handle is a plain `Copy` value: the page's identity, the frame it was
/// loaded into, and that frame's generation at pin time. It owns nothing
/// and does not unpin on drop; the caller pairs every pin with an
/// [`unpin_page`](crate::BufferManager::unpin_page).
///
/// Contents are reached through
/// [`with_page`](crate::BufferManager::with_page) and
/// [`with_page_mut`](crate::BufferManager::with_page_mut), which fail with
/// [`Error::StaleHandle`](crate::Error::StaleHandle) once the frame has been
/// reused for another page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageHandle {
    key: PageKey,
    frame_id: FrameId,
    generation: u64,
}

impl PageHandle {
    pub(crate) fn new(key: PageKey, frame_id: FrameId, generation: u64) -> Self {
        Self {
            key,
            frame_id,
            generation,
        }
    }

    #[inline]
    pub fn key(&self) -> PageKey {
        self.key
    }

    #[inline]
    pub fn file(&self) -> FileId {
        self.key.file
    }

    #[inline]
    pub fn page_id(&self) -> PageId {
        self.key.page
    }

    /// The frame the page was resident in when this handle was issued.
    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    #[inline]
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}

impl fmt::Display for PageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.key, self.frame_id)
    }
}
