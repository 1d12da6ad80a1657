//! Frame - a slot in the buffer pool.
//!
//! A [`Frame`] holds a [`Page`] plus metadata needed for buffer management:
//! - Which page is loaded (if any)
//! - Pin count for reference counting
//! - Dirty flag for write-back tracking
//! - Generation counter for detecting stale handles
//! - One word of metadata owned by the replacement policy

use crate::common::PageKey;
use crate::storage::page::Page;

/// A frame in the buffer pool.
///
/// Frames are the "slots" in the buffer pool. Each frame can hold one page.
/// The pool allocates all of its frames at startup and never resizes.
///
/// # Thread Safety
/// Frames carry no locks of their own. The buffer manager keeps the whole
/// frame table behind a single mutex, so every field is plain data.
pub struct Frame {
    page: Page,

    /// Which page is currently loaded, or None if the frame is free.
    key: Option<PageKey>,

    pin_count: u32,

    is_dirty: bool,

    /// Bumped whenever `key` changes.
    generation: u64,

    /// Policy-private word (timestamp, reference bit, ...). The frame never
    /// interprets it.
    meta: u64,
}

impl Frame {
    /// Create a new free frame.
    pub fn new() -> Self {
        Self {
            page: Page::new(),
            key: None,
            pin_count: 0,
            is_dirty: false,
            generation: 0,
            meta: 0,
        }
    }

    // ========================================================================
    // Page access
    // ========================================================================

    #[inline]
    pub fn page(&self) -> &Page {
        &self.page
    }

    #[inline]
    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    // ========================================================================
    // Identity
    // ========================================================================

    /// The resident page, or None if the frame is free.
    #[inline]
    pub fn key(&self) -> Option<PageKey> {
        self.key
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Make `key` resident: pinned once, clean, new generation.
    ///
    /// The caller fills the page bytes.
    pub(crate) fn occupy(&mut self, key: PageKey) {
        self.key = Some(key);
        self.pin_count = 1;
        self.is_dirty = false;
        self.generation += 1;
    }

    /// Return the frame to the free state. Page bytes are left as they are;
    /// the next occupant overwrites them.
    pub(crate) fn vacate(&mut self) {
        self.key = None;
        self.pin_count = 0;
        self.is_dirty = false;
        self.generation += 1;
        self.meta = 0;
    }

    // ========================================================================
    // Pin count
    // ========================================================================

    /// Increment the pin count. Returns the new pin count.
    #[inline]
    pub(crate) fn pin(&mut self) -> u32 {
        self.pin_count += 1;
        self.pin_count
    }

    /// Decrement the pin count. Returns the new pin count, or None if the
    /// frame was not pinned (the count is left at zero).
    #[inline]
    pub(crate) fn unpin(&mut self) -> Option<u32> {
        self.pin_count = self.pin_count.checked_sub(1)?;
        Some(self.pin_count)
    }

    #[inline]
    pub fn pin_count(&self) -> u32 {
        self.pin_count
    }

    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.pin_count > 0
    }

    // ========================================================================
    // Dirty flag
    // ========================================================================

    #[inline]
    pub(crate) fn mark_dirty(&mut self) {
        self.is_dirty = true;
    }

    #[inline]
    pub(crate) fn clear_dirty(&mut self) {
        self.is_dirty = false;
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    // ========================================================================
    // Policy metadata
    // ========================================================================

    #[inline]
    pub fn meta(&self) -> u64 {
        self.meta
    }

    #[inline]
    pub fn set_meta(&mut self, meta: u64) {
        self.meta = meta;
    }

    // ========================================================================
    // Frame state queries
    // ========================================================================

    /// Check if the frame is free (no page loaded).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.key.is_none()
    }

    /// Occupied and unpinned.
    #[inline]
    pub fn is_evictable(&self) -> bool {
        self.key.is_some() && !self.is_pinned()
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("key", &self.key)
            .field("pin_count", &self.pin_count)
            .field("is_dirty", &self.is_dirty)
            .field("generation", &self.generation)
            .field("meta", &self.meta)
            .finish()
    }
}
