//! Page - the fundamental 4KB unit of storage.
//!
//! A [`Page`] is a raw 4KB byte array that serves as the unit of I/O
//! between a page store and memory. Pages are held in
//! [`Frame`](crate::Frame)s within the buffer pool.

use crate::common::config::PAGE_SIZE;
use crate::common::{Error, Result};

/// A page of data (4KB, 4KB-aligned).
///
/// # Memory Layout
/// - Size: 4096 bytes (4KB)
/// - Alignment: 4096 bytes (for efficient Direct I/O with O_DIRECT)
///
/// The length never changes: whole-buffer replacement through
/// [`Page::set_contents`] rejects any slice that is not exactly
/// [`PAGE_SIZE`] bytes rather than silently padding or truncating.
///
/// # Clone Implementation
/// `Page` does NOT implement `Clone` in production code (copying 4KB should
/// be explicit). A `#[cfg(test)]` Clone is provided for tests.
///
/// # Example
/// ```
/// use pinpool::Page;
///
/// let mut page = Page::new();
/// page.write_at(0, b"hello").unwrap();
/// assert_eq!(&page.as_slice()[..5], b"hello");
/// ```
#[repr(align(4096))]
pub struct Page {
    data: [u8; PAGE_SIZE],
}

impl Page {
    /// Create a new zeroed page.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: [0u8; PAGE_SIZE],
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Replace the whole page.
    ///
    /// # Errors
    /// `Error::PageSizeMismatch` unless `contents.len() == PAGE_SIZE`.
    pub fn set_contents(&mut self, contents: &[u8]) -> Result<()> {
        if contents.len() != PAGE_SIZE {
            return Err(Error::PageSizeMismatch {
                expected: PAGE_SIZE,
                actual: contents.len(),
            });
        }
        self.data.copy_from_slice(contents);
        Ok(())
    }

    /// Copy `bytes` into the page starting at `offset`.
    ///
    /// # Errors
    /// `Error::PageOverflow` if the write would run past the end of the page.
    pub fn write_at(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        let end = offset
            .checked_add(bytes.len())
            .filter(|&end| end <= PAGE_SIZE)
            .ok_or(Error::PageOverflow {
                offset,
                len: bytes.len(),
            })?;
        self.data[offset..end].copy_from_slice(bytes);
        Ok(())
    }

    /// Copy another page's bytes into this one.
    #[inline]
    pub fn copy_from(&mut self, other: &Page) {
        self.data.copy_from_slice(&other.data);
    }

    /// Zero out the entire page.
    pub fn reset(&mut self) {
        self.data.fill(0);
    }

    /// Whether every byte is zero.
    pub fn is_zeroed(&self) -> bool {
        self.data.iter().all(|&b| b == 0)
    }

    #[inline]
    pub const fn size() -> usize {
        PAGE_SIZE
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let used = self.data.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        f.debug_struct("Page").field("used_bytes", &used).finish()
    }
}

// Clone only available in tests - forces explicit copying in production
#[cfg(test)]
impl Clone for Page {
    fn clone(&self) -> Self {
        let mut new_page = Page::new();
        new_page.copy_from(self);
        new_page
    }
}
