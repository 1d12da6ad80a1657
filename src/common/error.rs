//! Error types for pinpool.

use thiserror::Error;

use super::{FileId, PageKey};

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
/// This is a common Rust pattern (see `std::io::Result`).
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors raised by the buffer manager and page stores.
///
/// Every error is local to the call that produced it: a failed pin, unpin
/// or free leaves the frame table exactly as it was.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from a disk-backed page store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The requested page does not exist in the page store
    /// (out of range, or never allocated).
    #[error("bad page id: {0}")]
    BadPageId(PageKey),

    /// No free frame and no evictable frame: every frame is pinned.
    ///
    /// This is an expected outcome under load, not a bug. The
    /// `checked_*` methods on the buffer manager report it as `Ok(None)`.
    #[error("buffer pool is full: all frames are pinned")]
    BufferPoolFull,

    /// Unpin on a page that is not resident or has a pin count of zero.
    #[error("{0} is not pinned")]
    PageNotPinned(PageKey),

    /// Free on a page that is still pinned by at least one caller.
    #[error("{0} is still pinned")]
    PagePinned(PageKey),

    /// Flush on a page that is not resident in the buffer pool.
    #[error("{0} is not resident in the buffer pool")]
    PageNotFound(PageKey),

    /// The file identifier is not known to the page store.
    #[error("bad file: {0}")]
    BadFile(FileId),

    /// No file with this name exists in the page store.
    #[error("unknown file: {0:?}")]
    UnknownFile(String),

    /// Page allocation was asked for an unusable number of pages.
    #[error("cannot allocate {0} pages")]
    InvalidPageCount(u32),

    /// The file cannot grow any further.
    #[error("{0} has no room for more pages")]
    FileFull(FileId),

    /// The replacement policy name does not match any known policy.
    #[error("unknown replacement policy: {0:?}")]
    UnknownPolicy(String),

    /// A page handle no longer resolves to a live, pinned frame.
    #[error("stale handle for {0}")]
    StaleHandle(PageKey),

    /// A whole-page buffer had the wrong length.
    #[error("page buffer must be {expected} bytes, got {actual}")]
    PageSizeMismatch { expected: usize, actual: usize },

    /// A partial write would run past the end of the page.
    #[error("write of {len} bytes at offset {offset} overflows the page")]
    PageOverflow { offset: usize, len: usize },
}

impl Error {
    /// Whether this error is the (expected) pool exhaustion condition.
    #[inline]
    pub fn is_pool_full(&self) -> bool {
        matches!(self, Error::BufferPoolFull)
    }
}
