//! Storage layer - the page store collaborator and page format.
//!
//! The buffer manager does not know where pages live. It talks to a
//! [`PageStore`], which hands out file handles, allocates and deallocates
//! pages, and copies whole pages in and out of frames.
//!
//! - [`PageStore`] - The trait the buffer manager consumes
//! - [`MemoryPageStore`] - Files held entirely in memory
//! - [`DiskPageStore`] - One OS file per logical file, in a directory
//! - [`page`] - The [`Page`](page::Page) buffer type

mod allocation;
mod disk_store;
mod memory_store;
pub mod page;

pub use disk_store::DiskPageStore;
pub use memory_store::MemoryPageStore;

use std::sync::Arc;

use parking_lot::Mutex;

use crate::common::{FileId, PageId, Result};
use page::Page;

/// A page store shared between the buffer manager and its owner.
///
/// The caller creates the store, keeps a clone of the `Arc` to create files,
/// and passes another clone to each buffer manager.
pub type SharedStore<S> = Arc<Mutex<S>>;

/// Wrap a page store for sharing with one or more buffer managers.
pub fn shared<S: PageStore>(store: S) -> SharedStore<S> {
    Arc::new(Mutex::new(store))
}

/// Fixed-size page storage keyed by (file, page number).
///
/// # Contract
/// - Pages are exactly [`PAGE_SIZE`](crate::PAGE_SIZE) bytes.
/// - Freshly allocated pages read back as all zeroes.
/// - Reading, writing or deallocating a page that is out of range or not
///   allocated fails with `Error::BadPageId`.
/// - Operations on an unknown file fail with `Error::BadFile`.
pub trait PageStore: Send {
    /// Create a file with `initial_pages` allocated, zeroed pages.
    ///
    /// Creating a name that already exists replaces that file; its old
    /// [`FileId`] stops resolving.
    fn create_file(&mut self, name: &str, initial_pages: u32) -> Result<FileId>;

    /// Look up a file by name.
    fn file_id(&self, name: &str) -> Result<FileId>;

    /// Allocate `count` contiguous pages and return the first page number.
    fn allocate_pages(&mut self, file: FileId, count: u32) -> Result<PageId>;

    /// Return one page to the file's free space.
    fn deallocate_page(&mut self, file: FileId, page: PageId) -> Result<()>;

    /// Whether `page` is currently allocated in `file`.
    fn is_allocated(&self, file: FileId, page: PageId) -> Result<bool>;

    /// Copy the stored page into `buf`.
    fn read_page(&mut self, file: FileId, page: PageId, buf: &mut Page) -> Result<()>;

    /// Persist `buf` as the contents of the page.
    fn write_page(&mut self, file: FileId, page: PageId, buf: &Page) -> Result<()>;
}

/// Validate an allocation request and convert it to a slot count.
fn checked_count(count: u32, used: usize, file: FileId) -> Result<usize> {
    use crate::common::Error;

    if count == 0 {
        return Err(Error::InvalidPageCount(count));
    }
    // The last page number must stay below the INVALID sentinel.
    if used as u64 + count as u64 > PageId::INVALID.0 as u64 {
        return Err(Error::FileFull(file));
    }
    Ok(count as usize)
}
