//! In-memory page store.

use std::collections::HashMap;

use tracing::debug;

use super::allocation::AllocationMap;
use super::page::Page;
use super::{checked_count, PageStore};
use crate::common::{Error, FileId, PageId, PageKey, Result};

struct MemoryFile {
    name: String,
    pages: Vec<Page>,
    allocation: AllocationMap,
}

impl MemoryFile {
    fn page_index(&self, file: FileId, page: PageId) -> Result<usize> {
        if page.is_valid() && self.allocation.is_allocated(page.index()) {
            Ok(page.index())
        } else {
            Err(Error::BadPageId(PageKey::new(file, page)))
        }
    }
}

/// A [`PageStore`] that keeps every file in memory.
///
/// Useful for tests and for workloads that only need the caching
/// behaviour. Contents are lost when the store is dropped.
///
/// # Example
/// ```
/// use pinpool::{MemoryPageStore, Page, PageStore};
///
/// let mut store = MemoryPageStore::new();
/// let file = store.create_file("t", 0).unwrap();
/// let first = store.allocate_pages(file, 4).unwrap();
///
/// let mut page = Page::new();
/// store.read_page(file, first, &mut page).unwrap();
/// assert!(page.is_zeroed());
/// ```
#[derive(Default)]
pub struct MemoryPageStore {
    /// Indexed by `FileId`; replaced files leave a `None` behind.
    files: Vec<Option<MemoryFile>>,
    names: HashMap<String, FileId>,
}

impl MemoryPageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of page slots `file` spans, allocated or not.
    pub fn page_count(&self, file: FileId) -> Result<u32> {
        Ok(self.file(file)?.allocation.len() as u32)
    }

    fn file(&self, file: FileId) -> Result<&MemoryFile> {
        self.files
            .get(file.index())
            .and_then(Option::as_ref)
            .ok_or(Error::BadFile(file))
    }

    fn file_mut(&mut self, file: FileId) -> Result<&mut MemoryFile> {
        self.files
            .get_mut(file.index())
            .and_then(Option::as_mut)
            .ok_or(Error::BadFile(file))
    }
}

impl PageStore for MemoryPageStore {
    fn create_file(&mut self, name: &str, initial_pages: u32) -> Result<FileId> {
        if let Some(old) = self.names.remove(name) {
            debug!("Replacing existing file {:?} ({})", name, old);
            self.files[old.index()] = None;
        }

        let id = FileId::new(self.files.len() as u32);
        let mut pages = Vec::new();
        pages.resize_with(initial_pages as usize, Page::new);

        self.files.push(Some(MemoryFile {
            name: name.to_owned(),
            pages,
            allocation: AllocationMap::full(initial_pages as usize),
        }));
        self.names.insert(name.to_owned(), id);

        debug!("Created file {:?} as {} with {} pages", name, id, initial_pages);
        Ok(id)
    }

    fn file_id(&self, name: &str) -> Result<FileId> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownFile(name.to_owned()))
    }

    fn allocate_pages(&mut self, file: FileId, count: u32) -> Result<PageId> {
        let f = self.file_mut(file)?;
        let count = checked_count(count, f.allocation.len(), file)?;

        let first = f.allocation.allocate(count);
        if f.pages.len() < f.allocation.len() {
            f.pages.resize_with(f.allocation.len(), Page::new);
        }
        for page in &mut f.pages[first..first + count] {
            page.reset();
        }

        debug!("Allocated {} pages at {} in {:?}", count, first, f.name);
        Ok(PageId::new(first as u32))
    }

    fn deallocate_page(&mut self, file: FileId, page: PageId) -> Result<()> {
        let f = self.file_mut(file)?;
        let index = f.page_index(file, page)?;
        f.allocation.deallocate(index);
        Ok(())
    }

    fn is_allocated(&self, file: FileId, page: PageId) -> Result<bool> {
        let f = self.file(file)?;
        Ok(page.is_valid() && f.allocation.is_allocated(page.index()))
    }

    fn read_page(&mut self, file: FileId, page: PageId, buf: &mut Page) -> Result<()> {
        let f = self.file(file)?;
        let index = f.page_index(file, page)?;
        buf.copy_from(&f.pages[index]);
        Ok(())
    }

    fn write_page(&mut self, file: FileId, page: PageId, buf: &Page) -> Result<()> {
        let f = self.file_mut(file)?;
        let index = f.page_index(file, page)?;
        f.pages[index].copy_from(buf);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_file_with_initial_pages() {
        let mut store = MemoryPageStore::new();
        let file = store.create_file("t", 3).unwrap();

        assert_eq!(store.page_count(file).unwrap(), 3);
        assert!(store.is_allocated(file, PageId::new(2)).unwrap());
        assert!(!store.is_allocated(file, PageId::new(3)).unwrap());
        assert_eq!(store.file_id("t").unwrap(), file);
    }

    #[test]
    fn test_recreate_file_replaces_it() {
        let mut store = MemoryPageStore::new();
        let old = store.create_file("t", 0).unwrap();
        store.allocate_pages(old, 5).unwrap();

        let new = store.create_file("t", 0).unwrap();
        assert_ne!(old, new);
        assert!(matches!(store.allocate_pages(old, 1), Err(Error::BadFile(_))));
        assert_eq!(store.allocate_pages(new, 1).unwrap(), PageId::new(0));
    }

    #[test]
    fn test_unknown_file_name() {
        let store = MemoryPageStore::new();
        assert!(matches!(store.file_id("nope"), Err(Error::UnknownFile(_))));
    }

    #[test]
    fn test_write_and_read_page() {
        let mut store = MemoryPageStore::new();
        let file = store.create_file("t", 0).unwrap();
        let pid = store.allocate_pages(file, 1).unwrap();

        let mut page = Page::new();
        page.write_at(0, b"stored").unwrap();
        store.write_page(file, pid, &page).unwrap();

        let mut read = Page::new();
        store.read_page(file, pid, &mut read).unwrap();
        assert_eq!(&read.as_slice()[..6], b"stored");
    }

    #[test]
    fn test_reallocated_page_is_zeroed() {
        let mut store = MemoryPageStore::new();
        let file = store.create_file("t", 0).unwrap();
        let pid = store.allocate_pages(file, 1).unwrap();

        let mut page = Page::new();
        page.as_mut_slice()[10] = 0xEE;
        store.write_page(file, pid, &page).unwrap();
        store.deallocate_page(file, pid).unwrap();

        assert_eq!(store.allocate_pages(file, 1).unwrap(), pid);
        let mut read = Page::new();
        store.read_page(file, pid, &mut read).unwrap();
        assert!(read.is_zeroed());
    }

    #[test]
    fn test_bad_page_ids() {
        let mut store = MemoryPageStore::new();
        let file = store.create_file("t", 0).unwrap();
        store.allocate_pages(file, 2).unwrap();

        let mut page = Page::new();
        assert!(matches!(
            store.read_page(file, PageId::new(999), &mut page),
            Err(Error::BadPageId(_))
        ));
        assert!(matches!(
            store.write_page(file, PageId::INVALID, &page),
            Err(Error::BadPageId(_))
        ));

        store.deallocate_page(file, PageId::new(1)).unwrap();
        assert!(matches!(
            store.deallocate_page(file, PageId::new(1)),
            Err(Error::BadPageId(_))
        ));
        assert!(matches!(
            store.read_page(file, PageId::new(1), &mut page),
            Err(Error::BadPageId(_))
        ));
    }

    #[test]
    fn test_allocate_zero_pages_fails() {
        let mut store = MemoryPageStore::new();
        let file = store.create_file("t", 0).unwrap();
        assert!(matches!(
            store.allocate_pages(file, 0),
            Err(Error::InvalidPageCount(0))
        ));
    }
}
