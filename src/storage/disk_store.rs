//! Disk-backed page store - one OS file per logical file.
//!
//! The [`DiskPageStore`] handles all direct file operations:
//! - Creating and re-opening files inside a directory
//! - Reading and writing pages
//! - Allocating and deallocating pages

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::allocation::AllocationMap;
use super::page::Page;
use super::{checked_count, PageStore};
use crate::common::config::PAGE_SIZE;
use crate::common::{Error, FileId, PageId, PageKey, Result};

struct DiskFile {
    name: String,
    file: File,
    allocation: AllocationMap,
}

impl DiskFile {
    fn checked_offset(&self, file: FileId, page: PageId) -> Result<u64> {
        if page.is_valid() && self.allocation.is_allocated(page.index()) {
            Ok(page_offset(page.index()))
        } else {
            Err(Error::BadPageId(PageKey::new(file, page)))
        }
    }
}

#[inline]
fn page_offset(page: usize) -> u64 {
    (page as u64) * (PAGE_SIZE as u64)
}

/// A [`PageStore`] that keeps each logical file in `<dir>/<name>.db`.
///
/// # File Layout
/// Pages are laid out sequentially:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │ Page 2  │  ...    │ Page N  │
/// │ (4KB)   │ (4KB)   │ (4KB)   │         │ (4KB)   │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      4096     8192    ...    N×4096
/// ```
///
/// The allocation bitmap lives in memory. A file re-attached with
/// [`DiskPageStore::open_file`] treats every page it spans as allocated.
///
/// # Durability
/// Page writes and allocations are followed by `fsync()`.
pub struct DiskPageStore {
    dir: PathBuf,
    files: Vec<Option<DiskFile>>,
    names: HashMap<String, FileId>,
}

impl DiskPageStore {
    /// Use `dir` for data files, creating it if needed.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        Ok(Self {
            dir,
            files: Vec::new(),
            names: HashMap::new(),
        })
    }

    /// Attach to a file created earlier (possibly by another store).
    ///
    /// # Errors
    /// Returns an I/O error if `<dir>/<name>.db` cannot be opened.
    pub fn open_file(&mut self, name: &str) -> Result<FileId> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(self.path_for(name))?;

        // Calculate page count from file size
        let page_count = (file.metadata()?.len() / PAGE_SIZE as u64) as usize;
        debug!("Opened file {:?} with {} pages", name, page_count);

        Ok(self.register(name, file, AllocationMap::full(page_count)))
    }

    /// Total size in bytes of the OS file backing `file`.
    pub fn file_size(&self, file: FileId) -> Result<u64> {
        Ok(self.file(file)?.file.metadata()?.len())
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.db", name))
    }

    fn register(&mut self, name: &str, file: File, allocation: AllocationMap) -> FileId {
        if let Some(old) = self.names.remove(name) {
            self.files[old.index()] = None;
        }

        let id = FileId::new(self.files.len() as u32);
        self.files.push(Some(DiskFile {
            name: name.to_owned(),
            file,
            allocation,
        }));
        self.names.insert(name.to_owned(), id);
        id
    }

    fn file(&self, file: FileId) -> Result<&DiskFile> {
        self.files
            .get(file.index())
            .and_then(Option::as_ref)
            .ok_or(Error::BadFile(file))
    }

    fn file_mut(&mut self, file: FileId) -> Result<&mut DiskFile> {
        self.files
            .get_mut(file.index())
            .and_then(Option::as_mut)
            .ok_or(Error::BadFile(file))
    }
}

impl PageStore for DiskPageStore {
    fn create_file(&mut self, name: &str, initial_pages: u32) -> Result<FileId> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.path_for(name))?;

        // set_len zero-fills the new extent
        file.set_len(page_offset(initial_pages as usize))?;
        file.sync_all()?;

        let id = self.register(name, file, AllocationMap::full(initial_pages as usize));
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

        // Reserve in a copy so a failed write leaves the bitmap unchanged.
        let mut allocation = f.allocation.clone();
        let first = allocation.allocate(count);

        // Zero the run, covering both reused holes and file growth
        let zeros = [0u8; PAGE_SIZE];
        f.file.seek(SeekFrom::Start(page_offset(first)))?;
        for _ in 0..count {
            f.file.write_all(&zeros)?;
        }
        f.file.sync_all()?;

        f.allocation = allocation;
        debug!("Allocated {} pages at {} in {:?}", count, first, f.name);
        Ok(PageId::new(first as u32))
    }

    fn deallocate_page(&mut self, file: FileId, page: PageId) -> Result<()> {
        let f = self.file_mut(file)?;
        f.checked_offset(file, page)?;
        f.allocation.deallocate(page.index());
        Ok(())
    }

    fn is_allocated(&self, file: FileId, page: PageId) -> Result<bool> {
        let f = self.file(file)?;
        Ok(page.is_valid() && f.allocation.is_allocated(page.index()))
    }

    fn read_page(&mut self, file: FileId, page: PageId, buf: &mut Page) -> Result<()> {
        let f = self.file_mut(file)?;
        let offset = f.checked_offset(file, page)?;

        f.file.seek(SeekFrom::Start(offset))?;
        f.file.read_exact(buf.as_mut_slice())?;
        Ok(())
    }

    fn write_page(&mut self, file: FileId, page: PageId, buf: &Page) -> Result<()> {
        let f = self.file_mut(file)?;
        let offset = f.checked_offset(file, page)?;

        f.file.seek(SeekFrom::Start(offset))?;
        f.file.write_all(buf.as_slice())?;
        f.file.sync_all()?; // fsync for durability
        Ok(())
    }
}
