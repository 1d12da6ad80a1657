//! Buffer Manager - the core page caching layer.
//!
//! The [`BufferManager`] provides:
//! - Page caching between a [`PageStore`] and memory
//! - Pin-based reference counting
//! - Write-back of dirty pages on eviction and flush
//! - A replacement policy chosen at construction

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::buffer::replacer::{PolicyKind, ReplacementPolicy, Replacer};
use crate::buffer::{BufferPoolStats, Frame, PageHandle};
use crate::common::{BufferPoolConfig, Error, FileId, FrameId, PageKey, Result};
use crate::storage::page::Page;
use crate::storage::{PageStore, SharedStore};

/// Everything guarded by the pool lock.
struct PoolState {
    /// Fixed pool of frames allocated at startup.
    frames: Vec<Frame>,

    /// Resident pages.
    page_table: HashMap<PageKey, FrameId>,

    /// Free frames, handed out lowest index first.
    free_list: BTreeSet<FrameId>,

    replacer: Replacer,
}

impl PoolState {
    /// Resolve a handle to its frame if the frame still holds the same
    /// occupancy it had when the handle was issued.
    fn resolve(&mut self, handle: &PageHandle) -> Result<&mut Frame> {
        match self.frames.get_mut(handle.frame_id().index()) {
            Some(frame)
                if frame.key() == Some(handle.key())
                    && frame.generation() == handle.generation() =>
            {
                Ok(frame)
            }
            _ => Err(Error::StaleHandle(handle.key())),
        }
    }
}

/// Manages a fixed pool of frames caching pages from a [`PageStore`].
///
/// # Architecture
/// ```text
/// ┌─────────────────────────────────────────────────────────────┐
/// │                      BufferManager                          │
/// │  Mutex<PoolState>                                           │
/// │  ┌──────────────┐  ┌───────────────────────────────────┐    │
/// │  │ page_table   │  │        frames: Vec<Frame>         │    │
/// │  │PageKey → Fid │─▶│  [Frame0] [Frame1] [Frame2] ...   │    │
/// │  └──────────────┘  └───────────────────────────────────┘    │
/// │  ┌──────────────┐  ┌──────────────┐                         │
/// │  │  free_list   │  │   replacer   │                         │
/// │  │BTreeSet<Fid> │  │ LRU/MRU/...  │                         │
/// │  └──────────────┘  └──────────────┘                         │
/// │  store: Arc<Mutex<S>>        stats: atomic counters         │
/// └─────────────────────────────────────────────────────────────┘
/// ```
///
/// # Thread Safety
/// - `state`: one `Mutex`. A pin, including eviction and the read of the
///   new page, runs entirely under it, so two callers asking for the same
///   missing page never both load it.
/// - `store`: locked only while `state` is held (order: state, then store).
///   Callers must not hold the store lock while calling into the manager.
/// - `stats`: atomic counters, no lock.
///
/// Nothing blocks on pool exhaustion: a miss with every frame pinned fails
/// with [`Error::BufferPoolFull`] straight away.
///
/// # Usage
/// ```
/// use pinpool::{shared, BufferManager, BufferPoolConfig, MemoryPageStore, PageKey, PageStore};
///
/// let store = shared(MemoryPageStore::new());
/// let file = store.lock().create_file("users", 0).unwrap();
///
/// let bm = BufferManager::new(store.clone(), BufferPoolConfig::new(8));
/// let handle = bm.new_page(file, 1).unwrap();
/// bm.with_page_mut(&handle, |page| page.as_mut_slice()[0] = 0xAB).unwrap();
/// bm.unpin_page(handle.key(), true).unwrap();
///
/// let key = PageKey::new(file, handle.page_id());
/// let handle = bm.pin_page(key).unwrap();
/// assert_eq!(bm.with_page(&handle, |page| page.as_slice()[0]).unwrap(), 0xAB);
/// bm.unpin_page(key, false).unwrap();
/// ```
pub struct BufferManager<S: PageStore> {
    state: Mutex<PoolState>,

    store: SharedStore<S>,

    stats: BufferPoolStats,

    /// Number of frames in the pool (immutable after construction).
    pool_size: usize,

    policy: PolicyKind,
}

impl<S: PageStore> BufferManager<S> {
    /// Create a buffer manager over `store`.
    ///
    /// # Panics
    /// Panics if `config.pool_size` is 0.
    pub fn new(store: SharedStore<S>, config: BufferPoolConfig) -> Self {
        assert!(config.pool_size > 0, "pool_size must be > 0");

        let frames: Vec<Frame> = (0..config.pool_size).map(|_| Frame::new()).collect();
        let free_list: BTreeSet<FrameId> = (0..config.pool_size).map(FrameId::new).collect();

        debug!(
            pool_size = config.pool_size,
            policy = %config.policy,
            "buffer manager created"
        );

        Self {
            state: Mutex::new(PoolState {
                frames,
                page_table: HashMap::with_capacity(config.pool_size),
                free_list,
                replacer: Replacer::new(config.policy, config.seed),
            }),
            store,
            stats: BufferPoolStats::new(),
            pool_size: config.pool_size,
            policy: config.policy,
        }
    }

    /// Create a buffer manager from a policy name such as `"LRU"` or
    /// `"ClockPolicy"`.
    ///
    /// # Errors
    /// - `Error::UnknownPolicy` if the name matches no policy
    pub fn with_policy_name(store: SharedStore<S>, pool_size: usize, name: &str) -> Result<Self> {
        let policy: PolicyKind = name.parse()?;
        Ok(Self::new(
            store,
            BufferPoolConfig::new(pool_size).with_policy(policy),
        ))
    }

    // ========================================================================
    // Public API: Pin and unpin
    // ========================================================================

    /// Pin a page, loading it from the store on a miss.
    ///
    /// # Errors
    /// - `Error::BadPageId` if the page is not allocated in the store
    /// - `Error::BadFile` if the file is unknown
    /// - `Error::BufferPoolFull` if every frame is pinned
    /// - store I/O errors from the write-back or the read
    pub fn pin_page(&self, key: PageKey) -> Result<PageHandle> {
        self.checked_pin_page(key)?.ok_or(Error::BufferPoolFull)
    }

    /// Like [`pin_page`](Self::pin_page), but pool exhaustion is `Ok(None)`.
    pub fn checked_pin_page(&self, key: PageKey) -> Result<Option<PageHandle>> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        if let Some(&frame_id) = state.page_table.get(&key) {
            let frame = &mut state.frames[frame_id.index()];
            let pins = frame.pin();
            state.replacer.on_pin(frame);
            self.stats.record_hit();
            trace!(%key, %frame_id, pins, "pin hit");
            return Ok(Some(PageHandle::new(key, frame_id, frame.generation())));
        }

        self.stats.record_miss();
        let mut store = self.store.lock();

        // Nothing is evicted for a page that cannot be loaded.
        if !store.is_allocated(key.file, key.page)? {
            return Err(Error::BadPageId(key));
        }

        let Some(frame_id) = self.acquire_frame(state, &mut *store)? else {
            self.stats.record_pool_full();
            debug!(%key, "pin failed: buffer pool full");
            return Ok(None);
        };

        let frame = &mut state.frames[frame_id.index()];
        if let Err(e) = store.read_page(key.file, key.page, frame.page_mut()) {
            state.free_list.insert(frame_id);
            return Err(e);
        }
        self.stats.record_read();

        frame.occupy(key);
        state.replacer.on_load(frame);
        state.page_table.insert(key, frame_id);

        debug!(%key, %frame_id, "page loaded");
        Ok(Some(PageHandle::new(key, frame_id, frame.generation())))
    }

    /// Release one pin. `dirty = true` marks the page dirty; an unpin never
    /// clears the flag.
    ///
    /// # Errors
    /// - `Error::PageNotPinned` if the page is not resident or its pin count
    ///   is already zero (nothing changes)
    pub fn unpin_page(&self, key: PageKey, dirty: bool) -> Result<()> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let frame_id = *state
            .page_table
            .get(&key)
            .ok_or(Error::PageNotPinned(key))?;
        let frame = &mut state.frames[frame_id.index()];

        let pins = frame.unpin().ok_or(Error::PageNotPinned(key))?;
        if dirty {
            frame.mark_dirty();
        }
        state.replacer.on_unpin(frame);

        trace!(%key, pins, dirty, "unpin");
        Ok(())
    }

    // ========================================================================
    // Public API: Create and free pages
    // ========================================================================

    /// Allocate `count` contiguous pages in `file` and pin the first one.
    ///
    /// The returned handle carries the new page number. New pages read as
    /// all zeroes.
    ///
    /// If no frame is available the call fails with `Error::BufferPoolFull`
    /// and the pages stay allocated in the store.
    ///
    /// # Errors
    /// - `Error::InvalidPageCount`, `Error::BadFile`, `Error::FileFull` from
    ///   the store
    /// - `Error::BufferPoolFull` if every frame is pinned
    pub fn new_page(&self, file: FileId, count: u32) -> Result<PageHandle> {
        self.checked_new_page(file, count)?
            .ok_or(Error::BufferPoolFull)
    }

    /// Like [`new_page`](Self::new_page), but pool exhaustion is `Ok(None)`.
    pub fn checked_new_page(&self, file: FileId, count: u32) -> Result<Option<PageHandle>> {
        let first = self.store.lock().allocate_pages(file, count)?;
        let key = PageKey::new(file, first);
        debug!(%key, count, "pages allocated");

        self.checked_pin_page(key)
    }

    /// Deallocate a page in the store and drop it from the pool.
    ///
    /// A resident copy is discarded without being written back, even if it
    /// is dirty.
    ///
    /// # Errors
    /// - `Error::PagePinned` if the page is resident and pinned (nothing is
    ///   deallocated)
    /// - `Error::BadPageId` / `Error::BadFile` from the store (the pool is
    ///   left as it was)
    pub fn free_page(&self, key: PageKey) -> Result<()> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let resident = state.page_table.get(&key).copied();
        if let Some(frame_id) = resident {
            if state.frames[frame_id.index()].is_pinned() {
                return Err(Error::PagePinned(key));
            }
        }

        self.store.lock().deallocate_page(key.file, key.page)?;

        if let Some(frame_id) = resident {
            state.page_table.remove(&key);
            let frame = &mut state.frames[frame_id.index()];
            state.replacer.on_free(frame);
            frame.vacate();
            state.free_list.insert(frame_id);
        }

        debug!(%key, was_resident = resident.is_some(), "page freed");
        Ok(())
    }

    // ========================================================================
    // Public API: Flush pages
    // ========================================================================

    /// Write a resident page back if it is dirty. A clean page is a no-op.
    ///
    /// # Errors
    /// - `Error::PageNotFound` if the page is not resident
    /// - store I/O errors
    pub fn flush_page(&self, key: PageKey) -> Result<()> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let frame_id = *state
            .page_table
            .get(&key)
            .ok_or(Error::PageNotFound(key))?;
        let frame = &mut state.frames[frame_id.index()];

        if frame.is_dirty() {
            let mut store = self.store.lock();
            self.write_back(&mut *store, key, frame)?;
            debug!(%key, "page flushed");
        }
        Ok(())
    }

    /// Write back every dirty resident page, in frame order.
    ///
    /// # Errors
    /// - the first store I/O error; pages after it are left dirty
    pub fn flush_all_pages(&self) -> Result<()> {
        let mut guard = self.state.lock();
        let mut store = self.store.lock();

        let mut flushed = 0usize;
        for frame in guard.frames.iter_mut() {
            let Some(key) = frame.key() else { continue };
            if frame.is_dirty() {
                self.write_back(&mut *store, key, frame)?;
                flushed += 1;
            }
        }

        debug!(flushed, "flushed all pages");
        Ok(())
    }

    // ========================================================================
    // Public API: Page access
    // ========================================================================

    /// Run `f` over the contents of the page behind `handle`.
    ///
    /// The pool lock is held while `f` runs; `f` must not call back into
    /// this manager.
    ///
    /// # Errors
    /// - `Error::StaleHandle` if the frame has since been evicted or freed
    pub fn with_page<R>(&self, handle: &PageHandle, f: impl FnOnce(&Page) -> R) -> Result<R> {
        let mut state = self.state.lock();
        let frame = state.resolve(handle)?;
        Ok(f(frame.page()))
    }

    /// Run `f` over the mutable contents of the page behind `handle` and mark
    /// the page dirty.
    ///
    /// Same locking rule as [`with_page`](Self::with_page).
    ///
    /// # Errors
    /// - `Error::StaleHandle` if the frame has since been reused, or the page
    ///   is no longer pinned
    pub fn with_page_mut<R>(
        &self,
        handle: &PageHandle,
        f: impl FnOnce(&mut Page) -> R,
    ) -> Result<R> {
        let mut state = self.state.lock();
        let frame = state.resolve(handle)?;
        if !frame.is_pinned() {
            return Err(Error::StaleHandle(handle.key()));
        }
        frame.mark_dirty();
        Ok(f(frame.page_mut()))
    }

    // ========================================================================
    // Public API: Lookup and info
    // ========================================================================

    /// Handle for a resident page, without pinning it.
    pub fn find_page(&self, key: PageKey) -> Option<PageHandle> {
        let state = self.state.lock();
        let frame_id = *state.page_table.get(&key)?;
        let generation = state.frames[frame_id.index()].generation();
        Some(PageHandle::new(key, frame_id, generation))
    }

    /// Frame currently holding `key`.
    pub fn find_frame(&self, key: PageKey) -> Option<FrameId> {
        self.state.lock().page_table.get(&key).copied()
    }

    pub fn pin_count(&self, key: PageKey) -> Option<u32> {
        let state = self.state.lock();
        let frame_id = state.page_table.get(&key)?;
        Some(state.frames[frame_id.index()].pin_count())
    }

    pub fn is_dirty(&self, key: PageKey) -> Option<bool> {
        let state = self.state.lock();
        let frame_id = state.page_table.get(&key)?;
        Some(state.frames[frame_id.index()].is_dirty())
    }

    pub fn contains_page(&self, key: PageKey) -> bool {
        self.state.lock().page_table.contains_key(&key)
    }

    /// Get buffer pool statistics.
    pub fn stats(&self) -> &BufferPoolStats {
        &self.stats
    }

    /// Get the pool size.
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn policy_kind(&self) -> PolicyKind {
        self.policy
    }

    /// Get the number of free frames.
    pub fn free_frame_count(&self) -> usize {
        self.state.lock().free_list.len()
    }

    /// Get the number of pages in the buffer pool.
    pub fn page_count(&self) -> usize {
        self.state.lock().page_table.len()
    }

    /// The store this manager reads from and writes to.
    pub fn store(&self) -> &SharedStore<S> {
        &self.store
    }

    // ========================================================================
    // Internal
    // ========================================================================

    /// Find a frame for a new occupant: the lowest free frame, else a victim
    /// chosen by the policy. A victim is written back if dirty, unmapped and
    /// vacated. `None` means every frame is pinned.
    fn acquire_frame(&self, state: &mut PoolState, store: &mut S) -> Result<Option<FrameId>> {
        if let Some(frame_id) = state.free_list.pop_first() {
            return Ok(Some(frame_id));
        }

        let Some(victim) = state.replacer.select_victim(&mut state.frames) else {
            return Ok(None);
        };

        let frame = &mut state.frames[victim.index()];
        if let Some(old) = frame.key() {
            if frame.is_dirty() {
                self.write_back(store, old, frame)?;
            }
            state.page_table.remove(&old);
            self.stats.record_eviction();
            debug!(victim = %old, frame_id = %victim, "evicted");
        }
        frame.vacate();

        Ok(Some(victim))
    }

    fn write_back(&self, store: &mut S, key: PageKey, frame: &mut Frame) -> Result<()> {
        store.write_page(key.file, key.page, frame.page())?;
        frame.clear_dirty();
        self.stats.record_write();
        Ok(())
    }
}

impl<S: PageStore> fmt::Debug for BufferManager<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferManager")
            .field("pool_size", &self.pool_size)
            .field("policy", &self.policy)
            .field("page_count", &self.page_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::PageId;
    use crate::storage::{shared, MemoryPageStore};

    fn setup(pool_size: usize, pages: u32) -> (BufferManager<MemoryPageStore>, FileId) {
        setup_with(BufferPoolConfig::new(pool_size), pages)
    }

    fn setup_with(
        config: BufferPoolConfig,
        pages: u32,
    ) -> (BufferManager<MemoryPageStore>, FileId) {
        let store = shared(MemoryPageStore::new());
        let file = store.lock().create_file("test", pages).unwrap();
        (BufferManager::new(store, config), file)
    }

    fn key(file: FileId, page: u32) -> PageKey {
        PageKey::new(file, PageId::new(page))
    }

    #[test]
    fn test_bm_new() {
        let (bm, _) = setup(10, 0);
        assert_eq!(bm.pool_size(), 10);
        assert_eq!(bm.free_frame_count(), 10);
        assert_eq!(bm.page_count(), 0);
        assert_eq!(bm.policy_kind(), PolicyKind::Lru);
    }

    #[test]
    #[should_panic(expected = "pool_size must be > 0")]
    fn test_bm_zero_pool_size_panics() {
        let _ = setup(0, 0);
    }

    #[test]
    fn test_with_policy_name() {
        let store = shared(MemoryPageStore::new());
        let bm = BufferManager::with_policy_name(store.clone(), 4, "MRUPolicy").unwrap();
        assert_eq!(bm.policy_kind(), PolicyKind::Mru);

        let err = BufferManager::with_policy_name(store, 4, "ARC").unwrap_err();
        assert!(matches!(err, Error::UnknownPolicy(name) if name == "ARC"));
    }

    #[test]
    fn test_pin_miss_then_hit() {
        let (bm, file) = setup(4, 2);
        let k = key(file, 1);

        let first = bm.pin_page(k).unwrap();
        let second = bm.pin_page(k).unwrap();

        assert_eq!(first, second);
        assert_eq!(bm.pin_count(k), Some(2));

        let stats = bm.stats().snapshot();
        assert_eq!(stats.cache_misses, 1);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.pages_read, 1);
    }

    #[test]
    fn test_free_frames_used_lowest_first() {
        let (bm, file) = setup(3, 3);

        for page in 0..3 {
            let handle = bm.pin_page(key(file, page)).unwrap();
            assert_eq!(handle.frame_id(), FrameId::new(page as usize));
        }

        // Free the page in frame 1 and the one in frame 0; frame 0 is reused first
        bm.unpin_page(key(file, 1), false).unwrap();
        bm.unpin_page(key(file, 0), false).unwrap();
        bm.free_page(key(file, 1)).unwrap();
        bm.free_page(key(file, 0)).unwrap();

        let handle = bm.new_page(file, 1).unwrap();
        assert_eq!(handle.frame_id(), FrameId::new(0));
    }

    #[test]
    fn test_pin_unallocated_page_fails() {
        let (bm, file) = setup(2, 1);

        assert!(matches!(
            bm.pin_page(key(file, 5)),
            Err(Error::BadPageId(k)) if k == key(file, 5)
        ));
        assert!(matches!(
            bm.pin_page(PageKey::new(FileId::new(99), PageId::new(0))),
            Err(Error::BadFile(_))
        ));
        assert_eq!(bm.page_count(), 0);
    }

    #[test]
    fn test_failed_pin_evicts_nothing() {
        let (bm, file) = setup(2, 2);
        bm.pin_page(key(file, 0)).unwrap();
        bm.pin_page(key(file, 1)).unwrap();
        bm.unpin_page(key(file, 0), true).unwrap();
        bm.unpin_page(key(file, 1), true).unwrap();

        assert!(bm.pin_page(key(file, 7)).is_err());

        assert!(bm.contains_page(key(file, 0)));
        assert!(bm.contains_page(key(file, 1)));
        assert_eq!(bm.is_dirty(key(file, 0)), Some(true));
        assert_eq!(bm.stats().snapshot().evictions, 0);
    }

    #[test]
    fn test_unpin_errors() {
        let (bm, file) = setup(2, 1);
        let k = key(file, 0);

        assert!(matches!(bm.unpin_page(k, false), Err(Error::PageNotPinned(_))));

        bm.pin_page(k).unwrap();
        bm.unpin_page(k, false).unwrap();
        assert!(matches!(bm.unpin_page(k, false), Err(Error::PageNotPinned(_))));
        assert_eq!(bm.pin_count(k), Some(0));
    }

    #[test]
    fn test_dirty_flag_is_sticky() {
        let (bm, file) = setup(2, 1);
        let k = key(file, 0);

        bm.pin_page(k).unwrap();
        bm.pin_page(k).unwrap();
        bm.unpin_page(k, true).unwrap();
        bm.unpin_page(k, false).unwrap();

        assert_eq!(bm.is_dirty(k), Some(true));
    }

    #[test]
    fn test_pool_full() {
        let (bm, file) = setup(2, 3);
        bm.pin_page(key(file, 0)).unwrap();
        bm.pin_page(key(file, 1)).unwrap();

        assert!(matches!(bm.pin_page(key(file, 2)), Err(Error::BufferPoolFull)));
        assert_eq!(bm.checked_pin_page(key(file, 2)).unwrap(), None);
        assert_eq!(bm.stats().snapshot().pool_full, 2);

        // Hits still work on a full pool
        assert!(bm.pin_page(key(file, 0)).is_ok());

        bm.unpin_page(key(file, 1), false).unwrap();
        let handle = bm.pin_page(key(file, 2)).unwrap();
        assert_eq!(handle.frame_id(), FrameId::new(1));
        assert!(!bm.contains_page(key(file, 1)));
    }

    #[test]
    fn test_dirty_victim_written_back() {
        let (bm, file) = setup(1, 2);
        let k0 = key(file, 0);

        let handle = bm.pin_page(k0).unwrap();
        bm.with_page_mut(&handle, |page| page.as_mut_slice()[10] = 0x5A)
            .unwrap();
        bm.unpin_page(k0, true).unwrap();

        bm.pin_page(key(file, 1)).unwrap();
        assert_eq!(bm.stats().snapshot().pages_written, 1);
        assert_eq!(bm.stats().snapshot().evictions, 1);

        let mut buf = Page::new();
        bm.store().lock().read_page(file, PageId::new(0), &mut buf).unwrap();
        assert_eq!(buf.as_slice()[10], 0x5A);
    }

    #[test]
    fn test_clean_victim_not_written() {
        let (bm, file) = setup(1, 2);

        bm.pin_page(key(file, 0)).unwrap();
        bm.unpin_page(key(file, 0), false).unwrap();
        bm.pin_page(key(file, 1)).unwrap();

        assert_eq!(bm.stats().snapshot().pages_written, 0);
        assert_eq!(bm.stats().snapshot().evictions, 1);
    }

    #[test]
    fn test_new_page_is_zeroed_and_pinned() {
        let (bm, file) = setup(2, 0);

        let handle = bm.new_page(file, 3).unwrap();
        assert_eq!(handle.page_id(), PageId::new(0));
        assert_eq!(bm.pin_count(handle.key()), Some(1));
        assert!(bm.with_page(&handle, |page| page.is_zeroed()).unwrap());

        let next = bm.new_page(file, 1).unwrap();
        assert_eq!(next.page_id(), PageId::new(3));
    }

    #[test]
    fn test_new_page_pool_full_keeps_allocation() {
        let (bm, file) = setup(1, 0);
        bm.new_page(file, 1).unwrap();

        assert!(matches!(bm.new_page(file, 1), Err(Error::BufferPoolFull)));
        assert_eq!(bm.checked_new_page(file, 1).unwrap(), None);

        // Both failed calls still allocated a page each
        assert!(bm.store().lock().is_allocated(file, PageId::new(2)).unwrap());
    }

    #[test]
    fn test_new_page_store_errors() {
        let (bm, file) = setup(1, 0);
        assert!(matches!(bm.new_page(file, 0), Err(Error::InvalidPageCount(0))));
        assert!(matches!(
            bm.new_page(FileId::new(42), 1),
            Err(Error::BadFile(_))
        ));
    }

    #[test]
    fn test_free_page() {
        let (bm, file) = setup(2, 2);
        let k = key(file, 0);

        let handle = bm.pin_page(k).unwrap();
        bm.with_page_mut(&handle, |page| page.as_mut_slice()[0] = 1)
            .unwrap();
        assert!(matches!(bm.free_page(k), Err(Error::PagePinned(_))));
        assert!(bm.store().lock().is_allocated(file, PageId::new(0)).unwrap());

        bm.unpin_page(k, true).unwrap();
        bm.free_page(k).unwrap();

        assert!(!bm.contains_page(k));
        assert_eq!(bm.free_frame_count(), 2);
        assert_eq!(bm.stats().snapshot().pages_written, 0);
        assert!(!bm.store().lock().is_allocated(file, PageId::new(0)).unwrap());

        // Freeing again is a store error
        assert!(matches!(bm.free_page(k), Err(Error::BadPageId(_))));
    }

    #[test]
    fn test_free_non_resident_page() {
        let (bm, file) = setup(2, 2);
        bm.free_page(key(file, 1)).unwrap();
        assert!(!bm.store().lock().is_allocated(file, PageId::new(1)).unwrap());
    }

    #[test]
    fn test_flush_page() {
        let (bm, file) = setup(2, 1);
        let k = key(file, 0);

        assert!(matches!(bm.flush_page(k), Err(Error::PageNotFound(_))));

        let handle = bm.pin_page(k).unwrap();
        bm.flush_page(k).unwrap();
        assert_eq!(bm.stats().snapshot().pages_written, 0);

        bm.with_page_mut(&handle, |page| page.as_mut_slice()[0] = 9)
            .unwrap();
        bm.flush_page(k).unwrap();
        assert_eq!(bm.is_dirty(k), Some(false));
        assert_eq!(bm.stats().snapshot().pages_written, 1);
        // Still pinned after a flush
        assert_eq!(bm.pin_count(k), Some(1));
    }

    #[test]
    fn test_flush_all_pages() {
        let (bm, file) = setup(4, 4);
        for page in 0..4 {
            bm.pin_page(key(file, page)).unwrap();
            bm.unpin_page(key(file, page), page % 2 == 0).unwrap();
        }

        bm.flush_all_pages().unwrap();

        assert_eq!(bm.stats().snapshot().pages_written, 2);
        for page in 0..4 {
            assert_eq!(bm.is_dirty(key(file, page)), Some(false));
        }
    }

    #[test]
    fn test_stale_handle() {
        let (bm, file) = setup(1, 2);
        let k0 = key(file, 0);

        let handle = bm.pin_page(k0).unwrap();
        bm.unpin_page(k0, false).unwrap();

        // Unpinned but still resident: readable, not writable
        assert!(bm.with_page(&handle, |_| ()).is_ok());
        assert!(matches!(
            bm.with_page_mut(&handle, |_| ()),
            Err(Error::StaleHandle(_))
        ));

        bm.pin_page(key(file, 1)).unwrap();
        assert!(matches!(
            bm.with_page(&handle, |_| ()),
            Err(Error::StaleHandle(k)) if k == k0
        ));
    }

    #[test]
    fn test_reloaded_page_gets_new_generation() {
        let (bm, file) = setup(1, 2);
        let k0 = key(file, 0);

        let old = bm.pin_page(k0).unwrap();
        bm.unpin_page(k0, false).unwrap();
        bm.pin_page(key(file, 1)).unwrap();
        bm.unpin_page(key(file, 1), false).unwrap();

        // Same page, same frame, but a different occupancy
        let new = bm.pin_page(k0).unwrap();
        assert_eq!(new.frame_id(), old.frame_id());
        assert!(bm.with_page(&old, |_| ()).is_err());
        assert!(bm.with_page(&new, |_| ()).is_ok());
    }

    #[test]
    fn test_find_page_does_not_pin() {
        let (bm, file) = setup(2, 1);
        let k = key(file, 0);

        assert_eq!(bm.find_page(k), None);
        assert_eq!(bm.find_frame(k), None);

        let handle = bm.pin_page(k).unwrap();
        bm.unpin_page(k, false).unwrap();

        assert_eq!(bm.find_page(k), Some(handle));
        assert_eq!(bm.find_frame(k), Some(handle.frame_id()));
        assert_eq!(bm.pin_count(k), Some(0));
    }

    #[test]
    fn test_random_policy_is_seeded() {
        fn victims(seed: u64) -> Vec<Option<FrameId>> {
            let config = BufferPoolConfig::new(4)
                .with_policy(PolicyKind::Random)
                .with_seed(seed);
            let (bm, file) = setup_with(config, 40);
            for page in 0..4 {
                bm.pin_page(key(file, page)).unwrap();
                bm.unpin_page(key(file, page), false).unwrap();
            }
            (4..20)
                .map(|page| {
                    let handle = bm.pin_page(key(file, page)).unwrap();
                    bm.unpin_page(key(file, page), false).unwrap();
                    Some(handle.frame_id())
                })
                .collect()
        }

        assert_eq!(victims(11), victims(11));
    }
}
