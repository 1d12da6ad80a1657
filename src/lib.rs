//! pinpool - a buffer manager with pluggable page replacement policies.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         caller                                  │
//! │           pin / unpin / new / free / flush (by PageKey)         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │            Buffer Manager (buffer/)                      │   │
//! │  │   ┌─────────────────────────────────────────────────┐   │   │
//! │  │   │  Replacement: LRU | MRU | CLOCK | Random        │   │   │
//! │  │   │        (chosen at construction)                  │   │   │
//! │  │   └─────────────────────────────────────────────────┘   │   │
//! │  │      BufferManager + Frame + PageHandle + Statistics     │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │           Storage Layer (storage/)                       │   │
//! │  │     PageStore trait + MemoryPageStore + DiskPageStore    │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, FileId, FrameId, Error, config)
//! - [`buffer`] - Buffer manager and replacement policies
//! - [`storage`] - Page stores and the page buffer type
//!
//! # Quick Start
//! ```
//! use pinpool::{shared, BufferManager, BufferPoolConfig, MemoryPageStore, PageStore, PolicyKind};
//!
//! let store = shared(MemoryPageStore::new());
//! let file = store.lock().create_file("orders", 0).unwrap();
//!
//! let bm = BufferManager::new(store, BufferPoolConfig::new(16).with_policy(PolicyKind::Clock));
//! let handle = bm.new_page(file, 1).unwrap();
//! bm.with_page_mut(&handle, |page| page.write_at(0, b"hello")).unwrap().unwrap();
//! bm.unpin_page(handle.key(), true).unwrap();
//! bm.flush_all_pages().unwrap();
//! ```

pub mod buffer;
pub mod common;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::PAGE_SIZE;
pub use common::{BufferPoolConfig, Error, FileId, FrameId, PageId, PageKey, Result};

pub use buffer::replacer::{PolicyKind, ReplacementPolicy, Replacer};
pub use buffer::{BufferManager, BufferPoolStats, Frame, PageHandle, StatsSnapshot};
pub use storage::page::Page;
pub use storage::{shared, DiskPageStore, MemoryPageStore, PageStore, SharedStore};
