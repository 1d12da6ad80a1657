//! Buffer pool management.
//!
//! The buffer pool is the in-memory cache layer between callers and a page
//! store. It manages a fixed pool of frames, each holding one page.
//!
//! # Components
//! - [`BufferManager`] - The main page cache
//! - [`Frame`] - A slot in the buffer pool holding a page + metadata
//! - [`PageHandle`] - What a pin returns; a checked reference to a frame
//! - [`BufferPoolStats`] - Performance statistics
//! - [`replacer`] - Replacement policy implementations

mod buffer_manager;
mod frame;
mod handle;
pub mod replacer;
mod stats;

pub use buffer_manager::BufferManager;
pub use frame::Frame;
pub use handle::PageHandle;
pub use stats::{BufferPoolStats, StatsSnapshot};
