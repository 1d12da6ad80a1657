//! Common types and utilities shared across pinpool.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration constants and [`BufferPoolConfig`]
//! - Error types
//! - Identifiers ([`PageId`], [`FileId`], [`PageKey`], [`FrameId`])

pub mod config;
pub mod error;
mod frame_id;
mod page_id;

pub use config::BufferPoolConfig;
pub use error::{Error, Result};
pub use frame_id::FrameId;
pub use page_id::{FileId, PageId, PageKey};
