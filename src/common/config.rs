//! Configuration for pinpool.

use crate::buffer::replacer::PolicyKind;

/// Size of a page in bytes (4KB).
///
/// Every page in every file has exactly this size, and every frame in the
/// buffer pool holds exactly one page.
pub const PAGE_SIZE: usize = 4096;

/// Number of frames used when no pool size is given.
pub const DEFAULT_POOL_SIZE: usize = 20;

/// Seed for the Random replacement policy when none is configured.
pub const DEFAULT_RANDOM_SEED: u64 = 0x5EED_CAFE;

/// Construction parameters for a [`BufferManager`](crate::BufferManager).
///
/// # Example
/// ```
/// use pinpool::{BufferPoolConfig, PolicyKind};
///
/// let config = BufferPoolConfig::new(64)
///     .with_policy(PolicyKind::Clock)
///     .with_seed(7);
/// assert_eq!(config.pool_size, 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferPoolConfig {
    /// Number of frames in the pool. Fixed for the pool's lifetime.
    pub pool_size: usize,
    /// Replacement policy consulted on misses under pressure.
    pub policy: PolicyKind,
    /// Seed for policies that need randomness.
    pub seed: u64,
}

impl BufferPoolConfig {
    /// A config with `pool_size` frames and the default (LRU) policy.
    pub fn new(pool_size: usize) -> Self {
        Self {
            pool_size,
            policy: PolicyKind::default(),
            seed: DEFAULT_RANDOM_SEED,
        }
    }

    pub fn with_policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_SIZE)
    }
}
