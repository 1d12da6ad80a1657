//! Replacement policy implementations (replacers).
//!
//! A replacement policy observes load/pin/unpin/free events on frames and,
//! when the pool has no free frame, picks one evictable (unpinned) frame to
//! reuse. Per-frame policy state lives in the frame's metadata word; state
//! shared across frames (logical clock, clock hand, RNG) lives in the
//! policy itself.
//!
//! Implementations:
//! - [`LruPolicy`] - Least Recently Used (smallest touch stamp)
//! - [`MruPolicy`] - Most Recently Used (largest touch stamp)
//! - [`ClockPolicy`] - Second chance with a circular hand
//! - [`RandomPolicy`] - Uniform over evictable frames, seeded
//!
//! The buffer manager holds a [`Replacer`], a closed enum over the four,
//! selected at construction from a [`PolicyKind`].

mod clock;
mod lru;
mod mru;
mod random;

pub use clock::ClockPolicy;
pub use lru::LruPolicy;
pub use mru::MruPolicy;
pub use random::RandomPolicy;

use std::fmt;
use std::str::FromStr;

use crate::buffer::Frame;
use crate::common::{Error, FrameId};

/// Event hooks and victim selection shared by every policy.
///
/// # Usage Contract
/// - `on_load`: the frame just became occupied (pin count 1).
/// - `on_pin`: a resident page was pinned again (cache hit).
/// - `on_unpin`: called on every successful unpin, not only the last.
/// - `on_free`: the frame is returning to the free state.
/// - `select_victim`: must return an evictable frame or `None`; it never
///   returns a pinned or free frame.
pub trait ReplacementPolicy: Send {
    fn on_load(&mut self, frame: &mut Frame);

    fn on_pin(&mut self, frame: &mut Frame);

    fn on_unpin(&mut self, frame: &mut Frame);

    fn on_free(&mut self, frame: &mut Frame) {
        frame.set_meta(0);
    }

    /// Pick the frame to evict, or `None` if every occupied frame is pinned.
    fn select_victim(&mut self, frames: &mut [Frame]) -> Option<FrameId>;
}

/// Names of the available policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    #[default]
    Lru,
    Mru,
    Clock,
    Random,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 4] = [
        PolicyKind::Lru,
        PolicyKind::Mru,
        PolicyKind::Clock,
        PolicyKind::Random,
    ];
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PolicyKind::Lru => "LRU",
            PolicyKind::Mru => "MRU",
            PolicyKind::Clock => "Clock",
            PolicyKind::Random => "Random",
        };
        f.write_str(name)
    }
}

/// Parses `"LRU"`, `"lru"`, `"LRUPolicy"`, `"ClockPolicy"`, ...
///
/// ```
/// use pinpool::PolicyKind;
///
/// assert_eq!("ClockPolicy".parse::<PolicyKind>().unwrap(), PolicyKind::Clock);
/// assert!("FifoPolicy".parse::<PolicyKind>().is_err());
/// ```
impl FromStr for PolicyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let base = lower.strip_suffix("policy").unwrap_or(&lower);
        match base {
            "lru" => Ok(PolicyKind::Lru),
            "mru" => Ok(PolicyKind::Mru),
            "clock" => Ok(PolicyKind::Clock),
            "random" => Ok(PolicyKind::Random),
            _ => Err(Error::UnknownPolicy(s.to_owned())),
        }
    }
}

/// Source of touch stamps for the recency-based policies.
///
/// Starts at 1, so a stamp of 0 means "never touched".
#[derive(Debug, Default)]
pub(crate) struct LogicalClock {
    now: u64,
}

impl LogicalClock {
    #[inline]
    pub(crate) fn tick(&mut self) -> u64 {
        self.now += 1;
        self.now
    }
}

/// The policy a buffer manager runs with.
pub enum Replacer {
    Lru(LruPolicy),
    Mru(MruPolicy),
    Clock(ClockPolicy),
    Random(RandomPolicy),
}

impl Replacer {
    /// Build the policy named by `kind`. `seed` is used by Random only.
    pub fn new(kind: PolicyKind, seed: u64) -> Self {
        match kind {
            PolicyKind::Lru => Replacer::Lru(LruPolicy::new()),
            PolicyKind::Mru => Replacer::Mru(MruPolicy::new()),
            PolicyKind::Clock => Replacer::Clock(ClockPolicy::new()),
            PolicyKind::Random => Replacer::Random(RandomPolicy::new(seed)),
        }
    }

    pub fn kind(&self) -> PolicyKind {
        match self {
            Replacer::Lru(_) => PolicyKind::Lru,
            Replacer::Mru(_) => PolicyKind::Mru,
            Replacer::Clock(_) => PolicyKind::Clock,
            Replacer::Random(_) => PolicyKind::Random,
        }
    }

    fn inner(&mut self) -> &mut dyn ReplacementPolicy {
        match self {
            Replacer::Lru(p) => p,
            Replacer::Mru(p) => p,
            Replacer::Clock(p) => p,
            Replacer::Random(p) => p,
        }
    }
}

impl ReplacementPolicy for Replacer {
    fn on_load(&mut self, frame: &mut Frame) {
        self.inner().on_load(frame);
    }

    fn on_pin(&mut self, frame: &mut Frame) {
        self.inner().on_pin(frame);
    }

    fn on_unpin(&mut self, frame: &mut Frame) {
        self.inner().on_unpin(frame);
    }

    fn on_free(&mut self, frame: &mut Frame) {
        self.inner().on_free(frame);
    }

    fn select_victim(&mut self, frames: &mut [Frame]) -> Option<FrameId> {
        self.inner().select_victim(frames)
    }
}

impl fmt::Debug for Replacer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Replacer({})", self.kind())
    }
}
