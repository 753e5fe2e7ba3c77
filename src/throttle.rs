//! Per-caller reload cooldown.
//!
//! Tracks the last accepted reload per caller identity (network origin)
//! in an LRU-ordered map bounded to a fixed capacity, so the tracking
//! structure cannot grow without bound.

use crate::error::{HiveError, Result};
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(60);
pub const DEFAULT_CAPACITY: usize = 1024;

pub struct ReloadThrottle {
    cooldown: Duration,
    capacity: usize,
    /// Insertion order doubles as recency order: accepted callers are
    /// re-inserted at the back, eviction pops the front.
    recent: Mutex<IndexMap<String, Instant>>,
}

impl Default for ReloadThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN, DEFAULT_CAPACITY)
    }
}

impl ReloadThrottle {
    pub fn new(cooldown: Duration, capacity: usize) -> Self {
        Self {
            cooldown,
            capacity,
            recent: Mutex::new(IndexMap::new()),
        }
    }

    /// Accept or reject a reload for `caller`.
    ///
    /// Rejection carries a positive remaining-seconds hint and does not
    /// refresh the caller's slot.
    pub fn check(&self, caller: &str) -> Result<()> {
        let mut recent = self.recent.lock();
        if let Some(last) = recent.get(caller) {
            let elapsed = last.elapsed();
            if elapsed < self.cooldown {
                let retry_after_secs = (self.cooldown - elapsed).as_secs().max(1);
                debug!(caller, retry_after_secs, "reload throttled");
                return Err(HiveError::Throttled { retry_after_secs });
            }
        }
        recent.shift_remove(caller);
        recent.insert(caller.to_string(), Instant::now());
        while recent.len() > self.capacity {
            recent.shift_remove_index(0);
        }
        Ok(())
    }

    pub fn tracked_callers(&self) -> usize {
        self.recent.lock().len()
    }
}
