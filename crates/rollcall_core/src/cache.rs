//! Session query cache shared by the services.
//!
//! # Responsibility
//! - Memoize list and statistics reads per query key.
//! - Drop whole key families after a successful mutation so the next read
//!   goes back to the store.
//!
//! # Invariants
//! - A failed fetch never populates the cache.
//! - Invalidation is the only eviction; there is no staleness timer.
//! - A fetch that overlaps an invalidation of its family is returned but not
//!   stored.

use chrono::NaiveDate;
use log::debug;
use std::any::Any;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard};

/// Group of keys invalidated together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryFamily {
    Students,
    Attendance,
    AttendanceStats,
    Activities,
}

impl QueryFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Students => "students",
            Self::Attendance => "attendance",
            Self::AttendanceStats => "attendance-stats",
            Self::Activities => "activities",
        }
    }
}

/// Cache key for one query result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Students,
    Activities,
    Attendance(NaiveDate),
    AttendanceStats(NaiveDate),
}

impl QueryKey {
    pub fn family(self) -> QueryFamily {
        match self {
            Self::Students => QueryFamily::Students,
            Self::Activities => QueryFamily::Activities,
            Self::Attendance(_) => QueryFamily::Attendance,
            Self::AttendanceStats(_) => QueryFamily::AttendanceStats,
        }
    }
}

impl Display for QueryKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Students | Self::Activities => f.write_str(self.family().as_str()),
            Self::Attendance(date) | Self::AttendanceStats(date) => {
                write!(f, "{}/{date}", self.family().as_str())
            }
        }
    }
}

type CachedValue = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
struct CacheState {
    entries: HashMap<QueryKey, CachedValue>,
    /// Bumped by every invalidation of the family.
    generations: HashMap<QueryFamily, u64>,
}

impl CacheState {
    fn generation(&self, family: QueryFamily) -> u64 {
        self.generations.get(&family).copied().unwrap_or(0)
    }
}

/// Explicit cache object; clone the `Arc` to share it between services.
#[derive(Default)]
pub struct QueryCache {
    state: Mutex<CacheState>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Returns the cached value for `key` when it holds a `T`.
    pub fn get<T>(&self, key: QueryKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.lock()
            .entries
            .get(&key)
            .and_then(|value| value.downcast_ref::<T>())
            .cloned()
    }

    pub fn insert<T>(&self, key: QueryKey, value: T)
    where
        T: Send + Sync + 'static,
    {
        self.lock().entries.insert(key, Arc::new(value));
    }

    /// Returns the cached value or runs `fetch` and caches its success.
    ///
    /// The lock is not held while `fetch` runs. When the key's family is
    /// invalidated meanwhile, the result is returned without being cached.
    pub fn get_or_fetch<T, E>(
        &self,
        key: QueryKey,
        fetch: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
    {
        if let Some(hit) = self.get::<T>(key) {
            debug!("event=cache_read module=cache status=hit key={key}");
            return Ok(hit);
        }

        debug!("event=cache_read module=cache status=miss key={key}");
        let family = key.family();
        let generation = self.lock().generation(family);
        let value = fetch()?;

        let mut state = self.lock();
        if state.generation(family) == generation {
            state.entries.insert(key, Arc::new(value.clone()));
        } else {
            debug!("event=cache_store module=cache status=skipped key={key} reason=invalidated");
        }
        Ok(value)
    }

    /// Drops every key of `family`; returns how many entries were removed.
    pub fn invalidate(&self, family: QueryFamily) -> usize {
        let mut state = self.lock();
        *state.generations.entry(family).or_insert(0) += 1;
        let before = state.entries.len();
        state.entries.retain(|key, _| key.family() != family);
        let removed = before - state.entries.len();
        debug!(
            "event=cache_invalidate module=cache family={} removed={}",
            family.as_str(),
            removed
        );
        removed
    }

    pub fn invalidate_all(&self, families: &[QueryFamily]) {
        for family in families {
            self.invalidate(*family);
        }
    }

    pub fn contains(&self, key: QueryKey) -> bool {
        self.lock().entries.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // A poisoned map only holds memoized reads; keep serving it.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
