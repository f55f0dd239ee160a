use super::{ContentStore, StoreError};
use crate::core::types::StoreLocation;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Fetches remembered by [`InMemoryStore`]; older entries are dropped first.
pub const FETCH_LOG_CAPACITY: usize = 1024;

/// Map-backed store that records recent fetches. Can simulate an outage.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    containers: Mutex<HashSet<String>>,
    fetch_log: Mutex<VecDeque<StoreLocation>>,
    unavailable: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(self, location: StoreLocation, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(location, bytes);
        self
    }

    pub fn insert(&self, location: StoreLocation, bytes: impl Into<Vec<u8>>) {
        lock(&self.containers).insert(location.container.clone());
        lock(&self.blobs).insert(location.to_string(), bytes.into());
    }

    pub fn create_container(&self, container: impl Into<String>) {
        lock(&self.containers).insert(container.into());
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// The last [`FETCH_LOG_CAPACITY`] locations requested, oldest first.
    pub fn fetches(&self) -> Vec<StoreLocation> {
        lock(&self.fetch_log).iter().cloned().collect()
    }

    pub fn fetches_in(&self, container: &str) -> usize {
        lock(&self.fetch_log)
            .iter()
            .filter(|location| location.container == container)
            .count()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl ContentStore for InMemoryStore {
    async fn fetch(&self, location: &StoreLocation) -> Result<Vec<u8>, StoreError> {
        {
            let mut log = lock(&self.fetch_log);
            if log.len() == FETCH_LOG_CAPACITY {
                log.pop_front();
            }
            log.push_back(location.clone());
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store is offline".to_string()));
        }
        if !lock(&self.containers).contains(&location.container) {
            return Err(StoreError::ContainerNotFound(location.container.clone()));
        }
        lock(&self.blobs)
            .get(&location.to_string())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(location.clone()))
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
