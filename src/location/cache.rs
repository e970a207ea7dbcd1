//! In-memory forward-geocode cache.
//!
//! Keys are the exact address strings callers passed in (no case folding).
//! No TTL, no eviction: entries live as long as the owning client.

use super::types::Coordinate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Address → coordinate memo shared between clones of the same cache.
#[derive(Debug, Clone, Default)]
pub struct ForwardGeocodeCache {
    entries: Arc<Mutex<HashMap<String, Coordinate>>>,
}

impl ForwardGeocodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Coordinate>> {
        // A poisoned map still holds valid coordinates; keep serving it.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self, address: &str) -> Option<Coordinate> {
        self.lock().get(address).copied()
    }

    /// Store a coordinate. Last write for a key wins.
    pub fn put(&self, address: &str, coord: Coordinate) {
        self.lock().insert(address.to_string(), coord);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
