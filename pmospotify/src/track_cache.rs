//! Single-slot memo of the last resolved stream URL
//!
//! Only the immediately preceding resolution is ever reused: a lookup for a
//! different URI overwrites the slot.

use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedTrack {
    pub uri: String,
    pub url: String,
}

#[derive(Debug, Default)]
pub struct TrackCache {
    slot: Mutex<Option<CachedTrack>>,
}

impl TrackCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached URL for `uri`, if it is the one in the slot
    pub fn get(&self, uri: &str) -> Option<String> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref()
            .filter(|cached| cached.uri == uri)
            .map(|cached| cached.url.clone())
    }

    pub fn store(&self, uri: impl Into<String>, url: impl Into<String>) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(CachedTrack {
            uri: uri.into(),
            url: url.into(),
        });
    }

    pub fn clear(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
    }

    pub fn current(&self) -> Option<CachedTrack> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
