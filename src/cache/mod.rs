use dashmap::DashMap;
use std::fmt::Display;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{AppError, AppResult};

mod macros;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Picture of the day fetched on a calendar date
    PictureOfTheDay(String),
    /// Near-Earth objects for a calendar date
    NearEarthObjects(String),
    /// Filtered event listing, keyed by its canonical filter string
    EventQuery(String),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::PictureOfTheDay(date) => write!(f, "apod:{}", date),
            CacheKey::NearEarthObjects(date) => write!(f, "neo:{}", date),
            CacheKey::EventQuery(filters) => write!(f, "events:{}", filters.to_lowercase()),
        }
    }
}

struct CacheEntry {
    value: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-process result cache shared by all request handlers
///
/// Values are stored as JSON with a per-entry expiry. Expired entries are
/// dropped lazily when read; there is no capacity bound.
#[derive(Clone, Default)]
pub struct Cache {
    entries: Arc<DashMap<String, CacheEntry>>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieves a value from the cache by key
    ///
    /// Returns `None` when the key is absent or its entry has expired; an
    /// expired entry is removed on the way out.
    pub fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let key = key.to_string();

        let fresh = match self.entries.get(&key) {
            Some(entry) if !entry.is_expired() => Some(entry.value.clone()),
            Some(_) => None,
            None => return Ok(None),
        };

        match fresh {
            Some(json) => {
                let data = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(data))
            }
            None => {
                self.entries.remove_if(&key, |_, entry| entry.is_expired());
                Ok(None)
            }
        }
    }

    /// Stores a value, replacing any previous entry for the key
    pub fn set<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: Duration) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value: json,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Number of entries still within their expiry window
    pub fn size(&self) -> usize {
        self.entries.iter().filter(|entry| !entry.is_expired()).count()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
