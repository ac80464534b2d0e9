// Durable page cache for paginated, slow-changing catalog data
//
// Backed by a single JSON file so cached pages survive process restarts.
// Entries are keyed by (collection, page, page_size, filter) and served
// only while younger than the configured TTL. Writes that reveal new
// catalog entries wipe the affected collection through
// `invalidate_collection`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Identity of one cached page. `filter` is a canonical signature of the
/// query parameters beyond pagination (traits, type, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub collection: String,
    pub page: u32,
    pub page_size: u32,
    pub filter: String,
}

impl PageKey {
    // Collections are URL paths and never contain '|', so the encoded key
    // can be prefix-matched per collection.
    fn encode(&self) -> String {
        format!("{}|{}|{}|{}", self.collection, self.page, self.page_size, self.filter)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageEntry {
    pub payload: serde_json::Value,
    pub inserted_at: DateTime<Utc>,
}

pub struct PageCache {
    storage_path: PathBuf,
    ttl: Duration,
    entries: Mutex<HashMap<String, PageEntry>>,
}

impl PageCache {
    /// Opens the cache at `storage_path`, loading any surviving entries.
    pub fn new(storage_path: impl Into<PathBuf>, ttl_minutes: i64) -> Self {
        let cache = Self {
            storage_path: storage_path.into(),
            ttl: Duration::minutes(ttl_minutes),
            entries: Mutex::new(HashMap::new()),
        };
        if let Err(err) = cache.load_from_disk() {
            warn!("failed to load page cache, starting empty: {err}");
        }
        cache
    }

    /// Returns the cached payload for `key` if present and fresh.
    pub fn get(&self, key: &PageKey) -> Option<serde_json::Value> {
        let entries = self.entries.lock().expect("page cache lock poisoned");
        let entry = entries.get(&key.encode())?;
        let age = Utc::now() - entry.inserted_at;
        if age >= self.ttl {
            debug!("stale page for {} page {}", key.collection, key.page);
            return None;
        }
        Some(entry.payload.clone())
    }

    /// Inserts or replaces the page for `key` and persists the cache.
    pub fn put(&self, key: &PageKey, payload: serde_json::Value) -> Result<()> {
        let snapshot = {
            let mut entries = self.entries.lock().expect("page cache lock poisoned");
            entries.insert(
                key.encode(),
                PageEntry { payload, inserted_at: Utc::now() },
            );
            entries.clone()
        };
        self.save_to_disk(&snapshot)
    }

    /// Drops every cached page of one collection. Called when a write
    /// invalidates the catalog it belongs to, e.g. charting a waypoint.
    pub fn invalidate_collection(&self, collection: &str) -> Result<()> {
        let prefix = format!("{collection}|");
        let snapshot = {
            let mut entries = self.entries.lock().expect("page cache lock poisoned");
            entries.retain(|encoded, _| !encoded.starts_with(&prefix));
            entries.clone()
        };
        self.save_to_disk(&snapshot)
    }

    /// Wipes the cache entirely, in memory and on disk.
    pub fn clear(&self) -> Result<()> {
        let mut entries = self.entries.lock().expect("page cache lock poisoned");
        entries.clear();
        if self.storage_path.exists() {
            fs::remove_file(&self.storage_path)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("page cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn load_from_disk(&self) -> Result<()> {
        if !Path::new(&self.storage_path).exists() {
            return Ok(());
        }
        let content = fs::read_to_string(&self.storage_path)?;
        let loaded: HashMap<String, PageEntry> = serde_json::from_str(&content)?;
        debug!("loaded {} cached pages", loaded.len());
        *self.entries.lock().expect("page cache lock poisoned") = loaded;
        Ok(())
    }

    fn save_to_disk(&self, entries: &HashMap<String, PageEntry>) -> Result<()> {
        if let Some(parent) = self.storage_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string(entries)?;
        fs::write(&self.storage_path, content)?;
        Ok(())
    }
}
