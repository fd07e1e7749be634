use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::store::{KvStore, now_millis, read_versioned, write_versioned};

use super::model::CatalogEntry;

/// A catalog as it was last written to the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedCatalog {
    pub entries: Vec<CatalogEntry>,
    pub fetched_at_ms: u64,
}

// Stored payload; `groups` are the prefixes the catalog was listed from.
#[derive(Serialize, Deserialize)]
struct CachedPayload {
    groups: Vec<String>,
    entries: Vec<CatalogEntry>,
}

/// Time-limited copy of the resolved catalog in the local store.
///
/// The whole catalog is written at once; there are no partial updates and
/// no background refresh. Staleness is only checked when loading, and a
/// catalog listed from other group prefixes counts as stale.
pub struct CatalogCache {
    store: Arc<dyn KvStore>,
    key: String,
    ttl: Duration,
    groups: Vec<String>,
}

impl CatalogCache {
    pub fn new(
        store: Arc<dyn KvStore>,
        key: impl Into<String>,
        ttl: Duration,
        groups: Vec<String>,
    ) -> Self {
        Self {
            store,
            key: key.into(),
            ttl,
            groups,
        }
    }

    /// The cached catalog, if one exists and is not older than the TTL.
    pub fn load(&self) -> Option<CachedCatalog> {
        self.load_at(now_millis())
    }

    pub fn load_at(&self, now_ms: u64) -> Option<CachedCatalog> {
        let envelope = match read_versioned::<CachedPayload>(self.store.as_ref(), &self.key) {
            Ok(v) => v?,
            Err(e) => {
                warn!("catalog cache unreadable: {e}");
                return None;
            }
        };

        let age = now_ms.saturating_sub(envelope.saved_at_ms);
        if u128::from(age) > self.ttl.as_millis() {
            return None;
        }

        if envelope.data.groups != self.groups {
            debug!("catalog cache was listed from other groups; ignoring it");
            return None;
        }

        Some(CachedCatalog {
            entries: envelope.data.entries,
            fetched_at_ms: envelope.saved_at_ms,
        })
    }

    /// Overwrite the cache with `entries`. Failures are logged, never returned.
    pub fn store(&self, entries: &[CatalogEntry], fetched_at_ms: u64) {
        let payload = CachedPayload {
            groups: self.groups.clone(),
            entries: entries.to_vec(),
        };
        if let Err(e) = write_versioned(self.store.as_ref(), &self.key, &payload, fetched_at_ms) {
            warn!("failed to write catalog cache: {e}");
        }
    }
}
