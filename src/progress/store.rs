use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};

use crate::catalog::CatalogEntry;
use crate::store::{KvStore, now_millis, read_versioned, write_versioned};

/// Completion summary over a catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSummary {
    /// Entries at 100%.
    pub completed: usize,
    /// Mean percent over all entries; entries without a record count as 0.
    pub overall_percent: u8,
    pub total: usize,
}

/// Listening progress (0-100) per storage path.
///
/// The whole map is written back on every change. Records are never evicted,
/// so progress of tracks that left the catalog stays around but is ignored by
/// [`ProgressStore::aggregate`].
pub struct ProgressStore {
    store: Arc<dyn KvStore>,
    key: String,
    step: u8,
    records: HashMap<String, u8>,
}

impl ProgressStore {
    /// Open the store and read the saved map. Unreadable data starts empty.
    ///
    /// `step` is the minimum growth (in percent, exclusive) before
    /// [`ProgressStore::record`] persists a new value.
    pub fn open(store: Arc<dyn KvStore>, key: impl Into<String>, step: u8) -> Self {
        let key = key.into();
        let records = match read_versioned::<HashMap<String, u8>>(store.as_ref(), &key) {
            Ok(Some(v)) => v.data,
            Ok(None) => HashMap::new(),
            Err(e) => {
                warn!("progress unreadable, starting empty: {e}");
                HashMap::new()
            }
        };

        Self {
            store,
            key,
            step,
            records: records.into_iter().map(|(k, v)| (k, v.min(100))).collect(),
        }
    }

    /// Saved percent for `storage_path`, 0 when unknown.
    pub fn get(&self, storage_path: &str) -> u8 {
        self.records.get(storage_path).copied().unwrap_or(0)
    }

    /// Store `percent` (clamped to 100) unconditionally and persist the map.
    pub fn set(&mut self, storage_path: &str, percent: u8) {
        self.records.insert(storage_path.to_string(), percent.min(100));
        self.persist();
    }

    /// Store `percent` only when it grew by more than the step or reached 100.
    /// Returns whether it was stored.
    pub fn record(&mut self, storage_path: &str, percent: u8) -> bool {
        let percent = percent.min(100);
        let last = self.get(storage_path);
        let grew = percent > last.saturating_add(self.step);
        let finished = percent == 100 && last < 100;
        if !(grew || finished) {
            return false;
        }
        self.set(storage_path, percent);
        debug!("progress saved: {storage_path} - {percent}%");
        true
    }

    pub fn records(&self) -> &HashMap<String, u8> {
        &self.records
    }

    /// Completed count and mean percent over `entries`.
    pub fn aggregate(&self, entries: &[CatalogEntry]) -> ProgressSummary {
        if entries.is_empty() {
            return ProgressSummary::default();
        }

        let mut completed = 0;
        let mut sum: u64 = 0;
        for e in entries {
            let p = self.get(&e.storage_path);
            if p >= 100 {
                completed += 1;
            }
            sum += u64::from(p);
        }

        let total = entries.len();
        let mean = (sum as f64 / total as f64).round() as u8;
        ProgressSummary {
            completed,
            overall_percent: mean.min(100),
            total,
        }
    }

    fn persist(&self) {
        if let Err(e) = write_versioned(self.store.as_ref(), &self.key, &self.records, now_millis())
        {
            warn!("failed to save progress: {e}");
        }
    }
}
