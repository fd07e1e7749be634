use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::error::{CatalogError, StorageError};

use super::model::{CatalogEntry, GroupSpec};
use super::parse::parse_entry;
use super::storage::ObjectStorage;

/// Result of listing every group once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogListing {
    /// Entries grouped in rank order but otherwise unsorted.
    pub entries: Vec<CatalogEntry>,
    /// Prefixes of the groups that failed or missed the deadline.
    pub failed: Vec<String>,
}

impl CatalogListing {
    /// Every group answered.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Lists every configured group and turns the results into catalog entries.
pub struct CatalogClient {
    storage: Arc<dyn ObjectStorage>,
    groups: Vec<GroupSpec>,
    labels: Vec<String>,
    extensions: Vec<String>,
    limit: usize,
    timeout: Duration,
}

impl CatalogClient {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        groups: Vec<GroupSpec>,
        extensions: Vec<String>,
        limit: usize,
        timeout: Duration,
    ) -> Self {
        let labels = groups.iter().map(|g| g.label.clone()).collect();
        Self {
            storage,
            groups,
            labels,
            extensions,
            limit,
            timeout,
        }
    }

    /// Group labels in rank order.
    pub fn group_labels(&self) -> &[String] {
        &self.labels
    }

    /// List all groups concurrently.
    ///
    /// Every group gets the same deadline. A group that errors or misses the
    /// deadline contributes nothing and is reported in
    /// [`CatalogListing::failed`]; its worker is left to finish on its own
    /// and the late result is dropped.
    pub fn fetch_all(&self) -> Result<CatalogListing, CatalogError> {
        if self.groups.is_empty() {
            return Err(CatalogError::Config("no catalog groups configured".into()));
        }
        if self.limit == 0 {
            return Err(CatalogError::Config("listing limit must be >= 1".into()));
        }

        let (tx, rx) = mpsc::channel::<(usize, Result<Vec<CatalogEntry>, StorageError>)>();

        for (rank, group) in self.groups.iter().enumerate() {
            let tx = tx.clone();
            let storage = Arc::clone(&self.storage);
            let group = group.clone();
            let extensions = self.extensions.clone();
            let limit = self.limit;

            thread::Builder::new()
                .name(format!("catalog-list-{rank}"))
                .spawn(move || {
                    let result = list_group(storage.as_ref(), &group, &extensions, limit);
                    // The receiver is gone once the deadline has passed.
                    let _ = tx.send((rank, result));
                })
                .map_err(CatalogError::Spawn)?;
        }
        drop(tx);

        let deadline = Instant::now() + self.timeout;
        let mut per_group: Vec<Vec<CatalogEntry>> = vec![Vec::new(); self.groups.len()];
        let mut succeeded = vec![false; self.groups.len()];
        let mut reported = vec![false; self.groups.len()];
        let mut pending = self.groups.len();

        while pending > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(remaining) {
                Ok((rank, result)) => {
                    pending -= 1;
                    reported[rank] = true;
                    let prefix = &self.groups[rank].prefix;
                    match result {
                        Ok(entries) => {
                            debug!("catalog: {} entries under {prefix:?}", entries.len());
                            per_group[rank] = entries;
                            succeeded[rank] = true;
                        }
                        Err(e) => warn!("catalog: listing {prefix:?} failed: {e}"),
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    for (group, _) in self.groups.iter().zip(&reported).filter(|(_, r)| !**r) {
                        warn!(
                            "catalog: listing {:?} timed out after {:?}",
                            group.prefix, self.timeout
                        );
                    }
                    break;
                }
                // A worker died without reporting; whatever is missing stays empty.
                Err(RecvTimeoutError::Disconnected) => {
                    warn!("catalog: {pending} group(s) ended without a result");
                    break;
                }
            }
        }

        let failed = self
            .groups
            .iter()
            .zip(&succeeded)
            .filter(|(_, ok)| !**ok)
            .map(|(g, _)| g.prefix.clone())
            .collect();
        Ok(CatalogListing {
            entries: per_group.into_iter().flatten().collect(),
            failed,
        })
    }
}

/// List a single group. Objects that are not audio are dropped.
fn list_group(
    storage: &dyn ObjectStorage,
    group: &GroupSpec,
    extensions: &[String],
    limit: usize,
) -> Result<Vec<CatalogEntry>, StorageError> {
    let objects = storage.list(&group.prefix, limit, 0)?;
    Ok(objects
        .iter()
        .filter_map(|o| parse_entry(group, &o.name, extensions, storage))
        .collect())
}
