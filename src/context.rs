//! Explicit wiring of settings, local persistence and remote storage.
//!
//! Every component gets what it needs from a `Context` at construction time,
//! so tests can build isolated instances with in-memory stores and fakes.

use std::sync::Arc;

use log::warn;

use crate::catalog::{
    CatalogCache, CatalogClient, CatalogEntry, GroupSpec, ObjectStorage, SupabaseStorage,
    resolve_catalog,
};
use crate::config::Settings;
use crate::error::{CatalogError, StorageError};
use crate::progress::{ProgressStore, VolumeStore};
use crate::store::{FileKvStore, KvStore, MemoryKvStore, StoreKeys};

pub struct Context {
    pub settings: Settings,
    pub keys: StoreKeys,
    kv: Arc<dyn KvStore>,
    storage: Option<Arc<dyn ObjectStorage>>,
}

impl Context {
    /// Open the file store under the data dir and the configured storage.
    ///
    /// Without a usable data dir state is kept in memory for this session.
    /// Without a usable storage endpoint only a cached catalog can be played.
    pub fn open(settings: Settings) -> Self {
        let kv: Arc<dyn KvStore> = match settings.data_dir() {
            Some(dir) => match FileKvStore::open(&dir) {
                Ok(store) => Arc::new(store),
                Err(e) => {
                    warn!("cannot open store at {}: {e}; state will not persist", dir.display());
                    Arc::new(MemoryKvStore::new())
                }
            },
            None => {
                warn!("no data directory; state will not persist");
                Arc::new(MemoryKvStore::new())
            }
        };

        let storage: Option<Arc<dyn ObjectStorage>> =
            match SupabaseStorage::new(&settings.storage, settings.media_timeout()) {
                Ok(s) => Some(Arc::new(s)),
                Err(StorageError::Unconfigured) => None,
                Err(e) => {
                    warn!("storage client unavailable: {e}");
                    None
                }
            };

        Self::with_parts(settings, kv, storage)
    }

    pub fn with_parts(
        settings: Settings,
        kv: Arc<dyn KvStore>,
        storage: Option<Arc<dyn ObjectStorage>>,
    ) -> Self {
        let keys = StoreKeys::new(&settings.persistence.namespace);
        Self {
            settings,
            keys,
            kv,
            storage,
        }
    }

    pub fn storage(&self) -> Result<Arc<dyn ObjectStorage>, StorageError> {
        self.storage.clone().ok_or(StorageError::Unconfigured)
    }

    pub fn groups(&self) -> Vec<GroupSpec> {
        GroupSpec::from_root(&self.settings.catalog.root, &self.settings.catalog.groups)
    }

    /// Group labels in rank order.
    pub fn group_order(&self) -> Vec<String> {
        self.groups().into_iter().map(|g| g.label).collect()
    }

    pub fn catalog_cache(&self) -> CatalogCache {
        CatalogCache::new(
            Arc::clone(&self.kv),
            self.keys.catalog.clone(),
            self.settings.cache_ttl(),
            self.groups().into_iter().map(|g| g.prefix).collect(),
        )
    }

    pub fn catalog_client(&self) -> Result<CatalogClient, StorageError> {
        Ok(CatalogClient::new(
            self.storage()?,
            self.groups(),
            self.settings.catalog.extensions.clone(),
            self.settings.storage.list_limit,
            self.settings.list_timeout(),
        ))
    }

    pub fn progress_store(&self) -> ProgressStore {
        ProgressStore::open(
            Arc::clone(&self.kv),
            self.keys.progress.clone(),
            self.settings.playback.progress_step,
        )
    }

    pub fn volume_store(&self) -> VolumeStore {
        VolumeStore::new(Arc::clone(&self.kv), self.keys.volume.clone())
    }

    /// Resolve the catalog through the cache. When the storage cannot be
    /// reached at all a fresh cached catalog is still used.
    pub fn load_catalog(&self, force_refresh: bool) -> Result<Vec<CatalogEntry>, CatalogError> {
        let cache = self.catalog_cache();
        match self.catalog_client() {
            Ok(client) => resolve_catalog(&client, &cache, force_refresh),
            Err(e) => match cache.load() {
                Some(cached) => {
                    warn!("{e}; using the cached catalog");
                    Ok(cached.entries)
                }
                None => Err(e.into()),
            },
        }
    }
}
