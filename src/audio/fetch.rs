use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info};
use reqwest::blocking::Client;

use crate::catalog::CatalogEntry;
use crate::error::{MediaError, StorageError};

/// Downloads track media into a local cache directory.
///
/// Files are kept after playback; a track that was fetched once is played
/// from disk afterwards.
pub struct MediaFetcher {
    client: Client,
    cache_dir: PathBuf,
}

impl MediaFetcher {
    pub fn new(cache_dir: impl Into<PathBuf>, timeout: Duration) -> Result<Self, MediaError> {
        let client = Client::builder()
            .user_agent(concat!("prepcast/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(StorageError::from)?;
        Ok(Self {
            client,
            cache_dir: cache_dir.into(),
        })
    }

    /// Local path the media of `entry` is (or will be) cached at.
    pub fn cached_path(&self, entry: &CatalogEntry) -> PathBuf {
        self.cache_dir.join(cache_file_name(&entry.storage_path))
    }

    /// Return a local file holding the media of `entry`, downloading it first
    /// when it is not cached yet.
    pub fn fetch(&self, entry: &CatalogEntry) -> Result<PathBuf, MediaError> {
        let path = self.cached_path(entry);
        if path.is_file() {
            debug!("media cache hit: {}", path.display());
            return Ok(path);
        }

        fs::create_dir_all(&self.cache_dir)?;
        let mut part = path.clone().into_os_string();
        part.push(".part");
        let part = PathBuf::from(part);

        let result = self.download(&entry.public_url, &part);
        if result.is_err() {
            let _ = fs::remove_file(&part);
        }
        let bytes = result?;

        fs::rename(&part, &path)?;
        info!("downloaded {} ({bytes} bytes)", entry.storage_path);
        Ok(path)
    }

    fn download(&self, url: &str, to: &Path) -> Result<u64, MediaError> {
        let mut response = self.client.get(url).send().map_err(StorageError::from)?;
        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Status {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            }
            .into());
        }

        let mut file = File::create(to)?;
        let bytes = response.copy_to(&mut file).map_err(StorageError::from)?;
        file.sync_all()?;
        Ok(bytes)
    }
}

/// Flatten a storage path into a single file name.
///
/// The path is percent-encoded as a whole, separators included, so distinct
/// storage paths never share a cache file and the name has no separators.
pub fn cache_file_name(storage_path: &str) -> String {
    let encoded = urlencoding::encode(storage_path);
    if encoded.is_empty() {
        return "_".to_string();
    }
    // `encode` leaves dots alone; `%2E` never comes out of it otherwise.
    if let Some(rest) = encoded.strip_prefix('.') {
        return format!("%2E{rest}");
    }
    encoded.into_owned()
}
