use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/prepcast/config.toml` or `~/.config/prepcast/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `PREPCAST__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub storage: StorageSettings,
    pub catalog: CatalogSettings,
    pub persistence: PersistenceSettings,
    pub playback: PlaybackSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Base URL of the storage project, e.g. `https://<ref>.supabase.co`.
    pub endpoint: String,
    /// Key sent as both `apikey` and bearer token.
    pub api_key: String,
    /// Bucket holding the audio library.
    pub bucket: String,
    /// Page size of a single listing call. Only the first page is requested.
    pub list_limit: usize,
    /// Per-group listing timeout (seconds).
    pub list_timeout_secs: u64,
    /// Timeout for downloading a single track (seconds).
    pub media_timeout_secs: u64,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            bucket: "ca1-audio-files".to_string(),
            list_limit: 100,
            list_timeout_secs: 10,
            media_timeout_secs: 180,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Common folder the group directories live under. May be empty.
    pub root: String,
    /// Group directories, in display order. Position in this list is the group rank.
    pub groups: Vec<String>,
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// How long a resolved catalog stays fresh (hours).
    pub cache_ttl_hours: u64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            root: "CA1 Sound Revision".to_string(),
            groups: vec![
                "Disk 1 (Part 1- Part 2)".to_string(),
                "Disk 2".to_string(),
                "Disk 3".to_string(),
                "Disk 4".to_string(),
                "Disk 5".to_string(),
            ],
            extensions: vec!["mp3".into()],
            cache_ttl_hours: 24,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PersistenceSettings {
    /// Where progress, volume and the catalog cache are kept.
    /// Defaults to the platform data dir (`~/.local/share/prepcast` on Linux).
    pub data_dir: Option<PathBuf>,
    /// Prefix for every persisted key.
    pub namespace: String,
    /// Where downloaded tracks are kept. Defaults to the platform cache dir.
    pub media_cache_dir: Option<PathBuf>,
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        Self {
            data_dir: None,
            namespace: "prepcast".to_string(),
            media_cache_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Progress is only persisted when it grows by more than this many percent
    /// (or reaches 100).
    pub progress_step: u8,
    /// Start playing automatically after advancing past a finished track.
    pub continue_on_end: bool,
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub scrub_seconds: u64,
    /// Volume change per `+` / `-` key press.
    pub volume_step: f32,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            progress_step: 1,
            continue_on_end: false,
            scrub_seconds: 5,
            volume_step: 0.1,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default filter when `RUST_LOG` is not set.
    pub level: String,
    /// Log file used by the player. Defaults to `<data_dir>/prepcast.log`.
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}
