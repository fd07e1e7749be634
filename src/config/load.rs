use std::{env, path::PathBuf, time::Duration};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` reads an optional config file, lets environment variables
/// (prefix `PREPCAST__`) override it and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("PREPCAST")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("catalog.groups")
                .with_list_parse_key("catalog.extensions")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.storage.list_limit == 0 {
            return Err("storage.list_limit must be >= 1".to_string());
        }
        if self.storage.list_timeout_secs == 0 {
            return Err("storage.list_timeout_secs must be >= 1".to_string());
        }
        if self.catalog.cache_ttl_hours == 0 {
            return Err("catalog.cache_ttl_hours must be >= 1".to_string());
        }
        if !(self.playback.volume_step > 0.0 && self.playback.volume_step <= 1.0) {
            return Err("playback.volume_step must be in (0, 1]".to_string());
        }
        if self.persistence.namespace.trim().is_empty() {
            return Err("persistence.namespace must not be empty".to_string());
        }
        Ok(())
    }

    /// Catalog freshness window.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.catalog.cache_ttl_hours.saturating_mul(3600))
    }

    pub fn list_timeout(&self) -> Duration {
        Duration::from_secs(self.storage.list_timeout_secs)
    }

    pub fn media_timeout(&self) -> Duration {
        Duration::from_secs(self.storage.media_timeout_secs)
    }

    /// Directory for persisted state; `None` only when no platform dir exists.
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.persistence
            .data_dir
            .clone()
            .or_else(|| dirs::data_local_dir().map(|d| d.join("prepcast")))
    }

    /// Directory for downloaded tracks.
    pub fn media_cache_dir(&self) -> PathBuf {
        self.persistence
            .media_cache_dir
            .clone()
            .or_else(|| dirs::cache_dir().map(|d| d.join("prepcast").join("media")))
            .unwrap_or_else(|| env::temp_dir().join("prepcast-media"))
    }

    /// Log file used by the player.
    pub fn log_file(&self) -> PathBuf {
        self.log.file.clone().unwrap_or_else(|| {
            self.data_dir()
                .unwrap_or_else(env::temp_dir)
                .join("prepcast.log")
        })
    }

    /// Copy of the settings that is safe to print.
    pub fn redacted(&self) -> Settings {
        let mut s = self.clone();
        if !s.storage.api_key.is_empty() {
            s.storage.api_key = "********".to_string();
        }
        s
    }
}

/// Resolve the config path from `PREPCAST_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("PREPCAST_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/prepcast/config.toml`
/// or `~/.config/prepcast/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else if let Some(home) = env::var_os("HOME") {
        Some(PathBuf::from(home).join(".config"))
    } else {
        None
    };

    config_home.map(|d| d.join("prepcast").join("config.toml"))
}
