use std::sync::Arc;

use log::warn;

use crate::store::{KvStore, now_millis, read_versioned, write_versioned};

pub const DEFAULT_VOLUME: f32 = 1.0;

/// Clamp a volume into `[0, 1]`; NaN becomes the default.
pub fn clamp_volume(v: f32) -> f32 {
    if v.is_nan() {
        DEFAULT_VOLUME
    } else {
        v.clamp(0.0, 1.0)
    }
}

/// The persisted playback volume, independent of any track.
pub struct VolumeStore {
    store: Arc<dyn KvStore>,
    key: String,
}

impl VolumeStore {
    pub fn new(store: Arc<dyn KvStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Saved volume, or full volume when nothing usable is stored.
    pub fn load(&self) -> f32 {
        match read_versioned::<f32>(self.store.as_ref(), &self.key) {
            Ok(Some(v)) => clamp_volume(v.data),
            Ok(None) => DEFAULT_VOLUME,
            Err(e) => {
                warn!("volume unreadable: {e}");
                DEFAULT_VOLUME
            }
        }
    }

    pub fn save(&self, volume: f32) {
        let volume = clamp_volume(volume);
        if let Err(e) = write_versioned(self.store.as_ref(), &self.key, &volume, now_millis()) {
            warn!("failed to save volume: {e}");
        }
    }
}
