use std::time::{SystemTime, UNIX_EPOCH};

use log::warn;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::StoreError;

use super::kv::KvStore;

/// Bump when the shape of any persisted payload changes.
pub const SCHEMA_VERSION: u32 = 1;

/// Envelope written around every persisted payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Versioned<T> {
    pub version: u32,
    pub saved_at_ms: u64,
    pub data: T,
}

impl<T> Versioned<T> {
    pub fn new(data: T, saved_at_ms: u64) -> Self {
        Self {
            version: SCHEMA_VERSION,
            saved_at_ms,
            data,
        }
    }
}

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Serialize `data` into an envelope and write it under `key`.
pub fn write_versioned<T: Serialize>(
    store: &dyn KvStore,
    key: &str,
    data: &T,
    saved_at_ms: u64,
) -> Result<(), StoreError> {
    let blob = serde_json::to_string(&Versioned::new(data, saved_at_ms))?;
    store.set(key, &blob)
}

/// Read an envelope back.
///
/// Missing keys, unreadable JSON and foreign schema versions all come back as
/// `None`; only the store itself failing is an error.
pub fn read_versioned<T: DeserializeOwned>(
    store: &dyn KvStore,
    key: &str,
) -> Result<Option<Versioned<T>>, StoreError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };

    let envelope: Versioned<T> = match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(e) => {
            warn!("ignoring unreadable value for {key}: {e}");
            return Ok(None);
        }
    };

    if envelope.version != SCHEMA_VERSION {
        warn!(
            "ignoring {key}: schema version {} (expected {SCHEMA_VERSION})",
            envelope.version
        );
        return Ok(None);
    }

    Ok(Some(envelope))
}
