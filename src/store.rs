//! Local durable key/value persistence.
//!
//! Everything the player remembers between sessions (the resolved catalog,
//! per-track progress and the volume) is a JSON string stored under a
//! namespaced key. Values are wrapped in a versioned envelope so a schema
//! change reads as a miss instead of a crash.

mod kv;
mod versioned;

pub use kv::*;
pub use versioned::*;
