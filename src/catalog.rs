//! Remote audio catalog: listing, parsing, caching.
//!
//! The catalog is the ordered set of playable tracks found under a fixed list
//! of group prefixes in the storage bucket. Resolving it goes through the
//! local cache first; only a miss (or an explicit refresh) hits the network.

mod cache;
mod client;
mod model;
mod parse;
mod storage;

pub use cache::*;
pub use client::*;
pub use model::*;
pub use parse::*;
pub use storage::*;

use log::{info, warn};

use crate::error::CatalogError;
use crate::navigator::sort_canonical;
use crate::store::now_millis;

/// Resolve the catalog: cached copy if fresh, otherwise list every group,
/// order canonically and write the result back to the cache.
///
/// A listing where any group failed is returned but not cached, so the next
/// start lists again instead of serving the gap for a whole TTL.
pub fn resolve_catalog(
    client: &CatalogClient,
    cache: &CatalogCache,
    force_refresh: bool,
) -> Result<Vec<CatalogEntry>, CatalogError> {
    if !force_refresh {
        if let Some(cached) = cache.load() {
            info!("catalog: {} entries from cache", cached.entries.len());
            return Ok(cached.entries);
        }
    }

    let listing = client.fetch_all()?;
    let complete = listing.is_complete();
    let mut entries = listing.entries;
    sort_canonical(&mut entries, client.group_labels());
    if complete {
        cache.store(&entries, now_millis());
    } else {
        warn!(
            "catalog: not caching, {} group(s) failed: {:?}",
            listing.failed.len(),
            listing.failed
        );
    }
    info!("catalog: {} entries from storage", entries.len());
    Ok(entries)
}
