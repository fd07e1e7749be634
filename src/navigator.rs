//! Canonical track ordering and position tracking.
//!
//! Canonical order is group-major (by configured rank), then by sequence
//! number ascending. Entries without a sequence number go last inside their
//! group; remaining ties break on title and finally on storage path, so the
//! order is total and stable across runs.

use std::cmp::Ordering;

use crate::catalog::CatalogEntry;
use crate::progress::{ProgressStore, ProgressSummary};

fn group_rank(label: &str, group_order: &[String]) -> usize {
    group_order
        .iter()
        .position(|g| g == label)
        .unwrap_or(usize::MAX)
}

/// Compare two entries in canonical order.
pub fn compare_entries(a: &CatalogEntry, b: &CatalogEntry, group_order: &[String]) -> Ordering {
    group_rank(&a.group_label, group_order)
        .cmp(&group_rank(&b.group_label, group_order))
        .then_with(|| a.group_label.cmp(&b.group_label))
        .then_with(|| match (a.sequence_number, b.sequence_number) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.display_title.cmp(&b.display_title))
        .then_with(|| a.storage_path.cmp(&b.storage_path))
}

/// Sort `entries` into canonical order in place.
pub fn sort_canonical(entries: &mut [CatalogEntry], group_order: &[String]) {
    entries.sort_by(|a, b| compare_entries(a, b, group_order));
}

/// A run of consecutive entries sharing a group label.
#[derive(Debug)]
pub struct TrackGroup<'a> {
    pub label: &'a str,
    /// `(index into the canonical sequence, entry)` pairs.
    pub tracks: Vec<(usize, &'a CatalogEntry)>,
}

/// The canonical sequence plus the position of the current track.
#[derive(Debug, Clone, Default)]
pub struct TrackNavigator {
    entries: Vec<CatalogEntry>,
    current: Option<usize>,
}

impl TrackNavigator {
    /// Build a navigator over `entries`, sorting them canonically.
    /// The first entry (if any) becomes current.
    pub fn new(mut entries: Vec<CatalogEntry>, group_order: &[String]) -> Self {
        sort_canonical(&mut entries, group_order);
        let current = if entries.is_empty() { None } else { Some(0) };
        Self { entries, current }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_entry(&self) -> Option<&CatalogEntry> {
        self.current.and_then(|i| self.entries.get(i))
    }

    /// Move to `index`. Returns `false` (and changes nothing) when out of range.
    pub fn set_current(&mut self, index: usize) -> bool {
        if index < self.entries.len() {
            self.current = Some(index);
            true
        } else {
            false
        }
    }

    pub fn has_next(&self) -> bool {
        self.next_index().is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.previous_index().is_some()
    }

    /// Index after the current one. No wraparound.
    pub fn next_index(&self) -> Option<usize> {
        let i = self.current?;
        (i + 1 < self.entries.len()).then_some(i + 1)
    }

    /// Index before the current one. No wraparound.
    pub fn previous_index(&self) -> Option<usize> {
        self.current?.checked_sub(1)
    }

    /// Entries grouped by label, in canonical order.
    pub fn grouped(&self) -> Vec<TrackGroup<'_>> {
        let mut groups: Vec<TrackGroup<'_>> = Vec::new();
        for (i, entry) in self.entries.iter().enumerate() {
            match groups.last_mut() {
                Some(g) if g.label == entry.group_label => g.tracks.push((i, entry)),
                _ => groups.push(TrackGroup {
                    label: &entry.group_label,
                    tracks: vec![(i, entry)],
                }),
            }
        }
        groups
    }

    /// Aggregate progress over the whole canonical sequence.
    pub fn aggregate(&self, progress: &ProgressStore) -> ProgressSummary {
        progress.aggregate(&self.entries)
    }
}
