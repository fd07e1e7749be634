use std::sync::LazyLock;

use regex::Regex;

use super::model::{CatalogEntry, GroupSpec};
use super::storage::ObjectStorage;

static TRACK_NAME: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(.+)$").ok());

/// Return the extension of `name` if it is one of `extensions` (case-insensitive).
pub fn audio_extension<'a>(name: &'a str, extensions: &[String]) -> Option<&'a str> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    let wanted = extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.'))
        .filter(|e| !e.is_empty())
        .any(|e| e.eq_ignore_ascii_case(ext));
    wanted.then_some(ext)
}

/// Split `"12 Some Title.mp3"` into `(Some(12), "Some Title")`.
///
/// Names without a leading number keep the whole stem as title.
pub fn split_track_name(file_name: &str, ext: &str) -> (Option<u32>, String) {
    let stem = file_name
        .strip_suffix(ext)
        .and_then(|s| s.strip_suffix('.'))
        .unwrap_or(file_name);

    if let Some(caps) = TRACK_NAME.as_ref().and_then(|re| re.captures(stem)) {
        if let Ok(n) = caps[1].parse::<u32>() {
            return (Some(n), caps[2].to_string());
        }
    }
    (None, stem.to_string())
}

/// Turn one listed object into a catalog entry, or `None` when it is not audio.
pub fn parse_entry(
    group: &GroupSpec,
    object_name: &str,
    extensions: &[String],
    storage: &dyn ObjectStorage,
) -> Option<CatalogEntry> {
    let ext = audio_extension(object_name, extensions)?;
    let (sequence_number, display_title) = split_track_name(object_name, ext);
    let storage_path = format!("{}/{}", group.prefix, object_name);
    let public_url = storage.public_url(&storage_path);

    Some(CatalogEntry {
        file_name: object_name.to_string(),
        storage_path,
        public_url,
        group_label: group.label.clone(),
        sequence_number,
        display_title,
    })
}
