use std::path::{Path, PathBuf};

use log::warn;
use walkdir::WalkDir;

use crate::error::UploadError;

/// Extensions the uploader picks up.
pub const UPLOAD_EXTENSIONS: [&str; 6] = ["mp3", "wav", "ogg", "m4a", "aac", "flac"];

/// A local audio file and where it goes in the bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAudio {
    pub local_path: PathBuf,
    /// Path relative to the scanned root, always `/`-separated.
    pub storage_path: String,
    pub file_name: String,
    pub size: u64,
}

fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

pub fn is_upload_candidate(name: &str) -> bool {
    extension_of(name).is_some_and(|ext| UPLOAD_EXTENSIONS.contains(&ext.as_str()))
}

/// MIME type sent with an upload.
pub fn content_type_for(name: &str) -> &'static str {
    match extension_of(name).as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("ogg") => "audio/ogg",
        Some("m4a") => "audio/mp4",
        Some("aac") => "audio/aac",
        Some("flac") => "audio/flac",
        _ => "application/octet-stream",
    }
}

/// Recursively collect audio files under `dir`, sorted by storage path.
/// Hidden files and directories are skipped.
pub fn scan_upload_dir(dir: &Path) -> Result<Vec<LocalAudio>, UploadError> {
    if !dir.is_dir() {
        return Err(UploadError::NotADirectory(dir.display().to_string()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()))
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("skipping unreadable entry: {e}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if !is_upload_candidate(&file_name) {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(dir) else {
            continue;
        };
        let storage_path = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let size = match entry.metadata() {
            Ok(m) => m.len(),
            Err(e) => {
                warn!("skipping {}: {e}", entry.path().display());
                continue;
            }
        };

        files.push(LocalAudio {
            local_path: entry.path().to_path_buf(),
            storage_path,
            file_name,
            size,
        });
    }

    files.sort_by(|a, b| a.storage_path.cmp(&b.storage_path));
    Ok(files)
}
