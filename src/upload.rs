//! Batch uploader: mirrors a local folder of audio files into the bucket.
//!
//! Files are uploaded with upsert in small concurrent batches with a pause
//! in between. Per-file failures end up in the report; they never abort the
//! run.

mod report;
mod scan;

pub use report::*;
pub use scan::*;

use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;

use log::{info, warn};

use crate::catalog::ObjectStorage;
use crate::error::{StorageError, UploadError};

/// Pause between two batches.
pub const BATCH_PAUSE: Duration = Duration::from_secs(1);

/// Scan `dir`, upload everything found and write the report to `report_path`.
pub fn run_upload(
    storage: &dyn ObjectStorage,
    dir: &Path,
    batch_size: usize,
    report_path: &Path,
) -> Result<UploadReport, UploadError> {
    let files = scan_upload_dir(dir)?;
    if files.is_empty() {
        warn!("no audio files under {}", dir.display());
    } else {
        info!("found {} audio files under {}", files.len(), dir.display());
    }

    let report = upload_files(storage, &files, batch_size, BATCH_PAUSE);
    write_report(&report, report_path)?;
    info!(
        "upload finished: {} ok, {} failed; report at {}",
        report.summary.successful,
        report.summary.failed,
        report_path.display()
    );
    Ok(report)
}

/// Upload `files` in batches of `batch_size` concurrent requests.
pub fn upload_files(
    storage: &dyn ObjectStorage,
    files: &[LocalAudio],
    batch_size: usize,
    pause: Duration,
) -> UploadReport {
    let batch_size = batch_size.max(1);
    let batches = files.len().div_ceil(batch_size);
    let mut uploaded = Vec::new();
    let mut failed = Vec::new();

    for (n, batch) in files.chunks(batch_size).enumerate() {
        if n > 0 && !pause.is_zero() {
            thread::sleep(pause);
        }
        info!("uploading batch {}/{batches}", n + 1);

        let results: Vec<(&LocalAudio, Result<(), String>)> = thread::scope(|s| {
            let handles: Vec<_> = batch
                .iter()
                .map(|file| (file, s.spawn(move || upload_one(storage, file))))
                .collect();
            handles
                .into_iter()
                .map(|(file, h)| {
                    let result = match h.join() {
                        Ok(r) => r.map_err(|e| e.to_string()),
                        Err(_) => Err("upload worker panicked".to_string()),
                    };
                    (file, result)
                })
                .collect()
        });

        for (file, result) in results {
            match result {
                Ok(()) => {
                    info!("uploaded {}", file.storage_path);
                    uploaded.push(UploadedFile {
                        local_path: file.local_path.display().to_string(),
                        storage_path: file.storage_path.clone(),
                        public_url: storage.public_url(&file.storage_path),
                        file_name: file.file_name.clone(),
                        size: file.size,
                    });
                }
                Err(error) => {
                    warn!("failed to upload {}: {error}", file.storage_path);
                    failed.push(FailedUpload {
                        storage_path: file.storage_path.clone(),
                        error,
                    });
                }
            }
        }
    }

    UploadReport::new(files.len(), uploaded, failed)
}

fn upload_one(storage: &dyn ObjectStorage, file: &LocalAudio) -> Result<(), StorageError> {
    let bytes = fs::read(&file.local_path)?;
    storage.upload(&file.storage_path, bytes, content_type_for(&file.file_name))
}
