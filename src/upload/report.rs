use std::fs;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::UploadError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub local_path: String,
    pub storage_path: String,
    pub public_url: String,
    pub file_name: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedUpload {
    pub storage_path: String,
    pub error: String,
}

/// What an upload run did, written as JSON next to the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReport {
    /// RFC 3339, UTC.
    pub timestamp: String,
    pub summary: UploadSummary,
    pub files: Vec<UploadedFile>,
    pub failed: Vec<FailedUpload>,
}

impl UploadReport {
    pub fn new(total: usize, files: Vec<UploadedFile>, failed: Vec<FailedUpload>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            summary: UploadSummary {
                total,
                successful: files.len(),
                failed: failed.len(),
            },
            files,
            failed,
        }
    }
}

pub fn write_report(report: &UploadReport, path: &Path) -> Result<(), UploadError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    Ok(())
}
