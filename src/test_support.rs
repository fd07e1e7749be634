//! Fakes and builders shared by unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::audio::MediaSink;
use crate::catalog::{CatalogEntry, ObjectStorage, StorageObject, split_track_name};
use crate::error::{MediaError, StorageError};

/// A catalog entry for `file_name` inside `group`, parsed like a listed object.
pub fn entry(group: &str, file_name: &str) -> CatalogEntry {
    let (sequence_number, display_title) = split_track_name(file_name, "mp3");
    CatalogEntry {
        file_name: file_name.to_string(),
        storage_path: format!("{group}/{file_name}"),
        public_url: format!("https://cdn.test/{group}/{file_name}"),
        group_label: group.to_string(),
        sequence_number,
        display_title,
    }
}

/// In-memory object storage with scripted listings.
#[derive(Default)]
pub struct FakeStorage {
    listings: HashMap<String, Result<Vec<String>, u16>>,
    delays: HashMap<String, Duration>,
    failing_uploads: HashSet<String>,
    pub uploads: Mutex<Vec<(String, usize, String)>>,
    pub list_calls: Mutex<Vec<String>>,
}

impl FakeStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listing(mut self, prefix: &str, names: &[&str]) -> Self {
        self.listings.insert(
            prefix.to_string(),
            Ok(names.iter().map(|n| n.to_string()).collect()),
        );
        self
    }

    pub fn with_error(mut self, prefix: &str, status: u16) -> Self {
        self.listings.insert(prefix.to_string(), Err(status));
        self
    }

    pub fn with_delay(mut self, prefix: &str, delay: Duration) -> Self {
        self.delays.insert(prefix.to_string(), delay);
        self
    }

    pub fn failing_upload(mut self, path: &str) -> Self {
        self.failing_uploads.insert(path.to_string());
        self
    }

    pub fn uploaded_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .uploads
            .lock()
            .unwrap()
            .iter()
            .map(|(p, _, _)| p.clone())
            .collect();
        paths.sort();
        paths
    }
}

impl ObjectStorage for FakeStorage {
    fn list(
        &self,
        prefix: &str,
        _limit: usize,
        _offset: usize,
    ) -> Result<Vec<StorageObject>, StorageError> {
        self.list_calls.lock().unwrap().push(prefix.to_string());
        if let Some(delay) = self.delays.get(prefix) {
            thread::sleep(*delay);
        }
        match self.listings.get(prefix) {
            Some(Ok(names)) => Ok(names
                .iter()
                .map(|n| StorageObject {
                    name: n.clone(),
                    id: Some(format!("id-{n}")),
                })
                .collect()),
            Some(Err(status)) => Err(StorageError::Status {
                status: *status,
                body: "scripted failure".into(),
            }),
            None => Ok(Vec::new()),
        }
    }

    fn public_url(&self, path: &str) -> String {
        format!("https://cdn.test/{path}")
    }

    fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StorageError> {
        if self.failing_uploads.contains(path) {
            return Err(StorageError::Status {
                status: 413,
                body: "too large".into(),
            });
        }
        self.uploads
            .lock()
            .unwrap()
            .push((path.to_string(), bytes.len(), content_type.to_string()));
        Ok(())
    }
}

/// Observable state behind a [`FakeSink`].
#[derive(Debug, Default)]
pub struct FakeMedia {
    pub loaded: Vec<String>,
    pub playing: bool,
    pub position: Duration,
    pub finished: bool,
    pub volume: f32,
    pub duration: Option<Duration>,
    pub failing: HashSet<String>,
    pub seeks: Vec<Duration>,
}

/// A media sink driven by the test through a shared [`FakeMedia`].
pub struct FakeSink {
    pub media: Arc<Mutex<FakeMedia>>,
}

impl FakeSink {
    /// A sink whose tracks all last `duration`, plus the handle to steer it.
    pub fn new(duration: Option<Duration>) -> (Self, Arc<Mutex<FakeMedia>>) {
        let media = Arc::new(Mutex::new(FakeMedia {
            duration,
            ..FakeMedia::default()
        }));
        (
            Self {
                media: Arc::clone(&media),
            },
            media,
        )
    }
}

impl MediaSink for FakeSink {
    fn load(&mut self, entry: &CatalogEntry) -> Result<Option<Duration>, MediaError> {
        let mut m = self.media.lock().unwrap();
        if m.failing.contains(&entry.storage_path) {
            return Err(MediaError::Decode(format!("cannot decode {}", entry.file_name)));
        }
        m.loaded.push(entry.storage_path.clone());
        m.playing = false;
        m.finished = false;
        m.position = Duration::ZERO;
        Ok(m.duration)
    }

    fn play(&mut self) {
        self.media.lock().unwrap().playing = true;
    }

    fn pause(&mut self) {
        self.media.lock().unwrap().playing = false;
    }

    fn seek(&mut self, to: Duration) -> Result<(), MediaError> {
        let mut m = self.media.lock().unwrap();
        // Like a rodio sink: one that ran dry was never paused, so the
        // rebuilt source plays.
        if m.finished {
            m.playing = true;
        }
        m.position = to;
        m.finished = false;
        m.seeks.push(to);
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.media.lock().unwrap().volume = volume;
    }

    fn position(&self) -> Duration {
        self.media.lock().unwrap().position
    }

    fn is_finished(&self) -> bool {
        self.media.lock().unwrap().finished
    }
}
