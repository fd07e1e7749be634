use std::sync::Arc;

use super::*;
use crate::store::{KvStore, MemoryKvStore, StoreKeys};
use crate::test_support::entry;

fn stores() -> (Arc<MemoryKvStore>, StoreKeys) {
    (Arc::new(MemoryKvStore::new()), StoreKeys::new("test"))
}

#[test]
fn unknown_tracks_read_as_zero() {
    let (kv, keys) = stores();
    let progress = ProgressStore::open(kv, keys.progress, 1);
    assert_eq!(progress.get("Disk 2/01 Intro.mp3"), 0);
}

#[test]
fn record_applies_the_write_threshold() {
    let (kv, keys) = stores();
    let mut progress = ProgressStore::open(kv, keys.progress, 1);
    let path = "Disk 1/01 Intro.mp3";

    let stored: Vec<bool> = [10u8, 25, 24, 100]
        .iter()
        .map(|&p| progress.record(path, p))
        .collect();

    assert_eq!(stored, vec![true, true, false, true]);
    assert_eq!(progress.get(path), 100);
}

#[test]
fn record_needs_more_than_one_step_of_growth() {
    let (kv, keys) = stores();
    let mut progress = ProgressStore::open(kv, keys.progress, 1);
    let path = "a.mp3";

    assert!(progress.record(path, 10));
    assert!(!progress.record(path, 11));
    assert_eq!(progress.get(path), 10);
    assert!(progress.record(path, 12));
    assert_eq!(progress.get(path), 12);
}

#[test]
fn record_always_accepts_completion_once() {
    let (kv, keys) = stores();
    let mut progress = ProgressStore::open(kv, keys.progress, 5);
    let path = "a.mp3";

    assert!(progress.record(path, 97));
    assert!(progress.record(path, 100));
    assert!(!progress.record(path, 100));
    assert!(!progress.record(path, 40));
    assert_eq!(progress.get(path), 100);
}

#[test]
fn set_overwrites_and_clamps() {
    let (kv, keys) = stores();
    let mut progress = ProgressStore::open(kv, keys.progress, 1);
    progress.set("a.mp3", 80);
    progress.set("a.mp3", 30);
    assert_eq!(progress.get("a.mp3"), 30);
    progress.set("a.mp3", 250);
    assert_eq!(progress.get("a.mp3"), 100);
}

#[test]
fn progress_survives_reopen() {
    let (kv, keys) = stores();
    {
        let mut progress = ProgressStore::open(kv.clone(), keys.progress.clone(), 1);
        progress.record("a.mp3", 40);
        progress.record("b.mp3", 100);
    }
    let progress = ProgressStore::open(kv, keys.progress, 1);
    assert_eq!(progress.get("a.mp3"), 40);
    assert_eq!(progress.get("b.mp3"), 100);
    assert_eq!(progress.records().len(), 2);
}

#[test]
fn corrupt_progress_blob_starts_empty() {
    let (kv, keys) = stores();
    kv.set(&keys.progress, "not json at all").unwrap();
    let progress = ProgressStore::open(kv, keys.progress, 1);
    assert!(progress.records().is_empty());
}

#[test]
fn aggregate_matches_the_two_group_scenario() {
    let (kv, keys) = stores();
    let mut progress = ProgressStore::open(kv, keys.progress, 1);
    let entries = vec![
        entry("A", "1 One.mp3"),
        entry("A", "2 Two.mp3"),
        entry("A", "3 Three.mp3"),
        entry("B", "1 Four.mp3"),
        entry("B", "2 Five.mp3"),
    ];
    progress.set(&entries[0].storage_path, 100);
    progress.set(&entries[1].storage_path, 100);
    progress.set(&entries[2].storage_path, 50);

    let summary = progress.aggregate(&entries);
    assert_eq!(summary.completed, 2);
    assert_eq!(summary.overall_percent, 50);
    assert_eq!(summary.total, 5);
}

#[test]
fn aggregate_ignores_records_outside_the_catalog() {
    let (kv, keys) = stores();
    let mut progress = ProgressStore::open(kv, keys.progress, 1);
    progress.set("old/removed.mp3", 100);
    let entries = vec![entry("A", "1 One.mp3"), entry("A", "2 Two.mp3")];
    progress.set(&entries[0].storage_path, 25);

    let summary = progress.aggregate(&entries);
    assert_eq!(summary.completed, 0);
    assert_eq!(summary.overall_percent, 13);
}

#[test]
fn aggregate_of_empty_catalog_is_zero() {
    let (kv, keys) = stores();
    let progress = ProgressStore::open(kv, keys.progress, 1);
    assert_eq!(progress.aggregate(&[]), ProgressSummary::default());
}

#[test]
fn volume_defaults_to_full_and_round_trips() {
    let (kv, keys) = stores();
    let volume = VolumeStore::new(kv, keys.volume);
    assert_eq!(volume.load(), DEFAULT_VOLUME);
    volume.save(0.3);
    assert_eq!(volume.load(), 0.3);
}

#[test]
fn volume_is_clamped_on_save() {
    let (kv, keys) = stores();
    let volume = VolumeStore::new(kv, keys.volume);
    volume.save(1.7);
    assert_eq!(volume.load(), 1.0);
    volume.save(-0.5);
    assert_eq!(volume.load(), 0.0);
}

#[test]
fn clamp_volume_handles_nan() {
    assert_eq!(clamp_volume(f32::NAN), DEFAULT_VOLUME);
    assert_eq!(clamp_volume(0.5), 0.5);
}
