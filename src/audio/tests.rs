use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::*;
use crate::navigator::TrackNavigator;
use crate::progress::{ProgressStore, VolumeStore};
use crate::store::{MemoryKvStore, StoreKeys};
use crate::test_support::{FakeMedia, FakeSink, entry};

const MINUTE: Duration = Duration::from_secs(60);

struct Rig {
    controller: PlaybackController<FakeSink>,
    media: Arc<Mutex<FakeMedia>>,
    kv: Arc<MemoryKvStore>,
    keys: StoreKeys,
}

fn rig_with(names: &[&str], continue_on_end: bool, kv: Arc<MemoryKvStore>) -> Rig {
    let keys = StoreKeys::new("test");
    let entries = names.iter().map(|n| entry("Disk 1", n)).collect();
    let navigator = TrackNavigator::new(entries, &["Disk 1".to_string()]);
    let progress = ProgressStore::open(kv.clone(), keys.progress.clone(), 1);
    let volume = VolumeStore::new(kv.clone(), keys.volume.clone());
    let (sink, media) = FakeSink::new(Some(MINUTE));
    let controller = PlaybackController::new(sink, navigator, progress, volume, continue_on_end);
    Rig {
        controller,
        media,
        kv,
        keys,
    }
}

fn rig(names: &[&str]) -> Rig {
    rig_with(names, false, Arc::new(MemoryKvStore::new()))
}

fn three() -> Rig {
    rig(&["1 One.mp3", "2 Two.mp3", "3 Three.mp3"])
}

/// Select the first track and let it load.
fn started(mut r: Rig) -> Rig {
    r.controller.start();
    r.controller.tick();
    r
}

#[test]
fn starts_idle_then_loads_first_track_paused() {
    let mut r = three();
    assert_eq!(r.controller.state(), PlayerState::Idle);

    r.controller.start();
    assert_eq!(r.controller.state(), PlayerState::Loading);
    assert_eq!(r.controller.current_index(), Some(0));

    r.controller.tick();
    assert_eq!(r.controller.state(), PlayerState::Paused);
    assert_eq!(r.controller.duration(), Some(MINUTE));
    assert!(!r.media.lock().unwrap().playing);
    assert_eq!(r.media.lock().unwrap().loaded, vec!["Disk 1/1 One.mp3"]);
}

#[test]
fn empty_catalog_stays_idle() {
    let mut r = rig(&[]);
    r.controller.start();
    r.controller.tick();
    assert_eq!(r.controller.state(), PlayerState::Idle);
    r.controller.play_pause();
    r.controller.next();
    assert_eq!(r.controller.state(), PlayerState::Idle);
    assert_eq!(r.controller.current_index(), None);
}

#[test]
fn play_pause_toggles() {
    let mut r = started(three());
    r.controller.play_pause();
    assert_eq!(r.controller.state(), PlayerState::Playing);
    assert!(r.media.lock().unwrap().playing);

    r.controller.play_pause();
    assert_eq!(r.controller.state(), PlayerState::Paused);
    assert!(!r.media.lock().unwrap().playing);
}

#[test]
fn play_pause_while_loading_starts_the_track_once_loaded() {
    let mut r = three();
    r.controller.start();
    r.controller.play_pause();
    assert_eq!(r.controller.state(), PlayerState::Loading);

    r.controller.tick();
    assert_eq!(r.controller.state(), PlayerState::Playing);
    assert!(r.media.lock().unwrap().playing);
}

#[test]
fn second_play_pause_while_loading_cancels_the_first() {
    let mut r = three();
    r.controller.start();
    r.controller.play_pause();
    r.controller.play_pause();
    r.controller.tick();
    assert_eq!(r.controller.state(), PlayerState::Paused);
    assert!(!r.media.lock().unwrap().playing);
}

#[test]
fn select_then_play_in_one_batch_plays_the_new_track() {
    let mut r = started(three());
    r.controller.apply(AudioCmd::Select(2));
    r.controller.apply(AudioCmd::PlayPause);
    r.controller.tick();
    assert_eq!(r.controller.current_index(), Some(2));
    assert_eq!(r.controller.state(), PlayerState::Playing);
}

#[test]
fn previous_at_first_track_is_a_no_op() {
    let mut r = started(three());
    r.controller.previous();
    assert_eq!(r.controller.current_index(), Some(0));
    assert_eq!(r.controller.state(), PlayerState::Paused);
    assert!(!r.controller.is_playing());
    assert!(!r.controller.snapshot().has_previous);
}

#[test]
fn next_at_last_track_is_a_no_op() {
    let mut r = started(three());
    r.controller.select(2);
    r.controller.tick();
    r.controller.play_pause();

    r.controller.next();
    assert_eq!(r.controller.current_index(), Some(2));
    assert_eq!(r.controller.state(), PlayerState::Playing);
}

#[test]
fn changing_track_pauses_playback() {
    let mut r = started(three());
    r.controller.play_pause();
    assert!(r.controller.is_playing());

    r.controller.next();
    assert_eq!(r.controller.current_index(), Some(1));
    assert_eq!(r.controller.state(), PlayerState::Loading);
    assert!(!r.media.lock().unwrap().playing);

    r.controller.tick();
    assert_eq!(r.controller.state(), PlayerState::Paused);
    assert_eq!(r.controller.elapsed(), Duration::ZERO);
}

#[test]
fn seek_clamps_fraction() {
    let mut r = started(three());
    r.controller.seek(1.5);
    let over = r.controller.elapsed();
    r.controller.seek(1.0);
    assert_eq!(r.controller.elapsed(), over);
    assert_eq!(over, MINUTE);

    r.controller.seek(-0.2);
    let under = r.controller.elapsed();
    r.controller.seek(0.0);
    assert_eq!(r.controller.elapsed(), under);
    assert_eq!(under, Duration::ZERO);

    r.controller.seek(0.5);
    assert_eq!(r.controller.elapsed(), Duration::from_secs(30));
    assert_eq!(r.media.lock().unwrap().position, Duration::from_secs(30));
}

#[test]
fn seek_without_known_duration_does_nothing() {
    let mut r = three();
    r.media.lock().unwrap().duration = None;
    r = started(r);
    r.controller.seek(0.5);
    assert_eq!(r.controller.elapsed(), Duration::ZERO);
    assert!(r.media.lock().unwrap().seeks.is_empty());
}

#[test]
fn seek_by_stays_inside_the_track() {
    let mut r = started(three());
    r.controller.seek_by(-10);
    assert_eq!(r.controller.elapsed(), Duration::ZERO);
    r.controller.seek_by(45);
    assert_eq!(r.controller.elapsed(), Duration::from_secs(45));
    r.controller.seek_by(45);
    assert_eq!(r.controller.elapsed(), MINUTE);
}

#[test]
fn ticks_record_progress_with_threshold() {
    let mut r = started(three());
    r.controller.play_pause();

    r.media.lock().unwrap().position = Duration::from_secs(15);
    r.controller.tick();
    assert_eq!(r.controller.progress().get("Disk 1/1 One.mp3"), 25);

    // 25.8% rounds to 26, not more than one point above 25.
    r.media.lock().unwrap().position = Duration::from_millis(15_500);
    r.controller.tick();
    assert_eq!(r.controller.progress().get("Disk 1/1 One.mp3"), 25);

    r.media.lock().unwrap().position = Duration::from_secs(30);
    r.controller.tick();
    assert_eq!(r.controller.progress().get("Disk 1/1 One.mp3"), 50);
}

#[test]
fn paused_ticks_do_not_record() {
    let mut r = started(three());
    r.media.lock().unwrap().position = Duration::from_secs(30);
    r.controller.tick();
    assert_eq!(r.controller.progress().get("Disk 1/1 One.mp3"), 0);
}

#[test]
fn end_of_stream_completes_and_advances_paused() {
    let mut r = started(three());
    r.controller.play_pause();

    {
        let mut m = r.media.lock().unwrap();
        m.position = MINUTE;
        m.finished = true;
    }
    r.controller.tick();
    assert_eq!(r.controller.progress().get("Disk 1/1 One.mp3"), 100);
    assert_eq!(r.controller.current_index(), Some(1));
    assert_eq!(r.controller.state(), PlayerState::Loading);

    r.controller.tick();
    assert_eq!(r.controller.state(), PlayerState::Paused);
    assert!(!r.media.lock().unwrap().playing);
}

#[test]
fn continue_on_end_starts_the_next_track() {
    let mut r = started(rig_with(
        &["1 One.mp3", "2 Two.mp3"],
        true,
        Arc::new(MemoryKvStore::new()),
    ));
    r.controller.play_pause();
    r.media.lock().unwrap().finished = true;
    r.controller.tick();
    r.controller.tick();
    assert_eq!(r.controller.current_index(), Some(1));
    assert_eq!(r.controller.state(), PlayerState::Playing);
    assert!(r.media.lock().unwrap().playing);
}

#[test]
fn last_track_ending_stays_ended_and_restarts_on_play() {
    let mut r = started(rig(&["1 Only.mp3"]));
    r.controller.play_pause();
    r.media.lock().unwrap().finished = true;
    r.controller.tick();
    assert_eq!(r.controller.state(), PlayerState::Ended);
    assert_eq!(r.controller.current_index(), Some(0));

    r.controller.play_pause();
    assert_eq!(r.controller.state(), PlayerState::Playing);
    assert_eq!(r.controller.elapsed(), Duration::ZERO);
    assert_eq!(r.media.lock().unwrap().seeks.last(), Some(&Duration::ZERO));
}

#[test]
fn seeking_an_ended_track_leaves_it_paused() {
    let mut r = started(rig(&["1 Only.mp3"]));
    r.controller.play_pause();
    r.media.lock().unwrap().finished = true;
    r.controller.tick();
    assert_eq!(r.controller.state(), PlayerState::Ended);

    r.controller.seek(0.5);
    assert_eq!(r.controller.state(), PlayerState::Paused);
    assert_eq!(r.controller.elapsed(), Duration::from_secs(30));
    assert!(!r.media.lock().unwrap().playing);

    r.controller.play_pause();
    r.media.lock().unwrap().position = Duration::from_secs(45);
    r.controller.tick();
    assert_eq!(r.controller.state(), PlayerState::Playing);
    assert_eq!(r.controller.elapsed(), Duration::from_secs(45));
}

#[test]
fn failed_load_is_marked_and_skipped_by_auto_advance() {
    let mut r = three();
    r.media
        .lock()
        .unwrap()
        .failing
        .insert("Disk 1/2 Two.mp3".to_string());
    r = started(r);

    r.controller.next();
    r.controller.tick();
    assert_eq!(r.controller.state(), PlayerState::Failed);
    assert!(r.controller.is_unplayable("Disk 1/2 Two.mp3"));
    assert!(r.controller.snapshot().error.is_some());
    r.controller.play_pause();
    assert_eq!(r.controller.state(), PlayerState::Failed);

    // Back to the first track, play it out: auto-advance jumps over track 2.
    r.controller.previous();
    r.controller.tick();
    r.controller.play_pause();
    r.media.lock().unwrap().finished = true;
    r.controller.tick();
    assert_eq!(r.controller.current_index(), Some(2));
    r.controller.tick();
    assert_eq!(r.controller.state(), PlayerState::Paused);
}

#[test]
fn auto_advance_moves_past_a_track_that_fails_to_load() {
    let mut r = three();
    r.media
        .lock()
        .unwrap()
        .failing
        .insert("Disk 1/2 Two.mp3".to_string());
    r = started(r);
    r.controller.play_pause();
    r.media.lock().unwrap().finished = true;

    r.controller.tick();
    assert_eq!(r.controller.current_index(), Some(1));
    r.controller.tick();
    assert_eq!(r.controller.current_index(), Some(2));
    r.controller.tick();
    assert_eq!(r.controller.state(), PlayerState::Paused);
}

#[test]
fn volume_is_clamped_applied_and_saved() {
    let mut r = started(three());
    r.controller.set_volume(1.4);
    assert_eq!(r.controller.volume(), 1.0);
    r.controller.set_volume(0.25);
    assert_eq!(r.media.lock().unwrap().volume, 0.25);

    let reopened = VolumeStore::new(r.kv.clone(), r.keys.volume.clone());
    assert_eq!(reopened.load(), 0.25);
}

#[test]
fn mute_toggles_between_zero_and_full() {
    let mut r = started(three());
    r.controller.set_volume(0.4);
    r.controller.toggle_mute();
    assert_eq!(r.controller.volume(), 0.0);
    r.controller.toggle_mute();
    assert_eq!(r.controller.volume(), 1.0);
}

#[test]
fn saved_volume_is_restored() {
    let kv = Arc::new(MemoryKvStore::new());
    VolumeStore::new(kv.clone(), StoreKeys::new("test").volume).save(0.3);

    let r = rig_with(&["1 One.mp3"], false, kv);
    assert_eq!(r.controller.volume(), 0.3);
    assert_eq!(r.media.lock().unwrap().volume, 0.3);
}

#[test]
fn apply_dispatches_and_stops_on_quit() {
    let mut r = started(three());
    assert!(r.controller.apply(AudioCmd::Select(2)));
    r.controller.tick();
    assert_eq!(r.controller.current_index(), Some(2));
    assert!(r.controller.apply(AudioCmd::PlayPause));
    assert!(r.controller.is_playing());
    assert!(!r.controller.apply(AudioCmd::Quit));
    assert!(!r.media.lock().unwrap().playing);
}

#[test]
fn snapshot_carries_progress_and_summary() {
    let mut r = started(rig(&["1 One.mp3", "2 Two.mp3"]));
    r.controller.play_pause();
    r.media.lock().unwrap().finished = true;
    r.controller.tick();

    let snap = r.controller.snapshot();
    assert_eq!(snap.percent_of("Disk 1/1 One.mp3"), 100);
    assert_eq!(snap.summary.completed, 1);
    assert_eq!(snap.summary.overall_percent, 50);
    assert_eq!(snap.index, Some(1));
    assert!(snap.has_previous);
    assert!(!snap.has_next);
}

#[test]
fn audio_player_runs_the_controller_on_its_thread() {
    let kv: Arc<MemoryKvStore> = Arc::new(MemoryKvStore::new());
    let keys = StoreKeys::new("test");
    let navigator = TrackNavigator::new(
        vec![entry("Disk 1", "1 One.mp3"), entry("Disk 1", "2 Two.mp3")],
        &["Disk 1".to_string()],
    );
    let progress = ProgressStore::open(kv.clone(), keys.progress, 1);
    let volume = VolumeStore::new(kv, keys.volume);
    let (sink, _media) = FakeSink::new(Some(MINUTE));

    let player = AudioPlayer::spawn(move || Ok(sink), navigator, progress, volume, false).unwrap();
    player.send(AudioCmd::Next).unwrap();

    let handle = player.playback_handle();
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    loop {
        let snap = handle.lock().unwrap().clone();
        if snap.index == Some(1) && snap.state == PlayerState::Paused {
            break;
        }
        assert!(std::time::Instant::now() < deadline, "audio thread stalled");
        std::thread::sleep(Duration::from_millis(20));
    }
    player.quit();
}

#[test]
fn cache_file_name_flattens_storage_paths() {
    assert_eq!(
        cache_file_name("CA1 Sound Revision/Disk 1/01 Intro.mp3"),
        "CA1%20Sound%20Revision%2FDisk%201%2F01%20Intro.mp3"
    );
    assert_eq!(cache_file_name("../x.mp3"), "%2E.%2Fx.mp3");
    assert_eq!(cache_file_name(".."), "%2E.");
    assert!(!cache_file_name("a/b/c.mp3").contains('/'));
}

#[test]
fn cache_file_names_do_not_collide() {
    assert_ne!(
        cache_file_name("Disk 1/a b.mp3"),
        cache_file_name("Disk_1/a_b.mp3")
    );
    assert_ne!(cache_file_name("a/b.mp3"), cache_file_name("a__b.mp3"));
}

#[test]
fn fetcher_reuses_cached_media() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = MediaFetcher::new(dir.path(), Duration::from_secs(1)).unwrap();
    let mut e = entry("Disk 1", "1 One.mp3");
    // Unroutable on purpose; a cache hit must not touch the network.
    e.public_url = "http://127.0.0.1:9/never".into();

    let cached = fetcher.cached_path(&e);
    std::fs::write(&cached, b"ID3").unwrap();
    assert_eq!(fetcher.fetch(&e).unwrap(), cached);
}
