use std::collections::HashSet;
use std::time::Duration;

use log::{debug, info, warn};

use crate::error::MediaError;
use crate::navigator::TrackNavigator;
use crate::progress::{ProgressStore, VolumeStore, clamp_volume};

use super::media::MediaSink;
use super::types::{AudioCmd, PlaybackSnapshot, PlayerState};

/// Owns the media resource and the playback state for the current track.
///
/// Commands are applied synchronously. Loading is deferred to the next
/// [`PlaybackController::tick`] so a caller can publish the `Loading` state
/// (and coalesce further commands) before a possibly slow fetch.
pub struct PlaybackController<M: MediaSink> {
    media: M,
    navigator: TrackNavigator,
    progress: ProgressStore,
    volume_store: VolumeStore,
    continue_on_end: bool,

    state: PlayerState,
    elapsed: Duration,
    duration: Option<Duration>,
    volume: f32,
    pending_load: bool,
    // Set for loads started by auto-advance.
    advancing: bool,
    autoplay: bool,
    unplayable: HashSet<String>,
    last_error: Option<String>,
}

impl<M: MediaSink> PlaybackController<M> {
    pub fn new(
        mut media: M,
        navigator: TrackNavigator,
        progress: ProgressStore,
        volume_store: VolumeStore,
        continue_on_end: bool,
    ) -> Self {
        let volume = volume_store.load();
        media.set_volume(volume);
        Self {
            media,
            navigator,
            progress,
            volume_store,
            continue_on_end,
            state: PlayerState::Idle,
            elapsed: Duration::ZERO,
            duration: None,
            volume,
            pending_load: false,
            advancing: false,
            autoplay: false,
            unplayable: HashSet::new(),
            last_error: None,
        }
    }

    /// Select the first track of the canonical order, if any.
    pub fn start(&mut self) {
        if let Some(i) = self.navigator.current_index() {
            self.select(i);
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn current_index(&self) -> Option<usize> {
        self.navigator.current_index()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayerState::Playing
    }

    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    pub fn is_unplayable(&self, storage_path: &str) -> bool {
        self.unplayable.contains(storage_path)
    }

    /// Make `index` current and schedule its load. Playback is paused.
    /// Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) -> bool {
        if !self.navigator.set_current(index) {
            return false;
        }
        self.media.pause();
        self.state = PlayerState::Loading;
        self.pending_load = true;
        self.advancing = false;
        self.autoplay = false;
        self.elapsed = Duration::ZERO;
        self.duration = None;
        self.last_error = None;
        true
    }

    /// Move to the next track. No-op on the last one.
    pub fn next(&mut self) {
        if let Some(i) = self.navigator.next_index() {
            self.select(i);
        }
    }

    /// Move to the previous track. No-op on the first one.
    pub fn previous(&mut self) {
        if let Some(i) = self.navigator.previous_index() {
            self.select(i);
        }
    }

    /// Toggle between playing and paused. An ended track restarts from the
    /// beginning. While a track is loading the request is remembered and the
    /// track starts once loaded; otherwise this does nothing.
    pub fn play_pause(&mut self) {
        match self.state {
            PlayerState::Playing => {
                self.media.pause();
                self.state = PlayerState::Paused;
            }
            PlayerState::Paused => {
                self.media.play();
                self.state = PlayerState::Playing;
            }
            PlayerState::Ended => {
                if self.seek_to(Duration::ZERO) {
                    self.media.play();
                    self.state = PlayerState::Playing;
                }
            }
            PlayerState::Loading => self.autoplay = !self.autoplay,
            PlayerState::Idle | PlayerState::Failed => {}
        }
    }

    /// Seek to `fraction` of the duration, clamped to `[0, 1]`.
    /// Does nothing while the duration is unknown.
    pub fn seek(&mut self, fraction: f64) {
        let Some(duration) = self.duration else {
            return;
        };
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        self.seek_to(duration.mul_f64(fraction));
    }

    /// Seek relative to the current position.
    pub fn seek_by(&mut self, secs: i64) {
        let delta = Duration::from_secs(secs.unsigned_abs());
        let target = if secs < 0 {
            self.elapsed.saturating_sub(delta)
        } else {
            self.elapsed.saturating_add(delta)
        };
        let target = match self.duration {
            Some(d) => target.min(d),
            None => target,
        };
        self.seek_to(target);
    }

    /// Clamp, apply and persist the volume.
    pub fn set_volume(&mut self, volume: f32) {
        let volume = clamp_volume(volume);
        self.volume = volume;
        self.media.set_volume(volume);
        self.volume_store.save(volume);
    }

    pub fn toggle_mute(&mut self) {
        let target = if self.volume == 0.0 { 1.0 } else { 0.0 };
        self.set_volume(target);
    }

    /// Apply one command. Returns `false` for [`AudioCmd::Quit`].
    pub fn apply(&mut self, cmd: AudioCmd) -> bool {
        match cmd {
            AudioCmd::Select(i) => {
                self.select(i);
            }
            AudioCmd::PlayPause => self.play_pause(),
            AudioCmd::Next => self.next(),
            AudioCmd::Prev => self.previous(),
            AudioCmd::Seek(fraction) => self.seek(fraction),
            AudioCmd::SeekBy(secs) => self.seek_by(secs),
            AudioCmd::SetVolume(v) => self.set_volume(v),
            AudioCmd::ToggleMute => self.toggle_mute(),
            AudioCmd::Quit => {
                self.media.pause();
                return false;
            }
        }
        true
    }

    /// Drive the media: run a pending load, follow the play position, record
    /// progress and handle end of stream.
    pub fn tick(&mut self) {
        if self.pending_load {
            self.load_current();
            return;
        }
        if self.state != PlayerState::Playing {
            return;
        }

        self.elapsed = self.media.position();
        if self.media.is_finished() {
            self.finish_current();
        } else {
            self.record_progress();
        }
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            state: self.state,
            index: self.navigator.current_index(),
            has_previous: self.navigator.has_previous(),
            has_next: self.navigator.has_next(),
            elapsed: self.elapsed,
            duration: self.duration,
            volume: self.volume,
            progress: self.progress.records().clone(),
            unplayable: self.unplayable.clone(),
            summary: self.navigator.aggregate(&self.progress),
            error: self.last_error.clone(),
        }
    }

    fn load_current(&mut self) {
        self.pending_load = false;
        let Some(entry) = self.navigator.current_entry().cloned() else {
            self.state = PlayerState::Idle;
            return;
        };

        match self.media.load(&entry) {
            Ok(duration) => {
                info!("loaded {:?} ({duration:?})", entry.storage_path);
                self.unplayable.remove(&entry.storage_path);
                self.duration = duration;
                self.elapsed = Duration::ZERO;
                self.media.set_volume(self.volume);
                self.state = PlayerState::Paused;
                if self.autoplay {
                    self.media.play();
                    self.state = PlayerState::Playing;
                }
            }
            Err(e) => {
                warn!("failed to load {:?}: {e}", entry.storage_path);
                self.unplayable.insert(entry.storage_path.clone());
                self.last_error = Some(format!("{}: {e}", entry.display_title));
                self.state = PlayerState::Failed;
                if self.advancing {
                    self.advance();
                }
            }
        }
    }

    fn finish_current(&mut self) {
        if let Some(path) = self.current_path() {
            self.progress.record(&path, 100);
        }
        if let Some(d) = self.duration {
            self.elapsed = d;
        }
        self.state = PlayerState::Ended;
        debug!("track ended at index {:?}", self.navigator.current_index());
        self.advance();
    }

    /// Select the next playable track after the current one. Stays put when
    /// there is none.
    fn advance(&mut self) {
        let Some(current) = self.navigator.current_index() else {
            return;
        };
        let next = self
            .navigator
            .entries()
            .iter()
            .enumerate()
            .skip(current + 1)
            .find(|(_, e)| !self.unplayable.contains(&e.storage_path))
            .map(|(i, _)| i);

        if let Some(i) = next {
            self.select(i);
            self.advancing = true;
            self.autoplay = self.continue_on_end;
        }
    }

    fn seek_to(&mut self, target: Duration) -> bool {
        if !matches!(
            self.state,
            PlayerState::Playing | PlayerState::Paused | PlayerState::Ended
        ) {
            return false;
        }
        match self.media.seek(target) {
            Ok(()) => {
                self.elapsed = target;
                if self.state != PlayerState::Playing {
                    // A drained sink was never paused; keep media and state in step.
                    self.media.pause();
                    self.state = PlayerState::Paused;
                }
                true
            }
            Err(e) => {
                self.fail_current(e);
                false
            }
        }
    }

    fn fail_current(&mut self, e: MediaError) {
        warn!("playback error: {e}");
        if let Some(path) = self.current_path() {
            self.unplayable.insert(path);
        }
        self.last_error = Some(e.to_string());
        self.state = PlayerState::Failed;
    }

    fn record_progress(&mut self) {
        let Some(duration) = self.duration.filter(|d| !d.is_zero()) else {
            return;
        };
        let Some(path) = self.current_path() else {
            return;
        };
        let ratio = self.elapsed.as_secs_f64() / duration.as_secs_f64();
        let percent = (ratio * 100.0).round().clamp(0.0, 100.0) as u8;
        self.progress.record(&path, percent);
    }

    fn current_path(&self) -> Option<String> {
        self.navigator
            .current_entry()
            .map(|e| e.storage_path.clone())
    }
}
