//! Application model types: `App`, `LibraryStatus` and list rows.

use crate::audio::{PlaybackHandle, PlaybackSnapshot};
use crate::catalog::CatalogEntry;
use crate::navigator::TrackNavigator;

/// Where the catalog load stands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LibraryStatus {
    #[default]
    Loading,
    Ready,
    Failed(String),
}

/// One line of the track list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListRow<'a> {
    Group(&'a str),
    /// Canonical index of a track.
    Track(usize),
}

/// The main application model.
#[derive(Default)]
pub struct App {
    pub status: LibraryStatus,
    /// Read-only copy of the canonical order; the audio thread owns its own.
    pub navigator: TrackNavigator,
    pub selected: usize,
    pub playback_handle: Option<PlaybackHandle>,

    pub follow_playback: bool,
    /// Index whose load was requested from the UI; following resumes once
    /// the audio thread reports it.
    pub pending_follow_index: Option<usize>,
}

impl App {
    pub fn new() -> Self {
        Self {
            follow_playback: true,
            ..Self::default()
        }
    }

    /// Show a freshly resolved catalog.
    pub fn set_catalog(&mut self, navigator: TrackNavigator) {
        self.selected = navigator.current_index().unwrap_or(0);
        self.navigator = navigator;
        self.status = LibraryStatus::Ready;
        self.follow_playback = true;
        self.pending_follow_index = None;
    }

    pub fn set_loading(&mut self) {
        self.status = LibraryStatus::Loading;
    }

    pub fn set_failed(&mut self, message: impl Into<String>) {
        self.status = LibraryStatus::Failed(message.into());
    }

    pub fn is_ready(&self) -> bool {
        self.status == LibraryStatus::Ready
    }

    /// Attach a `PlaybackHandle` used to observe playback.
    pub fn set_playback_handle(&mut self, h: PlaybackHandle) {
        self.playback_handle = Some(h);
    }

    /// Latest published playback state, or an idle default before the audio
    /// thread has started.
    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.playback_handle
            .as_ref()
            .and_then(|h| h.lock().ok().map(|s| s.clone()))
            .unwrap_or_default()
    }

    pub fn has_tracks(&self) -> bool {
        !self.navigator.is_empty()
    }

    pub fn entry(&self, index: usize) -> Option<&CatalogEntry> {
        self.navigator.get(index)
    }

    /// Enable following playback (cursor follows the active track).
    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
    }

    /// Disable follow-playback and clear any pending follow index.
    pub fn follow_playback_off(&mut self) {
        self.follow_playback = false;
        self.pending_follow_index = None;
    }

    pub fn set_pending_follow_index(&mut self, idx: usize) {
        self.pending_follow_index = Some(idx);
    }

    /// Move the cursor to the active track when following playback.
    pub fn follow(&mut self, active: Option<usize>) {
        let Some(idx) = active else {
            return;
        };
        if !self.follow_playback {
            return;
        }
        if let Some(pending) = self.pending_follow_index {
            if pending != idx {
                return;
            }
            self.pending_follow_index = None;
        }
        self.set_selected(idx);
    }

    pub fn set_selected(&mut self, idx: usize) {
        if idx < self.navigator.len() {
            self.selected = idx;
        }
    }

    /// Move the cursor down. Stops at the last track.
    pub fn next(&mut self) {
        if self.selected + 1 < self.navigator.len() {
            self.selected += 1;
        }
    }

    /// Move the cursor up. Stops at the first track.
    pub fn prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.navigator.len().saturating_sub(1);
    }

    /// Group headers interleaved with tracks, in canonical order.
    pub fn rows(&self) -> Vec<ListRow<'_>> {
        let mut rows = Vec::with_capacity(self.navigator.len() + 8);
        for group in self.navigator.grouped() {
            rows.push(ListRow::Group(group.label));
            rows.extend(group.tracks.iter().map(|(i, _)| ListRow::Track(*i)));
        }
        rows
    }
}
