//! Commands, states and the snapshot shared with the UI.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::progress::{DEFAULT_VOLUME, ProgressSummary};

/// Where the controller is in the life of the current track.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PlayerState {
    /// Nothing selected yet (or the catalog is empty).
    #[default]
    Idle,
    /// A track was selected and its media is being fetched/decoded.
    Loading,
    Paused,
    Playing,
    /// The track played to its end and there was nothing to advance to.
    Ended,
    /// The current track could not be loaded.
    Failed,
}

impl PlayerState {
    pub fn label(self) -> &'static str {
        match self {
            PlayerState::Idle => "Idle",
            PlayerState::Loading => "Loading",
            PlayerState::Paused => "Paused",
            PlayerState::Playing => "Playing",
            PlayerState::Ended => "Ended",
            PlayerState::Failed => "Failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AudioCmd {
    /// Make the track at this canonical index current. Playback stays paused.
    Select(usize),
    PlayPause,
    Next,
    Prev,
    /// Seek to a fraction of the known duration; clamped to `[0, 1]`.
    Seek(f64),
    /// Seek relative to the current position, in seconds.
    SeekBy(i64),
    SetVolume(f32),
    ToggleMute,
    Quit,
}

/// Everything the UI needs to draw the player, published after every
/// command and tick.
#[derive(Debug, Clone)]
pub struct PlaybackSnapshot {
    pub state: PlayerState,
    pub index: Option<usize>,
    pub has_previous: bool,
    pub has_next: bool,
    pub elapsed: Duration,
    pub duration: Option<Duration>,
    pub volume: f32,
    /// Saved percent per storage path.
    pub progress: HashMap<String, u8>,
    /// Storage paths that failed to load this session.
    pub unplayable: HashSet<String>,
    pub summary: ProgressSummary,
    pub error: Option<String>,
}

impl Default for PlaybackSnapshot {
    fn default() -> Self {
        Self {
            state: PlayerState::Idle,
            index: None,
            has_previous: false,
            has_next: false,
            elapsed: Duration::ZERO,
            duration: None,
            volume: DEFAULT_VOLUME,
            progress: HashMap::new(),
            unplayable: HashSet::new(),
            summary: ProgressSummary::default(),
            error: None,
        }
    }
}

impl PlaybackSnapshot {
    pub fn is_playing(&self) -> bool {
        self.state == PlayerState::Playing
    }

    pub fn percent_of(&self, storage_path: &str) -> u8 {
        self.progress.get(storage_path).copied().unwrap_or(0)
    }
}

pub type PlaybackHandle = Arc<Mutex<PlaybackSnapshot>>;
