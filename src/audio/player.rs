use std::io;
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::error::MediaError;
use crate::navigator::TrackNavigator;
use crate::progress::{ProgressStore, VolumeStore};

use super::media::MediaSink;
use super::thread::{AudioThreadParts, spawn_audio_thread};
use super::types::{AudioCmd, PlaybackHandle, PlaybackSnapshot};

/// Handle to the audio thread: send commands, read the published snapshot.
pub struct AudioPlayer {
    tx: Sender<AudioCmd>,
    playback: PlaybackHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl AudioPlayer {
    /// Start the audio thread. The first track is selected (paused) at once.
    pub fn spawn<M, F>(
        make_media: F,
        navigator: TrackNavigator,
        progress: ProgressStore,
        volume: VolumeStore,
        continue_on_end: bool,
    ) -> io::Result<Self>
    where
        M: MediaSink + 'static,
        F: FnOnce() -> Result<M, MediaError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let playback: PlaybackHandle = Arc::new(Mutex::new(PlaybackSnapshot::default()));

        let parts = AudioThreadParts {
            navigator,
            progress,
            volume,
            continue_on_end,
        };
        let join = spawn_audio_thread(make_media, parts, rx, playback.clone())?;

        Ok(Self {
            tx,
            playback,
            join: Mutex::new(Some(join)),
        })
    }

    pub fn playback_handle(&self) -> PlaybackHandle {
        self.playback.clone()
    }

    pub fn send(&self, cmd: AudioCmd) -> Result<(), mpsc::SendError<AudioCmd>> {
        self.tx.send(cmd)
    }

    /// Stop the audio thread and wait for it.
    pub fn quit(&self) {
        let _ = self.send(AudioCmd::Quit);
        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}
