use std::io;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{error, info};

use crate::error::MediaError;
use crate::navigator::TrackNavigator;
use crate::progress::{ProgressStore, VolumeStore};

use super::controller::PlaybackController;
use super::media::MediaSink;
use super::types::{AudioCmd, PlaybackHandle, PlayerState};

/// How often the controller follows the play position.
const TICK: Duration = Duration::from_millis(200);

/// Everything the audio thread needs besides the media sink.
pub(super) struct AudioThreadParts {
    pub navigator: TrackNavigator,
    pub progress: ProgressStore,
    pub volume: VolumeStore,
    pub continue_on_end: bool,
}

/// Run the controller on its own thread.
///
/// The sink is built inside the thread because audio output streams cannot
/// move between threads.
pub(super) fn spawn_audio_thread<M, F>(
    make_media: F,
    parts: AudioThreadParts,
    rx: Receiver<AudioCmd>,
    playback: PlaybackHandle,
) -> io::Result<JoinHandle<()>>
where
    M: MediaSink + 'static,
    F: FnOnce() -> Result<M, MediaError> + Send + 'static,
{
    thread::Builder::new()
        .name("audio".into())
        .spawn(move || {
            let media = match make_media() {
                Ok(m) => m,
                Err(e) => {
                    error!("audio thread not started: {e}");
                    if let Ok(mut info) = playback.lock() {
                        info.state = PlayerState::Failed;
                        info.error = Some(e.to_string());
                    }
                    return;
                }
            };

            let mut controller = PlaybackController::new(
                media,
                parts.navigator,
                parts.progress,
                parts.volume,
                parts.continue_on_end,
            );
            controller.start();
            publish(&playback, &controller);

            loop {
                match rx.recv_timeout(TICK) {
                    Ok(cmd) => {
                        if !controller.apply(cmd) {
                            break;
                        }
                        // Take whatever else is queued before a possibly slow load.
                        let mut quit = false;
                        while let Ok(cmd) = rx.try_recv() {
                            if !controller.apply(cmd) {
                                quit = true;
                                break;
                            }
                        }
                        if quit {
                            break;
                        }
                        publish(&playback, &controller);
                    }
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => break,
                }

                controller.tick();
                publish(&playback, &controller);
            }

            info!("audio thread stopped");
        })
}

fn publish<M: MediaSink>(playback: &PlaybackHandle, controller: &PlaybackController<M>) {
    if let Ok(mut info) = playback.lock() {
        *info = controller.snapshot();
    }
}
