use std::time::Duration;

use crate::catalog::CatalogEntry;
use crate::error::MediaError;

/// The single media resource the controller drives.
///
/// Loading a new entry replaces whatever was loaded before; there is never
/// more than one active source.
pub trait MediaSink {
    /// Prepare `entry` for playback, paused at the start.
    /// Returns the duration when it can be determined.
    fn load(&mut self, entry: &CatalogEntry) -> Result<Option<Duration>, MediaError>;
    fn play(&mut self);
    fn pause(&mut self);
    /// Move to `to` from the start of the track, keeping the play/pause state.
    fn seek(&mut self, to: Duration) -> Result<(), MediaError>;
    fn set_volume(&mut self, volume: f32);
    /// Current position from the start of the track.
    fn position(&self) -> Duration;
    /// True once the loaded source has been played to its end.
    fn is_finished(&self) -> bool;
}
