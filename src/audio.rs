//! Audio playback: the controller state machine, the media backend and the
//! thread that drives them.
//!
//! The UI talks to the audio thread through `AudioCmd` messages and reads the
//! published `PlaybackSnapshot`; it never touches the media directly.

mod controller;
mod fetch;
mod media;
mod player;
mod sink;
mod thread;
mod types;

pub use controller::*;
pub use fetch::*;
pub use media::*;
pub use player::*;
pub use sink::*;
pub use types::*;

#[cfg(test)]
mod tests;
