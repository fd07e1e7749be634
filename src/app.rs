//! Application module: the state the terminal UI renders.
//!
//! The `App` model lives in `app::model` and holds the catalog view, the
//! cursor and the handle to the published playback snapshot.

mod model;

pub use model::*;
