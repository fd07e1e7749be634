//! Per-track listening progress and the persisted volume.

mod store;
mod volume;

pub use store::*;
pub use volume::*;

#[cfg(test)]
mod tests;
