//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the song list, the
//! selection and the playback toggles.

mod model;

pub use model::*;

#[cfg(test)]
mod tests;
