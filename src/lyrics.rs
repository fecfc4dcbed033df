//! Timed lyrics: the timeline model and the LRC parser that feeds it.
//!
//! A timeline is built once per song and replaced wholesale when the song
//! changes. Nothing mutates it during playback.

mod lrc;
mod timeline;

pub use lrc::{LrcDocument, load_file, parse};
pub use timeline::{LyricLine, LyricTimeline};

#[cfg(test)]
mod tests;
