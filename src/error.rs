//! Error types for the playback engine.
//!
//! Every variant is a local, recoverable failure handed back to the caller of the
//! operation that triggered it. None of them should take the process down.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("audio file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to decode audio: {0}")]
    DecodeError(String),

    #[error("audio output device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("no track loaded")]
    NoTrackLoaded,

    /// Zero sample rate or zero channels.
    #[error("invalid sample format: {sample_rate} Hz, {channels} channel(s)")]
    InvalidFormat { sample_rate: u32, channels: u16 },

    /// Timestamps go backwards at `index`.
    #[error("lyric timestamps are out of order at line {index}")]
    UnorderedTimeline { index: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PlayerError>;
