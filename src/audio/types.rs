//! Audio-related small types.
//!
//! This module defines the playback state enum, the PCM format shared by the
//! buffer builder and the output device, the events the player emits, and the
//! snapshot handed to the display layer.

use std::path::PathBuf;
use std::time::Duration;

use crate::karaoke::KaraokeSnapshot;

/// Bytes per quantized sample (signed 16-bit little-endian).
pub const BYTES_PER_SAMPLE: usize = 2;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Nothing loaded yet.
    #[default]
    Empty,
    /// A track is decoded and ready, playback never started.
    Loaded,
    Playing,
    Paused,
    Stopped,
    /// The tracker reached the end of the track.
    Finished,
}

impl PlaybackState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Empty => "Empty",
            Self::Loaded => "Ready",
            Self::Playing => "Playing",
            Self::Paused => "Paused",
            Self::Stopped => "Stopped",
            Self::Finished => "Finished",
        }
    }
}

/// Sample layout of a prepared byte buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PcmFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

impl PcmFormat {
    /// Size of one interleaved frame in bytes.
    pub fn frame_bytes(&self) -> usize {
        self.channels as usize * BYTES_PER_SAMPLE
    }

    pub fn bytes_per_second(&self) -> usize {
        self.sample_rate as usize * self.frame_bytes()
    }
}

/// Notifications emitted by the player outside of a direct call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    /// The track played through to its end.
    Finished { path: PathBuf },
}

/// Point-in-time view of the player, taken under the player lock.
#[derive(Debug, Clone, Default)]
pub struct PlaybackSnapshot {
    pub state: PlaybackState,
    pub path: Option<PathBuf>,
    pub position: Duration,
    pub duration: Duration,
    pub volume: f32,
    /// Lyric line active at `position`, if any.
    pub active_line: Option<usize>,
    pub karaoke: KaraokeSnapshot,
}

impl PlaybackSnapshot {
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }
}
