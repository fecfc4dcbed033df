//! PCM buffer preparation.
//!
//! Decoded float samples are baked into the signed 16-bit little-endian byte
//! stream the output device consumes. Volume is applied here, so changing it
//! later means rebuilding the buffer from the original samples.

use std::time::Duration;

use crate::error::{PlayerError, Result};

use super::types::{BYTES_PER_SAMPLE, PcmFormat};

/// Build an interleaved i16 LE buffer from interleaved float `samples`.
///
/// Each sample is scaled by `volume` first and clamped to `[-1.0, 1.0]` after
/// scaling, so attenuation can bring over-range input back into range. A
/// trailing partial frame is dropped.
pub fn build(samples: &[f32], sample_rate: u32, channels: u16, volume: f32) -> Result<Vec<u8>> {
    if sample_rate == 0 || channels == 0 {
        return Err(PlayerError::InvalidFormat {
            sample_rate,
            channels,
        });
    }

    let volume = clamp_volume(volume);
    let whole = samples.len() - samples.len() % channels as usize;

    let mut out = Vec::with_capacity(whole * BYTES_PER_SAMPLE);
    for &s in &samples[..whole] {
        let v = (s * volume).clamp(-1.0, 1.0);
        out.extend_from_slice(&quantize(v).to_le_bytes());
    }
    Ok(out)
}

/// Clamp a user volume into `[0.0, 1.0]`; NaN is treated as silence.
pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

fn quantize(v: f32) -> i16 {
    // `as` saturates, and `v` is already within range.
    (v * i16::MAX as f32) as i16
}

/// Duration of `buffer_len` bytes of audio in `format`.
pub fn duration_of(buffer_len: usize, format: PcmFormat) -> Duration {
    let bps = format.bytes_per_second() as u64;
    if bps == 0 {
        return Duration::ZERO;
    }
    let len = buffer_len as u64;
    let secs = len / bps;
    let rem = len % bps;
    Duration::from_secs(secs) + Duration::from_nanos(rem * 1_000_000_000 / bps)
}

/// Byte offset at which playback of `position` starts.
///
/// Whole seconds only: `floor(secs) * rate * channels * 2`, capped at
/// `buffer_len`. The result is always frame aligned.
pub fn byte_offset(position: Duration, format: PcmFormat, buffer_len: usize) -> usize {
    let offset = (position.as_secs() as usize).saturating_mul(format.bytes_per_second());
    let capped = offset.min(buffer_len);
    let frame = format.frame_bytes().max(1);
    capped - capped % frame
}
