//! Decoding audio files into raw float samples.
//!
//! The player only needs interleaved samples plus their rate and channel count;
//! `RodioDecoder` provides that on top of `rodio::Decoder`.

use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;

use rodio::decoder::DecoderError;
use rodio::{Decoder, Source};

use crate::error::{PlayerError, Result};

/// Extensions (lowercase, no dot) the decoder accepts: one compressed format and
/// one PCM container.
pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["mp3", "wav"];

/// Fully decoded audio, interleaved.
#[derive(Debug, Clone, Default)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

pub trait AudioDecoder: Send + Sync {
    fn decode(&self, path: &Path) -> Result<DecodedAudio>;
}

pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&e.as_str())
        })
        .unwrap_or(false)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RodioDecoder;

impl AudioDecoder for RodioDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedAudio> {
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => PlayerError::FileNotFound(path.to_path_buf()),
            _ => PlayerError::DecodeError(format!("{}: {e}", path.display())),
        })?;

        if !is_supported(path) {
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("<none>");
            return Err(PlayerError::UnsupportedFormat(ext.to_string()));
        }

        let source = Decoder::new(BufReader::new(file)).map_err(|e| match e {
            DecoderError::UnrecognizedFormat => {
                PlayerError::UnsupportedFormat(path.display().to_string())
            }
            other => PlayerError::DecodeError(other.to_string()),
        })?;

        // `From` covers both the plain and the NonZero flavors of these types.
        let channels = u16::from(source.channels());
        let sample_rate = u32::from(source.sample_rate());
        let samples: Vec<f32> = source.collect();

        if samples.is_empty() {
            return Err(PlayerError::DecodeError(format!(
                "{}: no audio frames",
                path.display()
            )));
        }

        Ok(DecodedAudio {
            samples,
            sample_rate,
            channels,
        })
    }
}
