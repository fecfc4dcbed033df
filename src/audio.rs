//! Playback engine: decoding, PCM preparation, output and the player state machine.

mod decoder;
mod output;
mod pcm;
mod player;
mod tracker;
mod types;

pub use decoder::{AudioDecoder, DecodedAudio, RodioDecoder, SUPPORTED_EXTENSIONS, is_supported};
pub use output::{OutputDevice, OutputSession, RodioOutput};
pub use player::{Player, PlayerOptions};
pub use types::{PcmFormat, PlaybackSnapshot, PlaybackState, PlayerEvent};
