//! Song library: directory scanning, display names and sidecar lyric lookup.

mod display;
mod model;
mod scan;

pub use model::Track;
pub use scan::{find_lyrics_file, scan};
