use std::path::PathBuf;
use std::time::Duration;

/// One playable song found by the scanner.
#[derive(Debug, Clone)]
pub struct Track {
    pub path: PathBuf,
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// From the container metadata; the player computes its own once decoded.
    pub duration: Option<Duration>,
    pub display: String,
    /// Sidecar `.lrc` file, if one was found next to the audio.
    pub lyrics: Option<PathBuf>,
}

impl Track {
    pub fn has_lyrics(&self) -> bool {
        self.lyrics.is_some()
    }

    pub fn artist_or_unknown(&self) -> &str {
        self.artist.as_deref().unwrap_or("Unknown Artist")
    }
}
