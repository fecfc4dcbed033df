//! Application model: the song list, selection and the UI-side toggles.
//!
//! Playback itself lives in `audio::Player`; `App` only remembers which song
//! was handed to it and what should happen when that song ends.

use std::time::Duration;

use crate::config::Settings;
use crate::library::Track;

/// Popup drawn over the main screen. While one is open it takes every key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    Help,
    SongInfo,
    /// Jump-to-time prompt with the text typed so far.
    JumpToTime(String),
}

/// Parse `mm:ss` into a duration. Minutes are unbounded, seconds must be below 60.
pub fn parse_clock(input: &str) -> Option<Duration> {
    let (min, sec) = input.trim().split_once(':')?;
    let minutes: u64 = min.trim().parse().ok()?;
    let seconds: u64 = sec.trim().parse().ok()?;
    if seconds >= 60 {
        return None;
    }
    Some(Duration::from_secs(minutes.checked_mul(60)?.checked_add(seconds)?))
}

/// The main application model.
pub struct App {
    pub tracks: Vec<Track>,
    pub selected: usize,
    /// Index of the song currently loaded in the player.
    pub current: Option<usize>,

    lower_titles: Option<Vec<String>>,

    pub repeat: bool,
    pub shuffle: bool,
    pub auto_advance: bool,
    pub show_lyrics: bool,

    pub filter_mode: bool,
    pub filter_query: String,

    /// Volume the user asked for; the player holds the applied value.
    pub volume: f32,
    muted_from: Option<f32>,

    /// One-line message shown under the panels.
    pub status: Option<String>,
    pub current_dir: Option<String>,

    pub overlay: Option<Overlay>,
}

impl App {
    /// Create a new `App` with the provided list of `tracks`.
    pub fn new(tracks: Vec<Track>) -> Self {
        let lower_titles = Self::lower_titles_for(&tracks);

        Self {
            tracks,
            selected: 0,
            current: None,
            lower_titles,
            repeat: false,
            shuffle: false,
            auto_advance: true,
            show_lyrics: true,
            filter_mode: false,
            filter_query: String::new(),
            volume: 1.0,
            muted_from: None,
            status: None,
            current_dir: None,
            overlay: None,
        }
    }

    /// Larger libraries get precomputed lowercase titles for the fuzzy filter.
    fn lower_titles_for(tracks: &[Track]) -> Option<Vec<String>> {
        (tracks.len() > 100).then(|| {
            tracks
                .iter()
                .map(|t| t.display.to_ascii_lowercase())
                .collect()
        })
    }

    /// Swap in a freshly scanned library.
    ///
    /// The loaded song and the selection follow their files to their new
    /// positions; a loaded song that vanished is forgotten.
    pub fn replace_tracks(&mut self, tracks: Vec<Track>) {
        let current_path = self.current_track().map(|t| t.path.clone());
        let selected_path = self.tracks.get(self.selected).map(|t| t.path.clone());

        self.lower_titles = Self::lower_titles_for(&tracks);
        self.tracks = tracks;

        let find = |path: Option<std::path::PathBuf>, tracks: &[Track]| {
            path.and_then(|p| tracks.iter().position(|t| t.path == p))
        };
        self.current = find(current_path, &self.tracks);
        self.selected = find(selected_path, &self.tracks).unwrap_or(0);
        self.ensure_selected_visible();
    }

    /// Apply the startup toggles from `settings`.
    pub fn with_settings(mut self, settings: &Settings) -> Self {
        self.repeat = settings.playback.repeat;
        self.shuffle = settings.playback.shuffle;
        self.auto_advance = settings.playback.auto_advance;
        self.show_lyrics = settings.karaoke.show_lyrics;
        self.volume = settings.audio.default_volume.clamp(0.0, 1.0);
        self
    }

    pub fn set_current_dir(&mut self, dir: String) {
        self.current_dir = Some(dir);
    }

    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.and_then(|i| self.tracks.get(i))
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn toggle_repeat(&mut self) {
        self.repeat = !self.repeat;
    }

    pub fn toggle_shuffle(&mut self) {
        self.shuffle = !self.shuffle;
    }

    pub fn toggle_lyrics(&mut self) {
        self.show_lyrics = !self.show_lyrics;
    }

    /// Nudge the volume by `delta`, clamped to `[0, 1]`. Unmutes.
    pub fn step_volume(&mut self, delta: f32) -> f32 {
        self.muted_from = None;
        // Round to hundredths so repeated 0.1 steps land on clean values.
        self.volume = ((self.volume + delta).clamp(0.0, 1.0) * 100.0).round() / 100.0;
        self.volume
    }

    /// Mute, or restore the level from before muting.
    pub fn toggle_mute(&mut self) -> f32 {
        match self.muted_from.take() {
            Some(prev) => self.volume = prev,
            None => {
                self.muted_from = Some(self.volume);
                self.volume = 0.0;
            }
        }
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted_from.is_some()
    }

    /// Track indices in list order, narrowed by the active filter.
    pub fn display_indices(&self) -> Vec<usize> {
        let base = 0..self.tracks.len();

        let query = self.filter_query.trim();
        if query.is_empty() {
            return base.collect();
        }

        match self.lower_titles.as_deref() {
            Some(lower_titles) => {
                let query_lower = query.to_ascii_lowercase();
                base.filter(|&i| {
                    Self::fuzzy_match_positions_lower(&lower_titles[i], &query_lower).is_some()
                })
                .collect()
            }
            None => base
                .filter(|&i| Self::fuzzy_match_positions(&self.tracks[i].display, query).is_some())
                .collect(),
        }
    }

    /// Fuzzy-match `query_lower` against a specific track by index.
    ///
    /// Returns the character positions that match, or `None` when there is no match.
    pub fn fuzzy_match_positions_for_track_lower(
        &self,
        track_index: usize,
        query_lower: &str,
    ) -> Option<Vec<usize>> {
        if query_lower.is_empty() {
            return Some(Vec::new());
        }

        match self.lower_titles.as_deref() {
            Some(lower_titles) => {
                Self::fuzzy_match_positions_lower(&lower_titles[track_index], query_lower)
            }
            None => Self::fuzzy_match_positions(&self.tracks[track_index].display, query_lower),
        }
    }

    /// Return the next visible index after `current`, wrapping to the first.
    pub fn next_in_view_from(&self, current: usize) -> Option<usize> {
        let display = self.display_indices();
        if display.is_empty() {
            return None;
        }

        match display.iter().position(|&i| i == current) {
            Some(p) => Some(display[(p + 1) % display.len()]),
            None => Some(display[0]),
        }
    }

    /// Return the previous visible index before `current`, wrapping to the last.
    pub fn prev_in_view_from(&self, current: usize) -> Option<usize> {
        let display = self.display_indices();
        let last = *display.last()?;

        match display.iter().position(|&i| i == current) {
            Some(0) | None => Some(last),
            Some(p) => Some(display[p - 1]),
        }
    }

    /// Song to play once the current one finishes, or `None` to stay put.
    ///
    /// Repeat wins over everything. Shuffle picks uniformly among the other
    /// visible songs using `draw` (a value in `[0, 1)`). Plain auto-advance
    /// stops after the last visible song.
    pub fn after_finish(&self, draw: impl FnOnce() -> f64) -> Option<usize> {
        let current = self.current?;
        if self.repeat {
            return Some(current);
        }
        if !self.auto_advance {
            return None;
        }

        let display = self.display_indices();
        if self.shuffle {
            let others: Vec<usize> = display.into_iter().filter(|&i| i != current).collect();
            if others.is_empty() {
                return None;
            }
            let pick = ((draw() * others.len() as f64) as usize).min(others.len() - 1);
            return Some(others[pick]);
        }

        let pos = display.iter().position(|&i| i == current)?;
        display.get(pos + 1).copied()
    }

    /// Fuzzy/subsequence match: return the character positions in `title`
    /// that match `query`, or `None` if not matched.
    pub fn fuzzy_match_positions(title: &str, query: &str) -> Option<Vec<usize>> {
        if query.is_empty() {
            return Some(Vec::new());
        }

        let mut positions: Vec<usize> = Vec::new();
        let mut title_iter = title.chars().enumerate();

        for qc in query.chars() {
            let qc_low = qc.to_ascii_lowercase();
            loop {
                match title_iter.next() {
                    Some((ti, tc)) if tc.to_ascii_lowercase() == qc_low => {
                        positions.push(ti);
                        break;
                    }
                    Some(_) => continue,
                    None => return None,
                }
            }
        }

        Some(positions)
    }

    fn fuzzy_match_positions_lower(title_lower: &str, query_lower: &str) -> Option<Vec<usize>> {
        if query_lower.is_empty() {
            return Some(Vec::new());
        }

        let mut positions: Vec<usize> = Vec::new();
        let mut title_iter = title_lower.chars().enumerate();

        for qc in query_lower.chars() {
            loop {
                match title_iter.next() {
                    Some((ti, tc)) if tc == qc => {
                        positions.push(ti);
                        break;
                    }
                    Some(_) => continue,
                    None => return None,
                }
            }
        }

        Some(positions)
    }

    pub fn enter_filter_mode(&mut self) {
        self.filter_mode = true;
        self.ensure_selected_visible();
    }

    pub fn exit_filter_mode(&mut self) {
        self.filter_mode = false;
    }

    /// Clear the active filter and restore selection visibility.
    pub fn clear_filter(&mut self) {
        self.filter_query.clear();
        self.filter_mode = false;
        self.ensure_selected_visible();
    }

    pub fn push_filter_char(&mut self, c: char) {
        self.filter_query.push(c);
        self.ensure_selected_visible();
    }

    pub fn pop_filter_char(&mut self) {
        self.filter_query.pop();
        self.ensure_selected_visible();
    }

    /// Keep `selected` inside the filtered view, falling back to its first entry.
    fn ensure_selected_visible(&mut self) {
        let display = self.display_indices();
        if display.is_empty() {
            self.selected = 0;
            return;
        }

        if !display.contains(&self.selected) {
            self.selected = display[0];
        }
    }

    /// Select the `n`th visible song (1-based), or the last one for `0`.
    pub fn select_numbered(&mut self, n: usize) {
        let display = self.display_indices();
        let pick = match n {
            0 => display.last(),
            n => display.get(n - 1),
        };
        if let Some(&i) = pick {
            self.selected = i;
        }
    }

    /// Move selection to the next visible track.
    pub fn next(&mut self) {
        if let Some(next) = self.next_in_view_from(self.selected) {
            self.selected = next;
        }
    }

    /// Move selection to the previous visible track.
    pub fn prev(&mut self) {
        if let Some(prev) = self.prev_in_view_from(self.selected) {
            self.selected = prev;
        }
    }
}
