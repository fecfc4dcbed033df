use std::collections::BTreeMap;
use std::time::Duration;

use tracing::warn;

use crate::error::{PlayerError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricLine {
    /// Offset from the start of the track at which the line becomes active.
    pub time: Duration,
    /// Empty text marks a rest.
    pub text: String,
    pub index: usize,
}

impl LyricLine {
    pub fn is_rest(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct LyricTimeline {
    lines: Vec<LyricLine>,
    metadata: BTreeMap<String, String>,
}

impl LyricTimeline {
    /// Store `entries` as given, numbering them in order.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Duration, S)>,
        S: Into<String>,
    {
        let lines = entries
            .into_iter()
            .enumerate()
            .map(|(index, (time, text))| LyricLine {
                time,
                text: text.into(),
                index,
            })
            .collect();
        Self {
            lines,
            metadata: BTreeMap::new(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a timeline and fall back to an empty one when the timestamps are
    /// out of order. Missing lyrics never block playback.
    pub fn validated<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (Duration, S)>,
        S: Into<String>,
    {
        let timeline = Self::new(entries);
        match timeline.validate() {
            Ok(()) => timeline,
            Err(e) => {
                warn!(error = %e, "discarding lyrics");
                Self::empty()
            }
        }
    }

    pub fn with_metadata(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Fail with `UnorderedTimeline` at the first line earlier than its predecessor.
    pub fn validate(&self) -> Result<()> {
        match self
            .lines
            .windows(2)
            .position(|w| w[1].time < w[0].time)
        {
            Some(i) => Err(PlayerError::UnorderedTimeline { index: i + 1 }),
            None => Ok(()),
        }
    }

    /// Index of the last line whose timestamp is at or before `position`.
    ///
    /// `None` when `position` precedes the first line (or there are no lines).
    pub fn active_index(&self, position: Duration) -> Option<usize> {
        let after = self.lines.partition_point(|l| l.time <= position);
        after.checked_sub(1)
    }

    pub fn lines(&self) -> &[LyricLine] {
        &self.lines
    }

    pub fn get(&self, index: usize) -> Option<&LyricLine> {
        self.lines.get(index)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Header tags such as `ti`, `ar` and `al`.
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}
