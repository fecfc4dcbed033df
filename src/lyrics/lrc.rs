//! LRC lyric files.
//!
//! Timed lines look like `[mm:ss.xx]text` (the fraction is optional and may
//! carry two or three digits). A line may carry several time tags, in which case
//! it is emitted once per tag and the entries are put in time order. Header tags
//! such as `[ti:Title]` are collected as metadata. Anything else is skipped.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use tracing::debug;

use crate::error::Result;

use super::LyricTimeline;

/// Parsed LRC content before it becomes a timeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LrcDocument {
    pub entries: Vec<(Duration, String)>,
    pub metadata: BTreeMap<String, String>,
}

impl LrcDocument {
    pub fn into_timeline(self) -> LyricTimeline {
        LyricTimeline::validated(self.entries).with_metadata(self.metadata)
    }
}

pub fn parse(input: &str) -> LrcDocument {
    let mut doc = LrcDocument::default();

    for raw in input.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let (stamps, text) = split_time_tags(line);
        if !stamps.is_empty() {
            for t in stamps {
                doc.entries.push((t, text.to_string()));
            }
            continue;
        }

        if let Some((key, value)) = parse_header(line) {
            doc.metadata.insert(key, value);
        }
    }

    // Repeated choruses interleave with later lines; stable so equal stamps keep file order.
    doc.entries.sort_by_key(|(t, _)| *t);
    doc
}

/// Read and parse an LRC file into a timeline.
pub fn load_file(path: &Path) -> Result<LyricTimeline> {
    let contents = fs::read_to_string(path)?;
    let doc = parse(&contents);
    debug!(path = %path.display(), lines = doc.entries.len(), "parsed lyrics");
    Ok(doc.into_timeline())
}

/// Peel leading time tags off `line`, returning them with the remaining text.
fn split_time_tags(line: &str) -> (Vec<Duration>, &str) {
    let mut stamps = Vec::new();
    let mut rest = line;

    while let Some(body) = rest.strip_prefix('[') {
        let Some(close) = body.find(']') else {
            break;
        };
        let Some(t) = parse_timestamp(&body[..close]) else {
            break;
        };
        stamps.push(t);
        rest = &body[close + 1..];
    }

    (stamps, rest.trim())
}

/// `mm:ss`, `mm:ss.xx` or `mm:ss.xxx`.
fn parse_timestamp(tag: &str) -> Option<Duration> {
    let (min, sec_part) = tag.split_once(':')?;
    let (sec, frac) = match sec_part.split_once('.') {
        Some((s, f)) => (s, Some(f)),
        None => (sec_part, None),
    };

    if min.len() != 2 || sec.len() != 2 {
        return None;
    }
    let minutes: u64 = digits(min)?;
    let seconds: u64 = digits(sec)?;
    if seconds >= 60 {
        return None;
    }

    let millis = match frac {
        None => 0,
        Some(f) if f.len() == 2 => digits(f)? * 10,
        Some(f) if f.len() == 3 => digits(f)?,
        Some(_) => return None,
    };

    Some(Duration::from_millis((minutes * 60 + seconds) * 1_000 + millis))
}

fn digits(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn parse_header(line: &str) -> Option<(String, String)> {
    let body = line.strip_prefix('[')?.strip_suffix(']')?;
    let (key, value) = body.split_once(':')?;
    let key = key.trim().to_ascii_lowercase();
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    Some((key, value.trim().to_string()))
}
