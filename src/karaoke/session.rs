use std::time::Duration;

use tracing::debug;

use crate::lyrics::LyricTimeline;

const BEAT_MS: u128 = 250;
const BEATS_PER_BAR: u128 = 4;

const BASE_CHANCE: f64 = 0.70;
const STREAK_CHANCE_STEP: f64 = 0.05;
const STREAK_CHANCE_CAP: f64 = 0.20;
const PROGRESS_CHANCE: f64 = 0.10;
const BEAT_CHANCE: f64 = 0.10;
const MAX_CHANCE: f64 = 0.95;

const BASE_POINTS: u64 = 100;
/// Each streak step adds a tenth of the base.
const STREAK_POINTS: u64 = 10;
const BEAT_POINTS: u64 = 50;

/// Position within the four-beat bar, 0..=3.
pub fn beat_phase(position: Duration) -> u8 {
    ((position.as_millis() / BEAT_MS) % BEATS_PER_BAR) as u8
}

pub fn is_on_beat(position: Duration) -> bool {
    beat_phase(position) == 0
}

/// Probability that the line at `index` (of `line_count`) is hit.
pub fn hit_chance(streak: u32, index: usize, line_count: usize, on_beat: bool) -> f64 {
    let streak_bonus = (STREAK_CHANCE_STEP * streak as f64).min(STREAK_CHANCE_CAP);
    let progress_bonus = if line_count == 0 {
        0.0
    } else {
        PROGRESS_CHANCE * index as f64 / line_count as f64
    };
    let beat_bonus = if on_beat { BEAT_CHANCE } else { 0.0 };
    (BASE_CHANCE + streak_bonus + progress_bonus + beat_bonus).min(MAX_CHANCE)
}

fn milestone_bonus(streak: u32) -> u64 {
    match streak {
        5 => 500,
        10 => 1_000,
        s if s > 0 && s % 15 == 0 => 2_000,
        _ => 0,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct LineMark {
    active: bool,
    hit: bool,
}

/// Score state for one playback of one song.
#[derive(Debug, Clone, Default)]
pub struct KaraokeSession {
    score: u64,
    streak: u32,
    hits: u32,
    total_lines: usize,
    accuracy: f64,
    marks: Vec<LineMark>,
}

/// Copy of the score state for display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KaraokeSnapshot {
    pub score: u64,
    pub streak: u32,
    pub hits: u32,
    pub total_lines: usize,
    /// Percentage, 0-100.
    pub accuracy: f64,
    pub line_hits: Vec<bool>,
}

impl KaraokeSession {
    pub fn new(total_lines: usize) -> Self {
        let mut s = Self::default();
        s.reset(total_lines);
        s
    }

    pub fn reset(&mut self, total_lines: usize) {
        self.score = 0;
        self.streak = 0;
        self.hits = 0;
        self.accuracy = 0.0;
        self.total_lines = total_lines;
        self.marks = vec![LineMark::default(); total_lines];
    }

    /// Advance scoring to `position`. `draw` yields uniform values in `[0, 1)`.
    pub fn tick(
        &mut self,
        timeline: &LyricTimeline,
        position: Duration,
        mut draw: impl FnMut() -> f64,
    ) {
        if self.marks.len() != timeline.len() {
            self.reset(timeline.len());
        }

        if let Some(index) = timeline.active_index(position) {
            let mark = &mut self.marks[index];
            if !mark.active && !mark.hit {
                mark.active = true;
                let on_beat = is_on_beat(position);
                let chance = hit_chance(self.streak, index, self.total_lines, on_beat);
                if draw() < chance {
                    self.award_hit(index, on_beat);
                }
            }
        }

        self.accuracy = self.compute_accuracy();
    }

    /// Record a hit on `index`. Hitting the same line twice does nothing.
    pub fn award_hit(&mut self, index: usize, on_beat: bool) {
        let Some(mark) = self.marks.get_mut(index) else {
            return;
        };
        if mark.hit {
            return;
        }
        mark.hit = true;
        self.hits += 1;

        let mut points = BASE_POINTS + STREAK_POINTS * u64::from(self.streak);
        if on_beat {
            points += BEAT_POINTS;
        }
        self.score += points;

        self.streak += 1;
        let bonus = milestone_bonus(self.streak);
        self.score += bonus;

        debug!(line = index, points, bonus, streak = self.streak, "lyric hit");
    }

    fn compute_accuracy(&self) -> f64 {
        if self.total_lines == 0 {
            0.0
        } else {
            self.hits as f64 / self.total_lines as f64 * 100.0
        }
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    pub fn is_line_hit(&self, index: usize) -> bool {
        self.marks.get(index).is_some_and(|m| m.hit)
    }

    pub fn snapshot(&self) -> KaraokeSnapshot {
        KaraokeSnapshot {
            score: self.score,
            streak: self.streak,
            hits: self.hits,
            total_lines: self.total_lines,
            accuracy: self.accuracy,
            line_hits: self.marks.iter().map(|m| m.hit).collect(),
        }
    }
}
