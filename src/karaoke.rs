//! Simulated karaoke scoring.
//!
//! There is no pitch detection: each lyric line gets one weighted coin flip the
//! first time playback reaches it, and hits build a streak that multiplies the
//! points of later hits.

mod rating;
mod session;

pub use rating::{Performance, ScoreTier, StreakTier};
pub use session::{KaraokeSession, KaraokeSnapshot, beat_phase, hit_chance, is_on_beat};

#[cfg(test)]
mod tests;
