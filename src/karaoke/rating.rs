//! Labels derived from a score snapshot for the score panel.

use super::KaraokeSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakTier {
    None,
    Warm,
    Hot,
    Blazing,
    Legendary,
}

impl StreakTier {
    pub fn of(streak: u32) -> Self {
        match streak {
            0 => Self::None,
            1..=4 => Self::Warm,
            5..=9 => Self::Hot,
            10..=19 => Self::Blazing,
            _ => Self::Legendary,
        }
    }

    pub fn label(self, streak: u32) -> String {
        match self {
            Self::Blazing => format!("STREAK: {streak}"),
            Self::Legendary => format!("LEGENDARY: {streak}"),
            _ => format!("Streak: {streak}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreTier {
    Starting,
    Good,
    Great,
    Amazing,
    Legendary,
}

impl ScoreTier {
    pub fn of(score: u64) -> Self {
        match score {
            10_000.. => Self::Legendary,
            5_000.. => Self::Amazing,
            2_000.. => Self::Great,
            1_000.. => Self::Good,
            _ => Self::Starting,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Performance {
    Ready,
    Legendary,
    OnFire,
    GreatRhythm,
    Excellent,
    Good,
    FindingRhythm,
}

impl Performance {
    /// Streak takes precedence over accuracy.
    pub fn of(snapshot: &KaraokeSnapshot, playing: bool) -> Self {
        if !playing {
            return Self::Ready;
        }
        match snapshot.streak {
            15.. => Self::Legendary,
            10.. => Self::OnFire,
            5.. => Self::GreatRhythm,
            _ if snapshot.accuracy >= 80.0 => Self::Excellent,
            _ if snapshot.accuracy >= 60.0 => Self::Good,
            _ => Self::FindingRhythm,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Ready => "Ready to Sing!",
            Self::Legendary => "LEGENDARY PERFORMANCE!",
            Self::OnFire => "ON FIRE! UNSTOPPABLE!",
            Self::GreatRhythm => "GREAT RHYTHM! KEEP GOING!",
            Self::Excellent => "Excellent Singing!",
            Self::Good => "Good Performance!",
            Self::FindingRhythm => "Finding Your Rhythm...",
        }
    }
}
