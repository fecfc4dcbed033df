//! Simulated audio spectrum.
//!
//! There is no signal analysis. Bar heights come from the beat phase plus some
//! noise, which is enough to make the panel move in time with the song.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::karaoke::beat_phase;

pub const BANDS: usize = 12;
pub const MAX_HEIGHT: u8 = 8;

const BASE_HEIGHT: u8 = 2;
const BEAT_BOOST: u8 = 3;
const SPIKE: u8 = 3;
const SPIKE_CHANCE: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Bass,
    Mid,
    High,
}

impl Band {
    pub fn of(index: usize) -> Self {
        match index {
            0..=2 => Self::Bass,
            3..=6 => Self::Mid,
            _ => Self::High,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Energy {
    Quiet,
    Gentle,
    Moderate,
    High,
    Intense,
}

impl Energy {
    pub fn of(intensity: f64) -> Self {
        if intensity > 0.8 {
            Self::Intense
        } else if intensity > 0.6 {
            Self::High
        } else if intensity > 0.4 {
            Self::Moderate
        } else if intensity > 0.2 {
            Self::Gentle
        } else {
            Self::Quiet
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Intense => "INTENSE ENERGY!",
            Self::High => "HIGH ENERGY",
            Self::Moderate => "MODERATE VIBES",
            Self::Gentle => "~ Gentle Flow ~",
            Self::Quiet => "∙ Quiet Moment ∙",
        }
    }
}

pub struct Spectrum {
    bars: [u8; BANDS],
    phase: u8,
    rng: StdRng,
}

impl Spectrum {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            bars: [0; BANDS],
            phase: 0,
            rng,
        }
    }

    /// Re-roll the bars for `position`. Bars drop to zero while not playing.
    ///
    /// Bass pulses on beats 0 and 2 of the bar, mids stay busy and highs
    /// occasionally spike.
    pub fn update(&mut self, position: Duration, playing: bool) {
        if !playing {
            self.bars = [0; BANDS];
            return;
        }

        self.phase = beat_phase(position);
        let strong_beat = self.phase % 2 == 0;
        for (i, bar) in self.bars.iter_mut().enumerate() {
            let height = match Band::of(i) {
                Band::Bass => {
                    let boost = if strong_beat { BEAT_BOOST } else { 0 };
                    BASE_HEIGHT + boost + self.rng.random_range(0..2)
                }
                Band::Mid => BASE_HEIGHT + 2 + self.rng.random_range(0..3),
                Band::High => {
                    let mut sparkle = self.rng.random_range(0..4);
                    if self.rng.random::<f64>() < SPIKE_CHANCE {
                        sparkle += SPIKE;
                    }
                    BASE_HEIGHT + sparkle
                }
            };
            *bar = height.min(MAX_HEIGHT);
        }
    }

    pub fn bars(&self) -> &[u8; BANDS] {
        &self.bars
    }

    pub fn phase(&self) -> u8 {
        self.phase
    }

    /// Mean bar height as a fraction of the maximum.
    pub fn intensity(&self) -> f64 {
        let total: u32 = self.bars.iter().map(|&b| u32::from(b)).sum();
        f64::from(total) / (BANDS as f64 * f64::from(MAX_HEIGHT))
    }

    pub fn energy(&self) -> Energy {
        Energy::of(self.intensity())
    }
}
