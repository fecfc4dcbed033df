use std::time::Duration;

use super::*;
use crate::lyrics::LyricTimeline;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

/// Lines every second, so every line start falls on beat phase 0.
fn timeline(lines: usize) -> LyricTimeline {
    LyricTimeline::new((0..lines).map(|i| (Duration::from_secs(i as u64 + 1), format!("line {i}"))))
}

fn always_hit() -> f64 {
    0.0
}

fn always_miss() -> f64 {
    0.99
}

fn sing_through(session: &mut KaraokeSession, t: &LyricTimeline, draw: fn() -> f64) {
    for line in t.lines() {
        session.tick(t, line.time, draw);
    }
}

#[test]
fn beat_phase_cycles_every_quarter_second() {
    assert_eq!(beat_phase(ms(0)), 0);
    assert_eq!(beat_phase(ms(249)), 0);
    assert_eq!(beat_phase(ms(250)), 1);
    assert_eq!(beat_phase(ms(750)), 3);
    assert_eq!(beat_phase(ms(1_000)), 0);
    assert!(is_on_beat(ms(2_100)));
    assert!(!is_on_beat(ms(2_300)));
}

#[test]
fn hit_chance_adds_bonuses_and_caps() {
    assert!((hit_chance(0, 0, 10, false) - 0.70).abs() < 1e-9);
    assert!((hit_chance(2, 0, 10, false) - 0.80).abs() < 1e-9);
    // Streak bonus tops out at +0.20.
    assert!((hit_chance(50, 0, 10, false) - 0.90).abs() < 1e-9);
    assert!((hit_chance(0, 5, 10, false) - 0.75).abs() < 1e-9);
    assert!((hit_chance(0, 0, 10, true) - 0.80).abs() < 1e-9);
    assert!((hit_chance(10, 9, 10, true) - 0.95).abs() < 1e-9);
    assert!((hit_chance(0, 3, 0, false) - 0.70).abs() < 1e-9);
}

#[test]
fn first_hits_score_base_plus_streak_plus_beat() {
    let t = timeline(3);
    let mut s = KaraokeSession::new(t.len());
    sing_through(&mut s, &t, always_hit);
    // 150 + 160 + 170, all on beat.
    assert_eq!(s.score(), 480);
    assert_eq!(s.streak(), 3);
    assert_eq!(s.hits(), 3);
}

#[test]
fn five_straight_hits_award_the_streak_bonus_once() {
    let t = timeline(6);
    let mut s = KaraokeSession::new(t.len());
    for line in &t.lines()[..5] {
        s.tick(&t, line.time, always_hit);
    }
    // 150 + 160 + 170 + 180 + 190 + 500.
    assert_eq!(s.score(), 1_350);

    // Ticking again inside the fifth line adds nothing.
    s.tick(&t, t.lines()[4].time + ms(500), always_hit);
    assert_eq!(s.score(), 1_350);

    // The sixth hit is plain: 200 + 50.
    s.tick(&t, t.lines()[5].time, always_hit);
    assert_eq!(s.score(), 1_600);
}

#[test]
fn milestones_at_ten_and_multiples_of_fifteen() {
    let t = timeline(30);
    let mut s = KaraokeSession::new(t.len());
    sing_through(&mut s, &t, always_hit);

    let per_hit: u64 = (0..30u64).map(|k| 100 + 10 * k + 50).sum();
    assert_eq!(s.score(), per_hit + 500 + 1_000 + 2_000 + 2_000);
    assert_eq!(s.streak(), 30);
}

#[test]
fn each_line_is_judged_only_on_its_first_visit() {
    let t = timeline(2);
    let mut s = KaraokeSession::new(t.len());
    s.tick(&t, t.lines()[0].time, always_miss);
    // A lucky draw on a later tick of the same line does not count.
    s.tick(&t, t.lines()[0].time + ms(200), always_hit);
    assert_eq!(s.hits(), 0);
    assert!(!s.is_line_hit(0));

    s.tick(&t, t.lines()[1].time, always_hit);
    assert!(s.is_line_hit(1));
    assert_eq!(s.hits(), 1);
}

#[test]
fn a_miss_keeps_the_streak() {
    let t = timeline(4);
    let mut s = KaraokeSession::new(t.len());
    s.tick(&t, t.lines()[0].time, always_hit);
    s.tick(&t, t.lines()[1].time, always_hit);
    s.tick(&t, t.lines()[2].time, always_miss);
    assert_eq!(s.streak(), 2);
}

#[test]
fn accuracy_is_hits_over_all_lines() {
    let t = timeline(4);
    let mut s = KaraokeSession::new(t.len());
    s.tick(&t, t.lines()[0].time, always_hit);
    assert!((s.accuracy() - 25.0).abs() < 1e-9);
    s.tick(&t, t.lines()[1].time, always_miss);
    s.tick(&t, t.lines()[2].time, always_hit);
    assert!((s.accuracy() - 50.0).abs() < 1e-9);
}

#[test]
fn positions_before_the_first_line_only_refresh_accuracy() {
    let t = timeline(2);
    let mut s = KaraokeSession::new(t.len());
    let mut draws = 0;
    s.tick(&t, ms(500), || {
        draws += 1;
        0.0
    });
    assert_eq!(draws, 0);
    assert_eq!(s.snapshot(), KaraokeSnapshot {
        total_lines: 2,
        line_hits: vec![false, false],
        ..KaraokeSnapshot::default()
    });
}

#[test]
fn empty_timeline_scores_nothing() {
    let t = LyricTimeline::empty();
    let mut s = KaraokeSession::new(0);
    s.tick(&t, ms(10_000), always_hit);
    assert_eq!(s.score(), 0);
    assert_eq!(s.accuracy(), 0.0);
}

#[test]
fn reset_clears_everything() {
    let t = timeline(8);
    let mut s = KaraokeSession::new(t.len());
    sing_through(&mut s, &t, always_hit);
    assert_eq!(s.streak(), 8);

    s.reset(t.len());
    assert_eq!(s.streak(), 0);
    assert_eq!(s.score(), 0);
    assert_eq!(s.hits(), 0);
    assert!(s.snapshot().line_hits.iter().all(|h| !h));
}

#[test]
fn award_hit_ignores_repeat_and_out_of_range() {
    let mut s = KaraokeSession::new(2);
    s.award_hit(0, false);
    s.award_hit(0, false);
    s.award_hit(9, true);
    assert_eq!(s.hits(), 1);
    assert_eq!(s.score(), 100);
}

#[test]
fn streak_tiers_and_labels() {
    assert_eq!(StreakTier::of(0), StreakTier::None);
    assert_eq!(StreakTier::of(4), StreakTier::Warm);
    assert_eq!(StreakTier::of(5), StreakTier::Hot);
    assert_eq!(StreakTier::of(19), StreakTier::Blazing);
    assert_eq!(StreakTier::of(20), StreakTier::Legendary);
    assert_eq!(StreakTier::of(12).label(12), "STREAK: 12");
    assert_eq!(StreakTier::of(3).label(3), "Streak: 3");
}

#[test]
fn score_tiers() {
    assert_eq!(ScoreTier::of(999), ScoreTier::Starting);
    assert_eq!(ScoreTier::of(1_000), ScoreTier::Good);
    assert_eq!(ScoreTier::of(4_999), ScoreTier::Great);
    assert_eq!(ScoreTier::of(10_000), ScoreTier::Legendary);
}

#[test]
fn performance_prefers_streak_over_accuracy() {
    let snap = |streak, accuracy| KaraokeSnapshot {
        streak,
        accuracy,
        ..KaraokeSnapshot::default()
    };
    assert_eq!(Performance::of(&snap(20, 0.0), false), Performance::Ready);
    assert_eq!(Performance::of(&snap(15, 0.0), true), Performance::Legendary);
    assert_eq!(Performance::of(&snap(10, 0.0), true), Performance::OnFire);
    assert_eq!(Performance::of(&snap(5, 0.0), true), Performance::GreatRhythm);
    assert_eq!(Performance::of(&snap(1, 85.0), true), Performance::Excellent);
    assert_eq!(Performance::of(&snap(1, 60.0), true), Performance::Good);
    assert_eq!(Performance::of(&snap(0, 10.0), true), Performance::FindingRhythm);
}
