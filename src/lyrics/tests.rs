use std::fs;
use std::time::Duration;

use tempfile::tempdir;

use super::*;
use crate::error::PlayerError;

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

fn sample_timeline() -> LyricTimeline {
    LyricTimeline::new([(secs(0), "A"), (secs(3), "B"), (secs(6), "")])
}

#[test]
fn active_index_picks_last_line_at_or_before_position() {
    let t = sample_timeline();
    assert_eq!(t.active_index(secs(4)), Some(1));
    assert_eq!(t.active_index(Duration::from_millis(500)), Some(0));
    assert_eq!(t.active_index(secs(3)), Some(1));
    assert_eq!(t.active_index(secs(60)), Some(2));
}

#[test]
fn active_index_is_none_before_first_line() {
    let t = LyricTimeline::new([(secs(2), "late start")]);
    assert_eq!(t.active_index(secs(1)), None);
    assert_eq!(LyricTimeline::empty().active_index(secs(5)), None);
}

#[test]
fn active_index_never_goes_backwards_as_time_advances() {
    let t = LyricTimeline::new([
        (secs(1), "a"),
        (secs(1), "b"),
        (secs(4), "c"),
        (secs(9), "d"),
    ]);
    let mut last = None;
    for ms in (0..12_000).step_by(50) {
        let idx = t.active_index(Duration::from_millis(ms));
        assert!(idx >= last, "went back at {ms}ms");
        last = idx;
    }
}

#[test]
fn rest_lines_keep_their_slot() {
    let t = sample_timeline();
    let rest = t.get(2).unwrap();
    assert!(rest.is_rest());
    assert_eq!(rest.index, 2);
}

#[test]
fn validate_reports_first_out_of_order_index() {
    let t = LyricTimeline::new([(secs(0), "a"), (secs(5), "b"), (secs(2), "c"), (secs(1), "d")]);
    assert!(matches!(
        t.validate(),
        Err(PlayerError::UnorderedTimeline { index: 2 })
    ));
    assert!(sample_timeline().validate().is_ok());
}

#[test]
fn validated_degrades_unordered_input_to_empty() {
    let t = LyricTimeline::validated([(secs(5), "b"), (secs(2), "a")]);
    assert!(t.is_empty());
}

#[test]
fn parse_reads_timestamps_text_and_rests() {
    let doc = parse("[00:01.50]Hello\n[00:03.00]\n[01:02.25] World  \n");
    assert_eq!(
        doc.entries,
        vec![
            (Duration::from_millis(1_500), "Hello".to_string()),
            (secs(3), String::new()),
            (Duration::from_millis(62_250), "World".to_string()),
        ]
    );
}

#[test]
fn parse_collects_header_tags_as_metadata() {
    let doc = parse("[ti:Song Title]\n[ar: Someone ]\n[al:Record]\n[by:me]\n[00:00.00]go");
    assert_eq!(doc.metadata.get("ti").map(String::as_str), Some("Song Title"));
    assert_eq!(doc.metadata.get("ar").map(String::as_str), Some("Someone"));
    assert_eq!(doc.metadata.len(), 4);
    assert_eq!(doc.entries.len(), 1);
}

#[test]
fn parse_skips_blank_untagged_and_malformed_lines() {
    let doc = parse("just words\n\n[0:01.00]short minutes\n[00:75.00]bad seconds\n[00:01.5]odd fraction\n[00:02]ok");
    assert_eq!(doc.entries, vec![(secs(2), "ok".to_string())]);
}

#[test]
fn parse_expands_lines_with_several_time_tags() {
    let doc = parse("[00:10.00][00:20.00]Chorus");
    assert_eq!(
        doc.entries,
        vec![
            (secs(10), "Chorus".to_string()),
            (secs(20), "Chorus".to_string()),
        ]
    );
}

#[test]
fn repeated_chorus_tags_are_put_in_time_order() {
    let t = parse("[00:10.00][01:30.00]Chorus\n[00:20.00]Verse one\n[00:40.00]Verse two\n")
        .into_timeline();

    let times: Vec<u64> = t.lines().iter().map(|l| l.time.as_secs()).collect();
    assert_eq!(times, vec![10, 20, 40, 90]);
    assert!(t.validate().is_ok());
    assert_eq!(t.active_index(secs(25)).map(|i| t.get(i).unwrap().text.as_str()), Some("Verse one"));
    assert_eq!(t.active_index(secs(95)).map(|i| t.get(i).unwrap().text.as_str()), Some("Chorus"));
}

#[test]
fn equal_timestamps_keep_file_order() {
    let doc = parse("[00:05.00]first\n[00:05.00]second\n[00:01.00]intro");
    let texts: Vec<&str> = doc.entries.iter().map(|(_, s)| s.as_str()).collect();
    assert_eq!(texts, vec!["intro", "first", "second"]);
}

#[test]
fn parse_accepts_millisecond_fractions() {
    let doc = parse("[00:01.250]x");
    assert_eq!(doc.entries[0].0, Duration::from_millis(1_250));
}

#[test]
fn load_file_builds_a_timeline_with_metadata() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("song.lrc");
    fs::write(&path, "[ti:Demo]\n[00:00.00]A\n[00:03.00]B\n[00:06.00]\n").unwrap();

    let t = load_file(&path).unwrap();
    assert_eq!(t.len(), 3);
    assert_eq!(t.metadata("ti"), Some("Demo"));
    assert_eq!(t.active_index(secs(4)), Some(1));
}

#[test]
fn load_file_sorts_out_of_order_stamps() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("shuffled.lrc");
    fs::write(&path, "[00:05.00]late\n[00:01.00]early\n").unwrap();

    let t = load_file(&path).unwrap();
    assert_eq!(t.len(), 2);
    assert_eq!(t.get(0).unwrap().text, "early");
    assert_eq!(t.active_index(secs(6)), Some(1));
}

#[test]
fn load_file_missing_is_io_error() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        load_file(&dir.path().join("none.lrc")),
        Err(PlayerError::Io(_))
    ));
}
