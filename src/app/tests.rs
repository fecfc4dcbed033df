use super::*;
use crate::config::Settings;
use crate::library::Track;

fn t(title: &str) -> Track {
    Track {
        path: std::path::PathBuf::new(),
        title: title.into(),
        artist: None,
        album: None,
        duration: None,
        display: title.into(),
        lyrics: None,
    }
}

fn app_of(titles: &[&str]) -> App {
    App::new(titles.iter().map(|s| t(s)).collect())
}

#[test]
fn fuzzy_match_simple() {
    let title = "Hello World";
    assert!(App::fuzzy_match_positions(title, "hw").is_some());
    assert!(App::fuzzy_match_positions(title, "ello").is_some());
    assert!(App::fuzzy_match_positions(title, "xyz").is_none());
    assert_eq!(App::fuzzy_match_positions(title, "HW"), Some(vec![0, 6]));
}

#[test]
fn display_indices_respects_filter_query() {
    let mut app = app_of(&["Alpha", "Beta", "Gamma", "Delta"]);
    app.filter_query = "et".into();
    assert_eq!(app.display_indices(), vec![1, 3]);
}

#[test]
fn display_indices_uses_fuzzy_not_substring_only() {
    let mut app = app_of(&["Metallica - Blackened", "Black Sabbath - Paranoid"]);
    // Letters appear in order but not contiguously.
    app.filter_query = "mtbk".into();
    assert_eq!(app.display_indices(), vec![0]);
}

#[test]
fn trimming_filter_query_affects_matching() {
    let mut app = app_of(&["Black Sabbath - Paranoid"]);
    app.filter_query = "Black ".into();
    assert_eq!(app.display_indices(), vec![0]);

    app.filter_query = "   ".into();
    assert_eq!(app.display_indices(), vec![0]);
}

#[test]
fn large_libraries_filter_through_lowercase_cache() {
    let titles: Vec<String> = (0..150).map(|i| format!("Song {i:03}")).collect();
    let mut app = App::new(titles.iter().map(|s| t(s)).collect());
    app.filter_query = "SONG 14".into();
    let visible = app.display_indices();
    assert_eq!(visible.len(), 10);
    assert!(app.fuzzy_match_positions_for_track_lower(140, "song 14").is_some());
}

#[test]
fn next_prev_in_view_helpers_work() {
    let mut app = app_of(&["Alpha", "Beta", "Gamma"]);
    app.filter_query = "et".into(); // only Beta is visible

    assert_eq!(app.next_in_view_from(0), Some(1));
    assert_eq!(app.prev_in_view_from(0), Some(1));
    assert_eq!(app.next_in_view_from(1), Some(1));
    assert_eq!(app.prev_in_view_from(1), Some(1));
}

#[test]
fn next_and_prev_wrap_around() {
    let mut app = app_of(&["A", "B", "C"]);
    app.prev();
    assert_eq!(app.selected, 2);
    app.next();
    assert_eq!(app.selected, 0);
}

#[test]
fn filter_moves_selection_into_view() {
    let mut app = app_of(&["Alpha", "Beta", "Gamma"]);
    app.selected = 0;
    app.enter_filter_mode();
    app.push_filter_char('g');
    assert_eq!(app.selected, 2);
    app.clear_filter();
    assert!(!app.filter_mode);
    assert_eq!(app.display_indices().len(), 3);
}

#[test]
fn after_finish_repeat_replays_current() {
    let mut app = app_of(&["A", "B"]);
    app.current = Some(1);
    app.repeat = true;
    assert_eq!(app.after_finish(|| 0.5), Some(1));
}

#[test]
fn after_finish_advances_and_stops_at_end() {
    let mut app = app_of(&["A", "B", "C"]);
    app.current = Some(1);
    assert_eq!(app.after_finish(|| 0.0), Some(2));
    app.current = Some(2);
    assert_eq!(app.after_finish(|| 0.0), None);

    app.auto_advance = false;
    app.current = Some(0);
    assert_eq!(app.after_finish(|| 0.0), None);
}

#[test]
fn after_finish_shuffle_never_picks_current() {
    let mut app = app_of(&["A", "B", "C"]);
    app.shuffle = true;
    app.current = Some(1);
    assert_eq!(app.after_finish(|| 0.0), Some(0));
    assert_eq!(app.after_finish(|| 0.999), Some(2));

    let mut solo = app_of(&["Only"]);
    solo.shuffle = true;
    solo.current = Some(0);
    assert_eq!(solo.after_finish(|| 0.3), None);
}

#[test]
fn after_finish_without_current_is_none() {
    let app = app_of(&["A"]);
    assert_eq!(app.after_finish(|| 0.0), None);
}

#[test]
fn volume_steps_clamp_and_mute_restores() {
    let mut app = app_of(&[]);
    app.volume = 0.95;
    assert_eq!(app.step_volume(0.1), 1.0);
    assert_eq!(app.step_volume(-0.3), 0.7);

    assert_eq!(app.toggle_mute(), 0.0);
    assert!(app.is_muted());
    assert_eq!(app.toggle_mute(), 0.7);
    assert!(!app.is_muted());

    app.toggle_mute();
    assert_eq!(app.step_volume(0.1), 0.1);
    assert!(!app.is_muted());
}

#[test]
fn with_settings_copies_startup_toggles() {
    let mut settings = Settings::default();
    settings.playback.repeat = true;
    settings.playback.shuffle = true;
    settings.karaoke.show_lyrics = false;
    settings.audio.default_volume = 0.4;

    let app = app_of(&["A"]).with_settings(&settings);
    assert!(app.repeat);
    assert!(app.shuffle);
    assert!(!app.show_lyrics);
    assert!((app.volume - 0.4).abs() < 1e-6);
}

#[test]
fn toggles_flip() {
    let mut app = app_of(&["A"]);
    app.toggle_repeat();
    app.toggle_shuffle();
    app.toggle_lyrics();
    assert!(app.repeat && app.shuffle && !app.show_lyrics);
}

fn at(title: &str, path: &str) -> Track {
    Track {
        path: path.into(),
        ..t(title)
    }
}

#[test]
fn parse_clock_reads_minutes_and_seconds() {
    assert_eq!(parse_clock("01:30"), Some(std::time::Duration::from_secs(90)));
    assert_eq!(parse_clock(" 12:05 "), Some(std::time::Duration::from_secs(725)));
    assert_eq!(parse_clock("0:00"), Some(std::time::Duration::ZERO));
    assert_eq!(parse_clock("1:75"), None);
    assert_eq!(parse_clock("90"), None);
    assert_eq!(parse_clock("a:10"), None);
    assert_eq!(parse_clock(""), None);
}

#[test]
fn rescan_keeps_loaded_and_selected_songs_by_path() {
    let mut app = App::new(vec![at("B", "/m/b.mp3"), at("C", "/m/c.mp3")]);
    app.current = Some(0);
    app.selected = 1;

    app.replace_tracks(vec![
        at("A", "/m/a.mp3"),
        at("B", "/m/b.mp3"),
        at("C", "/m/c.mp3"),
    ]);
    assert_eq!(app.current, Some(1));
    assert_eq!(app.selected, 2);

    app.replace_tracks(vec![at("A", "/m/a.mp3")]);
    assert_eq!(app.current, None);
    assert_eq!(app.selected, 0);
}

#[test]
fn numbered_selection_counts_visible_songs() {
    let mut app = app_of(&["Alpha", "Beta", "Gamma", "Delta"]);
    app.select_numbered(3);
    assert_eq!(app.selected, 2);
    app.select_numbered(0);
    assert_eq!(app.selected, 3);
    app.select_numbered(9);
    assert_eq!(app.selected, 3);

    app.filter_query = "et".into();
    app.select_numbered(2);
    assert_eq!(app.selected, 3);
}
