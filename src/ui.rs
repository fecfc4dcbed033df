//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`. Everything
//! here reads from a `PlaybackSnapshot` taken once per frame, never from the
//! player directly.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::time::Duration;

use crate::app::{App, Overlay};
use crate::audio::{PlaybackSnapshot, PlaybackState};
use crate::config::{ControlsSettings, TimeField, UiSettings};
use crate::karaoke::{self, KaraokeSnapshot, Performance, ScoreTier, StreakTier};
use crate::library::Track;
use crate::lyrics::LyricTimeline;
use crate::visualizer::{Band, MAX_HEIGHT, Spectrum};

const LYRIC_ROWS: usize = 5;

/// Everything `draw` needs besides the app model.
pub struct View<'a> {
    pub snapshot: &'a PlaybackSnapshot,
    pub timeline: &'a LyricTimeline,
    pub display: &'a [usize],
    pub ui: &'a UiSettings,
    pub controls: &'a ControlsSettings,
    pub spectrum: &'a Spectrum,
}

/// Every key binding as (keys, action), incorporating seek seconds.
fn key_bindings(seek_seconds: u64) -> Vec<(&'static str, String)> {
    vec![
        ("j/k", "up/down".to_string()),
        ("1-9/0", "select song number/last".to_string()),
        ("enter", "sing selected".to_string()),
        ("space", "play/pause".to_string()),
        ("s", "stop".to_string()),
        ("n/p", "next/prev song".to_string()),
        ("←/→", format!("seek -/+{seek_seconds}s")),
        ("t", "jump to time".to_string()),
        ("+/-", "volume".to_string()),
        ("v", "mute".to_string()),
        ("R", "repeat".to_string()),
        ("S", "shuffle".to_string()),
        ("L", "lyrics".to_string()),
        ("c", "clear score".to_string()),
        ("i", "song info".to_string()),
        ("r", "rescan library".to_string()),
        ("/", "filter".to_string()),
        ("h", "help".to_string()),
        ("q", "quit".to_string()),
    ]
}

/// Render the controls help text, incorporating seek seconds.
fn controls_text(seek_seconds: u64) -> String {
    key_bindings(seek_seconds)
        .into_iter()
        .map(|(keys, action)| format!("[{keys}] {action}"))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Compute a centered popup rect of the requested size within `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    // Keep the popup smaller and avoid covering the entire UI.
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Format a `Duration` as `MM:SS`.
pub fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Build the now-playing time text (elapsed/total/remaining) per `UiSettings`.
fn now_playing_time_text(elapsed: Duration, total: Duration, ui: &UiSettings) -> Option<String> {
    if ui.now_playing_time_fields.is_empty() {
        return None;
    }

    let parts: Vec<String> = ui
        .now_playing_time_fields
        .iter()
        .map(|f| match f {
            TimeField::Elapsed => format_mmss(elapsed),
            TimeField::Total => format_mmss(total),
            TimeField::Remaining => format!("-{}", format_mmss(total.saturating_sub(elapsed))),
        })
        .collect();

    Some(parts.join(&ui.now_playing_time_separator))
}

pub fn on_off(flag: bool) -> &'static str {
    if flag { "On" } else { "Off" }
}

/// Marker in front of a song in the list.
fn song_marker(index: usize, app: &App, state: PlaybackState) -> &'static str {
    if app.current != Some(index) {
        return "  ";
    }
    match state {
        PlaybackState::Playing => "▶ ",
        PlaybackState::Paused => "⏸ ",
        _ => "• ",
    }
}

/// Four dots with the current beat filled in.
fn beat_dots(position: Duration) -> String {
    let phase = karaoke::beat_phase(position) as usize;
    (0..4)
        .map(|i| if i == phase { "●" } else { "○" })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowSlot {
    Padding,
    Previous,
    Current,
    Next,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LyricRow {
    slot: RowSlot,
    /// `None` past either end of the timeline or on a rest.
    text: Option<String>,
    hit: bool,
}

/// Five rows centered on `active`: two before, the active line, two after.
///
/// Before the first line `active` is `None` and the rows after the center show
/// what is coming up.
fn lyric_window(timeline: &LyricTimeline, active: Option<usize>, line_hits: &[bool]) -> Vec<LyricRow> {
    let center = active.map_or(-1, |i| i as isize);
    let half = (LYRIC_ROWS / 2) as isize;

    (0..LYRIC_ROWS as isize)
        .map(|row| {
            let slot = match row - half {
                0 => RowSlot::Current,
                -1 => RowSlot::Previous,
                1 => RowSlot::Next,
                _ => RowSlot::Padding,
            };
            let idx = center + row - half;
            let line = usize::try_from(idx).ok().and_then(|i| timeline.get(i));
            LyricRow {
                slot,
                text: line.filter(|l| !l.is_rest()).map(|l| l.text.clone()),
                hit: line.is_some_and(|l| line_hits.get(l.index).copied().unwrap_or(false)),
            }
        })
        .collect()
}

fn lyric_line(row: &LyricRow, position: Duration) -> Line<'static> {
    let note = if position.as_millis() % 1000 < 500 { "♪" } else { "♫" };
    match (row.slot, row.text.as_deref()) {
        (RowSlot::Current, Some(text)) => Line::from(format!("{note}  {}  {note}", text.to_uppercase()))
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        (RowSlot::Current, None) => Line::from(format!("{note}  READY TO SING  {note}"))
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        (RowSlot::Previous, Some(text)) => {
            let mark = if row.hit { " ✓" } else { "" };
            Line::from(format!("{text}{mark}")).style(
                Style::default()
                    .fg(if row.hit { Color::Green } else { Color::Blue })
                    .add_modifier(Modifier::DIM),
            )
        }
        (RowSlot::Next, Some(text)) => Line::from(text.to_string()),
        (RowSlot::Padding, Some(text)) => Line::from(text.to_string()).fg(Color::DarkGray),
        (RowSlot::Padding, None) => Line::from(" "),
        (_, None) => Line::from("∙∙∙").fg(Color::DarkGray),
    }
}

fn score_color(score: u64) -> Color {
    match ScoreTier::of(score) {
        ScoreTier::Legendary => Color::Red,
        ScoreTier::Amazing => Color::Magenta,
        ScoreTier::Great => Color::Yellow,
        ScoreTier::Good => Color::Green,
        ScoreTier::Starting => Color::White,
    }
}

fn streak_color(streak: u32) -> Color {
    match StreakTier::of(streak) {
        StreakTier::None => Color::DarkGray,
        StreakTier::Warm => Color::Green,
        StreakTier::Hot => Color::Yellow,
        StreakTier::Blazing => Color::Red,
        StreakTier::Legendary => Color::Magenta,
    }
}

fn accuracy_color(accuracy: f64) -> Color {
    if accuracy >= 90.0 {
        Color::Green
    } else if accuracy >= 75.0 {
        Color::Yellow
    } else if accuracy >= 50.0 {
        Color::White
    } else {
        Color::DarkGray
    }
}

/// A session keeps its performance label while paused and after the song ends.
fn performance_active(state: PlaybackState) -> bool {
    matches!(
        state,
        PlaybackState::Playing | PlaybackState::Paused | PlaybackState::Finished
    )
}

fn score_lines(k: &KaraokeSnapshot, playing: bool) -> Vec<Line<'static>> {
    let streak = StreakTier::of(k.streak);
    vec![
        Line::from(format!("Score: {}", k.score)).fg(score_color(k.score)).bold(),
        Line::from(streak.label(k.streak)).fg(streak_color(k.streak)),
        Line::from(format!("Accuracy: {:.1}%", k.accuracy)).fg(accuracy_color(k.accuracy)),
        Line::from(format!("Lines hit: {}/{}", k.hits, k.total_lines)),
        Line::from(""),
        Line::from(Performance::of(k, playing).label()).fg(Color::Cyan).bold(),
    ]
}

/// Title and artist from the lyric file's header tags, if it has any.
fn lyric_credit(timeline: &LyricTimeline) -> Option<String> {
    match (timeline.metadata("ti"), timeline.metadata("ar")) {
        (Some(ti), Some(ar)) => Some(format!("{ti} - {ar}")),
        (Some(one), None) | (None, Some(one)) => Some(one.to_string()),
        (None, None) => None,
    }
}

fn now_playing_lines(
    app: &App,
    snap: &PlaybackSnapshot,
    timeline: &LyricTimeline,
    ui: &UiSettings,
) -> Vec<Line<'static>> {
    let Some(track) = app.current_track() else {
        return vec![Line::from("No song selected")];
    };

    let time = now_playing_time_text(snap.position, snap.duration, ui).unwrap_or_default();
    let volume = if app.is_muted() {
        "muted".to_string()
    } else {
        format!("{}%", (snap.volume * 100.0).round() as u32)
    };

    let field = |name: &str, value: String| {
        Line::from(vec![
            Span::raw(format!("{name}: ")),
            Span::styled(value, Style::default().fg(Color::Yellow)),
        ])
    };

    let mut lines = vec![
        field("Title", track.title.clone()),
        field("Artist", track.artist_or_unknown().to_string()),
        field("Time", time),
        field("Status", snap.state.label().to_string()),
        field(
            "Volume",
            format!(
                "{volume}  Repeat: {}  Shuffle: {}",
                on_off(app.repeat),
                on_off(app.shuffle)
            ),
        ),
    ];
    if let Some(credit) = lyric_credit(timeline) {
        lines.push(field("Lyrics", credit));
    }
    lines
}

fn bar_color(band: Band, peak: bool) -> Color {
    match (band, peak) {
        (Band::Bass, true) => Color::Yellow,
        (Band::Bass, false) => Color::Red,
        (Band::Mid, true) => Color::Cyan,
        (Band::Mid, false) => Color::Green,
        (Band::High, true) => Color::Magenta,
        (Band::High, false) => Color::Blue,
    }
}

/// Spectrum bars drawn top to bottom in `rows` rows, scaled down from the full
/// bar height when the panel is short. Empty bands leave a dim floor.
fn spectrum_lines(spectrum: &Spectrum, rows: u16) -> Vec<Line<'static>> {
    let rows = rows.clamp(1, u16::from(MAX_HEIGHT));
    let scale = |h: u8| (u16::from(h) * rows).div_ceil(u16::from(MAX_HEIGHT));

    (0..rows)
        .rev()
        .map(|row| {
            let spans: Vec<Span> = spectrum
                .bars()
                .iter()
                .enumerate()
                .map(|(band, &h)| {
                    let h = scale(h);
                    if row < h {
                        Span::styled("██ ", Style::default().fg(bar_color(Band::of(band), row + 2 >= h)))
                    } else if row == 0 {
                        Span::styled("░░ ", Style::default().fg(Color::DarkGray))
                    } else {
                        Span::raw("   ")
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

fn render_spectrum(frame: &mut Frame, area: Rect, ctx: &View<'_>) {
    let spectrum = ctx.spectrum;
    let title = if ctx.snapshot.is_playing() {
        let note = if spectrum.phase() % 2 == 0 { "♫" } else { "♪" };
        format!(" {note} spectrum {note} ")
    } else {
        " spectrum ".to_string()
    };

    let mut lines = spectrum_lines(spectrum, area.height.saturating_sub(3));
    lines.push(Line::from(spectrum.energy().label()).fg(Color::Cyan));

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::bordered().title(title).title_alignment(Alignment::Center));
    frame.render_widget(paragraph, area);
}

fn song_info_text(track: &Track) -> String {
    let duration = track.duration.map_or_else(|| "-".to_string(), format_mmss);
    let lyrics = track
        .lyrics
        .as_ref()
        .map_or_else(|| "Not available".to_string(), |p| p.display().to_string());
    format!(
        "Title: {}\nArtist: {}\nAlbum: {}\nDuration: {}\nPath: {}\nLyrics: {}",
        track.title,
        track.artist_or_unknown(),
        track.album.as_deref().unwrap_or("-"),
        duration,
        track.path.display(),
        lyrics
    )
}

fn render_overlay(frame: &mut Frame, overlay: &Overlay, app: &App, ctx: &View<'_>) {
    let area = frame.area();
    let (title, text, width, height) = match overlay {
        Overlay::Help => {
            let text = key_bindings(ctx.controls.seek_seconds)
                .into_iter()
                .map(|(keys, action)| format!("{keys:>6}  {action}"))
                .collect::<Vec<_>>()
                .join("\n");
            (" help (any key closes) ", text, 48, 23)
        }
        Overlay::SongInfo => {
            let text = app
                .current_track()
                .map_or_else(|| "No song loaded".to_string(), song_info_text);
            (" song info (any key closes) ", text, 72, 9)
        }
        Overlay::JumpToTime(input) => (
            " jump to time ",
            format!("Time (mm:ss): {input}_\n\n[enter] jump  [esc] cancel"),
            40,
            5,
        ),
    };

    let popup = centered_rect_sized(width, height, area);
    frame.render_widget(Clear, popup);
    let paragraph = Paragraph::new(text)
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(title),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, popup);
}

fn render_song_list(frame: &mut Frame, area: Rect, app: &App, ctx: &View<'_>) {
    let display = ctx.display;
    let q = app.filter_query.trim();
    let query_lower = (!q.is_empty()).then(|| q.to_ascii_lowercase());

    // Only build ListItems for the visible window, centered on the selection when possible.
    let total = display.len();
    let list_height = area.height.saturating_sub(2) as usize;
    let sel_pos = display.iter().position(|&i| i == app.selected).unwrap_or(0);
    let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
        (0, total, sel_pos)
    } else {
        let half = list_height / 2;
        let mut start = sel_pos.saturating_sub(half);
        if start + list_height > total {
            start = total - list_height;
        }
        (start, start + list_height, sel_pos - start)
    };

    let items: Vec<ListItem> = display[start..end]
        .iter()
        .map(|&i| {
            let track = &app.tracks[i];
            let marker = song_marker(i, app, ctx.snapshot.state);
            let note = if track.has_lyrics() { " ♫" } else { "" };

            let positions = query_lower
                .as_deref()
                .and_then(|ql| app.fuzzy_match_positions_for_track_lower(i, ql))
                .unwrap_or_default();

            let mut spans = vec![Span::raw(marker)];
            let mut pos_iter = positions.into_iter().peekable();
            for (ci, ch) in track.display.chars().enumerate() {
                if pos_iter.peek() == Some(&ci) {
                    pos_iter.next();
                    spans.push(Span::styled(
                        ch.to_string(),
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    ));
                } else {
                    spans.push(Span::raw(ch.to_string()));
                }
            }
            spans.push(Span::styled(note, Style::default().fg(Color::Cyan)));
            ListItem::new(Line::from(spans))
        })
        .collect();

    let title = format!(" songs ({}) ", total);
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if total > 0 {
        state.select(Some(selected_pos_in_visible));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_lyrics(frame: &mut Frame, area: Rect, ctx: &View<'_>) {
    let snap = ctx.snapshot;
    let title = format!(" lyrics  {} ", beat_dots(snap.position));
    let block = Block::bordered().title(title).title_alignment(Alignment::Center);

    let lines: Vec<Line> = if ctx.timeline.is_empty() {
        let mut lines = vec![Line::from(" "); LYRIC_ROWS];
        lines[LYRIC_ROWS / 2] = Line::from("NO LYRICS AVAILABLE").fg(Color::Yellow).bold();
        lines
    } else {
        lyric_window(ctx.timeline, snap.active_line, &snap.karaoke.line_hits)
            .iter()
            .map(|row| lyric_line(row, snap.position))
            .collect()
    };

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// Render the entire UI into the provided `frame`.
pub fn draw(frame: &mut Frame, app: &App, ctx: &View<'_>) {
    let snap = ctx.snapshot;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ctx.ui.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" crooner ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);

    render_song_list(frame, body[0], app, ctx);

    let right_constraints: Vec<Constraint> = if app.show_lyrics {
        vec![
            Constraint::Length(8),
            Constraint::Length(LYRIC_ROWS as u16 + 2),
            Constraint::Min(8),
        ]
    } else {
        vec![Constraint::Length(8), Constraint::Min(8)]
    };
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints(right_constraints)
        .split(body[1]);

    let now_playing = Paragraph::new(now_playing_lines(app, snap, ctx.timeline, ctx.ui))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" now playing "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(now_playing, right[0]);

    let bottom = if app.show_lyrics {
        render_lyrics(frame, right[1], ctx);
        right[2]
    } else {
        right[1]
    };
    let score_area = if ctx.ui.show_visualizer {
        let split = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(bottom);
        render_spectrum(frame, split[1], ctx);
        split[0]
    } else {
        bottom
    };

    let score = Paragraph::new(score_lines(&snap.karaoke, performance_active(snap.state)))
        .alignment(Alignment::Center)
        .block(Block::bordered().title(" score "));
    frame.render_widget(score, score_area);

    // Progress
    let ratio = if snap.duration.is_zero() {
        0.0
    } else {
        (snap.position.as_secs_f64() / snap.duration.as_secs_f64()).clamp(0.0, 1.0)
    };
    let label = if snap.state == PlaybackState::Empty {
        "No song playing".to_string()
    } else {
        format!(
            "{} / {}  {}",
            format_mmss(snap.position),
            format_mmss(snap.duration),
            snap.state.label().to_uppercase()
        )
    };
    let gauge = Gauge::default()
        .block(Block::bordered().title(" progress "))
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(ratio)
        .label(label);
    frame.render_widget(gauge, chunks[2]);

    // Status line
    let status = if app.filter_mode {
        format!("/{}_", app.filter_query)
    } else {
        let mut parts = vec![format!("Songs: {}", app.tracks.len())];
        if !app.filter_query.trim().is_empty() {
            parts.push(format!("Filter: {}", app.filter_query.trim()));
        }
        if let Some(dir) = &app.current_dir {
            parts.push(format!("Dir: {dir}"));
        }
        if let Some(msg) = &app.status {
            parts.push(msg.clone());
        }
        parts.join(" • ")
    };
    let status_par = Paragraph::new(status).block(
        Block::bordered()
            .padding(Padding {
                left: 1,
                right: 0,
                top: 0,
                bottom: 0,
            })
            .title(" status "),
    );
    frame.render_widget(status_par, chunks[3]);

    let footer = Paragraph::new(controls_text(ctx.controls.seek_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[4]);

    if let Some(overlay) = &app.overlay {
        render_overlay(frame, overlay, app, ctx);
    }
}
