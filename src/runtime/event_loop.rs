use std::path::Path;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::{self, App, Overlay};
use crate::audio::{Player, PlayerEvent};
use crate::config;
use crate::library;
use crate::lyrics::{self, LyricTimeline};
use crate::ui;
use crate::visualizer::Spectrum;

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Dice for shuffle picks; seeded like the scoring dice when configured.
    rng: StdRng,
    spectrum: Spectrum,
}

impl EventLoopState {
    pub fn new(settings: &config::Settings) -> Self {
        let seed = settings.karaoke.seed;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng,
            spectrum: Spectrum::new(seed.map(|s| s.wrapping_add(2))),
        }
    }
}

/// Main terminal event loop: handles input, UI drawing and song completion.
/// Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    player: &Player,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        for ev in player.poll_events() {
            match ev {
                PlayerEvent::Finished { path } => {
                    info!(path = %path.display(), "song finished");
                    handle_finished(app, player, state);
                }
            }
        }

        let snapshot = player.snapshot();
        let timeline = player.timeline();
        let display = app.display_indices();
        if settings.ui.show_visualizer {
            state
                .spectrum
                .update(snapshot.position, snapshot.is_playing());
        }
        let view = ui::View {
            snapshot: &snapshot,
            timeline: &timeline,
            display: &display,
            ui: &settings.ui,
            controls: &settings.controls,
            spectrum: &state.spectrum,
        };
        terminal.draw(|f| ui::draw(f, app, &view))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, player)? {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn handle_finished(app: &mut App, player: &Player, state: &mut EventLoopState) {
    match app.after_finish(|| state.rng.random::<f64>()) {
        Some(next) => play_index(app, player, next),
        None => app.set_status("Finished"),
    }
}

/// Load song `index` with its lyrics and start singing.
fn play_index(app: &mut App, player: &Player, index: usize) {
    let Some(track) = app.tracks.get(index).cloned() else {
        return;
    };

    if let Err(e) = player.load_file(&track.path) {
        warn!(path = %track.path.display(), error = %e, "could not load song");
        app.set_status(format!("Error: {e}"));
        return;
    }

    let timeline = match &track.lyrics {
        Some(path) => lyrics::load_file(path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "could not read lyrics");
            LyricTimeline::empty()
        }),
        None => LyricTimeline::empty(),
    };
    player.set_timeline(timeline);

    app.current = Some(index);
    app.selected = index;

    if let Err(e) = player.set_volume(app.volume).and_then(|()| player.play()) {
        warn!(error = %e, "could not start playback");
        app.set_status(format!("Error: {e}"));
        return;
    }
    app.set_status(format!("Now singing: {}", track.display));
}

fn report(app: &mut App, result: crate::error::Result<()>) {
    if let Err(e) = result {
        warn!(error = %e, "player action failed");
        app.set_status(format!("Error: {e}"));
    }
}

fn apply_volume(app: &mut App, player: &Player, volume: f32) {
    report(app, player.set_volume(volume));
    if app.is_muted() {
        app.set_status("Muted");
    } else {
        app.set_status(format!("Volume: {}%", (volume * 100.0).round() as u32));
    }
}

/// Resolve a typed `mm:ss` against the song length, or say why it can't be used.
fn jump_target(input: &str, duration: Duration) -> Result<Duration, String> {
    let Some(target) = app::parse_clock(input) else {
        return Err("Invalid time format. Use mm:ss (e.g. 01:30)".to_string());
    };
    if target > duration {
        return Err(format!(
            "Time exceeds song duration ({})",
            ui::format_mmss(duration)
        ));
    }
    Ok(target)
}

/// Keys while a popup is open. Help and song info close on any key.
fn handle_overlay_key(key: KeyEvent, overlay: Overlay, app: &mut App, player: &Player) {
    let Overlay::JumpToTime(mut input) = overlay else {
        return;
    };
    match key.code {
        KeyCode::Esc => {}
        KeyCode::Enter => {
            let duration = player.snapshot().duration;
            match jump_target(&input, duration) {
                Ok(target) => match player.seek_to_secs(target.as_secs_f64()) {
                    Ok(()) => app.set_status(format!("Jumped to {input}")),
                    Err(e) => report(app, Err(e)),
                },
                Err(msg) => app.set_status(msg),
            }
        }
        KeyCode::Backspace => {
            input.pop();
            app.overlay = Some(Overlay::JumpToTime(input));
        }
        KeyCode::Char(c) if c.is_ascii_digit() || c == ':' => {
            if input.len() < 8 {
                input.push(c);
            }
            app.overlay = Some(Overlay::JumpToTime(input));
        }
        _ => app.overlay = Some(Overlay::JumpToTime(input)),
    }
}

fn toggle_status(name: &str, flag: bool) -> String {
    format!("{name}: {}", ui::on_off(flag))
}

fn rescan(app: &mut App, settings: &config::Settings) {
    let Some(dir) = app.current_dir.clone() else {
        return;
    };
    let tracks = library::scan(Path::new(&dir), &settings.library);
    info!(dir = %dir, songs = tracks.len(), "rescanned library");
    let count = tracks.len();
    app.replace_tracks(tracks);
    app.set_status(format!("Rescanned: {count} songs"));
}

fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    player: &Player,
) -> Result<bool, Box<dyn std::error::Error>> {
    if let Some(overlay) = app.overlay.take() {
        handle_overlay_key(key, overlay, app, player);
        return Ok(false);
    }

    if app.filter_mode {
        match key.code {
            KeyCode::Esc => app.clear_filter(),
            KeyCode::Backspace => app.pop_filter_char(),
            KeyCode::Char('j') | KeyCode::Char('n')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                app.next()
            }
            KeyCode::Char('k') | KeyCode::Char('p')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                app.prev()
            }
            KeyCode::Down => app.next(),
            KeyCode::Up => app.prev(),
            KeyCode::Char(c) => {
                if !c.is_control() {
                    app.push_filter_char(c);
                }
            }
            KeyCode::Enter => {
                if app.display_indices().is_empty() {
                    return Ok(false);
                }
                app.exit_filter_mode();
                let selected = app.selected;
                play_index(app, player, selected);
            }
            _ => {}
        }

        return Ok(false);
    }

    let seek = settings.controls.seek_seconds.min(i64::MAX as u64) as i64;
    let step = settings.audio.volume_step;

    match key.code {
        KeyCode::Char('q') => return Ok(true),
        KeyCode::Char('/') => app.enter_filter_mode(),
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.prev(),
        KeyCode::Enter => {
            if app.has_tracks() {
                let selected = app.selected;
                play_index(app, player, selected);
            }
        }
        KeyCode::Char(' ') => match app.current {
            Some(_) => {
                let result = player.toggle_pause();
                report(app, result);
            }
            None if app.has_tracks() => {
                let selected = app.selected;
                play_index(app, player, selected);
            }
            None => {}
        },
        KeyCode::Char('s') => {
            player.stop();
            app.set_status("Stopped");
        }
        KeyCode::Char('n') => {
            let from = app.current.unwrap_or(app.selected);
            if let Some(next) = app.next_in_view_from(from) {
                play_index(app, player, next);
            }
        }
        KeyCode::Char('p') => {
            let from = app.current.unwrap_or(app.selected);
            if let Some(prev) = app.prev_in_view_from(from) {
                play_index(app, player, prev);
            }
        }
        KeyCode::Right => {
            let result = player.seek_by(seek);
            report(app, result);
        }
        KeyCode::Left => {
            let result = player.seek_by(-seek);
            report(app, result);
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            let volume = app.step_volume(step);
            apply_volume(app, player, volume);
        }
        KeyCode::Char('-') => {
            let volume = app.step_volume(-step);
            apply_volume(app, player, volume);
        }
        KeyCode::Char('v') => {
            let volume = app.toggle_mute();
            apply_volume(app, player, volume);
        }
        KeyCode::Char('R') => {
            app.toggle_repeat();
            app.set_status(toggle_status("Repeat", app.repeat));
        }
        KeyCode::Char('S') => {
            app.toggle_shuffle();
            app.set_status(toggle_status("Shuffle", app.shuffle));
        }
        KeyCode::Char('L') => app.toggle_lyrics(),
        KeyCode::Char('c') => {
            player.reset_score();
            app.set_status("Score cleared");
        }
        KeyCode::Char('t') => {
            if app.current.is_some() {
                app.overlay = Some(Overlay::JumpToTime(String::new()));
            } else {
                app.set_status("No song loaded");
            }
        }
        KeyCode::Char('i') => app.overlay = Some(Overlay::SongInfo),
        KeyCode::Char('h') | KeyCode::Char('?') => app.overlay = Some(Overlay::Help),
        KeyCode::Char('r') => rescan(app, settings),
        KeyCode::Char(c) if c.is_ascii_digit() => {
            let n = c.to_digit(10).unwrap_or(0) as usize;
            app.select_numbered(n);
        }
        KeyCode::Esc => app.clear_status(),
        _ => {}
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jump_target_accepts_times_within_the_song() {
        let len = Duration::from_secs(200);
        assert_eq!(jump_target("01:30", len), Ok(Duration::from_secs(90)));
        assert_eq!(jump_target("03:20", len), Ok(len));
    }

    #[test]
    fn repeat_toggle_reports_on_or_off() {
        assert_eq!(toggle_status("Repeat", true), "Repeat: On");
        assert_eq!(toggle_status("Repeat", false), "Repeat: Off");
    }

    #[test]
    fn jump_target_explains_rejections() {
        let len = Duration::from_secs(200);
        assert_eq!(
            jump_target("1:3x", len),
            Err("Invalid time format. Use mm:ss (e.g. 01:30)".to_string())
        );
        assert_eq!(
            jump_target("03:21", len),
            Err("Time exceeds song duration (03:20)".to_string())
        );
    }
}
