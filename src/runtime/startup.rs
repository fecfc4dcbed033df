use std::time::Duration;

use crate::app::App;
use crate::audio::{Player, PlayerOptions, RodioDecoder, RodioOutput};
use crate::config;
use crate::library::Track;

pub fn player_options(settings: &config::Settings) -> PlayerOptions {
    PlayerOptions {
        tick_interval: Duration::from_millis(settings.audio.tick_interval_ms),
        volume: settings.audio.default_volume,
        seed: settings.karaoke.seed,
    }
}

/// Player wired to the real decoder and the default output device.
pub fn build_player(settings: &config::Settings) -> Player {
    Player::new(RodioDecoder, RodioOutput::new(), player_options(settings))
}

pub fn build_app(tracks: Vec<Track>, settings: &config::Settings, dir: String) -> App {
    let mut app = App::new(tracks).with_settings(settings);
    app.set_current_dir(dir);
    if !app.has_tracks() {
        app.set_status("No songs found");
    }
    app
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_options_follow_settings() {
        let mut settings = config::Settings::default();
        settings.audio.tick_interval_ms = 40;
        settings.audio.default_volume = 0.6;
        settings.karaoke.seed = Some(9);

        let opts = player_options(&settings);
        assert_eq!(opts.tick_interval, Duration::from_millis(40));
        assert!((opts.volume - 0.6).abs() < 1e-6);
        assert_eq!(opts.seed, Some(9));
    }

    #[test]
    fn empty_library_gets_a_status_message() {
        let app = build_app(Vec::new(), &config::Settings::default(), "/music".into());
        assert_eq!(app.status.as_deref(), Some("No songs found"));
        assert_eq!(app.current_dir.as_deref(), Some("/music"));
    }
}
