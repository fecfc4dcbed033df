use super::load::{default_config_path, default_log_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_crooner_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("CROONER_CONFIG_PATH", "/tmp/crooner-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/crooner-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    assert_eq!(
        default_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("crooner")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    assert_eq!(
        default_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("crooner")
            .join("config.toml")
    );
}

#[test]
fn default_log_path_uses_xdg_state_home_then_local_state() {
    let _lock = env_lock();
    {
        let _g = EnvGuard::set("XDG_STATE_HOME", "/tmp/state");
        assert_eq!(
            default_log_path().unwrap(),
            std::path::PathBuf::from("/tmp/state/crooner/crooner.log")
        );
    }
    let _g1 = EnvGuard::remove("XDG_STATE_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");
    assert_eq!(
        default_log_path().unwrap(),
        std::path::PathBuf::from("/tmp/home-dir/.local/state/crooner/crooner.log")
    );
}

#[test]
fn defaults_are_valid() {
    let s = Settings::default();
    assert!(s.validate().is_ok());
    assert_eq!(s.audio.tick_interval_ms, 100);
    assert_eq!(s.controls.seek_seconds, 10);
    assert!(s.playback.auto_advance);
    assert!(s.karaoke.show_lyrics);
    assert_eq!(s.library.extensions, vec!["mp3".to_string(), "wav".to_string()]);
    assert_eq!(s.logging.level, "info");
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[audio]
default_volume = 0.6
volume_step = 0.05
tick_interval_ms = 40

[controls]
seek_seconds = 5

[playback]
repeat = true
shuffle = true
auto_advance = false

[karaoke]
show_lyrics = false
seed = 42

[ui]
header_text = "hello"
now_playing_time_fields = ["elapsed", "remaining"]
now_playing_time_separator = " | "
show_visualizer = false

[library]
extensions = ["mp3"]
recursive = false
include_hidden = true
follow_links = false
display_fields = ["filename"]
display_separator = "::"

[logging]
level = "crooner=debug"
file = "/tmp/crooner.log"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("CROONER_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("CROONER__AUDIO__TICK_INTERVAL_MS");

    let s = Settings::load().unwrap();
    assert!((s.audio.default_volume - 0.6).abs() < 1e-6);
    assert!((s.audio.volume_step - 0.05).abs() < 1e-6);
    assert_eq!(s.audio.tick_interval_ms, 40);
    assert_eq!(s.controls.seek_seconds, 5);
    assert!(s.playback.repeat);
    assert!(s.playback.shuffle);
    assert!(!s.playback.auto_advance);
    assert!(!s.karaoke.show_lyrics);
    assert_eq!(s.karaoke.seed, Some(42));
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(s.ui.now_playing_time_fields.len(), 2);
    assert!(matches!(s.ui.now_playing_time_fields[1], TimeField::Remaining));
    assert_eq!(s.ui.now_playing_time_separator, " | ");
    assert!(!s.ui.show_visualizer);
    assert_eq!(s.library.extensions, vec!["mp3".to_string()]);
    assert!(!s.library.recursive);
    assert!(s.library.include_hidden);
    assert!(!s.library.follow_links);
    assert_eq!(s.library.display_separator, "::");
    assert!(matches!(s.library.display_fields[0], TrackDisplayField::Filename));
    assert_eq!(s.logging.level, "crooner=debug");
    assert_eq!(
        s.logging.file,
        Some(std::path::PathBuf::from("/tmp/crooner.log"))
    );
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[audio]
tick_interval_ms = 250
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("CROONER_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("CROONER__AUDIO__TICK_INTERVAL_MS", "50");

    let s = Settings::load().unwrap();
    assert_eq!(s.audio.tick_interval_ms, 50);
}

#[test]
fn validate_rejects_zero_tick_and_bad_volume_step() {
    let mut s = Settings::default();
    s.audio.tick_interval_ms = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.audio.volume_step = 0.0;
    assert!(s.validate().is_err());
    s.audio.volume_step = 1.5;
    assert!(s.validate().is_err());
    s.audio.volume_step = 1.0;
    assert!(s.validate().is_ok());

    let mut s = Settings::default();
    s.library.extensions.clear();
    assert!(s.validate().is_err());
}
