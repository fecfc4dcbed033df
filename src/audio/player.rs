use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::error::{PlayerError, Result};
use crate::karaoke::KaraokeSession;
use crate::lyrics::LyricTimeline;

use super::decoder::AudioDecoder;
use super::output::{OutputDevice, OutputSession};
use super::pcm;
use super::tracker;
use super::types::{PcmFormat, PlaybackSnapshot, PlaybackState, PlayerEvent};

#[derive(Debug, Clone, Copy)]
pub struct PlayerOptions {
    pub tick_interval: Duration,
    pub volume: f32,
    /// Fixed seed for the scoring dice. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(100),
            volume: 1.0,
            seed: None,
        }
    }
}

pub(super) struct LoadedTrack {
    pub(super) path: PathBuf,
    pub(super) format: PcmFormat,
    pub(super) duration: Duration,
    samples: Arc<[f32]>,
    pub(super) pcm: Arc<[u8]>,
}

impl LoadedTrack {
    fn rebake(&mut self, volume: f32) -> Result<()> {
        let pcm = pcm::build(
            &self.samples,
            self.format.sample_rate,
            self.format.channels,
            volume,
        )?;
        self.pcm = pcm.into();
        Ok(())
    }
}

/// Start of the current Playing stretch.
#[derive(Debug, Clone, Copy)]
pub(super) struct Segment {
    started: Instant,
    base: Duration,
}

/// Everything the controller and the tracker share, behind one lock.
pub(super) struct Inner {
    pub(super) state: PlaybackState,
    pub(super) track: Option<LoadedTrack>,
    pub(super) position: Duration,
    pub(super) segment: Option<Segment>,
    /// Bumped whenever a tracking stretch ends; ticks carrying an older value are stale.
    pub(super) epoch: u64,
    session: Option<Box<dyn OutputSession>>,
    device: Box<dyn OutputDevice>,
    closed: bool,
    volume: f32,
    pub(super) timeline: Arc<LyricTimeline>,
    pub(super) karaoke: KaraokeSession,
    pub(super) rng: StdRng,
    events: Sender<PlayerEvent>,
}

impl Inner {
    pub(super) fn duration(&self) -> Duration {
        self.track.as_ref().map_or(Duration::ZERO, |t| t.duration)
    }

    pub(super) fn current_position(&self) -> Duration {
        match (self.state, self.segment) {
            (PlaybackState::Playing, Some(seg)) => {
                (seg.base + seg.started.elapsed()).min(self.duration())
            }
            _ => self.position,
        }
    }

    /// End any tracking stretch and close the session.
    fn halt(&mut self) {
        self.epoch += 1;
        self.segment = None;
        if let Some(mut s) = self.session.take() {
            s.close();
        }
    }

    fn begin_segment(&mut self, from: Duration) -> u64 {
        self.epoch += 1;
        self.position = from;
        self.segment = Some(Segment {
            started: Instant::now(),
            base: from,
        });
        self.epoch
    }

    fn open_session(&mut self, at: Duration, playing: bool) -> Result<Box<dyn OutputSession>> {
        if self.closed {
            return Err(PlayerError::DeviceUnavailable("player is closed".into()));
        }
        let track = self.track.as_ref().ok_or(PlayerError::NoTrackLoaded)?;
        let mut session = self.device.open(track.format)?;
        let offset = pcm::byte_offset(at, track.format, track.pcm.len());
        session.feed(Arc::clone(&track.pcm), offset);
        if playing {
            session.resume();
        }
        Ok(session)
    }

    /// Called by the tracker once the end is reached.
    pub(super) fn finish(&mut self) {
        let duration = self.duration();
        self.halt();
        self.position = duration;
        self.state = PlaybackState::Finished;

        if let Some(track) = self.track.as_ref() {
            info!(path = %track.path.display(), "track finished");
            let _ = self.events.send(PlayerEvent::Finished {
                path: track.path.clone(),
            });
        }
    }

    fn reset_karaoke(&mut self) {
        let lines = self.timeline.len();
        self.karaoke.reset(lines);
    }
}

/// Playback controller.
///
/// All operations take the same lock as the background tracker, so they can be
/// called freely from the UI thread while a track is playing.
pub struct Player {
    shared: Arc<Mutex<Inner>>,
    decoder: Box<dyn AudioDecoder>,
    events: Receiver<PlayerEvent>,
    tick_interval: Duration,
    spawner: tracker::Spawner,
}

impl Player {
    pub fn new(
        decoder: impl AudioDecoder + 'static,
        device: impl OutputDevice + 'static,
        options: PlayerOptions,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let inner = Inner {
            state: PlaybackState::Empty,
            track: None,
            position: Duration::ZERO,
            segment: None,
            epoch: 0,
            session: None,
            device: Box::new(device),
            closed: false,
            volume: pcm::clamp_volume(options.volume),
            timeline: Arc::new(LyricTimeline::empty()),
            karaoke: KaraokeSession::default(),
            rng,
            events: tx,
        };

        Self {
            shared: Arc::new(Mutex::new(inner)),
            decoder: Box::new(decoder),
            events: rx,
            tick_interval: options.tick_interval.max(Duration::from_millis(1)),
            spawner: tracker::spawn,
        }
    }

    #[cfg(test)]
    pub(super) fn with_spawner(mut self, spawner: tracker::Spawner) -> Self {
        self.spawner = spawner;
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    pub(super) fn inner(&self) -> MutexGuard<'_, Inner> {
        self.lock()
    }

    /// Enter `Playing` from `from` and start its tracker.
    ///
    /// If the tracker cannot start, output is closed and the player settles in
    /// `fallback` at `from` instead.
    fn start_tracking(
        &self,
        inner: &mut Inner,
        from: Duration,
        fallback: PlaybackState,
    ) -> Result<()> {
        inner.state = PlaybackState::Playing;
        let epoch = inner.begin_segment(from);
        if let Err(e) = (self.spawner)(Arc::clone(&self.shared), epoch, self.tick_interval) {
            warn!(error = %e, "failed to start position tracker");
            inner.halt();
            inner.position = from;
            inner.state = fallback;
            return Err(e.into());
        }
        Ok(())
    }

    /// Decode `path` and make it the current track.
    ///
    /// Decoding happens without holding the lock. On failure the previous track,
    /// its position and its state are left alone.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let volume = self.lock().volume;

        let decoded = self.decoder.decode(path)?;
        let format = PcmFormat {
            sample_rate: decoded.sample_rate,
            channels: decoded.channels,
        };
        let bytes = pcm::build(&decoded.samples, format.sample_rate, format.channels, volume)?;
        let duration = pcm::duration_of(bytes.len(), format);
        let mut track = LoadedTrack {
            path: path.to_path_buf(),
            format,
            duration,
            samples: decoded.samples.into(),
            pcm: bytes.into(),
        };

        let mut inner = self.lock();
        if inner.volume != volume {
            track.rebake(inner.volume)?;
        }
        inner.halt();
        inner.track = Some(track);
        inner.position = Duration::ZERO;
        inner.timeline = Arc::new(LyricTimeline::empty());
        inner.karaoke.reset(0);
        inner.state = PlaybackState::Loaded;

        info!(
            path = %path.display(),
            duration_ms = duration.as_millis() as u64,
            sample_rate = format.sample_rate,
            channels = format.channels,
            "loaded track"
        );
        Ok(())
    }

    /// Start or continue playback.
    ///
    /// From `Paused` this resumes where it left off. Otherwise the score starts
    /// fresh; after `Finished` playback restarts from the beginning.
    pub fn play(&self) -> Result<()> {
        let mut inner = self.lock();
        match inner.state {
            PlaybackState::Empty => Err(PlayerError::NoTrackLoaded),
            PlaybackState::Playing => Ok(()),
            PlaybackState::Paused => self.resume_locked(&mut inner),
            PlaybackState::Loaded | PlaybackState::Stopped | PlaybackState::Finished => {
                let from = if inner.state == PlaybackState::Finished {
                    Duration::ZERO
                } else {
                    inner.position
                };
                let session = inner.open_session(from, true)?;
                inner.halt();
                inner.session = Some(session);
                inner.reset_karaoke();
                let fallback = match inner.state {
                    PlaybackState::Finished => PlaybackState::Stopped,
                    other => other,
                };
                self.start_tracking(&mut inner, from, fallback)?;
                info!(from_ms = from.as_millis() as u64, "playback started");
                Ok(())
            }
        }
    }

    fn resume_locked(&self, inner: &mut Inner) -> Result<()> {
        let from = inner.position;
        match inner.session.as_mut() {
            Some(session) => session.resume(),
            None => {
                let session = inner.open_session(from, true)?;
                inner.session = Some(session);
            }
        }
        self.start_tracking(inner, from, PlaybackState::Paused)?;
        debug!(at_ms = from.as_millis() as u64, "resumed");
        Ok(())
    }

    /// Freeze position and suspend output. No-op unless playing.
    pub fn pause(&self) {
        let mut inner = self.lock();
        if inner.state != PlaybackState::Playing {
            return;
        }
        let position = inner.current_position();
        inner.epoch += 1;
        inner.segment = None;
        inner.position = position;
        if let Some(session) = inner.session.as_mut() {
            session.pause();
        }
        inner.state = PlaybackState::Paused;
        debug!(at_ms = position.as_millis() as u64, "paused");
    }

    /// Continue from `Paused`. Does nothing in any other state.
    pub fn resume(&self) -> Result<()> {
        let mut inner = self.lock();
        if inner.state != PlaybackState::Paused {
            return Ok(());
        }
        self.resume_locked(&mut inner)
    }

    pub fn toggle_pause(&self) -> Result<()> {
        let playing = self.lock().state == PlaybackState::Playing;
        if playing {
            self.pause();
            Ok(())
        } else {
            self.play()
        }
    }

    /// Close output, rewind and clear the score.
    pub fn stop(&self) {
        let mut inner = self.lock();
        Self::stop_locked(&mut inner);
    }

    fn stop_locked(inner: &mut Inner) {
        inner.halt();
        inner.position = Duration::ZERO;
        inner.reset_karaoke();
        inner.state = if inner.track.is_some() {
            PlaybackState::Stopped
        } else {
            PlaybackState::Empty
        };
        debug!(state = inner.state.label(), "stopped");
    }

    /// Move to `target`, clamped to the track.
    pub fn seek_to(&self, target: Duration) -> Result<()> {
        let mut inner = self.lock();
        self.seek_locked(&mut inner, target)
    }

    /// Seek to a signed offset in seconds; negative values clamp to the start.
    pub fn seek_to_secs(&self, secs: f64) -> Result<()> {
        let mut inner = self.lock();
        let target = clamp_secs(secs, inner.duration());
        self.seek_locked(&mut inner, target)
    }

    /// Seek relative to the current position.
    pub fn seek_by(&self, delta_secs: i64) -> Result<()> {
        let mut inner = self.lock();
        if inner.track.is_none() {
            return Err(PlayerError::NoTrackLoaded);
        }
        let current = inner.current_position().as_secs_f64();
        let target = clamp_secs(current + delta_secs as f64, inner.duration());
        self.seek_locked(&mut inner, target)
    }

    fn seek_locked(&self, inner: &mut Inner, target: Duration) -> Result<()> {
        if inner.track.is_none() {
            return Err(PlayerError::NoTrackLoaded);
        }
        let target = target.min(inner.duration());

        match inner.state {
            PlaybackState::Playing | PlaybackState::Paused => self.reopen(inner, target)?,
            PlaybackState::Finished => {
                inner.position = target;
                inner.state = PlaybackState::Stopped;
            }
            _ => inner.position = target,
        }

        debug!(to_ms = target.as_millis() as u64, state = inner.state.label(), "seek");
        Ok(())
    }

    /// Swap the open session for one starting at `at`, keeping play/pause as it was.
    fn reopen(&self, inner: &mut Inner, at: Duration) -> Result<()> {
        let playing = inner.state == PlaybackState::Playing;
        let session = inner.open_session(at, playing)?;
        inner.halt();
        inner.session = Some(session);
        inner.position = at;
        if playing {
            self.start_tracking(inner, at, PlaybackState::Paused)?;
        }
        Ok(())
    }

    /// Set output volume in `[0, 1]`.
    ///
    /// The level is baked into the PCM buffer, so an open session is reopened at
    /// the current position with a rebuilt buffer.
    pub fn set_volume(&self, volume: f32) -> Result<()> {
        let volume = pcm::clamp_volume(volume);
        let mut inner = self.lock();
        if inner.volume == volume {
            return Ok(());
        }
        inner.volume = volume;

        let Some(track) = inner.track.as_mut() else {
            return Ok(());
        };
        track.rebake(volume)?;

        if matches!(inner.state, PlaybackState::Playing | PlaybackState::Paused) {
            let at = inner.current_position();
            if let Err(e) = self.reopen(&mut inner, at) {
                warn!(error = %e, "could not reopen output after volume change");
                return Err(e);
            }
        }
        debug!(volume, "volume changed");
        Ok(())
    }

    pub fn volume(&self) -> f32 {
        self.lock().volume
    }

    /// Stop and give the output device back for good.
    pub fn close(&self) {
        let mut inner = self.lock();
        Self::stop_locked(&mut inner);
        inner.device.release();
        inner.closed = true;
        info!("player closed");
    }

    /// Replace the lyrics for the current track. The score restarts with it.
    pub fn set_timeline(&self, timeline: LyricTimeline) {
        let mut inner = self.lock();
        inner.timeline = Arc::new(timeline);
        inner.reset_karaoke();
    }

    pub fn timeline(&self) -> Arc<LyricTimeline> {
        Arc::clone(&self.lock().timeline)
    }

    pub fn reset_score(&self) {
        self.lock().reset_karaoke();
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        let inner = self.lock();
        let position = inner.current_position();
        PlaybackSnapshot {
            state: inner.state,
            path: inner.track.as_ref().map(|t| t.path.clone()),
            position,
            duration: inner.duration(),
            volume: inner.volume,
            active_line: inner.timeline.active_index(position),
            karaoke: inner.karaoke.snapshot(),
        }
    }

    /// Drain pending notifications without blocking.
    pub fn poll_events(&self) -> Vec<PlayerEvent> {
        self.events.try_iter().collect()
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        let mut inner = self.lock();
        inner.halt();
    }
}

fn clamp_secs(secs: f64, max: Duration) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).map_or(max, |d| d.min(max))
}
