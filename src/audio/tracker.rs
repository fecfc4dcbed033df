//! Background position tracking.
//!
//! One thread runs per Playing stretch. It owns nothing: every tick it takes the
//! player lock, checks that its epoch is still current and then advances the
//! shared position, the score and end-of-track detection.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use rand::Rng;
use tracing::trace;

use super::player::Inner;
use super::types::PlaybackState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Tick {
    Continue,
    Finished,
    /// The stretch this tracker belonged to is over.
    Stale,
}

/// Starts a tracker; the player swaps this out only in tests.
pub(super) type Spawner = fn(Arc<Mutex<Inner>>, u64, Duration) -> io::Result<()>;

pub(super) fn spawn(shared: Arc<Mutex<Inner>>, epoch: u64, interval: Duration) -> io::Result<()> {
    thread::Builder::new()
        .name("crooner-tracker".to_string())
        .spawn(move || run(&shared, epoch, interval))
        .map(|_| ())
}

fn run(shared: &Mutex<Inner>, epoch: u64, interval: Duration) {
    loop {
        thread::sleep(interval);
        let mut inner = shared.lock().unwrap_or_else(PoisonError::into_inner);
        match tick(&mut inner, epoch) {
            Tick::Continue => {}
            Tick::Finished | Tick::Stale => break,
        }
    }
    trace!(epoch, "tracker exited");
}

/// Advance one step. Writes nothing unless `epoch` is current and playing.
pub(super) fn tick(inner: &mut Inner, epoch: u64) -> Tick {
    if inner.epoch != epoch || inner.state != PlaybackState::Playing {
        return Tick::Stale;
    }

    let duration = inner.duration();
    let position = inner.current_position();
    inner.position = position;

    let Inner {
        karaoke,
        timeline,
        rng,
        ..
    } = &mut *inner;
    karaoke.tick(timeline.as_ref(), position, || rng.random::<f64>());

    if position >= duration {
        inner.finish();
        return Tick::Finished;
    }
    Tick::Continue
}
