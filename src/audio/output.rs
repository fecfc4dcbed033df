//! Output device abstraction and its `rodio` implementation.
//!
//! A session plays a shared byte buffer from an explicit start offset, so seeking
//! is just closing one session and opening another further into the buffer.

use std::num::NonZero;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rodio::mixer::Mixer;
use rodio::{ChannelCount, DeviceSinkBuilder as OutputStreamBuilder, Player as Sink, Source};

use crate::error::{PlayerError, Result};

use super::types::{BYTES_PER_SAMPLE, PcmFormat};

/// One playback session on the device. Created paused.
pub trait OutputSession: Send {
    /// Queue `pcm` starting at byte `offset`.
    fn feed(&mut self, pcm: Arc<[u8]>, offset: usize);
    fn pause(&mut self);
    fn resume(&mut self);
    fn close(&mut self);
}

pub trait OutputDevice: Send {
    fn open(&mut self, format: PcmFormat) -> Result<Box<dyn OutputSession>>;
    /// Release the underlying device. A later `open` may reacquire it.
    fn release(&mut self);
}

/// Keeps the platform stream alive on its own thread; the stream itself is not
/// `Send`, only its mixer handle is.
struct StreamKeeper {
    mixer: Mixer,
    shutdown: mpsc::Sender<()>,
    join: Option<JoinHandle<()>>,
}

impl StreamKeeper {
    fn start() -> Result<Self> {
        let (ready_tx, ready_rx) = mpsc::channel::<std::result::Result<Mixer, String>>();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let join = thread::Builder::new()
            .name("crooner-output".to_string())
            .spawn(move || match OutputStreamBuilder::open_default_sink() {
                Ok(mut stream) => {
                    // rodio logs to stderr on drop, which would scribble over the TUI.
                    stream.log_on_drop(false);
                    let _ = ready_tx.send(Ok(stream.mixer().clone()));
                    // Park until released or the keeper is dropped.
                    let _ = shutdown_rx.recv();
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e.to_string()));
                }
            })
            .map_err(|e| PlayerError::DeviceUnavailable(e.to_string()))?;

        let mixer = ready_rx
            .recv()
            .map_err(|e| PlayerError::DeviceUnavailable(e.to_string()))?
            .map_err(PlayerError::DeviceUnavailable)?;

        Ok(Self {
            mixer,
            shutdown: shutdown_tx,
            join: Some(join),
        })
    }
}

impl Drop for StreamKeeper {
    fn drop(&mut self) {
        let _ = self.shutdown.send(());
        if let Some(h) = self.join.take() {
            let _ = h.join();
        }
    }
}

/// Default output device, opened lazily on first use.
#[derive(Default)]
pub struct RodioOutput {
    keeper: Option<StreamKeeper>,
}

impl RodioOutput {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutputDevice for RodioOutput {
    fn open(&mut self, format: PcmFormat) -> Result<Box<dyn OutputSession>> {
        let channels = ChannelCount::new(format.channels).ok_or(PlayerError::InvalidFormat {
            sample_rate: format.sample_rate,
            channels: format.channels,
        })?;
        let sample_rate = NonZero::new(format.sample_rate).ok_or(PlayerError::InvalidFormat {
            sample_rate: format.sample_rate,
            channels: format.channels,
        })?;

        if self.keeper.is_none() {
            self.keeper = Some(StreamKeeper::start()?);
        }
        let Some(keeper) = self.keeper.as_ref() else {
            return Err(PlayerError::DeviceUnavailable("stream not running".into()));
        };

        let sink = Sink::connect_new(&keeper.mixer);
        sink.pause();
        Ok(Box::new(RodioSession {
            sink,
            channels,
            sample_rate,
        }))
    }

    fn release(&mut self) {
        self.keeper = None;
    }
}

struct RodioSession {
    sink: Sink,
    channels: ChannelCount,
    sample_rate: NonZero<u32>,
}

impl OutputSession for RodioSession {
    fn feed(&mut self, pcm: Arc<[u8]>, offset: usize) {
        self.sink.append(PcmSource {
            pcm,
            pos: offset,
            channels: self.channels,
            sample_rate: self.sample_rate,
        });
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn resume(&mut self) {
        self.sink.play();
    }

    fn close(&mut self) {
        self.sink.stop();
    }
}

/// Reads i16 LE samples out of a shared buffer.
struct PcmSource {
    pcm: Arc<[u8]>,
    pos: usize,
    channels: ChannelCount,
    sample_rate: NonZero<u32>,
}

impl Iterator for PcmSource {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        let bytes = self.pcm.get(self.pos..self.pos + BYTES_PER_SAMPLE)?;
        self.pos += BYTES_PER_SAMPLE;
        let s = i16::from_le_bytes([bytes[0], bytes[1]]);
        Some(s as f32 / 32768.0)
    }
}

impl Source for PcmSource {
    fn current_span_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> ChannelCount {
        self.channels
    }

    fn sample_rate(&self) -> NonZero<u32> {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}
