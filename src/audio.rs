//! Fixed-size sound channel pool with priority eviction.
//!
//! The pool only does bookkeeping; actual output goes through an
//! [`AudioSink`].  Playback failures are logged and swallowed so a missing
//! device never interrupts a run.

use tracing::{debug, trace};

use crate::error::AudioError;

#[cfg(feature = "audio")]
mod tone;
#[cfg(feature = "audio")]
pub use tone::ToneSink;

pub const DEFAULT_CHANNELS: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cue {
    Bullet,
    Explosion,
    Pickup,
    /// Looping hum for as long as the laser beam exists.
    Laser,
}

impl Cue {
    /// Playback length in seconds; infinite for looping cues.
    pub fn duration(self) -> f32 {
        match self {
            Cue::Bullet => 0.15,
            Cue::Explosion => 0.6,
            Cue::Pickup => 0.3,
            Cue::Laser => f32::INFINITY,
        }
    }

    pub fn is_looping(self) -> bool {
        matches!(self, Cue::Laser)
    }

    /// Pitch used by the tone synthesiser.
    pub fn tone_hz(self) -> f32 {
        match self {
            Cue::Bullet => 880.0,
            Cue::Explosion => 110.0,
            Cue::Pickup => 660.0,
            Cue::Laser => 330.0,
        }
    }
}

/// A request to play a cue.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CueRequest {
    pub cue: Cue,
    pub volume: f32,
    /// Refuse to start when this many channels already play the cue.
    pub max_simultaneous: Option<usize>,
    pub priority: i32,
}

impl CueRequest {
    pub fn new(cue: Cue) -> Self {
        Self {
            cue,
            volume: 1.0,
            max_simultaneous: None,
            priority: 0,
        }
    }

    pub fn volume(mut self, volume: f32) -> Self {
        self.volume = volume.clamp(0.0, 1.0);
        self
    }

    pub fn max_simultaneous(mut self, cap: usize) -> Self {
        self.max_simultaneous = Some(cap);
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn explosion() -> Self {
        Self::new(Cue::Explosion).volume(0.6).max_simultaneous(6).priority(5)
    }

    pub fn pickup() -> Self {
        Self::new(Cue::Pickup).volume(0.8).max_simultaneous(3).priority(8)
    }

    pub fn bullet(volume: f32) -> Self {
        Self::new(Cue::Bullet).volume(volume).max_simultaneous(8).priority(7)
    }

    pub fn laser() -> Self {
        Self::new(Cue::Laser).volume(0.7).max_simultaneous(1).priority(9)
    }
}

/// Handle to a started sound.  Stale once its channel is reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Voice {
    channel: usize,
    serial: u64,
}

impl Voice {
    pub fn channel(&self) -> usize {
        self.channel
    }
}

/// Output device behind the pool.
pub trait AudioSink {
    fn play(&mut self, channel: usize, cue: Cue, volume: f32, looping: bool) -> Result<(), AudioError>;
    fn stop(&mut self, channel: usize) -> Result<(), AudioError>;
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentSink;

impl AudioSink for SilentSink {
    fn play(&mut self, _channel: usize, _cue: Cue, _volume: f32, _looping: bool) -> Result<(), AudioError> {
        Ok(())
    }

    fn stop(&mut self, _channel: usize) -> Result<(), AudioError> {
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Channel {
    cue: Option<Cue>,
    priority: i32,
    serial: u64,
    remaining: f32,
}

impl Channel {
    fn is_busy(&self) -> bool {
        self.cue.is_some()
    }
}

pub struct ChannelPool {
    channels: Vec<Channel>,
    next_serial: u64,
    sink: Box<dyn AudioSink>,
}

impl ChannelPool {
    /// A pool needs at least one channel; zero is bumped to one.
    pub fn new(channels: usize, sink: Box<dyn AudioSink>) -> Self {
        Self {
            channels: vec![Channel::default(); channels.max(1)],
            next_serial: 1,
            sink,
        }
    }

    pub fn silent(channels: usize) -> Self {
        Self::new(channels, Box::new(SilentSink))
    }

    pub fn capacity(&self) -> usize {
        self.channels.len()
    }

    pub fn busy_count(&self) -> usize {
        self.channels.iter().filter(|c| c.is_busy()).count()
    }

    pub fn playing(&self, cue: Cue) -> usize {
        self.channels.iter().filter(|c| c.cue == Some(cue)).count()
    }

    pub fn is_playing(&self, voice: Voice) -> bool {
        self.channels
            .get(voice.channel)
            .is_some_and(|c| c.is_busy() && c.serial == voice.serial)
    }

    /// Start a cue on a free channel, evicting the lowest-priority (then
    /// oldest) sound when none is free.  Returns `None` when the cue is at
    /// its cap or the sink refuses it.
    pub fn play(&mut self, request: CueRequest) -> Option<Voice> {
        if let Some(cap) = request.max_simultaneous {
            if self.playing(request.cue) >= cap {
                trace!(cue = ?request.cue, cap, "cue at cap; dropped");
                return None;
            }
        }

        let idx = match self.channels.iter().position(|c| !c.is_busy()) {
            Some(idx) => idx,
            None => {
                let idx = self
                    .channels
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, c)| (c.priority, c.serial))
                    .map(|(idx, _)| idx)?;
                debug!(channel = idx, evicted = ?self.channels[idx].cue, "evicting sound");
                if let Err(e) = self.sink.stop(idx) {
                    debug!(error = %e, "sink stop failed");
                }
                self.channels[idx] = Channel::default();
                idx
            }
        };

        let looping = request.cue.is_looping();
        if let Err(e) = self.sink.play(idx, request.cue, request.volume, looping) {
            debug!(cue = ?request.cue, error = %e, "sound unavailable");
            return None;
        }

        let serial = self.next_serial;
        self.next_serial += 1;
        self.channels[idx] = Channel {
            cue: Some(request.cue),
            priority: request.priority,
            serial,
            remaining: request.cue.duration(),
        };
        Some(Voice {
            channel: idx,
            serial,
        })
    }

    /// Stop a voice.  Returns false if it already ended or its channel was
    /// taken by another sound.
    pub fn stop(&mut self, voice: Voice) -> bool {
        if !self.is_playing(voice) {
            return false;
        }
        if let Err(e) = self.sink.stop(voice.channel) {
            debug!(error = %e, "sink stop failed");
        }
        self.channels[voice.channel] = Channel::default();
        true
    }

    /// Release channels whose sound has run out.
    pub fn advance(&mut self, dt: f32) {
        for channel in self.channels.iter_mut().filter(|c| c.is_busy()) {
            channel.remaining -= dt;
            if channel.remaining <= 0.0 {
                *channel = Channel::default();
            }
        }
    }

    pub fn stop_all(&mut self) {
        for idx in 0..self.channels.len() {
            if self.channels[idx].is_busy() {
                if let Err(e) = self.sink.stop(idx) {
                    debug!(error = %e, "sink stop failed");
                }
                self.channels[idx] = Channel::default();
            }
        }
    }
}

impl std::fmt::Debug for ChannelPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelPool")
            .field("capacity", &self.capacity())
            .field("busy", &self.busy_count())
            .finish()
    }
}
