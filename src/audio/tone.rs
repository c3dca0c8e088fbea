use std::time::Duration;

use rodio::source::SineWave;
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};

use super::{AudioSink, Cue};
use crate::error::AudioError;

/// Plays every cue as a short sine tone on the default output device.
pub struct ToneSink {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    sinks: Vec<Option<Sink>>,
}

impl ToneSink {
    pub fn new(channels: usize) -> Result<Self, AudioError> {
        let (stream, handle) =
            OutputStream::try_default().map_err(|e| AudioError::Device(e.to_string()))?;
        Ok(Self {
            _stream: stream,
            handle,
            sinks: (0..channels.max(1)).map(|_| None).collect(),
        })
    }
}

impl AudioSink for ToneSink {
    fn play(&mut self, channel: usize, cue: Cue, volume: f32, looping: bool) -> Result<(), AudioError> {
        let slot = self.sinks.get_mut(channel).ok_or(AudioError::Channel(channel))?;
        let sink = Sink::try_new(&self.handle).map_err(|e| AudioError::Device(e.to_string()))?;
        sink.set_volume(volume);

        let tone = SineWave::new(cue.tone_hz()).amplify(0.2);
        if looping {
            sink.append(tone);
        } else {
            sink.append(tone.take_duration(Duration::from_secs_f32(cue.duration())));
        }
        // Dropping the previous sink silences whatever it was playing.
        *slot = Some(sink);
        Ok(())
    }

    fn stop(&mut self, channel: usize) -> Result<(), AudioError> {
        let slot = self.sinks.get_mut(channel).ok_or(AudioError::Channel(channel))?;
        if let Some(sink) = slot.take() {
            sink.stop();
        }
        Ok(())
    }
}
