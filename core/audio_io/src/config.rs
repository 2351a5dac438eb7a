use cpal::{BufferSize, SampleRate, StreamConfig};

use crate::error::{AudioDeviceError, Result};

pub const DEFAULT_CHANNELS: u16 = 2;
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
pub const DEFAULT_FRAMES_PER_BUFFER: u32 = 256;
pub const DEFAULT_LATENCY_BUFFERS: usize = 4;

/// Host API names tried before falling back to the platform default.
/// ALSA and WASAPI are the plain system sound layers on Linux and Windows.
pub const DEFAULT_PREFERRED_HOSTS: [&str; 2] = ["ALSA", "WASAPI"];

/// Settings for a [`DuplexPlayer`](crate::player::DuplexPlayer).
///
/// The same channel count is used for capture and playback, and samples are
/// always exchanged as interleaved `i16`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerConfig {
    pub channels: u16,
    pub sample_rate: u32,
    pub frames_per_buffer: u32,
    /// Matched case-insensitively against host API names; the last
    /// available match in enumeration order wins.
    pub preferred_hosts: Vec<String>,
    /// Buffers of captured input allowed to queue up for the output side.
    pub latency_buffers: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_CHANNELS,
            DEFAULT_SAMPLE_RATE,
            DEFAULT_FRAMES_PER_BUFFER,
        )
    }
}

impl PlayerConfig {
    pub fn new(channels: u16, sample_rate: u32, frames_per_buffer: u32) -> Self {
        Self {
            channels,
            sample_rate,
            frames_per_buffer,
            preferred_hosts: DEFAULT_PREFERRED_HOSTS.map(str::to_owned).to_vec(),
            latency_buffers: DEFAULT_LATENCY_BUFFERS,
        }
    }

    #[must_use]
    pub fn with_preferred_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preferred_hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_latency_buffers(mut self, buffers: usize) -> Self {
        self.latency_buffers = buffers;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.channels == 0 {
            return Err(AudioDeviceError::InvalidConfig(
                "channel count must be at least 1".to_owned(),
            ));
        }
        if self.sample_rate == 0 {
            return Err(AudioDeviceError::InvalidConfig(
                "sample rate must be positive".to_owned(),
            ));
        }
        if self.frames_per_buffer == 0 {
            return Err(AudioDeviceError::InvalidConfig(
                "frames per buffer must be positive".to_owned(),
            ));
        }
        if self.latency_buffers == 0 {
            return Err(AudioDeviceError::InvalidConfig(
                "at least one latency buffer is required".to_owned(),
            ));
        }
        Ok(())
    }

    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig {
            channels: self.channels,
            sample_rate: SampleRate(self.sample_rate),
            buffer_size: BufferSize::Fixed(self.frames_per_buffer),
        }
    }

    /// Interleaved samples in one buffer.
    pub fn samples_per_buffer(&self) -> usize {
        self.frames_per_buffer as usize * usize::from(self.channels)
    }

    /// Capacity, in interleaved samples, of the queue carrying input to the
    /// output callback.
    pub fn ring_capacity(&self) -> usize {
        self.samples_per_buffer() * self.latency_buffers
    }
}
