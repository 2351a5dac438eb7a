use std::fmt;

use cpal::traits::HostTrait;

use crate::{
    callback::{DuplexCallback, SharedCallback, share_callback},
    config::PlayerConfig,
    error::{AudioDeviceError, Direction, Result},
    host::{self, DeviceInfo, HostApiInfo},
    logging,
    stream::DuplexStream,
};

/// A simplified duplex audio player.
///
/// Construction brings up a host API and picks its default input and output
/// devices. [`start`](Self::start) opens a stream that captures and plays
/// `channels` of `i16` audio through the callback; [`stop`](Self::stop)
/// closes it again. The host is released when the player is dropped.
pub struct DuplexPlayer {
    config: PlayerConfig,
    callback: SharedCallback,
    host_api: HostApiInfo,
    input_device: cpal::Device,
    output_device: cpal::Device,
    input_info: DeviceInfo,
    output_info: DeviceInfo,
    stream: Option<DuplexStream>,
    teardown: Teardown,
}

/// Runs the player's release step at most once.
#[derive(Debug, Default)]
struct Teardown {
    done: bool,
}

impl Teardown {
    fn run(&mut self, stop: impl FnOnce() -> Result<()>) -> Result<()> {
        if self.done {
            return Ok(());
        }
        self.done = true;

        let stopped = stop();
        logging::log("Terminating...");
        stopped
    }
}

fn stop_stream(stream: DuplexStream) -> Result<()> {
    logging::log("Stopping...");
    stream.stop()
}

impl DuplexPlayer {
    pub fn new(config: PlayerConfig, callback: impl DuplexCallback) -> Result<Self> {
        logging::log("Initializing...");
        config.validate()?;

        let apis = host::enumerate_host_apis();
        if apis.is_empty() {
            return Err(AudioDeviceError::NoHostApi);
        }

        let selected = host::select_host_api(
            apis.iter().map(|api| api.name.as_str()),
            host::default_host_index(&apis),
            &config.preferred_hosts,
        );
        logging::log(format_args!("selected Host API: {selected}"));
        let host_api = apis[selected].clone();

        // Nothing has been acquired yet, so a failure here needs no teardown.
        let host = logging::check("Initialize", cpal::host_from_id(host_api.id))
            .map_err(|e| AudioDeviceError::Initialize(e.to_string()))?;

        let input_device = host
            .default_input_device()
            .ok_or(AudioDeviceError::DeviceNotFound(Direction::Input))?;
        let output_device = host
            .default_output_device()
            .ok_or(AudioDeviceError::DeviceNotFound(Direction::Output))?;

        let input_info = DeviceInfo::from_device(&input_device, Direction::Input);
        let output_info = DeviceInfo::from_device(&output_device, Direction::Output);
        logging::log(format_args!("input device:\n{input_info}"));
        logging::log(format_args!("output device:\n{output_info}"));

        Ok(Self {
            config,
            callback: share_callback(callback),
            host_api,
            input_device,
            output_device,
            input_info,
            output_info,
            stream: None,
            teardown: Teardown::default(),
        })
    }

    pub fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Err(AudioDeviceError::AlreadyRunning);
        }
        logging::log("Starting...");

        let stream = DuplexStream::open(
            &self.input_device,
            &self.output_device,
            &self.config,
            SharedCallback::clone(&self.callback),
        )?;
        logging::log(format_args!(
            "Stream opened: {} channels at {} Hz, {} frames per buffer",
            self.config.channels, self.config.sample_rate, self.config.frames_per_buffer
        ));

        // Dropping the stream on a failed start closes it again.
        stream.start()?;
        self.stream = Some(stream);
        Ok(())
    }

    /// Stops and closes the stream. The player can be started again.
    pub fn stop(&mut self) -> Result<()> {
        let stream = self.stream.take().ok_or(AudioDeviceError::NotRunning)?;
        stop_stream(stream)
    }

    /// Releases the player, reporting any failure to stop a running stream.
    pub fn terminate(mut self) -> Result<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<()> {
        let stream = &mut self.stream;
        self.teardown
            .run(|| stream.take().map_or(Ok(()), stop_stream))
    }

    pub fn is_running(&self) -> bool {
        self.stream.is_some()
    }

    /// The callback asked the running stream to complete or abort.
    pub fn is_finished(&self) -> bool {
        self.stream.as_ref().is_some_and(DuplexStream::is_finished)
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn host_api(&self) -> &HostApiInfo {
        &self.host_api
    }

    pub fn input_device(&self) -> &DeviceInfo {
        &self.input_info
    }

    pub fn output_device(&self) -> &DeviceInfo {
        &self.output_info
    }
}

impl fmt::Debug for DuplexPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DuplexPlayer")
            .field("config", &self.config)
            .field("host_api", &self.host_api.name)
            .field("input_device", &self.input_info.name)
            .field("output_device", &self.output_info.name)
            .field("stream", &self.stream)
            .finish_non_exhaustive()
    }
}

impl Drop for DuplexPlayer {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::warn!(target: logging::LOG_TARGET, "Failed to stop stream on drop: {e}");
        }
    }
}
