use std::fmt;
use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use cpal::{
    InputCallbackInfo, OutputCallbackInfo,
    traits::{DeviceTrait, StreamTrait},
};

use crate::{
    callback::{SharedCallback, duplex_bridge},
    config::PlayerConfig,
    error::{AudioDeviceError, Direction, Result},
    logging,
};

/// Lets a `cpal::Stream` live inside a `Send` player.
///
/// `cpal::Stream` is `!Send` on some platforms because of backend internals.
struct StreamHandle(cpal::Stream);

// SAFETY: a StreamHandle is only touched through `&mut DuplexStream`, so it is
// never used from two threads at once. It is created, played, paused and
// dropped by whichever thread currently owns the player.
unsafe impl Send for StreamHandle {}

/// An open pair of capture and playback streams driven by one callback.
///
/// The native streams are closed when this is dropped.
pub struct DuplexStream {
    input: StreamHandle,
    output: StreamHandle,
    finished: Arc<AtomicBool>,
    dropped_input: Arc<AtomicUsize>,
}

impl DuplexStream {
    pub fn open(
        input_device: &cpal::Device,
        output_device: &cpal::Device,
        config: &PlayerConfig,
        callback: SharedCallback,
    ) -> Result<Self> {
        let stream_config = config.stream_config();
        let (mut feeder, mut bridge) =
            duplex_bridge(config.ring_capacity(), config.channels, callback);
        let finished = bridge.finished_flag();
        let dropped_input = bridge.dropped_counter();

        let input = logging::check(
            "OpenInputStream",
            input_device.build_input_stream(
                &stream_config,
                move |data: &[i16], _: &InputCallbackInfo| feeder.push(data),
                move |err| logging::stream_error(Direction::Input, &err),
                None,
            ),
        )
        .map_err(|e| AudioDeviceError::StreamBuildFailed {
            direction: Direction::Input,
            reason: e.to_string(),
        })?;

        let output = logging::check(
            "OpenOutputStream",
            output_device.build_output_stream(
                &stream_config,
                move |data: &mut [i16], _: &OutputCallbackInfo| bridge.render(data),
                move |err| logging::stream_error(Direction::Output, &err),
                None,
            ),
        )
        .map_err(|e| AudioDeviceError::StreamBuildFailed {
            direction: Direction::Output,
            reason: e.to_string(),
        })?;

        Ok(Self {
            input: StreamHandle(input),
            output: StreamHandle(output),
            finished,
            dropped_input,
        })
    }

    pub fn start(&self) -> Result<()> {
        logging::check("StartStream", self.input.0.play())
            .and_then(|()| logging::check("StartStream", self.output.0.play()))
            .map_err(|e| AudioDeviceError::StreamStartFailed(e.to_string()))
    }

    pub fn stop(&self) -> Result<()> {
        logging::check("StopStream", self.output.0.pause())
            .and_then(|()| logging::check("StopStream", self.input.0.pause()))
            .map_err(|e| AudioDeviceError::StreamStopFailed(e.to_string()))
    }

    /// The callback has returned [`CallbackFlow::Complete`] or
    /// [`CallbackFlow::Abort`].
    ///
    /// [`CallbackFlow::Complete`]: crate::callback::CallbackFlow::Complete
    /// [`CallbackFlow::Abort`]: crate::callback::CallbackFlow::Abort
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Captured samples discarded because the output side fell behind.
    pub fn dropped_input_samples(&self) -> usize {
        self.dropped_input.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for DuplexStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DuplexStream")
            .field("finished", &self.is_finished())
            .field("dropped_input", &self.dropped_input_samples())
            .finish_non_exhaustive()
    }
}

impl Drop for DuplexStream {
    fn drop(&mut self) {
        // The native streams close as the fields drop after this.
        logging::log("Closing stream...");
    }
}
