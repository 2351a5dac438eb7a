use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{
    Arc, Mutex, TryLockError,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use rtrb::{Consumer, Producer, RingBuffer};

use crate::logging;

/// What the stream should do after a callback returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackFlow {
    Continue,
    /// Finish after this buffer has been played.
    Complete,
    /// Stop producing audio immediately.
    Abort,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallbackInfo {
    pub frames: usize,
    /// Less captured input was available than the buffer needed; the rest
    /// of `input` is silence.
    pub input_underflow: bool,
}

/// User code driven by the duplex stream.
///
/// `input` and `output` hold interleaved samples and always have the same
/// length. Runs on the native library's real-time thread.
pub trait DuplexCallback: Send + 'static {
    fn process(&mut self, input: &[i16], output: &mut [i16], info: &CallbackInfo) -> CallbackFlow;
}

impl<F> DuplexCallback for F
where
    F: FnMut(&[i16], &mut [i16], &CallbackInfo) -> CallbackFlow + Send + 'static,
{
    fn process(&mut self, input: &[i16], output: &mut [i16], info: &CallbackInfo) -> CallbackFlow {
        self(input, output, info)
    }
}

/// Callback shared between the player and whichever stream is open.
pub type SharedCallback = Arc<Mutex<Box<dyn DuplexCallback>>>;

pub fn share_callback(callback: impl DuplexCallback) -> SharedCallback {
    Arc::new(Mutex::new(Box::new(callback)))
}

/// Creates the two ends joining an input stream to an output stream.
///
/// `capacity` is the number of interleaved samples that may be queued
/// between them; anything captured beyond that is dropped.
pub fn duplex_bridge(
    capacity: usize,
    channels: u16,
    callback: SharedCallback,
) -> (InputFeeder, DuplexBridge) {
    let (producer, consumer) = RingBuffer::new(capacity);
    let dropped = Arc::new(AtomicUsize::new(0));
    let finished = Arc::new(AtomicBool::new(false));

    let feeder = InputFeeder {
        producer,
        dropped: Arc::clone(&dropped),
    };
    let bridge = DuplexBridge {
        consumer,
        scratch: vec![0; capacity],
        channels: usize::from(channels.max(1)),
        callback,
        finished,
        dropped,
    };
    (feeder, bridge)
}

/// Input-stream half: queues captured samples for the output side.
pub struct InputFeeder {
    producer: Producer<i16>,
    dropped: Arc<AtomicUsize>,
}

impl InputFeeder {
    pub fn push(&mut self, samples: &[i16]) {
        let mut dropped = 0;
        for &sample in samples {
            if self.producer.push(sample).is_err() {
                dropped += 1;
            }
        }
        if dropped > 0 {
            self.dropped.fetch_add(dropped, Ordering::Relaxed);
        }
    }
}

impl fmt::Debug for InputFeeder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputFeeder")
            .field("free_slots", &self.producer.slots())
            .field("dropped", &self.dropped.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// Output-stream half: pairs queued input with each output buffer and runs
/// the user callback on both.
pub struct DuplexBridge {
    consumer: Consumer<i16>,
    scratch: Vec<i16>,
    channels: usize,
    callback: SharedCallback,
    finished: Arc<AtomicBool>,
    dropped: Arc<AtomicUsize>,
}

impl DuplexBridge {
    pub fn finished_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.finished)
    }

    pub fn dropped_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.dropped)
    }

    pub fn render(&mut self, output: &mut [i16]) {
        if self.finished.load(Ordering::Acquire) {
            output.fill(0);
            return;
        }

        if self.scratch.len() < output.len() {
            // @audit allocation on the audio thread; only when the host hands
            // us a bigger buffer than configured
            self.scratch.resize(output.len(), 0);
        }
        let input = &mut self.scratch[..output.len()];
        let filled = Self::drain_into(&mut self.consumer, input);
        input[filled..].fill(0);

        let info = CallbackInfo {
            frames: output.len() / self.channels,
            input_underflow: filled < output.len(),
        };

        // Only this thread locks while a stream is open, so contention means
        // the player is tearing down.
        let flow = match self.callback.try_lock() {
            Ok(mut callback) => {
                panic::catch_unwind(AssertUnwindSafe(|| callback.process(input, output, &info)))
                    .unwrap_or_else(|_| {
                        logging::callback_failure("callback panicked");
                        CallbackFlow::Abort
                    })
            }
            Err(TryLockError::WouldBlock) => {
                output.fill(0);
                CallbackFlow::Continue
            }
            Err(TryLockError::Poisoned(_)) => {
                logging::callback_failure("callback lock poisoned by an earlier panic");
                CallbackFlow::Abort
            }
        };

        match flow {
            CallbackFlow::Continue | CallbackFlow::Complete => {}
            CallbackFlow::Abort => output.fill(0),
        }
        if flow != CallbackFlow::Continue {
            self.finished.store(true, Ordering::Release);
        }
    }

    fn drain_into(consumer: &mut Consumer<i16>, target: &mut [i16]) -> usize {
        let available = consumer.slots().min(target.len());
        let Ok(chunk) = consumer.read_chunk(available) else {
            return 0;
        };
        let (first, second) = chunk.as_slices();
        target[..first.len()].copy_from_slice(first);
        target[first.len()..first.len() + second.len()].copy_from_slice(second);
        chunk.commit_all();
        available
    }
}

impl fmt::Debug for DuplexBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DuplexBridge")
            .field("queued", &self.consumer.slots())
            .field("channels", &self.channels)
            .field("finished", &self.finished.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
