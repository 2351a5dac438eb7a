//! Duplex audio I/O on top of the platform's native audio library.
//!
//! [`DuplexPlayer`] selects a host API, opens its default input and output
//! devices and drives a single [`DuplexCallback`] with matching buffers of
//! captured and outgoing `i16` samples.

pub mod callback;
pub mod config;
pub mod error;
pub mod host;
pub mod logging;
pub mod player;
pub mod stream;

pub use callback::{CallbackFlow, CallbackInfo, DuplexCallback};
pub use config::PlayerConfig;
pub use error::{AudioDeviceError, Direction, Result};
pub use logging::{logging_enabled, set_logging_enabled};
pub use player::DuplexPlayer;
