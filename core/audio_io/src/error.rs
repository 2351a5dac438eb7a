use std::fmt;

use thiserror::Error;

/// Which half of a duplex stream a device or failure belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Output => f.write_str("output"),
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AudioDeviceError {
    #[error("can't initialize audio: {0}")]
    Initialize(String),

    #[error("no host API available")]
    NoHostApi,

    #[error("no default {0} device on the selected host API")]
    DeviceNotFound(Direction),

    #[error("{action} failed: {reason}")]
    DeviceInfo { action: &'static str, reason: String },

    #[error("failed to build {direction} stream: {reason}")]
    StreamBuildFailed { direction: Direction, reason: String },

    #[error("failed to start stream: {0}")]
    StreamStartFailed(String),

    #[error("failed to stop stream: {0}")]
    StreamStopFailed(String),

    #[error("stream is already running")]
    AlreadyRunning,

    #[error("stream is not running")]
    NotRunning,

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, AudioDeviceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_error_mentions_audio() {
        let err = AudioDeviceError::Initialize("ALSA unavailable".to_owned());
        assert_eq!(err.to_string(), "can't initialize audio: ALSA unavailable");
    }

    #[test]
    fn test_stream_errors_name_their_direction() {
        let err = AudioDeviceError::StreamBuildFailed {
            direction: Direction::Input,
            reason: "busy".to_owned(),
        };
        assert_eq!(err.to_string(), "failed to build input stream: busy");
        assert_eq!(
            AudioDeviceError::DeviceNotFound(Direction::Output).to_string(),
            "no default output device on the selected host API"
        );
    }
}
