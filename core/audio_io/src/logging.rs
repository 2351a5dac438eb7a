//! Player logging, switched on and off process-wide.
//!
//! Records go through the `log` facade under the [`LOG_TARGET`] target, but
//! only while [`set_logging_enabled`] has turned them on.

use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::Direction;

pub const LOG_TARGET: &str = "audio_io";

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(false);

pub fn set_logging_enabled(enabled: bool) {
    LOGGING_ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn logging_enabled() -> bool {
    LOGGING_ENABLED.load(Ordering::Relaxed)
}

pub(crate) fn log(message: impl Display) {
    if logging_enabled() {
        log::info!(target: LOG_TARGET, "{message}");
    }
}

/// Native errors that may carry a host-specific description.
pub trait HostErrorDetail {
    fn host_error(&self) -> Option<&cpal::BackendSpecificError>;
}

macro_rules! impl_host_error_detail {
    ($($err:ty),* $(,)?) => {
        $(
            impl HostErrorDetail for $err {
                fn host_error(&self) -> Option<&cpal::BackendSpecificError> {
                    match self {
                        Self::BackendSpecific { err } => Some(err),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_host_error_detail!(
    cpal::BuildStreamError,
    cpal::PlayStreamError,
    cpal::PauseStreamError,
    cpal::StreamError,
);

impl HostErrorDetail for cpal::HostUnavailable {
    fn host_error(&self) -> Option<&cpal::BackendSpecificError> {
        None
    }
}

/// Logs the outcome of a call into the native library and hands the result
/// back untouched.
pub fn check<T, E>(action: &str, result: Result<T, E>) -> Result<T, E>
where
    E: Display + HostErrorDetail,
{
    match &result {
        Ok(_) => log(format_args!("{action} OK")),
        Err(err) => {
            log(format_args!("{action} error: {err}"));
            if let Some(host) = err.host_error() {
                log(format_args!("- Host error text: {}", host.description));
            }
        }
    }
    result
}

/// Error callback for the native stream threads.
pub(crate) fn stream_error(direction: Direction, err: &cpal::StreamError) {
    if logging_enabled() {
        log::warn!(target: LOG_TARGET, "{direction} stream error: {err}");
        if let Some(host) = err.host_error() {
            log::warn!(target: LOG_TARGET, "- Host error text: {}", host.description);
        }
    }
}

/// The user callback could not run and the stream was aborted.
pub(crate) fn callback_failure(reason: &str) {
    if logging_enabled() {
        log::warn!(target: LOG_TARGET, "Stream callback aborted: {reason}");
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn busy_device() -> cpal::BuildStreamError {
        cpal::BuildStreamError::BackendSpecific {
            err: cpal::BackendSpecificError {
                description: "device busy".to_owned(),
            },
        }
    }

    #[test]
    fn test_check_returns_result_unchanged() {
        let ok: Result<u8, cpal::PlayStreamError> = Ok(7);
        assert_eq!(check("StartStream", ok).ok(), Some(7));

        let err: Result<(), cpal::PlayStreamError> =
            Err(cpal::PlayStreamError::DeviceNotAvailable);
        assert!(matches!(
            check("StartStream", err),
            Err(cpal::PlayStreamError::DeviceNotAvailable)
        ));
    }

    #[test]
    fn test_backend_errors_expose_host_text() {
        assert_eq!(
            busy_device().host_error().map(|e| e.description.as_str()),
            Some("device busy")
        );
        assert!(cpal::BuildStreamError::DeviceNotAvailable.host_error().is_none());
    }

    #[test]
    fn test_nothing_is_logged_while_disabled() {
        let records = capture::with_logging(false, || {
            assert!(!logging_enabled());
            log("Initializing...");
            let _ = check::<(), _>("OpenInputStream", Err(busy_device()));
            callback_failure("callback panicked");
        });
        assert!(records.is_empty(), "unexpected records: {records:?}");
    }

    #[test]
    fn test_check_logs_ok_line() {
        let records = capture::with_logging(true, || {
            assert!(logging_enabled());
            let ok: Result<(), cpal::PlayStreamError> = Ok(());
            let _ = check("StartStream", ok);
        });
        assert_eq!(records, vec!["StartStream OK"]);
    }

    #[test]
    fn test_check_logs_error_and_host_text() {
        let records = capture::with_logging(true, || {
            let _ = check::<(), _>("OpenInputStream", Err(busy_device()));
        });
        assert_eq!(
            records,
            vec![
                format!("OpenInputStream error: {}", busy_device()),
                "- Host error text: device busy".to_owned(),
            ]
        );
    }

    #[test]
    fn test_check_without_host_detail_logs_one_line() {
        let records = capture::with_logging(true, || {
            let err: Result<(), cpal::PlayStreamError> =
                Err(cpal::PlayStreamError::DeviceNotAvailable);
            let _ = check("StartStream", err);
        });
        assert_eq!(records.len(), 1);
        assert!(records[0].starts_with("StartStream error: "));
    }
}
