//! Application-wide run state and bring-up error types

use core::fmt::Write;

use thiserror_no_std::Error;

/// Maximum length of an error detail message
pub const ERROR_DETAIL_LEN: usize = 64;

pub type ErrorDetail = heapless::String<ERROR_DETAIL_LEN>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppRunState {
    Uninitialized,
    RadioStarting,
    WifiConnecting,
    WifiConnected,
    Listening,
    Error,
}

/// Bring-up failures. Every one of these is fatal: the device reports it and
/// halts without retrying.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Radio initialization failed: {0}")]
    Radio(ErrorDetail),
    #[error("WiFi configuration rejected: {0}")]
    WifiConfig(ErrorDetail),
    #[error("WiFi association failed: {0}")]
    WifiAssociation(ErrorDetail),
    #[error("WiFi association timed out after {0} ms")]
    WifiTimeout(u32),
    #[error("No IPv4 address within {0} ms")]
    Dhcp(u32),
    #[error("Socket error: {0}")]
    Socket(ErrorDetail),
}

/// Format a `Debug` value into an error detail, truncating if it is too long.
pub fn detail<T: core::fmt::Debug>(value: &T) -> ErrorDetail {
    let mut out = ErrorDetail::new();
    let mut writer = Truncating(&mut out);
    let _ = write!(writer, "{:?}", value);
    out
}

/// Copy a message into an error detail, truncating at a char boundary.
pub fn detail_str(message: &str) -> ErrorDetail {
    let mut out = ErrorDetail::new();
    let _ = Truncating(&mut out).write_str(message);
    out
}

/// Writer that keeps as many whole chars as fit and drops the rest.
struct Truncating<'a>(&'a mut ErrorDetail);

impl Write for Truncating<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn test_detail_truncates() {
        let long = "x".repeat(200);
        let d = detail_str(&long);
        assert_eq!(d.len(), ERROR_DETAIL_LEN);
    }

    #[test]
    fn test_detail_keeps_char_boundaries() {
        let message = "ção".repeat(40);
        let d = detail_str(&message);
        assert!(d.len() <= ERROR_DETAIL_LEN);
        assert!(d.as_str().chars().all(|c| "ção".contains(c)));
    }

    #[test]
    fn test_detail_from_debug() {
        #[derive(Debug)]
        #[allow(dead_code)]
        enum RadioError {
            NotStarted,
        }
        let d = detail(&RadioError::NotStarted);
        assert_eq!(d.as_str(), "NotStarted");
    }

    #[test]
    fn test_error_display() {
        let err = AppError::WifiTimeout(20_000);
        assert_eq!(format!("{err}"), "WiFi association timed out after 20000 ms");

        let err = AppError::Socket(detail_str("bind refused"));
        assert_eq!(format!("{err}"), "Socket error: bind refused");
    }
}
