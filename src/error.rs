//! Error types for the monitor library.

use thiserror::Error;

/// Errors that can occur while producing an observation.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// The profile could not be fetched or did not contain the expected data.
    ///
    /// The throttle state is never touched when this is returned; the caller
    /// simply waits for the next save event.
    #[error("Profile data unavailable: {0}")]
    DataUnavailable(String),

    /// Invalid settings (thresholds out of order, bad URL template, ...).
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Local file access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MonitorError {
    /// Shorthand for building a [`MonitorError::DataUnavailable`].
    pub fn unavailable(reason: impl Into<String>) -> Self {
        MonitorError::DataUnavailable(reason.into())
    }

    /// Returns true if this error means "skip this observation and retry later".
    pub fn is_data_unavailable(&self) -> bool {
        matches!(self, MonitorError::DataUnavailable(_))
    }
}

impl From<reqwest::Error> for MonitorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            MonitorError::DataUnavailable("request timed out".to_string())
        } else if err.is_connect() {
            MonitorError::DataUnavailable(format!("connection failed: {}", err))
        } else {
            MonitorError::DataUnavailable(format!("HTTP request failed: {}", err))
        }
    }
}

impl From<serde_json::Error> for MonitorError {
    fn from(err: serde_json::Error) -> Self {
        MonitorError::DataUnavailable(format!("malformed profile payload: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_errors_are_data_unavailable() {
        let err: MonitorError = serde_json::from_str::<u64>("nope").unwrap_err().into();
        assert!(err.is_data_unavailable());
        assert!(err.to_string().starts_with("Profile data unavailable"));
    }

    #[test]
    fn test_io_errors_are_not_data_unavailable() {
        let err: MonitorError = std::io::Error::other("disk").into();
        assert!(!err.is_data_unavailable());
    }
}
