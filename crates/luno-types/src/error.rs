//! Error types for the Luno SDK

use std::time::Duration;
use thiserror::Error;

/// Main error type for Luno SDK operations
#[derive(Error, Debug)]
pub enum LunoError {
    // === Input Errors ===
    /// Market symbol is not a 6 character pair such as `XBTZAR`
    #[error("Invalid pair: {0:?} (expected 6 characters, e.g. XBTZAR)")]
    InvalidPair(String),

    /// Missing API credentials
    #[error("Missing credentials: environment variable {0} not set")]
    MissingCredentials(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    // === Protocol Errors ===
    /// The stream did not start with a usable order book snapshot
    #[error("Invalid initial state: {0}")]
    InvalidInitialState(String),

    /// Failed to parse JSON frame
    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String, raw: Option<String> },

    /// Valid JSON that does not have the expected shape
    #[error("Unexpected message format: {0}")]
    UnexpectedMessage(String),

    // === Connection Errors ===
    /// Failed to establish WebSocket connection
    #[error("Failed to connect to {url}: {source}")]
    ConnectionFailed {
        url: String,
        #[source]
        source: std::io::Error,
    },

    /// Connection attempt timed out
    #[error("Connection timeout after {timeout:?} to {url}")]
    ConnectionTimeout { url: String, timeout: Duration },

    /// WebSocket protocol error
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Connection closed while a frame was expected
    #[error("Connection closed")]
    ConnectionClosed,
}

impl LunoError {
    /// Returns true if this error is potentially recoverable by reconnecting
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. }
                | Self::ConnectionTimeout { .. }
                | Self::WebSocket(_)
                | Self::ConnectionClosed
        )
    }

    /// Returns true if the connection must be torn down after this error
    pub fn requires_reconnect(&self) -> bool {
        matches!(
            self,
            Self::WebSocket(_)
                | Self::ConnectionClosed
                | Self::InvalidJson { .. }
                | Self::UnexpectedMessage(_)
                | Self::InvalidInitialState(_)
        )
    }

    /// Returns suggested retry delay, if applicable
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::ConnectionFailed { .. } => Some(Duration::from_millis(100)),
            Self::ConnectionTimeout { .. } => Some(Duration::from_millis(500)),
            _ => None,
        }
    }

    /// Create an invalid JSON error, keeping the offending frame
    pub fn invalid_json(message: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::InvalidJson {
            message: message.into(),
            raw: Some(raw.into()),
        }
    }
}

/// Result type alias for Luno operations
pub type LunoResult<T> = Result<T, LunoError>;
