//! Stream connection configuration

use crate::endpoint::DEFAULT_URL;
use crate::reconnect::ReconnectConfig;
use luno_types::{LunoError, LunoResult};
use std::time::Duration;

/// Interval between outbound keep-alive frames
pub const DEFAULT_KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(60);
/// Connection timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Largest accepted frame or message (2 MiB)
pub const DEFAULT_MAX_FRAME_SIZE: usize = 2 << 20;
/// Origin header sent with the upgrade request
pub const DEFAULT_ORIGIN: &str = "http://localhost/";

/// Configuration for a market stream connection
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Stream host, without the `/api/1/stream/` path
    pub base_url: String,
    /// Interval between keep-alive frames
    pub keep_alive_interval: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Maximum frame and message size in bytes
    pub max_frame_size: usize,
    /// Value of the `Origin` header
    pub origin: String,
    /// Reconnection settings (only used by `MarketHandle`)
    pub reconnect: ReconnectConfig,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_URL.to_string(),
            keep_alive_interval: DEFAULT_KEEP_ALIVE_INTERVAL,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            origin: DEFAULT_ORIGIN.to_string(),
            reconnect: ReconnectConfig::disabled(),
        }
    }
}

impl StreamConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the stream host
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the keep-alive interval
    pub fn with_keep_alive_interval(mut self, interval: Duration) -> Self {
        self.keep_alive_interval = interval;
        self
    }

    /// Set connection timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the maximum frame size
    pub fn with_max_frame_size(mut self, bytes: usize) -> Self {
        self.max_frame_size = bytes;
        self
    }

    /// Set the `Origin` header
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Set reconnection config
    pub fn with_reconnect(mut self, config: ReconnectConfig) -> Self {
        self.reconnect = config;
        self
    }

    /// Check the settings before connecting
    pub fn validate(&self) -> LunoResult<()> {
        if !(self.base_url.starts_with("ws://") || self.base_url.starts_with("wss://")) {
            return Err(LunoError::Configuration(format!(
                "base URL must use ws:// or wss://, got {:?}",
                self.base_url
            )));
        }
        if self.keep_alive_interval.is_zero() {
            return Err(LunoError::Configuration(
                "keep-alive interval must be non-zero".to_string(),
            ));
        }
        if self.max_frame_size == 0 {
            return Err(LunoError::Configuration(
                "max frame size must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StreamConfig::default();
        assert_eq!(config.base_url, "wss://ws.luno.com");
        assert_eq!(config.keep_alive_interval, Duration::from_secs(60));
        assert_eq!(config.max_frame_size, 2 * 1024 * 1024);
        assert_eq!(config.origin, "http://localhost/");
        assert!(!config.reconnect.is_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = StreamConfig::new()
            .with_base_url("ws://127.0.0.1:9000")
            .with_timeout(Duration::from_secs(3))
            .with_keep_alive_interval(Duration::from_secs(5))
            .with_reconnect(ReconnectConfig::enabled());

        assert_eq!(config.base_url, "ws://127.0.0.1:9000");
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert_eq!(config.keep_alive_interval, Duration::from_secs(5));
        assert!(config.reconnect.is_enabled());
    }

    #[test]
    fn test_validate() {
        let bad_scheme = StreamConfig::new().with_base_url("https://ws.luno.com");
        assert!(matches!(bad_scheme.validate(), Err(LunoError::Configuration(_))));

        let no_keep_alive = StreamConfig::new().with_keep_alive_interval(Duration::ZERO);
        assert!(no_keep_alive.validate().is_err());
    }
}
