//! Reconnection policy with exponential backoff
//!
//! Every reconnect opens a new stream, so the book is rebuilt from the fresh
//! snapshot the server sends after authentication.

use std::time::Duration;

/// Backoff settings for [`MarketHandle`](crate::MarketHandle)
///
/// The default policy never reconnects; use [`ReconnectConfig::enabled`] to
/// opt in.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts
    pub max_delay: Duration,
    /// Factor applied to the delay after each failed attempt
    pub multiplier: f64,
    /// Random jitter factor (0.0 to 1.0)
    pub jitter: f64,
    /// Maximum number of consecutive attempts (None = unlimited)
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self::disabled()
    }
}

impl ReconnectConfig {
    /// Never reconnect
    pub fn disabled() -> Self {
        Self {
            max_attempts: Some(0),
            ..Self::enabled()
        }
    }

    /// Reconnect forever, 1s doubling up to 60s with 20% jitter
    pub fn enabled() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            multiplier: 2.0,
            jitter: 0.2,
            max_attempts: None,
        }
    }

    /// Set initial delay
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set maximum delay
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set backoff multiplier
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier.max(1.0);
        self
    }

    /// Set jitter factor
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.clamp(0.0, 1.0);
        self
    }

    /// Set maximum attempts
    pub fn with_max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = Some(max);
        self
    }

    /// Returns true if any reconnection will be attempted
    pub fn is_enabled(&self) -> bool {
        self.max_attempts != Some(0)
    }

    /// Delay before attempt `attempt` (1-indexed), without jitter
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let delay_ms = self.initial_delay.as_millis() as f64 * self.multiplier.powi(exponent);

        if !delay_ms.is_finite() || delay_ms >= self.max_delay.as_millis() as f64 {
            return self.max_delay;
        }
        Duration::from_millis(delay_ms as u64)
    }

    /// Delay before attempt `attempt` with jitter applied
    pub fn delay_with_jitter(&self, attempt: u32) -> Duration {
        let base = self.delay_for_attempt(attempt);
        if self.jitter == 0.0 {
            return base;
        }

        let range = base.as_millis() as f64 * self.jitter;
        let offset = rand::random::<f64>() * 2.0 * range - range;
        Duration::from_millis((base.as_millis() as f64 + offset).max(0.0) as u64)
    }

    /// Returns true if attempt `attempt` (1-indexed) is allowed
    pub fn should_reconnect(&self, attempt: u32) -> bool {
        match self.max_attempts {
            Some(max) => attempt <= max,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_disabled() {
        let config = ReconnectConfig::default();
        assert!(!config.is_enabled());
        assert!(!config.should_reconnect(1));
    }

    #[test]
    fn test_delay_calculation() {
        let config = ReconnectConfig::enabled()
            .with_initial_delay(Duration::from_millis(100))
            .with_multiplier(2.0)
            .with_max_delay(Duration::from_secs(10))
            .with_jitter(0.0);

        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(200));
        assert_eq!(config.delay_for_attempt(3), Duration::from_millis(400));
        assert_eq!(config.delay_with_jitter(4), Duration::from_millis(800));
        assert_eq!(config.delay_for_attempt(10), Duration::from_secs(10));
        assert_eq!(config.delay_for_attempt(u32::MAX), Duration::from_secs(10));
    }

    #[test]
    fn test_jitter_bounds() {
        let config = ReconnectConfig::enabled()
            .with_initial_delay(Duration::from_millis(1000))
            .with_jitter(0.5);

        for _ in 0..100 {
            let delay = config.delay_with_jitter(1);
            assert!(delay >= Duration::from_millis(500));
            assert!(delay <= Duration::from_millis(1500));
        }
    }

    #[test]
    fn test_should_reconnect() {
        let unlimited = ReconnectConfig::enabled();
        assert!(unlimited.is_enabled());
        assert!(unlimited.should_reconnect(1));
        assert!(unlimited.should_reconnect(1000));

        let limited = ReconnectConfig::enabled().with_max_attempts(3);
        assert!(limited.should_reconnect(1));
        assert!(limited.should_reconnect(3));
        assert!(!limited.should_reconnect(4));
    }
}
