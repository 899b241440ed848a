//! Connection configuration.

use std::time::Duration;

/// Delay before the first reconnect attempt.
pub const DEFAULT_RECONNECT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Reconnect attempts after which the connection gives up.
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// Interval at which an open connection sends `ping`.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Exponential backoff parameters.
///
/// Attempt `n` (1-based) waits `base_delay × 2^(n−1)`. No jitter and no cap
/// other than `max_attempts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectConfig {
    /// Delay of the first attempt.
    pub base_delay: Duration,
    /// Attempts before giving up.
    pub max_attempts: u32,
}

impl ReconnectConfig {
    /// Delay before reconnect attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let factor = 1u32.checked_shl(exponent).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self { base_delay: DEFAULT_RECONNECT_BASE_DELAY, max_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS }
    }
}

/// Connection configuration
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Backoff policy for unexpected closes.
    pub reconnect: ReconnectConfig,
    /// Heartbeat interval. `None` disables heartbeats.
    pub heartbeat_interval: Option<Duration>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self { reconnect: ReconnectConfig::default(), heartbeat_interval: Some(DEFAULT_HEARTBEAT_INTERVAL) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_doubles_from_one_second() {
        let config = ReconnectConfig::default();
        let delays: Vec<u128> = (1..=5).map(|n| config.delay_for(n).as_millis()).collect();

        assert_eq!(delays, vec![1000, 2000, 4000, 8000, 16000]);
    }

    #[test]
    fn huge_attempt_saturates() {
        let config = ReconnectConfig::default();
        assert!(config.delay_for(200) >= config.delay_for(31));
    }
}
