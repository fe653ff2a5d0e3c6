//! Transport Configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for connection management
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Maximum reconnection attempts after an unexpected close
    /// (0 = never reconnect)
    pub max_reconnect_attempts: u32,

    /// Base delay between reconnection attempts in milliseconds
    ///
    /// The actual delay grows linearly: `attempt * base_delay`.
    pub reconnect_base_delay_ms: u64,

    /// Capacity of the frame and command channels
    pub channel_capacity: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_reconnect_attempts: 5,
            reconnect_base_delay_ms: 1000,
            channel_capacity: 100,
        }
    }
}

impl TransportConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `THREADLINE_RECONNECT_ATTEMPTS`: maximum reconnection attempts
    /// - `THREADLINE_RECONNECT_DELAY`: base delay in ms
    /// - `THREADLINE_CHANNEL_CAPACITY`: channel capacity
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_reconnect_attempts: std::env::var("THREADLINE_RECONNECT_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_reconnect_attempts),
            reconnect_base_delay_ms: std::env::var("THREADLINE_RECONNECT_DELAY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.reconnect_base_delay_ms),
            channel_capacity: std::env::var("THREADLINE_CHANNEL_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.channel_capacity),
        }
    }

    /// Delay before the given reconnection attempt (1-based)
    #[must_use]
    pub fn reconnect_delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.reconnect_base_delay_ms.saturating_mul(u64::from(attempt)))
    }
}
