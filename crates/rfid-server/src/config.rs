//! Server configuration

use rfid_core::Framing;
use std::time::Duration;

/// TCP port the controller connects to
pub const DEFAULT_PORT: u16 = 6666;

/// Configuration for the antenna server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address (default: 0.0.0.0:6666)
    pub bind_addr: String,
    /// Reply framing (default: raw, no delimiter)
    pub framing: Framing,
    /// Response fetches before a parameter write counts as unacknowledged
    pub ack_attempts: u32,
    /// Pause between response fetches
    pub retry_interval: Duration,
    /// Optional cap on response fetches during one tag poll
    pub max_poll_attempts: Option<u32>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: format!("0.0.0.0:{}", DEFAULT_PORT),
            framing: Framing::Raw,
            ack_attempts: 100,
            retry_interval: Duration::from_millis(50),
            max_poll_attempts: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr, "0.0.0.0:6666");
        assert_eq!(config.framing, Framing::Raw);
        assert_eq!(config.ack_attempts, 100);
        assert_eq!(config.retry_interval, Duration::from_millis(50));
        assert_eq!(config.max_poll_attempts, None);
    }
}
