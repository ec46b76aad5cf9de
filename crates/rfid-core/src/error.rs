//! Error types for the RFID antenna server

use thiserror::Error;

/// Result type for RFID server operations
pub type Result<T> = std::result::Result<T, RfidError>;

/// RFID server error types
#[derive(Debug, Error)]
pub enum RfidError {
    /// Socket read/write failure or abrupt disconnect
    #[error("Transport error: {0}")]
    Transport(String),

    /// The reader rejected or failed a request
    #[error("Device error: {0}")]
    Device(String),

    /// The reader never acknowledged a parameter write
    #[error("Device timeout: no acknowledgement after {attempts} attempts")]
    DeviceTimeout { attempts: u32 },

    /// No reader was found during enumeration
    #[error("No RFID reader found")]
    NoReader,

    /// Malformed data on the wire
    #[error("Protocol error: {0}")]
    ProtocolError(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<std::io::Error> for RfidError {
    fn from(err: std::io::Error) -> Self {
        RfidError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_maps_to_transport() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: RfidError = io.into();
        assert!(matches!(err, RfidError::Transport(ref msg) if msg.contains("pipe closed")));
    }

    #[test]
    fn test_timeout_message() {
        let err = RfidError::DeviceTimeout { attempts: 100 };
        assert_eq!(
            err.to_string(),
            "Device timeout: no acknowledgement after 100 attempts"
        );
    }
}
