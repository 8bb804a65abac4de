//! # Error Types
//!
//! Custom error types for Motor Bridge using `thiserror`.

use thiserror::Error;

/// Main error type for Motor Bridge
#[derive(Debug, Error)]
pub enum MotorBridgeError {
    /// No game controller was found at startup
    #[error("No game controller found")]
    DeviceNotFound,

    /// The controller went away mid-session
    #[error("Controller disconnected: {0}")]
    DeviceDisconnected(String),

    /// The controller exposes fewer inputs than the motor frame needs
    #[error(
        "Unsupported controller: {axes} axes / {buttons} buttons \
         (need at least {required_axes} axes / {required_buttons} buttons)"
    )]
    UnsupportedDevice {
        axes: usize,
        buttons: usize,
        required_axes: usize,
        required_buttons: usize,
    },

    /// Serial device missing or already claimed by another process
    #[error("Serial port unavailable: {0}")]
    PortUnavailable(String),

    /// The OS refused access to the serial device
    #[error("Permission denied opening serial port: {0}")]
    PermissionDenied(String),

    /// A frame could not be written within the configured timeout
    #[error("Serial write timed out after {0} ms")]
    WriteTimeout(u64),

    /// The transport was already closed
    #[error("Serial port is closed")]
    PortClosed,

    /// Controller I/O errors
    #[error("Controller error: {0}")]
    Controller(String),

    /// Serial I/O errors
    #[error("Serial error: {0}")]
    Serial(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Frame log serialization errors
    #[error("Telemetry error: {0}")]
    Telemetry(#[from] serde_json::Error),
}

/// Result type alias for Motor Bridge
pub type Result<T> = std::result::Result<T, MotorBridgeError>;
