//! # Serial Communication Module
//!
//! Owns the serial link to the motor microcontroller.
//!
//! This module handles:
//! - Opening the port at 38,400 baud, 8N1
//! - Fire-and-forget frame writes bounded by a write timeout
//! - Best-effort draining of diagnostic bytes sent back by the board
//! - Idempotent close
//!
//! A frame that misses the write timeout is dropped, never retried: by the
//! next tick a newer command exists and the stale one must not reach the motors.
//!
//! The board finds frame boundaries from the flag byte alone, so a frame is
//! never left half on the wire. If the timeout hits after the port accepted
//! part of a frame, the remaining bytes go out ahead of the next frame.

pub mod port_trait;

use std::io;
use std::time::Duration;

use bytes::{Buf, Bytes, BytesMut};
use tokio::time::error::Elapsed;
use tokio::time::Instant;
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info, warn};

use crate::error::{MotorBridgeError, Result};
use port_trait::{SerialPortIO, TokioSerialPort};

/// Motor board baud rate
pub const DEFAULT_BAUD_RATE: u32 = 38_400;

/// Longest a single frame write may take
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_millis(100);

/// Upper bound on bytes drained by one `poll_inbound` call
pub const MAX_INBOUND_BYTES: usize = 4096;

/// Settings for one serial device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortConfig {
    /// Platform device name, e.g. `/dev/ttyUSB0` or `COM7`
    pub device: String,
    pub baud_rate: u32,
    pub write_timeout: Duration,
}

impl PortConfig {
    /// Config for `device` with the motor board defaults.
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }
}

impl From<&crate::config::SerialConfig> for PortConfig {
    fn from(config: &crate::config::SerialConfig) -> Self {
        Self {
            device: config.port.clone(),
            baud_rate: config.baud_rate,
            write_timeout: Duration::from_millis(config.write_timeout_ms),
        }
    }
}

/// Serial link to the motor board
///
/// The port handle lives in an `Option` so `close` can drop it exactly once.
pub struct SerialTransport<P = TokioSerialPort> {
    port: Option<P>,
    config: PortConfig,
    /// Tail of a frame the port only partly accepted
    unfinished: BytesMut,
}

impl<P> std::fmt::Debug for SerialTransport<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("config", &self.config)
            .field("open", &self.port.is_some())
            .field("unfinished", &self.unfinished.len())
            .finish()
    }
}

impl SerialTransport<TokioSerialPort> {
    /// Open the serial device named in `config`
    ///
    /// # Errors
    ///
    /// - `PortUnavailable`: the device does not exist or is already claimed
    /// - `PermissionDenied`: the OS refused access
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use motor_bridge::serial::{PortConfig, SerialTransport};
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let mut transport = SerialTransport::open(PortConfig::new("/dev/ttyUSB0"))?;
    ///     transport.send(&[251]).await?;
    ///     transport.close();
    ///     Ok(())
    /// }
    /// ```
    pub fn open(config: PortConfig) -> Result<Self> {
        debug!("Opening serial port {} at {} baud", config.device, config.baud_rate);

        let stream = tokio_serial::new(config.device.as_str(), config.baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .timeout(config.write_timeout)
            .open_native_async()
            .map_err(|e| classify_open_error(&config.device, e))?;

        info!("Opened serial port {} at {} baud", config.device, config.baud_rate);
        Ok(Self::with_port(config, TokioSerialPort::new(stream)))
    }
}

impl<P: SerialPortIO> SerialTransport<P> {
    /// Wraps an already-open port.
    pub fn with_port(config: PortConfig, port: P) -> Self {
        Self {
            port: Some(port),
            config,
            unfinished: BytesMut::new(),
        }
    }

    pub fn device(&self) -> &str {
        &self.config.device
    }

    pub fn config(&self) -> &PortConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.port.is_some()
    }

    /// Bytes of a cut-off frame still waiting to go out.
    pub fn unfinished_len(&self) -> usize {
        self.unfinished.len()
    }

    /// Send one frame
    ///
    /// Writes `bytes`, giving up after the configured write timeout. Nothing
    /// is queued or retried, except the tail of a frame the port had already
    /// started accepting: that tail is written first, within the same timeout.
    ///
    /// # Errors
    ///
    /// - `WriteTimeout`: the port did not accept the bytes in time. A frame that
    ///   was not started is dropped; a started one is finished by the next call
    /// - `Serial`: the write failed
    /// - `PortClosed`: `close` was already called
    pub async fn send(&mut self, bytes: &[u8]) -> Result<()> {
        let timeout = self.config.write_timeout;
        let deadline = Instant::now() + timeout;
        let port = self.port.as_mut().ok_or(MotorBridgeError::PortClosed)?;

        if !self.unfinished.is_empty() {
            let (written, outcome) = write_until(port, &self.unfinished, deadline).await;
            self.unfinished.advance(written);
            write_result(outcome, timeout)?;
            debug!("Finished cut-off frame");
        }

        let (written, outcome) = write_until(port, bytes, deadline).await;
        if written > 0 && written < bytes.len() {
            warn!(
                "Frame cut off after {} of {} bytes, the rest goes out before the next frame",
                written,
                bytes.len()
            );
            self.unfinished.extend_from_slice(&bytes[written..]);
        }
        write_result(outcome, timeout)?;

        debug!("Sent frame ({} bytes)", bytes.len());
        Ok(())
    }

    /// Drain whatever the board has sent back, without waiting for more.
    ///
    /// Returns an empty buffer when nothing is pending or the port is closed.
    /// At most [`MAX_INBOUND_BYTES`] are drained per call.
    pub async fn poll_inbound(&mut self) -> Result<Bytes> {
        let timeout = self.config.write_timeout;
        let Some(port) = self.port.as_mut() else {
            return Ok(Bytes::new());
        };

        let mut inbound = BytesMut::new();
        let mut chunk = [0u8; 256];

        while inbound.len() < MAX_INBOUND_BYTES {
            let pending = port
                .bytes_to_read()
                .map_err(|e| MotorBridgeError::Serial(format!("Failed to query input buffer: {}", e)))?;
            if pending == 0 {
                break;
            }

            let want = pending.min(chunk.len()).min(MAX_INBOUND_BYTES - inbound.len());
            let read = match tokio::time::timeout(timeout, port.read(&mut chunk[..want])).await {
                Ok(Ok(n)) => n,
                Ok(Err(e)) => {
                    return Err(MotorBridgeError::Serial(format!("Failed to read: {}", e)));
                }
                Err(_) => break,
            };
            if read == 0 {
                break;
            }
            inbound.extend_from_slice(&chunk[..read]);
        }

        Ok(inbound.freeze())
    }

    /// Close the port. Safe to call on an already-closed transport.
    pub fn close(&mut self) {
        self.unfinished.clear();
        if self.port.take().is_some() {
            info!("Closed serial port {}", self.config.device);
        }
    }
}

/// Writes `buf` until it is all out or `deadline` passes.
///
/// Returns how many bytes the port accepted, which is accurate even when the
/// deadline cancels a pending write.
async fn write_until<P: SerialPortIO>(
    port: &mut P,
    buf: &[u8],
    deadline: Instant,
) -> (usize, std::result::Result<io::Result<()>, Elapsed>) {
    let mut written = 0;
    let outcome = tokio::time::timeout_at(deadline, async {
        while written < buf.len() {
            let n = port.write(&buf[written..]).await?;
            if n == 0 {
                return Err(io::Error::from(io::ErrorKind::WriteZero));
            }
            written += n;
        }
        Ok(())
    })
    .await;

    (written, outcome)
}

fn write_result(outcome: std::result::Result<io::Result<()>, Elapsed>, timeout: Duration) -> Result<()> {
    match outcome {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(MotorBridgeError::Serial(format!("Failed to write frame: {}", e))),
        Err(_) => Err(MotorBridgeError::WriteTimeout(timeout.as_millis() as u64)),
    }
}

/// Sorts tokio-serial open failures into the two startup error kinds.
fn classify_open_error(device: &str, err: tokio_serial::Error) -> MotorBridgeError {
    let detail = format!("{}: {}", device, err);

    match err.kind() {
        tokio_serial::ErrorKind::Io(std::io::ErrorKind::PermissionDenied) => {
            MotorBridgeError::PermissionDenied(detail)
        }
        _ => {
            warn!("Serial port {} unavailable: {}", device, err);
            MotorBridgeError::PortUnavailable(detail)
        }
    }
}
