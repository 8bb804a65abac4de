//! Trait abstraction for serial port operations to enable testing

use async_trait::async_trait;
use std::io;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::SerialPort;

/// Trait for serial port I/O operations
///
/// There is no flush: a completed `write` means the kernel has the bytes, and
/// draining the UART (`tcdrain`) would block the runtime thread.
#[async_trait]
pub trait SerialPortIO: Send {
    /// Write some of `data`, returning how many bytes the port accepted.
    ///
    /// Cancelling a pending call must leave no bytes written.
    async fn write(&mut self, data: &[u8]) -> io::Result<usize>;

    /// Number of received bytes waiting to be read
    fn bytes_to_read(&self) -> io::Result<usize>;

    /// Read up to `buf.len()` bytes
    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Wrapper around tokio_serial::SerialStream that implements SerialPortIO
pub struct TokioSerialPort {
    port: tokio_serial::SerialStream,
}

impl TokioSerialPort {
    pub fn new(port: tokio_serial::SerialStream) -> Self {
        Self { port }
    }
}

#[async_trait]
impl SerialPortIO for TokioSerialPort {
    async fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        AsyncWriteExt::write(&mut self.port, data).await
    }

    fn bytes_to_read(&self) -> io::Result<usize> {
        let pending = SerialPort::bytes_to_read(&self.port)?;
        Ok(pending as usize)
    }

    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        AsyncReadExt::read(&mut self.port, buf).await
    }
}
