//! RS-232 transport over a local serial port.

use std::io::{Read, Write};
use std::time::Duration;

use crate::error::{map_io_error, Result, TransportError};
use crate::Transport;

/// Serial line parameters.
///
/// Default baud is 9600; 38400 is the only other permitted alternative for
/// this device family. Data framing (7 data bits, even parity, one stop
/// bit) is fixed by the PLC's programming port and is not configurable.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    pub path: String,
    pub baud_rate: u32,
    pub read_timeout: Duration,
}

impl SerialConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            baud_rate: 9600,
            read_timeout: crate::DEFAULT_READ_TIMEOUT,
        }
    }

    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }
}

/// A directly-attached serial link to the PLC's programming port.
///
/// The worker thread that owns a `SerialTransport` *is* the dedicated
/// thread this design calls for — reads block this thread and nothing else,
/// so there is no separate executor hand-off the way the original
/// implementation needed one to keep its cooperative event loop free.
pub struct SerialTransport {
    port: Box<dyn serialport::SerialPort>,
}

impl SerialTransport {
    pub fn open(config: &SerialConfig) -> Result<Self> {
        log::debug!(
            "opening serial port {} at {} baud",
            config.path,
            config.baud_rate
        );
        let port = serialport::new(&config.path, config.baud_rate)
            .data_bits(serialport::DataBits::Seven)
            .parity(serialport::Parity::Even)
            .stop_bits(serialport::StopBits::One)
            .timeout(config.read_timeout)
            .open()
            .map_err(|_| TransportError::ConnectionClosed)?;
        Ok(Self { port })
    }
}

impl Transport for SerialTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        // Discard stale bytes from a previous failed exchange before every
        // write — otherwise a half-read frame desyncs the next response.
        let _ = self.port.clear(serialport::ClearBuffer::All);
        self.port
            .write_all(bytes)
            .map_err(|e| map_io_error(&e))
    }

    fn read(&mut self, max_size: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; max_size];
        let n = self.port.read(&mut buf).map_err(|e| map_io_error(&e))?;
        if n == 0 {
            return Err(TransportError::ConnectionClosed);
        }
        buf.truncate(n);
        Ok(buf)
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
