//! TCP transport for a serial-to-TCP bridge.

use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::error::{map_io_error, Result, TransportError};
use crate::Transport;

/// TCP bridge parameters.
#[derive(Debug, Clone)]
pub struct TcpConfig {
    pub host: String,
    pub port: u16,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    /// Delay after connect before draining any banner bytes the bridge emits.
    pub flush_delay: Duration,
}

impl TcpConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            connect_timeout: crate::DEFAULT_READ_TIMEOUT,
            read_timeout: crate::DEFAULT_READ_TIMEOUT,
            flush_delay: Duration::from_secs(1),
        }
    }
}

/// A serial-to-TCP bridge link.
///
/// Some bridges emit a banner line right after accepting the connection;
/// `connect` sleeps `flush_delay` and drains whatever arrived before
/// handing the stream to callers, so the first real frame isn't corrupted
/// by leftover banner bytes.
pub struct TcpTransport {
    stream: Option<TcpStream>,
}

impl TcpTransport {
    /// Open and prime the connection (connect, sleep, drain banner bytes).
    pub fn connect(config: &TcpConfig) -> Result<Self> {
        let addr: SocketAddr = (config.host.as_str(), config.port)
            .to_socket_addrs()
            .map_err(|_| TransportError::ConnectionClosed)?
            .next()
            .ok_or(TransportError::ConnectionClosed)?;

        log::debug!("connecting to tcp:{}:{}", config.host, config.port);
        let stream = TcpStream::connect_timeout(&addr, config.connect_timeout)
            .map_err(|_| TransportError::ConnectionClosed)?;
        stream
            .set_read_timeout(Some(config.read_timeout))
            .map_err(|e| map_io_error(&e))?;

        std::thread::sleep(config.flush_delay);

        // Drain any banner bytes the bridge sent while we slept.
        stream
            .set_nonblocking(true)
            .map_err(|e| map_io_error(&e))?;
        let mut scratch = [0u8; 1024];
        let mut s = &stream;
        loop {
            match s.read(&mut scratch) {
                Ok(0) => break,
                Ok(_) => continue,
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(_) => break,
            }
        }
        stream
            .set_nonblocking(false)
            .map_err(|e| map_io_error(&e))?;
        stream
            .set_read_timeout(Some(config.read_timeout))
            .map_err(|e| map_io_error(&e))?;

        log::debug!("tcp:{}:{} connected", config.host, config.port);
        Ok(Self {
            stream: Some(stream),
        })
    }
}

impl Transport for TcpTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;
        stream.write_all(bytes).map_err(|e| map_io_error(&e))
    }

    fn read(&mut self, max_size: usize) -> Result<Vec<u8>> {
        let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;
        let mut buf = vec![0u8; max_size];
        let n = stream.read(&mut buf).map_err(|e| map_io_error(&e))?;
        if n == 0 {
            return Err(TransportError::ConnectionClosed);
        }
        buf.truncate(n);
        Ok(buf)
    }

    fn close(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(std::net::Shutdown::Both);
        }
        Ok(())
    }
}
