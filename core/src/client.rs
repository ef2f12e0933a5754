//! Typed PLC operations: read/write bit, read/write number, raw bytes.

use std::sync::Mutex;

use fxplc_transport::Transport;

use crate::address;
use crate::error::{ClientError, Result};
use crate::frame::{self, ByteReader, Command};
use crate::number::{Number, NumberEncoding};
use crate::register::RegisterRef;

/// The client operation surface, implemented by the real wire [`Client`]
/// and by [`crate::mock::MockClient`] as an independent in-memory
/// implementation — not a runtime-patched variant of the real one.
pub trait PlcClient: Send {
    fn read_bit(&mut self, reference: RegisterRef) -> Result<bool>;
    fn write_bit(&mut self, reference: RegisterRef, value: bool) -> Result<()>;
    fn read_number(&mut self, reference: RegisterRef, encoding: NumberEncoding) -> Result<Number>;
    fn write_number(
        &mut self,
        reference: RegisterRef,
        value: Number,
        encoding: NumberEncoding,
    ) -> Result<()>;
    fn read_bytes(&mut self, addr: u16, count: u8) -> Result<Vec<u8>>;
    fn write_bytes(&mut self, addr: u16, data: &[u8]) -> Result<()>;

    /// Relinquish the underlying transport, if this implementation owns a
    /// real one. Used by the broker's aux-tunnel handoff; the mock client
    /// has no transport to give up.
    fn into_transport(self: Box<Self>) -> Option<Box<dyn Transport>> {
        None
    }
}

struct VecByteReader<'a> {
    transport: &'a mut dyn Transport,
}

impl ByteReader for VecByteReader<'_> {
    fn read_byte(&mut self) -> Option<u8> {
        self.transport.read(1).ok().and_then(|b| b.first().copied())
    }
}

/// A client bound to a live [`Transport`].
///
/// All wire exchanges are serialized by an internal mutex, held from the
/// moment a frame is sent until its response has been fully parsed — a
/// failure mid-exchange leaves the transport's framing undefined, so the
/// broker discards a `Client` after any such failure rather than reusing it.
pub struct Client {
    transport: Mutex<Box<dyn Transport>>,
}

impl Client {
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self {
            transport: Mutex::new(transport),
        }
    }

    fn exchange(&mut self, cmd: Command, payload: &[u8]) -> Result<Vec<u8>> {
        let frame = frame::encode_frame(cmd, payload);
        let mut guard = self.transport.lock().expect("client transport mutex poisoned");
        guard.write(&frame)?;
        let mut reader = VecByteReader {
            transport: guard.as_mut(),
        };
        frame::parse_response(&mut reader)
    }
}

impl PlcClient for Client {
    fn read_bit(&mut self, reference: RegisterRef) -> Result<bool> {
        let (byte_addr, bit) = address::bit_image(reference)?;
        let resp = self.exchange(Command::ByteRead, &frame::byte_read_payload(byte_addr, 1))?;
        if resp.len() != 1 {
            return Err(ClientError::ResponseMalformed);
        }
        Ok((resp[0] >> bit) & 1 == 1)
    }

    fn write_bit(&mut self, reference: RegisterRef, value: bool) -> Result<()> {
        let coil_addr = address::force_bit(reference)?;
        let cmd = if value { Command::ForceOn } else { Command::ForceOff };
        self.exchange(cmd, &frame::force_payload(coil_addr))?;
        Ok(())
    }

    fn read_number(&mut self, reference: RegisterRef, encoding: NumberEncoding) -> Result<Number> {
        let addr = address::word_data(reference)?;
        let size = encoding.size() as u8;
        let resp = self.exchange(Command::ByteRead, &frame::byte_read_payload(addr, size))?;
        encoding.decode(&resp)
    }

    fn write_number(
        &mut self,
        reference: RegisterRef,
        value: Number,
        encoding: NumberEncoding,
    ) -> Result<()> {
        let addr = address::word_data(reference)?;
        let bytes = encoding.encode(value);
        self.write_bytes(addr, &bytes)
    }

    fn read_bytes(&mut self, addr: u16, count: u8) -> Result<Vec<u8>> {
        self.exchange(Command::ByteRead, &frame::byte_read_payload(addr, count))
    }

    fn write_bytes(&mut self, addr: u16, data: &[u8]) -> Result<()> {
        self.exchange(Command::ByteWrite, &frame::byte_write_payload(addr, data))?;
        Ok(())
    }

    fn into_transport(self: Box<Self>) -> Option<Box<dyn Transport>> {
        Some(
            self.transport
                .into_inner()
                .expect("client transport mutex poisoned"),
        )
    }
}
