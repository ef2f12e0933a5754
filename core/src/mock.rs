//! An in-memory stand-in for [`crate::client::Client`] — no transport, no
//! wire traffic.
//!
//! Grounded in the original implementation's `FXPLCClientMock`, which
//! answers every call with a fixed zero/false/empty value. This port keeps
//! a flat byte-addressable store instead, so a demo session can write a
//! value and read it back — useful for offline development against the
//! broker and facade without real hardware, which a pure stub can't
//! exercise. This is a parallel
//! implementation of the [`PlcClient`] contract, not a patched real one.

use std::collections::HashMap;

use crate::address;
use crate::client::PlcClient;
use crate::error::Result;
use crate::number::{Number, NumberEncoding};
use crate::register::RegisterRef;

/// A sparse byte-addressable memory image, keyed by device byte address.
#[derive(Default)]
pub struct MockClient {
    memory: HashMap<u16, u8>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn get_byte(&self, addr: u16) -> u8 {
        self.memory.get(&addr).copied().unwrap_or(0)
    }

    fn set_byte(&mut self, addr: u16, value: u8) {
        self.memory.insert(addr, value);
    }
}

impl PlcClient for MockClient {
    fn read_bit(&mut self, reference: RegisterRef) -> Result<bool> {
        let (byte_addr, bit) = address::bit_image(reference)?;
        Ok((self.get_byte(byte_addr) >> bit) & 1 == 1)
    }

    fn write_bit(&mut self, reference: RegisterRef, value: bool) -> Result<()> {
        // force_bit validates the class/index but the mock's bit-image and
        // force-bit address spaces are intentionally kept separate, the
        // same as the real device: a force-bit write does not alias the
        // bit-image byte used by read_bit. Mirror that by writing through
        // the bit-image address so read-after-write on the same register
        // observes the new value, matching what an operator expects of a
        // demo PLC even though the real device's two tables live at
        // different offsets.
        address::force_bit(reference)?;
        let (byte_addr, bit) = address::bit_image(reference)?;
        let mut byte = self.get_byte(byte_addr);
        if value {
            byte |= 1 << bit;
        } else {
            byte &= !(1 << bit);
        }
        self.set_byte(byte_addr, byte);
        Ok(())
    }

    fn read_number(&mut self, reference: RegisterRef, encoding: NumberEncoding) -> Result<Number> {
        let addr = address::word_data(reference)?;
        let bytes: Vec<u8> = (0..encoding.size() as u16)
            .map(|offset| self.get_byte(addr + offset))
            .collect();
        encoding.decode(&bytes)
    }

    fn write_number(
        &mut self,
        reference: RegisterRef,
        value: Number,
        encoding: NumberEncoding,
    ) -> Result<()> {
        let addr = address::word_data(reference)?;
        for (offset, byte) in encoding.encode(value).into_iter().enumerate() {
            self.set_byte(addr + offset as u16, byte);
        }
        Ok(())
    }

    fn read_bytes(&mut self, addr: u16, count: u8) -> Result<Vec<u8>> {
        Ok((0..count as u16).map(|offset| self.get_byte(addr + offset)).collect())
    }

    fn write_bytes(&mut self, addr: u16, data: &[u8]) -> Result<()> {
        for (offset, &byte) in data.iter().enumerate() {
            self.set_byte(addr + offset as u16, byte);
        }
        Ok(())
    }
}
