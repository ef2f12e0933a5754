//! Translation from symbolic [`RegisterRef`]s to device memory addresses.
//!
//! Three independent tables, one per address space a wire operation can
//! target: the bit-image (byte-addressable shadow used for bit reads), the
//! force-bit table (used for single-bit writes), and the word-data table
//! (used for numeric reads/writes on `T`/`C`/`D`).

use crate::error::ClientError;
use crate::register::{RegisterClass, RegisterRef};

/// `(base, divisor)` for one class in the bit-image table.
fn bit_image_entry(class: RegisterClass) -> Option<(u16, u32)> {
    use RegisterClass::*;
    match class {
        State => Some((0x0000, 8)),
        Input => Some((0x0080, 10)),
        Output => Some((0x00A0, 10)),
        Timer => Some((0x00C0, 8)),
        Memory => Some((0x0100, 8)),
        Data => Some((0x1000, 8)),
        Counter => None,
    }
}

/// `(base, divisor)` for one class in the force-bit table.
fn force_bit_entry(class: RegisterClass) -> Option<(u16, u32)> {
    use RegisterClass::*;
    match class {
        State => Some((0x0000, 8)),
        Input => Some((0x0400, 10)),
        Output => Some((0x0500, 10)),
        Timer => Some((0x0600, 8)),
        Memory => Some((0x0800, 8)),
        Data | Counter => None,
    }
}

/// Base address for one class in the word-data table.
fn word_data_base(class: RegisterClass) -> Option<u16> {
    use RegisterClass::*;
    match class {
        Timer => Some(0x0800),
        Counter => Some(0x0A00),
        Data => Some(0x1000),
        State | Input | Output | Memory => None,
    }
}

/// `(byte_addr, bit)` for a bit read via the bit-image shadow.
///
/// `InvalidRegister` if `ref.class` has no bit-image entry, or if the
/// resulting bit index would be `>= 8` (an index too large for its class's
/// divisor to keep inside a single byte).
pub fn bit_image(reference: RegisterRef) -> Result<(u16, u8), ClientError> {
    let (base, divisor) = bit_image_entry(reference.class).ok_or(ClientError::InvalidRegister)?;
    let offset =
        u16::try_from(reference.index / divisor).map_err(|_| ClientError::InvalidRegister)?;
    let byte = base.checked_add(offset).ok_or(ClientError::InvalidRegister)?;
    let bit = reference.index % divisor;
    if bit >= 8 {
        return Err(ClientError::InvalidRegister);
    }
    Ok((byte, bit as u8))
}

/// The force-on/force-off coil address for a single-bit write.
///
/// `InvalidRegister` for `D` and `C`, which have no force-bit mapping.
pub fn force_bit(reference: RegisterRef) -> Result<u16, ClientError> {
    let (base, divisor) = force_bit_entry(reference.class).ok_or(ClientError::InvalidRegister)?;
    let word = (reference.index / divisor) * 8 + reference.index % divisor;
    u16::try_from(base as u32 + word).map_err(|_| ClientError::InvalidRegister)
}

/// The byte address of a word-data register for a numeric read/write.
///
/// `InvalidRegister` for any class outside `{T, C, D}`.
pub fn word_data(reference: RegisterRef) -> Result<u16, ClientError> {
    let base = word_data_base(reference.class).ok_or(ClientError::InvalidRegister)?;
    let offset = reference
        .index
        .checked_mul(2)
        .and_then(|v| u16::try_from(v).ok())
        .ok_or(ClientError::InvalidRegister)?;
    base.checked_add(offset).ok_or(ClientError::InvalidRegister)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register::RegisterClass::*;

    #[test]
    fn bit_image_matches_table() {
        assert_eq!(bit_image(RegisterRef::new(Memory, 17)).unwrap(), (0x0102, 1));
        assert_eq!(bit_image(RegisterRef::new(Input, 10)).unwrap(), (0x0081, 0));
    }

    #[test]
    fn bit_image_rejects_counter() {
        assert!(bit_image(RegisterRef::new(Counter, 0)).is_err());
    }

    #[test]
    fn bit_image_rejects_index_whose_byte_offset_overflows_u16() {
        // 17_000_000 / 8 = 2_125_000, which does not fit in a u16 — this
        // must be rejected outright, not silently truncated to a bogus
        // in-range byte address.
        assert!(bit_image(RegisterRef::new(Memory, 17_000_000)).is_err());
    }

    #[test]
    fn force_bit_address_for_output_register() {
        // Y12 -> 0x0500 + (12/10)*8 + 12%10 = 0x050A
        assert_eq!(force_bit(RegisterRef::new(Output, 12)).unwrap(), 0x050A);
    }

    #[test]
    fn force_bit_rejects_data_and_counter() {
        assert!(force_bit(RegisterRef::new(Data, 0)).is_err());
        assert!(force_bit(RegisterRef::new(Counter, 0)).is_err());
    }

    #[test]
    fn word_data_address_for_data_register() {
        // D100 -> 0x1000 + 200 = 0x10C8
        assert_eq!(word_data(RegisterRef::new(Data, 100)).unwrap(), 0x10C8);
    }

    #[test]
    fn word_data_rejects_bit_only_classes() {
        assert!(word_data(RegisterRef::new(Memory, 0)).is_err());
        assert!(word_data(RegisterRef::new(Input, 0)).is_err());
    }

    #[test]
    fn word_data_rejects_index_whose_doubled_offset_overflows() {
        // index * 2 overflows u32 for index >= 2^31; must reject rather
        // than panic or wrap.
        assert!(word_data(RegisterRef::new(Data, u32::MAX / 2 + 1)).is_err());
        // A merely large-but-in-range-for-u32 index whose *doubled* byte
        // offset still can't fit in a u16 must also be rejected.
        assert!(word_data(RegisterRef::new(Data, 40_000)).is_err());
    }
}
