//! Numeric encodings used by `D`/`T`/`C` word-data reads and writes.

use crate::error::ClientError;

/// A decoded or to-be-encoded numeric value, widened to a common shape so
/// the broker and facade don't need to be generic over every wire width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Signed(i64),
    Unsigned(u64),
    Float(f32),
}

/// The closed set of on-wire numeric layouts, all little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum NumberEncoding {
    WordSigned,
    WordUnsigned,
    DoubleWordSigned,
    DoubleWordUnsigned,
    Float,
}

impl Default for NumberEncoding {
    fn default() -> Self {
        Self::WordSigned
    }
}

impl NumberEncoding {
    /// Byte width on the wire.
    pub fn size(self) -> usize {
        match self {
            Self::WordSigned | Self::WordUnsigned => 2,
            Self::DoubleWordSigned | Self::DoubleWordUnsigned | Self::Float => 4,
        }
    }

    /// Decode exactly `self.size()` little-endian bytes.
    ///
    /// `bytes.len()` must equal `self.size()`; callers (the client) already
    /// check the response length and fail with `ResponseMalformed` before
    /// reaching here, so this is an internal invariant, not a user-facing
    /// validation.
    pub fn decode(self, bytes: &[u8]) -> Result<Number, ClientError> {
        if bytes.len() != self.size() {
            return Err(ClientError::ResponseMalformed);
        }
        Ok(match self {
            Self::WordSigned => Number::Signed(i16::from_le_bytes([bytes[0], bytes[1]]) as i64),
            Self::WordUnsigned => Number::Unsigned(u16::from_le_bytes([bytes[0], bytes[1]]) as u64),
            Self::DoubleWordSigned => Number::Signed(i32::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3],
            ]) as i64),
            Self::DoubleWordUnsigned => Number::Unsigned(u32::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3],
            ]) as u64),
            Self::Float => Number::Float(f32::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3],
            ])),
        })
    }

    /// Encode `value` as `self.size()` little-endian bytes.
    pub fn encode(self, value: Number) -> Vec<u8> {
        match self {
            Self::WordSigned => (value.as_i64() as i16).to_le_bytes().to_vec(),
            Self::WordUnsigned => (value.as_i64() as u16).to_le_bytes().to_vec(),
            Self::DoubleWordSigned => (value.as_i64() as i32).to_le_bytes().to_vec(),
            Self::DoubleWordUnsigned => (value.as_i64() as u32).to_le_bytes().to_vec(),
            Self::Float => value.as_f32().to_le_bytes().to_vec(),
        }
    }
}

impl Number {
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Signed(v) => v,
            Self::Unsigned(v) => v as i64,
            Self::Float(v) => v as i64,
        }
    }

    pub fn as_f32(self) -> f32 {
        match self {
            Self::Signed(v) => v as f32,
            Self::Unsigned(v) => v as f32,
            Self::Float(v) => v,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_signed_round_trip_decodes_positive_value() {
        // D100 payload {0xD0, 0x07} decodes to 2000.
        let n = NumberEncoding::WordSigned.decode(&[0xD0, 0x07]).unwrap();
        assert_eq!(n.as_i64(), 2000);
    }

    #[test]
    fn word_signed_encode_negative_value() {
        // -1 encodes to {0xFF, 0xFF}.
        let bytes = NumberEncoding::WordSigned.encode(Number::Signed(-1));
        assert_eq!(bytes, vec![0xFF, 0xFF]);
    }

    #[test]
    fn double_word_unsigned_round_trip() {
        let bytes = NumberEncoding::DoubleWordUnsigned.encode(Number::Unsigned(0xDEADBEEF));
        let n = NumberEncoding::DoubleWordUnsigned.decode(&bytes).unwrap();
        assert_eq!(n.as_i64() as u32, 0xDEADBEEF);
    }

    #[test]
    fn float_round_trip() {
        let bytes = NumberEncoding::Float.encode(Number::Float(3.5));
        let n = NumberEncoding::Float.decode(&bytes).unwrap();
        assert_eq!(n.as_f32(), 3.5);
    }

    #[test]
    fn wrong_length_is_malformed() {
        assert!(NumberEncoding::WordSigned.decode(&[0x01]).is_err());
    }
}
