//! Wire framing: `STX | cmd | payload_hex | ETX | checksum_hex`.
//!
//! Pure encode/decode, no I/O. [`crate::client::Client`] drives this module
//! against a [`fxplc_transport::Transport`]; this module never touches one.

use crate::error::ClientError;

const STX: u8 = 0x02;
const ETX: u8 = 0x03;
const ACK: u8 = 0x06;
const NAK: u8 = 0x15;

/// The four wire commands this gateway ever issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ByteRead,
    ByteWrite,
    ForceOn,
    ForceOff,
}

impl Command {
    fn code(self) -> u8 {
        match self {
            Self::ByteRead => 0,
            Self::ByteWrite => 1,
            Self::ForceOn => 7,
            Self::ForceOff => 8,
        }
    }

    /// The single ASCII digit this command is sent as: `'0' + code`.
    fn ascii(self) -> u8 {
        b'0' + self.code()
    }
}

/// Checksum of an outbound frame: the low byte of `sum(cmd_ascii byte,
/// payload_ascii_hex bytes, ETX)`, rendered as two uppercase hex digits.
///
/// Matches the original implementation's `calc_checksum(payload + ETX)`,
/// where `payload` is the ASCII command digit followed by the uppercase hex
/// encoding of the binary payload — i.e. every byte that appears on the
/// wire between STX and the checksum, summed as its raw (ASCII) byte value.
fn checksum(cmd_and_payload_ascii: &[u8]) -> [u8; 2] {
    let sum: u32 = cmd_and_payload_ascii
        .iter()
        .map(|&b| b as u32)
        .sum::<u32>()
        + ETX as u32;
    let low = (sum & 0xFF) as u8;
    let hex = format!("{low:02X}");
    [hex.as_bytes()[0], hex.as_bytes()[1]]
}

/// Encode an outbound frame for `cmd` with the given binary `payload`.
pub fn encode_frame(cmd: Command, payload: &[u8]) -> Vec<u8> {
    let payload_hex = hex_encode_upper(payload);

    let mut cmd_and_payload = Vec::with_capacity(1 + payload_hex.len());
    cmd_and_payload.push(cmd.ascii());
    cmd_and_payload.extend_from_slice(&payload_hex);
    let sum = checksum(&cmd_and_payload);

    let mut frame = Vec::with_capacity(1 + cmd_and_payload.len() + 1 + 2);
    frame.push(STX);
    frame.extend_from_slice(&cmd_and_payload);
    frame.push(ETX);
    frame.extend_from_slice(&sum);
    frame
}

/// Build the byte-read payload: big-endian address, then a u8 count.
pub fn byte_read_payload(addr: u16, count: u8) -> Vec<u8> {
    let mut payload = addr.to_be_bytes().to_vec();
    payload.push(count);
    payload
}

/// Build the byte-write payload: big-endian address, u8 count, then data.
pub fn byte_write_payload(addr: u16, data: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(3 + data.len());
    payload.extend_from_slice(&addr.to_be_bytes());
    payload.push(data.len() as u8);
    payload.extend_from_slice(data);
    payload
}

/// Build a force-on/force-off payload: little-endian coil address.
pub fn force_payload(addr: u16) -> Vec<u8> {
    addr.to_le_bytes().to_vec()
}

fn hex_encode_upper(bytes: &[u8]) -> Vec<u8> {
    const DIGITS: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = Vec::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(DIGITS[(b >> 4) as usize]);
        out.push(DIGITS[(b & 0x0F) as usize]);
    }
    out
}

fn hex_decode(bytes: &[u8]) -> Option<Vec<u8>> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    fn nibble(c: u8) -> Option<u8> {
        match c {
            b'0'..=b'9' => Some(c - b'0'),
            b'A'..=b'F' => Some(c - b'A' + 10),
            b'a'..=b'f' => Some(c - b'a' + 10),
            _ => None,
        }
    }
    let mut out = Vec::with_capacity(bytes.len() / 2);
    for pair in bytes.chunks(2) {
        let hi = nibble(pair[0])?;
        let lo = nibble(pair[1])?;
        out.push((hi << 4) | lo);
    }
    Some(out)
}

/// A byte source for response parsing: one byte at a time is enough for the
/// framing protocol and keeps this module decoupled from any transport.
pub trait ByteReader {
    fn read_byte(&mut self) -> Option<u8>;
}

/// Parse one response frame from `reader`.
///
/// - `ACK` → empty success payload.
/// - `NAK` → [`ClientError::NotSupportedCommand`].
/// - `STX` → read until `ETX`, then two checksum hex digits; verify and
///   hex-decode the data.
/// - anything else, including end-of-stream → [`ClientError::NoResponse`].
pub fn parse_response(reader: &mut impl ByteReader) -> Result<Vec<u8>, ClientError> {
    let code = reader.read_byte().ok_or(ClientError::NoResponse)?;
    match code {
        ACK => Ok(Vec::new()),
        NAK => Err(ClientError::NotSupportedCommand),
        STX => {
            let mut data = Vec::new();
            loop {
                let b = reader.read_byte().ok_or(ClientError::ResponseMalformed)?;
                if b == ETX {
                    break;
                }
                data.push(b);
            }
            let c0 = reader.read_byte().ok_or(ClientError::ResponseMalformed)?;
            let c1 = reader.read_byte().ok_or(ClientError::ResponseMalformed)?;
            let received = [c0, c1];
            if checksum(&data) != received {
                return Err(ClientError::ResponseMalformed);
            }
            hex_decode(&data).ok_or(ClientError::ResponseMalformed)
        }
        _ => Err(ClientError::NoResponse),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SliceReader<'a> {
        bytes: &'a [u8],
        pos: usize,
    }

    impl<'a> SliceReader<'a> {
        fn new(bytes: &'a [u8]) -> Self {
            Self { bytes, pos: 0 }
        }
    }

    impl ByteReader for SliceReader<'_> {
        fn read_byte(&mut self) -> Option<u8> {
            let b = self.bytes.get(self.pos).copied();
            self.pos += 1;
            b
        }
    }

    #[test]
    fn encodes_byte_read_request() {
        let payload = byte_read_payload(0x0102, 1);
        let frame = encode_frame(Command::ByteRead, &payload);
        assert_eq!(frame[0], STX);
        assert_eq!(frame[1], b'0');
        assert_eq!(&frame[2..8], b"010201");
        assert_eq!(frame[8], ETX);
        assert_eq!(frame.len(), 11);
    }

    #[test]
    fn frame_self_decodes_cmd_and_address() {
        let payload = byte_read_payload(0x10C8, 2);
        let frame = encode_frame(Command::ByteRead, &payload);
        // cmd digit right after STX, payload is the next 6 ASCII hex chars.
        assert_eq!(frame[1] - b'0', Command::ByteRead.code());
        let recovered_addr = u16::from_str_radix(
            std::str::from_utf8(&frame[2..6]).unwrap(),
            16,
        )
        .unwrap();
        let recovered_count = u8::from_str_radix(
            std::str::from_utf8(&frame[6..8]).unwrap(),
            16,
        )
        .unwrap();
        assert_eq!(recovered_addr, 0x10C8);
        assert_eq!(recovered_count, 2);
    }

    #[test]
    fn ack_parses_to_empty_payload() {
        let mut r = SliceReader::new(&[ACK]);
        assert_eq!(parse_response(&mut r).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn nak_is_not_supported_command() {
        let mut r = SliceReader::new(&[NAK]);
        assert!(matches!(
            parse_response(&mut r),
            Err(ClientError::NotSupportedCommand)
        ));
    }

    #[test]
    fn empty_stream_is_no_response() {
        let mut r = SliceReader::new(&[]);
        assert!(matches!(parse_response(&mut r), Err(ClientError::NoResponse)));
    }

    #[test]
    fn stx_frame_round_trips() {
        let data = vec![0xD0, 0x07];
        let data_hex = hex_encode_upper(&data);
        let sum = checksum(&data_hex);
        let mut bytes = vec![STX];
        bytes.extend_from_slice(&data_hex);
        bytes.push(ETX);
        bytes.extend_from_slice(&sum);

        let mut r = SliceReader::new(&bytes);
        assert_eq!(parse_response(&mut r).unwrap(), data);
    }

    #[test]
    fn bad_checksum_is_malformed() {
        let data_hex = hex_encode_upper(&[0xD0, 0x07]);
        let mut bytes = vec![STX];
        bytes.extend_from_slice(&data_hex);
        bytes.push(ETX);
        bytes.extend_from_slice(b"00"); // wrong checksum
        let mut r = SliceReader::new(&bytes);
        assert!(matches!(
            parse_response(&mut r),
            Err(ClientError::ResponseMalformed)
        ));
    }

    #[test]
    fn truncated_stream_mid_payload_is_malformed() {
        let mut r = SliceReader::new(&[STX, b'0', b'1']); // no ETX
        assert!(matches!(
            parse_response(&mut r),
            Err(ClientError::ResponseMalformed)
        ));
    }

    #[test]
    fn unknown_leading_byte_is_no_response() {
        let mut r = SliceReader::new(&[0xFF]);
        assert!(matches!(parse_response(&mut r), Err(ClientError::NoResponse)));
    }
}
