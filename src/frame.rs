use thiserror::Error;

/// Magic word opening every request and response (also the device UDP port).
pub const MAGIC: u16 = 0xC0DE;

/// Encoded request length: magic + addr + reserved + value + crc.
pub const REQUEST_LEN: usize = 12;

/// Minimum reply length: magic + addr + reserved + value.
pub const RESPONSE_MIN_LEN: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("reply too short: {0} bytes, need {RESPONSE_MIN_LEN}")]
    TooShort(usize),
    #[error("bad magic 0x{0:04X}, expected 0x{MAGIC:04X}")]
    BadMagic(u16),
}

/// CRC-16/CCITT-FALSE: init 0xFFFF, poly 0x1021, no reflection.
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &b in data {
        crc ^= (b as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// Build a 12-byte register request. Reads pass `value = 0`.
///
/// The CRC covers only the 6-byte header (magic, addr, reserved); the value
/// field is excluded. The device firmware checksums the same span, so this
/// must not change.
pub fn encode_request(addr: u16, value: u32) -> [u8; REQUEST_LEN] {
    let mut pkt = [0u8; REQUEST_LEN];
    pkt[0..2].copy_from_slice(&MAGIC.to_be_bytes());
    pkt[2..4].copy_from_slice(&addr.to_be_bytes());
    // pkt[4..6] reserved, zero
    pkt[6..10].copy_from_slice(&value.to_be_bytes());
    let crc = crc16(&pkt[..6]);
    pkt[10..12].copy_from_slice(&crc.to_be_bytes());
    pkt
}

/// Pull the 32-bit register value out of a reply datagram.
///
/// Replies carry no CRC, and the echoed address field is not checked —
/// that is how the firmware behaves on the wire, not a gap to close here.
/// Trailing bytes beyond the first 8 are ignored.
pub fn decode_response(data: &[u8]) -> Result<u32, DecodeError> {
    if data.len() < RESPONSE_MIN_LEN {
        return Err(DecodeError::TooShort(data.len()));
    }
    let magic = u16::from_be_bytes([data[0], data[1]]);
    if magic != MAGIC {
        return Err(DecodeError::BadMagic(magic));
    }
    Ok(u32::from_be_bytes([data[4], data[5], data[6], data[7]]))
}

/// Reply as the firmware sends it: magic, echoed addr, value. Used by the
/// in-process fake device in client tests.
#[cfg(test)]
pub fn encode_reply(addr: u16, value: u32) -> [u8; RESPONSE_MIN_LEN] {
    let mut pkt = [0u8; RESPONSE_MIN_LEN];
    pkt[0..2].copy_from_slice(&MAGIC.to_be_bytes());
    pkt[2..4].copy_from_slice(&addr.to_be_bytes());
    pkt[4..8].copy_from_slice(&value.to_be_bytes());
    pkt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::REGISTERS;

    #[test]
    fn crc16_check_value() {
        // CRC-16/CCITT-FALSE check string
        assert_eq!(crc16(b"123456789"), 0x29B1);
        assert_eq!(crc16(b"123456789"), crc16(b"123456789"));
    }

    #[test]
    fn crc16_detects_single_bit_flips() {
        let base = [0xC0, 0xDE, 0x00, 0x01, 0x00, 0x00];
        let crc = crc16(&base);
        for byte in 0..base.len() {
            for bit in 0..8 {
                let mut m = base;
                m[byte] ^= 1 << bit;
                assert_ne!(crc16(&m), crc, "flip of byte {byte} bit {bit} undetected");
            }
        }
    }

    #[test]
    fn request_layout() {
        let pkt = encode_request(0x0003, 0xAABB_CCDD);
        assert_eq!(&pkt[0..2], &[0xC0, 0xDE]);
        assert_eq!(&pkt[2..4], &[0x00, 0x03]);
        assert_eq!(&pkt[4..6], &[0x00, 0x00]);
        assert_eq!(&pkt[6..10], &[0xAA, 0xBB, 0xCC, 0xDD]);
        assert_eq!(u16::from_be_bytes([pkt[10], pkt[11]]), crc16(&pkt[..6]));
    }

    #[test]
    fn reply_roundtrip_all_catalog_addrs() {
        for reg in &REGISTERS {
            for value in [0u32, 1, 0x1234_5678, 0xFFFF_FFFF] {
                let pkt = encode_request(reg.addr, value);
                assert_eq!(pkt.len(), REQUEST_LEN);
                let crc = u16::from_be_bytes([pkt[10], pkt[11]]);
                assert_eq!(crc, crc16(&pkt[..6]), "crc must cover header only");
                assert_eq!(decode_response(&encode_reply(reg.addr, value)), Ok(value));
            }
        }
    }

    #[test]
    fn crc_ignores_value_field() {
        // wire-compat: two requests differing only in value share a CRC
        let a = encode_request(1, 0);
        let b = encode_request(1, 0xDEAD_BEEF);
        assert_eq!(a[10..12], b[10..12]);
    }

    #[test]
    fn decode_too_short() {
        assert_eq!(decode_response(&[0xC0, 0xDE, 0, 0]), Err(DecodeError::TooShort(4)));
        assert_eq!(decode_response(&[]), Err(DecodeError::TooShort(0)));
    }

    #[test]
    fn decode_bad_magic() {
        let mut pkt = encode_request(0, 7).to_vec();
        pkt[0] = 0xBA;
        pkt[1] = 0xAD;
        assert_eq!(decode_response(&pkt), Err(DecodeError::BadMagic(0xBAAD)));
    }

    #[test]
    fn decode_ignores_trailing_bytes() {
        let mut pkt = encode_reply(10, 42).to_vec();
        pkt.extend_from_slice(&[0xFF; 20]);
        assert_eq!(decode_response(&pkt), Ok(42));
    }
}
