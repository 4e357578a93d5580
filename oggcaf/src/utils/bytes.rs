//! Primitive field decoders.
//!
//! Fixed-width big/little-endian integers, IEEE-754 doubles and UTF-8
//! text, all decoded from exact byte slices. Width mismatches fail with
//! [`DecodeError::InvalidFieldLength`]; no field value is range-checked.

use crate::utils::errors::DecodeError;

/// Big-endian accumulation of 1 to 8 bytes into an unsigned integer.
///
/// More than 8 bytes would overflow the accumulator and is rejected.
pub fn unsigned_be(bytes: &[u8]) -> Result<u64, DecodeError> {
    if bytes.is_empty() || bytes.len() > 8 {
        return Err(DecodeError::InvalidFieldLength {
            expected: 8,
            actual: bytes.len(),
        });
    }

    Ok(bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
}

pub fn float64_be(bytes: &[u8]) -> Result<f64, DecodeError> {
    Ok(f64::from_be_bytes(fixed(bytes)?))
}

pub fn int64_be(bytes: &[u8]) -> Result<i64, DecodeError> {
    Ok(i64::from_be_bytes(fixed(bytes)?))
}

pub fn int32_be(bytes: &[u8]) -> Result<i32, DecodeError> {
    Ok(i32::from_be_bytes(fixed(bytes)?))
}

pub fn uint32_be(bytes: &[u8]) -> Result<u32, DecodeError> {
    Ok(u32::from_be_bytes(fixed(bytes)?))
}

pub fn uint16_be(bytes: &[u8]) -> Result<u16, DecodeError> {
    Ok(u16::from_be_bytes(fixed(bytes)?))
}

pub fn uint16_le(bytes: &[u8]) -> Result<u16, DecodeError> {
    Ok(u16::from_le_bytes(fixed(bytes)?))
}

pub fn uint32_le(bytes: &[u8]) -> Result<u32, DecodeError> {
    Ok(u32::from_le_bytes(fixed(bytes)?))
}

pub fn uint64_le(bytes: &[u8]) -> Result<u64, DecodeError> {
    Ok(u64::from_le_bytes(fixed(bytes)?))
}

/// Lossy UTF-8 decode, used for 4-character tags and string fields.
pub fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn fixed<const N: usize>(bytes: &[u8]) -> Result<[u8; N], DecodeError> {
    bytes
        .try_into()
        .map_err(|_| DecodeError::InvalidFieldLength {
            expected: N,
            actual: bytes.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsigned_be_accumulates_left_to_right() {
        assert_eq!(unsigned_be(&[0x00, 0x00, 0x01, 0x00]).unwrap(), 256);
        assert_eq!(unsigned_be(&[0xFF]).unwrap(), 255);
        assert_eq!(
            unsigned_be(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]).unwrap(),
            0x0102_0304_0506_0708
        );
    }

    #[test]
    fn unsigned_be_rejects_empty_and_oversized() {
        assert_eq!(
            unsigned_be(&[]),
            Err(DecodeError::InvalidFieldLength {
                expected: 8,
                actual: 0
            })
        );
        assert_eq!(
            unsigned_be(&[0; 9]),
            Err(DecodeError::InvalidFieldLength {
                expected: 8,
                actual: 9
            })
        );
    }

    #[test]
    fn float64_be_round_trips() {
        let encoded = 3.14f64.to_be_bytes();
        assert_eq!(float64_be(&encoded).unwrap(), 3.14);
    }

    #[test]
    fn fixed_width_decoders_require_exact_length() {
        assert_eq!(
            float64_be(&[0; 7]),
            Err(DecodeError::InvalidFieldLength {
                expected: 8,
                actual: 7
            })
        );
        assert_eq!(
            int64_be(&[0; 9]),
            Err(DecodeError::InvalidFieldLength {
                expected: 8,
                actual: 9
            })
        );
        assert_eq!(
            int32_be(&[0; 2]),
            Err(DecodeError::InvalidFieldLength {
                expected: 4,
                actual: 2
            })
        );
        assert_eq!(
            uint32_le(&[0; 5]),
            Err(DecodeError::InvalidFieldLength {
                expected: 4,
                actual: 5
            })
        );
        assert_eq!(
            uint64_le(&[0; 3]),
            Err(DecodeError::InvalidFieldLength {
                expected: 8,
                actual: 3
            })
        );
    }

    #[test]
    fn signed_decoders_are_twos_complement() {
        assert_eq!(int64_be(&(-1i64).to_be_bytes()).unwrap(), -1);
        assert_eq!(int32_be(&(-42i32).to_be_bytes()).unwrap(), -42);
    }

    #[test]
    fn little_endian_decoders() {
        assert_eq!(uint32_le(&[0x01, 0x00, 0x00, 0x00]).unwrap(), 1);
        assert_eq!(uint16_le(&[0x34, 0x12]).unwrap(), 0x1234);
        assert_eq!(
            uint64_le(&0xDEAD_BEEF_0000_0001u64.to_le_bytes()).unwrap(),
            0xDEAD_BEEF_0000_0001
        );
    }

    #[test]
    fn text_is_lossy() {
        assert_eq!(text(b"desc"), "desc");
        assert_eq!(text(&[0x61, 0xFF, 0x62]), "a\u{FFFD}b");
    }
}
