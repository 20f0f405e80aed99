//! Blob-encoded BIT strings, variable-length integers and UUID slots.

use std::fmt;

use colview_result::{Error, Result};
use uuid::Uuid;

/// A string of bits stored as `[padding][bytes...]`.
///
/// The first `padding` bits of the first data byte are filler; the remaining
/// bits are the value, most significant bit first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BitString {
    bytes: Vec<u8>,
    padding: u8,
}

impl BitString {
    /// Decode the engine's blob layout.
    pub fn from_blob(blob: &[u8]) -> Result<Self> {
        let (&padding, bytes) = blob
            .split_first()
            .ok_or_else(|| Error::domain("BIT value is missing its padding byte"))?;
        if padding > 7 || (bytes.is_empty() && padding != 0) {
            return Err(Error::domain(format!(
                "BIT value has invalid padding {padding} for {} data bytes",
                bytes.len()
            )));
        }
        Ok(Self {
            bytes: bytes.to_vec(),
            padding,
        })
    }

    pub fn to_blob(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.bytes.len() + 1);
        out.push(self.padding);
        out.extend_from_slice(&self.bytes);
        out
    }

    pub fn from_bits<I: IntoIterator<Item = bool>>(bits: I) -> Self {
        let bits: Vec<bool> = bits.into_iter().collect();
        let padding = ((8 - bits.len() % 8) % 8) as u8;
        let total = bits.len() + usize::from(padding);
        let mut bytes = vec![0u8; total / 8];
        // Filler bits are set, matching what the engine writes.
        for pos in 0..usize::from(padding) {
            bytes[0] |= 0x80 >> pos;
        }
        for (i, bit) in bits.into_iter().enumerate() {
            if bit {
                let pos = i + usize::from(padding);
                bytes[pos / 8] |= 0x80 >> (pos % 8);
            }
        }
        Self { bytes, padding }
    }

    pub fn len(&self) -> usize {
        self.bytes.len() * 8 - usize::from(self.padding)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<bool> {
        if index >= self.len() {
            return None;
        }
        let pos = index + usize::from(self.padding);
        Some(self.bytes[pos / 8] & (0x80 >> (pos % 8)) != 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Arbitrary-precision integer stored as sign plus big-endian magnitude.
///
/// Blob layout: a 3-byte header (top bit set for non-negative values, low 23
/// bits the payload length) followed by the magnitude. Negative values store
/// the header and payload bitwise inverted so blobs compare in numeric order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct VarInt {
    negative: bool,
    /// Big-endian, no leading zero bytes; empty for zero.
    magnitude: Vec<u8>,
}

impl VarInt {
    const HEADER_LEN: usize = 3;
    const SIGN_BIT: u32 = 0x80_0000;
    const LEN_MASK: u32 = 0x7F_FFFF;

    pub fn from_blob(blob: &[u8]) -> Result<Self> {
        if blob.len() <= Self::HEADER_LEN {
            return Err(Error::domain(format!(
                "VARINT blob of {} bytes is too short",
                blob.len()
            )));
        }
        let raw_header =
            (u32::from(blob[0]) << 16) | (u32::from(blob[1]) << 8) | u32::from(blob[2]);
        let negative = raw_header & Self::SIGN_BIT == 0;
        let header = if negative {
            !raw_header & 0xFF_FFFF
        } else {
            raw_header
        };
        let len = (header & Self::LEN_MASK) as usize;
        let payload = &blob[Self::HEADER_LEN..];
        if len != payload.len() {
            return Err(Error::domain(format!(
                "VARINT header declares {len} bytes but {} follow",
                payload.len()
            )));
        }
        let magnitude: Vec<u8> = payload
            .iter()
            .map(|&b| if negative { !b } else { b })
            .skip_while(|&b| b == 0)
            .collect();
        Ok(Self {
            negative: negative && !magnitude.is_empty(),
            magnitude,
        })
    }

    pub fn to_blob(&self) -> Vec<u8> {
        let payload: &[u8] = if self.magnitude.is_empty() {
            &[0]
        } else {
            &self.magnitude
        };
        let mut header = Self::SIGN_BIT | payload.len() as u32;
        if self.negative {
            header = !header & 0xFF_FFFF;
        }
        let mut out = Vec::with_capacity(Self::HEADER_LEN + payload.len());
        out.extend_from_slice(&header.to_be_bytes()[1..]);
        out.extend(payload.iter().map(|&b| if self.negative { !b } else { b }));
        out
    }

    pub fn from_i128(value: i128) -> Self {
        let magnitude: Vec<u8> = value
            .unsigned_abs()
            .to_be_bytes()
            .into_iter()
            .skip_while(|&b| b == 0)
            .collect();
        Self {
            negative: value < 0,
            magnitude,
        }
    }

    /// `None` when the value does not fit in an `i128`.
    pub fn to_i128(&self) -> Option<i128> {
        if self.magnitude.len() > 16 {
            return None;
        }
        let magnitude = self
            .magnitude
            .iter()
            .fold(0u128, |acc, &b| (acc << 8) | u128::from(b));
        if self.negative {
            if magnitude == 1u128 << 127 {
                Some(i128::MIN)
            } else {
                i128::try_from(magnitude).ok().map(|m| -m)
            }
        } else {
            i128::try_from(magnitude).ok()
        }
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn magnitude(&self) -> &[u8] {
        &self.magnitude
    }
}

impl fmt::Display for VarInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.magnitude.is_empty() {
            return f.write_str("0");
        }
        let mut remaining = self.magnitude.clone();
        let mut digits = Vec::new();
        while remaining.iter().any(|&b| b != 0) {
            let mut rem = 0u32;
            for byte in remaining.iter_mut() {
                let cur = (rem << 8) | u32::from(*byte);
                *byte = (cur / 10) as u8;
                rem = cur % 10;
            }
            digits.push(b'0' + rem as u8);
        }
        if self.negative {
            f.write_str("-")?;
        }
        digits.reverse();
        // Digits are ASCII.
        f.write_str(std::str::from_utf8(&digits).map_err(|_| fmt::Error)?)
    }
}

/// UUIDs are stored as a HUGEINT with the top bit flipped so that signed
/// comparison orders them like their byte representation.
pub fn uuid_from_hugeint(value: i128) -> Uuid {
    Uuid::from_u128((value as u128) ^ (1u128 << 127))
}

pub fn uuid_to_hugeint(uuid: Uuid) -> i128 {
    (uuid.as_u128() ^ (1u128 << 127)) as i128
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_string_layout() {
        let bits = BitString::from_bits([true, false, true]);
        assert_eq!(bits.len(), 3);
        assert_eq!(bits.to_string(), "101");
        assert_eq!(bits.to_blob(), vec![5, 0b1111_1101]);
        assert_eq!(BitString::from_blob(&bits.to_blob()).unwrap(), bits);
    }

    #[test]
    fn bit_string_rejects_bad_padding() {
        assert!(BitString::from_blob(&[]).is_err());
        assert!(BitString::from_blob(&[9, 0]).is_err());
        assert!(BitString::from_blob(&[0]).unwrap().is_empty());
    }

    #[test]
    fn varint_round_trip() {
        for value in [0i128, 1, -1, 255, -256, 1 << 70, i128::MIN, i128::MAX] {
            let v = VarInt::from_i128(value);
            let decoded = VarInt::from_blob(&v.to_blob()).unwrap();
            assert_eq!(decoded.to_i128(), Some(value), "{value}");
            assert_eq!(decoded.to_string(), value.to_string());
        }
    }

    #[test]
    fn varint_negative_encoding_is_inverted() {
        let blob = VarInt::from_i128(-1).to_blob();
        assert_eq!(blob, vec![0x7F, 0xFF, 0xFE, 0xFE]);
        assert!(VarInt::from_blob(&blob[..3]).is_err());
    }

    #[test]
    fn uuid_hugeint_flip() {
        let uuid = Uuid::from_u128(0x0123_4567_89ab_cdef_0123_4567_89ab_cdef);
        assert_eq!(uuid_from_hugeint(uuid_to_hugeint(uuid)), uuid);
        assert_eq!(uuid_to_hugeint(Uuid::nil()), i128::MIN);
    }
}
