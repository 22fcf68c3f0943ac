//! ICC Profile Basic Types
//!
//! Signatures and the fixed-point encodings used inside profiles. Encoding
//! from `f64` rounds half-to-even and rejects values outside the target
//! range instead of clamping them.

use super::error::IccError;
use crate::error::{Error, Result};

/// ICC Tag Signature (4-byte ASCII code)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagSignature(pub u32);

impl TagSignature {
    /// Create from 4 ASCII characters
    pub const fn from_bytes(b: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(b))
    }

    /// Convert to ASCII string (if valid)
    pub fn to_string(&self) -> String {
        let bytes = self.0.to_be_bytes();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub const A2B0: Self = Self::from_bytes(*b"A2B0");
    pub const B2A0: Self = Self::from_bytes(*b"B2A0");
    pub const BLUE_COLORANT: Self = Self::from_bytes(*b"bXYZ");
    pub const BLUE_TRC: Self = Self::from_bytes(*b"bTRC");
    pub const COPYRIGHT: Self = Self::from_bytes(*b"cprt");
    pub const DESC: Self = Self::from_bytes(*b"desc");
    pub const GAMUT: Self = Self::from_bytes(*b"gamt");
    pub const GRAY_TRC: Self = Self::from_bytes(*b"kTRC");
    pub const GREEN_COLORANT: Self = Self::from_bytes(*b"gXYZ");
    pub const GREEN_TRC: Self = Self::from_bytes(*b"gTRC");
    pub const MEDIA_WHITE: Self = Self::from_bytes(*b"wtpt");
    pub const MEDIA_BLACK: Self = Self::from_bytes(*b"bkpt");
    pub const RED_COLORANT: Self = Self::from_bytes(*b"rXYZ");
    pub const RED_TRC: Self = Self::from_bytes(*b"rTRC");
}

/// Type signatures for ICC tag data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeSignature(pub u32);

impl TypeSignature {
    pub const fn from_bytes(b: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(b))
    }

    pub const XYZ: Self = Self::from_bytes(*b"XYZ ");
    pub const CURVE: Self = Self::from_bytes(*b"curv");
    pub const TEXT: Self = Self::from_bytes(*b"text");
    pub const DESC: Self = Self::from_bytes(*b"desc");
    pub const MLUC: Self = Self::from_bytes(*b"mluc");
    pub const LUTA2B: Self = Self::from_bytes(*b"mAB ");
    pub const LUTB2A: Self = Self::from_bytes(*b"mBA ");
}

/// s15Fixed16Number - 16.16 fixed point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct S15Fixed16(pub i32);

impl S15Fixed16 {
    pub const ONE: Self = Self(0x0001_0000);

    /// Encode with round-half-to-even; values outside the 16.16 range fail
    pub fn from_f64(val: f64) -> Result<Self> {
        let scaled = (val * 65536.0).round_ties_even();
        if !scaled.is_finite() || scaled < i32::MIN as f64 || scaled > i32::MAX as f64 {
            return Err(Error::invalid(format!(
                "{val} does not fit in s15Fixed16"
            )));
        }
        Ok(Self(scaled as i32))
    }

    /// Convert to f64
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / 65536.0
    }

    /// Parse from big-endian bytes
    pub fn from_be_bytes(bytes: [u8; 4]) -> Self {
        Self(i32::from_be_bytes(bytes))
    }

    pub fn to_be_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

/// u8Fixed8Number - unsigned 8.8 fixed point, used for `curv` gammas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct U8Fixed8(pub u16);

impl U8Fixed8 {
    pub fn from_f64(val: f64) -> Result<Self> {
        let scaled = (val * 256.0).round_ties_even();
        if !scaled.is_finite() || scaled < 0.0 || scaled > u16::MAX as f64 {
            return Err(Error::invalid(format!("{val} does not fit in u8Fixed8")));
        }
        Ok(Self(scaled as u16))
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / 256.0
    }

    pub fn from_be_bytes(bytes: [u8; 2]) -> Self {
        Self(u16::from_be_bytes(bytes))
    }
}

/// Encode a normalized sample in [0, 1] as a 16-bit table entry
pub fn encode_u16(val: f64) -> Result<u16> {
    if !(0.0..=1.0).contains(&val) {
        return Err(Error::invalid(format!(
            "sample {val} outside the [0, 1] table range"
        )));
    }
    Ok((val * 65535.0).round_ties_even() as u16)
}

/// Encode a normalized sample in [0, 1] as an 8-bit table entry
pub fn encode_u8(val: f64) -> Result<u8> {
    if !(0.0..=1.0).contains(&val) {
        return Err(Error::invalid(format!(
            "sample {val} outside the [0, 1] table range"
        )));
    }
    Ok((val * 255.0).round_ties_even() as u8)
}

/// XYZNumber - ICC XYZ value (3 × s15Fixed16)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct XyzNumber {
    pub x: S15Fixed16,
    pub y: S15Fixed16,
    pub z: S15Fixed16,
}

impl XyzNumber {
    pub fn from_xyz(xyz: [f64; 3]) -> Result<Self> {
        Ok(Self {
            x: S15Fixed16::from_f64(xyz[0])?,
            y: S15Fixed16::from_f64(xyz[1])?,
            z: S15Fixed16::from_f64(xyz[2])?,
        })
    }

    /// Parse from 12 bytes (big-endian)
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 12 {
            return None;
        }
        Some(Self {
            x: S15Fixed16::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            y: S15Fixed16::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            z: S15Fixed16::from_be_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
        })
    }

    pub fn to_bytes(&self) -> [u8; 12] {
        let mut out = [0u8; 12];
        out[0..4].copy_from_slice(&self.x.to_be_bytes());
        out[4..8].copy_from_slice(&self.y.to_be_bytes());
        out[8..12].copy_from_slice(&self.z.to_be_bytes());
        out
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.x.to_f64(), self.y.to_f64(), self.z.to_f64()]
    }
}

/// dateTimeNumber - ICC date/time, all zero when unknown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DateTimeNumber {
    pub year: u16,
    pub month: u16,
    pub day: u16,
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
}

impl DateTimeNumber {
    /// Parse from 12 bytes (big-endian)
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 12 {
            return None;
        }
        Some(Self {
            year: u16::from_be_bytes([bytes[0], bytes[1]]),
            month: u16::from_be_bytes([bytes[2], bytes[3]]),
            day: u16::from_be_bytes([bytes[4], bytes[5]]),
            hour: u16::from_be_bytes([bytes[6], bytes[7]]),
            minute: u16::from_be_bytes([bytes[8], bytes[9]]),
            second: u16::from_be_bytes([bytes[10], bytes[11]]),
        })
    }

    pub fn to_bytes(&self) -> [u8; 12] {
        let mut out = [0u8; 12];
        for (i, v) in [
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
        ]
        .into_iter()
        .enumerate()
        {
            out[i * 2..i * 2 + 2].copy_from_slice(&v.to_be_bytes());
        }
        out
    }

    /// Reject field values no calendar can produce
    pub fn validate(&self) -> Result<()> {
        let ok = (1..=12).contains(&self.month)
            && (1..=31).contains(&self.day)
            && self.hour < 24
            && self.minute < 60
            && self.second < 60;
        if ok || *self == Self::default() {
            Ok(())
        } else {
            Err(Error::invalid(format!("invalid creation time {self:?}")))
        }
    }
}

/// Big-endian u16 at `pos`, bounds checked
pub(crate) fn read_u16(data: &[u8], pos: usize) -> std::result::Result<u16, IccError> {
    data.get(pos..pos + 2)
        .map(|b| u16::from_be_bytes([b[0], b[1]]))
        .ok_or_else(|| IccError::Malformed(format!("read past end at offset {pos}")))
}

/// Big-endian u32 at `pos`, bounds checked
pub(crate) fn read_u32(data: &[u8], pos: usize) -> std::result::Result<u32, IccError> {
    data.get(pos..pos + 4)
        .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or_else(|| IccError::Malformed(format!("read past end at offset {pos}")))
}

/// s15Fixed16 at `pos` as f64, bounds checked
pub(crate) fn read_s15(data: &[u8], pos: usize) -> std::result::Result<f64, IccError> {
    read_u32(data, pos).map(|v| S15Fixed16(v as i32).to_f64())
}

/// Pad `buf` with zeros to the next 4-byte boundary
pub(crate) fn pad_to_word(buf: &mut Vec<u8>) {
    while buf.len() % 4 != 0 {
        buf.push(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_s15fixed16() {
        let one = S15Fixed16::from_f64(1.0).unwrap();
        assert_eq!(one, S15Fixed16::ONE);

        let half = S15Fixed16::from_f64(0.5).unwrap();
        assert_eq!(half.0, 0x8000);

        let neg = S15Fixed16::from_f64(-1.5).unwrap();
        assert!((neg.to_f64() - (-1.5)).abs() < 1e-9);
    }

    #[test]
    fn test_s15fixed16_rounds_half_to_even() {
        // 2.5 / 65536 and 3.5 / 65536 sit exactly between two codes
        assert_eq!(S15Fixed16::from_f64(2.5 / 65536.0).unwrap().0, 2);
        assert_eq!(S15Fixed16::from_f64(3.5 / 65536.0).unwrap().0, 4);
        assert_eq!(S15Fixed16::from_f64(-2.5 / 65536.0).unwrap().0, -2);
    }

    #[test]
    fn test_s15fixed16_overflow_is_error() {
        assert!(S15Fixed16::from_f64(32768.0).is_err());
        assert!(S15Fixed16::from_f64(f64::NAN).is_err());
        assert!(S15Fixed16::from_f64(-32768.0).is_ok());
    }

    #[test]
    fn test_u8fixed8() {
        let g = U8Fixed8::from_f64(2.2).unwrap();
        assert_eq!(g.0, 563);
        assert!((g.to_f64() - 2.19921875).abs() < 1e-12);
        assert!(U8Fixed8::from_f64(256.0).is_err());
        assert!(U8Fixed8::from_f64(-0.1).is_err());
    }

    #[test]
    fn test_encode_u16() {
        assert_eq!(encode_u16(0.0).unwrap(), 0);
        assert_eq!(encode_u16(1.0).unwrap(), 65535);
        assert_eq!(encode_u16(0.5).unwrap(), 32768);
        assert!(encode_u16(1.0001).is_err());
        assert_eq!(encode_u8(0.5).unwrap(), 128);
    }

    #[test]
    fn test_xyz_number() {
        // D50 white point in ICC encoding
        let bytes: [u8; 12] = [
            0x00, 0x00, 0xF6, 0xD6, // X = 0.9642
            0x00, 0x01, 0x00, 0x00, // Y = 1.0
            0x00, 0x00, 0xD3, 0x2D, // Z = 0.8249
        ];
        let xyz = XyzNumber::from_bytes(&bytes).unwrap();
        let color = xyz.to_array();

        assert!((color[0] - 0.9642).abs() < 0.001);
        assert!((color[1] - 1.0).abs() < 0.001);
        assert!((color[2] - 0.8249).abs() < 0.001);
        assert_eq!(xyz.to_bytes(), bytes);
    }

    #[test]
    fn test_date_time() {
        let dt = DateTimeNumber {
            year: 2024,
            month: 2,
            day: 29,
            hour: 13,
            minute: 5,
            second: 59,
        };
        assert!(dt.validate().is_ok());
        assert_eq!(DateTimeNumber::from_bytes(&dt.to_bytes()), Some(dt));
        assert!(DateTimeNumber::default().validate().is_ok());

        let bad = DateTimeNumber { month: 13, ..dt };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_tag_signature() {
        assert_eq!(TagSignature::DESC.to_string(), "desc");
        assert_eq!(TagSignature::RED_COLORANT.to_string(), "rXYZ");
    }

    #[test]
    fn test_bounds_checked_reads() {
        let data = [0u8, 1, 0, 0, 0, 2];
        assert_eq!(read_u16(&data, 0).unwrap(), 1);
        assert_eq!(read_u32(&data, 2).unwrap(), 2);
        assert!(read_u32(&data, 3).is_err());
    }
}
