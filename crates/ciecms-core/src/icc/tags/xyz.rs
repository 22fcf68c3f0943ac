//! XYZ Tag Type
//!
//! The XYZType contains an array of XYZ values. Used for colorant tags,
//! white point and black point.
//!
//! See ICC.1:2022 Section 10.31

use crate::error::Result;
use crate::icc::error::IccError;
use crate::icc::types::{TypeSignature, XyzNumber};

/// XYZ tag data - contains one or more XYZ values
#[derive(Debug, Clone, PartialEq)]
pub struct XyzTagData {
    pub values: Vec<XyzNumber>,
}

impl XyzTagData {
    /// Single value, encoded as s15Fixed16
    pub fn from_xyz(xyz: [f64; 3]) -> Result<Self> {
        Ok(Self {
            values: vec![XyzNumber::from_xyz(xyz)?],
        })
    }

    /// Parse a whole `XYZ ` tag, type header included
    pub fn parse(tag: &[u8]) -> std::result::Result<Self, IccError> {
        let body = tag.get(8..).unwrap_or(&[]);
        if body.len() < 12 {
            return Err(IccError::Malformed("XYZ tag too small".to_string()));
        }

        let values: Vec<XyzNumber> = body
            .chunks_exact(12)
            .filter_map(XyzNumber::from_bytes)
            .collect();

        Ok(Self { values })
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&TypeSignature::XYZ.0.to_be_bytes());
        out.extend_from_slice(&[0; 4]);
        for v in &self.values {
            out.extend_from_slice(&v.to_bytes());
        }
    }

    /// First value as floating point
    pub fn to_array(&self) -> Option<[f64; 3]> {
        self.values.first().map(|v| v.to_array())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_xyz_tag() {
        let data: [u8; 20] = [
            b'X', b'Y', b'Z', b' ', 0, 0, 0, 0, //
            0x00, 0x00, 0xF6, 0xD6, // X = 0.9642
            0x00, 0x01, 0x00, 0x00, // Y = 1.0
            0x00, 0x00, 0xD3, 0x2D, // Z = 0.8249
        ];

        let tag = XyzTagData::parse(&data).unwrap();
        assert_eq!(tag.values.len(), 1);
        let xyz = tag.to_array().unwrap();
        assert!((xyz[1] - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_write_then_parse() {
        let tag = XyzTagData::from_xyz([0.25, 0.5, -0.125]).unwrap();
        let mut bytes = Vec::new();
        tag.write(&mut bytes);
        assert_eq!(bytes.len(), 20);
        assert_eq!(XyzTagData::parse(&bytes).unwrap(), tag);
        assert_eq!(tag.to_array(), Some([0.25, 0.5, -0.125]));
    }

    #[test]
    fn test_parse_xyz_too_small() {
        let data = [b'X', b'Y', b'Z', b' ', 0, 0, 0, 0, 0, 0];
        assert!(XyzTagData::parse(&data).is_err());
    }
}
