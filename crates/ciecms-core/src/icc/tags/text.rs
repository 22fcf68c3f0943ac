//! Text Tag Types
//!
//! Built profiles write `desc` and `cprt` as v4 `mluc` with a single
//! en-US record. Reading also accepts v2 `desc` and plain `text`.
//!
//! See ICC.1:2022 Sections 10.24 (text), 10.15 (mluc)

use crate::icc::error::IccError;
use crate::icc::types::{TypeSignature, read_u32};

/// Text tag data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextData {
    /// Primary text content (first record)
    pub text: String,
}

impl TextData {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Parse 'text' type (NUL-terminated ASCII after the type header)
    pub fn parse_text(tag: &[u8]) -> Result<Self, IccError> {
        let body = tag.get(8..).unwrap_or(&[]);
        Ok(Self::new(ascii_until_nul(body)))
    }

    /// Parse v2 'desc' type; only the ASCII part is kept
    pub fn parse_desc(tag: &[u8]) -> Result<Self, IccError> {
        let count = read_u32(tag, 8)? as usize;
        let ascii = tag
            .get(12..12 + count)
            .ok_or_else(|| IccError::Malformed("desc ASCII data truncated".to_string()))?;
        Ok(Self::new(ascii_until_nul(ascii)))
    }

    /// Parse 'mluc' type, keeping the first record
    pub fn parse_mluc(tag: &[u8]) -> Result<Self, IccError> {
        let record_count = read_u32(tag, 8)? as usize;
        let record_size = read_u32(tag, 12)? as usize;
        if record_count == 0 || record_size < 12 {
            return Err(IccError::Malformed("mluc has no usable record".to_string()));
        }

        // Record: language(2) country(2) length(4) offset(4), offset from tag start
        let len = read_u32(tag, 16 + 4)? as usize;
        let offset = read_u32(tag, 16 + 8)? as usize;
        let units = tag
            .get(offset..offset + len)
            .ok_or_else(|| IccError::Malformed("mluc string out of bounds".to_string()))?;

        decode_utf16be(units)
            .map(Self::new)
            .ok_or_else(|| IccError::Malformed("mluc string is not UTF-16".to_string()))
    }

    /// Append as an 'mluc' tag with one en-US record
    pub fn write_mluc(&self, out: &mut Vec<u8>) {
        let units: Vec<u16> = self.text.encode_utf16().collect();
        let string_offset: u32 = 8 + 8 + 12;

        out.extend_from_slice(&TypeSignature::MLUC.0.to_be_bytes());
        out.extend_from_slice(&[0; 4]);
        out.extend_from_slice(&1u32.to_be_bytes());
        out.extend_from_slice(&12u32.to_be_bytes());
        out.extend_from_slice(b"enUS");
        out.extend_from_slice(&((units.len() * 2) as u32).to_be_bytes());
        out.extend_from_slice(&string_offset.to_be_bytes());
        for u in units {
            out.extend_from_slice(&u.to_be_bytes());
        }
    }
}

fn ascii_until_nul(data: &[u8]) -> String {
    data.iter()
        .take_while(|&&b| b != 0)
        .map(|&b| b as char)
        .collect()
}

/// Decode UTF-16BE bytes to String, stopping at a NUL
fn decode_utf16be(data: &[u8]) -> Option<String> {
    if data.len() % 2 != 0 {
        return None;
    }

    let utf16: Vec<u16> = data
        .chunks_exact(2)
        .map(|c| u16::from_be_bytes([c[0], c[1]]))
        .take_while(|&c| c != 0)
        .collect();

    String::from_utf16(&utf16).ok()
}
