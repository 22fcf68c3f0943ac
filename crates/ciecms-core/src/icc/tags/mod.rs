//! ICC Profile Tag Data
//!
//! Tags contain the actual profile data. Each tag has:
//! - A 4-byte type signature identifying the data format
//! - Reserved bytes
//! - Type-specific data
//!
//! Parsers and writers work on whole tag payloads, type header included,
//! since lut element offsets are relative to the tag start.
//!
//! See ICC.1:2022 Section 9.

mod curves;
mod lut;
mod text;
mod xyz;

pub use curves::CurveData;
pub use lut::{ClutData, ClutPrecision, LutData, LutKind, LutMatrix};
pub use text::TextData;
pub use xyz::XyzTagData;

use super::error::IccError;
use super::types::{TypeSignature, read_u32};
use crate::error::Result;

/// Parsed tag data
#[derive(Debug, Clone, PartialEq)]
pub enum TagData {
    /// XYZ type data (colorants, white point)
    Xyz(XyzTagData),
    /// Curve type (TRC)
    Curve(CurveData),
    /// Description or copyright, written as `mluc`
    Text(TextData),
    /// `mAB ` or `mBA `
    Lut(LutData),
    /// Tag carried verbatim, type header included
    Unknown { type_sig: u32, data: Vec<u8> },
}

impl TagData {
    /// Parse one tag payload
    pub fn parse(data: &[u8]) -> std::result::Result<Self, IccError> {
        if data.len() < 8 {
            return Err(IccError::Malformed(
                "Tag data too small for header".to_string(),
            ));
        }

        let type_sig = TypeSignature(read_u32(data, 0)?);
        match type_sig {
            TypeSignature::XYZ => XyzTagData::parse(data).map(TagData::Xyz),
            TypeSignature::CURVE => CurveData::parse_at(data, 0).map(|(c, _)| TagData::Curve(c)),
            TypeSignature::TEXT => TextData::parse_text(data).map(TagData::Text),
            TypeSignature::DESC => TextData::parse_desc(data).map(TagData::Text),
            TypeSignature::MLUC => TextData::parse_mluc(data).map(TagData::Text),
            TypeSignature::LUTA2B | TypeSignature::LUTB2A => LutData::parse(data).map(TagData::Lut),
            _ => Ok(TagData::Unknown {
                type_sig: type_sig.0,
                data: data.to_vec(),
            }),
        }
    }

    /// Append the serialized payload (unpadded)
    pub fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        match self {
            TagData::Xyz(xyz) => xyz.write(out),
            TagData::Curve(curve) => curve.write(out)?,
            TagData::Text(text) => text.write_mluc(out),
            TagData::Lut(lut) => lut.write(out)?,
            TagData::Unknown { data, .. } => out.extend_from_slice(data),
        }
        Ok(())
    }

    pub fn as_xyz(&self) -> Option<&XyzTagData> {
        match self {
            TagData::Xyz(xyz) => Some(xyz),
            _ => None,
        }
    }

    pub fn as_curve(&self) -> Option<&CurveData> {
        match self {
            TagData::Curve(curve) => Some(curve),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextData> {
        match self {
            TagData::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_lut(&self) -> Option<&LutData> {
        match self {
            TagData::Lut(lut) => Some(lut),
            _ => None,
        }
    }
}
