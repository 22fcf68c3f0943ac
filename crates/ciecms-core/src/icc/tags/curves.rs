//! Curve Tag Type (curv)
//!
//! - count 0: identity
//! - count 1: gamma as u8Fixed8
//! - count > 1: uniformly spaced u16 samples over [0, 1]
//!
//! The same encoding is used for TRC tags and for each curve of the
//! curve sets inside lutAToB / lutBToA tags.
//!
//! See ICC.1:2022 Section 10.6

use crate::error::Result;
use crate::icc::error::IccError;
use crate::icc::types::{TypeSignature, U8Fixed8, encode_u16, read_u16, read_u32};

/// Curve tag data (curv type)
#[derive(Debug, Clone, PartialEq)]
pub enum CurveData {
    Identity,
    /// Exponent, already quantized to u8Fixed8 when read from bytes
    Gamma(f64),
    Table(Vec<u16>),
}

impl CurveData {
    /// Quantize normalized samples into a table curve
    pub fn from_samples(samples: &[f64]) -> Result<Self> {
        let mut table = crate::error::try_zeroed::<u16>(samples.len())?;
        for (dst, &s) in table.iter_mut().zip(samples) {
            *dst = encode_u16(s)?;
        }
        Ok(CurveData::Table(table))
    }

    /// Parse a `curv` element starting at `pos`; returns the curve and the
    /// position just past it
    pub fn parse_at(data: &[u8], pos: usize) -> std::result::Result<(Self, usize), IccError> {
        let type_sig = read_u32(data, pos)?;
        if type_sig != TypeSignature::CURVE.0 {
            return Err(IccError::Malformed(format!(
                "expected curv element, found 0x{type_sig:08X}"
            )));
        }

        let count = read_u32(data, pos + 8)? as usize;
        let body = pos + 12;

        let curve = match count {
            0 => CurveData::Identity,
            1 => CurveData::Gamma(U8Fixed8(read_u16(data, body)?).to_f64()),
            _ => {
                let bytes = data.get(body..body + count * 2).ok_or_else(|| {
                    IccError::Malformed(format!("curv table of {count} entries truncated"))
                })?;
                CurveData::Table(
                    bytes
                        .chunks_exact(2)
                        .map(|c| u16::from_be_bytes([c[0], c[1]]))
                        .collect(),
                )
            }
        };

        Ok((curve, body + count * 2))
    }

    /// Append as a `curv` element (unpadded)
    pub fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        out.extend_from_slice(&TypeSignature::CURVE.0.to_be_bytes());
        out.extend_from_slice(&[0; 4]);
        match self {
            CurveData::Identity => out.extend_from_slice(&0u32.to_be_bytes()),
            CurveData::Gamma(g) => {
                let raw = U8Fixed8::from_f64(*g)?;
                out.extend_from_slice(&1u32.to_be_bytes());
                out.extend_from_slice(&raw.0.to_be_bytes());
            }
            CurveData::Table(table) => {
                out.extend_from_slice(&(table.len() as u32).to_be_bytes());
                for v in table {
                    out.extend_from_slice(&v.to_be_bytes());
                }
            }
        }
        Ok(())
    }

    /// Normalized samples, or `None` for identity and gamma curves
    pub fn samples(&self) -> Option<Vec<f64>> {
        match self {
            CurveData::Table(table) => Some(table.iter().map(|&v| v as f64 / 65535.0).collect()),
            _ => None,
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, CurveData::Identity)
    }
}
