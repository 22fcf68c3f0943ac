//! LUT Tag Types
//!
//! - mAB (lutAToBType): A curves → CLUT → M curves → matrix → B curves
//! - mBA (lutBToAType): B curves → matrix → M curves → CLUT → A curves
//!
//! Element offsets are measured from the start of the tag. Every element
//! (and every curve inside a curve set) starts on a 4-byte boundary.
//!
//! See ICC.1:2022 Sections 10.12, 10.13

use crate::error::{Error, Result};
use crate::icc::error::{IccError, fourcc};
use crate::icc::tags::CurveData;
use crate::icc::types::{
    S15Fixed16, TypeSignature, encode_u8, encode_u16, pad_to_word, read_s15, read_u32,
};
use crate::math::{MAX_GRID_INPUTS, Matrix3x3};

/// Direction of a lut tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LutKind {
    /// `mAB `: device (or Lab) to PCS
    AToB,
    /// `mBA `: PCS to device
    BToA,
}

impl LutKind {
    fn type_signature(self) -> TypeSignature {
        match self {
            LutKind::AToB => TypeSignature::LUTA2B,
            LutKind::BToA => TypeSignature::LUTB2A,
        }
    }
}

/// Bytes per CLUT entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClutPrecision {
    U8,
    #[default]
    U16,
}

impl ClutPrecision {
    fn bytes(self) -> usize {
        match self {
            ClutPrecision::U8 => 1,
            ClutPrecision::U16 => 2,
        }
    }
}

/// Matrix element: 3x3 (row-major) plus offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LutMatrix {
    pub matrix: Matrix3x3,
    pub offset: [f64; 3],
}

impl LutMatrix {
    fn parse_at(tag: &[u8], pos: usize) -> std::result::Result<Self, IccError> {
        let mut m = [[0.0; 3]; 3];
        for (i, v) in m.iter_mut().flatten().enumerate() {
            *v = read_s15(tag, pos + i * 4)?;
        }
        let mut offset = [0.0; 3];
        for (i, v) in offset.iter_mut().enumerate() {
            *v = read_s15(tag, pos + 36 + i * 4)?;
        }
        Ok(Self {
            matrix: Matrix3x3::new(m),
            offset,
        })
    }

    fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        for v in self.matrix.m.iter().flatten().chain(&self.offset) {
            out.extend_from_slice(&S15Fixed16::from_f64(*v)?.to_be_bytes());
        }
        Ok(())
    }
}

/// CLUT element
#[derive(Debug, Clone, PartialEq)]
pub struct ClutData {
    /// Nodes per input axis, first axis varying slowest
    pub grid: Vec<u8>,
    pub precision: ClutPrecision,
    /// `prod(grid) * outputs` values normalized to [0, 1]
    pub data: Vec<f64>,
}

impl ClutData {
    fn parse_at(
        tag: &[u8],
        pos: usize,
        inputs: usize,
        outputs: usize,
    ) -> std::result::Result<Self, IccError> {
        let header = tag
            .get(pos..pos + 20)
            .ok_or_else(|| IccError::Malformed("CLUT header truncated".to_string()))?;
        let grid = header[..inputs].to_vec();
        if grid.iter().any(|&g| g < 2) {
            return Err(IccError::Malformed(format!(
                "CLUT grid {grid:?} has an axis below 2 points"
            )));
        }
        let precision = match header[16] {
            1 => ClutPrecision::U8,
            2 => ClutPrecision::U16,
            p => {
                return Err(IccError::Malformed(format!(
                    "CLUT precision {p} is not 1 or 2"
                )));
            }
        };

        let entries = grid
            .iter()
            .try_fold(outputs, |acc, &g| acc.checked_mul(g as usize))
            .ok_or_else(|| IccError::Malformed("CLUT size overflows".to_string()))?;
        let start = pos + 20;
        let raw = tag
            .get(start..start + entries * precision.bytes())
            .ok_or_else(|| IccError::Malformed("CLUT data truncated".to_string()))?;

        let data = match precision {
            ClutPrecision::U8 => raw.iter().map(|&v| v as f64 / 255.0).collect(),
            ClutPrecision::U16 => raw
                .chunks_exact(2)
                .map(|c| u16::from_be_bytes([c[0], c[1]]) as f64 / 65535.0)
                .collect(),
        };

        Ok(Self {
            grid,
            precision,
            data,
        })
    }

    fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        let mut grid = [0u8; 16];
        grid[..self.grid.len()].copy_from_slice(&self.grid);
        out.extend_from_slice(&grid);
        out.push(self.precision.bytes() as u8);
        out.extend_from_slice(&[0; 3]);

        out.try_reserve(self.data.len() * self.precision.bytes())
            .map_err(|_| Error::AllocationFailure {
                bytes: self.data.len() * self.precision.bytes(),
            })?;
        match self.precision {
            ClutPrecision::U8 => {
                for &v in &self.data {
                    out.push(encode_u8(v)?);
                }
            }
            ClutPrecision::U16 => {
                for &v in &self.data {
                    out.extend_from_slice(&encode_u16(v)?.to_be_bytes());
                }
            }
        }
        Ok(())
    }
}

/// lutAToBType / lutBToAType payload
///
/// Curve sets hold one curve per channel on their side of the lut: for
/// `AToB` the A curves match the inputs and M/B the outputs, for `BToA`
/// B/M match the inputs and A the outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct LutData {
    pub kind: LutKind,
    pub input_channels: u8,
    pub output_channels: u8,
    pub a_curves: Option<Vec<CurveData>>,
    pub clut: Option<ClutData>,
    pub m_curves: Option<Vec<CurveData>>,
    pub matrix: Option<LutMatrix>,
    pub b_curves: Vec<CurveData>,
}

impl LutData {
    /// Parse a whole lut tag, type header included
    pub fn parse(tag: &[u8]) -> std::result::Result<Self, IccError> {
        let kind = match TypeSignature(read_u32(tag, 0)?) {
            TypeSignature::LUTA2B => LutKind::AToB,
            TypeSignature::LUTB2A => LutKind::BToA,
            other => {
                return Err(IccError::Malformed(format!(
                    "expected lut type, found {}",
                    fourcc(other.0)
                )));
            }
        };
        if tag.len() < 32 {
            return Err(IccError::Malformed("lut tag too small".to_string()));
        }

        let input_channels = tag[8];
        let output_channels = tag[9];
        let (inputs, outputs) = (input_channels as usize, output_channels as usize);
        if inputs == 0 || outputs == 0 || inputs > MAX_GRID_INPUTS || outputs > MAX_GRID_INPUTS {
            return Err(IccError::Malformed(format!(
                "lut with {inputs} inputs and {outputs} outputs"
            )));
        }

        let b_offset = read_u32(tag, 12)? as usize;
        let matrix_offset = read_u32(tag, 16)? as usize;
        let m_offset = read_u32(tag, 20)? as usize;
        let clut_offset = read_u32(tag, 24)? as usize;
        let a_offset = read_u32(tag, 28)? as usize;

        // Channel count on each side of the CLUT
        let (a_count, bm_count) = match kind {
            LutKind::AToB => (inputs, outputs),
            LutKind::BToA => (outputs, inputs),
        };

        if b_offset == 0 {
            return Err(IccError::Malformed("lut without B curves".to_string()));
        }
        let b_curves = parse_curve_set(tag, b_offset, bm_count)?;
        let matrix = (matrix_offset != 0)
            .then(|| LutMatrix::parse_at(tag, matrix_offset))
            .transpose()?;
        let m_curves = (m_offset != 0)
            .then(|| parse_curve_set(tag, m_offset, bm_count))
            .transpose()?;
        let clut = (clut_offset != 0)
            .then(|| ClutData::parse_at(tag, clut_offset, inputs, outputs))
            .transpose()?;
        let a_curves = (a_offset != 0)
            .then(|| parse_curve_set(tag, a_offset, a_count))
            .transpose()?;

        Ok(Self {
            kind,
            input_channels,
            output_channels,
            a_curves,
            clut,
            m_curves,
            matrix,
            b_curves,
        })
    }

    /// Append the whole tag; the caller pads the result
    pub fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        self.validate()?;

        let start = out.len();
        out.extend_from_slice(&self.kind.type_signature().0.to_be_bytes());
        out.extend_from_slice(&[0; 4]);
        out.push(self.input_channels);
        out.push(self.output_channels);
        out.extend_from_slice(&[0; 2]);
        let offsets_at = out.len();
        out.extend_from_slice(&[0; 20]);

        let mut offsets = [0u32; 5];

        offsets[0] = (out.len() - start) as u32;
        write_curve_set(&self.b_curves, out)?;

        if let Some(matrix) = &self.matrix {
            offsets[1] = (out.len() - start) as u32;
            matrix.write(out)?;
        }
        if let Some(curves) = &self.m_curves {
            offsets[2] = (out.len() - start) as u32;
            write_curve_set(curves, out)?;
        }
        if let Some(clut) = &self.clut {
            offsets[3] = (out.len() - start) as u32;
            clut.write(out)?;
            pad_to_word(out);
        }
        if let Some(curves) = &self.a_curves {
            offsets[4] = (out.len() - start) as u32;
            write_curve_set(curves, out)?;
        }

        for (i, off) in offsets.iter().enumerate() {
            let at = offsets_at + i * 4;
            out[at..at + 4].copy_from_slice(&off.to_be_bytes());
        }
        Ok(())
    }

    /// Structural checks shared by all writers
    fn validate(&self) -> Result<()> {
        let (inputs, outputs) = (self.input_channels as usize, self.output_channels as usize);
        if inputs == 0 || outputs == 0 || inputs > MAX_GRID_INPUTS || outputs > MAX_GRID_INPUTS {
            return Err(Error::invalid(format!(
                "lut with {inputs} inputs and {outputs} outputs"
            )));
        }
        let (a_count, bm_count) = match self.kind {
            LutKind::AToB => (inputs, outputs),
            LutKind::BToA => (outputs, inputs),
        };

        let check_set = |set: &[CurveData], expected: usize| {
            if set.len() == expected {
                Ok(())
            } else {
                Err(Error::ChannelCountMismatch {
                    expected,
                    actual: set.len(),
                })
            }
        };
        check_set(&self.b_curves, bm_count)?;
        if let Some(set) = &self.m_curves {
            check_set(set, bm_count)?;
        }
        if let Some(set) = &self.a_curves {
            check_set(set, a_count)?;
        }

        if self.matrix.is_some() && (bm_count != 3 || self.m_curves.is_none()) {
            return Err(Error::invalid(
                "lut matrix needs 3 channels and M curves",
            ));
        }
        if let Some(clut) = &self.clut {
            if self.a_curves.is_none() {
                return Err(Error::invalid("lut CLUT needs A curves"));
            }
            if clut.grid.len() != inputs || clut.grid.iter().any(|&g| g < 2) {
                return Err(Error::invalid(format!(
                    "CLUT grid {:?} does not fit {inputs} inputs",
                    clut.grid
                )));
            }
            let nodes: usize = clut.grid.iter().map(|&g| g as usize).product();
            if clut.data.len() != nodes * outputs {
                return Err(Error::invalid(format!(
                    "CLUT holds {} values, grid needs {}",
                    clut.data.len(),
                    nodes * outputs
                )));
            }
        } else if inputs != outputs {
            return Err(Error::invalid(
                "lut without CLUT must keep the channel count",
            ));
        }
        Ok(())
    }
}

fn parse_curve_set(
    tag: &[u8],
    offset: usize,
    count: usize,
) -> std::result::Result<Vec<CurveData>, IccError> {
    let mut curves = Vec::with_capacity(count);
    let mut pos = offset;
    for _ in 0..count {
        let (curve, end) = CurveData::parse_at(tag, pos)?;
        curves.push(curve);
        pos = end.next_multiple_of(4);
    }
    Ok(curves)
}

fn write_curve_set(curves: &[CurveData], out: &mut Vec<u8>) -> Result<()> {
    for curve in curves {
        curve.write(out)?;
        pad_to_word(out);
    }
    Ok(())
}
