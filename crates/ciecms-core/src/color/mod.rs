//! White points and profile connection space encodings
//!
//! Chains carry PCS values as follows:
//! - XYZ: unencoded, the D50 white has Y = 1.0
//! - Lab: ICC v4 normalized encoding, L/100, (a+128)/255, (b+128)/255

pub mod lab;

pub use lab::{Lab, decode_lab, encode_lab};

/// D50 as stored in ICC headers and `wtpt` tags (ICC.1:2022 7.2.16)
pub const D50: [f64; 3] = [0.9642, 1.0, 0.8249];

/// D65, used by tests and callers describing sRGB-like sources
pub const D65: [f64; 3] = [0.9505, 1.0, 1.0890];

/// Largest XYZ component representable by 16-bit PCS values in lut tags
///
/// `lutAtoBType` and `lutBtoAType` store XYZ as `value / XYZ_ENCODING_SCALE`
/// so that 0xFFFF means 1 + 32767/32768.
pub const XYZ_ENCODING_SCALE: f64 = 1.0 + 32767.0 / 32768.0;

/// Profile connection space of a chain end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pcs {
    Xyz,
    Lab,
}

/// White point invariant shared by every CIE-based descriptor
pub(crate) fn white_point_is_valid(wp: &[f64; 3]) -> bool {
    wp.iter().all(|v| v.is_finite()) && wp[0] > 0.0 && wp[1] > 0.0 && wp[2] > 0.0
}
