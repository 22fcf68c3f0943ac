//! Mathematical operations for color management
//!
//! - 3x3 matrix operations
//! - CAT02 chromatic adaptation
//! - Interpolation for curve and CLUT evaluation

pub mod chromatic_adaptation;
pub mod interpolation;
pub mod matrix;

pub use chromatic_adaptation::{adapt_xyz, cat02_matrix};
pub use interpolation::{
    Interpolation, MAX_GRID_INPUTS, interpolate_multilinear, interpolate_tetrahedral, lut1d_interp,
};
pub use matrix::Matrix3x3;
