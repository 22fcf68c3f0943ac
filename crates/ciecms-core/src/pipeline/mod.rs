//! Lut chains
//!
//! A [`LutChain`] is an immutable list of stages evaluated in order:
//! - Curves: one 1-D transfer per channel, domain clamped to [0, 1]
//! - Matrix: 3x3 plus offset, unclamped
//! - CLUT: k-input table, multilinear (or tetrahedral for 3 inputs)
//!
//! Chains come from profiles ([`LutChain::from_profile`]) and compose into
//! device links ([`LutChain::link`]). Connection-space values inside a
//! chain are unencoded XYZ or v4 normalized Lab.

mod chain;
mod from_profile;
mod gamut;
mod stages;

pub use chain::{LutChain, MAX_CHANNELS, PCS_CONVERSION_GRID};
pub use from_profile::Direction;
pub use gamut::GamutChecker;
pub use stages::{Clut, Curve, MatrixStage, Stage};
