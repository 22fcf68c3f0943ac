//! # ciecms - CIE-based color management core
//!
//! Builds ICC v4 profiles from page-description color spaces and runs
//! cached pixel transforms through lut chains.
//!
//! ## Pieces
//!
//! - [`builder`]: CalGray, CalRGB, Lab, CIEBasedA/ABC/DEF/DEFG and color
//!   rendering dictionaries → [`Profile`]
//! - [`icc`]: profile model, serialization and parsing
//! - [`pipeline`]: [`LutChain`] (curves, matrix and CLUT stages), device
//!   links and gamut checking
//! - [`transform`]: pixel formats, pack/unpack strategies and the
//!   [`TransformEvaluator`] with its single-entry cache
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use ciecms_core::{
//!     BuilderOptions, ColorSpaceDescriptor, Direction, EvaluatorOptions, LutChain, Matrix3x3,
//!     PixelFormat, ProfileBuilder, RenderingDictionary, TransformCache, TransformEvaluator, D50,
//! };
//!
//! let builder = ProfileBuilder::new(BuilderOptions::default())?;
//! let source = builder.build(&ColorSpaceDescriptor::CalRgb {
//!     white_point: D50,
//!     black_point: [0.0; 3],
//!     gamma: [2.2; 3],
//!     matrix: Matrix3x3::identity(),
//! })?;
//! let device = builder.build_from_rendering_dict(&RenderingDictionary::default())?;
//!
//! let link = LutChain::link(
//!     &LutChain::from_profile(&source, Direction::Input)?,
//!     &LutChain::from_profile(&device, Direction::Output)?,
//! )?;
//! let eval = TransformEvaluator::new(
//!     Arc::new(link),
//!     PixelFormat::rgb8(),
//!     PixelFormat::rgb8(),
//!     EvaluatorOptions::default(),
//! )?;
//!
//! let src = [255u8, 128, 64];
//! let mut dst = [0u8; 3];
//! eval.run(&src, &mut dst, 1, &mut TransformCache::new())?;
//! # Ok::<(), ciecms_core::Error>(())
//! ```

pub mod builder;
pub mod color;
pub mod error;
pub mod icc;
pub mod math;
pub mod pipeline;
pub mod transform;

pub use builder::{
    BuilderOptions, CieBasedA, CieBasedAbc, CieBasedDef, CieBasedDefg, CieLmn,
    ColorSpaceDescriptor, ComponentRange, ProfileBuilder, RenderTable, RenderingDictionary,
    SampledCurve, SampledTable, UNIT_RANGE,
};
pub use color::{D50, D65, Pcs, XYZ_ENCODING_SCALE};
pub use error::{Error, Result};
pub use icc::{IccError, Profile};
pub use math::{Interpolation, Matrix3x3};
pub use pipeline::{Direction, GamutChecker, LutChain, Stage};
pub use transform::{
    EvaluatorOptions, PixelFormat, RunStats, SharedCache, TransformCache, TransformEvaluator,
};

/// Version of ciecms
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
