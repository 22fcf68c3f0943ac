//! # cms-tests
//!
//! Integration testing for ciecms.
//!
//! This crate provides:
//! - Fixtures covering every source family and rendering dictionaries
//! - Page-like pixel buffers from seeded generators
//! - lcms2 and moxcms wrappers to re-parse emitted profiles
//! - JSON scenario fixtures driving complete transforms
//!
//! ## Reference Implementations
//!
//! - **lcms2**: parses every emitted profile and converts CalRGB values to
//!   PCS XYZ as a numeric reference
//! - **moxcms**: pure Rust parser, second opinion on the profile layout

pub mod fixtures;
pub mod patterns;
pub mod reference;
pub mod scenario;

pub use fixtures::{all_profiles, rendering_dictionaries, source_descriptors};
pub use patterns::{PagePattern, generate_page};
pub use scenario::{Scenario, load_scenarios};
