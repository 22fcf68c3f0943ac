//! JSON scenario fixtures
//!
//! A scenario names a source descriptor, an optional rendering dictionary
//! and the pixel formats of an evaluator, plus input/expected sample pairs.
//! Without a rendering dictionary the source profile's own inverse is the
//! destination.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use ciecms_core::{
    BuilderOptions, ColorSpaceDescriptor, Direction, EvaluatorOptions, LutChain, PixelFormat,
    ProfileBuilder, RenderingDictionary, TransformEvaluator,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub builder: BuilderOptions,
    pub source: ColorSpaceDescriptor,
    #[serde(default)]
    pub rendering: Option<RenderingDictionary>,
    pub src_format: PixelFormat,
    pub dst_format: PixelFormat,
    #[serde(default)]
    pub options: EvaluatorOptions,
    pub cases: Vec<Case>,
}

/// Raw samples in and out, one pixel
#[derive(Debug, Deserialize)]
pub struct Case {
    pub input: Vec<u16>,
    pub expected: Vec<u16>,
    /// Allowed difference per sample
    #[serde(default)]
    pub tolerance: u16,
}

/// Load every scenario of a fixture file
pub fn load_scenarios(path: impl AsRef<Path>) -> anyhow::Result<Vec<Scenario>> {
    let path = path.as_ref();
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

impl Scenario {
    /// Device link from the source to the destination
    pub fn link(&self) -> anyhow::Result<LutChain> {
        let builder = ProfileBuilder::new(self.builder.clone())?;
        let source = builder.build(&self.source)?;
        let input = LutChain::from_profile(&source, Direction::Input)?;
        let output = match &self.rendering {
            Some(rd) => {
                LutChain::from_profile(&builder.build_from_rendering_dict(rd)?, Direction::Output)?
            }
            None => LutChain::from_profile(&source, Direction::Output)?,
        };
        Ok(LutChain::link(&input, &output)?)
    }

    pub fn evaluator(&self) -> anyhow::Result<TransformEvaluator> {
        Ok(TransformEvaluator::new(
            Arc::new(self.link()?),
            self.src_format.clone(),
            self.dst_format.clone(),
            self.options,
        )?)
    }
}

/// Interleaved samples to bytes; 8-bit or native-endian 16-bit
pub fn pack_samples(samples: &[u16], bits: u8) -> anyhow::Result<Vec<u8>> {
    match bits {
        8 => samples
            .iter()
            .map(|&s| u8::try_from(s).context("8-bit sample above 255"))
            .collect(),
        16 => Ok(samples.iter().flat_map(|s| s.to_ne_bytes()).collect()),
        _ => bail!("scenarios use 8 or 16 bit samples, got {bits}"),
    }
}

pub fn unpack_samples(data: &[u8], bits: u8) -> anyhow::Result<Vec<u16>> {
    match bits {
        8 => Ok(data.iter().map(|&b| u16::from(b)).collect()),
        16 => Ok(data
            .chunks_exact(2)
            .map(|c| u16::from_ne_bytes([c[0], c[1]]))
            .collect()),
        _ => bail!("scenarios use 8 or 16 bit samples, got {bits}"),
    }
}
