//! Lut chain: an immutable, ordered list of stages

use super::stages::{Clut, Curve, MatrixStage, Stage};
use crate::color::{Lab, Pcs, XYZ_ENCODING_SCALE, decode_lab, encode_lab};
use crate::error::{Error, Result, try_zeroed};
use crate::math::{Interpolation, MAX_GRID_INPUTS, Matrix3x3};

/// Largest channel count a chain end or stage may have
pub const MAX_CHANNELS: usize = 15;

/// Nodes per axis of the XYZ <-> Lab conversion table inserted by [`LutChain::link`]
pub const PCS_CONVERSION_GRID: usize = 33;

/// Ordered stages from `input_channels` to `output_channels`
///
/// A chain always has at least one stage and each stage consumes what the
/// previous one produced. `pcs` names the connection space at the chain's
/// PCS end, if it has one: the output of a device-to-PCS chain, the input of
/// a PCS-to-device chain.
#[derive(Debug, Clone, PartialEq)]
pub struct LutChain {
    input_channels: usize,
    output_channels: usize,
    stages: Vec<Stage>,
    pcs: Option<Pcs>,
    interpolation: Interpolation,
}

impl LutChain {
    pub fn new(stages: Vec<Stage>) -> Result<Self> {
        let Some(first) = stages.first() else {
            return Err(Error::invalid("lut chain without stages"));
        };
        let input_channels = first.input_channels();
        let mut channels = input_channels;
        for stage in &stages {
            if stage.input_channels() != channels {
                return Err(Error::ChannelCountMismatch {
                    expected: channels,
                    actual: stage.input_channels(),
                });
            }
            channels = stage.output_channels();
            if !(1..=MAX_CHANNELS).contains(&channels) {
                return Err(Error::invalid(format!("stage with {channels} channels")));
            }
        }
        if !(1..=MAX_CHANNELS).contains(&input_channels) {
            return Err(Error::invalid(format!("chain with {input_channels} inputs")));
        }
        Ok(Self {
            input_channels,
            output_channels: channels,
            stages,
            pcs: None,
            interpolation: Interpolation::default(),
        })
    }

    /// `n` identity curves
    pub fn identity(n: usize) -> Result<Self> {
        Self::new(vec![Stage::Curves(vec![Curve::Identity; n])])
    }

    pub fn with_pcs(mut self, pcs: Option<Pcs>) -> Self {
        self.pcs = pcs;
        self
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn input_channels(&self) -> usize {
        self.input_channels
    }

    pub fn output_channels(&self) -> usize {
        self.output_channels
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn pcs(&self) -> Option<Pcs> {
        self.pcs
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// True when the whole chain is one CLUT
    pub fn is_single_clut(&self) -> bool {
        self.single_clut().is_some()
    }

    pub(crate) fn single_clut(&self) -> Option<&Clut> {
        match self.stages.as_slice() {
            [Stage::Clut(clut)] => Some(clut),
            _ => None,
        }
    }

    /// Run every stage on `input`, writing `output_channels` values
    pub fn evaluate(&self, input: &[f64], output: &mut [f64]) -> Result<()> {
        if input.len() < self.input_channels {
            return Err(Error::ChannelCountMismatch {
                expected: self.input_channels,
                actual: input.len(),
            });
        }
        if output.len() < self.output_channels {
            return Err(Error::ChannelCountMismatch {
                expected: self.output_channels,
                actual: output.len(),
            });
        }
        self.eval_into(input, output);
        Ok(())
    }

    /// [`evaluate`](Self::evaluate) without length checks
    #[inline]
    pub(crate) fn eval_into(&self, input: &[f64], output: &mut [f64]) {
        let mut a = [0.0f64; MAX_GRID_INPUTS + 1];
        let mut b = [0.0f64; MAX_GRID_INPUTS + 1];
        a[..self.input_channels].copy_from_slice(&input[..self.input_channels]);

        let mut width = self.input_channels;
        for stage in &self.stages {
            let out_width = stage.output_channels();
            stage.apply(&a[..width], &mut b[..out_width], self.interpolation);
            std::mem::swap(&mut a, &mut b);
            width = out_width;
        }
        output[..width].copy_from_slice(&a[..width]);
    }

    /// Device link: `first` followed by `second`
    ///
    /// When `first` ends in one connection space and `second` starts in the
    /// other, a sampled XYZ <-> Lab conversion is inserted between them.
    pub fn link(first: &LutChain, second: &LutChain) -> Result<LutChain> {
        let mut stages = first.stages.clone();
        match (first.pcs, second.pcs) {
            (Some(Pcs::Xyz), Some(Pcs::Lab)) => stages.extend(xyz_to_lab_stages()?),
            (Some(Pcs::Lab), Some(Pcs::Xyz)) => stages.extend(lab_to_xyz_stages()?),
            _ => {}
        }
        if stages_output(&stages) != second.input_channels {
            return Err(Error::ChannelCountMismatch {
                expected: stages_output(&stages),
                actual: second.input_channels,
            });
        }
        stages.extend(second.stages.iter().cloned());

        let chain = Self::new(stages)?.with_interpolation(first.interpolation);
        tracing::debug!(
            inputs = chain.input_channels,
            outputs = chain.output_channels,
            stages = chain.stages.len(),
            "linked chains"
        );
        Ok(chain)
    }
}

fn stages_output(stages: &[Stage]) -> usize {
    stages.last().map_or(0, Stage::output_channels)
}

/// Sample `f` on a cube of `PCS_CONVERSION_GRID` nodes per axis
fn conversion_clut(f: impl Fn([f64; 3]) -> [f64; 3]) -> Result<Clut> {
    let n = PCS_CONVERSION_GRID;
    let mut data = try_zeroed::<f64>(n * n * n * 3)?;
    let step = (n - 1) as f64;
    for (node, out) in data.chunks_exact_mut(3).enumerate() {
        let c = [
            (node / (n * n)) as f64 / step,
            (node / n % n) as f64 / step,
            (node % n) as f64 / step,
        ];
        for (o, v) in out.iter_mut().zip(f(c)) {
            *o = v.clamp(0.0, 1.0);
        }
    }
    Clut::new(vec![n; 3], 3, data)
}

/// XYZ (up to the lut encoding range) → v4 Lab
fn xyz_to_lab_stages() -> Result<[Stage; 2]> {
    let clut = conversion_clut(|c| encode_lab(Lab::from_xyz(c.map(|v| v * XYZ_ENCODING_SCALE))))?;
    let scale = 1.0 / XYZ_ENCODING_SCALE;
    Ok([
        Stage::Matrix(MatrixStage::new(Matrix3x3::diagonal(scale, scale, scale))),
        Stage::Clut(clut),
    ])
}

/// v4 Lab → XYZ
fn lab_to_xyz_stages() -> Result<[Stage; 2]> {
    let clut = conversion_clut(|c| decode_lab(c).to_xyz().map(|v| v / XYZ_ENCODING_SCALE))?;
    let scale = XYZ_ENCODING_SCALE;
    Ok([
        Stage::Clut(clut),
        Stage::Matrix(MatrixStage::new(Matrix3x3::diagonal(scale, scale, scale))),
    ])
}
