//! Out-of-gamut detection

use std::sync::Arc;

use super::chain::LutChain;
use super::from_profile::lut_stages;
use crate::color::Pcs;
use crate::error::{Error, Result};
use crate::icc::{ColorSpace, LutKind, Profile, TagData, TagSignature, encode_u16};
use crate::math::MAX_GRID_INPUTS;

/// Reduced chain with a single output: non-zero means out of gamut
///
/// The alarm color replaces the transform result of flagged pixels.
#[derive(Debug, Clone)]
pub struct GamutChecker {
    chain: Arc<LutChain>,
    alarm: Vec<u16>,
}

impl GamutChecker {
    /// `alarm` holds one component in [0, 1] per destination channel
    pub fn new(chain: Arc<LutChain>, alarm: &[f64]) -> Result<Self> {
        if chain.output_channels() != 1 {
            return Err(Error::ChannelCountMismatch {
                expected: 1,
                actual: chain.output_channels(),
            });
        }
        if alarm.is_empty() || alarm.len() > MAX_GRID_INPUTS {
            return Err(Error::invalid(format!(
                "alarm color with {} components",
                alarm.len()
            )));
        }
        let alarm = alarm
            .iter()
            .map(|&v| encode_u16(v))
            .collect::<Result<Vec<u16>>>()?;
        Ok(Self { chain, alarm })
    }

    /// Checker for the `gamt` tag of an output profile, fed by `input`
    /// (a device-to-PCS chain)
    pub fn from_gamut_tag(input: &LutChain, output: &Profile, alarm: &[f64]) -> Result<Self> {
        let lut = output
            .tag(TagSignature::GAMUT)
            .and_then(TagData::as_lut)
            .filter(|lut| lut.kind == LutKind::BToA)
            .ok_or_else(|| Error::unsupported("profile has no gamt lut"))?;
        let pcs = match output.pcs() {
            ColorSpace::Xyz => Pcs::Xyz,
            ColorSpace::Lab => Pcs::Lab,
            other => {
                return Err(Error::unsupported(format!(
                    "{other:?} is not a connection space"
                )));
            }
        };
        let gamut = LutChain::new(lut_stages(lut, Some(pcs))?)?.with_pcs(Some(pcs));
        let chain = LutChain::link(input, &gamut)?;
        Self::new(Arc::new(chain), alarm)
    }

    pub fn input_channels(&self) -> usize {
        self.chain.input_channels()
    }

    /// Alarm color in the 16-bit internal format
    pub fn alarm(&self) -> &[u16] {
        &self.alarm
    }

    /// True when the checker's output, quantized to 16 bits, is non-zero
    pub fn check(&self, input: &[u16]) -> bool {
        let mut values = [0.0f64; MAX_GRID_INPUTS + 1];
        let n = self.chain.input_channels().min(input.len());
        for (v, &raw) in values.iter_mut().zip(&input[..n]) {
            *v = raw as f64 / 65535.0;
        }
        let mut flag = [0.0f64];
        self.chain.eval_into(&values, &mut flag);
        (flag[0].clamp(0.0, 1.0) * 65535.0).round() as u16 != 0
    }
}
