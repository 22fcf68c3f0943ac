//! Rendering dictionary as a `B2A0` output profile
//!
//! `mBA` evaluates B → matrix → M → CLUT → A. The PCS side takes the
//! encoded XYZ, the matrix undoes the encoding, adapts D50 to the CRD
//! white and applies MatrixLMN; EncodeLMN becomes the M curves. MatrixABC,
//! EncodeABC and the render table are not separable, so they are sampled
//! together into the CLUT.

use super::{ProfileBuilder, RenderingDictionary, lut_matrix};
use crate::color::{D50, XYZ_ENCODING_SCALE};
use crate::error::{Error, Result};
use crate::icc::{
    ColorSpace, CurveData, LutData, LutKind, Profile, ProfileClass, TagData, TagSignature,
};
use crate::math::cat02_matrix;

const FAMILY: &str = "CRD";

impl ProfileBuilder {
    /// Rendering dictionary → `prtr` profile for its device space
    pub fn build_from_rendering_dict(&self, rd: &RenderingDictionary) -> Result<Profile> {
        rd.validate()?;
        let outputs = rd.outputs();
        let device = ColorSpace::for_device_channels(outputs).ok_or_else(|| {
            Error::unsupported(format!("no device space with {outputs} channels"))
        })?;

        let cat = cat02_matrix(D50, rd.white_point);
        let matrix = (rd.matrix_lmn.transpose() * cat).scale(XYZ_ENCODING_SCALE);

        let grid: Vec<usize> = match &rd.render_table {
            Some(rt) => rt
                .table
                .grid
                .iter()
                .map(|&g| g.max(self.options.grid_points))
                .collect(),
            None => vec![self.options.grid_points; 3],
        };
        let clut = self.sample_grid(&grid, outputs, |lmn, out| {
            let abc = rd.encode_abc([lmn[0], lmn[1], lmn[2]]);
            match &rd.render_table {
                Some(rt) => rt.table.eval(&abc, out),
                None => out.copy_from_slice(&abc),
            }
        })?;

        let a_curves = match &rd.render_table {
            Some(rt) => self.curve_set(rt.output_curves.as_deref(), outputs)?,
            None => vec![CurveData::Identity; outputs],
        };

        let lut = LutData {
            kind: LutKind::BToA,
            input_channels: 3,
            output_channels: outputs as u8,
            a_curves: Some(a_curves),
            clut: Some(clut),
            m_curves: Some(self.curve_set(rd.encode_lmn.as_ref().map(|c| &c[..]), 3)?),
            matrix: Some(lut_matrix(matrix, [0.0; 3])?),
            b_curves: vec![CurveData::Identity; 3],
        };
        tracing::debug!(outputs, ?grid, "sampled render table");

        let mut profile = self.start(
            FAMILY,
            ProfileClass::Output,
            device,
            ColorSpace::Xyz,
            rd.white_point,
            rd.black_point,
        )?;
        profile.add_tag(TagSignature::B2A0, TagData::Lut(lut))?;
        self.finish(profile, FAMILY)
    }
}
