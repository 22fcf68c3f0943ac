//! Lab as an abstract Lab → Lab profile

use super::descriptor::validate_points;
use super::{ColorSpaceDescriptor, ProfileBuilder, lut_matrix, unsupported};
use crate::error::{Error, Result};
use crate::icc::{
    ColorSpace, CurveData, LutData, LutKind, Profile, ProfileClass, TagData, TagSignature,
};
use crate::math::Matrix3x3;

impl ProfileBuilder {
    /// Lab with a/b range → `spac` profile whose `A2B0` rescales the
    /// source range into the v4 Lab encoding
    pub fn build_from_lab(&self, descriptor: &ColorSpaceDescriptor) -> Result<Profile> {
        let ColorSpaceDescriptor::Lab {
            white_point,
            black_point,
            range,
        } = descriptor
        else {
            return Err(unsupported("build_from_lab", descriptor));
        };
        validate_points(white_point, black_point)?;
        let [amin, amax, bmin, bmax] = *range;
        if range.iter().any(|v| !v.is_finite()) || amin >= amax || bmin >= bmax {
            return Err(Error::invalid(format!(
                "Lab range {range:?} must be finite with min < max"
            )));
        }

        // Source components are normalized over their range; a* and b*
        // are encoded as (v + 128) / 255
        let matrix = Matrix3x3::diagonal(1.0, (amax - amin) / 255.0, (bmax - bmin) / 255.0);
        let offset = [0.0, (amin + 128.0) / 255.0, (bmin + 128.0) / 255.0];

        let lut = LutData {
            kind: LutKind::AToB,
            input_channels: 3,
            output_channels: 3,
            a_curves: None,
            clut: None,
            m_curves: Some(vec![CurveData::Identity; 3]),
            matrix: Some(lut_matrix(matrix, offset)?),
            b_curves: vec![CurveData::Identity; 3],
        };

        let family = descriptor.family();
        let mut profile = self.start(
            family,
            ProfileClass::Abstract,
            ColorSpace::Lab,
            ColorSpace::Lab,
            *white_point,
            *black_point,
        )?;
        profile.add_tag(TagSignature::A2B0, TagData::Lut(lut))?;
        self.finish(profile, family)
    }
}
