//! CalGray and CalRGB as v4 matrix/TRC input profiles

use super::descriptor::{validate_matrix, validate_points};
use super::{ColorSpaceDescriptor, ProfileBuilder, unsupported};
use crate::color::D50;
use crate::error::{Error, Result};
use crate::icc::{
    ColorSpace, CurveData, Profile, ProfileClass, TagData, TagSignature, U8Fixed8, XyzTagData,
};
use crate::math::cat02_matrix;

impl ProfileBuilder {
    /// CalGray → `kTRC` gamma
    pub fn build_from_cal_gray(&self, descriptor: &ColorSpaceDescriptor) -> Result<Profile> {
        let ColorSpaceDescriptor::CalGray {
            white_point,
            black_point,
            gamma,
        } = descriptor
        else {
            return Err(unsupported("build_from_cal_gray", descriptor));
        };
        validate_points(white_point, black_point)?;
        let trc = gamma_curve(*gamma)?;

        let family = descriptor.family();
        let mut profile = self.start(
            family,
            ProfileClass::Input,
            ColorSpace::Gray,
            ColorSpace::Xyz,
            *white_point,
            *black_point,
        )?;
        profile.add_tag(TagSignature::GRAY_TRC, TagData::Curve(trc))?;
        self.finish(profile, family)
    }

    /// CalRGB → D50-adapted colorants plus per-channel gamma
    pub fn build_from_cal_rgb(&self, descriptor: &ColorSpaceDescriptor) -> Result<Profile> {
        let ColorSpaceDescriptor::CalRgb {
            white_point,
            black_point,
            gamma,
            matrix,
        } = descriptor
        else {
            return Err(unsupported("build_from_cal_rgb", descriptor));
        };
        validate_points(white_point, black_point)?;
        validate_matrix("Matrix", matrix)?;
        let trcs = [
            gamma_curve(gamma[0])?,
            gamma_curve(gamma[1])?,
            gamma_curve(gamma[2])?,
        ];

        let cat = cat02_matrix(*white_point, D50);
        let family = descriptor.family();
        let mut profile = self.start(
            family,
            ProfileClass::Input,
            ColorSpace::Rgb,
            ColorSpace::Xyz,
            *white_point,
            *black_point,
        )?;

        let colorants = [
            TagSignature::RED_COLORANT,
            TagSignature::GREEN_COLORANT,
            TagSignature::BLUE_COLORANT,
        ];
        for (sig, primary) in colorants.into_iter().zip(matrix.m) {
            let xyz = XyzTagData::from_xyz(cat.multiply_vec(primary))?;
            profile.add_tag(sig, TagData::Xyz(xyz))?;
        }

        let trc_tags = [
            TagSignature::RED_TRC,
            TagSignature::GREEN_TRC,
            TagSignature::BLUE_TRC,
        ];
        for (sig, trc) in trc_tags.into_iter().zip(trcs) {
            profile.add_tag(sig, TagData::Curve(trc))?;
        }

        self.finish(profile, family)
    }
}

/// `curv` gamma, quantized to u8Fixed8
fn gamma_curve(gamma: f64) -> Result<CurveData> {
    if !gamma.is_finite() || gamma <= 0.0 {
        return Err(Error::invalid(format!("gamma {gamma} must be finite and positive")));
    }
    let q = U8Fixed8::from_f64(gamma)?;
    if q.0 == 0 {
        return Err(Error::invalid(format!("gamma {gamma} rounds to zero")));
    }
    Ok(CurveData::Gamma(q.to_f64()))
}
