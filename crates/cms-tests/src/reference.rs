//! Reference implementation wrappers
//!
//! lcms2 and moxcms re-parse emitted profiles; lcms2 also converts device
//! values to PCS XYZ as a numeric reference.

use anyhow::anyhow;

/// Parse profile bytes with lcms2
pub fn parse_lcms2(data: &[u8]) -> anyhow::Result<lcms2::Profile> {
    lcms2::Profile::new_icc(data).map_err(|e| anyhow!("lcms2 profile: {e}"))
}

/// Parse profile bytes with moxcms
pub fn parse_moxcms(data: &[u8]) -> anyhow::Result<moxcms::ColorProfile> {
    moxcms::ColorProfile::new_from_slice(data).map_err(|e| anyhow!("moxcms profile: {e:?}"))
}

/// RGB (0..1) to PCS XYZ through an RGB input profile, relative colorimetric
pub fn lcms2_rgb_to_xyz(profile_data: &[u8], rgb: &[[f64; 3]]) -> anyhow::Result<Vec<[f64; 3]>> {
    use lcms2::{Intent, PixelFormat, Profile, Transform};

    let src = parse_lcms2(profile_data)?;
    let xyz = Profile::new_xyz();

    let transform = Transform::<[f64; 3], [f64; 3]>::new(
        &src,
        PixelFormat::RGB_DBL,
        &xyz,
        PixelFormat::XYZ_DBL,
        Intent::RelativeColorimetric,
    )
    .map_err(|e| anyhow!("lcms2 transform: {e}"))?;

    let mut out = vec![[0.0; 3]; rgb.len()];
    transform.transform_pixels(rgb, &mut out);
    Ok(out)
}
