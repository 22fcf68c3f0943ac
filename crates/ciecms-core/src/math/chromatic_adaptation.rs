//! Chromatic adaptation
//!
//! CIE-based sources are described relative to their own white point while
//! the profile connection space is D50. White points are mapped with a von
//! Kries scaling in the CAT02 cone space.
//!
//! References:
//! - CIE 159:2004 (CIECAM02)
//! - ICC.1:2022 Annex E

use crate::math::Matrix3x3;

/// CAT02: XYZ → LMS
pub const CAT02_XYZ_TO_LMS: Matrix3x3 = Matrix3x3::new([
    [0.7328, 0.4296, -0.1624],
    [-0.7036, 1.6975, 0.0061],
    [0.0030, 0.0136, 0.9834],
]);

/// Adaptation from `src_white` to `dst_white`
///
/// Returns the exact identity when both whites are equal, so D50 sources
/// pass through without rounding noise.
pub fn cat02_matrix(src_white: [f64; 3], dst_white: [f64; 3]) -> Matrix3x3 {
    if src_white == dst_white {
        return Matrix3x3::identity();
    }

    let Some(lms_to_xyz) = CAT02_XYZ_TO_LMS.inverse() else {
        return Matrix3x3::identity();
    };

    let src = CAT02_XYZ_TO_LMS.multiply_vec(src_white);
    let dst = CAT02_XYZ_TO_LMS.multiply_vec(dst_white);
    let von_kries = Matrix3x3::diagonal(dst[0] / src[0], dst[1] / src[1], dst[2] / src[2]);

    lms_to_xyz * von_kries * CAT02_XYZ_TO_LMS
}

/// Adapt a single XYZ value
pub fn adapt_xyz(xyz: [f64; 3], src_white: [f64; 3], dst_white: [f64; 3]) -> [f64; 3] {
    cat02_matrix(src_white, dst_white).multiply_vec(xyz)
}
