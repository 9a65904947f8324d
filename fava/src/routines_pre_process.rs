use crate::fava_common::*;
use matrix_util::traits::MatOps;

/// Guards the min-max denominator of constant rows
pub const MIN_MAX_EPS: f32 = 1e-8;

pub struct NormalizedData {
    pub mat: Mat,
    pub log2_applied: bool,
}

/// Normalize each entity's profile onto `[0, 1]`
///
/// 1. `log2(1 + x)` if requested and no value is negative
/// 2. `(x - min) / (max - min + eps)` within each row
/// 3. NaN or infinite values become zero
///
/// * `x` - entities x samples
/// * `log2_normalization` - whether to try the log transformation
pub fn normalize_expression(x: &Mat, log2_normalization: bool) -> NormalizedData {
    let mut mat = x.clone();

    let log2_applied = if !log2_normalization {
        info!("log2 normalization is not requested");
        false
    } else if mat.any_negative() {
        warn!("Negative values are detected, so log2 normalization is not applied.");
        false
    } else {
        mat.log2_1p_inplace();
        info!("log2 normalization is applied.");
        true
    };

    mat.minmax_rows_inplace(MIN_MAX_EPS);

    let nreplaced = mat.finite_or_zero_inplace();
    if nreplaced > 0 {
        warn!("{} non-finite values were replaced with zero", nreplaced);
    }

    NormalizedData { mat, log2_applied }
}
