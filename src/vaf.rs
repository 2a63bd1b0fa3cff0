//! Purity-corrected variant allele fraction estimation.
//!
//! Thin orchestration over the contingency-table deconvolver: subtract the
//! host-attributed reads from both margins of each site's counts, then form
//! the tumour-only allele fraction.

use crate::{contingency, math, model::SampleParams, util::Result};
use ndarray::{Array1, ArrayView1, Zip};

/// Estimates, for every site, the variant allele fraction the sample would
/// show if it contained no host-derived reads.
///
/// Corrected counts within [`math::ZERO_TOL`] of zero are snapped to exactly
/// zero before the final division, so sign and precision artifacts cannot
/// leak into the ratio. Sites with no remaining tumour reads yield a VAF of
/// 0. Every returned value is finite and in `[0, 1]`, regardless of
/// degenerate per-site data (zero depths, NaN intermediates).
///
/// # Errors
///
/// Fails when the five site vectors disagree in length. Scalar contract
/// violations are unrepresentable here: they are rejected when constructing
/// [`SampleParams`].
pub fn estimate_tumour_vaf(
    total_depth: ArrayView1<f64>,
    alt_depth: ArrayView1<f64>,
    logr: ArrayView1<f64>,
    host_total_depth: ArrayView1<f64>,
    host_alt_depth: ArrayView1<f64>,
    params: &SampleParams,
) -> Result<Array1<f64>> {
    let estimate = contingency::estimate_contingency_table(
        total_depth,
        alt_depth,
        logr,
        host_total_depth,
        host_alt_depth,
        params,
    )?;

    let mut tumour_alt_reads = &alt_depth - &estimate.host_alt_reads;
    let mut tumour_total_reads = &total_depth - &estimate.host_reads;
    tumour_alt_reads.mapv_inplace(math::snap_to_zero);
    tumour_total_reads.mapv_inplace(math::snap_to_zero);

    let vaf = Zip::from(&tumour_alt_reads)
        .and(&tumour_total_reads)
        .map_collect(|&alt, &total| math::clamp_unit(math::safe_div(alt, total)));
    Ok(vaf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_corrected_vaf() {
        // 40 of 100 reads are attributed to the host and carry no alt
        // allele, leaving 30 alt reads out of 60 tumour reads.
        let params = SampleParams::new(0.6, 2.0, 2.0).unwrap();
        let vaf = estimate_tumour_vaf(
            array![100.0].view(),
            array![30.0].view(),
            array![0.0].view(),
            array![100.0].view(),
            array![0.0].view(),
            &params,
        )
        .unwrap();
        assert_abs_diff_eq!(vaf[0], 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_depth_site_yields_zero() {
        let params = SampleParams::new(0.6, 2.0, 2.0).unwrap();
        let vaf = estimate_tumour_vaf(
            array![0.0].view(),
            array![0.0].view(),
            array![0.0].view(),
            array![100.0].view(),
            array![20.0].view(),
            &params,
        )
        .unwrap();
        assert_eq!(vaf[0], 0.0);
    }

    #[test]
    fn test_pure_tumour_keeps_raw_vaf() {
        let params = SampleParams::new(1.0, 2.0, 2.0).unwrap();
        let vaf = estimate_tumour_vaf(
            array![80.0].view(),
            array![20.0].view(),
            array![0.4].view(),
            array![100.0].view(),
            array![50.0].view(),
            &params,
        )
        .unwrap();
        assert_abs_diff_eq!(vaf[0], 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_full_host_contamination_trends_to_zero() {
        // All reads attributed to the host, with the host sample showing the
        // same allele fraction as the mixed sample: nothing is left for the
        // tumour.
        let params = SampleParams::new(0.0, 2.0, 2.0).unwrap();
        let vaf = estimate_tumour_vaf(
            array![100.0].view(),
            array![30.0].view(),
            array![0.0].view(),
            array![100.0].view(),
            array![30.0].view(),
            &params,
        )
        .unwrap();
        assert_eq!(vaf[0], 0.0);
    }

    #[test]
    fn test_out_of_range_naive_vaf_is_pinned_to_one() {
        let params = SampleParams::new(0.6, 2.0, 2.0).unwrap();
        let vaf = estimate_tumour_vaf(
            array![100.0].view(),
            array![90.0].view(),
            array![0.0].view(),
            array![100.0].view(),
            array![0.0].view(),
            &params,
        )
        .unwrap();
        assert_abs_diff_eq!(vaf[0], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_nan_logr_resolves_to_zero() {
        let params = SampleParams::new(0.6, 2.0, 2.0).unwrap();
        let vaf = estimate_tumour_vaf(
            array![100.0].view(),
            array![30.0].view(),
            array![f64::NAN].view(),
            array![100.0].view(),
            array![0.0].view(),
            &params,
        )
        .unwrap();
        assert_eq!(vaf[0], 0.0);
    }

    #[test]
    fn test_outputs_are_bounded() {
        let params = SampleParams::new(0.4, 3.0, 2.0).unwrap();
        let vaf = estimate_tumour_vaf(
            array![100.0, 0.0, 10.0, 250.0, 33.0].view(),
            array![100.0, 0.0, 0.0, 3.0, 33.0].view(),
            array![-2.0, 0.0, 1.5, -0.3, 0.0].view(),
            array![50.0, 0.0, 80.0, 120.0, 10.0].view(),
            array![50.0, 0.0, 40.0, 0.0, 10.0].view(),
            &params,
        )
        .unwrap();
        for &v in vaf.iter() {
            assert!((0.0..=1.0).contains(&v), "VAF out of bounds: {}", v);
        }
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        let params = SampleParams::new(0.6, 2.0, 2.0).unwrap();
        let result = estimate_tumour_vaf(
            array![100.0].view(),
            array![30.0].view(),
            array![0.0].view(),
            array![100.0, 1.0].view(),
            array![0.0].view(),
            &params,
        );
        assert!(result.is_err());
    }
}
