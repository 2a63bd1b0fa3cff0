//! Host-read-probability estimation.
//!
//! In a host-contaminated sample, a read observed at a site can originate
//! from the tumour or from the contaminating host tissue. Given the site's
//! copy-number log-ratio and the sample's purity and ploidies, the expected
//! host-derived fraction of the reads has a closed form.

use crate::{math, model::SampleParams};
use ndarray::{Array1, ArrayView1};

/// Computes, for each site, the probability that an observed read came from
/// host tissue rather than tumour tissue.
///
/// The tumour-read probability at a site with log-ratio `r` is
/// `(d - c) / d`, with `d = 2^r * (purity*ploidy + (1-purity)*host_ploidy)`
/// and `c = host_ploidy * (1-purity)`; the host probability is its
/// complement. The tumour probability is clamped to `[0, 1]` before
/// complementing, which guards against floating-point overshoot when `2^r`
/// underflows or the terms nearly cancel. A NaN log-ratio yields a NaN
/// probability; the downstream deconvolution resolves it to a defined VAF.
///
/// # Arguments
///
/// * `logr` - Per-site log2 depth ratios; any real value, including large
///   magnitudes reflecting copy-number loss or gain.
/// * `params` - Validated scalar sample context.
pub fn prob_read_came_from_host(logr: ArrayView1<f64>, params: &SampleParams) -> Array1<f64> {
    let purity = params.purity();
    let mixture_copies = purity * params.ploidy() + (1.0 - purity) * params.host_ploidy();
    let host_copies = params.host_ploidy() * (1.0 - purity);
    logr.mapv(|r| {
        let denom = r.exp2() * mixture_copies;
        let p_tumour = math::clamp_unit((denom - host_copies) / denom);
        1.0 - p_tumour
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_balanced_site() {
        // logr = 0 with purity 0.6 and both ploidies 2: denominator is 2,
        // p_tumour = (2 - 0.8) / 2 = 0.6, so p_host = 0.4.
        let params = SampleParams::new(0.6, 2.0, 2.0).unwrap();
        let p_host = prob_read_came_from_host(array![0.0].view(), &params);
        assert_abs_diff_eq!(p_host[0], 0.4, epsilon = 1e-12);
    }

    #[test]
    fn test_pure_tumour_has_no_host_reads() {
        let params = SampleParams::new(1.0, 2.0, 2.0).unwrap();
        let p_host = prob_read_came_from_host(array![-2.0, -0.5, 0.0, 0.5, 2.0].view(), &params);
        for &p in p_host.iter() {
            assert_eq!(p, 0.0);
        }
    }

    #[test]
    fn test_pure_host_at_neutral_copy_number() {
        let params = SampleParams::new(0.0, 2.0, 2.0).unwrap();
        let p_host = prob_read_came_from_host(array![0.0].view(), &params);
        assert_abs_diff_eq!(p_host[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_deep_loss_clamps_to_host() {
        // 2^logr underflows to zero; the raw tumour probability is -inf and
        // must clamp to 0 rather than escape the unit interval.
        let params = SampleParams::new(0.6, 2.0, 2.0).unwrap();
        let p_host = prob_read_came_from_host(array![-2000.0].view(), &params);
        assert_eq!(p_host[0], 1.0);
    }

    #[test]
    fn test_probability_is_bounded() {
        let params = SampleParams::new(0.3, 3.2, 2.0).unwrap();
        let logr = array![-30.0, -4.0, -1.0, -0.1, 0.0, 0.1, 1.0, 4.0, 30.0];
        let p_host = prob_read_came_from_host(logr.view(), &params);
        for &p in p_host.iter() {
            assert!((0.0..=1.0).contains(&p), "p_host out of bounds: {}", p);
        }
    }

    #[test]
    fn test_nan_logr_propagates() {
        let params = SampleParams::new(0.6, 2.0, 2.0).unwrap();
        let p_host = prob_read_came_from_host(array![f64::NAN].view(), &params);
        assert!(p_host[0].is_nan());
    }
}
