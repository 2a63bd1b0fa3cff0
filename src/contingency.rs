//! Contingency-table deconvolution of mixed-sample read counts.
//!
//! The reads at a site form a 2x2 table crossing read origin (host or
//! tumour) with allele (ref or alt), whose margins are the observed total
//! and alt depths. Given the margins only two cells are free: the
//! host-derived read count `K` and the host-derived alt read count `L`.
//! This module estimates that pair per site in closed form and repairs
//! estimates that violate the table's non-negativity bounds, switching to a
//! constrained least-squares solution with the offending bound held tight.

use crate::{host, math, model::SampleParams, util::Result};
use anyhow::anyhow;
use ndarray::{Array1, ArrayView1, Zip};

/// Per-site estimate of the host-derived share of the observed reads.
#[derive(Debug, Clone, PartialEq)]
pub struct ContingencyEstimate {
    /// Estimated host-derived read count per site (`K`).
    pub host_reads: Array1<f64>,
    /// Estimated host-derived alt read count per site (`L`).
    pub host_alt_reads: Array1<f64>,
}

/// Estimates the host read split `(K, L)` for every site.
///
/// The unconstrained estimate is `K = T * p_host` and `L = K * hvaf`, where
/// `hvaf` is the allele fraction observed in the host reference sample (0
/// where the host sample has no coverage). Two bound repairs follow, applied
/// per site in order so the second sees the first's result:
///
/// 1. `L > A` (more host alt reads than observed alt reads): refit `K` by
///    least squares with `L = A` held tight.
/// 2. The implied tumour VAF `(A-L)/(T-K)` falls outside `[0, 1]` or is NaN
///    (checked only where `T > 0`): refit both cells jointly, the exact
///    minimizer of the squared deviation from the unconstrained estimate
///    with both bounds active. Its denominator is at least 1 for
///    `hvaf` in `[0, 1]`, so no guard is needed.
///
/// For inputs satisfying the documented preconditions the returned pair
/// satisfies `0 <= L <= A`, `0 <= K <= T`, `K >= L` and `(T-K) >= (A-L)` up
/// to floating-point tolerance.
///
/// # Errors
///
/// Fails when the five site vectors disagree in length.
pub fn estimate_contingency_table(
    total_depth: ArrayView1<f64>,
    alt_depth: ArrayView1<f64>,
    logr: ArrayView1<f64>,
    host_total_depth: ArrayView1<f64>,
    host_alt_depth: ArrayView1<f64>,
    params: &SampleParams,
) -> Result<ContingencyEstimate> {
    let num_sites = total_depth.len();
    let lens = [
        alt_depth.len(),
        logr.len(),
        host_total_depth.len(),
        host_alt_depth.len(),
    ];
    if lens.iter().any(|&len| len != num_sites) {
        return Err(anyhow!(
            "Site vectors must have equal lengths, got: total={}, alt={}, logr={}, host_total={}, host_alt={}",
            num_sites,
            lens[0],
            lens[1],
            lens[2],
            lens[3]
        ));
    }

    let p_host = host::prob_read_came_from_host(logr, params);
    let host_vaf = Zip::from(host_alt_depth)
        .and(host_total_depth)
        .map_collect(|&alt, &total| math::safe_div(alt, total));

    let mut host_reads = &total_depth * &p_host;
    let mut host_alt_reads = &host_reads * &host_vaf;

    let mut alt_bound_repairs = 0usize;
    let mut vaf_bound_repairs = 0usize;
    Zip::from(&mut host_reads)
        .and(&mut host_alt_reads)
        .and(total_depth)
        .and(alt_depth)
        .and(&p_host)
        .and(&host_vaf)
        .for_each(|k, l, &t, &a, &p, &hv| {
            // More host alt reads than observed alt reads: refit with the
            // alt bound tight.
            if *l > a {
                *k = (a * hv + t * p) / (hv * hv + 1.0);
                *l = a;
                alt_bound_repairs += 1;
            }
            // The implied tumour VAF must be a probability. The NaN arm
            // catches exactly the 0/0 case and must not be widened.
            if t > 0.0 {
                let ratio = (a - *l) / (t - *k);
                if ratio > 1.0 || ratio < 0.0 || ratio.is_nan() {
                    let denom = hv * hv - 2.0 * hv + 2.0;
                    *k = (a * (hv - 1.0) + t * (p - hv + 1.0)) / denom;
                    *l = (a * (hv * hv - hv + 1.0) + t * (p - hv * hv + hv - 1.0)) / denom;
                    vaf_bound_repairs += 1;
                }
            }
        });
    log::debug!(
        "Constraint repair: {} of {} site(s) hit the host alt bound, {} the tumour VAF bound",
        alt_bound_repairs,
        num_sites,
        vaf_bound_repairs
    );

    Ok(ContingencyEstimate {
        host_reads,
        host_alt_reads,
    })
}
