use crate::util::Result;
use anyhow::anyhow;
use serde::Serialize;

/// Scalar sample context shared by every site in one estimation call.
///
/// Constructing a `SampleParams` validates the caller contract up front:
/// purity must lie in `[0, 1]` and both ploidies must be positive. The
/// numeric layers take a reference and never revalidate, so invalid scalars
/// are unrepresentable past this point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SampleParams {
    purity: f64,
    ploidy: f64,
    host_ploidy: f64,
}

impl SampleParams {
    /// Ploidy assumed for the contaminating host genome when not specified.
    pub const DEFAULT_HOST_PLOIDY: f64 = 2.0;

    pub fn new(purity: f64, ploidy: f64, host_ploidy: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&purity) {
            return Err(anyhow!(
                "Purity must be within [0.0, 1.0], got: {}",
                purity
            ));
        }
        if ploidy.is_nan() || ploidy <= 0.0 {
            return Err(anyhow!("Tumour ploidy must be > 0, got: {}", ploidy));
        }
        if host_ploidy.is_nan() || host_ploidy <= 0.0 {
            return Err(anyhow!("Host ploidy must be > 0, got: {}", host_ploidy));
        }
        Ok(SampleParams {
            purity,
            ploidy,
            host_ploidy,
        })
    }

    /// As [`SampleParams::new`] with the host genome assumed diploid.
    pub fn with_default_host_ploidy(purity: f64, ploidy: f64) -> Result<Self> {
        Self::new(purity, ploidy, Self::DEFAULT_HOST_PLOIDY)
    }

    pub fn purity(&self) -> f64 {
        self.purity
    }

    pub fn ploidy(&self) -> f64 {
        self.ploidy
    }

    pub fn host_ploidy(&self) -> f64 {
        self.host_ploidy
    }
}
