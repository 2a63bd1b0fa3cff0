//! Purity-corrected tumour variant allele fraction estimation for
//! host-contaminated samples.
//!
//! Given per-site read counts from a mixed tumour/host sample, matching
//! counts from a host reference sample, the sample's copy-number log-ratio
//! signal and scalar purity/ploidy estimates, this crate deconvolves each
//! site's reads into host- and tumour-derived reads in closed form and
//! reports the allele fraction the sample would show if it were pure tumour.

pub mod cli;
pub mod commands;
pub mod contingency;
pub mod host;
pub mod math;
pub mod model;
pub mod util;
pub mod vaf;
