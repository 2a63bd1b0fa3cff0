use crate::{
    cli::SplitArgs,
    commands::shared::{self, SiteTable},
    contingency, math,
    model::SampleParams,
    util::Result,
};
use anyhow::anyhow;
use itertools::izip;
use serde::Serialize;

/// One row of the read-split output table, for contamination QC.
#[derive(Debug, Serialize)]
struct SplitRecord<'a> {
    chrom: &'a str,
    pos: u64,
    host_reads: f64,
    host_alt_reads: f64,
    tumour_reads: f64,
    tumour_alt_reads: f64,
}

pub fn split(args: SplitArgs) -> Result<()> {
    let params = SampleParams::new(args.purity, args.ploidy, args.host_ploidy)?;
    let records = shared::read_site_records(&args.sites_filename)?;
    let table = SiteTable::from_records(&records);

    let mut outputs = shared::run_chunked(
        &table,
        &params,
        args.num_threads,
        |total, alt, logr, host_total, host_alt, params| {
            let estimate = contingency::estimate_contingency_table(
                total, alt, logr, host_total, host_alt, params,
            )?;
            Ok(vec![estimate.host_reads, estimate.host_alt_reads])
        },
    )?;
    let host_alt_reads = outputs
        .pop()
        .ok_or_else(|| anyhow!("Estimation produced no output"))?;
    let host_reads = outputs
        .pop()
        .ok_or_else(|| anyhow!("Estimation produced no output"))?;

    let mut writer = shared::open_tsv_writer(&args.output_path)?;
    for (record, &k, &l) in izip!(records.iter(), host_reads.iter(), host_alt_reads.iter()) {
        writer.serialize(SplitRecord {
            chrom: &record.chrom,
            pos: record.pos,
            host_reads: k,
            host_alt_reads: l,
            tumour_reads: math::snap_to_zero(record.total_depth - k),
            tumour_alt_reads: math::snap_to_zero(record.alt_depth - l),
        })?;
    }
    writer.flush()?;
    log::info!(
        "Wrote the read split for {} site(s) to {}",
        records.len(),
        args.output_path
    );
    Ok(())
}
