use crate::{
    cli::CorrectArgs,
    commands::shared::{self, SiteTable},
    model::SampleParams,
    util::Result,
    vaf,
};
use anyhow::anyhow;
use serde::Serialize;

/// One row of the corrected output table.
#[derive(Debug, Serialize)]
struct VafRecord<'a> {
    chrom: &'a str,
    pos: u64,
    total_depth: f64,
    alt_depth: f64,
    tumour_vaf: f64,
}

pub fn correct(args: CorrectArgs) -> Result<()> {
    let params = SampleParams::new(args.purity, args.ploidy, args.host_ploidy)?;
    let records = shared::read_site_records(&args.sites_filename)?;
    let table = SiteTable::from_records(&records);

    let mut outputs = shared::run_chunked(
        &table,
        &params,
        args.num_threads,
        |total, alt, logr, host_total, host_alt, params| {
            Ok(vec![vaf::estimate_tumour_vaf(
                total, alt, logr, host_total, host_alt, params,
            )?])
        },
    )?;
    let vafs = outputs
        .pop()
        .ok_or_else(|| anyhow!("Estimation produced no output"))?;

    let mut writer = shared::open_tsv_writer(&args.output_path)?;
    for (record, &tumour_vaf) in records.iter().zip(vafs.iter()) {
        writer.serialize(VafRecord {
            chrom: &record.chrom,
            pos: record.pos,
            total_depth: record.total_depth,
            alt_depth: record.alt_depth,
            tumour_vaf,
        })?;
    }
    writer.flush()?;
    log::info!(
        "Wrote {} corrected site(s) to {}",
        records.len(),
        args.output_path
    );
    Ok(())
}
