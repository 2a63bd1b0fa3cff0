use crate::{model::SampleParams, util::Result};
use anyhow::anyhow;
use csv::{ReaderBuilder, Writer, WriterBuilder};
use itertools::Itertools;
use ndarray::{concatenate, s, Array1, ArrayView1, Axis};
use rayon::{
    iter::{IntoParallelIterator, ParallelIterator},
    ThreadPoolBuilder,
};
use serde::Deserialize;
use std::{fs::File, ops::Range, path::Path};

/// One row of the input site table.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteRecord {
    /// Chromosome or contig name of the site.
    pub chrom: String,
    /// 1-based position of the site.
    pub pos: u64,
    /// Read depth at the site in the mixed sample.
    pub total_depth: f64,
    /// Alt-allele read depth at the site in the mixed sample.
    pub alt_depth: f64,
    /// Copy-number log2 depth ratio at the site.
    pub logr: f64,
    /// Read depth at the site in the host reference sample.
    pub host_total_depth: f64,
    /// Alt-allele read depth at the site in the host reference sample.
    pub host_alt_depth: f64,
}

/// Per-site input columns, split out of the record rows for vector math.
#[derive(Debug, Clone)]
pub struct SiteTable {
    pub total_depth: Array1<f64>,
    pub alt_depth: Array1<f64>,
    pub logr: Array1<f64>,
    pub host_total_depth: Array1<f64>,
    pub host_alt_depth: Array1<f64>,
}

impl SiteTable {
    pub fn from_records(records: &[SiteRecord]) -> Self {
        let (total_depth, alt_depth, logr, host_total_depth, host_alt_depth): (
            Vec<f64>,
            Vec<f64>,
            Vec<f64>,
            Vec<f64>,
            Vec<f64>,
        ) = records
            .iter()
            .map(|record| {
                (
                    record.total_depth,
                    record.alt_depth,
                    record.logr,
                    record.host_total_depth,
                    record.host_alt_depth,
                )
            })
            .multiunzip();
        SiteTable {
            total_depth: Array1::from_vec(total_depth),
            alt_depth: Array1::from_vec(alt_depth),
            logr: Array1::from_vec(logr),
            host_total_depth: Array1::from_vec(host_total_depth),
            host_alt_depth: Array1::from_vec(host_alt_depth),
        }
    }

    pub fn len(&self) -> usize {
        self.total_depth.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Reads the tab-separated site table, failing on the first malformed row.
pub fn read_site_records(path: &Path) -> Result<Vec<SiteRecord>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .map_err(|e| anyhow!("Failed to open site table {}: {}", path.display(), e))?;
    let mut records = Vec::new();
    for (row, result) in reader.deserialize().enumerate() {
        let record: SiteRecord =
            result.map_err(|e| anyhow!("Failed to parse site record {}: {}", row + 1, e))?;
        records.push(record);
    }
    log::info!("Loaded {} site(s) from {}", records.len(), path.display());
    Ok(records)
}

pub fn open_tsv_writer(path: &str) -> Result<Writer<File>> {
    WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .map_err(|e| anyhow!("Failed to create output file {}: {}", path, e))
}

/// Applies `estimate` to the whole table, or to contiguous chunks on a
/// thread pool when more than one thread is requested.
///
/// The estimate is elementwise over sites, so chunk results concatenated in
/// input order are identical to a single-shot run; parallelism is purely a
/// throughput choice.
pub fn run_chunked<F>(
    table: &SiteTable,
    params: &SampleParams,
    num_threads: usize,
    estimate: F,
) -> Result<Vec<Array1<f64>>>
where
    F: Fn(
            ArrayView1<f64>,
            ArrayView1<f64>,
            ArrayView1<f64>,
            ArrayView1<f64>,
            ArrayView1<f64>,
            &SampleParams,
        ) -> Result<Vec<Array1<f64>>>
        + Sync,
{
    let num_sites = table.len();
    let apply = |range: Range<usize>| {
        estimate(
            table.total_depth.slice(s![range.clone()]),
            table.alt_depth.slice(s![range.clone()]),
            table.logr.slice(s![range.clone()]),
            table.host_total_depth.slice(s![range.clone()]),
            table.host_alt_depth.slice(s![range]),
            params,
        )
    };

    if num_threads == 1 || num_sites == 0 {
        log::debug!("Single-threaded mode");
        return apply(0..num_sites);
    }

    log::debug!(
        "Multi-threaded mode: {} thread(s) over {} site(s)",
        num_threads,
        num_sites
    );
    let pool = initialize_thread_pool(num_threads)?;
    let chunk_len = num_sites.div_ceil(num_threads);
    let ranges: Vec<Range<usize>> = (0..num_sites)
        .step_by(chunk_len)
        .map(|start| start..(start + chunk_len).min(num_sites))
        .collect();
    let chunks: Vec<Vec<Array1<f64>>> =
        pool.install(|| ranges.into_par_iter().map(apply).collect::<Result<Vec<_>>>())?;

    let num_outputs = chunks.first().map_or(0, |outputs| outputs.len());
    let mut outputs = Vec::with_capacity(num_outputs);
    for column in 0..num_outputs {
        let views: Vec<ArrayView1<f64>> = chunks.iter().map(|chunk| chunk[column].view()).collect();
        outputs.push(concatenate(Axis(0), &views)?);
    }
    Ok(outputs)
}

fn initialize_thread_pool(num_threads: usize) -> Result<rayon::ThreadPool> {
    log::info!("Starting job pool with {} thread(s)...", num_threads);
    ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .map_err(|e| anyhow!("Failed to initialize thread pool: {}", e))
}
