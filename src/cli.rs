use crate::util::Result;
use anyhow::anyhow;
use clap::{ArgAction, Parser, Subcommand};
use log::{LevelFilter, Record};
use once_cell::sync::Lazy;
use std::{
    io::Write,
    ops::Deref,
    path::{Path, PathBuf},
};

/// Full version string including the crate version and git description.
///
/// Includes the crate version from Cargo.toml and, when built inside a git
/// checkout, the git describe output (e.g. `0.1.0-1ba958a-dirty` on a dirty
/// branch).
pub static FULL_VERSION: Lazy<String> = Lazy::new(|| {
    #[cfg(has_git_describe)]
    {
        let git_describe = env!("VERGEN_GIT_DESCRIBE");
        if !git_describe.is_empty() {
            return format!("{}-{}", env!("CARGO_PKG_VERSION"), git_describe);
        }
    }
    env!("CARGO_PKG_VERSION").to_string()
});

#[derive(Parser, Debug)]
#[command(name="xenovaf",
          version=&**FULL_VERSION,
          about="Purity-corrected tumour VAF estimation for host-contaminated samples",
          long_about = None,
          help_template = "{name} {version}\n{about-section}\n{usage-heading}\n    {usage}\n\n{all-args}",
          )]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        global = true
    )]
    pub verbosity: u8,

    /// Silence all output
    #[arg(
        long = "quiet",
        action = ArgAction::SetTrue,
        global = true,
        conflicts_with = "verbosity",
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Estimate the purity-corrected tumour VAF at every site
    Correct(CorrectArgs),
    /// Report the estimated host/tumour read split at every site
    Split(SplitArgs),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Correct(_) => "correct",
            Command::Split(_) => "split",
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct SharedArgs {
    /// TSV file with per-site mixed-sample and host read counts and log-ratios
    #[arg(
        required = true,
        short = 's',
        long = "sites",
        value_name = "TSV",
        value_parser = check_file_exists
    )]
    pub sites_filename: PathBuf,

    /// Output tsv path
    #[arg(
        required = true,
        short = 'o',
        long = "out",
        value_name = "TSV",
        value_parser = check_prefix_path
    )]
    pub output_path: String,

    /// Fraction of cells in the mixed sample that are tumour cells
    #[arg(
        required = true,
        short = 'p',
        long = "purity",
        value_name = "PURITY",
        value_parser = parse_unit_interval
    )]
    pub purity: f64,

    /// Mean tumour ploidy
    #[arg(
        required = true,
        long = "ploidy",
        value_name = "PLOIDY",
        value_parser = parse_positive
    )]
    pub ploidy: f64,

    /// Ploidy of the contaminating host genome
    #[arg(
        long = "host-ploidy",
        value_name = "PLOIDY",
        default_value = "2",
        value_parser = parse_positive
    )]
    pub host_ploidy: f64,

    #[arg(
        short = '@',
        value_name = "THREADS",
        default_value = "1",
        value_parser = threads_in_range
    )]
    pub num_threads: usize,
}

#[derive(Parser, Debug, Clone)]
#[command(arg_required_else_help(true))]
pub struct CorrectArgs {
    #[command(flatten)]
    pub shared: SharedArgs,
}

#[derive(Parser, Debug, Clone)]
#[command(arg_required_else_help(true))]
pub struct SplitArgs {
    #[command(flatten)]
    pub shared: SharedArgs,
}

impl Deref for CorrectArgs {
    type Target = SharedArgs;

    fn deref(&self) -> &Self::Target {
        &self.shared
    }
}

impl Deref for SplitArgs {
    type Target = SharedArgs;

    fn deref(&self) -> &Self::Target {
        &self.shared
    }
}

/// Initializes the verbosity level for logging based on the command-line arguments.
///
/// Sets up the logger with a specific verbosity level that is determined
/// by the number of occurrences of the `-v` or `--verbose` flag in the command-line arguments.
pub fn init_verbose(args: &Cli) {
    let filter_level: LevelFilter = if args.quiet {
        LevelFilter::Off
    } else {
        match args.verbosity {
            0 => LevelFilter::Info,  // -v
            1 => LevelFilter::Debug, // -vv
            _ => LevelFilter::Trace, // -vvv or more
        }
    };

    env_logger::Builder::from_default_env()
        .format(format_log)
        .filter_level(filter_level)
        .init();
}

fn format_log(buf: &mut env_logger::fmt::Formatter, record: &Record) -> std::io::Result<()> {
    writeln!(
        buf,
        "{} [{}] - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        record.level(),
        record.args()
    )
}

/// Checks if the provided path prefix exists.
///
/// Validates that the parent directory of the output path exists, so that
/// failures surface before any estimation work is done.
fn check_prefix_path(s: &str) -> Result<String> {
    let path = Path::new(s);
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            return Err(anyhow!("Path does not exist: {}", parent_dir.display()));
        }
    }
    Ok(s.to_string())
}

/// Validates that the provided string represents a valid number of threads.
fn threads_in_range(s: &str) -> Result<usize> {
    let thread: usize = s
        .parse::<usize>()
        .map_err(|_| anyhow!("`{}` is not a valid thread number", s))?;
    if thread == 0 {
        return Err(anyhow!("Number of threads must be >= 1"));
    }
    Ok(thread)
}

/// Parses a string into a floating-point number within `[0.0, 1.0]`.
fn parse_unit_interval(s: &str) -> Result<f64> {
    let value = s
        .parse::<f64>()
        .map_err(|e| anyhow!("Could not parse float: {}", e))?;
    if !(0.0..=1.0).contains(&value) {
        Err(anyhow!(
            "The value must be between 0.0 and 1.0, got: {}",
            value
        ))
    } else {
        Ok(value)
    }
}

/// Parses a string into a strictly positive floating-point number.
fn parse_positive(s: &str) -> Result<f64> {
    let value = s
        .parse::<f64>()
        .map_err(|e| anyhow!("Could not parse float: {}", e))?;
    if value.is_nan() || value <= 0.0 {
        Err(anyhow!("The value must be > 0, got: {}", value))
    } else {
        Ok(value)
    }
}

/// Checks if the provided file path exists.
fn check_file_exists(s: &str) -> Result<PathBuf> {
    let path = Path::new(s);
    if !path.exists() {
        return Err(anyhow!("File does not exist: {}", path.display()));
    }
    Ok(path.to_path_buf())
}
