use crate::refset::{rank_storage_roots, StorageRoot};
use crate::utils::{Error, Result};
use clap::{ArgAction, ArgGroup, Parser, Subcommand};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use once_cell::sync::Lazy;
use std::{
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

type ArgResult<T> = std::result::Result<T, String>;

pub static FULL_VERSION: Lazy<String> = Lazy::new(|| {
    format!(
        "{}-{}",
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    )
});

#[derive(Parser)]
#[command(name="celcollate",
          version=&**FULL_VERSION,
          about="Collate microarray CEL files for custom reference building",
          long_about = None,
          disable_help_subcommand = true,
          help_template = "{name} {version}\n{about-section}\n{usage-heading}\n    {usage}\n\n{all-args}{after-help}",
          )]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = ArgAction::Count, help = "Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)")]
    pub verbosity: u8,
}

#[derive(Subcommand)]
pub enum Command {
    #[clap(about = "Collate CEL files for a list of specimens")]
    Collate(CollateArgs),
    #[clap(about = "Collate rhchp files and build an anonymised syndrome-free CEL set")]
    Prenatal(PrenatalArgs),
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("collate")))]
#[command(arg_required_else_help(true))]
pub struct CollateArgs {
    #[clap(required = true)]
    #[clap(short = 's')]
    #[clap(long = "specimens")]
    #[clap(help = "CSV file with a 'Specimen ID' column")]
    #[clap(value_name = "CSV")]
    #[arg(value_parser = check_file_exists)]
    pub specimens_path: PathBuf,

    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output")]
    #[clap(help = "Folder to copy CEL files to (created if missing)")]
    #[clap(value_name = "DIR")]
    #[arg(value_parser = check_prefix_path)]
    pub output_dir: PathBuf,

    #[clap(long = "storage-root")]
    #[clap(value_name = "NAME=PATH")]
    #[clap(help = "Folder searched recursively for CEL files; repeat for several, searched in the given order")]
    #[arg(value_parser = parse_storage_root)]
    pub storage_roots: Vec<StorageRoot>,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "io-timeout")]
    #[clap(value_name = "SECONDS")]
    #[clap(help = "Give up on storage roots that have not been listed after this many seconds")]
    #[arg(value_parser = seconds_to_duration)]
    pub io_timeout: Option<Duration>,
}

impl CollateArgs {
    pub fn validate(&self) -> Result<()> {
        if self.storage_roots.is_empty() {
            return Err(Error::Configuration(
                "At least one --storage-root is required to collate CEL files".to_string(),
            ));
        }
        Ok(())
    }

    pub fn ranked_storage_roots(&self) -> Vec<StorageRoot> {
        rank_storage_roots(self.storage_roots.clone())
    }
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("prenatal")))]
#[command(arg_required_else_help(true))]
pub struct PrenatalArgs {
    #[clap(required = true)]
    #[clap(short = 's')]
    #[clap(long = "specimens")]
    #[clap(help = "CSV file with a 'Specimen ID' column")]
    #[clap(value_name = "CSV")]
    #[arg(value_parser = check_file_exists)]
    pub specimens_path: PathBuf,

    #[clap(required = true)]
    #[clap(short = 'i')]
    #[clap(long = "input")]
    #[clap(help = "Folder searched recursively for rhchp files")]
    #[clap(value_name = "DIR")]
    #[arg(value_parser = check_dir_exists)]
    pub input_dir: PathBuf,

    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output")]
    #[clap(help = "Folder to copy rhchp files to (created if missing)")]
    #[clap(value_name = "DIR")]
    #[arg(value_parser = check_prefix_path)]
    pub output_dir: PathBuf,

    #[clap(help_heading("Syndrome filter"))]
    #[clap(short = 'r')]
    #[clap(long = "syndrome-regions")]
    #[clap(help = "Tab-separated file of syndromic regions (chr, start, stop, type); enables the filter")]
    #[clap(value_name = "BED")]
    #[arg(value_parser = check_file_exists)]
    pub syndrome_regions_path: Option<PathBuf>,

    #[clap(help_heading("Syndrome filter"))]
    #[clap(short = 'm')]
    #[clap(long = "multi-sample-report")]
    #[clap(help = "Multi-sample viewer export listing the calls of every sample")]
    #[clap(value_name = "TSV")]
    #[arg(value_parser = check_file_exists)]
    pub report_path: Option<PathBuf>,

    #[clap(help_heading("Syndrome filter"))]
    #[clap(short = 'f')]
    #[clap(long = "syndrome-free")]
    #[clap(help = "Folder for anonymised CEL files of samples without syndromic calls")]
    #[clap(value_name = "DIR")]
    #[arg(value_parser = check_prefix_path)]
    pub syndrome_free_dir: Option<PathBuf>,

    #[clap(help_heading("Syndrome filter"))]
    #[clap(long = "storage-root")]
    #[clap(value_name = "NAME=PATH")]
    #[clap(help = "Folder searched recursively for CEL files; repeat for several, searched in the given order")]
    #[arg(value_parser = parse_storage_root)]
    pub storage_roots: Vec<StorageRoot>,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "io-timeout")]
    #[clap(value_name = "SECONDS")]
    #[clap(help = "Give up on folders that have not been listed after this many seconds")]
    #[arg(value_parser = seconds_to_duration)]
    pub io_timeout: Option<Duration>,
}

/// Inputs of the syndrome filter, present only when the filter is enabled.
#[derive(Debug, Clone, PartialEq)]
pub struct SyndromeFilterConfig {
    pub regions_path: PathBuf,
    pub report_path: PathBuf,
    pub syndrome_free_dir: PathBuf,
    pub storage_roots: Vec<StorageRoot>,
}

impl PrenatalArgs {
    /// Checks option combinations before anything touches the filesystem.
    pub fn syndrome_filter(&self) -> Result<Option<SyndromeFilterConfig>> {
        let Some(regions_path) = &self.syndrome_regions_path else {
            let stray: Vec<&str> = [
                (self.report_path.is_some(), "--multi-sample-report"),
                (self.syndrome_free_dir.is_some(), "--syndrome-free"),
            ]
            .into_iter()
            .filter_map(|(given, flag)| given.then_some(flag))
            .collect();
            if !stray.is_empty() {
                return Err(Error::Configuration(format!(
                    "{} given without --syndrome-regions",
                    stray.join(" and ")
                )));
            }
            return Ok(None);
        };

        let report_path = self.report_path.clone().ok_or_else(|| {
            Error::Configuration(
                "--multi-sample-report is required when --syndrome-regions is given".to_string(),
            )
        })?;
        let syndrome_free_dir = self.syndrome_free_dir.clone().ok_or_else(|| {
            Error::Configuration(
                "--syndrome-free is required when --syndrome-regions is given".to_string(),
            )
        })?;
        if self.storage_roots.is_empty() {
            return Err(Error::Configuration(
                "At least one --storage-root is required when --syndrome-regions is given"
                    .to_string(),
            ));
        }
        if syndrome_free_dir == self.output_dir {
            return Err(Error::Configuration(
                "--syndrome-free must differ from --output".to_string(),
            ));
        }

        Ok(Some(SyndromeFilterConfig {
            regions_path: regions_path.clone(),
            report_path,
            syndrome_free_dir,
            storage_roots: rank_storage_roots(self.storage_roots.clone()),
        }))
    }
}

pub fn init_verbose(args: &Cli) {
    let filter_level: LevelFilter = match args.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}

fn check_prefix_path(s: &str) -> ArgResult<PathBuf> {
    let path = Path::new(s);
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            return Err(format!("Path does not exist: {}", parent_dir.display()));
        }
    }
    Ok(path.to_path_buf())
}

fn check_file_exists(s: &str) -> ArgResult<PathBuf> {
    let path = Path::new(s);
    if !path.exists() {
        Err(format!("File does not exist: {}", path.display()))
    } else {
        Ok(path.to_path_buf())
    }
}

fn check_dir_exists(s: &str) -> ArgResult<PathBuf> {
    let path = Path::new(s);
    if !path.is_dir() {
        Err(format!("Folder does not exist: {}", path.display()))
    } else {
        Ok(path.to_path_buf())
    }
}

fn parse_storage_root(s: &str) -> ArgResult<StorageRoot> {
    StorageRoot::from_spec(s)
}

fn seconds_to_duration(s: &str) -> ArgResult<Duration> {
    let seconds: f64 = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid number of seconds", s))?;
    if seconds.is_finite() && seconds > 0.0 {
        Ok(Duration::from_secs_f64(seconds))
    } else {
        Err("Timeout must be a positive number of seconds".into())
    }
}
