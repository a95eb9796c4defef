use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Paolo De Angelis",
    version,
    about = "amsdb - Store results of AMS computational-chemistry jobs in an atoms database and curate its metadata.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Configuration file in TOML format with `[store]` and `[naming]` sections
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store one or more exported job snapshots as database rows.
    Store(StoreArgs),
    /// Print the summary table of a stored row.
    Show(ShowArgs),
    /// Describe every new user, subset, task and dataset usage in the metadata sidecars.
    Metadata(MetadataArgs),
}

/// Arguments for the `store` subcommand.
#[derive(Args, Debug)]
pub struct StoreArgs {
    /// Job snapshot files (.json, .yaml or .yml).
    #[arg(required = true, value_name = "JOB")]
    pub jobs: Vec<PathBuf>,

    /// Path to the atoms database.
    #[arg(long, required = true, value_name = "PATH")]
    pub db: PathBuf,

    /// Name of the subset the jobs belong to.
    #[arg(long = "subset", value_name = "NAME")]
    pub subset_name: Option<String>,

    /// Task recorded for the simulation rows.
    #[arg(long, value_name = "NAME")]
    pub task: Option<String>,

    /// Author of the rows. Defaults to the USER environment variable.
    #[arg(long, value_name = "NAME")]
    pub user: Option<String>,

    /// Also store the input structure of every job as an `initial configuration` row.
    #[arg(long = "add-ic")]
    pub add_initial_configuration: bool,

    /// Use the current time instead of the job start time as creation time.
    #[arg(long)]
    pub no_runtime: bool,

    /// Manifest listing every job of the dataset.
    #[arg(long, value_name = "PATH", requires = "training_set")]
    pub full_dataset: Option<PathBuf>,

    /// Manifest listing the jobs of the training set.
    #[arg(long, value_name = "PATH", requires = "full_dataset")]
    pub training_set: Option<PathBuf>,

    /// Do not print the row table after each write.
    #[arg(long)]
    pub quiet_report: bool,
}

/// Arguments for the `show` subcommand.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Path to the atoms database.
    #[arg(long, required = true, value_name = "PATH")]
    pub db: PathBuf,

    /// Row id. Defaults to the last row.
    #[arg(long, value_name = "N")]
    pub id: Option<i64>,
}

/// Arguments for the `metadata` subcommand.
#[derive(Args, Debug)]
pub struct MetadataArgs {
    /// Path to the atoms database.
    #[arg(long, required = true, value_name = "PATH")]
    pub db: PathBuf,

    /// Answer the questions from a file, one answer per line, instead of prompting.
    #[arg(long, value_name = "FILE")]
    pub answers: Option<PathBuf>,
}
