use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use spm_types::ApiVersion;

#[derive(Parser)]
#[command(
    name = "spm",
    about = "Salesforce Profile Merger: scan, compare, and merge profile metadata",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Metadata API version, e.g. 54 or 54.0
    #[arg(long, global = true)]
    pub api_version: Option<ApiVersion>,

    /// TOML file with merge settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the records of a profile
    Scan(ScanArgs),
    /// Merge two profiles and write the result
    Merge(MergeArgs),
    /// Compare two profiles
    Diff(DiffArgs),
    /// List the categories known at the API version
    Categories(CategoriesArgs),
}

#[derive(Args)]
pub struct ScanArgs {
    pub file: PathBuf,
    /// Only show records of this category
    #[arg(short, long)]
    pub category: Option<String>,
}

#[derive(Args)]
pub struct MergeArgs {
    pub a: PathBuf,
    pub b: PathBuf,
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Merge A into B so that A's records win
    #[arg(long)]
    pub a_into_b: bool,
    /// Report differences without writing the merged profile
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct DiffArgs {
    pub a: PathBuf,
    pub b: PathBuf,
}

#[derive(Args)]
pub struct CategoriesArgs {
    /// Include categories outside the version window
    #[arg(long)]
    pub all: bool,
}
