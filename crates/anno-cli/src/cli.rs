use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "anno",
    about = "Inspect and normalize W3C Web Annotation files",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Store configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load annotations into a store and summarize them
    Inspect(InspectArgs),
    /// Load annotations and write them back as normalized W3C JSON
    Export(ExportArgs),
}

#[derive(Args)]
pub struct InspectArgs {
    /// W3C annotation file (one record or an array)
    pub file: PathBuf,
}

#[derive(Args)]
pub struct ExportArgs {
    /// W3C annotation file (one record or an array)
    pub file: PathBuf,
    /// Output file; stdout if omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
