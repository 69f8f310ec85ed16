use std::path::PathBuf;

use clap::Parser;

use crate::Commands;

/// Main CLI application arguments and command structure
#[derive(Parser)]
#[clap(
    version,
    about = "Notopia — markdown pastes with folders, tags and shareable slugs"
)]
pub struct Cli {
    /// Path to the configuration file
    #[clap(short = 'c', long, value_parser)]
    pub config: Option<PathBuf>,

    /// Path to the document store directory
    #[clap(long, value_parser)]
    pub data_dir: Option<PathBuf>,

    /// Simulate being offline: creates land in the offline buffer
    #[clap(long)]
    pub offline: bool,

    /// Verbose output mode
    #[clap(short, long)]
    pub verbose: bool,

    /// Subcommands for the notopia application
    #[clap(subcommand)]
    pub command: Commands,
}
