use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "chapternotes",
    version,
    about = "Align exported reading notes with e-book chapters"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Resolve(ResolveArgs),
    Inventory(InventoryArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    /// Newline-separated notes file exported from the reading tool.
    #[arg(long)]
    pub notes: PathBuf,

    /// EPUB archive the notes were taken from.
    #[arg(long)]
    pub book: PathBuf,

    /// How many leading characters of a note are used as the lookup key.
    #[arg(long, default_value_t = 55)]
    pub fragment_chars: usize,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct InventoryArgs {
    /// EPUB archive to inventory.
    #[arg(long)]
    pub book: PathBuf,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}
