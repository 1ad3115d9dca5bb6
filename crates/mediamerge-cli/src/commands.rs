use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "mediamerge")]
#[command(
    about = "Reconcile a curated photo/video library against backup locations",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Index the curated library into the store
    Index,
    /// Detect duplicates in the configured backup locations
    Detect,
    /// Stage better copies and replace the library originals
    Reconcile,
    /// Run the full pipeline: index, detect, reconcile
    Run,
    /// Print configuration values
    PrintConfig,
    /// Truncate all database tables
    TruncateDb,
}
