pub use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tableshare", version)]
#[command(about = "Share encrypted tables through a server that only sees ciphertext")]
pub struct Args {
    /// Path to the config file (defaults to ~/.tableshare/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level, overrides the config file (RUST_LOG still wins)
    #[arg(long, global = true)]
    pub log_level: Option<tracing::Level>,

    #[command(subcommand)]
    pub command: crate::Command,
}
