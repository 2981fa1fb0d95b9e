// CLI modules
mod args;
mod config;
mod logging;
mod op;
mod ops;
mod store;

use anyhow::Context;
use args::Args;
use clap::{Parser, Subcommand};
use config::AppConfig;
use op::{Op, OpContext};
use ops::{Grant, Keygen, Open, Revoke, Seal, Version};

command_enum! {
    (Keygen, Keygen),
    (Seal, Seal),
    (Open, Open),
    (Grant, Grant),
    (Revoke, Revoke),
    (Version, Version),
}

async fn run(args: Args) -> anyhow::Result<String> {
    let config = AppConfig::load(args.config.as_deref()).context("failed to load config")?;
    let level = match args.log_level {
        Some(level) => level,
        None => config.level()?,
    };

    // Flushes buffered logs when dropped at the end of this function
    let _guard = logging::init_logging(level);

    let ctx = OpContext::new(config);
    let output = args.command.execute(&ctx).await?;
    Ok(output.to_string())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    match run(args).await {
        Ok(output) => {
            println!("{}", output);
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
