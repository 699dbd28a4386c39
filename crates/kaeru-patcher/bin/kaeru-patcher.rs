//! kaeru-patcher binary entry point.
//!
//! Parses arguments, initializes logging and runs the selected command. See
//! the kaeru-patcher library for programmatic use.

use clap::Parser;
use kaeru_patcher::cli::{Cli, run};
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG takes precedence over --log-level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::from_level(Level::from(cli.log_level)).into())
                .from_env_lossy(),
        )
        .with_target(false)
        .init();

    run(&cli)?;
    Ok(())
}
