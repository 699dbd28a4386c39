//! Command line interface.

use crate::compress::{DEFAULT_COMPRESSOR, ExternalCompressor};
use crate::config::{DEFAULT_CONFIG_FILE, PatchConfig, config_dir};
use crate::error::PatcherError;
use crate::extract::{dump_patch_file, extract_archive_file};
use crate::patch::{PatchBuilder, RegionReport};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{Level, info};

/// Builds Luma3DS patches that point Flipnote Studio 3D at a replacement server
#[derive(Debug, Parser)]
#[command(name = "kaeru-patcher", version, about)]
pub struct Cli {
    /// Set the logging level
    #[arg(short, long, value_enum, global = true, default_value = "info")]
    pub log_level: LogLevel,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Logging verbosity
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    /// Everything, including each file written
    Trace,
    /// Per-file progress
    Debug,
    /// Per-region progress
    Info,
    /// Warnings only
    Warn,
    /// Errors only
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// Subcommands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build code patches and RomFS trees for every region
    Build(BuildArgs),

    /// Extract a DARC archive, converting string tables to JSON
    Extract {
        /// Archive to extract
        archive: PathBuf,
        /// Output directory
        output: PathBuf,
    },

    /// Write each record of an IPS patch to its own file
    DumpPatch {
        /// Patch to dump
        patch: PathBuf,
        /// Output directory
        output: PathBuf,
    },
}

/// Options for `build`
#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Configuration file
    #[arg(short, long, env = "KAERU_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Directory holding `<REGION>/romfs` and `ALL/romfs` sources
    #[arg(short, long, default_value = ".")]
    pub source: PathBuf,

    /// Directory the `luma/` tree is written under
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// BLZ compressor invoked as `<compressor> -en <file>`
    #[arg(long, env = "KAERU_BLZ", default_value = DEFAULT_COMPRESSOR)]
    pub compressor: PathBuf,
}

/// Run the parsed command
pub fn run(cli: &Cli) -> Result<(), PatcherError> {
    match &cli.command {
        Commands::Build(args) => {
            build(args)?;
        }
        Commands::Extract { archive, output } => {
            let summary = extract_archive_file(archive, output)?;
            info!(
                "{} files and {} string tables written to {}",
                summary.files,
                summary.documents,
                output.display()
            );
        }
        Commands::DumpPatch { patch, output } => {
            dump_patch_file(patch, output)?;
        }
    }
    Ok(())
}

/// Load the configuration and build every region
pub fn build(args: &BuildArgs) -> Result<Vec<RegionReport>, PatcherError> {
    let config = PatchConfig::load(&args.config)?;
    let payload = config.load_payload(config_dir(&args.config))?;
    let compressor = ExternalCompressor::new(&args.compressor);

    let reports =
        PatchBuilder::new(&config, &payload, &compressor).build_all(&args.source, &args.output)?;
    for report in &reports {
        info!(
            "{}: {} patch records, {} files, {} archives ({} compressed)",
            report.region,
            report.patch_records,
            report.romfs.files_copied,
            report.romfs.archives_built,
            report.romfs.archives_compressed
        );
    }
    Ok(reports)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::path::Path;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_build_defaults() {
        let cli = Cli::try_parse_from(["kaeru-patcher", "build"]).unwrap();
        assert_eq!(cli.log_level, LogLevel::Info);
        let Commands::Build(args) = cli.command else {
            panic!("expected build command");
        };
        assert_eq!(args.source, Path::new("."));
        assert_eq!(args.output, Path::new("."));
        // Defaults can be overridden from the environment
        if std::env::var_os("KAERU_CONFIG").is_none() {
            assert_eq!(args.config, Path::new(DEFAULT_CONFIG_FILE));
        }
    }

    #[test]
    fn test_extract_arguments() {
        let cli = Cli::try_parse_from([
            "kaeru-patcher",
            "--log-level",
            "debug",
            "extract",
            "message.arc",
            "message",
        ])
        .unwrap();
        assert_eq!(cli.log_level, LogLevel::Debug);
        assert!(matches!(
            cli.command,
            Commands::Extract { ref archive, ref output }
                if archive == Path::new("message.arc") && output == Path::new("message")
        ));
    }

    #[test]
    fn test_dump_patch_requires_output() {
        assert!(Cli::try_parse_from(["kaeru-patcher", "dump-patch", "code.ips"]).is_err());
    }
}
