//! Patch builder for Flipnote Studio 3D
//!
//! Produces the Luma3DS title overrides that redirect the application to a
//! replacement server:
//!
//! - an IPS patch of the code image per regional release, replacing the
//!   server certificates and gallery URL and disabling the NASC check
//! - a RomFS tree per release, with `*.arc` / `*.blz` source directories
//!   packed into DARC archives and `*.msbt.json` documents compiled into
//!   MSBT string tables
//!
//! # Example
//!
//! ```no_run
//! use kaeru_patcher::{ExternalCompressor, PatchBuilder, PatchConfig, config_dir};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), kaeru_patcher::PatcherError> {
//! let config_path = Path::new("config.toml");
//! let config = PatchConfig::load(config_path)?;
//! let payload = config.load_payload(config_dir(config_path))?;
//! let compressor = ExternalCompressor::default();
//!
//! PatchBuilder::new(&config, &payload, &compressor)
//!     .build_all(Path::new("."), Path::new("out"))?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod cli;
pub mod codebin;
pub mod compress;
pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod patch;
pub mod romfs;

pub use codebin::{build_code_patch, write_code_patch};
pub use compress::{Compressor, ExternalCompressor};
pub use config::{PatchConfig, Payload, Region, RegionConfig, config_dir};
pub use error::{CompressError, ConfigError, PatcherError};
pub use extract::{dump_patch, extract_archive};
pub use patch::{PatchBuilder, RegionLayout, RegionReport};
pub use romfs::{RomfsBuilder, RomfsSummary};
