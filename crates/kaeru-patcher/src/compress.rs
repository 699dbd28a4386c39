//! Compression of built archives.
//!
//! `.blz` archives are compressed after they are written. The algorithm is
//! provided by an external tool; this module only invokes it.

use crate::error::CompressError;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// Default location of the BLZ tool
pub const DEFAULT_COMPRESSOR: &str = "./blz";

/// Replaces a file with its compressed form
pub trait Compressor {
    /// Compress the file at `path` in place
    fn compress_in_place(&self, path: &Path) -> Result<(), CompressError>;
}

/// Runs `<program> -en <path>` and requires a zero exit status
#[derive(Debug, Clone)]
pub struct ExternalCompressor {
    program: PathBuf,
}

impl ExternalCompressor {
    /// Use `program` as the compressor
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Compressor program
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Default for ExternalCompressor {
    fn default() -> Self {
        Self::new(DEFAULT_COMPRESSOR)
    }
}

impl Compressor for ExternalCompressor {
    fn compress_in_place(&self, path: &Path) -> Result<(), CompressError> {
        debug!("Compressing {} with {}", path.display(), self.program.display());

        let output = Command::new(&self.program)
            .arg("-en")
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| CompressError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(CompressError::Failed {
                program: self.program.clone(),
                path: path.to_path_buf(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}
