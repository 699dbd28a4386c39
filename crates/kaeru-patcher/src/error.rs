//! Error types for the patch builder.
//!
//! All errors use thiserror; file system failures carry the path involved.

use crate::config::Region;
use kaeru_formats::darc::DarcError;
use kaeru_formats::ips::IpsError;
use kaeru_formats::msbt::MsbtError;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration or a certificate file
    #[error("Failed to read {path}: {source}")]
    Read {
        /// File that could not be read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Invalid TOML in the configuration file
    #[error("TOML deserialization error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),

    /// A region table is absent
    #[error("Config section [regions.{0}] missing")]
    MissingRegion(Region),

    /// Title ID cannot name an output directory
    #[error("Invalid title_id '{title_id}' for {region}: expected hexadecimal digits")]
    InvalidTitleId {
        /// Region owning the title ID
        region: Region,
        /// Configured value
        title_id: String,
    },

    /// Certificate exceeds the space reserved for it
    #[error("Maximum size for {name} is {max} bytes, got {size}")]
    CertificateTooLarge {
        /// Certificate name
        name: &'static str,
        /// Certificate size
        size: usize,
        /// Configured maximum
        max: usize,
    },

    /// Gallery URL is not ASCII
    #[error("Gallery URL must be ASCII: {0}")]
    UrlNotAscii(String),

    /// Gallery URL exceeds the space reserved for it
    #[error("Gallery URL cannot exceed {max} characters, got {len}")]
    UrlTooLong {
        /// URL length
        len: usize,
        /// Configured maximum
        max: usize,
    },
}

/// External compressor errors.
#[derive(Debug, Error)]
pub enum CompressError {
    /// The compressor could not be started
    #[error("Failed to run compressor {program}: {source}")]
    Spawn {
        /// Compressor program
        program: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The compressor exited unsuccessfully
    #[error("Compressor {program} failed on {path} (exit code {code:?}): {stderr}")]
    Failed {
        /// Compressor program
        program: PathBuf,
        /// File being compressed
        path: PathBuf,
        /// Exit code, if the process was not killed by a signal
        code: Option<i32>,
        /// Captured standard error
        stderr: String,
    },
}

/// Patch build errors.
#[derive(Debug, Error)]
pub enum PatcherError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Compression error
    #[error("Compression error: {0}")]
    Compress(#[from] CompressError),

    /// File system error
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path involved
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal error
    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// Code patch could not be encoded or decoded
    #[error("IPS error in {path}: {source}")]
    Ips {
        /// Patch file
        path: PathBuf,
        /// Codec error
        #[source]
        source: IpsError,
    },

    /// Archive could not be encoded or decoded
    #[error("DARC error in {path}: {source}")]
    Darc {
        /// Archive file or source directory
        path: PathBuf,
        /// Codec error
        #[source]
        source: DarcError,
    },

    /// String table could not be encoded or decoded
    #[error("MSBT error in {path}: {source}")]
    Msbt {
        /// String table or interchange document
        path: PathBuf,
        /// Codec error
        #[source]
        source: MsbtError,
    },

    /// Archive source directory contains a subdirectory
    #[error("Archive sources cannot contain directories: {0}")]
    NestedArchiveDirectory(PathBuf),

    /// File name is not valid UTF-8
    #[error("File name is not valid UTF-8: {0}")]
    NonUtf8Path(PathBuf),

    /// Archive entry name would escape the output directory
    #[error("Refusing to extract entry with unsafe name '{0}'")]
    UnsafeEntryName(String),
}

impl PatcherError {
    /// Wrap an I/O error with the path it concerns
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_messages() {
        let err = ConfigError::MissingRegion(Region::Jpn);
        assert_eq!(err.to_string(), "Config section [regions.JPN] missing");

        let err = ConfigError::UrlTooLong { len: 80, max: 64 };
        assert_eq!(
            err.to_string(),
            "Gallery URL cannot exceed 64 characters, got 80"
        );
    }

    #[test]
    fn test_patcher_error_conversion() {
        let err: PatcherError = ConfigError::MissingRegion(Region::Usa).into();
        assert!(err.to_string().contains("[regions.USA]"));

        let err = PatcherError::io(
            "out/code.ips",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().starts_with("I/O error on out/code.ips"));
    }
}
