//! DARC error types

use crate::ErrorKind;
use thiserror::Error;

/// DARC-specific error type
#[derive(Debug, Error)]
pub enum DarcError {
    /// Invalid DARC magic bytes
    #[error("invalid DARC magic: expected 'darc', got {0:?}")]
    InvalidMagic([u8; 4]),

    /// Byte-order mark is neither 0xFFFE nor 0xFEFF
    #[error("invalid byte-order mark: 0x{0:04X}")]
    InvalidByteOrderMark(u16),

    /// Data ended before an expected structure
    #[error("DARC data truncated at offset {offset}: expected {needed} more bytes")]
    Truncated {
        /// Offset where the structure starts
        offset: usize,
        /// Bytes the structure needed
        needed: usize,
    },

    /// First table row is not the root folder descriptor
    #[error("entry table does not start with a root folder descriptor")]
    MissingRootDescriptor,

    /// A second folder descriptor appeared after the root
    #[error("nested folder descriptor at table row {0}; only a flat root is supported")]
    NestedFolder(usize),

    /// Label is not valid UTF-16
    #[error("invalid UTF-16 label at offset {0}")]
    InvalidLabel(usize),

    /// Entry name cannot be stored as a NUL-terminated label
    #[error("entry name {0:?} contains a NUL character")]
    InvalidName(String),

    /// Label block grew past the 24-bit offset field
    #[error("label offset 0x{0:X} exceeds 24-bit limit")]
    LabelOffsetOverflow(usize),

    /// Archive does not fit 32-bit offsets
    #[error("archive size {0} exceeds 32-bit limit")]
    ArchiveTooLarge(usize),

    /// Binary parsing error
    #[error("binary parsing error: {0}")]
    BinRw(#[from] binrw::Error),
}

impl DarcError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidMagic(_)
            | Self::InvalidByteOrderMark(_)
            | Self::MissingRootDescriptor
            | Self::NestedFolder(_)
            | Self::InvalidLabel(_)
            | Self::BinRw(_) => ErrorKind::Format,
            Self::Truncated { .. } => ErrorKind::Truncation,
            Self::InvalidName(_) | Self::LabelOffsetOverflow(_) | Self::ArchiveTooLarge(_) => {
                ErrorKind::EncodingConstraint
            }
        }
    }
}

/// Result type for DARC operations
pub type DarcResult<T> = Result<T, DarcError>;
