//! IPS error types

use crate::ErrorKind;
use thiserror::Error;

/// IPS-specific error type
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IpsError {
    /// Invalid IPS magic bytes
    #[error("invalid IPS magic: expected 'PATCH', got {0:?}")]
    InvalidMagic([u8; 5]),

    /// Data ended before a record field or the terminator
    #[error("IPS data truncated at offset {offset}: expected {needed} more bytes")]
    Truncated {
        /// Offset where more data was expected
        offset: usize,
        /// Number of bytes the field needed
        needed: usize,
    },

    /// Truncation length does not fit in 24 bits
    #[error("truncation length 0x{0:X} exceeds 24-bit limit 0xFFFFFF")]
    TruncationOutOfRange(u32),

    /// Record offset does not fit in 24 bits
    #[error("record offset 0x{0:X} exceeds 24-bit limit 0xFFFFFF")]
    OffsetOutOfRange(u32),

    /// Record offset encodes as the ASCII `EOF` terminator
    #[error("record offset 0x{0:06X} is indistinguishable from the EOF marker")]
    OffsetCollidesWithEof(u32),

    /// Record has no payload
    #[error("record at offset 0x{0:06X} has an empty payload")]
    EmptyRecord(u32),

    /// Record payload does not fit the 16-bit length field
    #[error("record at offset 0x{offset:06X} has {len} bytes, limit is 65535")]
    RecordTooLarge {
        /// Record offset
        offset: u32,
        /// Payload length
        len: usize,
    },
}

impl IpsError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidMagic(_) => ErrorKind::Format,
            Self::Truncated { .. } => ErrorKind::Truncation,
            Self::OffsetOutOfRange(_)
            | Self::OffsetCollidesWithEof(_)
            | Self::EmptyRecord(_)
            | Self::TruncationOutOfRange(_)
            | Self::RecordTooLarge { .. } => ErrorKind::EncodingConstraint,
        }
    }
}

/// Result type for IPS operations
pub type IpsResult<T> = Result<T, IpsError>;
