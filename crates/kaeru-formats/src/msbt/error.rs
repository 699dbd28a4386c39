//! MSBT error types

use crate::ErrorKind;
use thiserror::Error;

/// MSBT-specific error type
#[derive(Debug, Error)]
pub enum MsbtError {
    /// Invalid MSBT magic bytes
    #[error("invalid MSBT magic: expected 'MsgStdBn', got {0:?}")]
    InvalidMagic([u8; 8]),

    /// Byte-order mark is neither 0xFFFE nor 0xFEFF
    #[error("invalid byte-order mark: 0x{0:04X}")]
    InvalidByteOrderMark(u16),

    /// Data ended before an expected structure
    #[error("MSBT data truncated at offset {offset}: expected {needed} more bytes")]
    Truncated {
        /// Offset where more data was expected
        offset: usize,
        /// Bytes the structure needed
        needed: usize,
    },

    /// Section tag is not LBL1, ATR1 or TXT2
    #[error("unknown section tag {}", String::from_utf8_lossy(.0))]
    UnknownSection([u8; 4]),

    /// Same section tag appeared twice
    #[error("duplicate section {}", String::from_utf8_lossy(.0))]
    DuplicateSection([u8; 4]),

    /// A required section is absent
    #[error("missing required section {0}")]
    MissingSection(&'static str),

    /// Label references a string past the end of the pool
    #[error("string index {index} out of range (pool holds {count} strings)")]
    StringIndexOutOfRange {
        /// Index stored with the label
        index: u32,
        /// Number of strings in TXT2
        count: usize,
    },

    /// Stored label is not ASCII
    #[error("label at offset {offset} is not ASCII")]
    MalformedLabel {
        /// Offset of the label bytes
        offset: usize,
    },

    /// Stored string is not valid UTF-16
    #[error("invalid UTF-16 string at offset {offset}")]
    InvalidString {
        /// Offset of the first code unit
        offset: usize,
    },

    /// Label cannot be encoded as ASCII
    #[error("label {0:?} is not ASCII")]
    InvalidLabel(String),

    /// Label does not fit the 1-byte length prefix
    #[error("label {label:?} is {len} bytes; the limit is 255")]
    LabelTooLong {
        /// Offending label
        label: String,
        /// Encoded length
        len: usize,
    },

    /// Text contains a NUL character and cannot be terminated unambiguously
    #[error("text for label {label:?} contains a NUL character")]
    InvalidText {
        /// Label owning the text
        label: String,
    },

    /// Table does not fit 32-bit sizes
    #[error("string table size {0} exceeds 32-bit limit")]
    TableTooLarge(usize),

    /// Interchange document is not valid JSON
    #[error("invalid interchange document: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary parsing error
    #[error("binary parsing error: {0}")]
    BinRw(#[from] binrw::Error),
}

impl MsbtError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidMagic(_)
            | Self::InvalidByteOrderMark(_)
            | Self::UnknownSection(_)
            | Self::DuplicateSection(_)
            | Self::MissingSection(_)
            | Self::StringIndexOutOfRange { .. }
            | Self::MalformedLabel { .. }
            | Self::InvalidString { .. }
            | Self::Json(_)
            | Self::BinRw(_) => ErrorKind::Format,
            Self::Truncated { .. } => ErrorKind::Truncation,
            Self::InvalidLabel(_)
            | Self::LabelTooLong { .. }
            | Self::InvalidText { .. }
            | Self::TableTooLarge(_) => ErrorKind::EncodingConstraint,
        }
    }
}

/// Result type for MSBT operations
pub type MsbtResult<T> = Result<T, MsbtError>;
