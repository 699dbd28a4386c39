//! Error classification shared by all format modules
//!
//! Each format has its own error enum. Every variant maps onto one of the
//! kinds below so callers can react to the class of failure without matching
//! on format-specific variants.

use std::fmt;

/// Broad class of a format error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input bytes are structurally invalid (bad magic, unknown section,
    /// index out of range, malformed label)
    Format,
    /// Input ended before an expected field or terminator
    Truncation,
    /// In-memory value cannot be represented in the binary format
    EncodingConstraint,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Format => "format error",
            Self::Truncation => "truncation error",
            Self::EncodingConstraint => "encoding constraint error",
        };
        f.write_str(name)
    }
}
