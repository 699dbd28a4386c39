//! File format parsers and builders for Flipnote Studio 3D patching
//!
#![allow(clippy::cast_possible_truncation)] // Intentional for binary format parsing
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::uninlined_format_args)] // Backwards compatibility
#![allow(clippy::doc_markdown)] // Many format-specific terms don't need backticks
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::return_self_not_must_use)] // Builder patterns
#![allow(clippy::use_self)] // Type clarity
//! This crate provides symmetric (parser and builder) implementations for the
//! three binary formats needed to redirect the application to a replacement
//! server: a code patch and the RomFS assets it reads.
//!
//! # Supported Formats
//!
//! - **IPS**: Sparse offset/bytes patch records with run-length compression
//! - **DARC**: Flat container archive packing named blobs with a label table
//! - **MSBT**: Grouped label to UTF-16 string table used for localized text
//!
//! # Design Principles
//!
//! Every format implementation follows these principles:
//! - **Symmetric Operations**: Both parsing and building supported
//! - **Explicit Byte Order**: Endianness is detected from the byte-order mark
//!   and threaded through every multi-byte field
//! - **Validate Before Writing**: Encoding constraints are checked before any
//!   output is produced
//! - **Round-Trip Guarantee**: parse(build(data)) == data

#![warn(missing_docs)]

/// DARC container archive format
///
/// This module provides parsing and building support for DARC archives, the
/// flat filesystem images the application loads from its RomFS. An archive
/// holds a single root folder whose entries are named byte blobs.
///
/// Key features:
/// - **Runtime Endianness**: Byte-order mark selects little or big endian
/// - **Typed Entry Table**: Root descriptor, root label and entry rows are
///   modelled as a tagged variant instead of flag bit masks
/// - **Aligned Data**: Entry data starts on 0x80 byte boundaries
///
/// See the [`darc`] module for detailed usage examples.
pub mod darc;
pub mod endian;
pub mod error;
/// IPS patch format for sparse byte edits against an unseen target file
pub mod ips;
/// MSBT string table format and its editable JSON interchange form
///
/// This module provides parsing and building support for MSBT files made of
/// `LBL1`, `ATR1` and `TXT2` sections, plus the [`msbt::MsbtDocument`]
/// shape translators edit outside the binary format.
///
/// See the [`msbt`] module for detailed usage examples.
pub mod msbt;
mod utf16;

// Test utilities module
#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
pub(crate) mod test_utils;

pub use endian::Endianness;
pub use error::ErrorKind;

/// Common format trait that all formats implement
pub trait KaeruFormat: Sized {
    /// Parse from bytes
    fn parse(data: &[u8]) -> Result<Self, Box<dyn std::error::Error>>;

    /// Build to bytes
    fn build(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>>;

    /// Verify round-trip correctness
    fn verify_round_trip(data: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
        let parsed = Self::parse(data)?;
        let rebuilt = parsed.build()?;
        if data != rebuilt.as_slice() {
            return Err("Round-trip verification failed".into());
        }
        Ok(())
    }
}
