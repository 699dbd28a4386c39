//! DARC container archive implementation
//!
//! DARC packs a flat set of named files into one image. The application
//! reads these from its RomFS, often after BLZ compression.
//!
//! # Format Structure
//!
//! ```text
//! DARC File:
//! ├── Header (28 bytes)
//! │   ├── magic "darc" (BE)
//! │   ├── byte-order mark (BE u16: 0xFFFE little, 0xFEFF big)
//! │   ├── header_size (u16) = 28
//! │   ├── version (u32) = 0x01000000
//! │   ├── file_size (u32)
//! │   ├── table_offset (u32) = 28
//! │   ├── table_size (u32): rows * 12 + label bytes
//! │   └── data_offset (u32): 0x80 aligned
//! ├── Entry Table (12-byte rows)
//! │   ├── root descriptor (flagged, total row count)
//! │   ├── root label (flagged, label offset)
//! │   └── entries (label_offset, data_offset, data_size)
//! ├── Label Block (NUL-terminated UTF-16, zero padded)
//! └── Data Block (each entry 0x80 aligned)
//! ```
//!
//! # Usage
//!
//! ```rust
//! use kaeru_formats::darc::{DarcArchive, DarcBuilder};
//! use kaeru_formats::Endianness;
//!
//! let data = DarcBuilder::new()
//!     .endianness(Endianness::Little)
//!     .add_entry("common.msbt", vec![0u8; 16])
//!     .add_entry("logo.bclim", vec![1u8; 300])
//!     .build()?;
//!
//! let archive = DarcArchive::parse(&data)?;
//! assert_eq!(archive.entries.len(), 2);
//! assert_eq!(archive.entry("logo.bclim").map(|e| e.data.len()), Some(300));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod builder;
mod error;
mod header;
mod table;

pub use builder::{DATA_ALIGNMENT, DarcBuilder, ROOT_LABEL_OFFSET, write_archive};
pub use error::{DarcError, DarcResult};
pub use header::{DARC_HEADER_SIZE, DARC_MAGIC, DARC_VERSION, DarcHeader};
pub use table::{DarcTable, FOLDER_FLAG, LABEL_OFFSET_MASK, ROW_SIZE, TableRow};

use crate::Endianness;
use crate::utf16::{self, Utf16Error};

/// Name of the root folder written by the builder
pub const ROOT_LABEL: &str = ".";

/// A named file inside an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DarcEntry {
    /// File name
    pub name: String,
    /// File contents
    pub data: Vec<u8>,
}

/// A DARC archive with a single root folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DarcArchive {
    /// Byte order of the archive fields
    pub endianness: Endianness,
    /// Name of the root folder
    pub root_name: String,
    /// Entries in on-disk order
    pub entries: Vec<DarcEntry>,
}

impl Default for DarcArchive {
    fn default() -> Self {
        Self::new()
    }
}

impl DarcArchive {
    /// Create an empty little-endian archive
    pub fn new() -> Self {
        Self {
            endianness: Endianness::Little,
            root_name: ROOT_LABEL.to_string(),
            entries: Vec::new(),
        }
    }

    /// Append an entry
    pub fn add_entry(&mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) -> &mut DarcEntry {
        self.entries.push(DarcEntry {
            name: name.into(),
            data: data.into(),
        });
        let last = self.entries.len() - 1;
        &mut self.entries[last]
    }

    /// Find an entry by name
    pub fn entry(&self, name: &str) -> Option<&DarcEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Parse a DARC archive
    pub fn parse(data: &[u8]) -> DarcResult<Self> {
        let table = DarcTable::parse(data)?;
        let endianness = table.header.endianness;
        let label_base = table.label_base();

        let mut archive = Self {
            endianness,
            root_name: String::new(),
            entries: Vec::with_capacity(table.rows.len().saturating_sub(2)),
        };

        for row in &table.rows {
            match *row {
                TableRow::RootDescriptor { .. } => {}
                TableRow::RootLabel { label_offset, .. } => {
                    archive.root_name =
                        read_label(data, label_base + label_offset as usize, endianness)?;
                }
                TableRow::Entry {
                    label_offset,
                    data_offset,
                    data_size,
                } => {
                    let start = data_offset as usize;
                    let end = start + data_size as usize;
                    let bytes = data.get(start..end).ok_or(DarcError::Truncated {
                        offset: start,
                        needed: data_size as usize,
                    })?;
                    let name = read_label(data, label_base + label_offset as usize, endianness)?;
                    archive.entries.push(DarcEntry {
                        name,
                        data: bytes.to_vec(),
                    });
                }
            }
        }

        Ok(archive)
    }

    /// Build the archive bytes
    pub fn build(&self) -> DarcResult<Vec<u8>> {
        write_archive(self)
    }
}

fn read_label(data: &[u8], offset: usize, endianness: Endianness) -> DarcResult<String> {
    utf16::read_nul_terminated(data, offset, endianness).map_err(|err| match err {
        Utf16Error::Unterminated { offset } => DarcError::Truncated { offset, needed: 2 },
        Utf16Error::Invalid { offset } => DarcError::InvalidLabel(offset),
    })
}

impl crate::KaeruFormat for DarcArchive {
    fn parse(data: &[u8]) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::parse(data)?)
    }

    fn build(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        Ok(self.build()?)
    }
}
