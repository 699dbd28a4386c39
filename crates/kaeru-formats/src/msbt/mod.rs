//! MSBT string table implementation
//!
//! MSBT maps ASCII labels to UTF-16 strings. Labels are partitioned into
//! groups; the strings live in a single pool indexed by each label's
//! position when all groups are flattened in order.
//!
//! # Format Structure
//!
//! ```text
//! MSBT File:
//! ├── Header (32 bytes)
//! │   ├── magic "MsgStdBn"
//! │   ├── byte-order mark (BE u16)
//! │   ├── 0 (u16), 769 (u16), section count (u16), 0 (u16)
//! │   ├── file_size (u32)
//! │   └── padding[10]
//! ├── LBL1: group table and labels with string indices
//! ├── ATR1: per-group attributes (opaque)
//! └── TXT2: string offset table and NUL-terminated UTF-16 strings
//! ```
//!
//! Every section is a 16-byte header plus content padded to 16 bytes with
//! 0xAB.
//!
//! # Usage
//!
//! ```rust
//! use kaeru_formats::msbt::Msbt;
//!
//! let mut table = Msbt::new();
//! table.add_group().add_entry("a", "hello");
//! table.add_group();
//! table
//!     .add_group()
//!     .add_entry("b", "world")
//!     .add_entry("c", "!");
//!
//! let data = table.build()?;
//! let parsed = Msbt::parse(&data)?;
//! assert_eq!(parsed.string_index("c"), Some(2));
//! assert_eq!(parsed, table);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod header;
mod json;
mod label;
mod section;
mod text;

pub use error::{MsbtError, MsbtResult};
pub use header::{MSBT_HEADER_SIZE, MSBT_MAGIC, MSBT_RESERVED, MSBT_SECTION_COUNT, MsbtHeader};
pub use json::{DocumentEntry, MsbtDocument};
pub use label::MAX_LABEL_LEN;
pub use section::{
    ATR1_TAG, LBL1_TAG, PADDING_BYTE, SECTION_ALIGNMENT, SECTION_HEADER_SIZE, SectionHeader,
    TXT2_TAG,
};

use crate::Endianness;
use binrw::io::Cursor;
use binrw::{BinRead, BinWrite, Endian};
use section::Sections;

/// A label and its text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MsbtEntry {
    /// ASCII label, at most 255 bytes
    pub label: String,
    /// Text stored in the string pool
    pub text: String,
}

impl MsbtEntry {
    /// Create an entry
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

/// An ordered group of entries; may be empty
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MsbtGroup {
    /// Entries in label-block order
    pub entries: Vec<MsbtEntry>,
}

impl MsbtGroup {
    /// Append an entry
    pub fn add_entry(&mut self, label: impl Into<String>, text: impl Into<String>) -> &mut Self {
        self.entries.push(MsbtEntry::new(label, text));
        self
    }
}

/// An MSBT string table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Msbt {
    /// Byte order of the table fields
    pub endianness: Endianness,
    /// Groups in LBL1 order
    pub groups: Vec<MsbtGroup>,
    /// Raw ATR1 content when it differs from the one rebuilt from `groups`
    pub attributes: Option<Vec<u8>>,
}

impl Msbt {
    /// Create an empty little-endian table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table with the given byte order
    pub fn with_endianness(endianness: Endianness) -> Self {
        Self {
            endianness,
            ..Self::default()
        }
    }

    /// Append an empty group
    pub fn add_group(&mut self) -> &mut MsbtGroup {
        self.groups.push(MsbtGroup::default());
        let last = self.groups.len() - 1;
        &mut self.groups[last]
    }

    /// All entries in string pool order
    pub fn entries(&self) -> impl ExactSizeIterator<Item = &MsbtEntry> + Clone {
        FlatEntries {
            groups: &self.groups,
            group: 0,
            entry: 0,
            remaining: self.groups.iter().map(|g| g.entries.len()).sum(),
        }
    }

    /// Look up an entry by label
    pub fn get(&self, label: &str) -> Option<&MsbtEntry> {
        self.entries().find(|e| e.label == label)
    }

    /// String pool index of the entry with `label`
    pub fn string_index(&self, label: &str) -> Option<usize> {
        self.entries().position(|e| e.label == label)
    }

    /// ATR1 content for `groups`: the number of non-empty groups and a zero
    pub fn default_attributes(&self) -> Vec<u8> {
        let non_empty = self.groups.iter().filter(|g| !g.entries.is_empty()).count() as u32;
        let mut out = Vec::with_capacity(8);
        out.extend_from_slice(&self.endianness.u32_bytes(non_empty));
        out.extend_from_slice(&self.endianness.u32_bytes(0));
        out
    }

    /// Parse an MSBT string table
    pub fn parse(data: &[u8]) -> MsbtResult<Self> {
        if data.len() < MSBT_HEADER_SIZE {
            return Err(MsbtError::Truncated {
                offset: 0,
                needed: MSBT_HEADER_SIZE,
            });
        }

        let header = MsbtHeader::read_options(&mut Cursor::new(data), Endian::Big, ()).map_err(
            |err| match err {
                binrw::Error::BadMagic { .. } => {
                    let mut magic = [0u8; 8];
                    magic.copy_from_slice(&data[0..8]);
                    MsbtError::InvalidMagic(magic)
                }
                binrw::Error::AssertFail { .. } => {
                    MsbtError::InvalidByteOrderMark(u16::from_be_bytes([data[8], data[9]]))
                }
                other => MsbtError::BinRw(other),
            },
        )?;
        let endianness = header.endianness;
        let sections = Sections::scan(data, MSBT_HEADER_SIZE, header.section_count, endianness)?;

        let strings = text::decode(&sections.txt2, endianness)?;
        let groups = label::decode(&sections.lbl1, &strings)?;

        let mut table = Self {
            endianness,
            groups,
            attributes: None,
        };
        if sections.atr1.content() != table.default_attributes().as_slice() {
            table.attributes = Some(sections.atr1.content().to_vec());
        }
        Ok(table)
    }

    /// Build the table bytes.
    ///
    /// Labels and texts are validated before any output is assembled.
    pub fn build(&self) -> MsbtResult<Vec<u8>> {
        let endianness = self.endianness;
        let lbl1 = label::encode(&self.groups, endianness)?;
        let txt2 = text::encode(
            self.entries()
                .map(|e| (e.label.as_str(), e.text.as_str())),
            endianness,
        )?;
        let atr1 = match &self.attributes {
            Some(raw) => raw.clone(),
            None => self.default_attributes(),
        };

        let mut body = Vec::new();
        section::write_section(&mut body, LBL1_TAG, &lbl1, endianness)?;
        section::write_section(&mut body, ATR1_TAG, &atr1, endianness)?;
        section::write_section(&mut body, TXT2_TAG, &txt2, endianness)?;

        let file_size = MSBT_HEADER_SIZE + body.len();
        let file_size_u32 =
            u32::try_from(file_size).map_err(|_| MsbtError::TableTooLarge(file_size))?;

        let mut cursor = Cursor::new(Vec::with_capacity(file_size));
        MsbtHeader::new(endianness, file_size_u32).write_options(
            &mut cursor,
            endianness.into(),
            (),
        )?;
        let mut output = cursor.into_inner();
        output.extend_from_slice(&body);
        Ok(output)
    }
}

/// Iterator over entries of all groups in order
#[derive(Clone)]
struct FlatEntries<'a> {
    groups: &'a [MsbtGroup],
    group: usize,
    entry: usize,
    remaining: usize,
}

impl<'a> Iterator for FlatEntries<'a> {
    type Item = &'a MsbtEntry;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(group) = self.groups.get(self.group) {
            if let Some(entry) = group.entries.get(self.entry) {
                self.entry += 1;
                self.remaining -= 1;
                return Some(entry);
            }
            self.group += 1;
            self.entry = 0;
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for FlatEntries<'_> {}

impl crate::KaeruFormat for Msbt {
    fn parse(data: &[u8]) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::parse(data)?)
    }

    fn build(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        Ok(self.build()?)
    }
}
