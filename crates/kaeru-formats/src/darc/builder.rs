//! DARC builder and layout writer
//!
//! Layout produced by [`write_archive`]:
//! - 28-byte header
//! - entry table: root descriptor, root label, one row per entry
//! - label block: empty root name, root label, entry labels, zero padding so
//!   the data section starts on a 0x80 boundary
//! - data block: entry data, each entry starting on a 0x80 boundary relative
//!   to the data section

use crate::Endianness;
use crate::darc::error::{DarcError, DarcResult};
use crate::darc::header::{DARC_HEADER_SIZE, DarcHeader};
use crate::darc::table::{LABEL_OFFSET_MASK, ROW_SIZE, TableRow};
use crate::darc::{DarcArchive, DarcEntry, ROOT_LABEL};
use crate::utf16;
use binrw::BinWrite;
use binrw::io::Cursor;

/// Alignment of the data section and of every entry inside it
pub const DATA_ALIGNMENT: usize = 0x80;
/// Offset of the root label inside the label block (after the empty name)
pub const ROOT_LABEL_OFFSET: u32 = 2;

/// Builder for DARC archives
#[derive(Debug, Clone)]
pub struct DarcBuilder {
    archive: DarcArchive,
}

impl DarcBuilder {
    /// Create a little-endian builder with the `.` root label
    pub fn new() -> Self {
        Self {
            archive: DarcArchive::new(),
        }
    }

    /// Set the byte order of the archive fields
    pub fn endianness(mut self, endianness: Endianness) -> Self {
        self.archive.endianness = endianness;
        self
    }

    /// Append an entry; insertion order is the on-disk order
    pub fn add_entry(mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.archive.add_entry(name, data);
        self
    }

    /// Number of entries added so far
    pub fn entry_count(&self) -> usize {
        self.archive.entries.len()
    }

    /// Finish and return the in-memory archive
    pub fn finish(self) -> DarcArchive {
        self.archive
    }

    /// Build the archive bytes
    pub fn build(&self) -> DarcResult<Vec<u8>> {
        write_archive(&self.archive)
    }
}

impl Default for DarcBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn padding_for(len: usize) -> usize {
    (DATA_ALIGNMENT - len % DATA_ALIGNMENT) % DATA_ALIGNMENT
}

fn check_name(name: &str) -> DarcResult<()> {
    if name.contains('\0') {
        return Err(DarcError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn to_u32(value: usize) -> DarcResult<u32> {
    u32::try_from(value).map_err(|_| DarcError::ArchiveTooLarge(value))
}

/// Serialize an archive.
///
/// All size and name constraints are checked before the output buffer is
/// assembled.
pub fn write_archive(archive: &DarcArchive) -> DarcResult<Vec<u8>> {
    let endian = archive.endianness;
    let root_name = if archive.root_name.is_empty() {
        ROOT_LABEL
    } else {
        archive.root_name.as_str()
    };
    check_name(root_name)?;

    // Label block always opens with the empty name of the root descriptor
    let mut labels = vec![0u8; 2];
    utf16::write_nul_terminated(&mut labels, root_name, endian);

    let mut label_offsets = Vec::with_capacity(archive.entries.len());
    let mut data_offsets = Vec::with_capacity(archive.entries.len());
    let mut data = Vec::new();
    for DarcEntry {
        name,
        data: entry_data,
    } in &archive.entries
    {
        check_name(name)?;
        if labels.len() > LABEL_OFFSET_MASK as usize {
            return Err(DarcError::LabelOffsetOverflow(labels.len()));
        }
        label_offsets.push(labels.len() as u32);

        data.resize(data.len() + padding_for(data.len()), 0);
        data_offsets.push(data.len());

        utf16::write_nul_terminated(&mut labels, name, endian);
        data.extend_from_slice(entry_data);
    }

    let row_count = archive.entries.len() + 2;
    let table_size = row_count * ROW_SIZE + labels.len();
    let unaligned_base = DARC_HEADER_SIZE + table_size;
    let base = unaligned_base + padding_for(unaligned_base);
    labels.resize(labels.len() + padding_for(unaligned_base), 0);

    let file_size = base + data.len();
    to_u32(file_size)?;
    let total_entries = row_count as u32;

    let mut rows = Vec::with_capacity(row_count);
    rows.push(TableRow::RootDescriptor { total_entries });
    rows.push(TableRow::RootLabel {
        label_offset: ROOT_LABEL_OFFSET,
        total_entries,
    });
    for ((label_offset, data_offset), entry) in label_offsets
        .iter()
        .zip(&data_offsets)
        .zip(&archive.entries)
    {
        rows.push(TableRow::Entry {
            label_offset: *label_offset,
            data_offset: (base + data_offset) as u32,
            data_size: entry.data.len() as u32,
        });
    }

    let header = DarcHeader::new(
        endian,
        table_size as u32,
        base as u32,
        file_size as u32,
    );

    let mut cursor = Cursor::new(Vec::with_capacity(file_size));
    header.write_options(&mut cursor, endian.into(), ())?;
    rows.write_options(&mut cursor, endian.into(), ())?;
    let mut output = cursor.into_inner();
    output.extend_from_slice(&labels);
    output.extend_from_slice(&data);

    debug_assert_eq!(output.len(), file_size);
    Ok(output)
}
