//! DARC entry table rows
//!
//! Every row is three `u32` fields. The top byte of the first field flags the
//! two synthetic folder rows that open the table; the remaining rows describe
//! archive entries.
//!
//! ```text
//! RootDescriptor: (0x01000000,                0, total_entries)
//! RootLabel:      (0x01000000 | label_offset, 0, total_entries)
//! Entry:          (label_offset, data_offset, data_size)
//! ```

use crate::darc::error::{DarcError, DarcResult};
use crate::darc::header::{DARC_HEADER_SIZE, DarcHeader};
use binrw::io::{Cursor, Read, Seek, Write};
use binrw::{BinRead, BinResult, BinWrite, Endian};

/// Flag marking a folder row
pub const FOLDER_FLAG: u32 = 0x0100_0000;
/// Bits of the first field holding the label offset
pub const LABEL_OFFSET_MASK: u32 = 0x00FF_FFFF;
/// Size of one table row
pub const ROW_SIZE: usize = 12;

/// One row of the entry table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableRow {
    /// Root folder; `total_entries` counts every row including this one
    RootDescriptor {
        /// Number of rows in the table
        total_entries: u32,
    },
    /// Name of the root folder
    RootLabel {
        /// Offset of the root label in the label block
        label_offset: u32,
        /// Number of rows in the table
        total_entries: u32,
    },
    /// A file stored in the archive
    Entry {
        /// Offset of the entry label in the label block
        label_offset: u32,
        /// Absolute offset of the entry data
        data_offset: u32,
        /// Size of the entry data
        data_size: u32,
    },
}

impl TableRow {
    fn from_fields(label: u32, second: u32, third: u32) -> Self {
        let label_offset = label & LABEL_OFFSET_MASK;
        if label & !LABEL_OFFSET_MASK == 0 {
            Self::Entry {
                label_offset,
                data_offset: second,
                data_size: third,
            }
        } else if label_offset == 0 {
            Self::RootDescriptor {
                total_entries: third,
            }
        } else {
            Self::RootLabel {
                label_offset,
                total_entries: third,
            }
        }
    }

    fn to_fields(self) -> [u32; 3] {
        match self {
            Self::RootDescriptor { total_entries } => [FOLDER_FLAG, 0, total_entries],
            Self::RootLabel {
                label_offset,
                total_entries,
            } => [FOLDER_FLAG | label_offset, 0, total_entries],
            Self::Entry {
                label_offset,
                data_offset,
                data_size,
            } => [label_offset, data_offset, data_size],
        }
    }
}

impl BinRead for TableRow {
    type Args<'a> = ();

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let [label, second, third] = <[u32; 3]>::read_options(reader, endian, ())?;
        Ok(Self::from_fields(label, second, third))
    }
}

impl BinWrite for TableRow {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        self.to_fields().write_options(writer, endian, ())
    }
}

#[derive(Debug, Clone, Copy)]
enum ScanState {
    AwaitingRoot,
    Reading { total: usize },
}

/// Header plus the validated rows of a DARC entry table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DarcTable {
    /// File header
    pub header: DarcHeader,
    /// Rows in table order, starting with the root descriptor
    pub rows: Vec<TableRow>,
}

impl DarcTable {
    /// Parse the header and scan the entry table.
    ///
    /// The first row must be the root descriptor; its entry count decides how
    /// many rows follow.
    pub fn parse(data: &[u8]) -> DarcResult<Self> {
        if data.len() < DARC_HEADER_SIZE {
            return Err(DarcError::Truncated {
                offset: 0,
                needed: DARC_HEADER_SIZE,
            });
        }

        let header = DarcHeader::read_options(&mut Cursor::new(data), Endian::Big, ()).map_err(
            |err| match err {
                binrw::Error::BadMagic { .. } => {
                    DarcError::InvalidMagic([data[0], data[1], data[2], data[3]])
                }
                binrw::Error::AssertFail { .. } => {
                    DarcError::InvalidByteOrderMark(u16::from_be_bytes([data[4], data[5]]))
                }
                other => DarcError::BinRw(other),
            },
        )?;
        let endianness = header.endianness;
        let table_offset = header.table_offset as usize;

        let mut rows = Vec::new();
        let mut state = ScanState::AwaitingRoot;
        loop {
            let row_offset = table_offset + rows.len() * ROW_SIZE;
            let row_bytes =
                data.get(row_offset..row_offset + ROW_SIZE)
                    .ok_or(DarcError::Truncated {
                        offset: row_offset,
                        needed: ROW_SIZE,
                    })?;
            let row = TableRow::read_options(&mut Cursor::new(row_bytes), endianness.into(), ())?;

            state = match (state, row) {
                (ScanState::AwaitingRoot, TableRow::RootDescriptor { total_entries }) => {
                    ScanState::Reading {
                        total: total_entries as usize,
                    }
                }
                (ScanState::AwaitingRoot, _) => return Err(DarcError::MissingRootDescriptor),
                (ScanState::Reading { .. }, TableRow::RootDescriptor { .. }) => {
                    return Err(DarcError::NestedFolder(rows.len()));
                }
                (reading, _) => reading,
            };
            rows.push(row);

            if let ScanState::Reading { total } = state {
                if rows.len() >= total {
                    break;
                }
            }
        }

        Ok(Self { header, rows })
    }

    /// Offset of the label block: labels follow the last table row
    pub fn label_base(&self) -> usize {
        self.header.table_offset as usize + self.rows.len() * ROW_SIZE
    }

    /// Entry rows in table order
    pub fn entries(&self) -> impl Iterator<Item = &TableRow> {
        self.rows
            .iter()
            .filter(|row| matches!(row, TableRow::Entry { .. }))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::Endianness;

    fn write_rows(rows: &[TableRow], endian: Endian) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        for row in rows {
            row.write_options(&mut cursor, endian, ()).unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_row_encoding() {
        let rows = [
            TableRow::RootDescriptor { total_entries: 3 },
            TableRow::RootLabel {
                label_offset: 2,
                total_entries: 3,
            },
            TableRow::Entry {
                label_offset: 6,
                data_offset: 0x80,
                data_size: 5,
            },
        ];
        let bytes = write_rows(&rows, Endian::Big);

        assert_eq!(&bytes[0..12], &[1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 3]);
        assert_eq!(&bytes[12..16], &[1, 0, 0, 2]);
        assert_eq!(&bytes[24..28], &[0, 0, 0, 6]);
        assert_eq!(&bytes[28..32], &[0, 0, 0, 0x80]);
    }

    #[test]
    fn test_row_decoding() {
        for row in [
            TableRow::RootDescriptor { total_entries: 9 },
            TableRow::RootLabel {
                label_offset: 2,
                total_entries: 9,
            },
            TableRow::Entry {
                label_offset: 0x00AB_CDEF,
                data_offset: 0x1_0000,
                data_size: 77,
            },
        ] {
            let bytes = write_rows(&[row], Endian::Little);
            let parsed = TableRow::read_options(&mut Cursor::new(&bytes), Endian::Little, ())
                .unwrap();
            assert_eq!(parsed, row);
        }
    }

    #[test]
    fn test_any_top_byte_flags_folder() {
        let bytes = write_rows(
            &[TableRow::Entry {
                label_offset: 0x8000_0004,
                data_offset: 0,
                data_size: 3,
            }],
            Endian::Little,
        );
        let parsed =
            TableRow::read_options(&mut Cursor::new(&bytes), Endian::Little, ()).unwrap();
        assert_eq!(
            parsed,
            TableRow::RootLabel {
                label_offset: 4,
                total_entries: 3
            }
        );
    }

    fn archive_with_rows(rows: &[TableRow]) -> Vec<u8> {
        let table = write_rows(rows, Endian::Little);
        let mut cursor = Cursor::new(Vec::new());
        DarcHeader::new(
            Endianness::Little,
            table.len() as u32,
            0x80,
            (DARC_HEADER_SIZE + table.len()) as u32,
        )
        .write_options(&mut cursor, Endian::Little, ())
        .unwrap();
        let mut data = cursor.into_inner();
        data.extend_from_slice(&table);
        data
    }

    #[test]
    fn test_missing_root_descriptor() {
        let data = archive_with_rows(&[TableRow::Entry {
            label_offset: 0,
            data_offset: 0,
            data_size: 0,
        }]);
        assert!(matches!(
            DarcTable::parse(&data),
            Err(DarcError::MissingRootDescriptor)
        ));
    }

    #[test]
    fn test_nested_folder_rejected() {
        let data = archive_with_rows(&[
            TableRow::RootDescriptor { total_entries: 3 },
            TableRow::RootDescriptor { total_entries: 3 },
            TableRow::RootDescriptor { total_entries: 3 },
        ]);
        assert!(matches!(
            DarcTable::parse(&data),
            Err(DarcError::NestedFolder(1))
        ));
    }

    #[test]
    fn test_rows_past_end_are_truncation() {
        let data = archive_with_rows(&[
            TableRow::RootDescriptor { total_entries: 4 },
            TableRow::RootLabel {
                label_offset: 2,
                total_entries: 4,
            },
        ]);
        let err = DarcTable::parse(&data).unwrap_err();
        assert!(matches!(
            err,
            DarcError::Truncated {
                offset: 52,
                needed: 12
            }
        ));
        assert_eq!(err.kind(), crate::ErrorKind::Truncation);
    }
}
