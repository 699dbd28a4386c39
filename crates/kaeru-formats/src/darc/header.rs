//! DARC header structure

use crate::Endianness;
use binrw::{BinRead, BinResult, BinWrite, Endian};
use binrw::io::{Read, Seek, Write};

/// DARC magic bytes
pub const DARC_MAGIC: [u8; 4] = *b"darc";
/// Size of the fixed header; also the entry table offset
pub const DARC_HEADER_SIZE: usize = 28;
/// Format version written by the builder
pub const DARC_VERSION: u32 = 0x0100_0000;

/// DARC file header (28 bytes)
///
/// Magic and byte-order mark are big-endian; the remaining fields use the
/// byte order the mark selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DarcHeader {
    /// Byte order of every field after the byte-order mark
    pub endianness: Endianness,
    /// Header size in bytes (always 28)
    pub header_size: u16,
    /// Format version
    pub version: u32,
    /// Total file size
    pub file_size: u32,
    /// Offset of the entry table
    pub table_offset: u32,
    /// Size of the entry table plus the unpadded label block
    pub table_size: u32,
    /// Offset of the data section
    pub data_offset: u32,
}

impl DarcHeader {
    /// Header for a freshly built archive
    pub fn new(endianness: Endianness, table_size: u32, data_offset: u32, file_size: u32) -> Self {
        Self {
            endianness,
            header_size: DARC_HEADER_SIZE as u16,
            version: DARC_VERSION,
            file_size,
            table_offset: DARC_HEADER_SIZE as u32,
            table_size,
            data_offset,
        }
    }
}

impl BinRead for DarcHeader {
    type Args<'a> = ();

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        _endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let pos = reader.stream_position()?;

        let magic = <[u8; 4]>::read_options(reader, Endian::Big, ())?;
        if magic != DARC_MAGIC {
            return Err(binrw::Error::BadMagic {
                pos,
                found: Box::new(magic),
            });
        }

        let bom = u16::read_options(reader, Endian::Big, ())?;
        let endianness = Endianness::from_bom(bom).ok_or_else(|| binrw::Error::AssertFail {
            pos: pos + 4,
            message: format!("invalid byte-order mark 0x{bom:04X}"),
        })?;
        let endian = Endian::from(endianness);

        Ok(Self {
            endianness,
            header_size: u16::read_options(reader, endian, ())?,
            version: u32::read_options(reader, endian, ())?,
            file_size: u32::read_options(reader, endian, ())?,
            table_offset: u32::read_options(reader, endian, ())?,
            table_size: u32::read_options(reader, endian, ())?,
            data_offset: u32::read_options(reader, endian, ())?,
        })
    }
}

impl BinWrite for DarcHeader {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        _endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        writer.write_all(&DARC_MAGIC)?;
        self.endianness
            .bom()
            .write_options(writer, Endian::Big, ())?;

        let endian = Endian::from(self.endianness);
        self.header_size.write_options(writer, endian, ())?;
        self.version.write_options(writer, endian, ())?;
        self.file_size.write_options(writer, endian, ())?;
        self.table_offset.write_options(writer, endian, ())?;
        self.table_size.write_options(writer, endian, ())?;
        self.data_offset.write_options(writer, endian, ())?;
        Ok(())
    }
}
