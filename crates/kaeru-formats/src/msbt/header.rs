//! MSBT file header

use crate::Endianness;
use binrw::io::{Read, Seek, Write};
use binrw::{BinRead, BinResult, BinWrite, Endian};

/// MSBT magic bytes
pub const MSBT_MAGIC: [u8; 8] = *b"MsgStdBn";
/// Size of the fixed header
pub const MSBT_HEADER_SIZE: usize = 32;
/// Vendor constant stored in the second reserved field
pub const MSBT_RESERVED: u16 = 769;
/// Number of sections written by the builder
pub const MSBT_SECTION_COUNT: u16 = 3;

const HEADER_PADDING: [u8; 10] = [0; 10];

/// MSBT file header (32 bytes)
///
/// ```text
/// magic[8] bom(BE u16) 0(u16) 769(u16) sections(u16) 0(u16) file_size(u32) pad[10]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MsbtHeader {
    /// Byte order of every field after the byte-order mark
    pub endianness: Endianness,
    /// Number of section headers that follow
    pub section_count: u16,
    /// Total file size
    pub file_size: u32,
}

impl MsbtHeader {
    /// Header for a freshly built table
    pub fn new(endianness: Endianness, file_size: u32) -> Self {
        Self {
            endianness,
            section_count: MSBT_SECTION_COUNT,
            file_size,
        }
    }
}

impl BinRead for MsbtHeader {
    type Args<'a> = ();

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        _endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let pos = reader.stream_position()?;

        let magic = <[u8; 8]>::read_options(reader, Endian::Big, ())?;
        if magic != MSBT_MAGIC {
            return Err(binrw::Error::BadMagic {
                pos,
                found: Box::new(magic),
            });
        }

        let bom = u16::read_options(reader, Endian::Big, ())?;
        let endianness = Endianness::from_bom(bom).ok_or_else(|| binrw::Error::AssertFail {
            pos: pos + 8,
            message: format!("invalid byte-order mark 0x{bom:04X}"),
        })?;
        let endian = Endian::from(endianness);

        // Reserved fields are not checked
        let _reserved = <[u16; 2]>::read_options(reader, endian, ())?;
        let section_count = u16::read_options(reader, endian, ())?;
        let _reserved = u16::read_options(reader, endian, ())?;
        let file_size = u32::read_options(reader, endian, ())?;
        let _padding = <[u8; 10]>::read_options(reader, endian, ())?;

        Ok(Self {
            endianness,
            section_count,
            file_size,
        })
    }
}

impl BinWrite for MsbtHeader {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        _endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        writer.write_all(&MSBT_MAGIC)?;
        self.endianness
            .bom()
            .write_options(writer, Endian::Big, ())?;

        let endian = Endian::from(self.endianness);
        0u16.write_options(writer, endian, ())?;
        MSBT_RESERVED.write_options(writer, endian, ())?;
        self.section_count.write_options(writer, endian, ())?;
        0u16.write_options(writer, endian, ())?;
        self.file_size.write_options(writer, endian, ())?;
        writer.write_all(&HEADER_PADDING)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn write(header: &MsbtHeader) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        header
            .write_options(&mut cursor, Endian::Little, ())
            .expect("Operation should succeed");
        cursor.into_inner()
    }

    #[test]
    fn test_little_endian_layout() {
        let bytes = write(&MsbtHeader::new(Endianness::Little, 0x120));

        assert_eq!(bytes.len(), MSBT_HEADER_SIZE);
        assert_eq!(&bytes[0..8], b"MsgStdBn");
        assert_eq!(&bytes[8..10], &[0xFF, 0xFE]);
        assert_eq!(&bytes[10..12], &[0, 0]);
        assert_eq!(&bytes[12..14], &769u16.to_le_bytes());
        assert_eq!(&bytes[14..16], &3u16.to_le_bytes());
        assert_eq!(&bytes[16..18], &[0, 0]);
        assert_eq!(&bytes[18..22], &0x120u32.to_le_bytes());
        assert!(bytes[22..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_big_endian_round_trip() {
        let header = MsbtHeader::new(Endianness::Big, 0x1000);
        let bytes = write(&header);
        assert_eq!(&bytes[8..10], &[0xFE, 0xFF]);
        assert_eq!(&bytes[12..14], &769u16.to_be_bytes());

        let parsed = MsbtHeader::read_options(&mut Cursor::new(&bytes), Endian::Little, ())
            .expect("Operation should succeed");
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = write(&MsbtHeader::new(Endianness::Little, 32));
        bytes[0..8].copy_from_slice(b"MsgPrjBn");
        let result = MsbtHeader::read_options(&mut Cursor::new(&bytes), Endian::Big, ());
        assert!(matches!(result, Err(binrw::Error::BadMagic { pos: 0, .. })));
    }
}
