//! MSBT sections
//!
//! Each section is a 16-byte header followed by its content, padded so the
//! next section starts on a 16-byte boundary.
//!
//! ```text
//! tag[4] size(u32) reserved[8] content[size] padding(0xAB)
//! ```

use crate::Endianness;
use crate::msbt::error::{MsbtError, MsbtResult};
use binrw::io::{Cursor, Read, Seek, Write};
use binrw::{BinRead, BinResult, BinWrite, Endian};

/// Section header size
pub const SECTION_HEADER_SIZE: usize = 16;
/// Section alignment
pub const SECTION_ALIGNMENT: usize = 16;
/// Byte used to pad section content
pub const PADDING_BYTE: u8 = 0xAB;

/// Label index section tag
pub const LBL1_TAG: [u8; 4] = *b"LBL1";
/// Attribute section tag
pub const ATR1_TAG: [u8; 4] = *b"ATR1";
/// String pool section tag
pub const TXT2_TAG: [u8; 4] = *b"TXT2";

/// Header preceding every section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionHeader {
    /// Four-character section tag
    pub tag: [u8; 4],
    /// Content size, excluding padding
    pub size: u32,
}

impl BinRead for SectionHeader {
    type Args<'a> = ();

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let tag = <[u8; 4]>::read_options(reader, endian, ())?;
        let size = u32::read_options(reader, endian, ())?;
        let _reserved = <[u8; 8]>::read_options(reader, endian, ())?;
        Ok(Self { tag, size })
    }
}

impl BinWrite for SectionHeader {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        writer.write_all(&self.tag)?;
        self.size.write_options(writer, endian, ())?;
        writer.write_all(&[0u8; 8])?;
        Ok(())
    }
}

/// Bytes of padding needed after `len` content bytes
pub fn padding_for(len: usize) -> usize {
    (SECTION_ALIGNMENT - len % SECTION_ALIGNMENT) % SECTION_ALIGNMENT
}

/// Append a section header, its content and 0xAB padding
pub fn write_section(
    out: &mut Vec<u8>,
    tag: [u8; 4],
    content: &[u8],
    endianness: Endianness,
) -> MsbtResult<()> {
    let size = u32::try_from(content.len()).map_err(|_| MsbtError::TableTooLarge(content.len()))?;
    let mut cursor = Cursor::new(Vec::with_capacity(SECTION_HEADER_SIZE));
    SectionHeader { tag, size }.write_options(&mut cursor, endianness.into(), ())?;

    out.extend_from_slice(&cursor.into_inner());
    out.extend_from_slice(content);
    out.resize(out.len() + padding_for(content.len()), PADDING_BYTE);
    Ok(())
}

/// Bounds-checked reader over one section's content.
///
/// Offsets passed in are relative to the content start; errors report
/// absolute file offsets.
#[derive(Debug, Clone, Copy)]
pub struct SectionReader<'a> {
    content: &'a [u8],
    base: usize,
    endianness: Endianness,
}

impl<'a> SectionReader<'a> {
    /// Wrap section content located at `base` in the file
    pub fn new(content: &'a [u8], base: usize, endianness: Endianness) -> Self {
        Self {
            content,
            base,
            endianness,
        }
    }

    /// Content bytes
    pub fn content(&self) -> &'a [u8] {
        self.content
    }

    /// Absolute file offset of a content-relative position
    pub fn absolute(&self, pos: usize) -> usize {
        self.base + pos
    }

    /// Borrow `len` bytes at `pos`
    pub fn bytes(&self, pos: usize, len: usize) -> MsbtResult<&'a [u8]> {
        pos.checked_add(len)
            .and_then(|end| self.content.get(pos..end))
            .ok_or(MsbtError::Truncated {
                offset: self.absolute(pos),
                needed: len,
            })
    }

    /// Read one byte at `pos`
    pub fn u8(&self, pos: usize) -> MsbtResult<u8> {
        Ok(self.bytes(pos, 1)?[0])
    }

    /// Read a `u32` at `pos` in the table's byte order
    pub fn u32(&self, pos: usize) -> MsbtResult<u32> {
        let b = self.bytes(pos, 4)?;
        Ok(self.endianness.read_u32([b[0], b[1], b[2], b[3]]))
    }
}

/// Content of the three required sections
#[derive(Debug, Clone, Copy)]
pub struct Sections<'a> {
    /// Label index
    pub lbl1: SectionReader<'a>,
    /// Attribute blob
    pub atr1: SectionReader<'a>,
    /// String pool
    pub txt2: SectionReader<'a>,
}

impl<'a> Sections<'a> {
    /// Walk `count` section headers starting at `start`.
    ///
    /// Sections may appear in any order. Padding bytes are skipped without
    /// checking their value, and padding after the final section may be
    /// absent.
    pub fn scan(
        data: &'a [u8],
        start: usize,
        count: u16,
        endianness: Endianness,
    ) -> MsbtResult<Self> {
        let mut lbl1 = None;
        let mut atr1 = None;
        let mut txt2 = None;

        let mut pos = start;
        for _ in 0..count {
            let header_bytes =
                data.get(pos..pos + SECTION_HEADER_SIZE)
                    .ok_or(MsbtError::Truncated {
                        offset: pos,
                        needed: SECTION_HEADER_SIZE,
                    })?;
            let header = SectionHeader::read_options(
                &mut Cursor::new(header_bytes),
                endianness.into(),
                (),
            )?;

            let content_start = pos + SECTION_HEADER_SIZE;
            let size = header.size as usize;
            let content = data
                .get(content_start..content_start + size)
                .ok_or(MsbtError::Truncated {
                    offset: content_start,
                    needed: size,
                })?;
            let reader = SectionReader::new(content, content_start, endianness);

            let slot = match &header.tag {
                tag if *tag == LBL1_TAG => &mut lbl1,
                tag if *tag == ATR1_TAG => &mut atr1,
                tag if *tag == TXT2_TAG => &mut txt2,
                _ => return Err(MsbtError::UnknownSection(header.tag)),
            };
            if slot.replace(reader).is_some() {
                return Err(MsbtError::DuplicateSection(header.tag));
            }

            pos = content_start + size + padding_for(size);
        }

        Ok(Self {
            lbl1: lbl1.ok_or(MsbtError::MissingSection("LBL1"))?,
            atr1: atr1.ok_or(MsbtError::MissingSection("ATR1"))?,
            txt2: txt2.ok_or(MsbtError::MissingSection("TXT2"))?,
        })
    }
}
