//! IPS record structure and encoding

use crate::ips::error::{IpsError, IpsResult};

/// Largest offset a record can address (24 bits)
pub const MAX_OFFSET: u32 = 0x00FF_FFFF;
/// Largest payload a single record can carry (16-bit length field)
pub const MAX_RECORD_LEN: usize = 0xFFFF;
/// Payloads longer than this made of one repeated byte are run-length encoded
pub const RLE_THRESHOLD: usize = 3;
/// Offset whose big-endian encoding spells the `EOF` terminator
pub const EOF_OFFSET: u32 = u32::from_be_bytes([0, b'E', b'O', b'F']);

/// A single sparse edit: write `data` at `offset` in the target file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpsRecord {
    /// Absolute offset in the target file
    pub offset: u32,
    /// Bytes to write at the offset
    pub data: Vec<u8>,
}

impl IpsRecord {
    /// Create a record
    pub fn new(offset: u32, data: impl Into<Vec<u8>>) -> Self {
        Self {
            offset,
            data: data.into(),
        }
    }

    /// Check that the record can be represented in an IPS file
    pub fn validate(&self) -> IpsResult<()> {
        if self.offset > MAX_OFFSET {
            return Err(IpsError::OffsetOutOfRange(self.offset));
        }
        if self.offset == EOF_OFFSET {
            return Err(IpsError::OffsetCollidesWithEof(self.offset));
        }
        if self.data.is_empty() {
            return Err(IpsError::EmptyRecord(self.offset));
        }
        if self.data.len() > MAX_RECORD_LEN {
            return Err(IpsError::RecordTooLarge {
                offset: self.offset,
                len: self.data.len(),
            });
        }
        Ok(())
    }

    /// Whether this record is stored as a run-length record
    pub fn is_rle(&self) -> bool {
        self.data.len() > RLE_THRESHOLD && self.data.iter().all(|&b| b == self.data[0])
    }

    /// Number of bytes this record occupies in an IPS file
    pub fn encoded_len(&self) -> usize {
        if self.is_rle() {
            3 + 2 + 2 + 1
        } else {
            3 + 2 + self.data.len()
        }
    }

    /// File name used when dumping the payload to disk
    pub fn dump_name(&self) -> String {
        format!("0x{:08x}_0x{:04x}.bin", self.offset, self.data.len())
    }

    /// Append the encoded record. The record must already be validated.
    pub(crate) fn write_to(&self, out: &mut Vec<u8>) {
        write_uint24_be(out, self.offset);
        let len = self.data.len() as u16;
        if self.is_rle() {
            out.extend_from_slice(&[0, 0]);
            out.extend_from_slice(&len.to_be_bytes());
            out.push(self.data[0]);
        } else {
            out.extend_from_slice(&len.to_be_bytes());
            out.extend_from_slice(&self.data);
        }
    }

    /// Read one record body (everything after the 3-byte offset) at `pos`.
    pub(crate) fn read_body(data: &[u8], offset: u32, pos: &mut usize) -> IpsResult<Self> {
        let size = read_uint16_be(data, pos)?;
        if size == 0 {
            let count = read_uint16_be(data, pos)?;
            let value = take(data, pos, 1)?[0];
            Ok(Self::new(offset, vec![value; count as usize]))
        } else {
            let bytes = take(data, pos, size as usize)?;
            Ok(Self::new(offset, bytes))
        }
    }
}

/// Write a 3-byte big-endian unsigned integer (uint24)
pub fn write_uint24_be(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&[(value >> 16) as u8, (value >> 8) as u8, value as u8]);
}

/// Decode a 3-byte big-endian unsigned integer (uint24)
pub fn uint24_be(bytes: [u8; 3]) -> u32 {
    u32::from(bytes[0]) << 16 | u32::from(bytes[1]) << 8 | u32::from(bytes[2])
}

fn read_uint16_be(data: &[u8], pos: &mut usize) -> IpsResult<u16> {
    let bytes = take(data, pos, 2)?;
    Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
}

/// Borrow `len` bytes at `pos` and advance past them
pub(crate) fn take<'a>(data: &'a [u8], pos: &mut usize, len: usize) -> IpsResult<&'a [u8]> {
    let start = *pos;
    let bytes = data
        .get(start..start + len)
        .ok_or(IpsError::Truncated {
            offset: start,
            needed: len,
        })?;
    *pos += len;
    Ok(bytes)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rle_selection() {
        assert!(IpsRecord::new(0, vec![0xAA; 10]).is_rle());
        assert!(IpsRecord::new(0, vec![0x00; 4]).is_rle());
        assert!(!IpsRecord::new(0, vec![0xAA; 3]).is_rle());
        assert!(!IpsRecord::new(0, vec![0xAA, 0xAA, 0xAA, 0xAB]).is_rle());
    }

    #[test]
    fn test_rle_encoding() {
        let mut out = Vec::new();
        IpsRecord::new(0x0012_3456, vec![0xAA; 10]).write_to(&mut out);
        assert_eq!(out, [0x12, 0x34, 0x56, 0x00, 0x00, 0x00, 0x0A, 0xAA]);
    }

    #[test]
    fn test_literal_encoding() {
        let mut out = Vec::new();
        IpsRecord::new(0x10, vec![0xAA; 3]).write_to(&mut out);
        assert_eq!(out, [0x00, 0x00, 0x10, 0x00, 0x03, 0xAA, 0xAA, 0xAA]);
    }

    #[test]
    fn test_encoded_len_matches_output() {
        for record in [
            IpsRecord::new(1, vec![7; 300]),
            IpsRecord::new(2, b"https://example.net".to_vec()),
        ] {
            let mut out = Vec::new();
            record.write_to(&mut out);
            assert_eq!(out.len(), record.encoded_len());
        }
    }

    #[test]
    fn test_validation_limits() {
        assert_eq!(
            IpsRecord::new(0x0100_0000, vec![1]).validate(),
            Err(IpsError::OffsetOutOfRange(0x0100_0000))
        );
        assert!(IpsRecord::new(MAX_OFFSET, vec![1]).validate().is_ok());
        assert_eq!(
            IpsRecord::new(EOF_OFFSET, vec![1]).validate(),
            Err(IpsError::OffsetCollidesWithEof(0x454F46))
        );
        assert_eq!(
            IpsRecord::new(5, Vec::new()).validate(),
            Err(IpsError::EmptyRecord(5))
        );
        assert!(IpsRecord::new(5, vec![0; MAX_RECORD_LEN]).validate().is_ok());
        assert!(matches!(
            IpsRecord::new(5, vec![0; MAX_RECORD_LEN + 1]).validate(),
            Err(IpsError::RecordTooLarge { len: 0x10000, .. })
        ));
    }

    #[test]
    fn test_uint24() {
        let mut out = Vec::new();
        write_uint24_be(&mut out, 0x00AB_CDEF);
        assert_eq!(out, [0xAB, 0xCD, 0xEF]);
        assert_eq!(uint24_be([0xAB, 0xCD, 0xEF]), 0x00AB_CDEF);
    }

    #[test]
    fn test_dump_name() {
        let record = IpsRecord::new(0x1234, vec![0; 16]);
        assert_eq!(record.dump_name(), "0x00001234_0x0010.bin");
    }
}
