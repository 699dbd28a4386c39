//! IPS patch format implementation
//!
//! IPS describes sparse byte edits against a target file that never has to be
//! present when the patch is created: each record carries an absolute offset
//! and the bytes to write there.
//!
//! # Format Structure
//!
//! ```text
//! IPS File:
//! ├── Magic: "PATCH" (5 bytes)
//! ├── Records (repeated)
//! │   ├── offset (uint24 BE)
//! │   ├── size (u16 BE)
//! │   ├── size > 0: literal payload (size bytes)
//! │   └── size == 0: run-length record
//! │       ├── count (u16 BE)
//! │       └── value (u8)
//! ├── Terminator: "EOF" (3 bytes)
//! └── Truncation length (optional uint24 BE)
//! ```
//!
//! Reading stops at the terminator. Exactly three bytes after it are the
//! common truncation extension and set the target length; any other
//! trailing bytes are ignored.
//!
//! Payloads longer than three bytes that repeat a single value are written as
//! run-length records. A literal size of zero is reserved for that marker, so
//! empty payloads are rejected.
//!
//! # Usage
//!
//! ```rust
//! use kaeru_formats::ips::IpsPatch;
//!
//! let mut patch = IpsPatch::new();
//! patch.add_record(0x1000, 1234u32.to_le_bytes());
//! patch.add_record(0x2000, vec![0u8; 64]);
//!
//! let data = patch.build()?;
//! let parsed = IpsPatch::parse(&data)?;
//! assert_eq!(parsed, patch);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod record;

pub use error::{IpsError, IpsResult};
pub use record::{EOF_OFFSET, IpsRecord, MAX_OFFSET, MAX_RECORD_LEN, RLE_THRESHOLD};

use record::{take, uint24_be, write_uint24_be};

/// IPS magic bytes
pub const IPS_MAGIC: [u8; 5] = *b"PATCH";
/// IPS terminator bytes
pub const IPS_EOF: [u8; 3] = *b"EOF";

/// Ordered list of sparse edits
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpsPatch {
    /// Records in the order they are applied
    pub records: Vec<IpsRecord>,
    /// Target length after patching, written after the terminator
    pub truncate_to: Option<u32>,
}

impl IpsPatch {
    /// Create an empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record writing `data` at `offset`
    pub fn add_record(&mut self, offset: u32, data: impl Into<Vec<u8>>) -> &mut IpsRecord {
        self.records.push(IpsRecord::new(offset, data));
        let last = self.records.len() - 1;
        &mut self.records[last]
    }

    /// Append `data` at `offset`, split into records no larger than
    /// [`MAX_RECORD_LEN`].
    ///
    /// Empty data adds nothing. Offsets are not checked here; the 24-bit
    /// limit is enforced when the patch is built.
    pub fn add_chunked(&mut self, offset: u32, data: &[u8]) {
        let mut chunk_offset = offset;
        for chunk in data.chunks(MAX_RECORD_LEN) {
            self.records.push(IpsRecord::new(chunk_offset, chunk));
            chunk_offset = chunk_offset.saturating_add(chunk.len() as u32);
        }
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the patch has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Parse an IPS file
    pub fn parse(data: &[u8]) -> IpsResult<Self> {
        let mut pos = 0;
        let magic = take(data, &mut pos, IPS_MAGIC.len())?;
        if magic != IPS_MAGIC {
            let mut found = [0u8; 5];
            found.copy_from_slice(magic);
            return Err(IpsError::InvalidMagic(found));
        }

        let mut records = Vec::new();
        loop {
            let chunk = take(data, &mut pos, 3)?;
            if chunk == IPS_EOF {
                break;
            }
            let offset = uint24_be([chunk[0], chunk[1], chunk[2]]);
            records.push(IpsRecord::read_body(data, offset, &mut pos)?);
        }

        let truncate_to = match &data[pos..] {
            &[a, b, c] => Some(uint24_be([a, b, c])),
            _ => None,
        };

        Ok(Self {
            records,
            truncate_to,
        })
    }

    /// Build the IPS file.
    ///
    /// Every record is validated before any output is produced.
    pub fn build(&self) -> IpsResult<Vec<u8>> {
        for record in &self.records {
            record.validate()?;
        }
        if let Some(len) = self.truncate_to
            && len > MAX_OFFSET
        {
            return Err(IpsError::TruncationOutOfRange(len));
        }

        let size = IPS_MAGIC.len()
            + self
                .records
                .iter()
                .map(IpsRecord::encoded_len)
                .sum::<usize>()
            + IPS_EOF.len()
            + if self.truncate_to.is_some() { 3 } else { 0 };
        let mut output = Vec::with_capacity(size);
        output.extend_from_slice(&IPS_MAGIC);
        for record in &self.records {
            record.write_to(&mut output);
        }
        output.extend_from_slice(&IPS_EOF);
        if let Some(len) = self.truncate_to {
            write_uint24_be(&mut output, len);
        }
        Ok(output)
    }

    /// Apply the records in order to `target`, growing it with zero bytes
    /// when a record writes past its end, then resize it to
    /// `truncate_to` if set.
    pub fn apply_to(&self, target: &mut Vec<u8>) {
        for record in &self.records {
            let start = record.offset as usize;
            let end = start + record.data.len();
            if target.len() < end {
                target.resize(end, 0);
            }
            target[start..end].copy_from_slice(&record.data);
        }
        if let Some(len) = self.truncate_to {
            target.resize(len as usize, 0);
        }
    }
}

impl crate::KaeruFormat for IpsPatch {
    fn parse(data: &[u8]) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::parse(data)?)
    }

    fn build(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        Ok(self.build()?)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_empty_patch() {
        let data = IpsPatch::new().build().unwrap();
        assert_eq!(data, b"PATCHEOF");
        assert!(IpsPatch::parse(&data).unwrap().is_empty());
    }

    #[test]
    fn test_rle_record_layout() {
        let mut patch = IpsPatch::new();
        patch.add_record(0x000100, vec![0xAA; 10]);
        let data = patch.build().unwrap();

        assert_eq!(
            data,
            [
                b'P', b'A', b'T', b'C', b'H', // magic
                0x00, 0x01, 0x00, // offset
                0x00, 0x00, 0x00, 0x0A, 0xAA, // rle
                b'E', b'O', b'F',
            ]
        );
    }

    #[test]
    fn test_three_identical_bytes_stay_literal() {
        let mut patch = IpsPatch::new();
        patch.add_record(0x000100, vec![0xAA; 3]);
        let data = patch.build().unwrap();

        assert_eq!(&data[5..8], &[0x00, 0x01, 0x00]);
        assert_eq!(&data[8..10], &[0x00, 0x03]);
        assert_eq!(&data[10..13], &[0xAA, 0xAA, 0xAA]);
        assert_eq!(data.len(), 5 + 3 + 2 + 3 + 3);
    }

    #[test]
    fn test_round_trip_mixed_records() {
        let mut patch = IpsPatch::new();
        patch.add_record(0x0012_3456, 977u32.to_le_bytes());
        patch.add_record(0x20, vec![0u8; 4]);
        patch.add_record(0x00FF_FFFF, b"x".to_vec());
        patch.add_record(0x40, vec![0x11; 500]);

        crate::assert_round_trip!(patch);
    }

    #[test]
    fn test_offset_out_of_range() {
        let mut patch = IpsPatch::new();
        patch.add_record(0x10, vec![1, 2, 3]);
        patch.add_record(0x0100_0000, vec![1]);

        let err = patch.build().unwrap_err();
        assert_eq!(err, IpsError::OffsetOutOfRange(0x0100_0000));
        assert_eq!(err.kind(), ErrorKind::EncodingConstraint);
    }

    #[test]
    fn test_empty_record_rejected() {
        let mut patch = IpsPatch::new();
        patch.add_record(0x10, Vec::new());
        assert_eq!(
            patch.build().unwrap_err().kind(),
            ErrorKind::EncodingConstraint
        );
    }

    #[test]
    fn test_add_chunked_splits_large_payloads() {
        let mut patch = IpsPatch::new();
        let data: Vec<u8> = (0..(MAX_RECORD_LEN + 10)).map(|i| i as u8).collect();
        patch.add_chunked(0x100, &data);

        assert_eq!(patch.len(), 2);
        assert_eq!(patch.records[0].offset, 0x100);
        assert_eq!(patch.records[0].data.len(), MAX_RECORD_LEN);
        assert_eq!(patch.records[1].offset, 0x100 + MAX_RECORD_LEN as u32);
        assert_eq!(patch.records[1].data.len(), 10);
        assert!(patch.build().is_ok());

        patch.add_chunked(0x10, &[]);
        assert_eq!(patch.len(), 2);
    }

    #[test]
    fn test_invalid_magic() {
        let err = IpsPatch::parse(b"PATCX\x00\x00\x01\x00\x01\xFFEOF").unwrap_err();
        assert_eq!(err, IpsError::InvalidMagic(*b"PATCX"));
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn test_missing_terminator() {
        let err = IpsPatch::parse(b"PATCH\x00\x00\x01\x00\x01\xFF").unwrap_err();
        assert_eq!(err, IpsError::Truncated { offset: 11, needed: 3 });
        assert_eq!(err.kind(), ErrorKind::Truncation);
    }

    #[test]
    fn test_truncated_literal() {
        let err = IpsPatch::parse(b"PATCH\x00\x00\x01\x00\x04\xFF\xFF").unwrap_err();
        assert_eq!(err, IpsError::Truncated { offset: 10, needed: 4 });
    }

    #[test]
    fn test_truncated_rle() {
        let err = IpsPatch::parse(b"PATCH\x00\x00\x01\x00\x00\x00\x08").unwrap_err();
        assert_eq!(err, IpsError::Truncated { offset: 12, needed: 1 });
    }

    #[test]
    fn test_truncation_extension() {
        let patch = IpsPatch::parse(b"PATCH\x00\x00\x10\x00\x01\xAAEOF\x00\x20\x00").unwrap();
        assert_eq!(patch.records, vec![IpsRecord::new(0x10, [0xAA])]);
        assert_eq!(patch.truncate_to, Some(0x2000));
        assert_eq!(
            patch.build().unwrap(),
            b"PATCH\x00\x00\x10\x00\x01\xAAEOF\x00\x20\x00"
        );

        let mut target = vec![0u8; 0x3000];
        patch.apply_to(&mut target);
        assert_eq!(target.len(), 0x2000);
        assert_eq!(target[0x10], 0xAA);
    }

    #[test]
    fn test_bytes_after_eof_ignored() {
        for tail in [&b"\x00"[..], b"\x01\x02", b"junk data"] {
            let mut data = b"PATCH\x00\x00\x10\x00\x01\xAAEOF".to_vec();
            data.extend_from_slice(tail);
            let patch = IpsPatch::parse(&data).unwrap();
            assert_eq!(patch.len(), 1);
            assert_eq!(patch.truncate_to, None);
        }
    }

    #[test]
    fn test_truncation_length_limit() {
        let patch = IpsPatch {
            records: Vec::new(),
            truncate_to: Some(0x0100_0000),
        };
        let err = patch.build().unwrap_err();
        assert_eq!(err, IpsError::TruncationOutOfRange(0x0100_0000));
        assert_eq!(err.kind(), ErrorKind::EncodingConstraint);
    }

    #[test]
    fn test_apply_to_buffer() {
        let mut patch = IpsPatch::new();
        patch.add_record(2, vec![0xFF; 2]);
        patch.add_record(6, vec![0x01; 4]);

        let mut target = vec![0u8; 4];
        patch.apply_to(&mut target);
        assert_eq!(target, [0, 0, 0xFF, 0xFF, 0, 0, 1, 1, 1, 1]);
    }

    #[test]
    fn test_verify_round_trip() {
        use crate::KaeruFormat;

        let mut patch = IpsPatch::new();
        patch.add_record(0x1000, vec![9; 40]);
        patch.add_record(0x2000, b"abc".to_vec());
        let data = patch.build().unwrap();
        <IpsPatch as KaeruFormat>::verify_round_trip(&data).unwrap();
    }
}
