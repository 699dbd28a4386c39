//! TXT2 string pool
//!
//! ```text
//! count(u32) offsets[count](u32) strings(UTF-16, NUL-terminated)
//! ```
//!
//! Offsets are relative to the content start, so the first string sits at
//! `4 + 4 * count`.

use crate::Endianness;
use crate::msbt::error::{MsbtError, MsbtResult};
use crate::msbt::section::SectionReader;
use crate::utf16::{self, Utf16Error};

/// Encode the string pool. `entries` yields `(label, text)` in pool order;
/// the label only serves error reporting.
pub fn encode<'a, I>(entries: I, endianness: Endianness) -> MsbtResult<Vec<u8>>
where
    I: ExactSizeIterator<Item = (&'a str, &'a str)> + Clone,
{
    let count = entries.len();
    let table_len = 4 + 4 * count;

    let mut offsets = Vec::with_capacity(count);
    let mut cursor = table_len;
    for (label, text) in entries.clone() {
        if text.contains('\0') {
            return Err(MsbtError::InvalidText {
                label: label.to_string(),
            });
        }
        offsets.push(to_u32(cursor)?);
        cursor += utf16::encoded_len(text);
    }

    let mut out = Vec::with_capacity(cursor);
    out.extend_from_slice(&endianness.u32_bytes(to_u32(count)?));
    for offset in offsets {
        out.extend_from_slice(&endianness.u32_bytes(offset));
    }
    for (_, text) in entries {
        utf16::write_nul_terminated(&mut out, text, endianness);
    }
    to_u32(out.len())?;
    Ok(out)
}

/// Decode every string in the pool
pub fn decode(section: &SectionReader<'_>, endianness: Endianness) -> MsbtResult<Vec<String>> {
    let count = section.u32(0)? as usize;
    // Each offset takes four bytes; reject counts the content cannot hold
    section.bytes(4, count.saturating_mul(4))?;

    let mut strings = Vec::with_capacity(count);
    for i in 0..count {
        let offset = section.u32(4 + 4 * i)? as usize;
        let text = utf16::read_nul_terminated(section.content(), offset, endianness).map_err(
            |err| match err {
                Utf16Error::Unterminated { offset } => MsbtError::Truncated {
                    offset: section.absolute(offset),
                    needed: 2,
                },
                Utf16Error::Invalid { offset } => MsbtError::InvalidString {
                    offset: section.absolute(offset),
                },
            },
        )?;
        strings.push(text);
    }
    Ok(strings)
}

fn to_u32(value: usize) -> MsbtResult<u32> {
    u32::try_from(value).map_err(|_| MsbtError::TableTooLarge(value))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn pool(texts: &[&'static str]) -> Vec<(&'static str, &'static str)> {
        texts.iter().map(|t| ("label", *t)).collect()
    }

    #[test]
    fn test_offsets_accumulate() {
        let entries = pool(&["hello", "", "ふ"]);
        let out = encode(entries.iter().copied(), Endianness::Little).unwrap();

        assert_eq!(&out[0..4], &3u32.to_le_bytes());
        // 4 + 3 * 4 = 16, then "hello\0" = 12, "\0" = 2
        assert_eq!(&out[4..8], &16u32.to_le_bytes());
        assert_eq!(&out[8..12], &28u32.to_le_bytes());
        assert_eq!(&out[12..16], &30u32.to_le_bytes());
        assert_eq!(out.len(), 34);
        assert_eq!(&out[16..18], &[b'h', 0]);
    }

    #[test]
    fn test_decode_round_trip() {
        let entries = pool(&["world", "!", "ふりっぷのーと"]);
        let out = encode(entries.iter().copied(), Endianness::Big).unwrap();

        let reader = SectionReader::new(&out, 0, Endianness::Big);
        let strings = decode(&reader, Endianness::Big).unwrap();
        assert_eq!(strings, vec!["world", "!", "ふりっぷのーと"]);
    }

    #[test]
    fn test_empty_pool() {
        let out = encode(std::iter::empty::<(&str, &str)>(), Endianness::Little).unwrap();
        assert_eq!(out, 0u32.to_le_bytes());

        let reader = SectionReader::new(&out, 0, Endianness::Little);
        assert!(decode(&reader, Endianness::Little).unwrap().is_empty());
    }

    #[test]
    fn test_nul_in_text_rejected() {
        let entries = [("greeting", "a\0b")];
        let err = encode(entries.iter().copied(), Endianness::Little).unwrap_err();
        assert!(matches!(err, MsbtError::InvalidText { ref label } if label == "greeting"));
        assert_eq!(err.kind(), ErrorKind::EncodingConstraint);
    }

    #[test]
    fn test_unterminated_string() {
        let entries = pool(&["hi"]);
        let out = encode(entries.iter().copied(), Endianness::Little).unwrap();
        let cut = &out[..out.len() - 2];

        let reader = SectionReader::new(cut, 0x100, Endianness::Little);
        assert!(matches!(
            decode(&reader, Endianness::Little),
            Err(MsbtError::Truncated {
                offset: 0x10C,
                needed: 2
            })
        ));
    }

    #[test]
    fn test_count_larger_than_content() {
        let content = 1000u32.to_le_bytes();
        let reader = SectionReader::new(&content, 0, Endianness::Little);
        assert!(matches!(
            decode(&reader, Endianness::Little),
            Err(MsbtError::Truncated { offset: 4, .. })
        ));
    }
}
