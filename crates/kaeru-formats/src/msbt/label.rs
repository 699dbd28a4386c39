//! LBL1 label index
//!
//! ```text
//! group_count(u32)
//! (entry_count(u32), label_block_offset(u32))[group_count]
//! per entry: len(u8) ascii[len] string_index(u32)
//! ```
//!
//! Block offsets are relative to the content start. String indices count
//! entries across all groups in order.

use crate::Endianness;
use crate::msbt::error::{MsbtError, MsbtResult};
use crate::msbt::section::SectionReader;
use crate::msbt::{MsbtEntry, MsbtGroup};

/// Longest label the 1-byte length prefix can describe
pub const MAX_LABEL_LEN: usize = 0xFF;

fn check_label(label: &str) -> MsbtResult<u8> {
    if !label.is_ascii() {
        return Err(MsbtError::InvalidLabel(label.to_string()));
    }
    u8::try_from(label.len()).map_err(|_| MsbtError::LabelTooLong {
        label: label.to_string(),
        len: label.len(),
    })
}

/// Encode the label index for `groups`
pub fn encode(groups: &[MsbtGroup], endianness: Endianness) -> MsbtResult<Vec<u8>> {
    let header_len = 4 + 8 * groups.len();

    let mut pairs = Vec::with_capacity(groups.len());
    let mut block = Vec::new();
    let mut index = 0u32;
    for group in groups {
        let offset = header_len + block.len();
        pairs.push((group.entries.len(), offset));

        for entry in &group.entries {
            let len = check_label(&entry.label)?;
            block.push(len);
            block.extend_from_slice(entry.label.as_bytes());
            block.extend_from_slice(&endianness.u32_bytes(index));
            index += 1;
        }
    }

    let total = header_len + block.len();
    if u32::try_from(total).is_err() {
        return Err(MsbtError::TableTooLarge(total));
    }

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&endianness.u32_bytes(groups.len() as u32));
    for (count, offset) in pairs {
        out.extend_from_slice(&endianness.u32_bytes(count as u32));
        out.extend_from_slice(&endianness.u32_bytes(offset as u32));
    }
    out.extend_from_slice(&block);
    Ok(out)
}

/// Decode the label index, resolving each label's text from `strings`
pub fn decode(section: &SectionReader<'_>, strings: &[String]) -> MsbtResult<Vec<MsbtGroup>> {
    let group_count = section.u32(0)? as usize;
    section.bytes(4, group_count.saturating_mul(8))?;

    let mut groups = Vec::with_capacity(group_count);
    for g in 0..group_count {
        let entry_count = section.u32(4 + 8 * g)? as usize;
        let mut pos = section.u32(8 + 8 * g)? as usize;

        let mut group = MsbtGroup::default();
        for _ in 0..entry_count {
            let len = section.u8(pos)? as usize;
            let raw = section.bytes(pos + 1, len)?;
            if !raw.is_ascii() {
                return Err(MsbtError::MalformedLabel {
                    offset: section.absolute(pos + 1),
                });
            }
            let index = section.u32(pos + 1 + len)?;
            let text = strings
                .get(index as usize)
                .ok_or(MsbtError::StringIndexOutOfRange {
                    index,
                    count: strings.len(),
                })?;

            group.entries.push(MsbtEntry {
                label: raw.iter().map(|&b| char::from(b)).collect(),
                text: text.clone(),
            });
            pos += 1 + len + 4;
        }
        groups.push(group);
    }
    Ok(groups)
}
