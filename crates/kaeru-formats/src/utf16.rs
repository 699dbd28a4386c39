//! NUL-terminated UTF-16 strings shared by DARC labels and MSBT text

use crate::Endianness;

/// Failure decoding a NUL-terminated UTF-16 string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utf16Error {
    /// Data ended before a terminating NUL code unit
    Unterminated {
        /// Offset where the next code unit was expected
        offset: usize,
    },
    /// Code units do not form valid UTF-16
    Invalid {
        /// Offset of the first code unit of the string
        offset: usize,
    },
}

/// Byte length of `text` encoded as UTF-16 plus its NUL terminator
pub fn encoded_len(text: &str) -> usize {
    text.encode_utf16().count() * 2 + 2
}

/// Append `text` as UTF-16 followed by a NUL code unit
pub fn write_nul_terminated(out: &mut Vec<u8>, text: &str, endian: Endianness) {
    for unit in text.encode_utf16() {
        out.extend_from_slice(&endian.u16_bytes(unit));
    }
    out.extend_from_slice(&[0, 0]);
}

/// Read a UTF-16 string starting at `offset`, stopping at the first NUL
/// code unit.
///
/// Works on a borrowed slice so no shared read position is disturbed.
pub fn read_nul_terminated(
    data: &[u8],
    offset: usize,
    endian: Endianness,
) -> Result<String, Utf16Error> {
    let mut units = Vec::new();
    let mut pos = offset;
    loop {
        let Some(bytes) = data.get(pos..pos + 2) else {
            return Err(Utf16Error::Unterminated { offset: pos });
        };
        let unit = endian.read_u16([bytes[0], bytes[1]]);
        if unit == 0 {
            break;
        }
        units.push(unit);
        pos += 2;
    }
    String::from_utf16(&units).map_err(|_| Utf16Error::Invalid { offset })
}
