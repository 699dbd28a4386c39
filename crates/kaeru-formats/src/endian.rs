//! Byte-order mark handling
//!
//! DARC and MSBT files store a 2-byte byte-order mark right after their
//! magic. The mark is always read big-endian; its value selects the byte
//! order of every field that follows.

/// Byte-order mark selecting little-endian fields
pub const BOM_LITTLE_ENDIAN: u16 = 0xFFFE;
/// Byte-order mark selecting big-endian fields
pub const BOM_BIG_ENDIAN: u16 = 0xFEFF;

/// Byte order of the multi-byte fields following a byte-order mark
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Endianness {
    /// Little-endian (the order used by the target hardware)
    #[default]
    Little,
    /// Big-endian
    Big,
}

impl Endianness {
    /// Resolve a byte-order mark read as a big-endian `u16`
    pub fn from_bom(bom: u16) -> Option<Self> {
        match bom {
            BOM_LITTLE_ENDIAN => Some(Self::Little),
            BOM_BIG_ENDIAN => Some(Self::Big),
            _ => None,
        }
    }

    /// Byte-order mark value for this byte order
    pub const fn bom(self) -> u16 {
        match self {
            Self::Little => BOM_LITTLE_ENDIAN,
            Self::Big => BOM_BIG_ENDIAN,
        }
    }

    /// Byte-order mark as it appears on disk
    pub const fn bom_bytes(self) -> [u8; 2] {
        self.bom().to_be_bytes()
    }

    /// Encode a `u16` in this byte order
    pub const fn u16_bytes(self, value: u16) -> [u8; 2] {
        match self {
            Self::Little => value.to_le_bytes(),
            Self::Big => value.to_be_bytes(),
        }
    }

    /// Encode a `u32` in this byte order
    pub const fn u32_bytes(self, value: u32) -> [u8; 4] {
        match self {
            Self::Little => value.to_le_bytes(),
            Self::Big => value.to_be_bytes(),
        }
    }

    /// Decode a `u16` in this byte order
    pub const fn read_u16(self, bytes: [u8; 2]) -> u16 {
        match self {
            Self::Little => u16::from_le_bytes(bytes),
            Self::Big => u16::from_be_bytes(bytes),
        }
    }

    /// Decode a `u32` in this byte order
    pub const fn read_u32(self, bytes: [u8; 4]) -> u32 {
        match self {
            Self::Little => u32::from_le_bytes(bytes),
            Self::Big => u32::from_be_bytes(bytes),
        }
    }
}

impl From<Endianness> for binrw::Endian {
    fn from(value: Endianness) -> Self {
        match value {
            Endianness::Little => Self::Little,
            Endianness::Big => Self::Big,
        }
    }
}

impl From<binrw::Endian> for Endianness {
    fn from(value: binrw::Endian) -> Self {
        match value {
            binrw::Endian::Little => Self::Little,
            binrw::Endian::Big => Self::Big,
        }
    }
}
