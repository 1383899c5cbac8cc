// Licensed under the Apache-2.0 license

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Magic value at the start of the trailer info struct.
pub const TRAILER_MAGIC: u32 = 0x544C_5652; // "TLVR"

/// Byte length of the trailer info struct.
pub const TRAILER_INFO_LEN: usize = core::mem::size_of::<TrailerInfo>();

/// Trailer envelope, stored immediately after the image body.
///
/// Layout (8 bytes, little-endian):
/// - Bytes 0:3 - Magic (0x544C5652, "TLVR")
/// - Bytes 4:5 - Reserved, zero
/// - Bytes 6:7 - Total trailer length, including this struct
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct TrailerInfo {
    pub magic: u32,
    pub reserved: u16,
    pub total_len: u16,
}

impl TrailerInfo {
    pub fn new(total_len: u16) -> Self {
        TrailerInfo {
            magic: TRAILER_MAGIC,
            reserved: 0,
            total_len,
        }
    }

    pub fn is_magic_valid(&self) -> bool {
        self.magic == TRAILER_MAGIC
    }
}

/// Header of a single trailer record. `len` bytes of payload follow it; the
/// next record starts immediately after the payload.
///
/// Layout (4 bytes, little-endian):
/// - Bytes 0:1 - Record tag
/// - Bytes 2:3 - Payload length in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct TlvHeader {
    pub tag: u16,
    pub len: u16,
}

impl TlvHeader {
    /// Byte length of the record header.
    pub const LEN: usize = core::mem::size_of::<TlvHeader>();

    pub fn new(tag: TlvTag, len: u16) -> Self {
        TlvHeader { tag: tag.0, len }
    }
}

/// Tag of a trailer record. Tags not listed here pass through the validator
/// unexamined, so new record kinds can be added without breaking old loaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlvTag(pub u16);

impl TlvTag {
    /// SHA-256 digest of the hashed extent. Payload is exactly 32 bytes.
    pub const SHA256: Self = Self(0x0010);
    /// SHA-256 of the public key a following signature was made with.
    /// Payload is at most 32 bytes.
    pub const KEYHASH: Self = Self(0x0001);
    /// ECDSA P-384 signature over the image digest, raw `r || s` encoding.
    /// Payload is exactly 96 bytes.
    pub const ECDSA_P384: Self = Self(0x0022);
}

impl From<u16> for TlvTag {
    fn from(value: u16) -> Self {
        Self(value)
    }
}
