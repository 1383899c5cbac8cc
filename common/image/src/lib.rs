// Licensed under the Apache-2.0 license

//! On-flash layout of a bootable firmware image.
//!
//! An image is laid out as a fixed-size header, the executable body, and a
//! trailer of TLV records appended immediately after the body. The trailer
//! carries the integrity and authenticity metadata (image digest, key hashes,
//! signatures) that the boot-time validator checks before handing control to
//! the image.

#![cfg_attr(not(test), no_std)]

mod header;
mod tlv;

pub use header::{ImageHeader, ImageVersion, FLAG_RAM_LOAD, IMAGE_MAGIC};
pub use tlv::{TlvHeader, TlvTag, TrailerInfo, TRAILER_INFO_LEN, TRAILER_MAGIC};

/// Byte length of the image digest carried in the trailer (SHA-256).
pub const DIGEST_LEN: usize = 32;

/// Computed or embedded image digest.
pub type ImageDigest = [u8; DIGEST_LEN];
