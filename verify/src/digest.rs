// Licensed under the Apache-2.0 license

use boot_flash::FlashStorage;
use boot_image::{ImageDigest, ImageHeader};
use sha2::{Digest, Sha256};

use crate::error::ValidateError;

/// Working buffer capacity for streaming reads. Any value works; the final
/// partial chunk is handled.
const HASH_CHUNK: usize = 256;

/// Compute the SHA-256 digest over an image's hashed extent.
///
/// A dependent image's digest is bound to its loader by feeding `seed` into
/// the hash before the image content. The extent itself is `hdr_size +
/// img_size` bytes from the start of the source, consumed in increasing
/// offset order.
pub fn compute_image_digest(
    header: &ImageHeader,
    source: &dyn FlashStorage,
    seed: Option<&[u8]>,
) -> Result<ImageDigest, ValidateError> {
    let mut ctx = Sha256::new();

    if let Some(seed) = seed {
        if !seed.is_empty() {
            ctx.update(seed);
        }
    }

    let total = header.hashed_len().ok_or(ValidateError::SizeOverflow)?;
    let mut buf = [0u8; HASH_CHUNK];
    let mut offset = 0;
    while offset < total {
        let chunk = HASH_CHUNK.min(total - offset);
        source.read(&mut buf[..chunk], offset)?;
        ctx.update(&buf[..chunk]);
        offset += chunk;
    }

    Ok(ctx.finalize().into())
}
