// Licensed under the Apache-2.0 license

use boot_image::{ImageDigest, DIGEST_LEN};
use sha2::{Digest, Sha256};

/// One trusted public key, SEC1-encoded, provisioned before boot. The table
/// handed to the validator is borrowed and never mutated; nothing here is
/// global state, so tests inject synthetic tables freely.
#[derive(Debug, Clone, Copy)]
pub struct BootKey<'a> {
    pub key: &'a [u8],
}

impl BootKey<'_> {
    /// The digest a key-hash trailer record identifies this key by.
    pub fn digest(&self) -> ImageDigest {
        Sha256::digest(self.key).into()
    }
}

/// Find the table index of the key whose digest starts with `candidate`.
///
/// "Not found" is an expected outcome, not an error: a trailer may carry
/// key hashes for keys this loader does not trust, and the signatures they
/// announce are simply skipped. An empty or over-long candidate identifies
/// nothing.
pub fn find_key(keys: &[BootKey<'_>], candidate: &[u8]) -> Option<usize> {
    if candidate.is_empty() || candidate.len() > DIGEST_LEN {
        return None;
    }
    keys.iter()
        .position(|key| key.digest()[..candidate.len()] == *candidate)
}
