// Licensed under the Apache-2.0 license

//! Host-side construction of signed boot images.
//!
//! Assembles header + body + TLV trailer in the layout the boot-time
//! validator expects, computes the image digest, and signs it with ECDSA
//! P-384. The test suite uses this to fabricate both well-formed and
//! deliberately broken images.

use anyhow::{Context, Result};
use boot_image::{
    ImageDigest, ImageHeader, ImageVersion, TlvHeader, TlvTag, TrailerInfo, FLAG_RAM_LOAD,
    TRAILER_INFO_LEN,
};
use p384::ecdsa::signature::hazmat::PrehashSigner;
use p384::ecdsa::{Signature, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use std::path::Path;
use zerocopy::IntoBytes;

enum TrailerEntry {
    KeyHash(Vec<u8>),
    SignedBy(Box<SigningKey>),
    Raw { tag: u16, payload: Vec<u8> },
}

/// Builder for a complete image: header, body, and trailer.
///
/// Records land in the trailer in the order the builder calls are made, with
/// the digest record first; the validator relies on a key-hash record
/// preceding the signature it announces, and [`ImageBuilder::sign_with`]
/// emits the pair in that order.
pub struct ImageBuilder {
    body: Vec<u8>,
    version: ImageVersion,
    load_addr: Option<u32>,
    seed: Option<Vec<u8>>,
    include_digest: bool,
    entries: Vec<TrailerEntry>,
}

impl ImageBuilder {
    pub fn new(body: Vec<u8>) -> Self {
        ImageBuilder {
            body,
            version: ImageVersion::default(),
            load_addr: None,
            seed: None,
            include_digest: true,
            entries: Vec::new(),
        }
    }

    pub fn version(mut self, version: ImageVersion) -> Self {
        self.version = version;
        self
    }

    /// Mark the image for copy to `addr` before execution.
    pub fn load_addr(mut self, addr: u32) -> Self {
        self.load_addr = Some(addr);
        self
    }

    /// Bind the image digest to loader content fed into the hash first.
    pub fn seed(mut self, seed: Vec<u8>) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Append a key-hash record followed by a signature record by `key`.
    pub fn sign_with(self, key: &SigningKey) -> Self {
        self.keyhash_for(key.verifying_key()).signature_by(key)
    }

    /// Append only the key-hash record for `key`.
    pub fn keyhash_for(mut self, key: &VerifyingKey) -> Self {
        self.entries
            .push(TrailerEntry::KeyHash(public_key_hash(key).to_vec()));
        self
    }

    /// Append only a signature record by `key`, with no key-hash before it.
    pub fn signature_by(mut self, key: &SigningKey) -> Self {
        self.entries
            .push(TrailerEntry::SignedBy(Box::new(key.clone())));
        self
    }

    /// Append an arbitrary record verbatim.
    pub fn record(mut self, tag: u16, payload: Vec<u8>) -> Self {
        self.entries.push(TrailerEntry::Raw { tag, payload });
        self
    }

    /// Leave the digest record out of the trailer.
    pub fn omit_digest_record(mut self) -> Self {
        self.include_digest = false;
        self
    }

    /// Assemble the image and return its bytes, trailer included.
    pub fn build(self) -> Result<Vec<u8>> {
        let img_size: u32 = self
            .body
            .len()
            .try_into()
            .context("image body too large")?;

        let mut header = ImageHeader::new(img_size, self.version);
        if let Some(addr) = self.load_addr {
            header.load_addr = addr;
            header.flags |= FLAG_RAM_LOAD;
        }

        let mut image = header.as_bytes().to_vec();
        image.extend_from_slice(&self.body);

        let mut ctx = Sha256::new();
        if let Some(seed) = &self.seed {
            ctx.update(seed);
        }
        ctx.update(&image);
        let digest: ImageDigest = ctx.finalize().into();

        let mut records: Vec<(u16, Vec<u8>)> = Vec::new();
        if self.include_digest {
            records.push((TlvTag::SHA256.0, digest.to_vec()));
        }
        for entry in &self.entries {
            match entry {
                TrailerEntry::KeyHash(hash) => {
                    records.push((TlvTag::KEYHASH.0, hash.clone()));
                }
                TrailerEntry::SignedBy(key) => {
                    let sig: Signature = key
                        .sign_prehash(&digest)
                        .context("signing the image digest failed")?;
                    records.push((TlvTag::ECDSA_P384.0, sig.to_bytes().as_slice().to_vec()));
                }
                TrailerEntry::Raw { tag, payload } => {
                    records.push((*tag, payload.clone()));
                }
            }
        }

        let mut trailer_body = Vec::new();
        for (tag, payload) in &records {
            let len: u16 = payload
                .len()
                .try_into()
                .context("trailer record payload too large")?;
            trailer_body.extend_from_slice(TlvHeader::new(TlvTag(*tag), len).as_bytes());
            trailer_body.extend_from_slice(payload);
        }

        let total: u16 = (TRAILER_INFO_LEN + trailer_body.len())
            .try_into()
            .context("trailer too large")?;
        image.extend_from_slice(TrailerInfo::new(total).as_bytes());
        image.extend_from_slice(&trailer_body);
        Ok(image)
    }
}

/// Generate a fresh P-384 signing key.
pub fn generate_signing_key() -> SigningKey {
    SigningKey::random(&mut OsRng)
}

/// SEC1 uncompressed encoding of a public key, as stored in key files and
/// hashed into key-hash records.
pub fn public_key_bytes(key: &VerifyingKey) -> Vec<u8> {
    key.to_encoded_point(false).as_bytes().to_vec()
}

/// The digest a key-hash record identifies `key` by.
pub fn public_key_hash(key: &VerifyingKey) -> ImageDigest {
    Sha256::digest(public_key_bytes(key)).into()
}

/// Write the raw private scalar to `path`.
pub fn save_signing_key(path: &Path, key: &SigningKey) -> Result<()> {
    std::fs::write(path, key.to_bytes().as_slice())
        .with_context(|| format!("writing signing key to {}", path.display()))
}

pub fn load_signing_key(path: &Path) -> Result<SigningKey> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("reading signing key from {}", path.display()))?;
    SigningKey::from_slice(&bytes)
        .with_context(|| format!("{} does not hold a P-384 signing key", path.display()))
}

/// Write the SEC1 uncompressed public key to `path`.
pub fn save_public_key(path: &Path, key: &VerifyingKey) -> Result<()> {
    std::fs::write(path, public_key_bytes(key))
        .with_context(|| format!("writing public key to {}", path.display()))
}

pub fn load_public_key(path: &Path) -> Result<VerifyingKey> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("reading public key from {}", path.display()))?;
    VerifyingKey::from_sec1_bytes(&bytes)
        .with_context(|| format!("{} does not hold a P-384 public key", path.display()))
}
