// Licensed under the Apache-2.0 license

use boot_flash::{FlashStorage, RamFlash};
use boot_image::{ImageDigest, ImageHeader, TlvTag, DIGEST_LEN};

use crate::digest::compute_image_digest;
use crate::error::ValidateError;
use crate::keys::{find_key, BootKey};
use crate::signature::{EcdsaP384Verifier, SignatureVerifier};
use crate::tlv::TlvReader;

/// Largest record payload the validator will stage while checking it.
/// Signature payloads must also fit here; anything larger is malformed.
const RECORD_BUF: usize = 256;

/// Boot-time validator for one configured signature algorithm.
///
/// Holds the trusted key table for its lifetime; each `validate` call owns
/// its working buffer, digest state and pending-key register, so one
/// validator may serve concurrent calls.
pub struct ImageValidator<'a, V = EcdsaP384Verifier> {
    keys: &'a [BootKey<'a>],
    verifier: V,
    require_signature: bool,
}

impl<'a> ImageValidator<'a> {
    /// Validator using the built-in ECDSA P-384 verifier. Signatures are
    /// required until [`Self::signature_optional`] says otherwise.
    pub fn new(keys: &'a [BootKey<'a>]) -> Self {
        Self::with_verifier(keys, EcdsaP384Verifier)
    }
}

impl<'a, V: SignatureVerifier> ImageValidator<'a, V> {
    pub fn with_verifier(keys: &'a [BootKey<'a>], verifier: V) -> Self {
        ImageValidator {
            keys,
            verifier,
            require_signature: true,
        }
    }

    /// Accept images on digest alone. Integrity-only deployments use this;
    /// everything else should leave signatures required.
    pub fn signature_optional(mut self) -> Self {
        self.require_signature = false;
        self
    }

    /// Validate the image starting at offset 0 of `source`.
    ///
    /// Computes the digest over the hashed extent (prefixed by `seed` for a
    /// dependent image), then walks the trailer: a digest record must match
    /// the computed hash, and at least one signature record must verify
    /// against a key announced by a preceding key-hash record, unless
    /// signatures are optional. Returns the computed digest on acceptance.
    pub fn validate(
        &self,
        header: &ImageHeader,
        source: &dyn FlashStorage,
        seed: Option<&[u8]>,
    ) -> Result<ImageDigest, ValidateError> {
        if !header.is_magic_valid() {
            return Err(ValidateError::BadImageMagic);
        }

        let digest = compute_image_digest(header, source, seed)?;

        let trailer_start = header.hashed_len().ok_or(ValidateError::SizeOverflow)?;
        let mut digest_confirmed = false;
        let mut signature_confirmed = false;
        // Key announced by the last key-hash record, consumed by the next
        // signature record whether or not it verifies.
        let mut pending_key: Option<usize> = None;
        let mut buf = [0u8; RECORD_BUF];

        for record in TlvReader::open(source, trailer_start)? {
            let record = record?;
            let len = record.len as usize;

            if record.tag == TlvTag::SHA256 {
                if len != DIGEST_LEN {
                    return Err(ValidateError::MalformedTlv);
                }
                let payload = record.read_payload(source, &mut buf)?;
                if payload != digest {
                    return Err(ValidateError::DigestMismatch { digest });
                }
                digest_confirmed = true;
            } else if record.tag == TlvTag::KEYHASH {
                if len > DIGEST_LEN {
                    return Err(ValidateError::MalformedTlv);
                }
                let payload = record.read_payload(source, &mut buf)?;
                // An unknown key hash is fine; the signature it announces
                // will be skipped.
                pending_key = find_key(self.keys, payload);
            } else if record.tag == self.verifier.sig_tag() {
                let Some(key_idx) = pending_key.take() else {
                    // No trusted key announced for this signature.
                    continue;
                };
                if !self.verifier.sig_len_valid(len) || len > buf.len() {
                    return Err(ValidateError::MalformedTlv);
                }
                let payload = record.read_payload(source, &mut buf)?;
                if self
                    .verifier
                    .verify(&digest, payload, self.keys[key_idx].key)
                {
                    signature_confirmed = true;
                }
            }
            // Unrecognized tags pass through so future record kinds do not
            // break deployed loaders.
        }

        if !digest_confirmed {
            return Err(ValidateError::MissingDigest);
        }
        if self.require_signature && !signature_confirmed {
            return Err(ValidateError::NoValidSignature { digest });
        }
        Ok(digest)
    }

    /// Validate an image that already resides in memory, trailer included.
    pub fn validate_ram_image(
        &self,
        header: &ImageHeader,
        image: &[u8],
        seed: Option<&[u8]>,
    ) -> Result<ImageDigest, ValidateError> {
        self.validate(header, &RamFlash::new(image), seed)
    }
}

/// Integrity re-check after an image has been copied to its load address:
/// recompute the digest over the relocated bytes and require a matching
/// digest record. Signatures were checked before the copy and are not
/// examined again here.
pub fn check_loaded_image(header: &ImageHeader, ram: &[u8]) -> Result<ImageDigest, ValidateError> {
    if !header.is_magic_valid() {
        return Err(ValidateError::BadImageMagic);
    }

    let source = RamFlash::new(ram);
    let digest = compute_image_digest(header, &source, None)?;
    let trailer_start = header.hashed_len().ok_or(ValidateError::SizeOverflow)?;

    let mut digest_confirmed = false;
    let mut buf = [0u8; DIGEST_LEN];
    for record in TlvReader::open(&source, trailer_start)? {
        let record = record?;
        if record.tag == TlvTag::SHA256 {
            if record.len as usize != DIGEST_LEN {
                return Err(ValidateError::MalformedTlv);
            }
            let payload = record.read_payload(&source, &mut buf)?;
            if payload != digest {
                return Err(ValidateError::DigestMismatch { digest });
            }
            digest_confirmed = true;
        }
    }

    if digest_confirmed {
        Ok(digest)
    } else {
        Err(ValidateError::MissingDigest)
    }
}
