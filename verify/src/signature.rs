// Licensed under the Apache-2.0 license

use boot_image::{ImageDigest, TlvTag};
use p384::ecdsa::signature::hazmat::PrehashVerifier;
use p384::ecdsa::{Signature, VerifyingKey};

/// Raw `r || s` length of an ECDSA P-384 signature.
pub const ECDSA_P384_SIG_LEN: usize = 96;

/// Seam between the validator and the asymmetric-signature primitive. The
/// loader is built with exactly one implementation; tests substitute doubles
/// to observe when the primitive is (and is not) invoked.
pub trait SignatureVerifier {
    /// Tag of the trailer records this verifier consumes.
    fn sig_tag(&self) -> TlvTag;

    /// Exact length gate a signature payload must pass before the primitive
    /// is invoked. A record failing this is malformed, not merely unverified.
    fn sig_len_valid(&self, len: usize) -> bool;

    /// Check `sig` over `digest` against the SEC1-encoded public key. A
    /// `false` result is non-fatal to the trailer scan; another signature
    /// record may still verify.
    fn verify(&self, digest: &ImageDigest, sig: &[u8], key: &[u8]) -> bool;
}

impl<T: SignatureVerifier + ?Sized> SignatureVerifier for &T {
    fn sig_tag(&self) -> TlvTag {
        (**self).sig_tag()
    }

    fn sig_len_valid(&self, len: usize) -> bool {
        (**self).sig_len_valid(len)
    }

    fn verify(&self, digest: &ImageDigest, sig: &[u8], key: &[u8]) -> bool {
        (**self).verify(digest, sig, key)
    }
}

/// ECDSA P-384 over the 32-byte image digest, raw fixed-size signatures.
#[derive(Debug, Default, Clone, Copy)]
pub struct EcdsaP384Verifier;

impl SignatureVerifier for EcdsaP384Verifier {
    fn sig_tag(&self) -> TlvTag {
        TlvTag::ECDSA_P384
    }

    fn sig_len_valid(&self, len: usize) -> bool {
        len == ECDSA_P384_SIG_LEN
    }

    fn verify(&self, digest: &ImageDigest, sig: &[u8], key: &[u8]) -> bool {
        // A trusted key that fails to parse behaves like any other
        // non-verifying candidate.
        let Ok(key) = VerifyingKey::from_sec1_bytes(key) else {
            return false;
        };
        let Ok(sig) = Signature::from_slice(sig) else {
            return false;
        };
        key.verify_prehash(digest, &sig).is_ok()
    }
}
