// Licensed under the Apache-2.0 license

//! Boot-time image validation.
//!
//! Before a firmware image is executed, the loader hands it to
//! [`ImageValidator::validate`], which computes a SHA-256 digest over the
//! image header and body, walks the TLV trailer appended after the body, and
//! accepts the image only when a digest record matches the computed hash and
//! at least one signature record verifies against a trusted key. Everything
//! in the trailer is attacker-controlled, so every offset and length is
//! bounds-checked before use and every failure collapses to a clean
//! rejection; a crafted image must never crash the loader.
//!
//! The trusted key table is injected at construction, and storage access goes
//! through the `boot-flash` HIL, so the same validator runs against a flash
//! partition or an image already relocated to RAM.

#![cfg_attr(not(test), no_std)]

mod digest;
pub use digest::compute_image_digest;
mod error;
pub use error::ValidateError;
mod keys;
pub use keys::{find_key, BootKey};
mod signature;
pub use signature::{EcdsaP384Verifier, SignatureVerifier, ECDSA_P384_SIG_LEN};
mod tlv;
pub use tlv::{TlvReader, TlvRecord};
mod validate;
pub use validate::{check_loaded_image, ImageValidator};
