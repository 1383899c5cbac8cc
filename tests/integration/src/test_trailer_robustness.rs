// Licensed under the Apache-2.0 license

//! Hostile-trailer cases: the records are attacker-controlled, so every
//! malformed shape must collapse to a clean rejection.

use crate::common::{parse_header, signing_key, total_len_offset, CountingVerifier};
use boot_image::TlvTag;
use boot_imager::{public_key_bytes, public_key_hash, ImageBuilder};
use boot_verify::{BootKey, ImageValidator, ValidateError};

#[test]
fn test_missing_digest_record_rejects_despite_valid_signature() {
    let key = signing_key(0x51);
    let image = ImageBuilder::new(b"body".to_vec())
        .omit_digest_record()
        .sign_with(&key)
        .build()
        .unwrap();
    let header = parse_header(&image);

    let key_bytes = public_key_bytes(key.verifying_key());
    let table = [BootKey { key: &key_bytes }];
    let counting = CountingVerifier::new();
    let validator = ImageValidator::with_verifier(&table, &counting);

    assert_eq!(
        validator.validate_ram_image(&header, &image, None),
        Err(ValidateError::MissingDigest)
    );
    // The signature was still examined; only the verdict is withheld.
    assert_eq!(counting.calls(), 1);
}

#[test]
fn test_unknown_record_kinds_are_ignored() {
    let key = signing_key(0x52);
    let image = ImageBuilder::new(b"body".to_vec())
        .record(0x00E0, vec![1, 2, 3])
        .sign_with(&key)
        .record(0x00E1, Vec::new())
        .record(0x7FFF, vec![0xAB; 64])
        .build()
        .unwrap();
    let header = parse_header(&image);

    let key_bytes = public_key_bytes(key.verifying_key());
    let table = [BootKey { key: &key_bytes }];
    let validator = ImageValidator::new(&table);
    validator.validate_ram_image(&header, &image, None).unwrap();
}

#[test]
fn test_second_digest_record_with_wrong_bytes_is_fatal() {
    let key = signing_key(0x53);
    // The first digest record (emitted by the builder) is correct; a second
    // one carrying garbage must still reject the image.
    let image = ImageBuilder::new(b"body".to_vec())
        .sign_with(&key)
        .record(TlvTag::SHA256.0, vec![0xEE; 32])
        .build()
        .unwrap();
    let header = parse_header(&image);

    let key_bytes = public_key_bytes(key.verifying_key());
    let table = [BootKey { key: &key_bytes }];
    let validator = ImageValidator::new(&table);

    assert!(matches!(
        validator.validate_ram_image(&header, &image, None),
        Err(ValidateError::DigestMismatch { .. })
    ));
}

#[test]
fn test_digest_record_with_wrong_length_is_malformed() {
    let image = ImageBuilder::new(b"body".to_vec())
        .omit_digest_record()
        .record(TlvTag::SHA256.0, vec![0u8; 31])
        .build()
        .unwrap();
    let header = parse_header(&image);

    let table: [BootKey; 0] = [];
    let validator = ImageValidator::new(&table);
    assert_eq!(
        validator.validate_ram_image(&header, &image, None),
        Err(ValidateError::MalformedTlv)
    );
}

#[test]
fn test_signature_without_keyhash_is_skipped() {
    let key = signing_key(0x54);
    let image = ImageBuilder::new(b"body".to_vec())
        .signature_by(&key)
        .build()
        .unwrap();
    let header = parse_header(&image);

    let key_bytes = public_key_bytes(key.verifying_key());
    let table = [BootKey { key: &key_bytes }];
    let counting = CountingVerifier::new();
    let validator = ImageValidator::with_verifier(&table, &counting);

    assert!(matches!(
        validator.validate_ram_image(&header, &image, None),
        Err(ValidateError::NoValidSignature { .. })
    ));
    assert_eq!(counting.calls(), 0);
}

#[test]
fn test_empty_keyhash_identifies_no_key() {
    let key = signing_key(0x55);
    let image = ImageBuilder::new(b"body".to_vec())
        .record(TlvTag::KEYHASH.0, Vec::new())
        .signature_by(&key)
        .build()
        .unwrap();
    let header = parse_header(&image);

    let key_bytes = public_key_bytes(key.verifying_key());
    let table = [BootKey { key: &key_bytes }];
    let counting = CountingVerifier::new();
    let validator = ImageValidator::with_verifier(&table, &counting);

    assert!(matches!(
        validator.validate_ram_image(&header, &image, None),
        Err(ValidateError::NoValidSignature { .. })
    ));
    assert_eq!(counting.calls(), 0);
}

#[test]
fn test_truncated_trailing_record_is_not_read() {
    let key = signing_key(0x56);
    // A benign record sits at the end of the trailer; shortening the
    // declared trailer length makes it cross the boundary. The scan must
    // stop cleanly and the verdict must rest on the records before it.
    let image = ImageBuilder::new(b"body".to_vec())
        .sign_with(&key)
        .record(0x00E0, vec![9, 9, 9, 9])
        .build()
        .unwrap();
    let header = parse_header(&image);

    let mut truncated = image.clone();
    let off = total_len_offset(&header);
    let total = u16::from_le_bytes([truncated[off], truncated[off + 1]]);
    truncated[off..off + 2].copy_from_slice(&(total - 1).to_le_bytes());

    let key_bytes = public_key_bytes(key.verifying_key());
    let table = [BootKey { key: &key_bytes }];
    let validator = ImageValidator::new(&table);
    validator
        .validate_ram_image(&header, &truncated, None)
        .unwrap();
}

#[test]
fn test_truncated_signature_record_cannot_authenticate() {
    let key = signing_key(0x57);
    let image = ImageBuilder::new(b"body".to_vec())
        .sign_with(&key)
        .build()
        .unwrap();
    let header = parse_header(&image);

    // Shorten the trailer so the signature record's payload crosses the
    // declared end: the record is never read and the image loses its only
    // signature.
    let mut truncated = image.clone();
    let off = total_len_offset(&header);
    let total = u16::from_le_bytes([truncated[off], truncated[off + 1]]);
    truncated[off..off + 2].copy_from_slice(&(total - 1).to_le_bytes());

    let key_bytes = public_key_bytes(key.verifying_key());
    let table = [BootKey { key: &key_bytes }];
    let counting = CountingVerifier::new();
    let validator = ImageValidator::with_verifier(&table, &counting);

    assert!(matches!(
        validator.validate_ram_image(&header, &truncated, None),
        Err(ValidateError::NoValidSignature { .. })
    ));
    assert_eq!(counting.calls(), 0);
}

#[test]
fn test_keyhash_for_untrusted_key_does_not_abort_scan() {
    let trusted = signing_key(0x58);
    let untrusted = signing_key(0x59);

    // Keyhash of an untrusted key immediately followed by its signature,
    // then a benign unknown record: the scan continues past the skipped
    // signature and the image is rejected only for lack of a valid one.
    let image = ImageBuilder::new(b"body".to_vec())
        .record(
            TlvTag::KEYHASH.0,
            public_key_hash(untrusted.verifying_key()).to_vec(),
        )
        .signature_by(&untrusted)
        .record(0x00E2, vec![7])
        .build()
        .unwrap();
    let header = parse_header(&image);

    let key_bytes = public_key_bytes(trusted.verifying_key());
    let table = [BootKey { key: &key_bytes }];
    let counting = CountingVerifier::new();
    let validator = ImageValidator::with_verifier(&table, &counting);

    assert!(matches!(
        validator.validate_ram_image(&header, &image, None),
        Err(ValidateError::NoValidSignature { .. })
    ));
    assert_eq!(counting.calls(), 0);
}
