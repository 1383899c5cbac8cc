// Licensed under the Apache-2.0 license

use boot_flash::FlashError;
use boot_image::ImageDigest;

/// Why an image failed validation.
///
/// The loader only needs accept/reject, but the reject-class variants that
/// are reached after hashing carry the computed digest so the caller can
/// still log it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidateError {
    /// A storage read failed. Fatal and distinct from a format problem; the
    /// image is not judged at all.
    Io(FlashError),
    /// The image header magic is wrong.
    BadImageMagic,
    /// The trailer envelope magic is wrong. Rejected before any record is
    /// examined.
    BadTrailerMagic,
    /// Offset or length arithmetic on declared sizes would overflow.
    SizeOverflow,
    /// A record's length is inconsistent with its type.
    MalformedTlv,
    /// The trailer carries no digest record.
    MissingDigest,
    /// A digest record disagrees with the computed hash.
    DigestMismatch { digest: ImageDigest },
    /// Signatures are required and no signature record verified.
    NoValidSignature { digest: ImageDigest },
}

impl From<FlashError> for ValidateError {
    fn from(err: FlashError) -> Self {
        ValidateError::Io(err)
    }
}
