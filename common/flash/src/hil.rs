// Licensed under the Apache-2.0 license

/// Errors returned by storage reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashError {
    /// The requested range extends past the end of the storage.
    OutOfRange,
    /// The underlying device failed to complete the operation.
    Device,
}

/// Read-side interface of a storage device holding a bootable image.
///
/// Offsets are in bytes from the start of the storage. Implementations must
/// fill the whole buffer or fail; partial reads are not part of the contract.
pub trait FlashStorage {
    /// Read `buf.len()` bytes starting at `offset` into `buf`.
    fn read(&self, buf: &mut [u8], offset: usize) -> Result<(), FlashError>;

    /// Size of the storage in bytes.
    fn capacity(&self) -> usize;
}
