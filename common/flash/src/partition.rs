// Licensed under the Apache-2.0 license

//! A bounds-checked window over another storage device, used to expose one
//! image slot of a larger flash part to the validator.

use crate::hil::{FlashError, FlashStorage};

pub struct FlashPartition<'a> {
    storage: &'a dyn FlashStorage,
    offset: usize,
    size: usize,
}

impl<'a> FlashPartition<'a> {
    /// Create a window of `size` bytes at `offset` into `storage`. Fails if
    /// the window does not fit inside the storage.
    pub fn new(
        storage: &'a dyn FlashStorage,
        offset: usize,
        size: usize,
    ) -> Result<Self, FlashError> {
        let end = offset.checked_add(size).ok_or(FlashError::OutOfRange)?;
        if end > storage.capacity() {
            return Err(FlashError::OutOfRange);
        }
        Ok(FlashPartition {
            storage,
            offset,
            size,
        })
    }
}

impl FlashStorage for FlashPartition<'_> {
    fn read(&self, buf: &mut [u8], offset: usize) -> Result<(), FlashError> {
        let end = offset.checked_add(buf.len()).ok_or(FlashError::OutOfRange)?;
        if end > self.size {
            return Err(FlashError::OutOfRange);
        }
        // The window itself was bounds-checked at construction, so this add
        // cannot exceed the parent capacity.
        self.storage.read(buf, self.offset + offset)
    }

    fn capacity(&self) -> usize {
        self.size
    }
}
