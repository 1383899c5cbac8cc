// Licensed under the Apache-2.0 license

//! Memory-backed storage. Serves an image that has already been relocated
//! into addressable memory, and doubles as the storage double in tests.

use crate::hil::{FlashError, FlashStorage};

pub struct RamFlash<'a> {
    memory: &'a [u8],
}

impl<'a> RamFlash<'a> {
    /// Wrap a memory region holding image content.
    pub fn new(memory: &'a [u8]) -> Self {
        RamFlash { memory }
    }
}

impl FlashStorage for RamFlash<'_> {
    fn read(&self, buf: &mut [u8], offset: usize) -> Result<(), FlashError> {
        let end = offset.checked_add(buf.len()).ok_or(FlashError::OutOfRange)?;
        let src = self.memory.get(offset..end).ok_or(FlashError::OutOfRange)?;
        buf.copy_from_slice(src);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.memory.len()
    }
}
