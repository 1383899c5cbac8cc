// Licensed under the Apache-2.0 license

//! Storage abstraction the boot-time validator reads images through.
//!
//! The validator never addresses a device directly; it sees a [`FlashStorage`]
//! that serves bounds-checked reads by byte offset. Two implementations are
//! provided here: [`RamFlash`] for images that already reside in addressable
//! memory, and [`FlashPartition`] as a bounds-checked window over any other
//! storage (typically a memory-mapped flash device driver).

#![cfg_attr(not(test), no_std)]

pub mod hil;
pub use hil::{FlashError, FlashStorage};
mod memory;
pub use memory::RamFlash;
mod partition;
pub use partition::FlashPartition;
