// Licensed under the Apache-2.0 license

//! Lazy reader for the TLV trailer.
//!
//! The trailer is attacker-controlled input, so the reader treats every
//! declared length as hostile: record payloads are only located, never read
//! here, and a record that would cross the declared trailer end terminates
//! the walk without touching its payload. Arithmetic that would overflow is
//! a hard error rather than a wrap.

use boot_flash::FlashStorage;
use boot_image::{TlvHeader, TlvTag, TrailerInfo, TRAILER_INFO_LEN};
use zerocopy::FromBytes;

use crate::error::ValidateError;

/// One trailer record: its tag, declared payload length, and where the
/// payload lives in the source. Type-specific length limits are enforced by
/// the consumer, which knows what each tag allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlvRecord {
    pub tag: TlvTag,
    pub len: u16,
    pub payload_offset: usize,
}

impl TlvRecord {
    /// Read this record's payload into the front of `buf`, returning the
    /// filled slice. Fails if `buf` cannot hold the declared length.
    pub fn read_payload<'b>(
        &self,
        source: &dyn FlashStorage,
        buf: &'b mut [u8],
    ) -> Result<&'b [u8], ValidateError> {
        let buf = buf
            .get_mut(..self.len as usize)
            .ok_or(ValidateError::MalformedTlv)?;
        source.read(buf, self.payload_offset)?;
        Ok(buf)
    }
}

/// Forward-only iterator over the records of a trailer.
pub struct TlvReader<'a> {
    source: &'a dyn FlashStorage,
    offset: usize,
    end: usize,
}

impl<'a> TlvReader<'a> {
    /// Read and check the trailer envelope at `trailer_start`, returning a
    /// reader positioned at the first record. A wrong envelope magic rejects
    /// the trailer before any record is examined.
    pub fn open(source: &'a dyn FlashStorage, trailer_start: usize) -> Result<Self, ValidateError> {
        let mut buf = [0u8; TRAILER_INFO_LEN];
        source.read(&mut buf, trailer_start)?;
        let info =
            TrailerInfo::read_from_bytes(&buf).map_err(|_| ValidateError::MalformedTlv)?;

        if !info.is_magic_valid() {
            return Err(ValidateError::BadTrailerMagic);
        }

        let end = trailer_start
            .checked_add(info.total_len as usize)
            .ok_or(ValidateError::SizeOverflow)?;
        Ok(TlvReader {
            source,
            offset: trailer_start + TRAILER_INFO_LEN,
            end,
        })
    }

    fn fail(&mut self, err: ValidateError) -> Option<Result<TlvRecord, ValidateError>> {
        // Park the cursor at the end so the iterator is fused after an error.
        self.offset = self.end;
        Some(Err(err))
    }
}

impl Iterator for TlvReader<'_> {
    type Item = Result<TlvRecord, ValidateError>;

    fn next(&mut self) -> Option<Self::Item> {
        let header_end = match self.offset.checked_add(TlvHeader::LEN) {
            Some(end) => end,
            None => return self.fail(ValidateError::SizeOverflow),
        };
        if header_end > self.end {
            return None;
        }

        let mut buf = [0u8; TlvHeader::LEN];
        if let Err(err) = self.source.read(&mut buf, self.offset) {
            return self.fail(err.into());
        }
        let Ok(hdr) = TlvHeader::read_from_bytes(&buf) else {
            return self.fail(ValidateError::MalformedTlv);
        };

        let payload_end = match header_end.checked_add(hdr.len as usize) {
            Some(end) => end,
            None => return self.fail(ValidateError::SizeOverflow),
        };
        if payload_end > self.end {
            // Truncated record: stop without reading its payload.
            return None;
        }

        self.offset = payload_end;
        Some(Ok(TlvRecord {
            tag: TlvTag(hdr.tag),
            len: hdr.len,
            payload_offset: header_end,
        }))
    }
}
