//! NDEF messages: record iteration over received bytes and the owned
//! outbound message handed to the transport for writing.

use heapless::Vec;

use super::record::{NdefRecord, Tnf, FLAG_IL, FLAG_MB, FLAG_ME, FLAG_SR};
use crate::config::NDEF_MESSAGE_CAPACITY;
use crate::error::Error;

/// Iterator over the records of a raw NDEF message.
///
/// Stops after the record carrying ME, at the end of input, or at the first
/// record whose header does not fit in the remaining bytes.
#[derive(Clone, Debug)]
pub struct Records<'a> {
    data: &'a [u8],
    done: bool,
}

impl<'a> Records<'a> {
    pub fn new(message: &'a [u8]) -> Self {
        Self {
            data: message,
            done: message.is_empty(),
        }
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = NdefRecord<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match NdefRecord::parse(self.data) {
            Some((record, used)) => {
                self.data = &self.data[used..];
                self.done = record.last || self.data.is_empty();
                Some(record)
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

/// Encoded NDEF message ready to be written to a tag.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutboundMessage {
    bytes: Vec<u8, NDEF_MESSAGE_CAPACITY>,
}

impl OutboundMessage {
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Append a record. The first record gets MB; ME moves to the newest.
    pub fn push_record(
        &mut self,
        tnf: Tnf,
        type_bytes: &[u8],
        payload: &[u8],
    ) -> Result<(), Error> {
        if type_bytes.len() > u8::MAX as usize {
            return Err(Error::MessageTooLarge);
        }

        let short = payload.len() <= u8::MAX as usize;
        let length_field = if short { 1 } else { 4 };
        let total = 2 + length_field + type_bytes.len() + payload.len();
        if self.bytes.len() + total > self.bytes.capacity() {
            return Err(Error::MessageTooLarge);
        }

        if !self.bytes.is_empty() {
            self.clear_last_me();
        }

        let mut header = tnf.bits() | FLAG_ME;
        if self.bytes.is_empty() {
            header |= FLAG_MB;
        }
        if short {
            header |= FLAG_SR;
        }
        debug_assert!(header & FLAG_IL == 0);

        self.extend(&[header, type_bytes.len() as u8])?;
        if short {
            self.extend(&[payload.len() as u8])?;
        } else {
            let len = u32::try_from(payload.len()).map_err(|_| Error::MessageTooLarge)?;
            self.extend(&len.to_be_bytes())?;
        }
        self.extend(type_bytes)?;
        self.extend(payload)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn records(&self) -> Records<'_> {
        Records::new(&self.bytes)
    }

    fn extend(&mut self, data: &[u8]) -> Result<(), Error> {
        self.bytes
            .extend_from_slice(data)
            .map_err(|_| Error::MessageTooLarge)
    }

    fn clear_last_me(&mut self) {
        let mut offset = 0;
        while let Some((record, used)) = NdefRecord::parse(&self.bytes[offset..]) {
            if record.last {
                self.bytes[offset] &= !FLAG_ME;
                return;
            }
            offset += used;
        }
    }
}
