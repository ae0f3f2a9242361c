//! Tag transport contract.
//!
//! The controllers never talk to the reader chip directly; they drive a
//! [`TagTransport`]. The embedded build implements it on top of the MFRC522
//! driver, tests with a scripted fake.

use heapless::Vec;

use crate::ndef::message::{OutboundMessage, Records};

/// Longest anticollision UID (triple size).
pub const MAX_UID_LEN: usize = 10;

/// Tag UID: 4, 7 or 10 bytes.
pub type TagUid = Vec<u8, MAX_UID_LEN>;

/// Result of reading a tag, borrowing the caller's buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TagHandle<'b> {
    ndef: Option<&'b [u8]>,
}

impl<'b> TagHandle<'b> {
    /// Tag carrying the raw NDEF message `message`.
    pub fn with_message(message: &'b [u8]) -> Self {
        Self {
            ndef: Some(message),
        }
    }

    /// Tag without NDEF content (unformatted, empty, or unreadable).
    pub fn without_message() -> Self {
        Self { ndef: None }
    }

    /// An empty NDEF TLV is reported as "no message".
    pub fn has_ndef_message(&self) -> bool {
        self.ndef.is_some_and(|m| !m.is_empty())
    }

    pub fn ndef_message(&self) -> Option<&'b [u8]> {
        self.ndef.filter(|m| !m.is_empty())
    }

    /// Records of the NDEF message, if there is one.
    pub fn ndef_records(&self) -> Option<Records<'b>> {
        self.ndef_message().map(Records::new)
    }
}

/// Synchronous access to the tag currently in the reader field.
///
/// Each call blocks for the duration of the physical exchange.
pub trait TagTransport {
    /// Does a tag answer right now?
    fn tag_present(&mut self) -> bool;

    /// UID of the tag seen by the last `tag_present` call, if known.
    fn uid(&mut self) -> Option<TagUid> {
        None
    }

    /// Read the tag's NDEF message into `buf`. Transport failures yield a
    /// handle without a message.
    fn read<'b>(&mut self, buf: &'b mut [u8]) -> TagHandle<'b>;

    /// Overwrite the tag's NDEF message with `message`.
    fn write(&mut self, message: &OutboundMessage) -> bool;

    /// Prepare the tag to hold NDEF data (empty message).
    fn format(&mut self) -> bool;

    /// Put the tag to sleep and drop any crypto session so the next poll
    /// starts clean.
    fn halt(&mut self);
}
