//! NDEF text records and the `ITEM:` scan.
//!
//! Text record payload layout:
//! ```text
//! Byte 0:    status - bit 7 = UTF-16 flag, bits 5..0 = language code length L
//! Byte 1..L: IANA language code ("en")
//! Byte 1+L.. text
//! ```
//!
//! Text bytes are passed through raw. No charset validation happens on
//! decode, so a tag carrying Latin-1 or broken UTF-8 still yields the exact
//! bytes that were written.

use core::fmt;

use super::message::OutboundMessage;
use super::record::{NdefRecord, Tnf};
use crate::config::{ITEM_PREFIX, TEXT_LANGUAGE};
use crate::error::Error;

/// Record type of a well-known text record.
pub const TEXT_RECORD_TYPE: &[u8] = b"T";

const LANGUAGE_LENGTH_MASK: u8 = 0x3F;

/// Diagnostic line for a tag with NDEF content but no item record.
pub const NO_ITEM_DATA: &str = "NO_ITEM_DATA";
/// Diagnostic line for a tag without any NDEF content.
pub const NO_NDEF_MESSAGE: &str = "NO_NDEF_MESSAGE";

/// Text of the first `ITEM:` record, borrowed from the tag buffer.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ItemText<'a>(&'a [u8]);

impl<'a> ItemText<'a> {
    /// Full text including the `ITEM:` prefix.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.0
    }

    /// Characters of the text, one per byte.
    pub fn chars(&self) -> impl Iterator<Item = char> + 'a {
        self.0.iter().map(|&b| b as char)
    }
}

impl PartialEq<&str> for ItemText<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl fmt::Debug for ItemText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ItemText(\"")?;
        for c in self.chars() {
            write!(f, "{}", c.escape_debug())?;
        }
        f.write_str("\")")
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ItemText<'_> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=[u8]:a}", self.0)
    }
}

/// What a read pass found on the tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanOutcome<'a> {
    Item(ItemText<'a>),
    /// NDEF message present, but no text record starting with `ITEM:`.
    NoItemData,
    /// No NDEF message on the tag.
    NoNdefMessage,
}

impl<'a> ScanOutcome<'a> {
    /// Line emitted on the status channel for this outcome.
    pub fn status_line(&self) -> &'a [u8] {
        match self {
            ScanOutcome::Item(text) => text.as_bytes(),
            ScanOutcome::NoItemData => NO_ITEM_DATA.as_bytes(),
            ScanOutcome::NoNdefMessage => NO_NDEF_MESSAGE.as_bytes(),
        }
    }

    pub fn is_item(&self) -> bool {
        matches!(self, ScanOutcome::Item(_))
    }
}

/// Text bytes of `record` if it is a well-formed text record.
///
/// Records of another type, an empty payload, and a language length that
/// leaves no text all yield `None`.
pub fn decode_text<'a>(record: &NdefRecord<'a>) -> Option<&'a [u8]> {
    if record.type_bytes != TEXT_RECORD_TYPE {
        return None;
    }

    let payload = record.payload;
    let status = *payload.first()?;
    let text_start = 1 + (status & LANGUAGE_LENGTH_MASK) as usize;
    if text_start >= payload.len() {
        return None;
    }

    Some(&payload[text_start..])
}

/// First text record whose text starts with `ITEM:`, in wire order.
pub fn find_item<'a, I>(records: I) -> Option<ItemText<'a>>
where
    I: IntoIterator<Item = NdefRecord<'a>>,
{
    records
        .into_iter()
        .filter_map(|record| decode_text(&record))
        .find(|text| text.starts_with(ITEM_PREFIX))
        .map(ItemText)
}

/// Classify a read pass. `records` is `None` when the tag carries no NDEF
/// message at all.
pub fn scan_records<'a, I>(records: Option<I>) -> ScanOutcome<'a>
where
    I: IntoIterator<Item = NdefRecord<'a>>,
{
    match records {
        None => ScanOutcome::NoNdefMessage,
        Some(records) => match find_item(records) {
            Some(item) => ScanOutcome::Item(item),
            None => ScanOutcome::NoItemData,
        },
    }
}

/// Build a single-record message carrying `text` as an English text record.
pub fn encode_text(text: &str) -> Result<OutboundMessage, Error> {
    if text.is_empty() {
        return Err(Error::EmptyPayload);
    }

    let mut payload: heapless::Vec<u8, { crate::config::NDEF_MESSAGE_CAPACITY }> =
        heapless::Vec::new();
    payload
        .push(TEXT_LANGUAGE.len() as u8 & LANGUAGE_LENGTH_MASK)
        .map_err(|_| Error::MessageTooLarge)?;
    payload
        .extend_from_slice(TEXT_LANGUAGE)
        .map_err(|_| Error::MessageTooLarge)?;
    payload
        .extend_from_slice(text.as_bytes())
        .map_err(|_| Error::MessageTooLarge)?;

    let mut message = OutboundMessage::new();
    message.push_record(Tnf::WellKnown, TEXT_RECORD_TYPE, &payload)?;
    Ok(message)
}
