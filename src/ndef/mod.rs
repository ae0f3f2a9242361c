//! NDEF handling: record container, Type 2 tag TLV layout and text records.
//!
//! Only what the item protocol needs is implemented. Records of other
//! types are parsed far enough to be skipped.

pub mod message;
pub mod record;
pub mod text;
pub mod tlv;

pub use message::{OutboundMessage, Records};
pub use record::{NdefRecord, Tnf};
pub use text::{decode_text, encode_text, find_item, scan_records, ItemText, ScanOutcome};
