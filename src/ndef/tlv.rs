//! NFC Forum Type 2 tag memory layout.
//!
//! User memory (page 4 onward) is a sequence of TLV blocks:
//! ```text
//! 0x00              NULL TLV, single byte, skipped
//! 0x03 LEN VALUE    NDEF message TLV
//! 0xFE              terminator, nothing follows
//! other LEN VALUE   lock/memory control or proprietary, skipped
//! LEN = 1 byte, or 0xFF followed by a 2-byte big-endian length
//! ```

use crate::config::{TAG_DATA_AREA_BYTES, TAG_PAGE_SIZE};
use crate::error::Error;

pub const TLV_NULL: u8 = 0x00;
pub const TLV_NDEF: u8 = 0x03;
pub const TLV_TERMINATOR: u8 = 0xFE;
const LONG_LENGTH_MARKER: u8 = 0xFF;

/// Capability container magic number for NDEF-formatted tags.
pub const CC_MAGIC: u8 = 0xE1;
/// Mapping version 1.0, read/write access granted.
const CC_VERSION: u8 = 0x10;
const CC_ACCESS_RW: u8 = 0x00;

/// Result of scanning tag memory for the NDEF message TLV.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TlvScan {
    /// NDEF TLV found; its value spans `memory[start..start + len]`.
    Found { start: usize, len: usize },
    /// Memory ended before the scan could finish. At least `needed` bytes
    /// of memory are required to make progress.
    Incomplete { needed: usize },
    /// Terminator reached without an NDEF TLV.
    Absent,
}

/// Walk the TLV blocks in `memory`, which must begin at the first user page.
pub fn locate_ndef(memory: &[u8]) -> TlvScan {
    let mut pos = 0;

    loop {
        let Some(&tag) = memory.get(pos) else {
            return TlvScan::Incomplete { needed: pos + 1 };
        };

        match tag {
            TLV_NULL => {
                pos += 1;
                continue;
            }
            TLV_TERMINATOR => return TlvScan::Absent,
            _ => {}
        }

        let (len, header) = match read_length(memory, pos + 1) {
            Ok(v) => v,
            Err(needed) => return TlvScan::Incomplete { needed },
        };
        let start = pos + 1 + header;
        let end = start + len;

        if tag == TLV_NDEF {
            if end > memory.len() {
                return TlvScan::Incomplete { needed: end };
            }
            return TlvScan::Found { start, len };
        }

        pos = end;
    }
}

/// Decode a TLV length field at `pos`. Returns `(length, field_size)` or the
/// memory size required to read the field.
fn read_length(memory: &[u8], pos: usize) -> Result<(usize, usize), usize> {
    let first = *memory.get(pos).ok_or(pos + 1)?;
    if first != LONG_LENGTH_MARKER {
        return Ok((first as usize, 1));
    }
    let bytes = memory.get(pos + 1..pos + 3).ok_or(pos + 3)?;
    Ok((u16::from_be_bytes([bytes[0], bytes[1]]) as usize, 3))
}

/// Place `message` into an NDEF TLV followed by a terminator, zero padded to
/// a page boundary. Returns the number of bytes written to `out`.
pub fn wrap_message(message: &[u8], out: &mut [u8]) -> Result<usize, Error> {
    if message.len() > u16::MAX as usize {
        return Err(Error::MessageTooLarge);
    }

    let header = if message.len() < LONG_LENGTH_MARKER as usize {
        2
    } else {
        4
    };
    let used = header + message.len() + 1;
    let padded = used.div_ceil(TAG_PAGE_SIZE) * TAG_PAGE_SIZE;

    if padded > TAG_DATA_AREA_BYTES {
        return Err(Error::MessageTooLarge);
    }
    if padded > out.len() {
        return Err(Error::BufferOverflow);
    }

    out[0] = TLV_NDEF;
    if header == 2 {
        out[1] = message.len() as u8;
    } else {
        out[1] = LONG_LENGTH_MARKER;
        out[2..4].copy_from_slice(&(message.len() as u16).to_be_bytes());
    }
    out[header..header + message.len()].copy_from_slice(message);
    out[header + message.len()] = TLV_TERMINATOR;
    out[used..padded].fill(0);

    Ok(padded)
}

/// First user page of a freshly formatted tag: an empty NDEF TLV.
pub const fn empty_message_image() -> [u8; TAG_PAGE_SIZE] {
    [TLV_NDEF, 0x00, TLV_TERMINATOR, 0x00]
}

/// Capability container page for a tag with `data_area_bytes` of user memory.
pub fn capability_container(data_area_bytes: usize) -> [u8; TAG_PAGE_SIZE] {
    let size = (data_area_bytes / 8).min(u8::MAX as usize) as u8;
    [CC_MAGIC, CC_VERSION, size, CC_ACCESS_RW]
}
