//! NDEF record header parsing.
//!
//! Layout:
//! ```text
//! Byte 0: MB | ME | CF | SR | IL | TNF(3 bits)
//! Byte 1: TYPE_LENGTH
//! Byte 2: PAYLOAD_LENGTH (1 byte if SR, else 4 bytes big endian)
//!         ID_LENGTH      (1 byte, only if IL)
//!         TYPE, ID, PAYLOAD
//! ```

pub const FLAG_MB: u8 = 0x80;
pub const FLAG_ME: u8 = 0x40;
pub const FLAG_SR: u8 = 0x10;
pub const FLAG_IL: u8 = 0x08;
const TNF_MASK: u8 = 0x07;

/// Type Name Format field of the record header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tnf {
    Empty,
    WellKnown,
    MimeMedia,
    AbsoluteUri,
    External,
    Unknown,
    Unchanged,
    Reserved,
}

impl From<u8> for Tnf {
    fn from(bits: u8) -> Self {
        match bits & TNF_MASK {
            0x00 => Tnf::Empty,
            0x01 => Tnf::WellKnown,
            0x02 => Tnf::MimeMedia,
            0x03 => Tnf::AbsoluteUri,
            0x04 => Tnf::External,
            0x05 => Tnf::Unknown,
            0x06 => Tnf::Unchanged,
            _ => Tnf::Reserved,
        }
    }
}

impl Tnf {
    pub fn bits(self) -> u8 {
        self as u8
    }
}

/// Borrowed view of one record inside a raw NDEF message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NdefRecord<'a> {
    pub tnf: Tnf,
    pub type_bytes: &'a [u8],
    pub id: &'a [u8],
    pub payload: &'a [u8],
    /// Message End flag was set on this record.
    pub last: bool,
}

impl<'a> NdefRecord<'a> {
    /// Parse the record starting at `data[0]`.
    ///
    /// Returns the record and the number of bytes it spans, or `None` if the
    /// header or any field runs past the end of `data`.
    pub fn parse(data: &'a [u8]) -> Option<(Self, usize)> {
        let header = *data.first()?;
        let type_len = *data.get(1)? as usize;
        let mut pos = 2;

        let payload_len = if header & FLAG_SR != 0 {
            let len = *data.get(pos)? as usize;
            pos += 1;
            len
        } else {
            let bytes = data.get(pos..pos + 4)?;
            pos += 4;
            u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize
        };

        let id_len = if header & FLAG_IL != 0 {
            let len = *data.get(pos)? as usize;
            pos += 1;
            len
        } else {
            0
        };

        let type_bytes = data.get(pos..pos.checked_add(type_len)?)?;
        pos += type_len;
        let id = data.get(pos..pos.checked_add(id_len)?)?;
        pos += id_len;
        let payload = data.get(pos..pos.checked_add(payload_len)?)?;
        pos += payload_len;

        Some((
            Self {
                tnf: Tnf::from(header),
                type_bytes,
                id,
                payload,
                last: header & FLAG_ME != 0,
            },
            pos,
        ))
    }
}
