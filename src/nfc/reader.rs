//! [`TagTransport`] on top of the `mfrc522` driver.
//!
//! Presence is probed with WUPA rather than REQA so a tag we halted after
//! the previous exchange still answers while it stays on the reader. Every
//! probe ends with HLTA, so each exchange starts from a fresh wake-up.

use defmt::{debug, info, warn};
use itemtag::config::{
    TAG_CC_PAGE, TAG_DATA_AREA_BYTES, TAG_PAGE_SIZE, TAG_READ_CHUNK, TAG_USER_START_PAGE,
};
use itemtag::error::TransportError;
use itemtag::ndef::tlv::{self, TlvScan, CC_MAGIC};
use itemtag::ndef::OutboundMessage;
use itemtag::transport::{TagHandle, TagTransport, TagUid};
use mfrc522::comm::Interface;
use mfrc522::{Initialized, Mfrc522};

/// MFRC522-backed tag transport.
pub struct Mfrc522Transport<COMM: Interface> {
    dev: Mfrc522<COMM, Initialized>,
    uid: Option<TagUid>,
}

impl<COMM: Interface> Mfrc522Transport<COMM> {
    /// Reset and initialise the reader chip behind `comm`.
    pub fn new(comm: COMM) -> Result<Self, TransportError> {
        let mut dev = Mfrc522::new(comm).init().map_err(classify)?;
        match dev.version() {
            Ok(version) => info!("MFRC522 version {=u8:#x}", version),
            Err(_) => warn!("MFRC522 version read failed"),
        }
        Ok(Self { dev, uid: None })
    }

    /// Wake the tag in the field and run anticollision.
    fn wake_and_select(&mut self) -> Result<TagUid, TransportError> {
        let atqa = self.dev.wupa().map_err(|_| TransportError::NoTag)?;
        let uid = self.dev.select(&atqa).map_err(classify)?;
        TagUid::from_slice(uid.as_bytes()).map_err(|_| TransportError::Protocol)
    }

    fn read_chunk(&mut self, page: u8) -> Result<[u8; TAG_READ_CHUNK], TransportError> {
        self.dev.mf_read(page).map_err(classify)
    }

    /// Write one 4-byte page using the 16-byte compatibility write. Type 2
    /// tags store the first four bytes and ignore the rest.
    fn write_page(&mut self, page: u8, data: &[u8]) -> Result<(), TransportError> {
        let mut block = [0u8; TAG_READ_CHUNK];
        block[..TAG_PAGE_SIZE].copy_from_slice(&data[..TAG_PAGE_SIZE]);
        self.dev.mf_write(page, block).map_err(classify)
    }

    /// Read user memory into `buf` until the NDEF TLV is complete.
    /// Returns the message location within `buf`.
    fn read_ndef(&mut self, buf: &mut [u8]) -> Result<Option<(usize, usize)>, TransportError> {
        self.wake_and_select()?;

        // The first chunk starts at the capability container so we can
        // tell unformatted tags apart.
        let first = self.read_chunk(TAG_CC_PAGE)?;
        if first[0] != CC_MAGIC {
            debug!("No NDEF capability container (cc0={=u8:#x})", first[0]);
            return Ok(None);
        }

        let limit = buf.len().min(TAG_DATA_AREA_BYTES);
        let mut filled = copy_into(buf, 0, &first[TAG_PAGE_SIZE..], limit);
        let mut page = TAG_CC_PAGE + (TAG_READ_CHUNK / TAG_PAGE_SIZE) as u8;

        loop {
            match tlv::locate_ndef(&buf[..filled]) {
                TlvScan::Found { start, len } => return Ok(Some((start, len))),
                TlvScan::Absent => return Ok(None),
                TlvScan::Incomplete { needed } if needed > limit => {
                    warn!("NDEF TLV needs {} bytes, tag area is {}", needed, limit);
                    return Err(TransportError::Capacity);
                }
                TlvScan::Incomplete { .. } => {}
            }

            if filled >= limit {
                return Err(TransportError::Capacity);
            }
            let chunk = self.read_chunk(page)?;
            filled = copy_into(buf, filled, &chunk, limit);
            page += (TAG_READ_CHUNK / TAG_PAGE_SIZE) as u8;
        }
    }

    fn write_image(&mut self, image: &[u8]) -> Result<(), TransportError> {
        self.wake_and_select()?;
        for (i, chunk) in image.chunks(TAG_PAGE_SIZE).enumerate() {
            self.write_page(TAG_USER_START_PAGE + i as u8, chunk)?;
        }
        Ok(())
    }

    /// Write an empty NDEF message, programming the capability container
    /// first when the tag is blank.
    ///
    /// The CC always declares `TAG_DATA_AREA_BYTES` (NTAG215). A blank
    /// NTAG213 or Ultralight formatted here advertises more memory than it
    /// has; format those tags with a phone app instead.
    fn format_tag(&mut self) -> Result<(), TransportError> {
        self.wake_and_select()?;

        let cc = self.read_chunk(TAG_CC_PAGE)?;
        match cc[0] {
            CC_MAGIC => debug!("Capability container already present"),
            0x00 if cc[..TAG_PAGE_SIZE].iter().all(|&b| b == 0) => {
                let cc = tlv::capability_container(TAG_DATA_AREA_BYTES);
                self.write_page(TAG_CC_PAGE, &cc)?;
            }
            // The CC page is one-time programmable; we cannot fix it.
            other => {
                warn!("Foreign capability container (cc0={=u8:#x})", other);
                return Err(TransportError::Protocol);
            }
        }

        self.write_page(TAG_USER_START_PAGE, &tlv::empty_message_image())
    }
}

impl<COMM: Interface> TagTransport for Mfrc522Transport<COMM> {
    fn tag_present(&mut self) -> bool {
        match self.wake_and_select() {
            Ok(uid) => {
                self.uid = Some(uid);
                let _ = self.dev.hlta();
                true
            }
            Err(_) => {
                self.uid = None;
                false
            }
        }
    }

    fn uid(&mut self) -> Option<TagUid> {
        self.uid.clone()
    }

    fn read<'b>(&mut self, buf: &'b mut [u8]) -> TagHandle<'b> {
        match self.read_ndef(buf) {
            Ok(Some((start, len))) => TagHandle::with_message(&buf[start..start + len]),
            Ok(None) => TagHandle::without_message(),
            Err(e) => {
                warn!("Tag read failed: {}", e);
                TagHandle::without_message()
            }
        }
    }

    fn write(&mut self, message: &OutboundMessage) -> bool {
        let mut image = [0u8; TAG_DATA_AREA_BYTES];
        let len = match tlv::wrap_message(message.as_bytes(), &mut image) {
            Ok(len) => len,
            Err(e) => {
                warn!("Message does not fit the tag: {}", e);
                return false;
            }
        };

        match self.write_image(&image[..len]) {
            Ok(()) => {
                info!("Wrote {} bytes of NDEF data", len);
                true
            }
            Err(e) => {
                warn!("Tag write failed: {}", e);
                false
            }
        }
    }

    fn format(&mut self) -> bool {
        match self.format_tag() {
            Ok(()) => true,
            Err(e) => {
                warn!("Tag format failed: {}", e);
                false
            }
        }
    }

    fn halt(&mut self) {
        let _ = self.dev.hlta();
        let _ = self.dev.stop_crypto1();
    }
}

/// Append `src` to `buf[filled..]`, never past `limit`. Returns the new fill level.
fn copy_into(buf: &mut [u8], filled: usize, src: &[u8], limit: usize) -> usize {
    let n = src.len().min(limit.saturating_sub(filled));
    buf[filled..filled + n].copy_from_slice(&src[..n]);
    filled + n
}

fn classify<E>(e: mfrc522::Error<E>) -> TransportError {
    match e {
        mfrc522::Error::Comm(_) => TransportError::Bus,
        mfrc522::Error::Timeout => TransportError::Timeout,
        _ => TransportError::Protocol,
    }
}
