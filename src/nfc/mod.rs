//! NFC subsystem - MFRC522 frontend over SPI.
//!
//! The MFRC522 is an ISO14443A reader IC. We use it with NFC Forum Type 2
//! tags (NTAG213/215/216, MIFARE Ultralight), which keep NDEF data in 4-byte
//! pages starting at page 4.
//!
//! Hardware connection (nRF52840-DK):
//!
//! - P1.15 -> SCK
//! - P1.14 -> MISO
//! - P1.13 -> MOSI
//! - P1.12 -> SDA (chip select)
//! - P1.11 -> RST

pub mod reader;

pub use reader::Mfrc522Transport;
