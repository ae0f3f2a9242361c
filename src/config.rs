//! Application-wide constants and compile-time configuration.
//!
//! All hardware pin assignments, timing parameters, and tag geometry
//! live here so they can be tuned in one place.

// Polling

/// Delay between presence polls while nothing happens (ms).
pub const POLL_INTERVAL_MS: u64 = 100;

/// Cooldown after a completed read before polling resumes (ms).
pub const READ_COOLDOWN_MS: u64 = 1000;

/// Cooldown after a completed write or format before polling resumes (ms).
pub const WRITE_COOLDOWN_MS: u64 = 2000;

/// Window in which a re-placed tag with the same UID is ignored (ms).
/// Only used when the UID debounce policy is selected.
pub const REPEAT_SUPPRESS_WINDOW_MS: u64 = 2000;

/// Use the UID debounce policy on top of edge detection.
pub const UID_DEBOUNCE_ENABLED: bool = true;

// NDEF

/// Literal prefix every item payload carries.
pub const ITEM_PREFIX: &[u8] = b"ITEM:";

/// Language code written into outbound text records.
pub const TEXT_LANGUAGE: &[u8] = b"en";

/// Largest encoded NDEF message we build or accept (bytes).
pub const NDEF_MESSAGE_CAPACITY: usize = 512;

// Tag geometry (NFC Forum Type 2: NTAG21x / MIFARE Ultralight)

/// Bytes per tag page.
pub const TAG_PAGE_SIZE: usize = 4;

/// First page of user memory (after UID, lock and capability container).
pub const TAG_USER_START_PAGE: u8 = 4;

/// Page holding the capability container.
pub const TAG_CC_PAGE: u8 = 3;

/// Size of the user data area. 496 bytes = NTAG215.
pub const TAG_DATA_AREA_BYTES: usize = 496;

/// Bytes returned by a single READ command (four pages).
pub const TAG_READ_CHUNK: usize = 16;

// USB serial

/// USB VID/PID - use the "pid.codes" open-source test VID.
/// Replace with your own allocated VID/PID for production.
pub const USB_VID: u16 = 0x1209;
pub const USB_PID: u16 = 0x0001;

/// USB device strings.
pub const USB_MANUFACTURER: &str = "itemtag";
pub const USB_PRODUCT: &str = "NFC Item Tag Station";
pub const USB_SERIAL_NUMBER: &str = "000001";

/// CDC-ACM bulk endpoint packet size.
pub const USB_CDC_PACKET_SIZE: u16 = 64;

/// Longest status line queued for the serial channel (bytes). Large enough
/// for any text decoded from a message of `NDEF_MESSAGE_CAPACITY`.
pub const STATUS_LINE_CAPACITY: usize = NDEF_MESSAGE_CAPACITY;

/// Depth of the status-line queue. The largest burst in one poll is a
/// single command's output (the menu) plus one writer action.
pub const STATUS_QUEUE_DEPTH: usize = 32;

/// Control bytes handled per poll, so the serial TX task can drain the
/// status queue between bursts.
pub const COMMANDS_PER_TICK: usize = 1;

/// Depth of the control-input queue.
pub const COMMAND_QUEUE_DEPTH: usize = 8;

// GPIO pin assignments (nRF52840-DK defaults)
//
// These are logical names; actual `embassy_nrf::peripherals::*` types are
// selected in `main.rs`.  Adjust for your custom PCB.
//
//   MFRC522 SCK    → P1.15
//   MFRC522 MISO   → P1.14
//   MFRC522 MOSI   → P1.13
//   MFRC522 SDA/CS → P1.12
//   MFRC522 RST    → P1.11
//   Buzzer         → P0.03

/// PWM base clock after the Div16 prescaler (Hz).
pub const BUZZER_PWM_CLOCK_HZ: u32 = 1_000_000;
