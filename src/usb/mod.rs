//! USB Device subsystem - presents a CDC-ACM serial port to the host.
//!
//! The nRF52840's built-in USB 2.0 Full-Speed controller is driven by
//! `embassy-usb`. The serial port carries:
//!
//! - TX: status lines (item text, diagnostic tokens, writer menu)
//! - RX: single-character writer commands
//!
//! The poll loop never touches USB directly; it exchanges lines and
//! command bytes with the serial tasks through bounded channels.

pub mod serial;
