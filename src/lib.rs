//! Host-testable library for itemtag.
//!
//! Everything here is pure logic with no hardware access, so it builds and
//! tests on the host:
//!
//! - [`presence`]: tag presence edges and trigger policies
//! - [`ndef`]: NDEF records, Type 2 TLV layout, `ITEM:` text records
//! - [`controller`]: reader and writer per-tick orchestration
//!
//! Usage: `cargo test --lib --tests`
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main]
//! and implements the hardware collaborators ([`transport::TagTransport`],
//! [`feedback::Feedback`]) on top of these modules.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod controller;
pub mod error;
pub mod feedback;
pub mod items;
pub mod ndef;
pub mod presence;
pub mod transport;
pub mod ui;

pub use controller::{Pending, ReaderController, TickOutcome, WriterController};
pub use error::{Error, TransportError};
pub use presence::{Edge, EdgeTrigger, PresenceTracker, TriggerPolicy, UidDebounce};
