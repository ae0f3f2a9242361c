//! Unified error type for itemtag.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` (behind the `defmt` feature) for efficient
//! on-target logging.

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // NDEF
    /// Tried to encode an empty text record.
    EmptyPayload,

    /// Encoded message does not fit the message buffer or the tag.
    MessageTooLarge,

    // Generic
    /// Buffer too small for the requested operation.
    BufferOverflow,
}

/// Failures inside the tag transport.
///
/// These are collapsed to the boolean `write`/`format` contract before they
/// reach the controllers, but are logged on target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// SPI exchange with the reader chip failed.
    Bus,
    /// No tag answered the wake-up request.
    NoTag,
    /// Tag answered with NAK, bad CRC or an unexpected frame.
    Protocol,
    /// Reader timed out waiting for the tag.
    Timeout,
    /// Tag memory is smaller than the data we need to place.
    Capacity,
}
