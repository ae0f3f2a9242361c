//! Operator interface - single-character commands over the serial channel
//! and the text menu the writer prints in response.
//!
//! ## Components
//!
//! - **Input logic**: maps received bytes to [`Command`]s
//! - **Menu**: banner, help and prompt lines

pub mod input_logic;
pub mod menu;

/// Operator commands accepted by the writer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Select `ITEMS[index]` for the next placed tag.
    SelectItem(usize),
    /// Format the next placed tag as an empty NDEF tag.
    Format,
    /// Print the menu again.
    ShowMenu,
}
