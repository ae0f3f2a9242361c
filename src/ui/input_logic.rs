use super::Command;
use crate::items::ITEM_COUNT;

/// Byte selecting the format action.
pub const KEY_FORMAT: u8 = b'8';
/// Byte requesting the menu.
pub const KEY_MENU: u8 = b'9';

/// Result of feeding one received byte to the command parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Input {
    Command(Command),
    /// Anything else, line endings included. The operator gets an error
    /// line, state is untouched.
    Invalid(u8),
}

/// Map one received byte to an operator input.
pub fn parse_input(byte: u8) -> Input {
    match byte {
        KEY_FORMAT => Input::Command(Command::Format),
        KEY_MENU => Input::Command(Command::ShowMenu),
        b'0'..=b'9' if ((byte - b'0') as usize) < ITEM_COUNT => {
            Input::Command(Command::SelectItem((byte - b'0') as usize))
        }
        other => Input::Invalid(other),
    }
}
