//! Banner, menu and prompt lines printed on the serial channel.

use crate::feedback::Feedback;
use crate::items::ITEMS;
use crate::ui::input_logic::{KEY_FORMAT, KEY_MENU};

const RULE: &str = "=================================";

pub const READER_INIT: &str = "Initializing NFC reader...";
pub const READER_READY: &str = "Ready to scan NFC tags (NDEF format)...";
pub const WRITER_INIT: &str = "Initializing NFC adapter...";
pub const WRITER_READY: &str = "*** NFC Tag Writer Ready ***";

pub const INVALID_SELECTION: &str = "Invalid selection. Press 9 for menu.";
pub const PROMPT_AFTER_WRITE: &str = ">> Select next item or press 9 for menu";
pub const PROMPT_AFTER_FORMAT: &str = ">> Select item to write or press 9 for menu";

/// Print the writer menu.
pub fn print_menu<F: Feedback>(out: &mut F) {
    out.line(b"");
    out.line(RULE.as_bytes());
    out.line(b"   NFC Tag Writer (NDEF Format)");
    out.line(RULE.as_bytes());
    out.line(b"Select item to write:");
    for (index, item) in ITEMS.iter().enumerate() {
        out.line_fmt(format_args!("  {}: {} ({})", index, item.name, item.payload));
    }
    out.line_fmt(format_args!("  {}: Format tag as NDEF", KEY_FORMAT as char));
    out.line_fmt(format_args!("  {}: Show menu again", KEY_MENU as char));
    out.line(RULE.as_bytes());
    out.line(b"Tip: Format tag first (option 8) if write fails");
    out.line(RULE.as_bytes());
    out.line(b"");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::STATUS_QUEUE_DEPTH;
    use crate::feedback::Cue;

    #[derive(Default)]
    struct Lines(std::vec::Vec<std::string::String>);

    impl Feedback for Lines {
        fn line(&mut self, text: &[u8]) {
            self.0.push(std::string::String::from_utf8(text.to_vec()).unwrap());
        }

        fn cue(&mut self, _cue: Cue) {}
    }

    #[test]
    fn menu_lists_items_by_index() {
        let mut lines = Lines::default();
        print_menu(&mut lines);

        assert!(lines.0.iter().any(|l| l == "  0: Cigarette (ITEM:CIG)"));
        assert!(lines.0.iter().any(|l| l == "  4: MagnifyingGlass (ITEM:MAG)"));
        assert!(lines.0.iter().any(|l| l == "  8: Format tag as NDEF"));
        assert!(lines.0.iter().any(|l| l == "  9: Show menu again"));
    }

    #[test]
    fn menu_fits_status_queue() {
        let mut lines = Lines::default();
        print_menu(&mut lines);
        assert!(lines.0.len() <= STATUS_QUEUE_DEPTH);
    }
}
