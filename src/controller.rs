//! Per-tick orchestration for the two firmware variants.
//!
//! Both controllers own their loop state and are driven by the poll loop
//! through `&mut self`: sample presence, classify the edge, and act only
//! when the trigger policy lets an arrival through.

use crate::feedback::{Cue, Feedback};
use crate::items;
use crate::ndef::text::{encode_text, scan_records};
use crate::presence::{Edge, PresenceTracker, TriggerPolicy};
use crate::transport::TagTransport;
use crate::ui::input_logic::{parse_input, Input};
use crate::ui::{menu, Command};

/// What a tick did, so the loop can pick the next delay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    /// Nothing happened; poll again soon.
    Idle,
    /// A tag was read, written or formatted; back off before polling.
    Acted,
}

/// Reader variant: report the item on every new placement.
pub struct ReaderController<P> {
    tracker: PresenceTracker,
    policy: P,
}

impl<P: TriggerPolicy> ReaderController<P> {
    pub fn new(policy: P) -> Self {
        Self {
            tracker: PresenceTracker::new(),
            policy,
        }
    }

    /// Startup lines.
    pub fn announce<F: Feedback>(&self, out: &mut F) {
        out.line(menu::READER_INIT.as_bytes());
        out.line(menu::READER_READY.as_bytes());
    }

    /// One poll. `buf` receives the tag's NDEF message; `now_ms` is a
    /// monotonic timestamp for the trigger policy.
    pub fn tick<T, F>(
        &mut self,
        transport: &mut T,
        out: &mut F,
        buf: &mut [u8],
        now_ms: u64,
    ) -> TickOutcome
    where
        T: TagTransport,
        F: Feedback,
    {
        let edge = self.tracker.poll_edge(transport.tag_present());
        if edge != Edge::Arrived {
            return TickOutcome::Idle;
        }

        let uid = transport.uid();
        if !self.policy.should_trigger(edge, uid.as_ref(), now_ms) {
            return TickOutcome::Idle;
        }

        let handle = transport.read(buf);
        let outcome = scan_records(handle.ndef_records());
        out.line(outcome.status_line());
        if outcome.is_item() {
            out.cue(Cue::Read);
        }

        transport.halt();
        TickOutcome::Acted
    }
}

/// Action the writer performs on the next placed tag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pending {
    #[default]
    Idle,
    Format,
    /// Write `ITEMS[index]`.
    Write(usize),
}

/// Writer variant: the operator picks an action, the next placed tag gets it.
pub struct WriterController<P> {
    tracker: PresenceTracker,
    policy: P,
    pending: Pending,
}

impl<P: TriggerPolicy> WriterController<P> {
    pub fn new(policy: P) -> Self {
        Self {
            tracker: PresenceTracker::new(),
            policy,
            pending: Pending::Idle,
        }
    }

    pub fn pending(&self) -> Pending {
        self.pending
    }

    /// Startup lines, followed by the menu.
    pub fn announce<F: Feedback>(&self, out: &mut F) {
        out.line(menu::WRITER_INIT.as_bytes());
        out.line(b"");
        out.line(menu::WRITER_READY.as_bytes());
        menu::print_menu(out);
    }

    /// Feed one byte received on the control channel.
    pub fn handle_input<F: Feedback>(&mut self, byte: u8, out: &mut F) {
        match parse_input(byte) {
            Input::Command(command) => self.apply(command, out),
            Input::Invalid(_) => out.line(menu::INVALID_SELECTION.as_bytes()),
        }
    }

    /// Apply an operator command. Selecting an action replaces any other
    /// pending action.
    pub fn apply<F: Feedback>(&mut self, command: Command, out: &mut F) {
        match command {
            Command::ShowMenu => menu::print_menu(out),
            Command::Format => {
                self.pending = Pending::Format;
                out.line(b"");
                out.line(b"Format mode selected.");
                out.line(b"Place NFC tag on reader to format...");
            }
            Command::SelectItem(index) => {
                let Some(item) = items::item(index) else {
                    out.line(menu::INVALID_SELECTION.as_bytes());
                    return;
                };
                self.pending = Pending::Write(index);
                out.line(b"");
                out.line_fmt(format_args!("Selected: {}", item.name));
                out.line(b"Place NFC tag on reader...");
            }
        }
    }

    /// One poll. Only an arrival with a pending action touches the tag.
    pub fn tick<T, F>(&mut self, transport: &mut T, out: &mut F, now_ms: u64) -> TickOutcome
    where
        T: TagTransport,
        F: Feedback,
    {
        let edge = self.tracker.poll_edge(transport.tag_present());
        if edge != Edge::Arrived || self.pending == Pending::Idle {
            return TickOutcome::Idle;
        }

        let uid = transport.uid();
        if !self.policy.should_trigger(edge, uid.as_ref(), now_ms) {
            return TickOutcome::Idle;
        }

        match self.pending {
            Pending::Idle => return TickOutcome::Idle,
            Pending::Format => self.format_tag(transport, out),
            Pending::Write(index) => self.write_item(index, transport, out),
        }

        transport.halt();
        TickOutcome::Acted
    }

    fn format_tag<T: TagTransport, F: Feedback>(&mut self, transport: &mut T, out: &mut F) {
        out.line(b"");
        out.line(b"Tag detected! Formatting as NDEF...");

        if transport.format() {
            out.line(b"Format successful!");
            out.line(b"Tag is now ready for writing.");
            out.cue(Cue::Success);
        } else {
            out.line(b"Format failed!");
            out.line(b"Tag may not be compatible or is write-protected.");
            out.cue(Cue::Failure);
        }

        self.pending = Pending::Idle;
        out.line(b"");
        out.line(menu::PROMPT_AFTER_FORMAT.as_bytes());
    }

    fn write_item<T, F>(&mut self, index: usize, transport: &mut T, out: &mut F)
    where
        T: TagTransport,
        F: Feedback,
    {
        self.pending = Pending::Idle;

        let Some(item) = items::item(index) else {
            return;
        };

        out.line(b"");
        out.line(b"Tag detected!");
        out.line_fmt(format_args!("Writing NDEF message: {}", item.payload));

        let written = match encode_text(item.payload) {
            Ok(message) => transport.write(&message),
            Err(_) => false,
        };

        if written {
            out.line(b"Write successful!");
            out.line_fmt(format_args!("Successfully wrote: {}", item.name));
            out.cue(Cue::Success);
        } else {
            out.line(b"Write failed!");
            out.line(b"Make sure tag is writable and properly formatted");
            out.line(b"Failed to write!");
            out.line(b"Try formatting the tag first (option 8)");
            out.cue(Cue::Failure);
        }

        out.line(b"");
        out.line(menu::PROMPT_AFTER_WRITE.as_bytes());
    }
}
