//! Integration tests for itemtag host-testable logic.
//!
//! `SimTag` models the user memory of a Type 2 tag the way the firmware
//! transport does: an NDEF TLV located with `locate_ndef`, written with
//! `wrap_message`, formatted with the empty message image.

use itemtag::config::{REPEAT_SUPPRESS_WINDOW_MS, TAG_DATA_AREA_BYTES};
use itemtag::feedback::{Cue, Feedback};
use itemtag::items::ITEMS;
use itemtag::ndef::message::OutboundMessage;
use itemtag::ndef::tlv::{empty_message_image, locate_ndef, wrap_message, TlvScan};
use itemtag::ndef::{encode_text, scan_records, ScanOutcome};
use itemtag::transport::{TagHandle, TagTransport, TagUid};
use itemtag::{EdgeTrigger, Pending, ReaderController, TickOutcome, UidDebounce, WriterController};

struct SimTag {
    memory: Vec<u8>,
    uid: TagUid,
    writable: bool,
}

impl SimTag {
    fn blank(uid: &[u8]) -> Self {
        Self {
            memory: vec![0; TAG_DATA_AREA_BYTES],
            uid: TagUid::from_slice(uid).unwrap(),
            writable: true,
        }
    }

    fn with_text(uid: &[u8], text: &str) -> Self {
        let mut tag = Self::blank(uid);
        let message = encode_text(text).unwrap();
        wrap_message(message.as_bytes(), &mut tag.memory).unwrap();
        tag
    }
}

/// Reader field holding at most one tag.
#[derive(Default)]
struct Field {
    tag: Option<SimTag>,
    reads: usize,
    writes: usize,
    formats: usize,
    halts: usize,
}

impl Field {
    fn place(&mut self, tag: SimTag) {
        self.tag = Some(tag);
    }

    fn remove(&mut self) -> Option<SimTag> {
        self.tag.take()
    }
}

impl TagTransport for Field {
    fn tag_present(&mut self) -> bool {
        self.tag.is_some()
    }

    fn uid(&mut self) -> Option<TagUid> {
        self.tag.as_ref().map(|t| t.uid.clone())
    }

    fn read<'b>(&mut self, buf: &'b mut [u8]) -> TagHandle<'b> {
        self.reads += 1;
        let Some(tag) = &self.tag else {
            return TagHandle::without_message();
        };
        match locate_ndef(&tag.memory) {
            TlvScan::Found { start, len } => {
                buf[..len].copy_from_slice(&tag.memory[start..start + len]);
                TagHandle::with_message(&buf[..len])
            }
            _ => TagHandle::without_message(),
        }
    }

    fn write(&mut self, message: &OutboundMessage) -> bool {
        self.writes += 1;
        match &mut self.tag {
            Some(tag) if tag.writable => wrap_message(message.as_bytes(), &mut tag.memory).is_ok(),
            _ => false,
        }
    }

    fn format(&mut self) -> bool {
        self.formats += 1;
        match &mut self.tag {
            Some(tag) if tag.writable => {
                tag.memory.fill(0);
                tag.memory[..4].copy_from_slice(&empty_message_image());
                true
            }
            _ => false,
        }
    }

    fn halt(&mut self) {
        self.halts += 1;
    }
}

#[derive(Default)]
struct Console {
    lines: Vec<String>,
    cues: Vec<Cue>,
}

impl Console {
    fn take_lines(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }
}

impl Feedback for Console {
    fn line(&mut self, text: &[u8]) {
        self.lines.push(String::from_utf8(text.to_vec()).unwrap());
    }

    fn cue(&mut self, cue: Cue) {
        self.cues.push(cue);
    }
}

fn read_tick<P: itemtag::TriggerPolicy>(
    reader: &mut ReaderController<P>,
    field: &mut Field,
    out: &mut Console,
    now_ms: u64,
) -> TickOutcome {
    let mut buf = [0u8; TAG_DATA_AREA_BYTES];
    reader.tick(field, out, &mut buf, now_ms)
}

#[test]
fn reader_reports_item_from_tag_memory() {
    let mut reader = ReaderController::new(EdgeTrigger);
    let mut field = Field::default();
    let mut out = Console::default();

    assert_eq!(read_tick(&mut reader, &mut field, &mut out, 0), TickOutcome::Idle);

    field.place(SimTag::with_text(&[1, 2, 3, 4], "ITEM:SAW"));
    assert_eq!(read_tick(&mut reader, &mut field, &mut out, 100), TickOutcome::Acted);
    assert_eq!(out.lines, ["ITEM:SAW"]);
    assert_eq!(out.cues, [Cue::Read]);

    // Still seated: no second report.
    assert_eq!(read_tick(&mut reader, &mut field, &mut out, 1100), TickOutcome::Idle);
    assert_eq!(field.reads, 1);
    assert_eq!(field.halts, 1);
}

#[test]
fn reader_distinguishes_blank_and_non_item_tags() {
    let mut reader = ReaderController::new(EdgeTrigger);
    let mut field = Field::default();
    let mut out = Console::default();

    field.place(SimTag::blank(&[1, 1, 1, 1]));
    read_tick(&mut reader, &mut field, &mut out, 0);
    field.remove();
    read_tick(&mut reader, &mut field, &mut out, 100);

    field.place(SimTag::with_text(&[2, 2, 2, 2], "hello"));
    read_tick(&mut reader, &mut field, &mut out, 200);

    assert_eq!(out.lines, ["NO_NDEF_MESSAGE", "NO_ITEM_DATA"]);
    assert!(out.cues.is_empty());
}

#[test]
fn reader_skips_tlv_blocks_before_ndef() {
    let mut tag = SimTag::blank(&[9, 9, 9, 9]);
    let message = encode_text("ITEM:MAG").unwrap();
    // NULL padding, then a lock control TLV ahead of the message.
    tag.memory[..5].copy_from_slice(&[0x00, 0x01, 0x03, 0xA0, 0x0C]);
    tag.memory[5] = 0x34;
    wrap_message(message.as_bytes(), &mut tag.memory[6..]).unwrap();

    let mut reader = ReaderController::new(EdgeTrigger);
    let mut field = Field::default();
    let mut out = Console::default();
    field.place(tag);
    read_tick(&mut reader, &mut field, &mut out, 0);

    assert_eq!(out.lines, ["ITEM:MAG"]);
}

#[test]
fn reader_suppresses_quick_replace_of_same_tag() {
    let mut reader = ReaderController::new(UidDebounce::new(REPEAT_SUPPRESS_WINDOW_MS));
    let mut field = Field::default();
    let mut out = Console::default();

    field.place(SimTag::with_text(&[7, 7, 7, 7], "ITEM:BEER"));
    read_tick(&mut reader, &mut field, &mut out, 0);
    let tag = field.remove().unwrap();
    read_tick(&mut reader, &mut field, &mut out, 500);

    // Same tag inside the window: ignored.
    field.place(tag);
    assert_eq!(read_tick(&mut reader, &mut field, &mut out, 1000), TickOutcome::Idle);
    let tag = field.remove().unwrap();
    read_tick(&mut reader, &mut field, &mut out, 1500);

    // Another tag always goes through.
    field.place(SimTag::with_text(&[8, 8, 8, 8], "ITEM:CUFF"));
    read_tick(&mut reader, &mut field, &mut out, 1600);
    field.remove();
    read_tick(&mut reader, &mut field, &mut out, 1700);

    // Same tag again after the window.
    field.place(tag);
    read_tick(&mut reader, &mut field, &mut out, REPEAT_SUPPRESS_WINDOW_MS + 100);

    assert_eq!(out.lines, ["ITEM:BEER", "ITEM:CUFF", "ITEM:BEER"]);
}

#[test]
fn written_item_reads_back() {
    let mut writer = WriterController::new(EdgeTrigger);
    let mut reader = ReaderController::new(EdgeTrigger);
    let mut field = Field::default();
    let mut out = Console::default();

    writer.handle_input(b'1', &mut out);
    assert_eq!(writer.pending(), Pending::Write(1));

    field.place(SimTag::blank(&[5, 5, 5, 5]));
    assert_eq!(writer.tick(&mut field, &mut out, 0), TickOutcome::Acted);
    assert_eq!(writer.pending(), Pending::Idle);
    assert!(out.take_lines().iter().any(|l| l == "Successfully wrote: Beer"));

    let tag = field.remove().unwrap();
    let mut buf = [0u8; TAG_DATA_AREA_BYTES];
    let len = match locate_ndef(&tag.memory) {
        TlvScan::Found { start, len } => {
            buf[..len].copy_from_slice(&tag.memory[start..start + len]);
            len
        }
        other => panic!("expected NDEF TLV, got {other:?}"),
    };
    let handle = TagHandle::with_message(&buf[..len]);
    match scan_records(handle.ndef_records()) {
        ScanOutcome::Item(text) => assert_eq!(text, "ITEM:BEER"),
        other => panic!("expected item, got {other:?}"),
    }

    field.place(tag);
    read_tick(&mut reader, &mut field, &mut out, 100);
    assert_eq!(out.lines, ["ITEM:BEER"]);
}

#[test]
fn every_item_survives_write_and_read() {
    for (index, item) in ITEMS.iter().enumerate() {
        let mut writer = WriterController::new(EdgeTrigger);
        let mut reader = ReaderController::new(EdgeTrigger);
        let mut field = Field::default();
        let mut out = Console::default();

        writer.handle_input(b'0' + index as u8, &mut out);
        field.place(SimTag::blank(&[index as u8, 0, 0, 0]));
        writer.tick(&mut field, &mut out, 0);
        out.take_lines();

        read_tick(&mut reader, &mut field, &mut out, 0);
        assert_eq!(out.lines, [item.payload]);
    }
}

#[test]
fn format_then_tag_formats_exactly_once() {
    let mut writer = WriterController::new(EdgeTrigger);
    let mut field = Field::default();
    let mut out = Console::default();

    writer.handle_input(b'8', &mut out);
    assert_eq!(writer.pending(), Pending::Format);

    field.place(SimTag::with_text(&[3, 3, 3, 3], "ITEM:CIG"));
    writer.tick(&mut field, &mut out, 0);
    writer.tick(&mut field, &mut out, 2000);
    field.remove();
    writer.tick(&mut field, &mut out, 2100);
    field.place(SimTag::blank(&[4, 4, 4, 4]));
    writer.tick(&mut field, &mut out, 2200);

    assert_eq!(field.formats, 1);
    assert_eq!(field.writes, 0);
    assert_eq!(out.cues, [Cue::Success]);
    assert!(out.lines.iter().any(|l| l == "Format successful!"));
}

#[test]
fn formatted_tag_reads_as_no_ndef_message() {
    let mut writer = WriterController::new(EdgeTrigger);
    let mut reader = ReaderController::new(EdgeTrigger);
    let mut field = Field::default();
    let mut out = Console::default();

    writer.handle_input(b'8', &mut out);
    field.place(SimTag::with_text(&[6, 6, 6, 6], "ITEM:SAW"));
    writer.tick(&mut field, &mut out, 0);
    out.take_lines();

    read_tick(&mut reader, &mut field, &mut out, 100);
    assert_eq!(out.lines, ["NO_NDEF_MESSAGE"]);
}

#[test]
fn write_protected_tag_reports_failure() {
    let mut writer = WriterController::new(EdgeTrigger);
    let mut field = Field::default();
    let mut out = Console::default();

    writer.handle_input(b'4', &mut out);
    let mut tag = SimTag::blank(&[1, 2, 3, 4]);
    tag.writable = false;
    field.place(tag);
    writer.tick(&mut field, &mut out, 0);

    assert_eq!(field.writes, 1);
    assert_eq!(out.cues, [Cue::Failure]);
    assert!(out.lines.iter().any(|l| l == "Try formatting the tag first (option 8)"));
    assert_eq!(writer.pending(), Pending::Idle);
}

#[test]
fn writer_ignores_tags_while_idle() {
    let mut writer = WriterController::new(EdgeTrigger);
    let mut field = Field::default();
    let mut out = Console::default();

    field.place(SimTag::blank(&[1, 2, 3, 4]));
    assert_eq!(writer.tick(&mut field, &mut out, 0), TickOutcome::Idle);

    // Selecting while the tag sits in the field waits for a fresh placement.
    writer.handle_input(b'2', &mut out);
    assert_eq!(writer.tick(&mut field, &mut out, 100), TickOutcome::Idle);
    let tag = field.remove().unwrap();
    writer.tick(&mut field, &mut out, 200);
    field.place(tag);
    assert_eq!(writer.tick(&mut field, &mut out, 300), TickOutcome::Acted);

    assert_eq!(field.writes, 1);
    assert_eq!(field.reads, 0);
}

#[test]
fn invalid_keys_and_line_endings_keep_pending_action() {
    let mut writer = WriterController::new(EdgeTrigger);
    let mut out = Console::default();

    writer.handle_input(b'3', &mut out);
    writer.handle_input(b'x', &mut out);
    writer.handle_input(b'\r', &mut out);
    writer.handle_input(b'\n', &mut out);

    assert_eq!(writer.pending(), Pending::Write(3));
    let invalid = out
        .lines
        .iter()
        .filter(|l| *l == "Invalid selection. Press 9 for menu.")
        .count();
    assert_eq!(invalid, 3);
}
