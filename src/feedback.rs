//! Operator feedback: status lines and buzzer cues.
//!
//! Controllers report through the [`Feedback`] trait. On target the lines
//! go to the USB serial channel and cues to the buzzer task; in tests a
//! recorder collects both.

use core::fmt::{self, Write};

use heapless::String;

use crate::config::STATUS_LINE_CAPACITY;

/// Audible cue requested by a controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Cue {
    /// Reader found an item.
    Read,
    /// Write or format succeeded.
    Success,
    /// Write or format failed.
    Failure,
}

/// One note of a cue: play `freq_hz` for `duration_ms`, then stay silent
/// for `gap_ms`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ToneStep {
    pub freq_hz: u32,
    pub duration_ms: u64,
    pub gap_ms: u64,
}

const fn step(freq_hz: u32, duration_ms: u64, gap_ms: u64) -> ToneStep {
    ToneStep {
        freq_hz,
        duration_ms,
        gap_ms,
    }
}

/// A4 then E5.
pub const READ_TONES: [ToneStep; 2] = [step(440, 100, 50), step(660, 100, 50)];

/// Rising C5-E5-G5 arpeggio.
pub const SUCCESS_TONES: [ToneStep; 3] =
    [step(523, 100, 20), step(659, 100, 20), step(784, 150, 0)];

/// Two low falling notes.
pub const FAILURE_TONES: [ToneStep; 2] = [step(200, 300, 50), step(150, 300, 0)];

impl Cue {
    pub fn tones(self) -> &'static [ToneStep] {
        match self {
            Cue::Read => &READ_TONES,
            Cue::Success => &SUCCESS_TONES,
            Cue::Failure => &FAILURE_TONES,
        }
    }
}

/// Sink for everything a controller tells the operator.
pub trait Feedback {
    /// Emit one status line. `text` excludes the line terminator.
    fn line(&mut self, text: &[u8]);

    /// Request an audible cue.
    fn cue(&mut self, cue: Cue);

    /// Emit a formatted line, truncated to `STATUS_LINE_CAPACITY` bytes.
    fn line_fmt(&mut self, args: fmt::Arguments<'_>) {
        let mut buf: String<STATUS_LINE_CAPACITY> = String::new();
        let mut writer = Truncating(&mut buf);
        let _ = writer.write_fmt(args);
        self.line(buf.as_bytes());
    }
}

/// Writes what fits and silently drops the rest.
struct Truncating<'a>(&'a mut String<STATUS_LINE_CAPACITY>);

impl Write for Truncating<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Lines(std::vec::Vec<std::vec::Vec<u8>>);

    impl Feedback for Lines {
        fn line(&mut self, text: &[u8]) {
            self.0.push(text.to_vec());
        }

        fn cue(&mut self, _cue: Cue) {}
    }

    #[test]
    fn success_and_failure_cues_are_distinguishable() {
        assert_ne!(Cue::Success.tones(), Cue::Failure.tones());
        assert_ne!(Cue::Read.tones(), Cue::Failure.tones());

        let lowest_success = Cue::Success.tones().iter().map(|t| t.freq_hz).min().unwrap();
        let highest_failure = Cue::Failure.tones().iter().map(|t| t.freq_hz).max().unwrap();
        assert!(lowest_success > highest_failure);
    }

    #[test]
    fn every_cue_has_audible_steps() {
        for cue in [Cue::Read, Cue::Success, Cue::Failure] {
            assert!(!cue.tones().is_empty());
            assert!(cue.tones().iter().all(|t| t.freq_hz > 0 && t.duration_ms > 0));
        }
    }

    #[test]
    fn formatted_lines_are_emitted() {
        let mut lines = Lines::default();
        lines.line_fmt(format_args!("Selected: {}", "Beer"));
        assert_eq!(lines.0[0], b"Selected: Beer");
    }

    #[test]
    fn formatted_lines_are_truncated_to_capacity() {
        let mut lines = Lines::default();
        let long = "x".repeat(STATUS_LINE_CAPACITY + 20);
        lines.line_fmt(format_args!("{}", long));
        assert_eq!(lines.0[0].len(), STATUS_LINE_CAPACITY);
    }
}
