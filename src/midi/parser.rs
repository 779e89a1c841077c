//! Streaming MIDI parser
//!
//! Reassembles complete channel-voice messages from an unbounded byte
//! stream, one byte per call, suspending all state between calls. This is
//! the shape a polled single-threaded input loop needs: feed whatever byte
//! is available, get back a message when one completes, never block.
//!
//! Protocol details handled here:
//! - **Running status**: after a complete message, the status byte is
//!   retained so further data-byte pairs reuse it without a new status.
//! - **System real-time** (0xF8-0xFF): legal anywhere, including between
//!   the bytes of another message; never touches parser state.
//! - **System common** (0xF0-0xF7): clears running status entirely.
//! - **Stray data bytes** with no running status are silently discarded;
//!   real devices emit them and they carry no recoverable meaning.
//! - **Unsupported commands** are accepted as status-only (expected byte
//!   count 0) and never produce a message.

use crate::midi::message::{status, MidiMessage};

/// Resumable MIDI byte-stream state machine.
#[derive(Debug, Clone, Default)]
pub struct MidiParser {
    // Running status byte, 0 when none
    running_status: u8,
    data1: u8,
    data2: u8,
    expected_bytes: u8,
    byte_count: u8,
}

impl MidiParser {
    /// Create a parser with no running status.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget any in-progress message and running status.
    pub fn reset(&mut self) {
        self.running_status = 0;
        self.expected_bytes = 0;
        self.byte_count = 0;
    }

    /// Whether a running status is currently latched.
    pub fn has_running_status(&self) -> bool {
        self.running_status != 0
    }

    /// Consume one input byte; returns a message when one completes.
    pub fn feed(&mut self, byte: u8) -> Option<MidiMessage> {
        // System real-time: valid mid-message, must not disturb state.
        // Clock/start/stop handling would go here.
        if byte >= 0xF8 {
            return None;
        }

        if byte & 0x80 != 0 {
            // System common: kills running status, emits nothing
            if byte >= 0xF0 {
                self.reset();
                return None;
            }

            // New channel-voice message
            self.running_status = byte;
            self.byte_count = 0;
            self.expected_bytes = match byte & 0xF0 {
                status::NOTE_OFF
                | status::NOTE_ON
                | status::CONTROL_CHANGE
                | status::PITCH_BEND => 2,
                status::PROGRAM_CHANGE => 1,
                // Unsupported command: status-only, never completes
                _ => 0,
            };
            return None;
        }

        // Data byte with no status to attach to: malformed stream, drop it
        if self.running_status == 0 {
            return None;
        }

        self.byte_count += 1;
        match self.byte_count {
            1 => self.data1 = byte,
            2 => self.data2 = byte,
            _ => {}
        }

        if self.byte_count >= self.expected_bytes {
            // Status is retained for running-status reuse; only the data
            // counter resets.
            self.byte_count = 0;
            return MidiMessage::from_raw(self.running_status, self.data1, self.data2);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(parser: &mut MidiParser, bytes: &[u8]) -> Vec<MidiMessage> {
        bytes.iter().filter_map(|&b| parser.feed(b)).collect()
    }

    #[test]
    fn test_note_on_assembles_from_three_bytes() {
        let mut parser = MidiParser::new();
        let messages = feed_all(&mut parser, &[0x90, 0x3C, 0x64]);
        assert_eq!(
            messages,
            vec![MidiMessage::NoteOn {
                channel: 0,
                note: 60,
                velocity: 100
            }]
        );
    }

    #[test]
    fn test_running_status_reuses_last_status_byte() {
        let mut parser = MidiParser::new();
        let messages = feed_all(&mut parser, &[0x90, 0x3C, 0x64, 0x3E, 0x50, 0x40, 0x30]);
        assert_eq!(
            messages,
            vec![
                MidiMessage::NoteOn {
                    channel: 0,
                    note: 60,
                    velocity: 100
                },
                MidiMessage::NoteOn {
                    channel: 0,
                    note: 62,
                    velocity: 80
                },
                MidiMessage::NoteOn {
                    channel: 0,
                    note: 64,
                    velocity: 48
                },
            ]
        );
    }

    #[test]
    fn test_realtime_bytes_are_transparent_mid_message() {
        let plain = feed_all(&mut MidiParser::new(), &[0x90, 0x3C, 0x64]);

        // Clock (0xF8) and active sensing (0xFE) injected between every byte
        let interleaved = feed_all(
            &mut MidiParser::new(),
            &[0xF8, 0x90, 0xFE, 0x3C, 0xF8, 0x64, 0xF8],
        );

        assert_eq!(plain, interleaved);
    }

    #[test]
    fn test_system_common_clears_running_status() {
        let mut parser = MidiParser::new();
        parser.feed(0x90);
        assert!(parser.has_running_status());

        // Tune request (0xF6)
        parser.feed(0xF6);
        assert!(!parser.has_running_status());

        // Data bytes afterwards have nothing to attach to
        assert_eq!(parser.feed(0x3C), None);
        assert_eq!(parser.feed(0x64), None);
    }

    #[test]
    fn test_stray_data_bytes_are_discarded() {
        let mut parser = MidiParser::new();
        assert_eq!(parser.feed(0x3C), None);
        assert_eq!(parser.feed(0x64), None);

        // Stream recovers as soon as a status byte arrives
        let messages = feed_all(&mut parser, &[0x90, 0x3C, 0x64]);
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn test_program_change_needs_one_data_byte() {
        let mut parser = MidiParser::new();
        let messages = feed_all(&mut parser, &[0xC0, 0x05]);
        assert_eq!(
            messages,
            vec![MidiMessage::ProgramChange {
                channel: 0,
                program: 5
            }]
        );
    }

    #[test]
    fn test_unsupported_command_never_completes() {
        let mut parser = MidiParser::new();
        // Polyphonic key pressure: accepted as status-only
        let messages = feed_all(&mut parser, &[0xA0, 0x3C, 0x40, 0x3D, 0x41]);
        assert!(messages.is_empty());
    }

    #[test]
    fn test_new_status_interrupts_partial_message() {
        let mut parser = MidiParser::new();
        parser.feed(0x90);
        parser.feed(0x3C);

        // A fresh status abandons the half-received note-on
        let messages = feed_all(&mut parser, &[0xB0, 0x01, 0x7F]);
        assert_eq!(
            messages,
            vec![MidiMessage::ControlChange {
                channel: 0,
                controller: 1,
                value: 127
            }]
        );
    }

    #[test]
    fn test_pitch_bend_assembles_14_bit_value() {
        let mut parser = MidiParser::new();
        let messages = feed_all(&mut parser, &[0xE0, 0x00, 0x40]);
        assert_eq!(messages, vec![MidiMessage::PitchBend { channel: 0, bend: 0 }]);
    }
}
