//! MIDI channel-voice messages
//!
//! Decoded form of a complete `(status, data1, data2)` triple as emitted by
//! the [`crate::midi::parser`]. Only the five commands the synthesizer
//! handles decode to a message; everything else is dropped upstream by the
//! parser's expected-byte-count policy.

/// Channel-voice status command nibbles
pub mod status {
    /// Note Off (2 data bytes)
    pub const NOTE_OFF: u8 = 0x80;
    /// Note On (2 data bytes)
    pub const NOTE_ON: u8 = 0x90;
    /// Control Change (2 data bytes)
    pub const CONTROL_CHANGE: u8 = 0xB0;
    /// Program Change (1 data byte)
    pub const PROGRAM_CHANGE: u8 = 0xC0;
    /// Pitch Bend (2 data bytes, 14-bit value)
    pub const PITCH_BEND: u8 = 0xE0;
}

/// A complete, decoded MIDI channel-voice message.
///
/// Note On with velocity 0 decodes as `NoteOn { velocity: 0 }`; translating
/// it to a note-off is dispatcher policy, not a parsing concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    /// Release a note
    NoteOff {
        /// MIDI channel (0-15)
        channel: u8,
        /// Note number (0-127)
        note: u8,
    },
    /// Start a note
    NoteOn {
        /// MIDI channel (0-15)
        channel: u8,
        /// Note number (0-127)
        note: u8,
        /// Velocity (0-127; 0 means note-off by convention)
        velocity: u8,
    },
    /// Continuous controller update
    ControlChange {
        /// MIDI channel (0-15)
        channel: u8,
        /// Controller number (0-127)
        controller: u8,
        /// Controller value (0-127)
        value: u8,
    },
    /// Preset selection
    ProgramChange {
        /// MIDI channel (0-15)
        channel: u8,
        /// Program number (0-127)
        program: u8,
    },
    /// Pitch wheel move
    PitchBend {
        /// MIDI channel (0-15)
        channel: u8,
        /// Bend centered at 0, range -8192..=8191
        bend: i16,
    },
}

impl MidiMessage {
    /// Decode a complete status/data triple.
    ///
    /// The 14-bit pitch-bend value is assembled from data1 (LSB) and data2
    /// (MSB) and centered by subtracting 8192. Returns `None` for command
    /// nibbles the synthesizer does not handle.
    pub fn from_raw(status: u8, data1: u8, data2: u8) -> Option<Self> {
        let channel = status & 0x0F;
        match status & 0xF0 {
            status::NOTE_OFF => Some(MidiMessage::NoteOff {
                channel,
                note: data1,
            }),
            status::NOTE_ON => Some(MidiMessage::NoteOn {
                channel,
                note: data1,
                velocity: data2,
            }),
            status::CONTROL_CHANGE => Some(MidiMessage::ControlChange {
                channel,
                controller: data1,
                value: data2,
            }),
            status::PROGRAM_CHANGE => Some(MidiMessage::ProgramChange {
                channel,
                program: data1,
            }),
            status::PITCH_BEND => {
                let raw = (u16::from(data2) << 7) | u16::from(data1);
                Some(MidiMessage::PitchBend {
                    channel,
                    bend: raw as i16 - 8192,
                })
            }
            _ => None,
        }
    }

    /// The MIDI channel the message arrived on.
    pub fn channel(&self) -> u8 {
        match *self {
            MidiMessage::NoteOff { channel, .. }
            | MidiMessage::NoteOn { channel, .. }
            | MidiMessage::ControlChange { channel, .. }
            | MidiMessage::ProgramChange { channel, .. }
            | MidiMessage::PitchBend { channel, .. } => channel,
        }
    }
}
