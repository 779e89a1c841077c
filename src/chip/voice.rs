//! Voice pool entries
//!
//! One [`Voice`] per hardware channel, created at driver init and reused
//! for the lifetime of the program. A voice is activated by a note-on
//! allocation and deactivated by note-off or by being stolen; it is never
//! destroyed.

/// State of one hardware sound-generation channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct Voice {
    /// Voice is currently sounding
    pub active: bool,
    /// MIDI note being played (0-127)
    pub note: u8,
    /// Note-on velocity (0-127)
    pub velocity: u8,
    /// MIDI channel the note arrived on (0-15)
    pub channel: u8,
    /// Logical allocation clock value at note-on.
    ///
    /// Monotonically increasing sequence number, never wall time; the
    /// allocator steals the voice with the smallest value.
    pub start_time: u32,

    // Chip-specific extras (YM2149)
    /// Current chip volume (0-15)
    pub volume: u8,
    /// Current envelope shape register value
    pub envelope_shape: u8,
    /// Current 12-bit tone period as written to the chip
    pub period: u16,
    /// Level register is in envelope mode rather than fixed volume
    pub envelope_enabled: bool,
}

impl Voice {
    /// Mark the voice active and record the incoming note.
    pub fn start(&mut self, note: u8, velocity: u8, channel: u8, start_time: u32) {
        self.active = true;
        self.note = note;
        self.velocity = velocity;
        self.channel = channel;
        self.start_time = start_time;
    }

    /// Mark the voice released. Chip extras keep their last values so a
    /// subsequent CC edit still sees sensible state.
    pub fn stop(&mut self) {
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_records_note_state() {
        let mut voice = Voice::default();
        voice.start(60, 100, 0, 7);

        assert!(voice.active);
        assert_eq!(voice.note, 60);
        assert_eq!(voice.velocity, 100);
        assert_eq!(voice.channel, 0);
        assert_eq!(voice.start_time, 7);
    }

    #[test]
    fn test_stop_only_clears_active() {
        let mut voice = Voice::default();
        voice.start(60, 100, 0, 7);
        voice.volume = 12;
        voice.stop();

        assert!(!voice.active);
        assert_eq!(voice.note, 60);
        assert_eq!(voice.volume, 12);
    }
}
