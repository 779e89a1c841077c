//! Raw MIDI byte sources
//!
//! The synthesizer polls its input: check for a byte, read it, hand it to
//! the parser, repeat. Absence of data is the normal case, not an error.
//! Hardware builds implement [`ByteSource`] over a UART status/data
//! register pair; tests and demos use [`BufferSource`].

use std::collections::VecDeque;

/// Pollable source of raw MIDI bytes.
pub trait ByteSource {
    /// Whether at least one byte is ready to read.
    fn available(&self) -> bool;

    /// Read the next byte. Only meaningful after `available` returned true.
    fn read_byte(&mut self) -> u8;
}

/// In-memory byte source for tests and demo playback.
#[derive(Debug, Clone, Default)]
pub struct BufferSource {
    bytes: VecDeque<u8>,
}

impl BufferSource {
    /// Create a source that will yield the given bytes in order.
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.iter().copied().collect(),
        }
    }

    /// Queue more bytes behind whatever is still pending.
    pub fn push(&mut self, bytes: &[u8]) {
        self.bytes.extend(bytes.iter().copied());
    }
}

impl ByteSource for BufferSource {
    fn available(&self) -> bool {
        !self.bytes.is_empty()
    }

    fn read_byte(&mut self) -> u8 {
        self.bytes.pop_front().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_source_drains_in_order() {
        let mut source = BufferSource::new(&[0x90, 0x3C, 0x64]);

        assert!(source.available());
        assert_eq!(source.read_byte(), 0x90);
        assert_eq!(source.read_byte(), 0x3C);
        assert_eq!(source.read_byte(), 0x64);
        assert!(!source.available());
    }

    #[test]
    fn test_push_appends_behind_pending_bytes() {
        let mut source = BufferSource::new(&[0x90]);
        source.push(&[0x3C]);
        assert_eq!(source.read_byte(), 0x90);
        assert_eq!(source.read_byte(), 0x3C);
    }
}
