//! MIDI synthesizer driver for YM2149 PSG sound cards
//!
//! A real-time MIDI-to-sound-chip synthesizer targeting Z80 single-board
//! computers (RC2014 and compatibles) carrying a YM2149/AY-3-8910 PSG card.
//! Incoming MIDI bytes are reassembled into messages, mapped onto the chip's
//! three hardware voices, and turned into register writes on the card's
//! I/O ports.
//!
//! # Features
//! - Byte-at-a-time MIDI parser with running status and real-time
//!   transparency, suitable for polled single-threaded input loops
//! - Deterministic voice allocation with oldest-note stealing
//! - Trait-based sound chip abstraction with probe-based hardware detection
//! - YM2149 driver with note table, pitch bend, envelope CC mapping and
//!   preset selection
//! - Pluggable port I/O bus so tests and host builds run against a
//!   simulated card
//!
//! # Quick start
//! ```
//! use psgsynth::{PortConfig, SimBus, Synthesizer};
//!
//! let bus = SimBus::new(PortConfig::default());
//! let mut synth = Synthesizer::with_ym2149(Box::new(bus));
//! synth.init();
//!
//! // Note On, channel 0, middle C, velocity 100
//! for byte in [0x90, 0x3C, 0x64] {
//!     synth.process_byte(byte);
//! }
//! ```

#![warn(missing_docs)]

pub mod bus;
pub mod chip;
pub mod config;
pub mod input;
pub mod midi;
pub mod synth;

/// Error types for synthesizer operations
///
/// Hot-path operations (voice allocation, voice lookup) use `Option`
/// instead: missing a voice is a normal condition on a 3-voice chip, not
/// an error.
#[derive(thiserror::Error, Debug)]
pub enum SynthError {
    /// Chip was not found during hardware detection
    #[error("chip {0} not detected on the bus")]
    ChipNotAvailable(chip::ChipId),

    /// Chip id is known but has no driver yet
    #[error("chip {0} is not implemented")]
    ChipNotImplemented(chip::ChipId),

    /// An operation needed an active chip and none is selected
    #[error("no sound chip selected")]
    NoChipSelected,

    /// Invalid port configuration
    #[error("invalid port configuration: {0}")]
    ConfigError(String),

    /// Malformed configuration file
    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// IO error from filesystem
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for synthesizer operations
pub type Result<T> = std::result::Result<T, SynthError>;

// Public API exports
pub use bus::{PsgBus, SimBus};
pub use chip::ym2149::Ym2149Driver;
pub use chip::{ChipId, ChipSet, SoundChip, Voice};
pub use config::PortConfig;
pub use input::{BufferSource, ByteSource};
pub use midi::message::MidiMessage;
pub use midi::parser::MidiParser;
pub use synth::dispatcher::Synthesizer;
pub use synth::manager::ChipManager;
