//! MIDI protocol handling
//!
//! Byte-stream parsing ([`parser`]), decoded channel-voice messages
//! ([`message`]), and the continuous-controller value table
//! ([`controls`]). Dispatch of decoded messages to the active chip lives
//! in [`crate::synth`].

pub mod controls;
pub mod message;
pub mod parser;

pub use controls::{CcControl, CcTable, ControlKind};
pub use message::MidiMessage;
pub use parser::MidiParser;
