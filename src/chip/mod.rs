//! Sound chip abstraction
//!
//! Every supported sound generator implements [`SoundChip`]: a fixed voice
//! count, a pool of voice states, and a named set of control operations the
//! MIDI dispatcher drives. Chips that lack a feature in hardware (the
//! YM2149 has no vibrato or tremolo) implement the operation as an explicit
//! no-op rather than omitting it.

pub mod diagnostics;
pub mod voice;
pub mod ym2149;

use std::fmt;

use crate::config::PortConfig;

pub use voice::Voice;

/// Identifies a supported sound chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChipId {
    /// YM2149 / AY-3-8910 programmable sound generator (3 voices)
    Ym2149,
    /// OPL3 FM synthesis chip (driver not yet implemented)
    Opl3,
}

impl ChipId {
    /// Flag bit for this chip in a [`ChipSet`].
    pub fn flag(self) -> ChipSet {
        match self {
            ChipId::Ym2149 => ChipSet::YM2149,
            ChipId::Opl3 => ChipSet::OPL3,
        }
    }
}

impl fmt::Display for ChipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChipId::Ym2149 => f.write_str("YM2149"),
            ChipId::Opl3 => f.write_str("OPL3"),
        }
    }
}

bitflags::bitflags! {
    /// Set of chips found during hardware detection.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ChipSet: u8 {
        /// YM2149 PSG present
        const YM2149 = 0b0000_0001;
        /// OPL3 present
        const OPL3 = 0b0000_0010;
    }
}

/// Abstract sound generation device.
///
/// Voice indices are in `0..voice_count()`. Per-voice operations on an
/// out-of-range index are silent no-ops, matching the defensive behavior
/// expected next to interrupt-driven MIDI input.
pub trait SoundChip {
    /// Which chip this driver controls.
    fn chip_id(&self) -> ChipId;

    /// Number of hardware voices.
    fn voice_count(&self) -> usize;

    /// Human-readable chip name.
    fn name(&self) -> &'static str;

    /// Point the driver at new I/O addresses (configuration reload).
    ///
    /// Subsequent register traffic must use the new ports; drivers may not
    /// keep stale cached copies.
    fn set_ports(&mut self, ports: PortConfig);

    /// Probe the hardware and report whether the chip responds.
    ///
    /// Must leave the chip's register state as it found it, whatever the
    /// outcome.
    fn detect(&mut self) -> bool;

    /// Bring the chip to its playable power-on state.
    fn init(&mut self);

    /// Zero all registers and disable all outputs.
    fn reset(&mut self);

    /// Release every sounding voice.
    fn all_off(&mut self);

    /// Emergency silence: all voices off and outputs disabled.
    fn panic(&mut self);

    /// Start a note on a hardware voice.
    fn note_on(&mut self, voice: usize, note: u8, velocity: u8, channel: u8);

    /// Stop the note on a hardware voice.
    fn note_off(&mut self, voice: usize);

    /// Set a voice's volume (chip-native range).
    fn set_volume(&mut self, voice: usize, volume: u8);

    /// Attack time from a 7-bit CC value.
    fn set_attack(&mut self, voice: usize, attack: u8);

    /// Decay character from a 7-bit CC value.
    fn set_decay(&mut self, voice: usize, decay: u8);

    /// Sustain level from a 7-bit CC value.
    fn set_sustain(&mut self, voice: usize, sustain: u8);

    /// Release time from a 7-bit CC value.
    fn set_release(&mut self, voice: usize, release: u8);

    /// Vibrato depth. Explicit no-op on chips without hardware vibrato.
    fn set_vibrato(&mut self, depth: u8);

    /// Tremolo rate. Explicit no-op on chips without hardware tremolo.
    fn set_tremolo(&mut self, rate: u8);

    /// Apply a signed pitch bend to every active voice.
    ///
    /// Implementations recompute each voice's frequency from its stored
    /// MIDI note so repeated bends never accumulate.
    fn set_pitch_bend(&mut self, bend: i16);

    /// Modulation depth. Explicit no-op on chips without modulation.
    fn set_modulation(&mut self, depth: u8);

    /// Select a sound preset (program change target).
    fn set_preset(&mut self, preset: u8);

    /// The chip's voice pool.
    fn voices(&self) -> &[Voice];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chip_id_flags_are_distinct() {
        assert_ne!(ChipId::Ym2149.flag(), ChipId::Opl3.flag());
        assert_eq!(
            ChipId::Ym2149.flag() | ChipId::Opl3.flag(),
            ChipSet::YM2149 | ChipSet::OPL3
        );
    }

    #[test]
    fn test_empty_chip_set_contains_nothing() {
        let set = ChipSet::default();
        assert!(!set.contains(ChipSet::YM2149));
        assert!(!set.contains(ChipSet::OPL3));
    }
}
