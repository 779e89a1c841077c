//! Message dispatch
//!
//! [`Synthesizer`] is the top of the control-flow chain: raw bytes go into
//! the parser, complete messages are routed to the active chip through the
//! voice allocator and the fixed CC mapping table. One byte is processed
//! per call so hardware register writes interleave fairly with whatever
//! else the single-threaded main loop is doing.
//!
//! Dispatch policy, matching the control surface this was built for:
//!
//! | CC    | Effect                                   |
//! |-------|------------------------------------------|
//! | 1-4   | Volume, first active voice (`v*15/127`)  |
//! | 5     | Attack (envelope period)                 |
//! | 6     | Decay (envelope shape select)            |
//! | 7     | Sustain (volume path)                    |
//! | 8     | Release (envelope period)                |
//! | 9     | Vibrato depth (inert on the PSG)         |
//! | 10    | Tremolo rate (inert on the PSG)          |
//! | 11    | Pitch bend, `(v-64)*128` signed units    |
//! | 12    | Modulation depth (inert on the PSG)      |
//!
//! Per-voice CC edits target only the first active voice found by linear
//! scan, even when several are sounding.

use std::fmt::Write as _;

use log::{debug, warn};

use crate::bus::PsgBus;
use crate::chip::ym2149::Ym2149Driver;
use crate::chip::SoundChip;
use crate::config::PortConfig;
use crate::input::ByteSource;
use crate::midi::controls::CcTable;
use crate::midi::message::MidiMessage;
use crate::midi::parser::MidiParser;
use crate::synth::allocator::{allocate_voice, find_voice};
use crate::synth::manager::ChipManager;

/// The complete MIDI-to-chip pipeline.
pub struct Synthesizer {
    manager: ChipManager,
    parser: MidiParser,
    controls: CcTable,
}

impl Synthesizer {
    /// Build a synthesizer around an already-populated chip manager.
    pub fn new(manager: ChipManager) -> Self {
        Self {
            manager,
            parser: MidiParser::new(),
            controls: CcTable::new(),
        }
    }

    /// Convenience constructor: a single YM2149 on the default ports.
    pub fn with_ym2149(bus: Box<dyn PsgBus>) -> Self {
        let mut manager = ChipManager::new();
        manager.register(Box::new(Ym2149Driver::new(bus, PortConfig::default())));
        Self::new(manager)
    }

    /// Detect hardware and select the default chip.
    pub fn init(&mut self) {
        self.manager.init();
        self.parser.reset();
    }

    /// Feed one raw input byte through the parser and dispatch any message
    /// it completes.
    pub fn process_byte(&mut self, byte: u8) {
        if let Some(message) = self.parser.feed(byte) {
            self.dispatch(message);
        }
    }

    /// Drain a pollable byte source.
    pub fn process_input<S: ByteSource>(&mut self, source: &mut S) {
        while source.available() {
            let byte = source.read_byte();
            self.process_byte(byte);
        }
    }

    /// Route a complete message to the active chip.
    pub fn dispatch(&mut self, message: MidiMessage) {
        debug!("dispatch {message:?}");
        match message {
            // Note On with velocity 0 is a Note Off by MIDI convention
            MidiMessage::NoteOn {
                channel,
                note,
                velocity: 0,
            }
            | MidiMessage::NoteOff { channel, note } => {
                if let Some(chip) = self.manager.current_mut() {
                    if let Some(voice) = find_voice(chip.voices(), note, channel) {
                        chip.note_off(voice);
                    }
                }
            }

            MidiMessage::NoteOn {
                channel,
                note,
                velocity,
            } => {
                if let Some(chip) = self.manager.current_mut() {
                    if let Some(voice) = allocate_voice(chip.voices()) {
                        chip.note_on(voice, note, velocity, channel);
                    }
                }
            }

            MidiMessage::ControlChange {
                controller, value, ..
            } => {
                self.controls.update(controller, value);
                self.apply_cc(controller, value);
            }

            MidiMessage::ProgramChange { program, .. } => {
                if let Some(chip) = self.manager.current_mut() {
                    chip.set_preset(program);
                }
            }

            MidiMessage::PitchBend { bend, .. } => {
                if let Some(chip) = self.manager.current_mut() {
                    chip.set_pitch_bend(bend);
                }
            }
        }
    }

    /// Apply a controller value to the active chip per the mapping table.
    fn apply_cc(&mut self, controller: u8, value: u8) {
        let Some(chip) = self.manager.current_mut() else {
            return;
        };

        match controller {
            1..=4 => {
                if let Some(voice) = first_active_voice(chip) {
                    let volume = (u16::from(value) * 15 / 127) as u8;
                    chip.set_volume(voice, volume);
                }
            }
            5 => {
                if let Some(voice) = first_active_voice(chip) {
                    chip.set_attack(voice, value);
                }
            }
            6 => {
                if let Some(voice) = first_active_voice(chip) {
                    chip.set_decay(voice, value);
                }
            }
            7 => {
                if let Some(voice) = first_active_voice(chip) {
                    chip.set_sustain(voice, value);
                }
            }
            8 => {
                if let Some(voice) = first_active_voice(chip) {
                    chip.set_release(voice, value);
                }
            }
            9 => chip.set_vibrato(value),
            10 => chip.set_tremolo(value),
            11 => {
                // Secondary bend path: center the 7-bit value and widen it
                // into signed bend units
                let bend = (i16::from(value) - 64) * 128;
                chip.set_pitch_bend(bend);
            }
            12 => chip.set_modulation(value),
            _ => {}
        }
    }

    /// Emergency all-notes-off on the active chip.
    pub fn panic(&mut self) {
        warn!("panic: silencing all voices");
        if let Some(chip) = self.manager.current_mut() {
            chip.panic();
        }
    }

    /// Human-readable status: detected hardware, active chip, sounding
    /// voices, CC slot values.
    pub fn status_report(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Detected chips: {:?}", self.manager.available());

        match self.manager.current() {
            Some(chip) => {
                let _ = writeln!(out, "Active chip: {} ({} voices)", chip.name(), chip.voice_count());
                let mut sounding = 0;
                for (i, voice) in chip.voices().iter().enumerate() {
                    if voice.active {
                        let _ = writeln!(
                            out,
                            "  voice {}: note {} vel {} ch {}",
                            i, voice.note, voice.velocity, voice.channel
                        );
                        sounding += 1;
                    }
                }
                if sounding == 0 {
                    let _ = writeln!(out, "  (no active voices)");
                }
            }
            None => {
                let _ = writeln!(out, "No sound chip selected");
            }
        }

        for slot in self.controls.iter() {
            let _ = writeln!(out, "CC#{} ({}): {}", slot.cc_number, slot.name, slot.value);
        }
        out
    }

    /// The controller value table.
    pub fn controls(&self) -> &CcTable {
        &self.controls
    }

    /// The chip manager.
    pub fn manager(&self) -> &ChipManager {
        &self.manager
    }

    /// The chip manager, mutably (chip switching, port reload).
    pub fn manager_mut(&mut self) -> &mut ChipManager {
        &mut self.manager
    }
}

/// Linear scan for the lowest-index active voice.
fn first_active_voice(chip: &dyn SoundChip) -> Option<usize> {
    chip.voices().iter().position(|v| v.active)
}
