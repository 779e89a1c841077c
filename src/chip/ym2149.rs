//! YM2149 PSG driver
//!
//! Drives a YM2149/AY-3-8910 card over the two-port bus protocol: latch the
//! register address, settle, write the data byte, settle. Owns the chip's
//! voice pool, the MIDI-note-to-tone-period table, and the probe-based
//! presence detection.
//!
//! The YM2149 exposes 3 square-wave voices with 12-bit tone periods, 4-bit
//! per-channel volume, and a single shared hardware envelope. Period and
//! pitch are inversely related: a lower period register value is a higher
//! note.

use log::{debug, info};

use crate::bus::PsgBus;
use crate::chip::{ChipId, SoundChip, Voice};
use crate::config::PortConfig;

/// Number of hardware voices on the YM2149
pub const VOICE_COUNT: usize = 3;

/// Lowest MIDI note in the tone-period table (C1)
pub const MIDI_NOTE_MIN: u8 = 24;

/// Highest MIDI note in the tone-period table (C7)
pub const MIDI_NOTE_MAX: u8 = 96;

/// Register addresses
pub mod registers {
    /// Channel A tone period, low byte
    pub const FREQ_A_LSB: u8 = 0x00;
    /// Channel A tone period, high nibble
    pub const FREQ_A_MSB: u8 = 0x01;
    /// Noise generator period
    pub const FREQ_NOISE: u8 = 0x06;
    /// Tone/noise enable per channel (active low)
    pub const MIXER: u8 = 0x07;
    /// Channel A volume and envelope mode
    pub const LEVEL_A: u8 = 0x08;
    /// Channel B volume and envelope mode
    pub const LEVEL_B: u8 = 0x09;
    /// Envelope period, low byte
    pub const FREQ_ENV_LSB: u8 = 0x0B;
    /// Envelope period, high byte
    pub const FREQ_ENV_MSB: u8 = 0x0C;
    /// Envelope shape
    pub const SHAPE_ENV: u8 = 0x0D;
}

/// Mixer register values (bits are disable flags on this chip)
pub mod mixer {
    /// Tone enabled on all channels, noise disabled
    pub const ALL_TONE: u8 = 0x38;
    /// Everything disabled
    pub const ALL_OFF: u8 = 0x3F;
    /// Tone disabled on all channels, noise enabled
    pub const ALL_NOISE: u8 = 0x07;
}

/// Envelope mode bit in the level registers
const VOLUME_ENV: u8 = 0x10;

/// Envelope shapes (R13 values)
pub mod envelope {
    /// Constant level, no envelope
    pub const OFF: u8 = 0x00;
    /// Repeating triangle
    pub const TRIANGLE: u8 = 0x02;
    /// Repeating sawtooth
    pub const SAWTOOTH: u8 = 0x03;
    /// Triangle with decay
    pub const TRIANGLE_DECAY: u8 = 0x06;
    /// Pulse with decay
    pub const PULSE_DECAY: u8 = 0x07;
}

/// MIDI notes 24 (C1) through 96 (C7) as 12-bit tone periods.
///
/// Precomputed for the 1.8432 MHz clock on the RC2014 card:
/// `period = round(1843200 / (16 * freq)) = round(115200 / freq)`.
#[rustfmt::skip]
const NOTE_PERIODS: [u16; 73] = [
    /* 24  C1 */ 3522, 3325, 3138, 2962, 2796, 2639, 2491, 2351,
    /* 32     */ 2219, 2095, 1977, 1866,
    /* 36  C2 */ 1761, 1662, 1569, 1481, 1398, 1319, 1245, 1175,
    /* 44     */ 1109, 1047,  989,  933,
    /* 48  C3 */  881,  831,  784,  740,  699,  660,  623,  588,
    /* 56     */  555,  524,  494,  467,
    /* 60  C4 */  440,  416,  392,  370,  349,  330,  311,  294,
    /* 68     */  277,  262,  247,  233,
    /* 72  C5 */  220,  208,  196,  185,  175,  165,  156,  147,
    /* 80     */  139,  131,  124,  117,
    /* 84  C6 */  110,  104,   98,   93,   87,   82,   78,   73,
    /* 92     */   69,   65,   62,   58,
    /* 96  C7 */   55,
];

/// Tone period for a MIDI note, clamped to the supported range.
///
/// Notes below C1 or above C7 use the nearest boundary period; lookup is
/// never an error.
pub fn note_period(note: u8) -> u16 {
    let note = note.clamp(MIDI_NOTE_MIN, MIDI_NOTE_MAX);
    NOTE_PERIODS[(note - MIDI_NOTE_MIN) as usize]
}

/// Apply a signed pitch bend to a base tone period.
///
/// Linear approximation calibrated so the common ±2-semitone bend range
/// (±8192 units) maps to roughly ±11% of the period. Positive bend raises
/// pitch, which on this chip means a shorter period. The result is clamped
/// to the chip's valid 12-bit period range.
pub fn apply_pitch_bend(base_period: u16, bend: i16) -> u16 {
    let delta = (i32::from(base_period) * i32::from(bend)) / 72_000;
    let result = i32::from(base_period) - delta;
    result.clamp(1, 4095) as u16
}

/// YM2149 chip driver over a [`PsgBus`].
pub struct Ym2149Driver<B: PsgBus> {
    bus: B,
    ports: PortConfig,
    voices: [Voice; VOICE_COUNT],
    // Logical allocation clock, stamped into voices at note-on
    note_clock: u32,
}

impl<B: PsgBus> Ym2149Driver<B> {
    /// Create a driver for a card behind the given bus and ports.
    ///
    /// The hardware is not touched until [`SoundChip::init`] or
    /// [`SoundChip::detect`] is called.
    pub fn new(bus: B, ports: PortConfig) -> Self {
        Self {
            bus,
            ports,
            voices: [Voice::default(); VOICE_COUNT],
            note_clock: 0,
        }
    }

    /// Ports the driver currently writes through.
    pub fn ports(&self) -> PortConfig {
        self.ports
    }

    /// Borrow the underlying bus.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Borrow the underlying bus mutably.
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Write a chip register: latch the address, settle, write data, settle.
    pub fn write_register(&mut self, reg: u8, data: u8) {
        self.bus.out(self.ports.addr_port, reg);
        self.bus.settle();
        self.bus.out(self.ports.data_port, data);
        self.bus.settle();
    }

    /// Read a chip register.
    ///
    /// On the RC2014 card the address port serves double duty: OUT latches
    /// the register address, IN reads the register data. The data port is
    /// write-only.
    pub fn read_register(&mut self, reg: u8) -> u8 {
        self.bus.out(self.ports.addr_port, reg);
        self.bus.settle();
        self.bus.inp(self.ports.addr_port)
    }

    /// Write a 12-bit tone period to a voice's register pair.
    pub fn set_frequency(&mut self, voice: usize, period: u16) {
        if voice >= VOICE_COUNT {
            return;
        }
        self.voices[voice].period = period;

        let lsb_reg = registers::FREQ_A_LSB + (voice as u8 * 2);
        let msb_reg = registers::FREQ_A_MSB + (voice as u8 * 2);
        self.write_register(lsb_reg, (period & 0xFF) as u8);
        self.write_register(msb_reg, ((period >> 8) & 0x0F) as u8);
    }

    /// Write a level register from the voice's stored volume and envelope
    /// mode.
    fn write_level(&mut self, voice: usize) {
        let v = self.voices[voice];
        let mut value = v.volume.min(15);
        if v.envelope_enabled {
            value |= VOLUME_ENV;
        }
        self.write_register(registers::LEVEL_A + voice as u8, value);
    }

    /// Run one write/read-back pattern set against a register.
    ///
    /// `mask` selects the bits that are readable on that register; anything
    /// outside it (envelope mode bits, unused high bits) is ignored.
    fn probe_register(&mut self, reg: u8, mask: u8) -> bool {
        const PATTERNS: [u8; 4] = [0x00, 0x55, 0xAA, 0xFF];
        for pattern in PATTERNS {
            self.write_register(reg, pattern);
            self.bus.settle();
            let read_back = self.read_register(reg);
            if (read_back & mask) != (pattern & mask) {
                return false;
            }
        }
        true
    }
}

impl<B: PsgBus> SoundChip for Ym2149Driver<B> {
    fn chip_id(&self) -> ChipId {
        ChipId::Ym2149
    }

    fn voice_count(&self) -> usize {
        VOICE_COUNT
    }

    fn name(&self) -> &'static str {
        "YM2149 PSG"
    }

    fn set_ports(&mut self, ports: PortConfig) {
        self.ports = ports;
    }

    /// Probe for the chip by writing test patterns to read/write-capable
    /// registers and requiring every pattern to round-trip.
    ///
    /// The mixer is checked under its 6 readable bits, level A under its 4
    /// volume bits, and tone A LSB as a full byte. A bus that floats high
    /// (0xFF for every read, the empty-slot case) fails the very first
    /// mixer pattern. Prior register contents are restored whatever the
    /// outcome, and the whole probe runs with interrupts masked so it
    /// cannot race interrupt-driven I/O.
    fn detect(&mut self) -> bool {
        self.bus.irq_disable();

        let orig_mixer = self.read_register(registers::MIXER);
        let orig_level_a = self.read_register(registers::LEVEL_A);
        let orig_level_b = self.read_register(registers::LEVEL_B);

        let detected = self.probe_register(registers::MIXER, 0x3F)
            && self.probe_register(registers::LEVEL_A, 0x0F)
            && {
                // Tone LSB takes a full byte; one pattern is enough to
                // prove it is not stuck.
                self.write_register(registers::FREQ_A_LSB, 0x42);
                self.bus.settle();
                self.read_register(registers::FREQ_A_LSB) == 0x42
            };

        self.write_register(registers::MIXER, orig_mixer);
        self.write_register(registers::LEVEL_A, orig_level_a);
        self.write_register(registers::LEVEL_B, orig_level_b);

        self.bus.irq_enable();

        info!(
            "YM2149 detection at 0x{:02X}/0x{:02X}: {}",
            self.ports.addr_port,
            self.ports.data_port,
            if detected { "present" } else { "not found" }
        );
        detected
    }

    fn init(&mut self) {
        self.voices = [Voice::default(); VOICE_COUNT];
        self.reset();

        // Tone on all channels, noise off
        self.write_register(registers::MIXER, mixer::ALL_TONE);

        // Fixed max level on each channel
        for voice in 0..VOICE_COUNT {
            self.voices[voice].volume = 0x0F;
            self.write_level(voice);
        }

        // Mid-range noise period as a sane default
        self.write_register(registers::FREQ_NOISE, 0x1F);
    }

    fn reset(&mut self) {
        for reg in 0..=registers::SHAPE_ENV {
            self.write_register(reg, 0x00);
        }
        self.write_register(registers::MIXER, mixer::ALL_OFF);
    }

    fn all_off(&mut self) {
        for voice in 0..VOICE_COUNT {
            self.note_off(voice);
        }
    }

    fn panic(&mut self) {
        self.all_off();
        self.write_register(registers::MIXER, mixer::ALL_OFF);
    }

    fn note_on(&mut self, voice: usize, note: u8, velocity: u8, channel: u8) {
        if voice >= VOICE_COUNT {
            return;
        }

        self.voices[voice].start(note, velocity, channel, self.note_clock);
        self.note_clock += 1;

        let period = note_period(note);
        self.set_frequency(voice, period);

        // 7-bit velocity to 4-bit chip volume
        let volume = (u16::from(velocity) * 15 / 127) as u8;
        self.set_volume(voice, volume);

        debug!("note_on voice={voice} note={note} vel={velocity} ch={channel}");
    }

    fn note_off(&mut self, voice: usize) {
        if voice >= VOICE_COUNT {
            return;
        }
        self.voices[voice].stop();
        self.write_register(registers::LEVEL_A + voice as u8, 0x00);
    }

    fn set_volume(&mut self, voice: usize, volume: u8) {
        if voice >= VOICE_COUNT {
            return;
        }
        self.voices[voice].volume = volume.min(15);
        self.write_level(voice);
    }

    fn set_attack(&mut self, voice: usize, attack: u8) {
        if voice >= VOICE_COUNT {
            return;
        }

        // 7-bit CC to the shared envelope period registers
        let env_freq = u16::from(attack) * 255 / 127;
        self.write_register(registers::FREQ_ENV_LSB, (env_freq & 0xFF) as u8);
        self.write_register(registers::FREQ_ENV_MSB, (env_freq >> 8) as u8);

        // Switch the voice's level register to envelope mode
        self.voices[voice].envelope_enabled = true;
        self.write_level(voice);
    }

    fn set_decay(&mut self, voice: usize, decay: u8) {
        if voice >= VOICE_COUNT {
            return;
        }
        let shape = if decay > 64 {
            envelope::TRIANGLE_DECAY
        } else {
            envelope::TRIANGLE
        };
        self.voices[voice].envelope_shape = shape;
        self.write_register(registers::SHAPE_ENV, shape);
    }

    fn set_sustain(&mut self, voice: usize, sustain: u8) {
        if voice >= VOICE_COUNT {
            return;
        }
        let volume = (u16::from(sustain) * 15 / 127) as u8;
        self.set_volume(voice, volume);
    }

    fn set_release(&mut self, voice: usize, release: u8) {
        if voice >= VOICE_COUNT {
            return;
        }
        let env_freq = u16::from(release) * 255 / 127;
        self.write_register(registers::FREQ_ENV_LSB, (env_freq & 0xFF) as u8);
        self.write_register(registers::FREQ_ENV_MSB, (env_freq >> 8) as u8);
    }

    /// No hardware vibrato on the YM2149; the CC value is recorded by the
    /// dispatcher's control table but has no chip-level effect.
    fn set_vibrato(&mut self, _depth: u8) {}

    /// No hardware tremolo on the YM2149.
    fn set_tremolo(&mut self, _rate: u8) {}

    fn set_pitch_bend(&mut self, bend: i16) {
        // Recompute from each voice's stored note, never from the already
        // bent period, so repeated bends cannot accumulate.
        for voice in 0..VOICE_COUNT {
            if self.voices[voice].active {
                let base = note_period(self.voices[voice].note);
                let bent = apply_pitch_bend(base, bend);
                self.set_frequency(voice, bent);
            }
        }
    }

    /// No hardware modulation on the YM2149.
    fn set_modulation(&mut self, _depth: u8) {}

    fn set_preset(&mut self, preset: u8) {
        let shape = match preset {
            0 => envelope::OFF,
            1 => envelope::SAWTOOTH,
            2 => envelope::TRIANGLE,
            3 => envelope::PULSE_DECAY,
            _ => return,
        };
        self.write_register(registers::SHAPE_ENV, shape);
    }

    fn voices(&self) -> &[Voice] {
        &self.voices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::SimBus;

    fn driver() -> Ym2149Driver<SimBus> {
        let ports = PortConfig::default();
        Ym2149Driver::new(SimBus::new(ports), ports)
    }

    #[test]
    fn test_note_periods_monotonically_non_increasing() {
        for note in MIDI_NOTE_MIN..MIDI_NOTE_MAX {
            assert!(
                note_period(note + 1) <= note_period(note),
                "period rose between notes {} and {}",
                note,
                note + 1
            );
        }
    }

    #[test]
    fn test_note_period_clamps_out_of_range_notes() {
        assert_eq!(note_period(0), note_period(MIDI_NOTE_MIN));
        assert_eq!(note_period(127), note_period(MIDI_NOTE_MAX));
        assert_eq!(note_period(60), 440);
    }

    #[test]
    fn test_zero_bend_leaves_period_unchanged() {
        for period in [1u16, 440, 3522, 4095] {
            assert_eq!(apply_pitch_bend(period, 0), period);
        }
    }

    #[test]
    fn test_positive_bend_shortens_period() {
        let base = note_period(60);
        assert!(apply_pitch_bend(base, 8191) < base);
        assert!(apply_pitch_bend(base, -8192) > base);
    }

    #[test]
    fn test_bend_clamps_to_12_bit_range() {
        assert!(apply_pitch_bend(4095, -8192) <= 4095);
        assert!(apply_pitch_bend(1, 8191) >= 1);
    }

    #[test]
    fn test_note_on_programs_period_and_volume() {
        let mut drv = driver();
        drv.init();
        drv.note_on(0, 60, 127, 0);

        // Middle C at full velocity: period 440, volume 15
        assert_eq!(drv.bus().register(0x00), (440u16 & 0xFF) as u8);
        assert_eq!(drv.bus().register(0x01), (440u16 >> 8) as u8);
        assert_eq!(drv.bus().register(0x08), 0x0F);

        let v = drv.voices()[0];
        assert!(v.active);
        assert_eq!(v.note, 60);
        assert_eq!(v.period, 440);
    }

    #[test]
    fn test_velocity_scales_to_chip_volume() {
        let mut drv = driver();
        drv.init();
        drv.note_on(0, 60, 64, 0);
        // 64 * 15 / 127 = 7
        assert_eq!(drv.bus().register(0x08), 7);
    }

    #[test]
    fn test_note_off_silences_level_register() {
        let mut drv = driver();
        drv.init();
        drv.note_on(1, 62, 100, 0);
        drv.note_off(1);

        assert!(!drv.voices()[1].active);
        assert_eq!(drv.bus().register(0x09), 0x00);
    }

    #[test]
    fn test_pitch_bend_recomputes_from_base_note() {
        let mut drv = driver();
        drv.init();
        drv.note_on(0, 60, 100, 0);

        drv.set_pitch_bend(8191);
        let bent = drv.voices()[0].period;
        assert!(bent < 440);

        // A second identical bend must not bend further
        drv.set_pitch_bend(8191);
        assert_eq!(drv.voices()[0].period, bent);

        // Returning to center restores the base period
        drv.set_pitch_bend(0);
        assert_eq!(drv.voices()[0].period, 440);
    }

    #[test]
    fn test_attack_enables_envelope_mode() {
        let mut drv = driver();
        drv.init();
        drv.note_on(0, 60, 127, 0);
        drv.set_attack(0, 127);

        // Envelope period registers programmed, level in envelope mode
        assert_eq!(drv.bus().register(0x0B), 255);
        assert_eq!(drv.bus().register(0x0C), 0);
        assert_eq!(drv.bus().register(0x08) & 0x10, 0x10);
    }

    #[test]
    fn test_decay_selects_envelope_shape() {
        let mut drv = driver();
        drv.init();
        drv.set_decay(0, 30);
        assert_eq!(drv.bus().register(0x0D), envelope::TRIANGLE);
        drv.set_decay(0, 100);
        assert_eq!(drv.bus().register(0x0D), envelope::TRIANGLE_DECAY);
    }

    #[test]
    fn test_detection_succeeds_on_present_card() {
        let mut drv = driver();
        assert!(drv.detect());
        assert!(drv.bus().irq_enabled());
    }

    #[test]
    fn test_detection_fails_on_empty_slot() {
        let ports = PortConfig::default();
        let mut drv = Ym2149Driver::new(SimBus::absent(ports), ports);
        assert!(!drv.detect());
        assert!(drv.bus().irq_enabled());
    }

    #[test]
    fn test_detection_restores_register_state() {
        let mut drv = driver();
        drv.init();
        drv.write_register(registers::MIXER, mixer::ALL_TONE);
        drv.write_register(registers::LEVEL_A, 0x0C);

        drv.detect();

        assert_eq!(drv.bus().register(registers::MIXER), mixer::ALL_TONE);
        assert_eq!(drv.bus().register(registers::LEVEL_A), 0x0C);
    }

    #[test]
    fn test_reset_zeroes_registers_and_disables_outputs() {
        let mut drv = driver();
        drv.init();
        drv.note_on(0, 60, 127, 0);
        drv.reset();

        assert_eq!(drv.bus().register(0x00), 0);
        assert_eq!(drv.bus().register(0x08), 0);
        assert_eq!(drv.bus().register(registers::MIXER), mixer::ALL_OFF);
    }

    #[test]
    fn test_out_of_range_voice_is_ignored() {
        let mut drv = driver();
        drv.init();
        drv.note_on(3, 60, 127, 0);
        assert!(drv.voices().iter().all(|v| !v.active));
    }
}
