//! Audio self-test sequences
//!
//! Fixed melodic and diagnostic sequences for verifying a freshly wired
//! card. They exercise exactly the same note/volume primitives the MIDI
//! dispatcher uses, with pacing delegated to the bus so simulated runs
//! finish instantly.

use log::info;

use crate::bus::PsgBus;
use crate::chip::ym2149::{mixer, note_period, registers, Ym2149Driver, VOICE_COUNT};
use crate::chip::SoundChip;

impl<B: PsgBus> Ym2149Driver<B> {
    /// Channel-by-channel tone test, volume sweep, and noise burst.
    pub fn play_test_sequence(&mut self) {
        info!("YM2149 test sequence start");

        // One tone per channel: C4, E4, G4
        for (voice, note) in [60u8, 64, 67].into_iter().enumerate() {
            self.set_frequency(voice, note_period(note));
            self.set_volume(voice, 10);
            self.bus_mut().delay_ms(500);
        }

        // All three sounding together
        self.bus_mut().delay_ms(500);

        // Volume sweep down and back up
        for volume in (1u8..=15).rev().chain(0u8..=15) {
            for voice in 0..VOICE_COUNT {
                self.set_volume(voice, volume);
            }
            self.bus_mut().delay_ms(100);
        }

        // Noise burst: mid period, noise routed to all channels
        self.write_register(registers::FREQ_NOISE, 0x1F);
        self.write_register(registers::MIXER, mixer::ALL_NOISE);
        self.bus_mut().delay_ms(1000);

        // Back to tone mode, everything quiet
        self.write_register(registers::MIXER, mixer::ALL_TONE);
        self.all_off();

        info!("YM2149 test sequence complete");
    }

    /// C major scale on channel A.
    pub fn play_scale(&mut self) {
        const SCALE: [u8; 8] = [60, 62, 64, 65, 67, 69, 71, 72];

        info!("playing C major scale");
        for note in SCALE {
            self.set_frequency(0, note_period(note));
            self.set_volume(0, 12);
            self.bus_mut().delay_ms(400);

            // Brief gap so consecutive notes articulate
            self.set_volume(0, 0);
            self.bus_mut().delay_ms(50);
        }
    }

    /// C major arpeggio, one note per channel, with a fade-out.
    pub fn play_arpeggio(&mut self) {
        const CHORD: [u8; 3] = [60, 64, 67];

        info!("playing arpeggio");
        for (voice, note) in CHORD.into_iter().enumerate() {
            self.set_frequency(voice, note_period(note));
            self.set_volume(voice, 8);
            self.bus_mut().delay_ms(100);
        }

        self.bus_mut().delay_ms(1000);

        for volume in (1u8..=8).rev() {
            for voice in 0..VOICE_COUNT {
                self.set_volume(voice, volume);
            }
            self.bus_mut().delay_ms(150);
        }

        self.all_off();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::SimBus;
    use crate::config::PortConfig;

    fn driver() -> Ym2149Driver<SimBus> {
        let ports = PortConfig::default();
        let mut drv = Ym2149Driver::new(SimBus::new(ports), ports);
        drv.init();
        drv
    }

    #[test]
    fn test_test_sequence_leaves_chip_silent_in_tone_mode() {
        let mut drv = driver();
        drv.play_test_sequence();

        assert_eq!(drv.bus().register(registers::MIXER), mixer::ALL_TONE);
        for level_reg in 0x08..=0x0A {
            assert_eq!(drv.bus().register(level_reg), 0x00);
        }
    }

    #[test]
    fn test_scale_ends_on_top_c() {
        let mut drv = driver();
        drv.play_scale();

        let period = note_period(72);
        assert_eq!(drv.bus().register(0x00), (period & 0xFF) as u8);
        assert_eq!(drv.bus().register(0x01), (period >> 8) as u8);
        // Last gap leaves channel A muted
        assert_eq!(drv.bus().register(0x08), 0x00);
    }

    #[test]
    fn test_arpeggio_programs_all_three_channels() {
        let mut drv = driver();
        drv.play_arpeggio();

        for (voice, note) in [60u8, 64, 67].into_iter().enumerate() {
            let period = note_period(note);
            let lsb = drv.bus().register(voice as u8 * 2);
            let msb = drv.bus().register(voice as u8 * 2 + 1);
            assert_eq!(u16::from(msb) << 8 | u16::from(lsb), period);
        }
    }
}
