//! Chip registry and switching
//!
//! [`ChipManager`] owns every registered chip driver, runs hardware
//! detection to build the availability mask, and holds the single
//! "current chip" the dispatcher operates through. Switching follows a
//! strict protocol: silence the outgoing chip, initialize the incoming one
//! from scratch, then publish it; a switch to an undetected or
//! unimplemented chip leaves the current chip untouched and reports
//! failure.

use log::info;

use crate::chip::{ChipId, ChipSet, SoundChip};
use crate::config::PortConfig;
use crate::{Result, SynthError};

/// Owns the chip drivers and mediates which one is active.
#[derive(Default)]
pub struct ChipManager {
    chips: Vec<Box<dyn SoundChip>>,
    current: Option<usize>,
    available: ChipSet,
}

impl ChipManager {
    /// Create an empty manager with no chips registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a chip driver. Registration order decides which available
    /// chip becomes the default at init.
    pub fn register(&mut self, chip: Box<dyn SoundChip>) {
        self.chips.push(chip);
    }

    /// Probe every registered chip and rebuild the availability mask.
    pub fn detect_chips(&mut self) -> ChipSet {
        self.available = ChipSet::empty();
        for chip in &mut self.chips {
            if chip.detect() {
                self.available |= chip.chip_id().flag();
            }
        }
        info!("detected chips: {:?}", self.available);
        self.available
    }

    /// Detect hardware and select the first available chip, if any.
    pub fn init(&mut self) {
        self.detect_chips();

        let first = self
            .chips
            .iter()
            .map(|c| c.chip_id())
            .find(|id| self.available.contains(id.flag()));
        if let Some(id) = first {
            // Cannot fail: the id came from the availability mask
            let _ = self.set_chip(id);
        }
    }

    /// Switch the active chip.
    ///
    /// The switch completes fully before returning: the outgoing chip is
    /// silenced, then the incoming chip's hardware state is initialized
    /// from scratch, then it is published as current. On failure the
    /// current chip is left exactly as it was.
    pub fn set_chip(&mut self, id: ChipId) -> Result<()> {
        let index = self
            .chips
            .iter()
            .position(|c| c.chip_id() == id)
            .ok_or(SynthError::ChipNotImplemented(id))?;

        if !self.available.contains(id.flag()) {
            return Err(SynthError::ChipNotAvailable(id));
        }

        // No stuck notes may survive across a chip switch
        if let Some(current) = self.current {
            self.chips[current].all_off();
        }

        self.chips[index].init();
        self.current = Some(index);
        info!("active chip: {}", self.chips[index].name());
        Ok(())
    }

    /// Chips that answered the detection probe.
    pub fn available(&self) -> ChipSet {
        self.available
    }

    /// Identity of the active chip.
    pub fn current_id(&self) -> Option<ChipId> {
        self.current.map(|i| self.chips[i].chip_id())
    }

    /// The active chip.
    pub fn current(&self) -> Option<&dyn SoundChip> {
        self.current.map(|i| self.chips[i].as_ref())
    }

    /// The active chip, mutably.
    pub fn current_mut(&mut self) -> Option<&mut dyn SoundChip> {
        match self.current {
            Some(i) => Some(self.chips[i].as_mut()),
            None => None,
        }
    }

    /// Push new port addresses to every registered driver.
    pub fn reload_ports(&mut self, ports: PortConfig) -> Result<()> {
        ports.validate()?;
        for chip in &mut self.chips {
            chip.set_ports(ports);
        }
        info!(
            "ports reloaded: addr=0x{:02X} data=0x{:02X}",
            ports.addr_port, ports.data_port
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::SimBus;
    use crate::chip::ym2149::Ym2149Driver;

    fn manager_with_card(present: bool) -> ChipManager {
        let ports = PortConfig::default();
        let bus = if present {
            SimBus::new(ports)
        } else {
            SimBus::absent(ports)
        };
        let mut manager = ChipManager::new();
        manager.register(Box::new(Ym2149Driver::new(bus, ports)));
        manager
    }

    #[test]
    fn test_init_selects_detected_chip() {
        let mut manager = manager_with_card(true);
        manager.init();

        assert!(manager.available().contains(ChipSet::YM2149));
        assert_eq!(manager.current_id(), Some(ChipId::Ym2149));
    }

    #[test]
    fn test_missing_card_yields_no_current_chip() {
        let mut manager = manager_with_card(false);
        manager.init();

        assert!(manager.available().is_empty());
        assert!(manager.current_id().is_none());
    }

    #[test]
    fn test_selecting_undetected_chip_fails_without_switching() {
        let mut manager = manager_with_card(false);
        manager.init();

        let err = manager.set_chip(ChipId::Ym2149).unwrap_err();
        assert!(matches!(err, SynthError::ChipNotAvailable(ChipId::Ym2149)));
        assert!(manager.current_id().is_none());
    }

    #[test]
    fn test_selecting_unimplemented_chip_fails() {
        let mut manager = manager_with_card(true);
        manager.init();

        let err = manager.set_chip(ChipId::Opl3).unwrap_err();
        assert!(matches!(err, SynthError::ChipNotImplemented(ChipId::Opl3)));
        assert_eq!(manager.current_id(), Some(ChipId::Ym2149));
    }

    #[test]
    fn test_reselecting_chip_silences_sounding_voices() {
        let mut manager = manager_with_card(true);
        manager.init();

        let chip = manager.current_mut().unwrap();
        chip.note_on(0, 60, 100, 0);
        assert!(chip.voices()[0].active);

        manager.set_chip(ChipId::Ym2149).unwrap();
        let chip = manager.current().unwrap();
        assert!(chip.voices().iter().all(|v| !v.active));
    }
}
