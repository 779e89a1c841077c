//! Continuous-controller value table
//!
//! Mirrors the physical control surface this synthesizer was built around:
//! 8 rotary knobs on CC#1-8 and 4 sliders on CC#9-12. Slots are created
//! once at startup and updated in place as Control Change messages arrive;
//! the table is the authoritative record of the last value seen per
//! controller, including controllers that are inert on the current chip.

/// Number of CC slots (8 knobs + 4 sliders)
pub const SLOT_COUNT: usize = 12;

/// Physical control kind behind a CC number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    /// Rotary knob (CC#1-8)
    Knob,
    /// Slider (CC#9-12)
    Slider,
}

/// One continuous-controller slot.
#[derive(Debug, Clone, Copy)]
pub struct CcControl {
    /// Controller number this slot tracks (1-12)
    pub cc_number: u8,
    /// Last value received (0-127)
    pub value: u8,
    /// Physical control kind
    pub kind: ControlKind,
    /// Display name
    pub name: &'static str,
}

/// Fixed table of the 12 tracked controllers.
#[derive(Debug, Clone)]
pub struct CcTable {
    slots: [CcControl; SLOT_COUNT],
}

impl Default for CcTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CcTable {
    /// Build the table: knobs on CC#1-8, sliders on CC#9-12.
    pub fn new() -> Self {
        let mut slots = [CcControl {
            cc_number: 0,
            value: 0,
            kind: ControlKind::Knob,
            name: "Knob",
        }; SLOT_COUNT];

        for (i, slot) in slots.iter_mut().enumerate() {
            slot.cc_number = i as u8 + 1;
            if i >= 8 {
                slot.kind = ControlKind::Slider;
                slot.name = "Slider";
            }
        }

        Self { slots }
    }

    /// Record a controller value; returns false when the CC number is not
    /// one of the tracked 12.
    pub fn update(&mut self, cc_number: u8, value: u8) -> bool {
        match self.slots.iter_mut().find(|s| s.cc_number == cc_number) {
            Some(slot) => {
                slot.value = value;
                true
            }
            None => false,
        }
    }

    /// Look up a slot by controller number.
    pub fn get(&self, cc_number: u8) -> Option<&CcControl> {
        self.slots.iter().find(|s| s.cc_number == cc_number)
    }

    /// Iterate all slots in CC-number order.
    pub fn iter(&self) -> impl Iterator<Item = &CcControl> {
        self.slots.iter()
    }
}
