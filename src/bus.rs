//! Port I/O bus abstraction
//!
//! The PSG sits behind two Z80 I/O ports: an address port that latches the
//! target register and a data port that writes the register value. Real
//! hardware is slow to latch, so every access is followed by a short settle
//! delay, and detection probes must run with interrupts masked.
//!
//! The [`PsgBus`] trait captures exactly that access pattern so the chip
//! driver is agnostic to where the writes actually go. Hardware builds
//! implement it with `out`/`in` instructions and calibrated spin loops;
//! tests and host builds use [`SimBus`], which models the RC2014 YM/AY card
//! register file including its "absent card reads 0xFF" behavior.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::PortConfig;

/// Number of PSG registers modeled on the simulated card
const NUM_REGISTERS: usize = 14;

/// Readable bits per register, as wired on the YM2149
///
/// Tone periods are 12-bit pairs, the noise period 5-bit, the mixer 6-bit,
/// levels 5-bit (volume + envelope mode), the envelope shape 4-bit.
const REG_MASK: [u8; NUM_REGISTERS] = [
    0xFF, 0x0F, // Tone A period
    0xFF, 0x0F, // Tone B period
    0xFF, 0x0F, // Tone C period
    0x1F, // Noise period
    0x3F, // Mixer
    0x1F, 0x1F, 0x1F, // Levels A/B/C
    0xFF, 0xFF, // Envelope period
    0x0F, // Envelope shape
];

/// Access to the I/O ports a PSG card lives behind.
///
/// One implementation per platform. All register traffic from the chip
/// driver flows through this trait, including the settle delays the slow
/// latch circuitry needs and the interrupt gating around detection probes.
pub trait PsgBus {
    /// Write a byte to an I/O port.
    fn out(&mut self, port: u8, value: u8);

    /// Read a byte from an I/O port.
    fn inp(&mut self, port: u8) -> u8;

    /// Short busy-wait after a port access so the card can latch.
    ///
    /// Must be constant and uninterruptible on real hardware; simulated
    /// buses implement it as a no-op.
    fn settle(&mut self);

    /// Millisecond-scale delay used by the audio self-test sequences.
    fn delay_ms(&mut self, ms: u16);

    /// Mask interrupts for the duration of a detection probe.
    fn irq_disable(&mut self);

    /// Re-enable interrupts after a detection probe.
    fn irq_enable(&mut self);
}

impl<B: PsgBus + ?Sized> PsgBus for Box<B> {
    fn out(&mut self, port: u8, value: u8) {
        (**self).out(port, value)
    }

    fn inp(&mut self, port: u8) -> u8 {
        (**self).inp(port)
    }

    fn settle(&mut self) {
        (**self).settle()
    }

    fn delay_ms(&mut self, ms: u16) {
        (**self).delay_ms(ms)
    }

    fn irq_disable(&mut self) {
        (**self).irq_disable()
    }

    fn irq_enable(&mut self) {
        (**self).irq_enable()
    }
}

/// Shared handle to a [`SimBus`].
///
/// Lets a test or demo keep visibility into the simulated card after
/// handing the bus to a chip driver. Single-threaded by design, like the
/// rest of the core.
pub type SharedBus = Rc<RefCell<SimBus>>;

/// Wrap a [`SimBus`] in a shared handle.
pub fn shared(bus: SimBus) -> SharedBus {
    Rc::new(RefCell::new(bus))
}

impl PsgBus for SharedBus {
    fn out(&mut self, port: u8, value: u8) {
        self.borrow_mut().out(port, value)
    }

    fn inp(&mut self, port: u8) -> u8 {
        self.borrow_mut().inp(port)
    }

    fn settle(&mut self) {}

    fn delay_ms(&mut self, _ms: u16) {}

    fn irq_disable(&mut self) {
        self.borrow_mut().irq_disable()
    }

    fn irq_enable(&mut self) {
        self.borrow_mut().irq_enable()
    }
}

/// Simulated RC2014 YM/AY sound card.
///
/// Decodes the same two-port protocol as the real card:
/// - `OUT addr_port` latches the register address
/// - `IN addr_port` reads the latched register (masked to readable bits)
/// - `OUT data_port` writes the latched register; the data port is
///   write-only and reads as 0xFF
///
/// A bus constructed with [`SimBus::absent`] answers every read with 0xFF,
/// which is what an empty backplane slot looks like and what detection
/// must reject.
#[derive(Debug, Clone)]
pub struct SimBus {
    ports: PortConfig,
    registers: [u8; NUM_REGISTERS],
    selected: usize,
    present: bool,
    irq_enabled: bool,
}

impl SimBus {
    /// Create a simulated card decoding the given ports.
    pub fn new(ports: PortConfig) -> Self {
        Self {
            ports,
            registers: [0; NUM_REGISTERS],
            selected: 0,
            present: true,
            irq_enabled: true,
        }
    }

    /// Create an empty slot: all reads float high (0xFF).
    pub fn absent(ports: PortConfig) -> Self {
        Self {
            present: false,
            ..Self::new(ports)
        }
    }

    /// Current value of a register on the simulated card.
    pub fn register(&self, reg: u8) -> u8 {
        self.registers.get(reg as usize).copied().unwrap_or(0)
    }

    /// Whether interrupts are currently enabled on the simulated CPU.
    pub fn irq_enabled(&self) -> bool {
        self.irq_enabled
    }
}

impl PsgBus for SimBus {
    fn out(&mut self, port: u8, value: u8) {
        if !self.present {
            return;
        }
        if port == self.ports.addr_port {
            self.selected = (value as usize) & 0x0F;
        } else if port == self.ports.data_port {
            if self.selected < NUM_REGISTERS {
                self.registers[self.selected] = value & REG_MASK[self.selected];
            }
        }
    }

    fn inp(&mut self, port: u8) -> u8 {
        if !self.present {
            return 0xFF;
        }
        // The addr port serves double duty on the RC2014 card: OUT latches
        // the address, IN reads the register data. The data port is
        // write-only.
        if port == self.ports.addr_port && self.selected < NUM_REGISTERS {
            self.registers[self.selected]
        } else {
            0xFF
        }
    }

    fn settle(&mut self) {}

    fn delay_ms(&mut self, _ms: u16) {}

    fn irq_disable(&mut self) {
        self.irq_enabled = false;
    }

    fn irq_enable(&mut self) {
        self.irq_enabled = true;
    }
}
