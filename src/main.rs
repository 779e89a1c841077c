//! Interactive console for the PSG MIDI synthesizer.
//!
//! Host-side build: the chip driver runs against the simulated RC2014
//! card, so every command exercises the real register write paths without
//! hardware attached. On target hardware the same loop runs with a UART
//! byte source and a port I/O bus.

use std::io::{self, BufRead, Write};

use anyhow::Result;

use psgsynth::bus::{shared, SharedBus, SimBus};
use psgsynth::chip::ChipId;
use psgsynth::{
    BufferSource, ChipManager, PortConfig, Synthesizer, Ym2149Driver,
};

const CONFIG_FILE: &str = "ports.json";

/// Short MIDI demo: a C major chord built up over running status, a CC
/// volume edit, a pitch bend sweep, then everything released.
#[rustfmt::skip]
const DEMO_STREAM: &[u8] = &[
    0x90, 0x3C, 0x64,       // Note On ch0, C4
    0x3E, 0x50,             // running status: D4
    0x40, 0x46,             // running status: E4
    0xB0, 0x01, 0x7F,       // CC#1 volume full
    0xE0, 0x00, 0x50,       // bend up
    0xE0, 0x00, 0x40,       // bend back to center
    0x80, 0x3C, 0x00,       // Note Off C4
    0x90, 0x3E, 0x00,       // Note On vel 0 == Note Off D4
    0x80, 0x40, 0x00,       // Note Off E4
];

fn print_help() {
    println!("Commands:");
    println!("  h  this help");
    println!("  s  status (chips, voices, CC values)");
    println!("  p  panic - all notes off");
    println!("  1  select YM2149");
    println!("  2  select OPL3 (not implemented)");
    println!("  t  audio self-test (tones, scale, arpeggio)");
    println!("  d  feed a demo MIDI stream");
    println!("  i  show I/O ports");
    println!("  r  reload port configuration");
    println!("  q  quit");
}

fn run_audio_test(bus: &SharedBus, ports: PortConfig, synth: &mut Synthesizer) {
    // Diagnostics poke the chip directly, bypassing voice bookkeeping;
    // re-init the active chip afterwards so the pool matches the hardware.
    let mut driver = Ym2149Driver::new(bus.clone(), ports);
    driver.play_test_sequence();
    driver.play_scale();
    driver.play_arpeggio();

    if synth.manager_mut().set_chip(ChipId::Ym2149).is_err() {
        println!("warning: could not re-init YM2149 after test");
    }
}

fn main() -> Result<()> {
    println!("=== RC2014 Multi-Chip MIDI Synthesizer ===");

    let mut ports = PortConfig::load_or_default(CONFIG_FILE);
    let bus = shared(SimBus::new(ports));

    let mut manager = ChipManager::new();
    manager.register(Box::new(Ym2149Driver::new(bus.clone(), ports)));

    let mut synth = Synthesizer::new(manager);
    synth.init();

    println!("{}", synth.status_report());
    println!("Type 'h' for help.\n");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("Synth> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;

        match line.trim().chars().next() {
            Some('h') | Some('H') => print_help(),

            Some('s') | Some('S') => print!("{}", synth.status_report()),

            Some('p') | Some('P') => {
                synth.panic();
                println!("All notes off.");
            }

            Some('1') => match synth.manager_mut().set_chip(ChipId::Ym2149) {
                Ok(()) => println!("YM2149 selected."),
                Err(err) => println!("Failed to select YM2149: {err}"),
            },

            Some('2') => match synth.manager_mut().set_chip(ChipId::Opl3) {
                Ok(()) => println!("OPL3 selected."),
                Err(err) => println!("Failed to select OPL3: {err}"),
            },

            Some('t') | Some('T') => {
                println!("Running audio self-test...");
                run_audio_test(&bus, ports, &mut synth);
                println!("Self-test complete.");
            }

            Some('d') | Some('D') => {
                println!("Feeding demo MIDI stream...");
                let mut source = BufferSource::new(DEMO_STREAM);
                synth.process_input(&mut source);
                print!("{}", synth.status_report());
            }

            Some('i') | Some('I') => {
                println!("Register port: 0x{:02X}", ports.addr_port);
                println!("Data port:     0x{:02X}", ports.data_port);
            }

            Some('r') | Some('R') => match PortConfig::load_from_file(CONFIG_FILE) {
                Ok(loaded) => match synth.manager_mut().reload_ports(loaded) {
                    Ok(()) => {
                        ports = loaded;
                        println!(
                            "Ports reloaded: addr=0x{:02X} data=0x{:02X}",
                            ports.addr_port, ports.data_port
                        );
                    }
                    Err(err) => println!("Reload rejected: {err}"),
                },
                Err(err) => println!("Could not load {CONFIG_FILE}: {err}"),
            },

            Some('q') | Some('Q') | Some('0') => {
                synth.panic();
                println!("Bye.");
                break;
            }

            None => {}

            Some(other) => println!("Unknown command '{other}'. Type 'h' for help."),
        }
    }

    Ok(())
}
