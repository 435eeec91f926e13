//! Single-instruction tests for the MC6800.
//!
//! Each case in `tests/data/instructions.json` sets up registers and RAM,
//! runs exactly one instruction and compares registers, RAM and the number
//! of clocks taken.

use emu_core::{Bus, Pins};
use motorola_6800::{Mc6800, Status};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Flat 64KB RAM bus for testing.
struct TestBus {
    ram: Vec<u8>,
}

impl TestBus {
    fn new() -> Self {
        Self {
            ram: vec![0; 0x10000],
        }
    }

    fn load_ram(&mut self, entries: &[(u16, u8)]) {
        for &(addr, value) in entries {
            self.ram[addr as usize] = value;
        }
    }

    fn peek(&self, addr: u16) -> u8 {
        self.ram[addr as usize]
    }
}

impl Bus for TestBus {
    fn read(&mut self, addr: u16) -> u8 {
        self.ram[addr as usize]
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.ram[addr as usize] = value;
    }
}

#[derive(Deserialize)]
struct TestCase {
    name: String,
    initial: CpuState,
    #[serde(rename = "final")]
    final_state: CpuState,
    cycles: u32,
}

#[derive(Deserialize)]
struct CpuState {
    pc: u16,
    sp: u16,
    a: u8,
    b: u8,
    x: u16,
    cc: u8,
    ram: Vec<(u16, u8)>,
}

fn setup(cpu: &mut Mc6800, bus: &mut TestBus, state: &CpuState) -> Pins {
    bus.load_ram(&state.ram);
    cpu.regs.sp = state.sp;
    cpu.regs.a = state.a;
    cpu.regs.b = state.b;
    cpu.regs.x = state.x;
    cpu.regs.cc = Status::from_byte(state.cc);
    let mut pins = cpu.prefetch(state.pc);
    pins.set_data(bus.read(state.pc));
    pins
}

fn compare(cpu: &Mc6800, bus: &TestBus, expected: &CpuState) -> Vec<String> {
    let mut errors = Vec::new();
    let r = &cpu.regs;

    if r.pc != expected.pc {
        errors.push(format!("PC: got ${:04X}, want ${:04X}", r.pc, expected.pc));
    }
    if r.sp != expected.sp {
        errors.push(format!("SP: got ${:04X}, want ${:04X}", r.sp, expected.sp));
    }
    if r.a != expected.a {
        errors.push(format!("A: got ${:02X}, want ${:02X}", r.a, expected.a));
    }
    if r.b != expected.b {
        errors.push(format!("B: got ${:02X}, want ${:02X}", r.b, expected.b));
    }
    if r.x != expected.x {
        errors.push(format!("X: got ${:04X}, want ${:04X}", r.x, expected.x));
    }
    if r.cc.0 != expected.cc {
        errors.push(format!(
            "CC: got ${:02X} ({:08b}), want ${:02X} ({:08b})",
            r.cc.0, r.cc.0, expected.cc, expected.cc
        ));
    }
    for &(addr, want) in &expected.ram {
        let got = bus.peek(addr);
        if got != want {
            errors.push(format!("RAM[${addr:04X}]: got ${got:02X}, want ${want:02X}"));
        }
    }
    errors
}

#[test]
fn run_all() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/instructions.json");
    let data = fs::read_to_string(&path).unwrap_or_else(|e| {
        panic!("Failed to read {}: {e}", path.display());
    });
    let tests: Vec<TestCase> = serde_json::from_str(&data).unwrap_or_else(|e| {
        panic!("Failed to parse {}: {e}", path.display());
    });

    let mut failures = Vec::new();
    for test in &tests {
        let mut cpu = Mc6800::new();
        let mut bus = TestBus::new();
        let mut pins = setup(&mut cpu, &mut bus, &test.initial);

        let mut ticks = 0;
        loop {
            pins = cpu.tick_with_bus(pins, &mut bus);
            ticks += 1;
            if cpu.at_instruction_boundary() || ticks > 64 {
                break;
            }
        }

        let mut errors = compare(&cpu, &bus, &test.final_state);
        if ticks != test.cycles {
            errors.push(format!("cycles: got {ticks}, want {}", test.cycles));
        }
        if pins.addr() != cpu.regs.pc {
            errors.push(format!(
                "next fetch at ${:04X}, PC is ${:04X}",
                pins.addr(),
                cpu.regs.pc
            ));
        }
        if !errors.is_empty() {
            failures.push(format!("{}: {}", test.name, errors.join("; ")));
        }
    }

    eprintln!("{} instruction tests, {} failed", tests.len(), failures.len());
    assert!(failures.is_empty(), "\n{}", failures.join("\n"));
}
