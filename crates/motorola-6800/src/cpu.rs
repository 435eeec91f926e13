//! MC6800 CPU implementation.
//!
//! Every `tick()` is one clock. The instruction register holds the opcode in
//! its upper bits and the step within the instruction in the low nibble, so
//! the decoder dispatches on `(opcode, step)`.
//!
//! A read issued by step N (address on the pins, R/W high, VMA high) is
//! answered by the caller before the next tick, so step N+1 sees the byte on
//! the data bus. The last step of every instruction puts PC on the address
//! bus; the byte that comes back is the next opcode.
//!
//! Interrupts and reset are funnelled through the SWI sequence: when one is
//! pending at an opcode fetch, the fetched byte is replaced by SWI and the
//! sequence picks the vector.

use emu_core::{Bus, Cpu, Observable, Pins, Value};

use crate::alu::{self, AluOp, Unary};
use crate::flags::{C, H, I, N, V, Z};
use crate::pins::{HALT, IRQ, NMI, RESET, RW, VMA};
use crate::{Registers, Status};

pub const VECTOR_IRQ: u16 = 0xFFF8;
pub const VECTOR_SWI: u16 = 0xFFFA;
pub const VECTOR_NMI: u16 = 0xFFFC;
pub const VECTOR_RESET: u16 = 0xFFFE;

const OP_SWI: u8 = 0x3F;

/// A sampled request enters the pip registers here.
const PIP_SAMPLE: u16 = 0x100;

/// IRQ must have been sampled at least two ticks before the fetch.
const IRQ_THRESHOLD: u16 = 0x400;

/// Same for NMI; the upper bits keep a request alive until the next fetch.
const NMI_THRESHOLD: u16 = 0xFC00;

/// Older samples survive a fetch so they can still mature.
const PIP_KEEP: u16 = 0x3FF;

const BRK_IRQ: u8 = 0x01;
const BRK_NMI: u8 = 0x02;
const BRK_RESET: u8 = 0x04;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Immediate,
    Direct,
    Indexed,
    Extended,
}

impl Mode {
    /// Bits 4-5 of an accumulator-group opcode.
    const fn from_opcode(opcode: u8) -> Self {
        match (opcode >> 4) & 0x03 {
            0 => Self::Immediate,
            1 => Self::Direct,
            2 => Self::Indexed,
            _ => Self::Extended,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Acc {
    A,
    B,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reg16 {
    X,
    Sp,
}

/// The Motorola MC6800.
#[derive(Debug)]
pub struct Mc6800 {
    pub regs: Registers,

    /// Opcode << 4 | step.
    ir: u16,

    /// Effective address and 16-bit operand latch.
    ad: u16,

    /// Result held between the compute and write cycles of a read-modify-write.
    alu: u8,

    /// Pins as returned by the previous tick.
    pins: Pins,

    /// Shift registers delaying IRQ and NMI until they count as stable.
    irq_pip: u16,
    nmi_pip: u16,

    /// Requests promoted at the last fetch and not yet serviced.
    brk_flags: u8,

    /// The byte on the data bus at the next tick is an opcode.
    next_instr: bool,

    halted: bool,
    total_cycles: u64,
}

impl Default for Mc6800 {
    fn default() -> Self {
        Self::new()
    }
}

impl Mc6800 {
    #[must_use]
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            ir: 0,
            ad: 0,
            alu: 0,
            pins: Pins::new(RW | RESET | VMA),
            irq_pip: 0,
            nmi_pip: 0,
            brk_flags: 0,
            next_instr: true,
            halted: false,
            total_cycles: 0,
        }
    }

    /// Power-on pins: a read of address 0 with RESET asserted. The reset
    /// sequence runs from the first tick.
    #[must_use]
    pub const fn initial_pins() -> Pins {
        Pins::make(RW | RESET | VMA, 0, 0)
    }

    /// Skip the reset sequence and start executing at `pc`. Returns the pins
    /// for the opcode read the caller must answer before the first tick.
    pub fn prefetch(&mut self, pc: u16) -> Pins {
        self.regs.pc = pc;
        self.next_instr = true;
        self.brk_flags = 0;
        self.pins = Pins::make(RW | VMA, pc, 0);
        self.pins
    }

    /// True when the next tick loads an opcode.
    #[must_use]
    pub const fn at_instruction_boundary(&self) -> bool {
        self.next_instr
    }

    /// Opcode currently executing.
    #[must_use]
    pub const fn opcode(&self) -> u8 {
        (self.ir >> 4) as u8
    }

    /// Step the next tick will execute within the current opcode.
    #[must_use]
    pub const fn step(&self) -> u8 {
        (self.ir & 0x0F) as u8
    }

    #[must_use]
    pub const fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    /// Advance one clock.
    pub fn tick(&mut self, mut pins: Pins) -> Pins {
        if pins.any(IRQ | NMI | HALT | RESET) {
            if pins.rising(self.pins) & NMI != 0 {
                self.nmi_pip |= PIP_SAMPLE;
            }
            if pins.any(IRQ) && !self.regs.cc.is_set(I) {
                self.irq_pip |= PIP_SAMPLE;
            }
            if pins.any(HALT) {
                self.halted = true;
                self.pins = pins;
                self.irq_pip <<= 1;
                return pins;
            }
        }
        self.halted = false;

        if self.next_instr {
            self.next_instr = false;
            self.ir = u16::from(pins.data()) << 4;
            if self.irq_pip & IRQ_THRESHOLD != 0 {
                self.brk_flags |= BRK_IRQ;
            }
            if self.nmi_pip & NMI_THRESHOLD != 0 {
                self.brk_flags |= BRK_NMI;
            }
            if pins.any(RESET) {
                self.brk_flags |= BRK_RESET;
            }
            self.irq_pip &= PIP_KEEP;
            self.nmi_pip &= PIP_KEEP;

            if self.brk_flags == 0 {
                self.regs.pc = self.regs.pc.wrapping_add(1);
            } else {
                log::trace!(
                    "mc6800: break {:#04X} replaces opcode {:#04X} at {:#06X}",
                    self.brk_flags,
                    pins.data(),
                    self.regs.pc
                );
                self.ir = u16::from(OP_SWI) << 4;
                pins.clear(RESET);
            }
        }

        pins.set(RW | VMA);
        let opcode = self.opcode();
        let step = self.step();
        self.ir = self.ir.wrapping_add(1);
        self.execute(opcode, step, &mut pins);

        self.pins = pins;
        self.irq_pip <<= 1;
        self.nmi_pip = (self.nmi_pip << 1) | (self.nmi_pip & 0x8000);
        self.total_cycles += 1;
        pins
    }

    /// Tick once and answer the resulting bus cycle from `bus`.
    ///
    /// Convenience for tests and flat-memory hosts; a system with
    /// memory-mapped peripherals decodes the pins itself.
    pub fn tick_with_bus<B: Bus>(&mut self, pins: Pins, bus: &mut B) -> Pins {
        let mut pins = self.tick(pins);
        if pins.any(VMA) {
            if pins.any(RW) {
                pins.set_data(bus.read(pins.addr()));
            } else {
                bus.write(pins.addr(), pins.data());
            }
        }
        pins
    }

    // ========================================================================
    // Decode
    // ========================================================================

    fn execute(&mut self, opcode: u8, step: u8, pins: &mut Pins) {
        match opcode {
            // NOP
            0x01 => self.inherent(step, pins, |_| {}),

            // TAP, TPA
            0x06 => self.inherent(step, pins, |cpu| {
                cpu.regs.cc = Status::from_byte(cpu.regs.a);
            }),
            0x07 => self.inherent(step, pins, |cpu| cpu.regs.a = cpu.regs.cc.0),

            // INX, DEX - 4 cycles
            0x08 => self.internal(step, pins, |cpu| {
                cpu.regs.x = cpu.regs.x.wrapping_add(1);
                cpu.regs.cc.set_if(Z, cpu.regs.x == 0);
            }),
            0x09 => self.internal(step, pins, |cpu| {
                cpu.regs.x = cpu.regs.x.wrapping_sub(1);
                cpu.regs.cc.set_if(Z, cpu.regs.x == 0);
            }),

            // CLV SEV CLC SEC CLI SEI
            0x0A => self.inherent(step, pins, |cpu| cpu.regs.cc.clear(V)),
            0x0B => self.inherent(step, pins, |cpu| cpu.regs.cc.set(V)),
            0x0C => self.inherent(step, pins, |cpu| cpu.regs.cc.clear(C)),
            0x0D => self.inherent(step, pins, |cpu| cpu.regs.cc.set(C)),
            0x0E => self.inherent(step, pins, |cpu| cpu.regs.cc.clear(I)),
            0x0F => self.inherent(step, pins, |cpu| cpu.regs.cc.set(I)),

            // SBA, CBA
            0x10 => self.inherent(step, pins, |cpu| {
                cpu.regs.a = alu::sub(&mut cpu.regs.cc, cpu.regs.a, cpu.regs.b, false);
            }),
            0x11 => self.inherent(step, pins, |cpu| {
                alu::sub(&mut cpu.regs.cc, cpu.regs.a, cpu.regs.b, false);
            }),

            // TAB, TBA
            0x16 => self.inherent(step, pins, |cpu| {
                cpu.regs.b = alu::logic(&mut cpu.regs.cc, cpu.regs.a);
            }),
            0x17 => self.inherent(step, pins, |cpu| {
                cpu.regs.a = alu::logic(&mut cpu.regs.cc, cpu.regs.b);
            }),

            // DAA
            0x19 => self.inherent(step, pins, |cpu| {
                cpu.regs.a = alu::daa(&mut cpu.regs.cc, cpu.regs.a);
            }),

            // ABA
            0x1B => self.inherent(step, pins, |cpu| {
                cpu.regs.a = alu::add(&mut cpu.regs.cc, cpu.regs.a, cpu.regs.b, false);
            }),

            // Bcc rel - 4 cycles
            0x20 | 0x22..=0x2F => self.branch(step, pins, opcode),

            // TSX, INS, DES, TXS - 4 cycles
            0x30 => self.internal(step, pins, |cpu| cpu.regs.x = cpu.regs.sp.wrapping_add(1)),
            0x31 => self.internal(step, pins, |cpu| cpu.regs.sp = cpu.regs.sp.wrapping_add(1)),
            0x34 => self.internal(step, pins, |cpu| cpu.regs.sp = cpu.regs.sp.wrapping_sub(1)),
            0x35 => self.internal(step, pins, |cpu| cpu.regs.sp = cpu.regs.x.wrapping_sub(1)),

            // PULA, PULB, PSHA, PSHB - 4 cycles
            0x32 => self.pull(step, pins, Acc::A),
            0x33 => self.pull(step, pins, Acc::B),
            0x36 => self.push_acc(step, pins, Acc::A),
            0x37 => self.push_acc(step, pins, Acc::B),

            // RTS - 5 cycles
            0x39 => self.op_rts(step, pins),

            // RTI - 10 cycles
            0x3B => self.op_rti(step, pins),

            // WAI - 9 cycles, then waits
            0x3E => self.interrupt_sequence(step, pins, true),

            // SWI, IRQ, NMI, RESET - 12 cycles
            0x3F => self.interrupt_sequence(step, pins, false),

            // NEG..CLR, JMP
            0x40..=0x7F => self.unary_group(opcode, step, pins),

            // BSR - 8 cycles
            0x8D => self.op_jsr(step, pins, Mode::Immediate),

            // JSR idx - 8 cycles, JSR ext - 9 cycles
            0xAD => self.op_jsr(step, pins, Mode::Indexed),
            0xBD => self.op_jsr(step, pins, Mode::Extended),

            // CPX
            0x8C | 0x9C | 0xAC | 0xBC => {
                self.read16(Mode::from_opcode(opcode), step, pins, |cpu, value| {
                    alu::compare16(&mut cpu.regs.cc, cpu.regs.x, value);
                });
            }

            // LDS
            0x8E | 0x9E | 0xAE | 0xBE => {
                self.read16(Mode::from_opcode(opcode), step, pins, |cpu, value| {
                    cpu.regs.sp = alu::logic16(&mut cpu.regs.cc, value);
                });
            }

            // LDX
            0xCE | 0xDE | 0xEE | 0xFE => {
                self.read16(Mode::from_opcode(opcode), step, pins, |cpu, value| {
                    cpu.regs.x = alu::logic16(&mut cpu.regs.cc, value);
                });
            }

            // STS, STX
            0x9F | 0xAF | 0xBF => self.write16(Mode::from_opcode(opcode), step, pins, Reg16::Sp),
            0xDF | 0xEF | 0xFF => self.write16(Mode::from_opcode(opcode), step, pins, Reg16::X),

            // SUB CMP SBC AND BIT LDA STA EOR ADC ORA ADD, A and B
            0x80..=0xFF => self.accumulator_group(opcode, step, pins),

            // Undefined opcodes behave as a two-cycle NOP.
            _ => self.inherent(step, pins, |_| {}),
        }
    }

    fn unary_group(&mut self, opcode: u8, step: u8, pins: &mut Pins) {
        match (opcode, Unary::from_nibble(opcode)) {
            (0x6E, _) => self.jmp(step, pins, Mode::Indexed),
            (0x7E, _) => self.jmp(step, pins, Mode::Extended),
            (0x40..=0x4F, Some(op)) => self.inherent(step, pins, |cpu| {
                cpu.regs.a = alu::unary(&mut cpu.regs.cc, op, cpu.regs.a);
            }),
            (0x50..=0x5F, Some(op)) => self.inherent(step, pins, |cpu| {
                cpu.regs.b = alu::unary(&mut cpu.regs.cc, op, cpu.regs.b);
            }),
            (0x60..=0x6F, Some(op)) => self.read_modify_write(Mode::Indexed, step, pins, op),
            (0x70..=0x7F, Some(op)) => self.read_modify_write(Mode::Extended, step, pins, op),
            _ => self.inherent(step, pins, |_| {}),
        }
    }

    fn accumulator_group(&mut self, opcode: u8, step: u8, pins: &mut Pins) {
        let acc = if opcode & 0x40 == 0 { Acc::A } else { Acc::B };
        let mode = Mode::from_opcode(opcode);

        if let Some(op) = AluOp::from_nibble(opcode) {
            self.read8(mode, step, pins, |cpu, value| {
                let current = cpu.acc(acc);
                let r = alu::accumulate(&mut cpu.regs.cc, op, current, value);
                cpu.set_acc(acc, r);
            });
        } else if opcode & 0x0F == 0x07 && mode != Mode::Immediate {
            // STA
            self.write8(mode, step, pins, |cpu| {
                let value = cpu.acc(acc);
                alu::logic(&mut cpu.regs.cc, value)
            });
        } else {
            self.inherent(step, pins, |_| {});
        }
    }

    const fn acc(&self, acc: Acc) -> u8 {
        match acc {
            Acc::A => self.regs.a,
            Acc::B => self.regs.b,
        }
    }

    fn set_acc(&mut self, acc: Acc, value: u8) {
        match acc {
            Acc::A => self.regs.a = value,
            Acc::B => self.regs.b = value,
        }
    }

    const fn reg16(&self, reg: Reg16) -> u16 {
        match reg {
            Reg16::X => self.regs.x,
            Reg16::Sp => self.regs.sp,
        }
    }

    /// Branch condition for opcodes `0x20`-`0x2F`.
    fn condition(&self, opcode: u8) -> bool {
        let cc = self.regs.cc;
        let n_xor_v = cc.is_set(N) != cc.is_set(V);
        match opcode & 0x0F {
            0x0 => true,
            0x2 => !cc.is_set(C) && !cc.is_set(Z),
            0x3 => cc.is_set(C) || cc.is_set(Z),
            0x4 => !cc.is_set(C),
            0x5 => cc.is_set(C),
            0x6 => !cc.is_set(Z),
            0x7 => cc.is_set(Z),
            0x8 => !cc.is_set(V),
            0x9 => cc.is_set(V),
            0xA => !cc.is_set(N),
            0xB => cc.is_set(N),
            0xC => !n_xor_v,
            0xD => n_xor_v,
            0xE => !cc.is_set(Z) && !n_xor_v,
            0xF => cc.is_set(Z) || n_xor_v,
            _ => false,
        }
    }

    // ========================================================================
    // Bus cycle primitives
    // ========================================================================

    /// Read the next program byte.
    fn operand(&mut self, pins: &mut Pins) {
        pins.set_addr(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
    }

    /// Last step of every instruction: read the next opcode.
    fn fetch(&mut self, pins: &mut Pins) {
        pins.set_addr(self.regs.pc);
        self.next_instr = true;
    }

    fn write(pins: &mut Pins, addr: u16, value: u8) {
        pins.set_addr(addr);
        pins.set_data(value);
        pins.clear(RW);
    }

    fn push(&mut self, pins: &mut Pins, value: u8) {
        Self::write(pins, self.regs.sp, value);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
    }

    /// Pre-increment SP and read from it.
    fn pull_addr(&mut self, pins: &mut Pins) {
        self.regs.sp = self.regs.sp.wrapping_add(1);
        pins.set_addr(self.regs.sp);
    }

    /// First step of the indexed modes: add the offset, no bus access.
    fn index(&mut self, pins: &mut Pins) {
        self.ad = self.regs.x.wrapping_add(u16::from(pins.data()));
        pins.clear(VMA);
    }

    // ========================================================================
    // Addressing mode helpers
    // ========================================================================

    /// Register-only instruction, 2 cycles.
    fn inherent(&mut self, step: u8, pins: &mut Pins, op: impl FnOnce(&mut Self)) {
        match step {
            0 => {
                op(self);
                pins.clear(VMA);
            }
            1 => self.fetch(pins),
            _ => unreachable!(),
        }
    }

    /// 16-bit register instruction, 4 cycles.
    fn internal(&mut self, step: u8, pins: &mut Pins, op: impl FnOnce(&mut Self)) {
        match step {
            0 => {
                op(self);
                pins.clear(VMA);
            }
            1 | 2 => pins.clear(VMA),
            3 => self.fetch(pins),
            _ => unreachable!(),
        }
    }

    /// 8-bit read operand. Immediate 2, direct 3, extended 4, indexed 5 cycles.
    fn read8(&mut self, mode: Mode, step: u8, pins: &mut Pins, op: impl FnOnce(&mut Self, u8)) {
        match (mode, step) {
            (_, 0) => self.operand(pins),
            (Mode::Immediate, 1) | (Mode::Direct, 2) | (Mode::Extended, 3) | (Mode::Indexed, 4) => {
                op(self, pins.data());
                self.fetch(pins);
            }
            (Mode::Direct, 1) => pins.set_addr(u16::from(pins.data())),
            (Mode::Extended, 1) => {
                self.ad = u16::from(pins.data()) << 8;
                self.operand(pins);
            }
            (Mode::Extended, 2) => pins.set_addr(self.ad | u16::from(pins.data())),
            (Mode::Indexed, 1) => self.index(pins),
            (Mode::Indexed, 2) => pins.clear(VMA),
            (Mode::Indexed, 3) => pins.set_addr(self.ad),
            _ => unreachable!(),
        }
    }

    /// 8-bit store. Direct 4, extended 5, indexed 6 cycles.
    fn write8(&mut self, mode: Mode, step: u8, pins: &mut Pins, value: impl FnOnce(&mut Self) -> u8) {
        match (mode, step) {
            (_, 0) => self.operand(pins),
            (Mode::Direct, 1) => {
                self.ad = u16::from(pins.data());
                pins.clear(VMA);
            }
            (Mode::Extended, 1) => {
                self.ad = u16::from(pins.data()) << 8;
                self.operand(pins);
            }
            (Mode::Extended, 2) => {
                self.ad |= u16::from(pins.data());
                pins.clear(VMA);
            }
            (Mode::Indexed, 1) => self.index(pins),
            (Mode::Indexed, 2 | 3) => pins.clear(VMA),
            (Mode::Direct, 2) | (Mode::Extended, 3) | (Mode::Indexed, 4) => {
                let v = value(self);
                Self::write(pins, self.ad, v);
            }
            (Mode::Direct, 3) | (Mode::Extended, 4) | (Mode::Indexed, 5) => self.fetch(pins),
            _ => unreachable!(),
        }
    }

    /// 16-bit read operand, big-endian. Immediate 3, direct 4, extended 5,
    /// indexed 6 cycles.
    fn read16(&mut self, mode: Mode, step: u8, pins: &mut Pins, op: impl FnOnce(&mut Self, u16)) {
        match (mode, step) {
            (_, 0) => self.operand(pins),
            (Mode::Immediate | Mode::Extended, 1) => {
                self.ad = u16::from(pins.data()) << 8;
                self.operand(pins);
            }
            (Mode::Immediate, 2) | (Mode::Direct, 3) | (Mode::Extended, 4) | (Mode::Indexed, 5) => {
                op(self, self.ad | u16::from(pins.data()));
                self.fetch(pins);
            }
            (Mode::Direct, 1) => pins.set_addr(u16::from(pins.data())),
            (Mode::Extended, 2) => pins.set_addr(self.ad | u16::from(pins.data())),
            (Mode::Indexed, 1) => self.index(pins),
            (Mode::Indexed, 2) => pins.clear(VMA),
            (Mode::Indexed, 3) => pins.set_addr(self.ad),
            (Mode::Direct, 2) | (Mode::Extended, 3) | (Mode::Indexed, 4) => {
                // High byte in hand, read the low byte from the next address.
                self.ad = u16::from(pins.data()) << 8;
                let next = pins.addr().wrapping_add(1);
                pins.set_addr(next);
            }
            _ => unreachable!(),
        }
    }

    /// 16-bit store (STS, STX). Direct 5, extended 6, indexed 7 cycles.
    fn write16(&mut self, mode: Mode, step: u8, pins: &mut Pins, reg: Reg16) {
        match (mode, step) {
            (_, 0) => self.operand(pins),
            (Mode::Direct, 1) => {
                self.ad = u16::from(pins.data());
                pins.clear(VMA);
            }
            (Mode::Extended, 1) => {
                self.ad = u16::from(pins.data()) << 8;
                self.operand(pins);
            }
            (Mode::Extended, 2) => {
                self.ad |= u16::from(pins.data());
                pins.clear(VMA);
            }
            (Mode::Indexed, 1) => self.index(pins),
            (Mode::Indexed, 2 | 3) => pins.clear(VMA),
            (Mode::Direct, 2) | (Mode::Extended, 3) | (Mode::Indexed, 4) => {
                let value = self.reg16(reg);
                alu::logic16(&mut self.regs.cc, value);
                Self::write(pins, self.ad, (value >> 8) as u8);
            }
            (Mode::Direct, 3) | (Mode::Extended, 4) | (Mode::Indexed, 5) => {
                let value = self.reg16(reg);
                Self::write(pins, self.ad.wrapping_add(1), value as u8);
            }
            (Mode::Direct, 4) | (Mode::Extended, 5) | (Mode::Indexed, 6) => self.fetch(pins),
            _ => unreachable!(),
        }
    }

    /// Memory read-modify-write. Extended 6, indexed 7 cycles. TST keeps the
    /// cycle count but does not write.
    fn read_modify_write(&mut self, mode: Mode, step: u8, pins: &mut Pins, op: Unary) {
        match (mode, step) {
            (_, 0) => self.operand(pins),
            (Mode::Extended, 1) => {
                self.ad = u16::from(pins.data()) << 8;
                self.operand(pins);
            }
            (Mode::Extended, 2) => {
                self.ad |= u16::from(pins.data());
                pins.set_addr(self.ad);
            }
            (Mode::Indexed, 1) => self.index(pins),
            (Mode::Indexed, 2) => pins.clear(VMA),
            (Mode::Indexed, 3) => pins.set_addr(self.ad),
            (Mode::Extended, 3) | (Mode::Indexed, 4) => {
                self.alu = alu::unary(&mut self.regs.cc, op, pins.data());
                pins.clear(VMA);
            }
            (Mode::Extended, 4) | (Mode::Indexed, 5) => {
                if op.writes_back() {
                    Self::write(pins, self.ad, self.alu);
                } else {
                    pins.clear(VMA);
                }
            }
            (Mode::Extended, 5) | (Mode::Indexed, 6) => self.fetch(pins),
            _ => unreachable!(),
        }
    }

    // ========================================================================
    // Control flow
    // ========================================================================

    /// Relative branch, 4 cycles taken or not.
    fn branch(&mut self, step: u8, pins: &mut Pins, opcode: u8) {
        match step {
            0 => self.operand(pins),
            1 => {
                let offset = pins.data() as i8;
                self.ad = if self.condition(opcode) {
                    self.regs.pc.wrapping_add_signed(i16::from(offset))
                } else {
                    self.regs.pc
                };
                pins.clear(VMA);
            }
            2 => {
                self.regs.pc = self.ad;
                pins.clear(VMA);
            }
            3 => self.fetch(pins),
            _ => unreachable!(),
        }
    }

    /// JMP. Indexed 4, extended 3 cycles.
    fn jmp(&mut self, step: u8, pins: &mut Pins, mode: Mode) {
        match (mode, step) {
            (_, 0) => self.operand(pins),
            (Mode::Extended, 1) => {
                self.ad = u16::from(pins.data()) << 8;
                self.operand(pins);
            }
            (Mode::Extended, 2) => {
                self.regs.pc = self.ad | u16::from(pins.data());
                self.fetch(pins);
            }
            (Mode::Indexed, 1) => self.index(pins),
            (Mode::Indexed, 2) => pins.clear(VMA),
            (Mode::Indexed, 3) => {
                self.regs.pc = self.ad;
                self.fetch(pins);
            }
            _ => unreachable!(),
        }
    }

    /// BSR (passed as `Immediate`, the operand being a relative offset) and
    /// JSR. BSR 8, indexed 8, extended 9 cycles.
    fn op_jsr(&mut self, step: u8, pins: &mut Pins, mode: Mode) {
        match (mode, step) {
            (_, 0) => self.operand(pins),
            (Mode::Immediate, 1) => {
                let offset = pins.data() as i8;
                self.ad = self.regs.pc.wrapping_add_signed(i16::from(offset));
                pins.clear(VMA);
            }
            (Mode::Indexed, 1) => self.index(pins),
            (Mode::Extended, 1) => {
                self.ad = u16::from(pins.data()) << 8;
                self.operand(pins);
            }
            (Mode::Extended, 2) => {
                self.ad |= u16::from(pins.data());
                pins.clear(VMA);
            }
            (Mode::Extended, _) => self.call(step - 1, pins),
            _ => self.call(step, pins),
        }
    }

    /// Shared tail of BSR and JSR once the target is in `ad`.
    fn call(&mut self, step: u8, pins: &mut Pins) {
        match step {
            2 => self.push(pins, self.regs.pc as u8),
            3 => self.push(pins, (self.regs.pc >> 8) as u8),
            4 | 5 => pins.clear(VMA),
            6 => {
                self.regs.pc = self.ad;
                pins.clear(VMA);
            }
            7 => self.fetch(pins),
            _ => unreachable!(),
        }
    }

    /// RTS, 5 cycles.
    fn op_rts(&mut self, step: u8, pins: &mut Pins) {
        match step {
            0 => pins.clear(VMA),
            1 => self.pull_addr(pins),
            2 => {
                self.ad = u16::from(pins.data()) << 8;
                self.pull_addr(pins);
            }
            3 => {
                self.regs.pc = self.ad | u16::from(pins.data());
                pins.clear(VMA);
            }
            4 => self.fetch(pins),
            _ => unreachable!(),
        }
    }

    /// RTI, 10 cycles. Pulls CC, B, A, X, PC.
    fn op_rti(&mut self, step: u8, pins: &mut Pins) {
        match step {
            0 => pins.clear(VMA),
            1 => self.pull_addr(pins),
            2 => {
                self.regs.cc = Status::from_byte(pins.data());
                self.pull_addr(pins);
            }
            3 => {
                self.regs.b = pins.data();
                self.pull_addr(pins);
            }
            4 => {
                self.regs.a = pins.data();
                self.pull_addr(pins);
            }
            5 | 7 => {
                self.ad = u16::from(pins.data()) << 8;
                self.pull_addr(pins);
            }
            6 => {
                self.regs.x = self.ad | u16::from(pins.data());
                self.pull_addr(pins);
            }
            8 => {
                self.regs.pc = self.ad | u16::from(pins.data());
                pins.clear(VMA);
            }
            9 => self.fetch(pins),
            _ => unreachable!(),
        }
    }

    /// PSHA/PSHB, 4 cycles.
    fn push_acc(&mut self, step: u8, pins: &mut Pins, acc: Acc) {
        match step {
            0 | 2 => pins.clear(VMA),
            1 => self.push(pins, self.acc(acc)),
            3 => self.fetch(pins),
            _ => unreachable!(),
        }
    }

    /// PULA/PULB, 4 cycles.
    fn pull(&mut self, step: u8, pins: &mut Pins, acc: Acc) {
        match step {
            0 => pins.clear(VMA),
            1 => {
                self.regs.sp = self.regs.sp.wrapping_add(1);
                pins.clear(VMA);
            }
            2 => pins.set_addr(self.regs.sp),
            3 => {
                self.set_acc(acc, pins.data());
                self.fetch(pins);
            }
            _ => unreachable!(),
        }
    }

    /// SWI and every hardware interrupt, 12 cycles; WAI shares the stacking
    /// and then idles at step 8 until something is pending.
    ///
    /// Reset runs the same sequence with the stack writes replaced by idle
    /// cycles.
    fn interrupt_sequence(&mut self, step: u8, pins: &mut Pins, wait: bool) {
        match step {
            0 => pins.clear(VMA),
            1..=7 => {
                if self.brk_flags & BRK_RESET != 0 && !wait {
                    pins.clear(VMA);
                    return;
                }
                let value = match step {
                    1 => self.regs.pc as u8,
                    2 => (self.regs.pc >> 8) as u8,
                    3 => self.regs.x as u8,
                    4 => (self.regs.x >> 8) as u8,
                    5 => self.regs.a,
                    6 => self.regs.b,
                    _ => self.regs.cc.0,
                };
                self.push(pins, value);
            }
            8 => {
                pins.clear(VMA);
                if wait && !self.wake() {
                    self.ir = self.ir.wrapping_sub(1);
                    return;
                }
                let (vector, serviced) = if self.brk_flags & BRK_RESET != 0 {
                    (VECTOR_RESET, BRK_RESET)
                } else if self.brk_flags & BRK_NMI != 0 {
                    (VECTOR_NMI, BRK_NMI)
                } else if self.brk_flags & BRK_IRQ != 0 {
                    (VECTOR_IRQ, BRK_IRQ)
                } else {
                    (VECTOR_SWI, 0)
                };
                log::debug!(
                    "mc6800: {} vector ${vector:04X}",
                    match serviced {
                        BRK_RESET => "reset",
                        BRK_NMI => "nmi",
                        BRK_IRQ => "irq",
                        _ => "swi",
                    }
                );
                self.brk_flags &= !serviced;
                self.regs.cc.set(I);
                self.ad = vector;
            }
            9 => pins.set_addr(self.ad),
            10 => {
                self.regs.pc = u16::from(pins.data()) << 8;
                pins.set_addr(self.ad.wrapping_add(1));
            }
            11 => {
                self.regs.pc |= u16::from(pins.data());
                self.fetch(pins);
            }
            _ => unreachable!(),
        }
    }

    /// WAI exit: promote whatever is pending straight to a break flag.
    /// NMI is latched on its edge; IRQ is a level and must be sampled on
    /// this very tick.
    fn wake(&mut self) -> bool {
        if self.nmi_pip != 0 {
            self.brk_flags |= BRK_NMI;
        } else if self.irq_pip & PIP_SAMPLE != 0 {
            self.brk_flags |= BRK_IRQ;
        } else {
            return false;
        }
        self.nmi_pip = 0;
        self.irq_pip = 0;
        true
    }
}

// ============================================================================
// Trait implementations
// ============================================================================

impl Cpu for Mc6800 {
    type Registers = Registers;

    fn tick(&mut self, pins: Pins) -> Pins {
        Mc6800::tick(self, pins)
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn registers(&self) -> Self::Registers {
        self.regs
    }

    fn is_halted(&self) -> bool {
        self.halted
    }

    fn reset(&mut self) -> Pins {
        *self = Self::new();
        Self::initial_pins()
    }
}

impl Observable for Mc6800 {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "pc" => Some(self.regs.pc.into()),
            "a" => Some(self.regs.a.into()),
            "b" => Some(self.regs.b.into()),
            "x" => Some(self.regs.x.into()),
            "sp" => Some(self.regs.sp.into()),
            "cc" => Some(self.regs.cc.0.into()),
            "flags.c" => Some(self.regs.cc.is_set(C).into()),
            "flags.v" => Some(self.regs.cc.is_set(V).into()),
            "flags.z" => Some(self.regs.cc.is_set(Z).into()),
            "flags.n" => Some(self.regs.cc.is_set(N).into()),
            "flags.i" => Some(self.regs.cc.is_set(I).into()),
            "flags.h" => Some(self.regs.cc.is_set(H).into()),
            "opcode" => Some(self.opcode().into()),
            "step" => Some(self.step().into()),
            "cycle" => Some(Value::U64(self.total_cycles)),
            "halted" => Some(self.halted.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "pc", "a", "b", "x", "sp", "cc", "flags.c", "flags.v", "flags.z", "flags.n",
            "flags.i", "flags.h", "opcode", "step", "cycle", "halted",
        ]
    }
}
