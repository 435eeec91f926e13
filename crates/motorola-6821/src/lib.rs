//! Motorola MC6821 Peripheral Interface Adapter (PIA).
//!
//! Two 8-bit I/O ports, each with a data direction register, a control
//! register and two handshake lines (C1 input, C2 input or output). The
//! chip shares the CPU's data bus and R/W line and is selected by CS.
//!
//! # Registers (RS1:RS0)
//!
//! | RS | Name | Description                                      |
//! |----|------|--------------------------------------------------|
//! | 0  | PRA  | Port A pins, or DDRA when CRA bit 2 is clear     |
//! | 1  | CRA  | Control A (read clears the IRQ flags)            |
//! | 2  | PRB  | Port B pins, or DDRB when CRB bit 2 is clear     |
//! | 3  | CRB  | Control B                                        |
//!
//! # Pins
//!
//! | Bits  | Signal                       |
//! |-------|------------------------------|
//! | 0-1   | RS0-RS1 (address bus)        |
//! | 16-23 | D0-D7                        |
//! | 24    | R/W (shared with the CPU)    |
//! | 26    | IRQ out (IRQA or IRQB)       |
//! | 40    | CS                           |
//! | 42-45 | CA1, CA2, CB1, CB2           |
//! | 46-47 | IRQA, IRQB                   |
//! | 48-55 | PA0-PA7                      |
//! | 56-63 | PB0-PB7                      |

use emu_core::{Observable, Pins, Value};

pub const RW: u64 = 1 << 24;
pub const IRQ: u64 = 1 << 26;
pub const CS: u64 = 1 << 40;
pub const CA1: u64 = 1 << 42;
pub const CA2: u64 = 1 << 43;
pub const CB1: u64 = 1 << 44;
pub const CB2: u64 = 1 << 45;
pub const IRQA: u64 = 1 << 46;
pub const IRQB: u64 = 1 << 47;

/// Register select lines (A0-A1).
pub const RS_MASK: u16 = 0x03;

/// Bit position of PA0 and PB0.
pub const PA_SHIFT: u32 = 48;
pub const PB_SHIFT: u32 = 56;

pub const REG_PRA: u8 = 0;
pub const REG_CRA: u8 = 1;
pub const REG_PRB: u8 = 2;
pub const REG_CRB: u8 = 3;

/// Control register bits.
pub mod ctrl {
    /// C1 interrupt enable.
    pub const C1_IRQ: u8 = 0x01;
    /// C1 active edge: set = low-to-high.
    pub const C1_LTOH: u8 = 0x02;
    /// Data register select: set = peripheral data, clear = DDR.
    pub const PR: u8 = 0x04;
    /// C2 interrupt enable (input mode).
    pub const C2_IRQ: u8 = 0x08;
    /// C2 active edge (input mode).
    pub const C2_LTOH: u8 = 0x10;
    /// C2 is an output.
    pub const C2_OUT: u8 = 0x20;
    /// C2 flag. Read only.
    pub const IRQ2: u8 = 0x40;
    /// C1 flag. Read only.
    pub const IRQ1: u8 = 0x80;

    /// C2 level in output/set mode (shares the C2 IRQ bit).
    pub const C2_B3: u8 = C2_IRQ;
    /// C2 set mode (shares the C2 LTOH bit).
    pub const C2_SET: u8 = C2_LTOH;
}

use ctrl::{C1_IRQ, C1_LTOH, C2_B3, C2_IRQ, C2_LTOH, C2_OUT, C2_SET, IRQ1, IRQ2, PR};

/// One side of the PIA.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Port {
    /// Output register.
    pub outr: u8,
    /// Data direction register (1 = output).
    pub ddr: u8,
    /// Port pins as last resolved: inputs where DDR is 0, outputs where 1.
    pub pins: u8,
    /// Control register.
    pub ctrl: u8,
}

impl Port {
    /// Latch a C1/C2 transition into the given flag if it matches the
    /// configured edge.
    fn edge(&mut self, new: bool, old: bool, ltoh: u8, flag: u8) {
        if new != old && new == (self.ctrl & ltoh != 0) {
            self.ctrl |= flag;
        }
    }

    fn detect(&mut self, c1: (bool, bool), c2: (bool, bool)) {
        self.edge(c1.0, c1.1, C1_LTOH, IRQ1);
        if self.ctrl & C2_OUT != 0 {
            self.ctrl &= !IRQ2;
        } else {
            self.edge(c2.0, c2.1, C2_LTOH, IRQ2);
        }
    }

    fn resolve(&mut self, input: u8) {
        self.pins = (input & !self.ddr) | (self.outr & self.ddr);
    }

    const fn irq(&self) -> bool {
        (self.ctrl & IRQ1 != 0 && self.ctrl & C1_IRQ != 0)
            || (self.ctrl & IRQ2 != 0 && self.ctrl & C2_IRQ != 0 && self.ctrl & C2_OUT == 0)
    }

    /// C2 level when the port drives it, `None` in input mode.
    const fn c2_output(&self) -> Option<bool> {
        if self.ctrl & (C2_OUT | C2_SET) == C2_OUT | C2_SET {
            Some(self.ctrl & C2_B3 != 0)
        } else {
            None
        }
    }

    fn read_data(&self) -> u8 {
        if self.ctrl & PR != 0 { self.pins } else { self.ddr }
    }

    fn write_data(&mut self, value: u8) {
        if self.ctrl & PR != 0 {
            self.outr = value;
        } else {
            self.ddr = value;
        }
    }

    fn read_ctrl(&mut self) -> u8 {
        let value = self.ctrl;
        self.ctrl &= !(IRQ1 | IRQ2);
        value
    }

    fn write_ctrl(&mut self, value: u8) {
        // Pulse mode (C2 output, SET clear) is not emulated.
        assert!(
            value & (C2_OUT | C2_SET) != C2_OUT,
            "MC6821: C2 pulse output mode (control {value:#04X}) is not supported"
        );
        self.ctrl = (value & !(IRQ1 | IRQ2)) | (self.ctrl & (IRQ1 | IRQ2));
    }
}

/// Motorola MC6821 PIA.
#[derive(Debug, Clone, Default)]
pub struct Mc6821 {
    pub pa: Port,
    pub pb: Port,
    /// Pins as returned by the previous tick, for edge detection.
    pins: Pins,
}

impl Mc6821 {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero every register.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Advance one clock.
    ///
    /// The caller drives CS, RS, R/W, the data bus on writes, C1/C2 and the
    /// port input levels. The returned pins carry the data bus on selected
    /// reads, the resolved port levels, any C2 the chip drives, and
    /// IRQA/IRQB/IRQ.
    pub fn tick(&mut self, mut pins: Pins) -> Pins {
        let old = self.pins;
        self.pa.detect(
            (pins.any(CA1), old.any(CA1)),
            (pins.any(CA2), old.any(CA2)),
        );
        self.pb.detect(
            (pins.any(CB1), old.any(CB1)),
            (pins.any(CB2), old.any(CB2)),
        );
        self.pa.resolve(pins.byte_at(PA_SHIFT));
        self.pb.resolve(pins.byte_at(PB_SHIFT));

        if pins.any(CS) {
            let reg = (pins.addr() & RS_MASK) as u8;
            if pins.any(RW) {
                pins.set_data(self.read(reg));
            } else {
                self.write(reg, pins.data());
            }
        }

        let irqa = self.pa.irq();
        let irqb = self.pb.irq();
        pins.set_if(IRQA, irqa);
        pins.set_if(IRQB, irqb);
        pins.set_if(IRQ, irqa || irqb);

        // Register writes may have changed the outputs.
        self.pa.resolve(pins.byte_at(PA_SHIFT));
        self.pb.resolve(pins.byte_at(PB_SHIFT));
        pins.set_byte_at(PA_SHIFT, self.pa.pins);
        pins.set_byte_at(PB_SHIFT, self.pb.pins);
        if let Some(level) = self.pa.c2_output() {
            pins.set_if(CA2, level);
        }
        if let Some(level) = self.pb.c2_output() {
            pins.set_if(CB2, level);
        }

        self.pins = pins;
        pins
    }

    fn read(&mut self, reg: u8) -> u8 {
        match reg {
            REG_PRA => self.pa.read_data(),
            REG_CRA => self.pa.read_ctrl(),
            REG_PRB => self.pb.read_data(),
            _ => self.pb.read_ctrl(),
        }
    }

    fn write(&mut self, reg: u8, value: u8) {
        log::trace!("mc6821: write reg {reg} = {value:#04X}");
        match reg {
            REG_PRA => self.pa.write_data(value),
            REG_CRA => self.pa.write_ctrl(value),
            REG_PRB => self.pb.write_data(value),
            _ => self.pb.write_ctrl(value),
        }
    }

    /// True if either side is requesting an interrupt.
    #[must_use]
    pub const fn irq(&self) -> bool {
        self.pa.irq() || self.pb.irq()
    }
}

impl Observable for Mc6821 {
    fn query(&self, path: &str) -> Option<Value> {
        let (port, field) = match path.split_once('.') {
            Some(("pa", field)) => (&self.pa, field),
            Some(("pb", field)) => (&self.pb, field),
            _ => {
                return match path {
                    "irqa" => Some(self.pa.irq().into()),
                    "irqb" => Some(self.pb.irq().into()),
                    "irq" => Some(self.irq().into()),
                    _ => None,
                };
            }
        };
        match field {
            "out" => Some(port.outr.into()),
            "ddr" => Some(port.ddr.into()),
            "pins" => Some(port.pins.into()),
            "ctrl" => Some(port.ctrl.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "pa.out", "pa.ddr", "pa.pins", "pa.ctrl", "pb.out", "pb.ddr", "pb.pins", "pb.ctrl",
            "irqa", "irqb", "irq",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(pia: &mut Mc6821, reg: u8, value: u8) -> Pins {
        pia.tick(Pins::make(CS, u16::from(reg), value))
    }

    fn read(pia: &mut Mc6821, reg: u8) -> u8 {
        pia.tick(Pins::make(CS | RW, u16::from(reg), 0)).data()
    }

    #[test]
    fn ddr_and_data_share_an_address() {
        let mut pia = Mc6821::new();
        write(&mut pia, REG_PRA, 0xF0);
        assert_eq!(pia.pa.ddr, 0xF0);
        assert_eq!(read(&mut pia, REG_PRA), 0xF0);

        write(&mut pia, REG_CRA, PR);
        write(&mut pia, REG_PRA, 0xA5);
        assert_eq!(pia.pa.outr, 0xA5);
        assert_eq!(pia.pa.ddr, 0xF0);
    }

    #[test]
    fn port_pins_mix_inputs_and_outputs() {
        let mut pia = Mc6821::new();
        write(&mut pia, REG_PRB, 0x0F);
        write(&mut pia, REG_CRB, PR);
        write(&mut pia, REG_PRB, 0x05);

        let mut pins = Pins::NONE;
        pins.set_byte_at(PB_SHIFT, 0xA0);
        let out = pia.tick(pins);
        assert_eq!(out.byte_at(PB_SHIFT), 0xA5);
        assert_eq!(read(&mut pia, REG_PRB), 0x05);
    }

    #[test]
    fn ca1_edge_sets_flag_and_irq() {
        let mut pia = Mc6821::new();
        write(&mut pia, REG_CRA, C1_IRQ | C1_LTOH | PR);

        let out = pia.tick(Pins::new(CA1));
        assert!(out.any(IRQA));
        assert!(out.any(IRQ));
        assert!(!out.any(IRQB));
        assert_ne!(pia.pa.ctrl & IRQ1, 0);
    }

    #[test]
    fn wrong_polarity_is_ignored() {
        let mut pia = Mc6821::new();
        write(&mut pia, REG_CRB, C1_IRQ);
        // Rising edge while configured for falling.
        let out = pia.tick(Pins::new(CB1));
        assert!(!out.any(IRQ));
        // Falling edge.
        let out = pia.tick(Pins::NONE);
        assert!(out.any(IRQB));
    }

    #[test]
    fn flag_without_enable_does_not_interrupt() {
        let mut pia = Mc6821::new();
        write(&mut pia, REG_CRA, C1_LTOH);
        let out = pia.tick(Pins::new(CA1));
        assert!(!out.any(IRQ));
        assert_ne!(pia.pa.ctrl & IRQ1, 0);
    }

    #[test]
    fn control_read_clears_flags() {
        let mut pia = Mc6821::new();
        write(&mut pia, REG_CRA, C1_IRQ | C1_LTOH | C2_IRQ | C2_LTOH);
        pia.tick(Pins::new(CA1 | CA2));
        assert_eq!(pia.pa.ctrl & (IRQ1 | IRQ2), IRQ1 | IRQ2);

        let out = pia.tick(Pins::make(CS | RW | CA1 | CA2, u16::from(REG_CRA), 0));
        assert_eq!(out.data() & (IRQ1 | IRQ2), IRQ1 | IRQ2);
        assert!(!out.any(IRQ));
        assert_eq!(pia.pa.ctrl & (IRQ1 | IRQ2), 0);
    }

    #[test]
    fn control_write_keeps_flags() {
        let mut pia = Mc6821::new();
        write(&mut pia, REG_CRA, C1_LTOH);
        pia.tick(Pins::new(CA1));
        write(&mut pia, REG_CRA, 0xFF & !C2_OUT);
        assert_ne!(pia.pa.ctrl & IRQ1, 0);
        assert_eq!(pia.pa.ctrl & IRQ2, 0);
    }

    #[test]
    fn c2_output_follows_b3() {
        let mut pia = Mc6821::new();
        let out = write(&mut pia, REG_CRB, C2_OUT | C2_SET | C2_B3);
        assert!(out.any(CB2));
        let out = write(&mut pia, REG_CRB, C2_OUT | C2_SET);
        assert!(!out.any(CB2));
    }

    #[test]
    fn c2_output_mode_clears_irq2() {
        let mut pia = Mc6821::new();
        write(&mut pia, REG_CRA, C2_LTOH);
        pia.tick(Pins::new(CA2));
        assert_ne!(pia.pa.ctrl & IRQ2, 0);
        write(&mut pia, REG_CRA, C2_OUT | C2_SET);
        pia.tick(Pins::NONE);
        assert_eq!(pia.pa.ctrl & IRQ2, 0);
    }

    #[test]
    #[should_panic(expected = "pulse output mode")]
    fn c2_pulse_mode_is_fatal() {
        let mut pia = Mc6821::new();
        write(&mut pia, REG_CRA, C2_OUT);
    }

    #[test]
    fn reset_clears_everything() {
        let mut pia = Mc6821::new();
        write(&mut pia, REG_PRA, 0xFF);
        write(&mut pia, REG_CRB, 0x3F & !C2_OUT);
        pia.reset();
        assert_eq!(pia.pa, Port::default());
        assert_eq!(pia.pb, Port::default());
    }

    #[test]
    fn observable_paths() {
        let mut pia = Mc6821::new();
        write(&mut pia, REG_PRB, 0x0F);
        assert_eq!(pia.query("pb.ddr"), Some(Value::U8(0x0F)));
        assert_eq!(pia.query("irq"), Some(Value::Bool(false)));
        for path in pia.query_paths() {
            assert!(pia.query(path).is_some(), "{path}");
        }
    }
}
