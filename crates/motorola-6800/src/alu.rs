//! MC6800 arithmetic and logic.
//!
//! Pure functions over a value and the condition codes, so that the cycle
//! sequencing in `cpu.rs` only has to decide *when* a result is produced.

use crate::flags::{C, H, N, V, Z};
use crate::Status;

/// The accumulator-and-memory group (`0x80`-`0xFF`), keyed by the low
/// opcode nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Sub,
    Cmp,
    Sbc,
    And,
    Bit,
    Lda,
    Eor,
    Adc,
    Ora,
    Add,
}

impl AluOp {
    /// Decode the low nibble of an accumulator-group opcode.
    #[must_use]
    pub const fn from_nibble(nibble: u8) -> Option<Self> {
        Some(match nibble & 0x0F {
            0x0 => Self::Sub,
            0x1 => Self::Cmp,
            0x2 => Self::Sbc,
            0x4 => Self::And,
            0x5 => Self::Bit,
            0x6 => Self::Lda,
            0x8 => Self::Eor,
            0x9 => Self::Adc,
            0xA => Self::Ora,
            0xB => Self::Add,
            _ => return None,
        })
    }
}

/// The single-operand group (`0x40`-`0x7F`), keyed by the low opcode nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unary {
    Neg,
    Com,
    Lsr,
    Ror,
    Asr,
    Asl,
    Rol,
    Dec,
    Inc,
    Tst,
    Clr,
}

impl Unary {
    #[must_use]
    pub const fn from_nibble(nibble: u8) -> Option<Self> {
        Some(match nibble & 0x0F {
            0x0 => Self::Neg,
            0x3 => Self::Com,
            0x4 => Self::Lsr,
            0x6 => Self::Ror,
            0x7 => Self::Asr,
            0x8 => Self::Asl,
            0x9 => Self::Rol,
            0xA => Self::Dec,
            0xC => Self::Inc,
            0xD => Self::Tst,
            0xF => Self::Clr,
            _ => return None,
        })
    }

    /// TST only reads its operand.
    #[must_use]
    pub const fn writes_back(self) -> bool {
        !matches!(self, Self::Tst)
    }
}

/// Binary addition with carry in. Sets H, N, Z, V, C.
pub fn add(cc: &mut Status, a: u8, b: u8, carry: bool) -> u8 {
    let sum = u16::from(a) + u16::from(b) + u16::from(carry);
    let r = sum as u8;
    cc.set_if(H, (a ^ b ^ r) & 0x10 != 0);
    cc.set_if(V, !(a ^ b) & (a ^ r) & 0x80 != 0);
    cc.set_if(C, sum > 0xFF);
    cc.update_nz(r);
    r
}

/// Binary subtraction with borrow in. Sets N, Z, V, C; H is untouched.
pub fn sub(cc: &mut Status, a: u8, b: u8, borrow: bool) -> u8 {
    let diff = u16::from(a)
        .wrapping_sub(u16::from(b))
        .wrapping_sub(u16::from(borrow));
    let r = diff as u8;
    cc.set_if(V, (a ^ b) & (a ^ r) & 0x80 != 0);
    cc.set_if(C, diff & 0x100 != 0);
    cc.update_nz(r);
    r
}

/// Logic result or load: N, Z from the value, V cleared.
pub fn logic(cc: &mut Status, value: u8) -> u8 {
    cc.update_nz(value);
    cc.clear(V);
    value
}

/// Apply an accumulator-group operation. Returns the new accumulator value
/// (unchanged for CMP and BIT).
pub fn accumulate(cc: &mut Status, op: AluOp, acc: u8, operand: u8) -> u8 {
    match op {
        AluOp::Sub => sub(cc, acc, operand, false),
        AluOp::Cmp => {
            sub(cc, acc, operand, false);
            acc
        }
        AluOp::Sbc => {
            let borrow = cc.is_set(C);
            sub(cc, acc, operand, borrow)
        }
        AluOp::And => logic(cc, acc & operand),
        AluOp::Bit => {
            logic(cc, acc & operand);
            acc
        }
        AluOp::Lda => logic(cc, operand),
        AluOp::Eor => logic(cc, acc ^ operand),
        AluOp::Adc => {
            let carry = cc.is_set(C);
            add(cc, acc, operand, carry)
        }
        AluOp::Ora => logic(cc, acc | operand),
        AluOp::Add => add(cc, acc, operand, false),
    }
}

/// Apply a single-operand operation and return its result.
pub fn unary(cc: &mut Status, op: Unary, value: u8) -> u8 {
    match op {
        Unary::Neg => {
            let r = 0u8.wrapping_sub(value);
            cc.set_if(V, value == 0x80);
            cc.set_if(C, r != 0);
            cc.update_nz(r);
            r
        }
        Unary::Com => {
            let r = !value;
            cc.clear(V);
            cc.set(C);
            cc.update_nz(r);
            r
        }
        Unary::Lsr => shifted(cc, value >> 1, value & 0x01 != 0),
        Unary::Ror => {
            let r = (value >> 1) | (u8::from(cc.is_set(C)) << 7);
            shifted(cc, r, value & 0x01 != 0)
        }
        Unary::Asr => shifted(cc, (value >> 1) | (value & 0x80), value & 0x01 != 0),
        Unary::Asl => shifted(cc, value << 1, value & 0x80 != 0),
        Unary::Rol => {
            let r = (value << 1) | u8::from(cc.is_set(C));
            shifted(cc, r, value & 0x80 != 0)
        }
        Unary::Dec => {
            let r = value.wrapping_sub(1);
            cc.set_if(V, value == 0x80);
            cc.update_nz(r);
            r
        }
        Unary::Inc => {
            let r = value.wrapping_add(1);
            cc.set_if(V, value == 0x7F);
            cc.update_nz(r);
            r
        }
        Unary::Tst => {
            cc.clear(V | C);
            cc.update_nz(value);
            value
        }
        Unary::Clr => {
            cc.clear(N | V | C);
            cc.set(Z);
            0
        }
    }
}

fn shifted(cc: &mut Status, r: u8, carry: bool) -> u8 {
    cc.set_if(C, carry);
    cc.update_nz(r);
    cc.update_shift_overflow();
    r
}

/// 16-bit compare (CPX). N, Z and V from the word; C is not affected.
pub fn compare16(cc: &mut Status, x: u16, m: u16) {
    let r = x.wrapping_sub(m);
    cc.update_nz16(r);
    cc.set_if(V, (x ^ m) & (x ^ r) & 0x8000 != 0);
}

/// 16-bit load or store flags.
pub fn logic16(cc: &mut Status, value: u16) -> u16 {
    cc.update_nz16(value);
    cc.clear(V);
    value
}

/// Decimal adjust A after a BCD addition.
pub fn daa(cc: &mut Status, a: u8) -> u8 {
    let lo = a & 0x0F;
    let hi = a >> 4;
    let mut correction = 0u8;
    if cc.is_set(H) || lo > 9 {
        correction |= 0x06;
    }
    if cc.is_set(C) || hi > 9 || (hi > 8 && lo > 9) {
        correction |= 0x60;
    }
    let r = a.wrapping_add(correction);
    if correction & 0x60 != 0 {
        cc.set(C);
    }
    cc.clear(V);
    cc.update_nz(r);
    r
}
