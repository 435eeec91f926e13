//! MC6800 pin assignments within the shared pin word.
//!
//! | Bits  | Pins      | Direction                                 |
//! |-------|-----------|-------------------------------------------|
//! | 0-15  | A0-A15    | out                                       |
//! | 16-23 | D0-D7     | in (reads) / out (writes)                 |
//! | 24    | R/W       | out, high = read                          |
//! | 25    | BA        | out, bus available (not driven)           |
//! | 26    | IRQ       | in, level, active high in the pin word     |
//! | 27    | NMI       | in, edge                                  |
//! | 28    | HALT      | in, freezes the CPU                       |
//! | 29    | RESET     | in, consumed at the next fetch            |
//! | 30    | VMA       | out, high = this address is a real access |
//!
//! Bits 40 and above belong to peripherals.

pub const RW: u64 = 1 << 24;
pub const BA: u64 = 1 << 25;
pub const IRQ: u64 = 1 << 26;
pub const NMI: u64 = 1 << 27;
pub const HALT: u64 = 1 << 28;
pub const RESET: u64 = 1 << 29;
pub const VMA: u64 = 1 << 30;

/// Every pin the CPU owns or shares with the system bus (bits 0-39).
pub const PIN_MASK: u64 = (1 << 40) - 1;
