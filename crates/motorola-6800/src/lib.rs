//! Cycle-stepped Motorola MC6800 CPU emulator.
//!
//! The CPU is driven one clock at a time through a 64-bit [`emu_core::Pins`]
//! value. It never reads memory itself: every `tick()` returns the address
//! it wants and the direction of the transfer, and the caller places the
//! read result on the data bus before the next `tick()`.
//!
//! Interrupts, halt and reset arrive as pins too. See [`pins`] for the
//! layout.

mod alu;
mod cpu;
mod flags;
pub mod pins;
mod registers;

pub use alu::{AluOp, Unary};
pub use cpu::{Mc6800, VECTOR_IRQ, VECTOR_NMI, VECTOR_RESET, VECTOR_SWI};
pub use flags::Status;
pub use registers::Registers;

pub mod status {
    //! Condition code bit masks.
    pub use crate::flags::{ALWAYS_ONE, C, H, I, N, V, Z};
}
