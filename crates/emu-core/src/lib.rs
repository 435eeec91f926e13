//! Core traits and types for cycle-stepped emulation.
//!
//! Chips talk to each other only through a [`Pins`] value: one 64-bit word
//! carrying the address bus, the data bus, and every named control line.
//! Each chip's `tick` takes the pins by value and hands back the new pins.
//! Nothing is shared, so a run is fully deterministic and replayable.

mod bus;
mod clock;
mod cpu;
mod observable;
mod pins;
mod tickable;
mod ticks;

pub use bus::{Bus, SimpleBus};
pub use clock::MasterClock;
pub use cpu::Cpu;
pub use observable::{Observable, Value};
pub use pins::Pins;
pub use tickable::Tickable;
pub use ticks::Ticks;
