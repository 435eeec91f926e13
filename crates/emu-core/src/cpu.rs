//! CPU core trait.

use crate::Pins;

/// A pin-driven CPU core.
///
/// A CPU never touches memory itself. Each `tick` consumes the pins left by
/// the previous cycle (data bus filled in by whoever answered the last
/// address) and returns the pins for the next bus cycle. The caller decides
/// who answers.
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// Advance the CPU by exactly one clock cycle.
    fn tick(&mut self, pins: Pins) -> Pins;

    /// Returns the current program counter.
    fn pc(&self) -> u16;

    /// Returns a snapshot of all registers for inspection.
    fn registers(&self) -> Self::Registers;

    /// Returns true if the CPU is frozen by its halt input.
    fn is_halted(&self) -> bool;

    /// Return to power-on state. Returns the pins to start ticking with.
    fn reset(&mut self) -> Pins;
}
