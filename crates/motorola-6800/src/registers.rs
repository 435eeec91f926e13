//! MC6800 programmer-visible registers.

use crate::Status;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    /// Accumulator A.
    pub a: u8,
    /// Accumulator B.
    pub b: u8,
    /// Index register.
    pub x: u16,
    /// Stack pointer. Points at the next free byte; pushes post-decrement.
    pub sp: u16,
    pub pc: u16,
    /// Condition codes.
    pub cc: Status,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            a: 0,
            b: 0,
            x: 0,
            sp: 0,
            pc: 0,
            cc: Status::new(),
        }
    }
}
