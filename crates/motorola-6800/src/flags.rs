//! MC6800 condition code register (CC).
//!
//! Six flags live in bits 0-5. Bits 6 and 7 are not implemented on the
//! chip and always read as one.

/// Carry/borrow out of bit 7 (bit 15 is not tracked; CPX leaves C alone).
pub const C: u8 = 0x01;

/// Two's-complement overflow.
pub const V: u8 = 0x02;

/// Result is zero.
pub const Z: u8 = 0x04;

/// Result bit 7 (bit 15 for 16-bit loads and compares).
pub const N: u8 = 0x08;

/// Interrupt mask. When set, IRQ is not sampled.
pub const I: u8 = 0x10;

/// Half carry out of bit 3. Only ADD, ADC and ABA update it.
pub const H: u8 = 0x20;

/// Bits 6 and 7.
pub const ALWAYS_ONE: u8 = 0xC0;

/// Condition code register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status(pub u8);

impl Default for Status {
    fn default() -> Self {
        Self::new()
    }
}

impl Status {
    /// Power-on value: Z set.
    #[must_use]
    pub const fn new() -> Self {
        Self(ALWAYS_ONE | Z)
    }

    /// From a raw byte (TAP, RTI), forcing the always-one bits.
    #[must_use]
    pub const fn from_byte(value: u8) -> Self {
        Self(value | ALWAYS_ONE)
    }

    #[must_use]
    pub const fn is_set(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    pub fn set(&mut self, flag: u8) {
        self.0 |= flag;
    }

    pub fn clear(&mut self, flag: u8) {
        self.0 &= !flag;
    }

    pub fn set_if(&mut self, flag: u8, condition: bool) {
        if condition {
            self.set(flag);
        } else {
            self.clear(flag);
        }
    }

    /// N from bit 7, Z from the whole byte.
    pub fn update_nz(&mut self, value: u8) {
        self.set_if(N, value & 0x80 != 0);
        self.set_if(Z, value == 0);
    }

    /// N from bit 15, Z from the whole word.
    pub fn update_nz16(&mut self, value: u16) {
        self.set_if(N, value & 0x8000 != 0);
        self.set_if(Z, value == 0);
    }

    /// V = N xor C, as left by the shift and rotate group.
    pub fn update_shift_overflow(&mut self) {
        let v = self.is_set(N) != self.is_set(C);
        self.set_if(V, v);
    }
}
