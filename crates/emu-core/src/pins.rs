//! The pin bus shared between chips.

use std::fmt;

/// Address bus bits (A0-A15).
const ADDR_MASK: u64 = 0xFFFF;

/// Data bus bits (D0-D7).
const DATA_MASK: u64 = 0xFF_0000;

/// Bit position of D0.
const DATA_SHIFT: u32 = 16;

/// A snapshot of every pin a chip can see.
///
/// Bits 0-15 hold the address bus and bits 16-23 the data bus. The meaning
/// of every other bit is owned by the chip crates, which publish their pin
/// masks as `u64` constants. Bits at 40 and above are chip-specific, so the
/// same bit can mean different things to two chips; a system keeps one
/// `Pins` per chip where that matters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pins(pub u64);

impl Pins {
    pub const NONE: Self = Self(0);

    #[must_use]
    pub const fn new(bits: u64) -> Self {
        Self(bits)
    }

    /// Build a pin value from control lines, an address and a data byte.
    #[must_use]
    pub const fn make(ctrl: u64, addr: u16, data: u8) -> Self {
        Self((ctrl & !(ADDR_MASK | DATA_MASK)) | ((data as u64) << DATA_SHIFT) | addr as u64)
    }

    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn addr(self) -> u16 {
        (self.0 & ADDR_MASK) as u16
    }

    pub fn set_addr(&mut self, addr: u16) {
        self.0 = (self.0 & !ADDR_MASK) | u64::from(addr);
    }

    #[must_use]
    pub const fn data(self) -> u8 {
        ((self.0 & DATA_MASK) >> DATA_SHIFT) as u8
    }

    pub fn set_data(&mut self, data: u8) {
        self.0 = (self.0 & !DATA_MASK) | (u64::from(data) << DATA_SHIFT);
    }

    /// Replace the data bus with the data bus of `other`.
    pub fn copy_data(&mut self, other: Self) {
        self.0 = (self.0 & !DATA_MASK) | (other.0 & DATA_MASK);
    }

    /// True if any line in `mask` is high.
    #[must_use]
    pub const fn any(self, mask: u64) -> bool {
        self.0 & mask != 0
    }

    /// True if every line in `mask` is high.
    #[must_use]
    pub const fn all(self, mask: u64) -> bool {
        self.0 & mask == mask
    }

    pub fn set(&mut self, mask: u64) {
        self.0 |= mask;
    }

    pub fn clear(&mut self, mask: u64) {
        self.0 &= !mask;
    }

    pub fn set_if(&mut self, mask: u64, condition: bool) {
        if condition {
            self.set(mask);
        } else {
            self.clear(mask);
        }
    }

    /// Keep only the lines in `mask`.
    #[must_use]
    pub const fn masked(self, mask: u64) -> Self {
        Self(self.0 & mask)
    }

    /// Read an 8-bit field starting at bit `shift`.
    #[must_use]
    pub const fn byte_at(self, shift: u32) -> u8 {
        (self.0 >> shift) as u8
    }

    /// Overwrite an 8-bit field starting at bit `shift`.
    pub fn set_byte_at(&mut self, shift: u32, value: u8) {
        self.0 = (self.0 & !(0xFF << shift)) | (u64::from(value) << shift);
    }

    /// Lines that are high here but were low in `previous`.
    #[must_use]
    pub const fn rising(self, previous: Self) -> u64 {
        self.0 & (self.0 ^ previous.0)
    }
}

impl fmt::Debug for Pins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Pins({:#018X} addr={:#06X} data={:#04X})",
            self.0,
            self.addr(),
            self.data()
        )
    }
}

impl From<u64> for Pins {
    fn from(bits: u64) -> Self {
        Self(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_and_data_fields_are_independent() {
        let mut pins = Pins::new(1 << 30);
        pins.set_addr(0xBEEF);
        pins.set_data(0x42);
        assert_eq!(pins.addr(), 0xBEEF);
        assert_eq!(pins.data(), 0x42);
        assert!(pins.any(1 << 30));

        pins.set_addr(0x0001);
        assert_eq!(pins.data(), 0x42);
    }

    #[test]
    fn make_masks_control_bits_out_of_buses() {
        let pins = Pins::make(0xFFFF_FFFF | (1 << 24), 0x1234, 0x56);
        assert_eq!(pins.addr(), 0x1234);
        assert_eq!(pins.data(), 0x56);
        assert!(pins.any(1 << 24));
    }

    #[test]
    fn byte_fields_at_top_of_word() {
        let mut pins = Pins::NONE;
        pins.set_byte_at(56, 0xA5);
        pins.set_byte_at(48, 0x5A);
        assert_eq!(pins.byte_at(56), 0xA5);
        assert_eq!(pins.byte_at(48), 0x5A);
        assert_eq!(pins.bits(), 0xA55A << 48);
    }

    #[test]
    fn rising_reports_only_new_lines() {
        let before = Pins::new(0b0110);
        let after = Pins::new(0b1100);
        assert_eq!(after.rising(before), 0b1000);
    }
}
