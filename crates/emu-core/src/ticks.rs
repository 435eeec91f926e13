//! Counted clock ticks.

use std::fmt;

/// A count of system clock ticks.
///
/// Systems keep a running `Ticks` since power-on; batches (`exec`, a
/// video field) are measured in it too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Ticks(pub u64);

impl Ticks {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(1);

    #[must_use]
    pub const fn new(count: u64) -> Self {
        Self(count)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Whole `period`s contained in this count and the ticks left over.
    #[must_use]
    pub const fn split(self, period: u64) -> (u64, u64) {
        (self.0 / period, self.0 % period)
    }
}

impl core::ops::Add for Ticks {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl core::ops::AddAssign for Ticks {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl From<Ticks> for u64 {
    fn from(ticks: Ticks) -> Self {
        ticks.0
    }
}

impl fmt::Display for Ticks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ticks", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_into_lines() {
        // 57 ticks per scanline
        assert_eq!(Ticks::new(570).split(57), (10, 0));
        assert_eq!(Ticks::new(600).split(57), (10, 30));
    }

    #[test]
    fn accumulates() {
        let mut total = Ticks::ZERO;
        total += Ticks::ONE;
        total += Ticks::new(9);
        assert_eq!(total, Ticks::new(10));
        assert_eq!(total.to_string(), "10 ticks");
        assert_eq!(u64::from(total + Ticks::ONE), 11);
    }
}
