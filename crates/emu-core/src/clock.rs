//! System clock configuration.

use crate::Ticks;

/// The clock that one system `tick` represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterClock {
    /// Frequency in Hz (e.g. `894_750` for the MP-1000 CPU clock).
    pub frequency_hz: u64,
}

impl MasterClock {
    #[must_use]
    pub const fn new(frequency_hz: u64) -> Self {
        Self { frequency_hz }
    }

    /// Ticks per frame at the given frame rate (integer division).
    #[must_use]
    pub const fn ticks_per_frame(&self, frames_per_second: u64) -> Ticks {
        Ticks::new(self.frequency_hz / frames_per_second)
    }

    /// Whole ticks elapsed in `micros` microseconds, rounded down.
    #[must_use]
    pub const fn micros_to_ticks(&self, micros: u64) -> Ticks {
        Ticks::new(self.frequency_hz * micros / 1_000_000)
    }

    /// Microseconds covered by `ticks`, rounded down.
    #[must_use]
    pub const fn ticks_to_micros(&self, ticks: Ticks) -> u64 {
        ticks.get() * 1_000_000 / self.frequency_hz
    }
}
