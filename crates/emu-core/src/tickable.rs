//! Trait for whole systems advanced one clock at a time.

use crate::Ticks;

/// A component that owns its own pins and can be advanced by clock ticks.
///
/// Chips take and return [`crate::Pins`] explicitly; a system that owns
/// its chips and bus state implements this instead.
pub trait Tickable {
    /// Advance by one system clock tick.
    fn tick(&mut self);

    /// Advance by `count` ticks, same as calling `tick()` in a loop.
    fn tick_n(&mut self, count: Ticks) {
        for _ in 0..count.get() {
            self.tick();
        }
    }
}
