//! Cycle-stepped APF MP-1000 emulator.
//!
//! The MP-1000 is a Motorola MC6800 at 894.75 kHz with an MC6847 VDG and
//! two MC6821 PIAs: one for the hand controllers and video mode lines, one
//! for the Imagination Machine keyboard. Every chip is advanced one clock
//! at a time and they talk only through pin words.

#[cfg(feature = "native")]
pub mod capture;
mod config;
pub mod input;
mod keyboard;
pub mod memory;
mod mp1000;

pub use config::{BASIC_SIZE, BIOS_SIZE, CARTRIDGE_SIZES, Mp1000Config};
pub use input::{ControllerKey, Mp1000Key, Player};
pub use keyboard::KeyMatrix;
pub use memory::{Memory, MemoryMap};
pub use mp1000::{
    AG_LAG_TICKS, CPU_FREQUENCY, Debugger, DisplayInfo, Mp1000, Rect, TICKS_PER_FRAME,
    TICKS_PER_LINE, VDG_TICK_HZ, VdgWatch,
};
