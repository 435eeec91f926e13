//! Top-level MP-1000 system.
//!
//! One system tick is one CPU clock at 894.75 kHz. Within a tick:
//! 1. The CPU runs one cycle and puts an address on the bus.
//! 2. The address is decoded to PIA-1, PIA-2, external I/O or memory.
//! 3. Both PIAs tick on their own copy of the bus. Their IRQ outputs are
//!    merged into the CPU IRQ line and a selected read puts PIA data on
//!    the bus.
//! 4. The VDG ticks four times, fetching display bytes through its own
//!    memory map.
//! 5. A memory access completes against RAM or ROM.
//!
//! The returned pins are fed back to the CPU on the next tick.
//!
//! # Wiring
//!
//! | Line          | Connected to                          |
//! |---------------|---------------------------------------|
//! | PIA-1 PA0-7   | controller columns (active low)       |
//! | PIA-1 PB0-3   | controller row select (active low)    |
//! | PIA-1 PB6     | VDG CSS                               |
//! | PIA-1 PB7     | VDG A/G, after the mode-switch lag    |
//! | PIA-1 CB1     | VDG FS                                |
//! | PIA-2 PA0-7   | keyboard columns (active low)         |
//! | PIA-2 PB0-7   | keyboard row select (active low)      |
//! | VDG GM2-GM0   | tied to 110 (CG6)                     |
//! | VDG AS, INV   | display data bits 7 and 6 in alphanumeric mode |

use std::cell::Cell;
use std::rc::Rc;

use emu_core::{Cpu, MasterClock, Observable, Pins, Tickable, Ticks, Value};
use motorola_6800::Mc6800;
use motorola_6800::pins::{IRQ, NMI, PIN_MASK, RW, VMA};
use motorola_6821::{CB1, CS, Mc6821, PA_SHIFT, PB_SHIFT};
use motorola_6847::{
    AG, AS, ALL_LINES, CSS, CTRL_PINS, DISPLAY_HEIGHT, DISPLAY_WIDTH, FB_HEIGHT, FB_WIDTH, FS,
    GM1, GM2, INV, Mc6847, PALETTE,
};

use crate::config::{Mp1000Config, validate_cartridge};
use crate::input::{Matrix, Mp1000Key};
use crate::keyboard::KeyMatrix;
use crate::memory::Memory;

/// CPU clock.
pub const CPU_FREQUENCY: u32 = 894_750;

/// VDG ticks per CPU tick.
const VDG_DIVIDER: u32 = 4;

/// Host rate the VDG is ticked at.
pub const VDG_TICK_HZ: u32 = CPU_FREQUENCY * VDG_DIVIDER;

/// CPU ticks per scanline.
pub const TICKS_PER_LINE: u64 = 57;

/// Nominal CPU ticks per field. The VDG line is slightly shorter than
/// 57 ticks, so a real field comes in a few ticks under this.
pub const TICKS_PER_FRAME: u64 = TICKS_PER_LINE * ALL_LINES as u64;

/// Ticks between PIA-1 requesting graphics mode and the VDG switching.
/// Without it the first graphics field starts one line late.
pub const AG_LAG_TICKS: u32 = 57;

const CLOCK: MasterClock = MasterClock::new(CPU_FREQUENCY as u64);

const PIA1_START: u16 = 0x2000;
const PIA1_END: u16 = 0x3FFF;
const PIA2_START: u16 = 0x6000;
const PIA2_END: u16 = 0x63FF;
const EXT_IO_START: u16 = 0x6400;
const EXT_IO_END: u16 = 0x67FF;

/// PIA-1 port B bits.
const PB_ROWS: u8 = 0x0F;
const PB_CSS: u8 = 0x40;
const PB_AG: u8 = 0x80;

/// Per-tick hook. `callback` runs after every tick with the bus pins;
/// setting `stopped` ends the current `exec` before the next tick.
pub struct Debugger {
    pub callback: Box<dyn FnMut(Pins)>,
    pub stopped: Rc<Cell<bool>>,
}

/// Called with the VDG address and the byte returned for every display
/// fetch.
pub type VdgWatch = Box<dyn FnMut(u16, u8)>;

/// A rectangle in framebuffer pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

/// Framebuffer layout for a frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayInfo {
    /// Framebuffer row stride and row count.
    pub width: usize,
    pub height: usize,
    pub bytes_per_pixel: usize,
    /// Visible part of the framebuffer, borders included.
    pub screen: Rect,
    /// Colours indexed by framebuffer bytes, `0xAABBGGRR`.
    pub palette: &'static [u32],
}

/// Where the current bus cycle goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decode {
    None,
    Pia1,
    Pia2,
    ExternalIo,
    Memory,
}

/// APF MP-1000 system.
pub struct Mp1000 {
    cpu: Mc6800,
    pia1: Mc6821,
    pia2: Mc6821,
    vdg: Mc6847,
    memory: Memory,
    controllers: KeyMatrix,
    keyboard: KeyMatrix,
    /// CPU bus as returned by the last tick.
    pins: Pins,
    /// VDG pins as returned by the last VDG tick.
    vdg_pins: Pins,
    /// A/G as currently applied to the VDG.
    graphics: bool,
    /// Ticks left before a requested switch to graphics takes effect.
    ag_lag: u32,
    ticks: Ticks,
    debugger: Option<Debugger>,
    vdg_watch: Option<VdgWatch>,
}

impl Mp1000 {
    /// Build a powered-on system. The CPU starts its reset sequence on the
    /// first tick.
    pub fn new(config: &Mp1000Config) -> Result<Self, String> {
        config.validate()?;
        let mut memory = Memory::new(&config.bios, config.basic.as_deref());
        memory.set_cartridge(config.cartridge.clone());
        let vdg = Mc6847::new(VDG_TICK_HZ)?;

        log::info!(
            "mp1000: BIOS {} bytes, BASIC {}, cartridge {}",
            config.bios.len(),
            if config.basic.is_some() { "present" } else { "absent" },
            config
                .cartridge
                .as_ref()
                .map_or_else(|| "absent".to_string(), |c| format!("{} bytes", c.len()))
        );

        Ok(Self {
            cpu: Mc6800::new(),
            pia1: Mc6821::new(),
            pia2: Mc6821::new(),
            vdg,
            memory,
            controllers: KeyMatrix::new(),
            keyboard: KeyMatrix::new(),
            pins: Mc6800::initial_pins(),
            vdg_pins: Pins::NONE,
            graphics: false,
            ag_lag: 0,
            ticks: Ticks::ZERO,
            debugger: None,
            vdg_watch: None,
        })
    }

    /// Reset every chip. RAM and the inserted ROMs are kept.
    pub fn reset(&mut self) {
        self.pins = Cpu::reset(&mut self.cpu);
        self.pia1.reset();
        self.pia2.reset();
        self.vdg.reset();
        self.vdg_pins = Pins::NONE;
        self.graphics = false;
        self.ag_lag = 0;
        self.controllers.release_all();
        self.keyboard.release_all();
        log::debug!("mp1000: reset");
    }

    /// Run for `micros` microseconds of emulated time. Returns the number
    /// of ticks executed, which is smaller than requested only when a
    /// debugger stops the run.
    pub fn exec(&mut self, micros: u32) -> u64 {
        let num_ticks = CLOCK.micros_to_ticks(u64::from(micros));
        let executed = if let Some(mut debugger) = self.debugger.take() {
            let mut executed = 0;
            while executed < num_ticks.get() && !debugger.stopped.get() {
                self.tick();
                (debugger.callback)(self.pins);
                executed += 1;
            }
            self.debugger = Some(debugger);
            executed
        } else {
            self.tick_n(num_ticks);
            num_ticks.get()
        };
        self.controllers.update(micros);
        self.keyboard.update(micros);
        executed
    }

    /// Run until the VDG wraps back to line 0, so every call ends at the
    /// same beam position. Returns the ticks executed.
    pub fn run_frame(&mut self) -> u64 {
        let limit = TICKS_PER_FRAME + TICKS_PER_LINE;
        let mut executed = 0;
        while executed < limit {
            let line = self.vdg.line();
            self.tick();
            executed += 1;
            if self.vdg.line() < line {
                break;
            }
        }
        executed
    }

    pub fn set_debugger(&mut self, debugger: Option<Debugger>) {
        self.debugger = debugger;
    }

    pub fn set_vdg_watch(&mut self, watch: Option<VdgWatch>) {
        self.vdg_watch = watch;
    }

    /// Insert a cartridge and reset.
    pub fn insert_cartridge(&mut self, data: Vec<u8>) -> Result<(), String> {
        validate_cartridge(&data)?;
        log::info!("mp1000: cartridge inserted ({} bytes)", data.len());
        self.memory.set_cartridge(Some(data));
        self.reset();
        Ok(())
    }

    /// Remove the cartridge and reset.
    pub fn remove_cartridge(&mut self) {
        log::info!("mp1000: cartridge removed");
        self.memory.set_cartridge(None);
        self.reset();
    }

    #[must_use]
    pub fn display_info(&self) -> DisplayInfo {
        DisplayInfo {
            width: FB_WIDTH,
            height: FB_HEIGHT,
            bytes_per_pixel: 1,
            screen: Rect {
                x: 0,
                y: 0,
                width: DISPLAY_WIDTH,
                height: DISPLAY_HEIGHT,
            },
            palette: &PALETTE,
        }
    }

    /// Palette indices, `FB_WIDTH` bytes per row.
    #[must_use]
    pub fn framebuffer(&self) -> &[u8] {
        self.vdg.framebuffer()
    }

    pub fn key_down(&mut self, key: Mp1000Key) {
        match key.position() {
            Some((Matrix::Controllers, row, column)) => self.controllers.key_down(row, column),
            Some((Matrix::Keyboard, row, column)) => self.keyboard.key_down(row, column),
            None => log::debug!("mp1000: no matrix position for {key:?}"),
        }
    }

    pub fn key_up(&mut self, key: Mp1000Key) {
        match key.position() {
            Some((Matrix::Controllers, row, column)) => self.controllers.key_up(row, column),
            Some((Matrix::Keyboard, row, column)) => self.keyboard.key_up(row, column),
            None => {}
        }
    }

    #[must_use]
    pub fn cpu(&self) -> &Mc6800 {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Mc6800 {
        &mut self.cpu
    }

    #[must_use]
    pub fn pia1(&self) -> &Mc6821 {
        &self.pia1
    }

    #[must_use]
    pub fn pia2(&self) -> &Mc6821 {
        &self.pia2
    }

    #[must_use]
    pub fn vdg(&self) -> &Mc6847 {
        &self.vdg
    }

    #[must_use]
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    /// CPU bus as left by the last tick.
    #[must_use]
    pub fn pins(&self) -> Pins {
        self.pins
    }

    /// Ticks since power-on.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks.get()
    }

    fn decode(pins: Pins) -> Decode {
        if !pins.any(VMA) {
            return Decode::None;
        }
        match pins.addr() {
            PIA1_START..=PIA1_END => Decode::Pia1,
            PIA2_START..=PIA2_END => Decode::Pia2,
            EXT_IO_START..=EXT_IO_END => Decode::ExternalIo,
            _ => Decode::Memory,
        }
    }

    /// Tick one PIA. Port A gets the matrix columns for the rows port B
    /// drove on the previous tick; port B inputs float low.
    fn tick_pia(pia: &mut Mc6821, matrix: &mut KeyMatrix, rows: u8, mut pia_pins: Pins) -> Pins {
        matrix.set_active_lines(!pia.pb.pins & rows);
        pia_pins.set_byte_at(PA_SHIFT, !matrix.scan_columns());
        pia_pins.set_byte_at(PB_SHIFT, 0x00);
        pia.tick(pia_pins)
    }

    /// Apply PIA-1 port B to the VDG mode lines. Switching into graphics
    /// waits out the lag; switching back is immediate.
    fn update_video_mode(&mut self, pb: u8) {
        let want = pb & PB_AG != 0;
        if want && !self.graphics {
            if self.ag_lag == 0 {
                self.ag_lag = AG_LAG_TICKS;
            }
            self.ag_lag -= 1;
            if self.ag_lag == 0 {
                self.graphics = true;
            }
        } else {
            self.ag_lag = 0;
            self.graphics = want;
        }

        let mut ctrl = 0;
        if self.graphics {
            ctrl |= AG | GM2 | GM1;
        }
        if pb & PB_CSS != 0 {
            ctrl |= CSS;
        }
        self.vdg_pins = Pins::new((self.vdg_pins.bits() & !CTRL_PINS) | ctrl);
    }

    fn tick_vdg(&mut self) {
        let memory = &self.memory;
        let watch = &mut self.vdg_watch;
        let alphanumeric = !self.graphics;
        let mut vdg_pins = self.vdg_pins;
        for _ in 0..VDG_DIVIDER {
            vdg_pins = self.vdg.tick(vdg_pins, |mut p| {
                let addr = p.addr();
                let byte = memory.vdg_read(addr);
                if let Some(watch) = watch.as_mut() {
                    watch(addr, byte);
                }
                p.set_data(byte);
                if alphanumeric {
                    p.set_if(AS, byte & 0x80 != 0);
                    p.set_if(INV, byte & 0x40 != 0);
                }
                p
            });
        }
        self.vdg_pins = vdg_pins;
    }
}

impl Tickable for Mp1000 {
    fn tick(&mut self) {
        let mut pins = self.cpu.tick(self.pins);
        let addr = pins.addr();
        pins.clear(IRQ | NMI);

        let decode = Self::decode(pins);
        let bus = pins.masked(PIN_MASK & !(IRQ | NMI));

        let mut pia1_pins = bus;
        pia1_pins.set_if(CS, decode == Decode::Pia1);
        pia1_pins.set_if(CB1, self.vdg_pins.any(FS));
        let pia1_pins = Self::tick_pia(&mut self.pia1, &mut self.controllers, PB_ROWS, pia1_pins);

        let mut pia2_pins = bus;
        pia2_pins.set_if(CS, decode == Decode::Pia2);
        let pia2_pins = Self::tick_pia(&mut self.pia2, &mut self.keyboard, 0xFF, pia2_pins);

        pins.set_if(IRQ, pia1_pins.any(IRQ) || pia2_pins.any(IRQ));
        let read = pins.any(RW);
        match decode {
            Decode::Pia1 if read => pins.copy_data(pia1_pins),
            Decode::Pia2 if read => pins.copy_data(pia2_pins),
            Decode::ExternalIo => {
                log::warn!("mp1000: external I/O access at ${addr:04X}");
                if read {
                    pins.set_data(0xFF);
                }
            }
            _ => {}
        }

        self.update_video_mode(pia1_pins.byte_at(PB_SHIFT));
        self.tick_vdg();

        if decode == Decode::Memory {
            if read {
                pins.set_data(self.memory.read(addr));
            } else {
                self.memory.write(addr, pins.data());
            }
        }

        self.pins = pins;
        self.ticks += Ticks::ONE;
    }
}

impl Observable for Mp1000 {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("cpu.") {
            self.cpu.query(rest)
        } else if let Some(rest) = path.strip_prefix("pia1.") {
            self.pia1.query(rest)
        } else if let Some(rest) = path.strip_prefix("pia2.") {
            self.pia2.query(rest)
        } else if let Some(rest) = path.strip_prefix("vdg.") {
            self.vdg.query(rest)
        } else if let Some(rest) = path.strip_prefix("memory.") {
            let addr = if let Some(hex) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
                u16::from_str_radix(hex, 16).ok()
            } else if let Some(hex) = rest.strip_prefix('$') {
                u16::from_str_radix(hex, 16).ok()
            } else {
                rest.parse().ok()
            };
            addr.map(|a| Value::U8(self.memory.read(a)))
        } else {
            match path {
                "ticks" => Some(self.ticks.get().into()),
                "graphics" => Some(self.graphics.into()),
                "ag_lag" => Some(self.ag_lag.into()),
                "irq" => Some(self.pins.any(IRQ).into()),
                _ => None,
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "cpu.<mc6800_paths>",
            "pia1.<mc6821_paths>",
            "pia2.<mc6821_paths>",
            "vdg.<mc6847_paths>",
            "memory.<address>",
            "ticks",
            "graphics",
            "ag_lag",
            "irq",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BIOS_SIZE;

    /// BIOS whose reset vector points at an endless `BRA *`.
    fn make_mp1000() -> Mp1000 {
        let mut bios = vec![0u8; BIOS_SIZE];
        bios[0] = 0x20;
        bios[1] = 0xFE;
        bios[BIOS_SIZE - 2] = 0xF8;
        bios[BIOS_SIZE - 1] = 0x00;
        Mp1000::new(&Mp1000Config {
            bios,
            ..Mp1000Config::default()
        })
        .expect("valid config")
    }

    #[test]
    fn ticks_advance() {
        let mut mp = make_mp1000();
        mp.tick();
        assert_eq!(mp.ticks(), 1);
    }

    #[test]
    fn frame_ends_on_the_field_wrap() {
        let mut mp = make_mp1000();
        let mut total = 0;
        for _ in 0..30 {
            let ticks = mp.run_frame();
            // 262 lines of 3647/16 VDG ticks, four VDG ticks per CPU tick
            assert!((14_929..=14_931).contains(&ticks), "{ticks}");
            assert_eq!(mp.vdg().line(), 0);
            total += ticks;
        }
        assert_eq!(mp.ticks(), total);
        // 30 fields of 59,719.625 VDG ticks
        assert!(total.abs_diff(447_897) <= 1, "{total}");
    }

    #[test]
    fn cpu_mut_edits_show_in_queries() {
        let mut mp = make_mp1000();
        mp.cpu_mut().regs.x = 0x1234;
        assert_eq!(mp.query("cpu.x"), Some(Value::U16(0x1234)));
    }

    #[test]
    fn exec_converts_micros() {
        let mut mp = make_mp1000();
        assert_eq!(mp.exec(16_667), 14_912);
    }

    #[test]
    fn vdg_line_follows_cpu_ticks() {
        let mut mp = make_mp1000();
        for _ in 0..TICKS_PER_LINE * 10 {
            mp.tick();
        }
        assert_eq!(mp.vdg().line(), 10);
    }

    #[test]
    fn display_info_dimensions() {
        let mp = make_mp1000();
        let info = mp.display_info();
        assert_eq!((info.width, info.height), (512, 243));
        assert_eq!(info.bytes_per_pixel, 1);
        assert_eq!(info.screen.width, 320);
        assert_eq!(info.palette.len(), 13);
        assert_eq!(mp.framebuffer().len(), 512 * 243);
    }

    #[test]
    fn graphics_mode_waits_out_the_lag() {
        let mut mp = make_mp1000();
        for _ in 0..AG_LAG_TICKS - 1 {
            mp.update_video_mode(PB_AG);
            assert!(!mp.graphics);
        }
        mp.update_video_mode(PB_AG);
        assert!(mp.graphics);
        assert!(mp.vdg_pins.all(AG | GM2 | GM1));

        mp.update_video_mode(PB_CSS);
        assert!(!mp.graphics);
        assert!(!mp.vdg_pins.any(AG));
        assert!(mp.vdg_pins.any(CSS));
    }

    #[test]
    fn observable_routes_prefixes() {
        let mp = make_mp1000();
        assert!(mp.query("cpu.pc").is_some());
        assert!(mp.query("pia1.pa.ddr").is_some());
        assert!(mp.query("pia2.irq").is_some());
        assert!(mp.query("vdg.line").is_some());
        assert_eq!(mp.query("memory.$F800"), Some(Value::U8(0x20)));
        assert_eq!(mp.query("memory.0xF801"), Some(Value::U8(0xFE)));
        assert_eq!(mp.query("ticks"), Some(Value::U64(0)));
        assert_eq!(mp.query("bogus"), None);
    }
}
