//! Motorola MC6847 Video Display Generator (VDG).
//!
//! The VDG runs from a 3.579545 MHz clock and produces 262 lines per field.
//! It reads display memory through a fetch callback supplied on each tick,
//! so it owns no memory of its own beyond the decoded framebuffer.
//!
//! # Timing
//!
//! | Lines   | Region        |
//! |---------|---------------|
//! | 0-12    | vertical blank |
//! | 13-37   | top border    |
//! | 38-229  | display (192) |
//! | 230-255 | bottom border |
//! | 256-261 | retrace       |
//!
//! The host need not tick at the native rate. A fixed-point horizontal
//! counter advances by 16 per tick and a line completes after 228 native
//! clocks' worth of counts, so any host rate below 3.579545 MHz keeps the
//! field rate correct. A whole scanline is decoded at the moment its line
//! begins.
//!
//! # Modes
//!
//! | AG | AS | INT/EXT | GM2-0 | Mode                        |
//! |----|----|---------|-------|-----------------------------|
//! | 0  | 0  | -       | -     | alphanumeric, internal font |
//! | 0  | 1  | 0       | -     | semigraphics 4              |
//! | 0  | 1  | 1       | -     | semigraphics 6              |
//! | 1  | -  | -       | 000   | CG1 64x64, 4 colours        |
//! | 1  | -  | -       | 001   | RG1 128x64                  |
//! | 1  | -  | -       | 010   | CG2 128x64                  |
//! | 1  | -  | -       | 011   | RG2 128x96                  |
//! | 1  | -  | -       | 100   | CG3 128x96                  |
//! | 1  | -  | -       | 101   | RG3 128x192                 |
//! | 1  | -  | -       | 110   | CG6 128x192                 |
//! | 1  | -  | -       | 111   | RG6 256x192                 |
//!
//! AS, INV and CSS are sampled from the pins returned by every fetch, so a
//! system can derive them from the fetched byte.

mod font;
pub mod palette;

pub use font::{FONT, GLYPH_HEIGHT};
pub use palette::PALETTE;

use emu_core::{Observable, Pins, Value};

/// Field sync output.
pub const FS: u64 = 1 << 40;
/// Horizontal sync output.
pub const HS: u64 = 1 << 41;
/// Row preset output (not driven).
pub const RP: u64 = 1 << 42;
/// Graphics mode select.
pub const AG: u64 = 1 << 43;
/// Semigraphics select.
pub const AS: u64 = 1 << 44;
/// Internal/external select. Picks SG6 over SG4.
pub const INTEXT: u64 = 1 << 45;
/// Invert alphanumerics.
pub const INV: u64 = 1 << 46;
pub const GM0: u64 = 1 << 47;
pub const GM1: u64 = 1 << 48;
pub const GM2: u64 = 1 << 49;
/// Colour set select.
pub const CSS: u64 = 1 << 50;

/// Mode select inputs.
pub const CTRL_PINS: u64 = AG | AS | INTEXT | INV | GM0 | GM1 | GM2 | CSS;

/// Native clock.
pub const TICK_HZ: u32 = 3_579_545;

const FIXEDPOINT_SCALE: u32 = 16;

pub const VBLANK_LINES: u16 = 13;
pub const TOP_BORDER_LINES: u16 = 25;
pub const DISPLAY_LINES: u16 = 192;
pub const BOTTOM_BORDER_LINES: u16 = 26;
pub const ALL_LINES: u16 = 262;
pub const DISPLAY_START: u16 = VBLANK_LINES + TOP_BORDER_LINES;
pub const DISPLAY_END: u16 = DISPLAY_START + DISPLAY_LINES;
const BOTTOM_BORDER_END: u16 = DISPLAY_END + BOTTOM_BORDER_LINES;
/// Field sync goes active at the end of the display area.
const FSYNC_START: u16 = DISPLAY_END;

/// Visible width including both borders.
pub const DISPLAY_WIDTH: usize = 320;
/// Visible height including both borders (243).
pub const DISPLAY_HEIGHT: usize = (TOP_BORDER_LINES + DISPLAY_LINES + BOTTOM_BORDER_LINES) as usize;
/// Framebuffer row stride.
pub const FB_WIDTH: usize = 512;
pub const FB_HEIGHT: usize = DISPLAY_HEIGHT;
pub const IMAGE_WIDTH: usize = 256;
pub const BORDER_PIXELS: usize = (DISPLAY_WIDTH - IMAGE_WIDTH) / 2;

/// Display mode as selected by AG and GM2-GM0. Alphanumeric covers both
/// semigraphics modes, which share its memory layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Alphanumeric,
    Cg1,
    Rg1,
    Cg2,
    Rg2,
    Cg3,
    Rg3,
    Cg6,
    Rg6,
}

impl Mode {
    #[must_use]
    pub const fn from_pins(pins: Pins) -> Self {
        if !pins.any(AG) {
            return Self::Alphanumeric;
        }
        match (pins.any(GM2), pins.any(GM1), pins.any(GM0)) {
            (false, false, false) => Self::Cg1,
            (false, false, true) => Self::Rg1,
            (false, true, false) => Self::Cg2,
            (false, true, true) => Self::Rg2,
            (true, false, false) => Self::Cg3,
            (true, false, true) => Self::Rg3,
            (true, true, false) => Self::Cg6,
            (true, true, true) => Self::Rg6,
        }
    }

    /// Display memory bytes fetched per scanline.
    #[must_use]
    pub const fn bytes_per_row(self) -> u16 {
        match self {
            Self::Rg1 | Self::Rg2 | Self::Rg3 | Self::Cg1 => 16,
            _ => 32,
        }
    }

    /// Scanlines each memory row is repeated for.
    #[must_use]
    pub const fn row_height(self) -> u16 {
        match self {
            Self::Alphanumeric => 12,
            Self::Cg1 | Self::Rg1 | Self::Cg2 => 3,
            Self::Rg2 | Self::Cg3 => 2,
            Self::Rg3 | Self::Cg6 | Self::Rg6 => 1,
        }
    }

    /// One bit per pixel block (RG) rather than two (CG).
    const fn is_resolution(self) -> bool {
        matches!(self, Self::Rg1 | Self::Rg2 | Self::Rg3 | Self::Rg6)
    }

    /// Framebuffer pixels per bit (RG) or bit pair (CG).
    const fn dots(self) -> usize {
        match self {
            Self::Cg1 => 4,
            Self::Rg6 => 1,
            _ => 2,
        }
    }
}

/// Border colour: green or buff in graphics modes, black otherwise.
const fn border_colour(pins: Pins) -> u8 {
    if !pins.any(AG) {
        palette::BLACK
    } else if pins.any(CSS) {
        palette::BUFF
    } else {
        palette::GREEN
    }
}

/// Motorola MC6847 VDG.
pub struct Mc6847 {
    /// Pins as returned by the previous tick.
    pins: Pins,
    h_count: u32,
    h_period: u32,
    h_sync_start: u32,
    h_sync_end: u32,
    line: u16,
    /// Field sync latch.
    fs: bool,
    /// Palette indices, `FB_WIDTH` x `FB_HEIGHT`.
    framebuffer: Vec<u8>,
}

impl Mc6847 {
    /// Create a VDG ticked at `tick_hz`, which must be below the native
    /// 3.579545 MHz.
    pub fn new(tick_hz: u32) -> Result<Self, String> {
        if tick_hz == 0 || tick_hz >= TICK_HZ {
            return Err(format!(
                "MC6847 tick rate must be between 1 and {} Hz, got {tick_hz}",
                TICK_HZ - 1
            ));
        }
        let scale = |native_clocks: u64| {
            (native_clocks * u64::from(tick_hz) * u64::from(FIXEDPOINT_SCALE) / u64::from(TICK_HZ))
                as u32
        };
        Ok(Self {
            pins: Pins::NONE,
            h_count: 0,
            // 228 native clocks per line, HS from clock 10 to 26.
            h_period: scale(228),
            h_sync_start: scale(10),
            h_sync_end: scale(26),
            line: 0,
            fs: false,
            framebuffer: vec![palette::BLACK; FB_WIDTH * FB_HEIGHT],
        })
    }

    /// Rewind to the top of the field. The framebuffer is kept.
    pub fn reset(&mut self) {
        self.h_count = 0;
        self.line = 0;
        self.fs = false;
        self.pins = Pins::NONE;
    }

    /// Advance one host tick.
    ///
    /// `fetch` receives pins with a display address on A0-A12 and must
    /// return them with the byte on the data bus. It is only called while
    /// a display line is being decoded.
    pub fn tick(&mut self, mut pins: Pins, mut fetch: impl FnMut(Pins) -> Pins) -> Pins {
        pins.clear(HS | FS);

        self.h_count += FIXEDPOINT_SCALE;
        if self.h_count >= self.h_sync_start && self.h_count < self.h_sync_end {
            pins.set(HS);
            if self.line == FSYNC_START {
                self.fs = true;
            }
        }
        pins.set_if(FS, self.fs);

        if self.h_count >= self.h_period {
            self.h_count -= self.h_period;
            self.line += 1;
            if self.line >= ALL_LINES {
                self.line = 0;
                self.fs = false;
            }
            let line = self.line;
            if line < VBLANK_LINES {
                // vertical blank
            } else if line < DISPLAY_START {
                self.decode_border(pins, usize::from(line - VBLANK_LINES));
            } else if line < DISPLAY_END {
                pins = self.decode_scanline(pins, line - DISPLAY_START, &mut fetch);
            } else if line < BOTTOM_BORDER_END {
                self.decode_border(pins, usize::from(line - VBLANK_LINES));
            }
        }

        self.pins = pins;
        pins
    }

    fn decode_border(&mut self, pins: Pins, y: usize) {
        let start = y * FB_WIDTH;
        self.framebuffer[start..start + DISPLAY_WIDTH].fill(border_colour(pins));
    }

    fn decode_scanline(
        &mut self,
        mut pins: Pins,
        y: u16,
        fetch: &mut impl FnMut(Pins) -> Pins,
    ) -> Pins {
        let row = usize::from(y + TOP_BORDER_LINES) * FB_WIDTH;
        let border = border_colour(pins);
        let dst = &mut self.framebuffer[row..row + DISPLAY_WIDTH];
        dst[..BORDER_PIXELS].fill(border);
        dst[BORDER_PIXELS + IMAGE_WIDTH..].fill(border);

        let mode = Mode::from_pins(pins);
        let mut addr = (y / mode.row_height()) * mode.bytes_per_row();
        let mut x = BORDER_PIXELS;
        let mut put = |colour: u8, count: usize| {
            dst[x..x + count].fill(colour);
            x += count;
        };

        if mode == Mode::Alphanumeric {
            let chr_y = usize::from(y % 12);
            let shift_sg4 = (1 - chr_y / 6) * 2;
            let shift_sg6 = (2 - chr_y / 4) * 2;
            for _ in 0..32 {
                pins.set_addr(addr);
                addr += 1;
                pins = fetch(pins);
                let chr = pins.data();
                if pins.any(AS) {
                    let (bits, fg) = if pins.any(INTEXT) {
                        let set = if pins.any(CSS) { 4 } else { 0 };
                        ((chr >> shift_sg6) & 3, ((chr >> 6) & 3) + set)
                    } else {
                        ((chr >> shift_sg4) & 3, (chr >> 4) & 7)
                    };
                    for p in [1, 0] {
                        put(if bits & (1 << p) != 0 { fg } else { palette::BLACK }, 4);
                    }
                } else {
                    let (fg, bg) = if pins.any(CSS) {
                        (palette::ALNUM_ORANGE, palette::ALNUM_DARK_ORANGE)
                    } else {
                        (palette::ALNUM_GREEN, palette::ALNUM_DARK_GREEN)
                    };
                    let mut m = FONT[usize::from(chr & 0x3F) * GLYPH_HEIGHT + chr_y];
                    if pins.any(INV) {
                        m = !m;
                    }
                    for p in (0..8).rev() {
                        put(if m & (1 << p) != 0 { fg } else { bg }, 1);
                    }
                }
            }
        } else if mode.is_resolution() {
            for _ in 0..mode.bytes_per_row() {
                pins.set_addr(addr);
                addr += 1;
                pins = fetch(pins);
                let fg = if pins.any(CSS) { palette::BUFF } else { palette::GREEN };
                let m = pins.data();
                for p in (0..8).rev() {
                    put(if m & (1 << p) != 0 { fg } else { palette::BLACK }, mode.dots());
                }
            }
        } else {
            for _ in 0..mode.bytes_per_row() {
                pins.set_addr(addr);
                addr += 1;
                pins = fetch(pins);
                let set = if pins.any(CSS) { 4 } else { 0 };
                let m = pins.data();
                for p in [6, 4, 2, 0] {
                    put(((m >> p) & 3) + set, mode.dots());
                }
            }
        }
        pins
    }

    /// Palette indices, `FB_WIDTH` bytes per row.
    #[must_use]
    pub fn framebuffer(&self) -> &[u8] {
        &self.framebuffer
    }

    #[must_use]
    pub fn palette(&self) -> &'static [u32; palette::COLOURS] {
        &PALETTE
    }

    /// Current line, 0-261.
    #[must_use]
    pub fn line(&self) -> u16 {
        self.line
    }

    /// Host ticks per line, rounded up.
    #[must_use]
    pub fn ticks_per_line(&self) -> u32 {
        self.h_period.div_ceil(FIXEDPOINT_SCALE)
    }

    #[must_use]
    pub fn field_sync(&self) -> bool {
        self.fs
    }
}

impl Observable for Mc6847 {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "line" => Some(self.line.into()),
            "h_count" => Some(self.h_count.into()),
            "fs" => Some(self.fs.into()),
            "hs" => Some(self.pins.any(HS).into()),
            "ag" => Some(self.pins.any(AG).into()),
            "css" => Some(self.pins.any(CSS).into()),
            "mode" => Some(format!("{:?}", Mode::from_pins(self.pins)).into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &["line", "h_count", "fs", "hs", "ag", "css", "mode"]
    }
}
