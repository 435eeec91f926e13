//! MC6847 hardware colours.
//!
//! The chip outputs luminance plus two colour-difference levels rather than
//! RGB. These are measured RGB equivalents, boosted by a third, packed as
//! `0xAABBGGRR` (bytes R, G, B, A in memory order on little-endian hosts).

pub const GREEN: u8 = 0;
pub const YELLOW: u8 = 1;
pub const BLUE: u8 = 2;
pub const RED: u8 = 3;
pub const BUFF: u8 = 4;
pub const CYAN: u8 = 5;
pub const MAGENTA: u8 = 6;
pub const ORANGE: u8 = 7;
pub const ALNUM_GREEN: u8 = 8;
pub const ALNUM_DARK_GREEN: u8 = 9;
pub const ALNUM_ORANGE: u8 = 10;
pub const ALNUM_DARK_ORANGE: u8 = 11;
pub const BLACK: u8 = 12;

/// Number of palette entries.
pub const COLOURS: usize = 13;

const fn boost(c: u32) -> u32 {
    let v = c * 4 / 3;
    if v > 255 { 255 } else { v }
}

const fn rgba(r: u32, g: u32, b: u32) -> u32 {
    0xFF00_0000 | boost(r) | (boost(g) << 8) | (boost(b) << 16)
}

/// Indexed by the framebuffer bytes.
pub static PALETTE: [u32; COLOURS] = [
    rgba(19, 146, 11),
    rgba(155, 150, 10),
    rgba(2, 22, 175),
    rgba(155, 22, 7),
    rgba(141, 150, 154),
    rgba(15, 143, 155),
    rgba(139, 39, 155),
    rgba(140, 31, 11),
    rgba(19, 146, 11),
    0xFF00_2400,
    rgba(140, 31, 11),
    0xFF00_0E22,
    0xFF11_1111,
];

/// Split a palette entry into R, G, B.
#[must_use]
pub const fn to_rgb(colour: u32) -> [u8; 3] {
    [colour as u8, (colour >> 8) as u8, (colour >> 16) as u8]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boosted_values() {
        assert_eq!(PALETTE[GREEN as usize], 0xFF0E_C219);
        assert_eq!(PALETTE[BUFF as usize], 0xFFCD_C8BC);
        assert_eq!(PALETTE[ALNUM_ORANGE as usize], 0xFF0E_29BA);
    }

    #[test]
    fn alphanumeric_foregrounds_match_graphics_colours() {
        assert_eq!(PALETTE[ALNUM_GREEN as usize], PALETTE[GREEN as usize]);
        assert_eq!(PALETTE[ALNUM_ORANGE as usize], PALETTE[ORANGE as usize]);
    }

    #[test]
    fn rgb_split() {
        assert_eq!(to_rgb(PALETTE[GREEN as usize]), [0x19, 0xC2, 0x0E]);
    }
}
