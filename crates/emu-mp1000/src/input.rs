//! Input for the MP-1000.
//!
//! Two matrices are wired to the PIAs:
//! 1. The hand controllers on PIA-1. Port B bits 0-3 select one of four
//!    rows (active low); port A returns player 1 on bits 0-3 and player 2
//!    on bits 4-7 (active low).
//! 2. The Imagination Machine keyboard on PIA-2. Port B selects one of
//!    eight rows (active low); port A returns eight columns (active low).
//!
//! # Controller rows
//!
//! | Row | Bit 0 | Bit 1 | Bit 2 | Bit 3 |
//! |-----|-------|-------|-------|-------|
//! | 0   | Down  | Right | Up    | Left  |
//! | 1   | 1     | 4     | 7     | Clear |
//! | 2   | 2     | 5     | 8     | 0     |
//! | 3   | 3     | 6     | 9     | Enter |
//!
//! # Keyboard rows
//!
//! Keys follow the VDG character order, eight to a row, so the column
//! index is the low three bits of the 6-bit character code:
//!
//! | Row | Columns 0-7            |
//! |-----|------------------------|
//! | 0   | `@ A B C D E F G`      |
//! | 1   | `H I J K L M N O`      |
//! | 2   | `P Q R S T U V W`      |
//! | 3   | `X Y Z [ \ ]` Return Rubout |
//! | 4   | `space ! " # $ % & '`  |
//! | 5   | `( ) * + , - . /`      |
//! | 6   | `0 1 2 3 4 5 6 7`      |
//! | 7   | `8 9 : ; < = > ?`      |

/// Hand controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    One,
    Two,
}

/// A key on a hand controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerKey {
    Num0,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,
    Clear,
    Enter,
    Up,
    Down,
    Left,
    Right,
}

impl ControllerKey {
    /// Row and bit within the player's nibble.
    #[must_use]
    pub const fn matrix(self) -> (u8, u8) {
        match self {
            Self::Down => (0, 0),
            Self::Right => (0, 1),
            Self::Up => (0, 2),
            Self::Left => (0, 3),

            Self::Num1 => (1, 0),
            Self::Num4 => (1, 1),
            Self::Num7 => (1, 2),
            Self::Clear => (1, 3),

            Self::Num2 => (2, 0),
            Self::Num5 => (2, 1),
            Self::Num8 => (2, 2),
            Self::Num0 => (2, 3),

            Self::Num3 => (3, 0),
            Self::Num6 => (3, 1),
            Self::Num9 => (3, 2),
            Self::Enter => (3, 3),
        }
    }
}

/// Carriage return on the keyboard.
pub const RETURN: u8 = 0x0D;
/// Rubout (delete) on the keyboard.
pub const RUBOUT: u8 = 0x7F;

/// A key on either matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mp1000Key {
    Controller(Player, ControllerKey),
    /// Keyboard key by ASCII code. Lower case maps to upper case.
    Keyboard(u8),
}

/// Which PIA scans a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Matrix {
    Controllers,
    Keyboard,
}

impl Mp1000Key {
    /// Matrix, row and column for this key. `None` for characters the
    /// keyboard does not have.
    #[must_use]
    pub(crate) fn position(self) -> Option<(Matrix, u8, u8)> {
        match self {
            Self::Controller(player, key) => {
                let (row, bit) = key.matrix();
                let column = match player {
                    Player::One => bit,
                    Player::Two => bit + 4,
                };
                Some((Matrix::Controllers, row, column))
            }
            Self::Keyboard(ascii) => {
                keyboard_position(ascii).map(|(row, column)| (Matrix::Keyboard, row, column))
            }
        }
    }

    /// Keyboard key for a character, if there is one.
    #[must_use]
    pub fn from_char(ch: char) -> Option<Self> {
        let ascii = u8::try_from(ch).ok()?;
        let ascii = match ascii {
            b'\n' => RETURN,
            0x08 => RUBOUT,
            other => other,
        };
        keyboard_position(ascii).map(|_| Self::Keyboard(ascii))
    }
}

fn keyboard_position(ascii: u8) -> Option<(u8, u8)> {
    let code = match ascii.to_ascii_uppercase() {
        RETURN => 0x1E,
        RUBOUT => 0x1F,
        // ^ and _ share their slots with Return and Rubout.
        b'^' | b'_' => return None,
        c @ 0x40..=0x5F => c - 0x40,
        c @ 0x20..=0x3F => c,
        _ => return None,
    };
    Some((code >> 3, code & 7))
}
