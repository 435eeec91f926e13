//! Key matrix scanned through a PIA.
//!
//! The system drives the row lines from one PIA port and reads the column
//! lines back on the other. Both sides are active low on the wire; this
//! type works in positive logic (1 = row driven, 1 = column pulled) and
//! leaves the inversion to the caller.
//!
//! A key that is released very soon after it was pressed stays down until
//! it has been held for the sticky time, so a tap shorter than the
//! firmware's scan interval is still seen. Time advances through
//! `update()`, called once per exec batch.

/// Minimum time a key stays pressed, about two video frames.
pub const STICKY_MICROS: u32 = 33_334;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HeldKey {
    row: u8,
    column: u8,
    held_micros: u32,
    /// Released by the host but still inside its sticky time.
    released: bool,
}

/// Row/column switch matrix of up to 8x8 keys.
#[derive(Debug, Clone)]
pub struct KeyMatrix {
    keys: Vec<HeldKey>,
    active_lines: u8,
    sticky_micros: u32,
}

impl KeyMatrix {
    #[must_use]
    pub fn new() -> Self {
        Self {
            keys: Vec::new(),
            active_lines: 0,
            sticky_micros: STICKY_MICROS,
        }
    }

    /// Rows currently driven.
    pub fn set_active_lines(&mut self, mask: u8) {
        self.active_lines = mask;
    }

    /// Columns pulled by any pressed key on a driven row.
    #[must_use]
    pub fn scan_columns(&self) -> u8 {
        self.keys
            .iter()
            .filter(|key| self.active_lines & (1 << key.row) != 0)
            .fold(0, |columns, key| columns | (1 << key.column))
    }

    pub fn key_down(&mut self, row: u8, column: u8) {
        debug_assert!(row < 8 && column < 8);
        if let Some(i) = self.position(row, column) {
            self.keys[i].released = false;
        } else {
            self.keys.push(HeldKey {
                row,
                column,
                held_micros: 0,
                released: false,
            });
        }
    }

    pub fn key_up(&mut self, row: u8, column: u8) {
        let sticky = self.sticky_micros;
        if let Some(i) = self.position(row, column) {
            self.keys[i].released = true;
        }
        self.keys.retain(|k| !(k.released && k.held_micros >= sticky));
    }

    /// Age held keys and drop released ones that have served their time.
    pub fn update(&mut self, micros: u32) {
        let sticky = self.sticky_micros;
        for key in &mut self.keys {
            key.held_micros = key.held_micros.saturating_add(micros);
        }
        self.keys.retain(|k| !(k.released && k.held_micros >= sticky));
    }

    pub fn release_all(&mut self) {
        self.keys.clear();
    }

    #[must_use]
    pub fn is_pressed(&self, row: u8, column: u8) -> bool {
        self.keys.iter().any(|k| k.row == row && k.column == column)
    }

    fn position(&self, row: u8, column: u8) -> Option<usize> {
        self.keys
            .iter()
            .position(|k| k.row == row && k.column == column)
    }
}

impl Default for KeyMatrix {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_pressed() {
        let mut matrix = KeyMatrix::new();
        matrix.set_active_lines(0xFF);
        assert_eq!(matrix.scan_columns(), 0);
    }

    #[test]
    fn only_driven_rows_are_seen() {
        let mut matrix = KeyMatrix::new();
        matrix.key_down(2, 5);
        matrix.set_active_lines(1 << 1);
        assert_eq!(matrix.scan_columns(), 0);
        matrix.set_active_lines(1 << 2);
        assert_eq!(matrix.scan_columns(), 1 << 5);
    }

    #[test]
    fn columns_from_several_rows_combine() {
        let mut matrix = KeyMatrix::new();
        matrix.key_down(0, 0);
        matrix.key_down(3, 7);
        matrix.set_active_lines(0b1001);
        assert_eq!(matrix.scan_columns(), 0x81);
    }

    #[test]
    fn quick_tap_is_held_until_sticky_time() {
        let mut matrix = KeyMatrix::new();
        matrix.key_down(1, 1);
        matrix.update(1_000);
        matrix.key_up(1, 1);
        assert!(matrix.is_pressed(1, 1));
        matrix.update(STICKY_MICROS);
        assert!(!matrix.is_pressed(1, 1));
    }

    #[test]
    fn long_press_releases_immediately() {
        let mut matrix = KeyMatrix::new();
        matrix.key_down(1, 1);
        matrix.update(STICKY_MICROS);
        matrix.key_up(1, 1);
        assert!(!matrix.is_pressed(1, 1));
    }

    #[test]
    fn press_again_cancels_pending_release() {
        let mut matrix = KeyMatrix::new();
        matrix.key_down(4, 2);
        matrix.key_up(4, 2);
        matrix.key_down(4, 2);
        matrix.update(STICKY_MICROS * 2);
        assert!(matrix.is_pressed(4, 2));
    }
}
