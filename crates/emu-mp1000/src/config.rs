//! MP-1000 configuration.

/// BIOS ROM size.
pub const BIOS_SIZE: usize = 0x0800;
/// Imagination Machine BASIC ROM size.
pub const BASIC_SIZE: usize = 0x2000;
/// Accepted cartridge ROM sizes. Smaller images are mirrored across the
/// 8 KB cartridge window.
pub const CARTRIDGE_SIZES: [usize; 3] = [0x0800, 0x1000, 0x2000];

/// Configuration for creating an MP-1000 instance.
#[derive(Debug, Clone, Default)]
pub struct Mp1000Config {
    /// BIOS image. Must be exactly 2,048 bytes.
    pub bios: Vec<u8>,
    /// BASIC ROM, mapped at $C000-$DFFF when present.
    pub basic: Option<Vec<u8>>,
    /// Cartridge ROM, mapped at $8000-$9FFF when present.
    pub cartridge: Option<Vec<u8>>,
}

impl Mp1000Config {
    /// Check every ROM image has a size the memory map can hold.
    pub fn validate(&self) -> Result<(), String> {
        if self.bios.is_empty() {
            return Err("BIOS ROM is required".to_string());
        }
        if self.bios.len() != BIOS_SIZE {
            return Err(format!(
                "BIOS ROM must be exactly {BIOS_SIZE} bytes, got {}",
                self.bios.len()
            ));
        }
        if let Some(basic) = &self.basic {
            if basic.len() != BASIC_SIZE {
                return Err(format!(
                    "BASIC ROM must be exactly {BASIC_SIZE} bytes, got {}",
                    basic.len()
                ));
            }
        }
        if let Some(cartridge) = &self.cartridge {
            validate_cartridge(cartridge)?;
        }
        Ok(())
    }
}

pub(crate) fn validate_cartridge(data: &[u8]) -> Result<(), String> {
    if CARTRIDGE_SIZES.contains(&data.len()) {
        Ok(())
    } else {
        Err(format!(
            "cartridge ROM must be 2048, 4096 or 8192 bytes, got {}",
            data.len()
        ))
    }
}
