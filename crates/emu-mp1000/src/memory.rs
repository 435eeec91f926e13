//! MP-1000 memory.
//!
//! The CPU and the VDG see memory through separate page tables of 256-byte
//! pages. Each page resolves to RAM, one of the ROM images, or nothing.
//!
//! # CPU map
//!
//! | Range       | Contents                                   |
//! |-------------|--------------------------------------------|
//! | $0000-$1FFF | 1 KB core RAM, mirrored every $400         |
//! | $2000-$3FFF | PIA-1 (decoded by the system)              |
//! | $4000-$5FFF | 2 KB BIOS, mirrored                        |
//! | $6000-$67FF | PIA-2 and external I/O (decoded by the system) |
//! | $8000-$9FFF | cartridge, mirrored when under 8 KB        |
//! | $A000-$BFFF | 8 KB expansion RAM                         |
//! | $C000-$DFFF | BASIC ROM                                  |
//! | $F800-$FFFF | BIOS (vectors)                             |
//!
//! # VDG map
//!
//! The VDG's 13-bit address space wraps over core RAM starting at $0200,
//! the 512-byte alphanumeric screen.

use crate::config::{BASIC_SIZE, BIOS_SIZE};

pub const CORE_RAM_SIZE: usize = 0x0400;
pub const EXPANSION_RAM_SIZE: usize = 0x2000;

/// Start of the alphanumeric screen in core RAM.
pub const SCREEN_START: usize = 0x0200;

const PAGE_SIZE: usize = 0x100;
const PAGES: usize = 0x100;

/// Addresses below this are reduced modulo the core RAM size.
const CORE_MIRROR_END: u16 = 0x2000;

/// Expansion RAM follows core RAM in the RAM buffer.
const EXPANSION_OFFSET: usize = CORE_RAM_SIZE;

/// Mask applied to VDG addresses.
const VDG_ADDR_MASK: u16 = 0x1FFF;

/// ROM images a page can point into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rom {
    Bios,
    Basic,
    Cartridge,
}

/// What one page resolves to. Offsets are to the start of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Unmapped,
    Ram(usize),
    Rom(Rom, usize),
}

/// A resolved address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Unmapped,
    Ram(usize),
    Rom(Rom, usize),
}

/// 256 pages of 256 bytes.
#[derive(Debug, Clone)]
pub struct MemoryMap {
    pages: [Page; PAGES],
}

impl MemoryMap {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pages: [Page::Unmapped; PAGES],
        }
    }

    /// Map `len` bytes at `addr` to RAM starting at `offset`.
    pub fn map_ram(&mut self, addr: u16, len: usize, offset: usize) {
        for (i, page) in self.page_range(addr, len).enumerate() {
            self.pages[page] = Page::Ram(offset + i * PAGE_SIZE);
        }
    }

    /// Map `len` bytes at `addr` to a ROM image of `rom_len` bytes,
    /// repeating the image if the window is larger.
    pub fn map_rom(&mut self, addr: u16, len: usize, rom: Rom, rom_len: usize) {
        for (i, page) in self.page_range(addr, len).enumerate() {
            self.pages[page] = Page::Rom(rom, (i * PAGE_SIZE) % rom_len);
        }
    }

    pub fn unmap(&mut self, addr: u16, len: usize) {
        for page in self.page_range(addr, len) {
            self.pages[page] = Page::Unmapped;
        }
    }

    fn page_range(&self, addr: u16, len: usize) -> std::ops::Range<usize> {
        assert!(
            usize::from(addr) % PAGE_SIZE == 0 && len % PAGE_SIZE == 0,
            "mapping ${addr:04X}+{len:#X} is not page aligned"
        );
        let first = usize::from(addr) / PAGE_SIZE;
        first..(first + len / PAGE_SIZE).min(self.pages.len())
    }

    #[must_use]
    pub fn lookup(&self, addr: u16) -> Target {
        let offset = usize::from(addr) % PAGE_SIZE;
        match self.pages[usize::from(addr) / PAGE_SIZE] {
            Page::Unmapped => Target::Unmapped,
            Page::Ram(base) => Target::Ram(base + offset),
            Page::Rom(rom, base) => Target::Rom(rom, base + offset),
        }
    }
}

impl Default for MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

/// RAM, ROM images and the two page tables.
pub struct Memory {
    /// Core RAM followed by expansion RAM.
    ram: Vec<u8>,
    bios: Vec<u8>,
    basic: Option<Vec<u8>>,
    cartridge: Option<Vec<u8>>,
    cpu_map: MemoryMap,
    vdg_map: MemoryMap,
}

impl Memory {
    /// Build the memory maps. Image sizes must already be validated.
    #[must_use]
    pub fn new(bios: &[u8], basic: Option<&[u8]>) -> Self {
        let mut memory = Self {
            ram: vec![0; CORE_RAM_SIZE + EXPANSION_RAM_SIZE],
            bios: bios.to_vec(),
            basic: basic.map(<[u8]>::to_vec),
            cartridge: None,
            cpu_map: MemoryMap::new(),
            vdg_map: MemoryMap::new(),
        };
        memory.build_maps();
        memory
    }

    fn build_maps(&mut self) {
        let cpu = &mut self.cpu_map;
        *cpu = MemoryMap::new();
        cpu.map_ram(0x0000, CORE_RAM_SIZE, 0);
        cpu.map_rom(0x4000, 0x2000, Rom::Bios, BIOS_SIZE);
        cpu.map_ram(0xA000, EXPANSION_RAM_SIZE, EXPANSION_OFFSET);
        cpu.map_rom(0xF800, BIOS_SIZE, Rom::Bios, BIOS_SIZE);
        if self.basic.is_some() {
            cpu.map_rom(0xC000, BASIC_SIZE, Rom::Basic, BASIC_SIZE);
        }
        if let Some(cartridge) = &self.cartridge {
            cpu.map_rom(0x8000, 0x2000, Rom::Cartridge, cartridge.len());
        }

        let vdg = &mut self.vdg_map;
        *vdg = MemoryMap::new();
        for page in 0..(usize::from(VDG_ADDR_MASK) + 1) / PAGE_SIZE {
            let offset = (SCREEN_START + page * PAGE_SIZE) % CORE_RAM_SIZE;
            vdg.map_ram((page * PAGE_SIZE) as u16, PAGE_SIZE, offset);
        }
    }

    /// Replace the cartridge and remap. Size must already be validated.
    pub fn set_cartridge(&mut self, cartridge: Option<Vec<u8>>) {
        self.cartridge = cartridge;
        self.build_maps();
    }

    #[must_use]
    pub fn has_cartridge(&self) -> bool {
        self.cartridge.is_some()
    }

    fn cpu_target(&self, addr: u16) -> Target {
        let addr = if addr < CORE_MIRROR_END {
            addr % CORE_RAM_SIZE as u16
        } else {
            addr
        };
        self.cpu_map.lookup(addr)
    }

    fn rom(&self, rom: Rom) -> &[u8] {
        match rom {
            Rom::Bios => &self.bios,
            Rom::Basic => self.basic.as_deref().unwrap_or_default(),
            Rom::Cartridge => self.cartridge.as_deref().unwrap_or_default(),
        }
    }

    fn read_target(&self, target: Target) -> u8 {
        match target {
            Target::Unmapped => 0xFF,
            Target::Ram(offset) => self.ram[offset],
            Target::Rom(rom, offset) => self.rom(rom).get(offset).copied().unwrap_or(0xFF),
        }
    }

    /// CPU read.
    #[must_use]
    pub fn read(&self, addr: u16) -> u8 {
        self.read_target(self.cpu_target(addr))
    }

    /// CPU write.
    ///
    /// # Panics
    ///
    /// Panics on a write to ROM.
    pub fn write(&mut self, addr: u16, value: u8) {
        match self.cpu_target(addr) {
            Target::Ram(offset) => self.ram[offset] = value,
            Target::Unmapped => {
                log::warn!("mp1000: write {value:#04X} to unmapped ${addr:04X}");
            }
            Target::Rom(rom, _) => panic!("mp1000: write {value:#04X} to {rom:?} ROM at ${addr:04X}"),
        }
    }

    /// VDG display fetch.
    #[must_use]
    pub fn vdg_read(&self, addr: u16) -> u8 {
        self.read_target(self.vdg_map.lookup(addr & VDG_ADDR_MASK))
    }

    /// Core and expansion RAM, for inspection.
    #[must_use]
    pub fn ram(&self) -> &[u8] {
        &self.ram
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory() -> Memory {
        let mut bios = vec![0u8; BIOS_SIZE];
        bios[0] = 0xB1;
        bios[BIOS_SIZE - 1] = 0xB2;
        Memory::new(&bios, None)
    }

    #[test]
    fn core_ram_mirrors_every_1k() {
        let mut mem = memory();
        mem.write(0x0012, 0x5A);
        for base in (0..0x2000u16).step_by(0x400) {
            assert_eq!(mem.read(base + 0x12), 0x5A, "mirror at ${base:04X}");
        }
        mem.write(0x1C34, 0xA5);
        assert_eq!(mem.read(0x0034), 0xA5);
    }

    #[test]
    fn bios_at_both_windows() {
        let mem = memory();
        assert_eq!(mem.read(0x4000), 0xB1);
        assert_eq!(mem.read(0x4800), 0xB1);
        assert_eq!(mem.read(0xF800), 0xB1);
        assert_eq!(mem.read(0xFFFF), 0xB2);
    }

    #[test]
    fn expansion_ram_is_separate_from_core() {
        let mut mem = memory();
        mem.write(0xA000, 0x11);
        mem.write(0x0000, 0x22);
        assert_eq!(mem.read(0xA000), 0x11);
        assert_eq!(mem.read(0xBFFF), 0x00);
        assert_eq!(mem.read(0x0000), 0x22);
    }

    #[test]
    fn unmapped_reads_ff_and_ignores_writes() {
        let mut mem = memory();
        assert_eq!(mem.read(0x8000), 0xFF);
        assert_eq!(mem.read(0xC000), 0xFF);
        mem.write(0x8000, 0x00);
        assert_eq!(mem.read(0x8000), 0xFF);
    }

    #[test]
    #[should_panic(expected = "Bios ROM")]
    fn rom_write_panics() {
        let mut mem = memory();
        mem.write(0xF800, 0x00);
    }

    #[test]
    fn small_cartridge_is_mirrored() {
        let mut mem = memory();
        let mut cart = vec![0u8; 0x800];
        cart[0] = 0xCA;
        mem.set_cartridge(Some(cart));
        for base in (0x8000..0xA000u16).step_by(0x800) {
            assert_eq!(mem.read(base), 0xCA);
        }
        mem.set_cartridge(None);
        assert_eq!(mem.read(0x8000), 0xFF);
    }

    #[test]
    fn basic_maps_at_c000() {
        let mut basic = vec![0u8; BASIC_SIZE];
        basic[0x1FFF] = 0xBA;
        let mem = Memory::new(&[0; BIOS_SIZE], Some(basic.as_slice()));
        assert_eq!(mem.read(0xDFFF), 0xBA);
    }

    #[test]
    fn vdg_sees_screen_ram() {
        let mut mem = memory();
        mem.write(SCREEN_START as u16, 0x41);
        mem.write(0x03FF, 0x42);
        mem.write(0x0000, 0x43);
        assert_eq!(mem.vdg_read(0x0000), 0x41);
        assert_eq!(mem.vdg_read(0x01FF), 0x42);
        assert_eq!(mem.vdg_read(0x0200), 0x43);
        assert_eq!(mem.vdg_read(0x0400), 0x41);
    }

    #[test]
    fn page_lookup() {
        let mut map = MemoryMap::new();
        map.map_ram(0x1000, 0x200, 0x40);
        assert_eq!(map.lookup(0x1000), Target::Ram(0x40));
        assert_eq!(map.lookup(0x11FF), Target::Ram(0x23F));
        assert_eq!(map.lookup(0x1200), Target::Unmapped);
        map.unmap(0x1100, 0x100);
        assert_eq!(map.lookup(0x1100), Target::Unmapped);
    }
}
