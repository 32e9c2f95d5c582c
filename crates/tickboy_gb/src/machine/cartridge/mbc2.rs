use super::{rom_bank_count, CartridgeDevice, ROM_BANK_SIZE};

const RAM_SIZE: usize = 512;

/// MBC2: up to 16 ROM banks and 512 half-bytes of built-in RAM.
pub(super) struct Mbc2 {
    rom: Vec<u8>,
    ram: Vec<u8>,
    rom_banks: usize,
    ram_enabled: bool,
    rom_bank: u8,
}

impl Mbc2 {
    pub(super) fn new(rom: Vec<u8>) -> Self {
        Self {
            rom_banks: rom_bank_count(&rom),
            rom,
            ram: vec![0; RAM_SIZE],
            ram_enabled: false,
            rom_bank: 1,
        }
    }

    fn bank(&self) -> usize {
        self.rom_bank as usize % self.rom_banks
    }
}

impl CartridgeDevice for Mbc2 {
    fn read(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x3FFF => self.rom.get(addr as usize).copied().unwrap_or(0xFF),
            0x4000..=0x7FFF => {
                let index = self.bank() * ROM_BANK_SIZE + (addr as usize - 0x4000);
                self.rom.get(index).copied().unwrap_or(0xFF)
            }
            // Only the low nibble exists; mirrored every 512 bytes.
            0xA000..=0xBFFF if self.ram_enabled => {
                self.ram[addr as usize & (RAM_SIZE - 1)] | 0xF0
            }
            _ => 0xFF,
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        match addr {
            // Address bit 8 picks the register.
            0x0000..=0x3FFF if addr & 0x0100 == 0 => {
                self.ram_enabled = value & 0x0F == 0x0A;
            }
            0x0000..=0x3FFF => {
                self.rom_bank = match value & 0x0F {
                    0 => 1,
                    bank => bank,
                };
            }
            0xA000..=0xBFFF if self.ram_enabled => {
                self.ram[addr as usize & (RAM_SIZE - 1)] = value & 0x0F;
            }
            _ => {}
        }
    }

    fn reset(&mut self) {
        self.ram_enabled = false;
        self.rom_bank = 1;
    }

    fn current_rom_bank(&self) -> usize {
        self.bank()
    }

    fn current_ram_bank(&self) -> usize {
        0
    }

    fn ram_enabled(&self) -> bool {
        self.ram_enabled
    }

    fn ram(&self) -> &[u8] {
        &self.ram
    }

    fn ram_mut(&mut self) -> &mut [u8] {
        &mut self.ram
    }
}
