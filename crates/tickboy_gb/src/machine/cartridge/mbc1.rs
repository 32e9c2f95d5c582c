use super::{rom_bank_count, CartridgeDevice, RAM_BANK_SIZE, ROM_BANK_SIZE};

/// MBC1: 5-bit BANK1, 2-bit BANK2 and a banking-mode flag.
///
/// In mode 0 BANK2 only extends the switchable ROM bank. In mode 1 it
/// also selects the RAM bank and, on 1 MiB+ ROMs, the bank seen at
/// 0000-3FFF.
pub(super) struct Mbc1 {
    rom: Vec<u8>,
    ram: Vec<u8>,
    rom_banks: usize,
    ram_enabled: bool,
    bank1: u8,
    bank2: u8,
    mode: bool,
}

impl Mbc1 {
    pub(super) fn new(rom: Vec<u8>, ram_size: usize) -> Self {
        Self {
            rom_banks: rom_bank_count(&rom),
            rom,
            ram: vec![0; ram_size],
            ram_enabled: false,
            bank1: 1,
            bank2: 0,
            mode: false,
        }
    }

    fn rom0_bank(&self) -> usize {
        if self.mode && self.rom_banks >= 64 {
            ((self.bank2 as usize) << 5) % self.rom_banks
        } else {
            0
        }
    }

    fn romx_bank(&self) -> usize {
        let mut bank = (self.bank1 as usize) | ((self.bank2 as usize) << 5);
        if self.bank1 & 0x1F == 0 {
            bank += 1;
        }
        bank % self.rom_banks
    }

    fn ram_offset(&self, addr: u16) -> Option<usize> {
        if !self.ram_enabled || self.ram.is_empty() {
            return None;
        }
        let offset = addr as usize - 0xA000;
        let index = if self.ram.len() <= RAM_BANK_SIZE {
            offset % self.ram.len()
        } else {
            (self.current_ram_bank() * RAM_BANK_SIZE + offset) % self.ram.len()
        };
        Some(index)
    }

    fn rom_byte(&self, bank: usize, addr: u16) -> u8 {
        let index = bank * ROM_BANK_SIZE + (addr as usize & (ROM_BANK_SIZE - 1));
        self.rom.get(index).copied().unwrap_or(0xFF)
    }
}

impl CartridgeDevice for Mbc1 {
    fn read(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x3FFF => self.rom_byte(self.rom0_bank(), addr),
            0x4000..=0x7FFF => self.rom_byte(self.romx_bank(), addr),
            0xA000..=0xBFFF => self.ram_offset(addr).map_or(0xFF, |i| self.ram[i]),
            _ => 0xFF,
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram_enabled = value & 0x0F == 0x0A,
            0x2000..=0x3FFF => self.bank1 = value & 0x1F,
            0x4000..=0x5FFF => self.bank2 = value & 0x03,
            0x6000..=0x7FFF => self.mode = value & 0x01 != 0,
            0xA000..=0xBFFF => {
                if let Some(i) = self.ram_offset(addr) {
                    self.ram[i] = value;
                }
            }
            _ => {}
        }
    }

    fn reset(&mut self) {
        self.ram_enabled = false;
        self.bank1 = 1;
        self.bank2 = 0;
        self.mode = false;
    }

    fn current_rom_bank(&self) -> usize {
        self.romx_bank()
    }

    fn current_ram_bank(&self) -> usize {
        if self.mode {
            self.bank2 as usize
        } else {
            0
        }
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
