use super::CartridgeDevice;

/// No controller: 32 KiB of ROM and optional, always-enabled RAM.
pub(super) struct Mbc0 {
    rom: Vec<u8>,
    ram: Vec<u8>,
}

impl Mbc0 {
    pub(super) fn new(rom: Vec<u8>, ram_size: usize) -> Self {
        Self {
            rom,
            ram: vec![0; ram_size],
        }
    }
}

impl CartridgeDevice for Mbc0 {
    fn read(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x7FFF => self.rom.get(addr as usize).copied().unwrap_or(0xFF),
            0xA000..=0xBFFF if !self.ram.is_empty() => {
                self.ram[(addr as usize - 0xA000) % self.ram.len()]
            }
            _ => 0xFF,
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        if let 0xA000..=0xBFFF = addr {
            if !self.ram.is_empty() {
                let len = self.ram.len();
                self.ram[(addr as usize - 0xA000) % len] = value;
            }
        }
    }

    fn reset(&mut self) {}

    fn current_rom_bank(&self) -> usize {
        1
    }

    fn current_ram_bank(&self) -> usize {
        0
    }

    fn ram_enabled(&self) -> bool {
        !self.ram.is_empty()
    }

    fn ram(&self) -> &[u8] {
        &self.ram
    }

    fn ram_mut(&mut self) -> &mut [u8] {
        &mut self.ram
    }
}
