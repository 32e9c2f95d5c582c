use super::rtc::{Rtc, RtcClock, RTC_FIRST, RTC_LAST};
use super::{rom_bank_count, CartridgeDevice, RAM_BANK_SIZE, ROM_BANK_SIZE};

/// MBC3: 7-bit ROM bank, four RAM banks and an optional real-time clock
/// mapped into the RAM window.
pub(super) struct Mbc3 {
    rom: Vec<u8>,
    ram: Vec<u8>,
    rom_banks: usize,
    ram_enabled: bool,
    rom_bank: u8,
    /// 00-07 selects a RAM bank, 08-0C an RTC register.
    select: u8,
    latch_last: u8,
    rtc: Option<Rtc>,
}

impl Mbc3 {
    pub(super) fn new(rom: Vec<u8>, ram_size: usize, clock: Option<Box<dyn RtcClock>>) -> Self {
        Self {
            rom_banks: rom_bank_count(&rom),
            rom,
            ram: vec![0; ram_size],
            ram_enabled: false,
            rom_bank: 1,
            select: 0,
            latch_last: 0xFF,
            rtc: clock.map(Rtc::new),
        }
    }

    fn bank(&self) -> usize {
        self.rom_bank as usize % self.rom_banks
    }

    fn ram_index(&self, addr: u16) -> Option<usize> {
        if self.ram.is_empty() {
            return None;
        }
        let offset = addr as usize - 0xA000;
        Some((self.select as usize * RAM_BANK_SIZE + offset) % self.ram.len())
    }
}

impl CartridgeDevice for Mbc3 {
    fn read(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x3FFF => self.rom.get(addr as usize).copied().unwrap_or(0xFF),
            0x4000..=0x7FFF => {
                let index = self.bank() * ROM_BANK_SIZE + (addr as usize - 0x4000);
                self.rom.get(index).copied().unwrap_or(0xFF)
            }
            0xA000..=0xBFFF if self.ram_enabled => match self.select {
                0x00..=0x07 => self.ram_index(addr).map_or(0xFF, |i| self.ram[i]),
                RTC_FIRST..=RTC_LAST => self.rtc.as_ref().map_or(0xFF, |rtc| rtc.read(self.select)),
                _ => 0xFF,
            },
            _ => 0xFF,
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram_enabled = value & 0x0F == 0x0A,
            0x2000..=0x3FFF => {
                self.rom_bank = match value & 0x7F {
                    0 => 1,
                    bank => bank,
                };
            }
            0x4000..=0x5FFF => self.select = value,
            0x6000..=0x7FFF => {
                if self.latch_last == 0x00 && value == 0x01 {
                    if let Some(rtc) = self.rtc.as_mut() {
                        rtc.latch();
                    }
                }
                self.latch_last = value;
            }
            0xA000..=0xBFFF if self.ram_enabled => match self.select {
                0x00..=0x07 => {
                    if let Some(i) = self.ram_index(addr) {
                        self.ram[i] = value;
                    }
                }
                RTC_FIRST..=RTC_LAST => {
                    let select = self.select;
                    if let Some(rtc) = self.rtc.as_mut() {
                        rtc.write(select, value);
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }

    fn reset(&mut self) {
        self.ram_enabled = false;
        self.rom_bank = 1;
        self.select = 0;
        self.latch_last = 0xFF;
    }

    fn current_rom_bank(&self) -> usize {
        self.bank()
    }

    fn current_ram_bank(&self) -> usize {
        (self.select & 0x07) as usize
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
