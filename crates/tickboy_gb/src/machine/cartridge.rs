//! Cartridge image plus its memory bank controller.

mod header;
mod mbc0;
mod mbc1;
mod mbc2;
mod mbc3;
mod rtc;

pub use header::{CartridgeHeader, CartridgeType, Mbc, NINTENDO_LOGO};
pub use rtc::{RtcClock, SystemClock};

use crate::error::CartridgeError;

use self::mbc0::Mbc0;
use self::mbc1::Mbc1;
use self::mbc2::Mbc2;
use self::mbc3::Mbc3;

pub(crate) const ROM_BANK_SIZE: usize = 0x4000;
pub(crate) const RAM_BANK_SIZE: usize = 0x2000;

/// Bus-facing side of a bank controller.
pub trait CartridgeDevice: Send {
    fn read(&self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, value: u8);

    fn accepts(&self, addr: u16) -> bool {
        matches!(addr, 0x0000..=0x7FFF | 0xA000..=0xBFFF)
    }

    /// Power-on banking state. RAM contents are kept.
    fn reset(&mut self);

    /// Bank currently mapped at 4000-7FFF.
    fn current_rom_bank(&self) -> usize;
    fn current_ram_bank(&self) -> usize;
    fn ram_enabled(&self) -> bool;

    /// External RAM contents, empty when the cartridge has none.
    fn ram(&self) -> &[u8];
    fn ram_mut(&mut self) -> &mut [u8];
}

/// ROM-bank count actually present in `rom`, at least 2.
pub(crate) fn rom_bank_count(rom: &[u8]) -> usize {
    (rom.len() / ROM_BANK_SIZE).max(2)
}

pub struct Cartridge {
    header: CartridgeHeader,
    device: Box<dyn CartridgeDevice>,
}

impl std::fmt::Debug for Cartridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cartridge")
            .field("header", &self.header)
            .field("rom_bank", &self.device.current_rom_bank())
            .finish_non_exhaustive()
    }
}

impl Cartridge {
    /// Validate the header and build the matching controller. MBC3 timers
    /// follow the host's wall clock.
    pub fn from_rom(rom: Vec<u8>) -> Result<Self, CartridgeError> {
        Self::with_clock(rom, Box::new(SystemClock))
    }

    /// Like [`Cartridge::from_rom`] with an explicit time source for the
    /// MBC3 real-time clock.
    pub fn with_clock(rom: Vec<u8>, clock: Box<dyn RtcClock>) -> Result<Self, CartridgeError> {
        let header = CartridgeHeader::parse(&rom)?;
        let kind = header.cartridge_type;
        let ram_size = if kind.ram { header.ram_size } else { 0 };

        let device: Box<dyn CartridgeDevice> = match kind.mbc {
            Mbc::RomOnly => Box::new(Mbc0::new(rom, ram_size)),
            Mbc::Mbc1 => Box::new(Mbc1::new(rom, ram_size)),
            Mbc::Mbc2 => Box::new(Mbc2::new(rom)),
            Mbc::Mbc3 => {
                let clock = kind.rtc.then_some(clock);
                Box::new(Mbc3::new(rom, ram_size, clock))
            }
            _ => return Err(CartridgeError::Unsupported(kind.name())),
        };

        log::debug!(
            "cartridge {:?}: {} rom={}K ram={}K",
            header.title,
            kind.name(),
            header.rom_size / 1024,
            ram_size / 1024
        );
        Ok(Self { header, device })
    }

    #[inline]
    pub fn header(&self) -> &CartridgeHeader {
        &self.header
    }

    #[inline]
    pub fn title(&self) -> &str {
        &self.header.title
    }

    #[inline]
    pub fn read(&self, addr: u16) -> u8 {
        self.device.read(addr)
    }

    #[inline]
    pub fn write(&mut self, addr: u16, value: u8) {
        self.device.write(addr, value);
    }

    #[inline]
    pub fn accepts(&self, addr: u16) -> bool {
        self.device.accepts(addr)
    }

    pub fn reset(&mut self) {
        self.device.reset();
    }

    pub fn current_rom_bank(&self) -> usize {
        self.device.current_rom_bank()
    }

    pub fn current_ram_bank(&self) -> usize {
        self.device.current_ram_bank()
    }

    pub fn ram_enabled(&self) -> bool {
        self.device.ram_enabled()
    }

    pub fn has_battery(&self) -> bool {
        self.header.cartridge_type.battery
    }

    pub fn has_rtc(&self) -> bool {
        self.header.cartridge_type.rtc
    }

    /// Battery-backed RAM image; empty for cartridges without a battery.
    pub fn save_data(&self) -> Vec<u8> {
        if self.has_battery() {
            self.device.ram().to_vec()
        } else {
            Vec::new()
        }
    }

    pub fn load_save_data(&mut self, data: &[u8]) -> Result<(), CartridgeError> {
        let ram = self.device.ram_mut();
        if ram.len() != data.len() {
            return Err(CartridgeError::SaveSizeMismatch {
                expected: ram.len(),
                actual: data.len(),
            });
        }
        ram.copy_from_slice(data);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory ROM images with valid headers.

    use super::header::{header_checksum, NINTENDO_LOGO};

    pub fn build_rom(cart_type: u8, rom_code: u8, ram_code: u8) -> Vec<u8> {
        let size = 0x8000usize << rom_code.min(8);
        let mut rom = vec![0u8; size];
        // Tag each bank with its number so banking is observable.
        for (bank, chunk) in rom.chunks_mut(0x4000).enumerate() {
            chunk[0] = bank as u8;
            chunk[1] = (bank >> 8) as u8;
        }
        rom[0x0104..0x0134].copy_from_slice(&NINTENDO_LOGO);
        rom[0x0134..0x0134 + 6].copy_from_slice(b"TICKER");
        rom[0x0147] = cart_type;
        rom[0x0148] = rom_code;
        rom[0x0149] = ram_code;
        rom[0x014D] = header_checksum(&rom);
        rom
    }
}
