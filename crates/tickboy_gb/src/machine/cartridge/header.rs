//! Cartridge header (0x0100-0x014F) parsing and validation.

use crate::error::CartridgeError;

/// Smallest image we accept: two 16 KiB banks.
pub const MIN_ROM_SIZE: usize = 0x8000;
pub const HEADER_END: usize = 0x0150;

const LOGO_START: usize = 0x0104;
const TITLE_START: usize = 0x0134;
const CGB_FLAG: usize = 0x0143;
const CART_TYPE: usize = 0x0147;
const ROM_SIZE: usize = 0x0148;
const RAM_SIZE: usize = 0x0149;
const VERSION: usize = 0x014C;
const HEADER_CHECKSUM: usize = 0x014D;
const GLOBAL_CHECKSUM: usize = 0x014E;

pub const NINTENDO_LOGO: [u8; 48] = [
    0xCE, 0xED, 0x66, 0x66, 0xCC, 0x0D, 0x00, 0x0B, 0x03, 0x73, 0x00, 0x83, 0x00, 0x0C, 0x00, 0x0D,
    0x00, 0x08, 0x11, 0x1F, 0x88, 0x89, 0x00, 0x0E, 0xDC, 0xCC, 0x6E, 0xE6, 0xDD, 0xDD, 0xD9, 0x99,
    0xBB, 0xBB, 0x67, 0x63, 0x6E, 0x0E, 0xEC, 0xCC, 0xDD, 0xDC, 0x99, 0x9F, 0xBB, 0xB9, 0x33, 0x3E,
];

/// Memory bank controller family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mbc {
    RomOnly,
    Mbc1,
    Mbc2,
    Mbc3,
    Mbc5,
    Mbc6,
    Mbc7,
    Mmm01,
    PocketCamera,
    Tama5,
    HuC3,
    HuC1,
}

/// Decoded cartridge type byte (0x0147).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CartridgeType {
    pub code: u8,
    pub mbc: Mbc,
    pub ram: bool,
    pub battery: bool,
    pub rtc: bool,
    pub rumble: bool,
}

impl CartridgeType {
    const fn new(code: u8, mbc: Mbc, ram: bool, battery: bool, rtc: bool, rumble: bool) -> Self {
        Self {
            code,
            mbc,
            ram,
            battery,
            rtc,
            rumble,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        use Mbc::*;
        let t = match code {
            0x00 => Self::new(code, RomOnly, false, false, false, false),
            0x01 => Self::new(code, Mbc1, false, false, false, false),
            0x02 => Self::new(code, Mbc1, true, false, false, false),
            0x03 => Self::new(code, Mbc1, true, true, false, false),
            0x05 => Self::new(code, Mbc2, false, false, false, false),
            0x06 => Self::new(code, Mbc2, false, true, false, false),
            0x08 => Self::new(code, RomOnly, true, false, false, false),
            0x09 => Self::new(code, RomOnly, true, true, false, false),
            0x0B => Self::new(code, Mmm01, false, false, false, false),
            0x0C => Self::new(code, Mmm01, true, false, false, false),
            0x0D => Self::new(code, Mmm01, true, true, false, false),
            0x0F => Self::new(code, Mbc3, false, true, true, false),
            0x10 => Self::new(code, Mbc3, true, true, true, false),
            0x11 => Self::new(code, Mbc3, false, false, false, false),
            0x12 => Self::new(code, Mbc3, true, false, false, false),
            0x13 => Self::new(code, Mbc3, true, true, false, false),
            0x19 => Self::new(code, Mbc5, false, false, false, false),
            0x1A => Self::new(code, Mbc5, true, false, false, false),
            0x1B => Self::new(code, Mbc5, true, true, false, false),
            0x1C => Self::new(code, Mbc5, false, false, false, true),
            0x1D => Self::new(code, Mbc5, true, false, false, true),
            0x1E => Self::new(code, Mbc5, true, true, false, true),
            0x20 => Self::new(code, Mbc6, false, false, false, false),
            0x22 => Self::new(code, Mbc7, true, true, false, true),
            0xFC => Self::new(code, PocketCamera, false, false, false, false),
            0xFD => Self::new(code, Tama5, false, false, false, false),
            0xFE => Self::new(code, HuC3, false, false, false, false),
            0xFF => Self::new(code, HuC1, true, true, false, false),
            _ => return None,
        };
        Some(t)
    }

    pub fn name(&self) -> &'static str {
        match self.mbc {
            Mbc::RomOnly => "ROM",
            Mbc::Mbc1 => "MBC1",
            Mbc::Mbc2 => "MBC2",
            Mbc::Mbc3 => "MBC3",
            Mbc::Mbc5 => "MBC5",
            Mbc::Mbc6 => "MBC6",
            Mbc::Mbc7 => "MBC7",
            Mbc::Mmm01 => "MMM01",
            Mbc::PocketCamera => "POCKET CAMERA",
            Mbc::Tama5 => "BANDAI TAMA5",
            Mbc::HuC3 => "HuC3",
            Mbc::HuC1 => "HuC1",
        }
    }
}

/// ROM size in bytes for header code 0x0148.
pub fn rom_size_for_code(code: u8) -> Option<usize> {
    const BANK: usize = 0x4000;
    match code {
        0x00..=0x08 => Some(MIN_ROM_SIZE << code),
        0x52 => Some(72 * BANK),
        0x53 => Some(80 * BANK),
        0x54 => Some(96 * BANK),
        _ => None,
    }
}

/// External RAM size in bytes for header code 0x0149.
pub fn ram_size_for_code(code: u8) -> Option<usize> {
    match code {
        0x00 | 0x01 => Some(0),
        0x02 => Some(0x2000),
        0x03 => Some(0x8000),
        0x04 => Some(0x20000),
        0x05 => Some(0x10000),
        _ => None,
    }
}

/// `x = x - byte - 1` over 0x0134..=0x014C.
pub fn header_checksum(rom: &[u8]) -> u8 {
    rom[TITLE_START..=VERSION]
        .iter()
        .fold(0u8, |acc, b| acc.wrapping_sub(*b).wrapping_sub(1))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartridgeHeader {
    pub title: String,
    pub cgb_flag: u8,
    pub cartridge_type: CartridgeType,
    pub rom_size: usize,
    pub ram_size: usize,
    pub version: u8,
    pub header_checksum: u8,
    pub global_checksum: u16,
}

impl CartridgeHeader {
    pub fn parse(rom: &[u8]) -> Result<Self, CartridgeError> {
        if rom.len() < HEADER_END || rom.len() < MIN_ROM_SIZE {
            return Err(CartridgeError::TooSmall {
                len: rom.len(),
                min: MIN_ROM_SIZE,
            });
        }

        let expected = rom[HEADER_CHECKSUM];
        let computed = header_checksum(rom);
        if expected != computed {
            return Err(CartridgeError::HeaderChecksum { expected, computed });
        }

        if rom[LOGO_START..LOGO_START + NINTENDO_LOGO.len()] != NINTENDO_LOGO {
            return Err(CartridgeError::InvalidLogo);
        }

        let type_code = rom[CART_TYPE];
        let cartridge_type =
            CartridgeType::from_code(type_code).ok_or(CartridgeError::UnknownType(type_code))?;
        let rom_size = rom_size_for_code(rom[ROM_SIZE])
            .ok_or(CartridgeError::UnknownRomSize(rom[ROM_SIZE]))?;
        let ram_size = ram_size_for_code(rom[RAM_SIZE])
            .ok_or(CartridgeError::UnknownRamSize(rom[RAM_SIZE]))?;

        let cgb_flag = rom[CGB_FLAG];
        let title_len = if cgb_flag & 0x80 != 0 { 11 } else { 15 };
        let title = rom[TITLE_START..TITLE_START + title_len]
            .iter()
            .take_while(|&&b| b != 0)
            .map(|&b| b as char)
            .collect::<String>()
            .trim_end()
            .to_string();

        Ok(Self {
            title,
            cgb_flag,
            cartridge_type,
            rom_size,
            ram_size,
            version: rom[VERSION],
            header_checksum: expected,
            global_checksum: u16::from_be_bytes([rom[GLOBAL_CHECKSUM], rom[GLOBAL_CHECKSUM + 1]]),
        })
    }
}
