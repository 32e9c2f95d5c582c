use crate::cpu::interrupts::IF_ADDRESS;
use crate::machine::dma::DMA;
use crate::machine::joypad::P1;
use crate::machine::ppu::{LCDC, WX};
use crate::machine::serial::{SB, SC};
use crate::machine::timer::{DIV, TAC};

use super::GameBoyBus;

impl GameBoyBus {
    /// Address decode without DMA blocking or PPU gating.
    pub(super) fn read_raw(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x7FFF | 0xA000..=0xBFFF => {
                self.cartridge.as_ref().map_or(0xFF, |cart| cart.read(addr))
            }
            0x8000..=0x9FFF => self.ppu.vram_read(addr),
            0xC000..=0xDFFF => self.wram[(addr - 0xC000) as usize],
            0xE000..=0xFDFF => self.wram[(addr - 0xE000) as usize],
            0xFE00..=0xFE9F => self.ppu.oam_read(addr),
            0xFEA0..=0xFEFF => 0xFF,
            0xFF00..=0xFF7F => self.read_io(addr),
            0xFF80..=0xFFFE => self.hram[(addr - 0xFF80) as usize],
            0xFFFF => self.interrupts.ie(),
        }
    }

    pub(super) fn write_raw(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x7FFF | 0xA000..=0xBFFF => {
                if let Some(cart) = self.cartridge.as_mut() {
                    cart.write(addr, value);
                }
            }
            0x8000..=0x9FFF => self.ppu.vram_write(addr, value),
            0xC000..=0xDFFF => self.wram[(addr - 0xC000) as usize] = value,
            0xE000..=0xFDFF => self.wram[(addr - 0xE000) as usize] = value,
            0xFE00..=0xFE9F => self.ppu.oam_write(addr, value),
            0xFEA0..=0xFEFF => {}
            0xFF00..=0xFF7F => self.write_io(addr, value),
            0xFF80..=0xFFFE => self.hram[(addr - 0xFF80) as usize] = value,
            0xFFFF => self.interrupts.set_ie(value),
        }
    }

    fn read_io(&self, addr: u16) -> u8 {
        match addr {
            P1 => self.joypad.read(),
            SB | SC => self.serial.read(addr),
            DIV..=TAC => self.timer.read(addr),
            IF_ADDRESS => self.interrupts.read_if(),
            0xFF10..=0xFF3F => self.apu.read(addr),
            DMA => self.dma.register(),
            LCDC..=WX => self.ppu.read_register(addr),
            _ => self.io[(addr & 0x7F) as usize],
        }
    }

    fn write_io(&mut self, addr: u16, value: u8) {
        match addr {
            P1 => self.joypad.write(value),
            SB | SC => self.serial.write(addr, value, &mut self.interrupts),
            DIV..=TAC => self.timer.write(addr, value),
            IF_ADDRESS => self.interrupts.write_if(value),
            0xFF10..=0xFF3F => self.apu.write(addr, value),
            DMA => self.dma.start(value),
            LCDC..=WX => self.ppu.write_register(addr, value, &mut self.interrupts),
            _ => self.io[(addr & 0x7F) as usize] = value,
        }
    }
}
