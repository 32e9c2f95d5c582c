use crate::cpu::interrupts::InterruptController;
use crate::cpu::Bus;

use super::cartridge::Cartridge;
use super::dma::Dma;
use super::joypad::Joypad;
use super::ppu::Ppu;
use super::scheduler::Scheduler;
use super::serial::Serial;
use super::timer::Timer;

mod apu;
mod init;
mod mmio;

const WRAM_SIZE: usize = 0x2000;
const HRAM_SIZE: usize = 0x7F;
const IO_SIZE: usize = 0x80;

/// Owns every device on the address bus and the master clock.
///
/// The CPU is the only driver: each of its M-cycles calls [`Bus::tick`],
/// which advances the clock and then Timer, PPU and DMA in that order.
pub(crate) struct GameBoyBus {
    pub(crate) interrupts: InterruptController,
    pub(crate) timer: Timer,
    pub(crate) ppu: Ppu,
    pub(crate) dma: Dma,
    pub(crate) joypad: Joypad,
    pub(crate) serial: Serial,
    pub(crate) clock: Scheduler,
    cartridge: Option<Cartridge>,
    wram: Box<[u8; WRAM_SIZE]>,
    hram: [u8; HRAM_SIZE],
    /// Backing store for I/O addresses no device claims.
    io: [u8; IO_SIZE],
    apu: apu::ApuRegisters,
    seed_ram: bool,
}

impl GameBoyBus {
    pub(crate) fn new(seed_ram: bool) -> Self {
        let mut bus = Self {
            interrupts: InterruptController::default(),
            timer: Timer::default(),
            ppu: Ppu::default(),
            dma: Dma::default(),
            joypad: Joypad::default(),
            serial: Serial::default(),
            clock: Scheduler::default(),
            cartridge: None,
            wram: Box::new([0; WRAM_SIZE]),
            hram: [0; HRAM_SIZE],
            io: [0xFF; IO_SIZE],
            apu: apu::ApuRegisters::default(),
            seed_ram,
        };
        bus.apply_post_boot_state();
        bus
    }

    /// Power-cycle every device. The cartridge stays inserted but its
    /// mapper registers return to their defaults; the input provider,
    /// serial listener and pacing setting survive.
    pub(crate) fn reset(&mut self) {
        self.interrupts.reset();
        self.timer.reset();
        self.ppu.reset();
        self.dma.reset();
        self.joypad.reset();
        self.serial.reset();
        self.clock.reset();
        if let Some(cart) = self.cartridge.as_mut() {
            cart.reset();
        }
        self.io = [0xFF; IO_SIZE];
        self.apu = apu::ApuRegisters::default();
        self.apply_post_boot_state();
    }

    pub(crate) fn insert_cartridge(&mut self, cartridge: Cartridge) {
        self.cartridge = Some(cartridge);
    }

    #[inline]
    pub(crate) fn cartridge(&self) -> Option<&Cartridge> {
        self.cartridge.as_ref()
    }

    #[inline]
    pub(crate) fn cartridge_mut(&mut self) -> Option<&mut Cartridge> {
        self.cartridge.as_mut()
    }

    /// Little-endian 16-bit read made of two 8-bit accesses. No time passes.
    pub(crate) fn read16(&mut self, addr: u16) -> u16 {
        let lo = self.read8(addr);
        let hi = self.read8(addr.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    pub(crate) fn write16(&mut self, addr: u16, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.write8(addr, lo);
        self.write8(addr.wrapping_add(1), hi);
    }

    #[inline]
    fn is_hram(addr: u16) -> bool {
        (0xFF80..=0xFFFE).contains(&addr)
    }

    /// Copy every OAM DMA byte that has come due.
    fn run_dma(&mut self) {
        while let Some((source, index)) = self.dma.next_transfer() {
            // Sources at E000 and above read the WRAM echo.
            let source = if source >= 0xE000 { source - 0x2000 } else { source };
            let value = self.read_raw(source);
            self.ppu.write_oam_indexed(index, value);
        }
    }
}

impl Bus for GameBoyBus {
    fn tick(&mut self, cycles: u32) {
        self.clock.advance(cycles);
        self.timer.tick(cycles, &mut self.interrupts);
        self.ppu.tick(cycles, &mut self.interrupts);
        self.dma.accumulate(cycles);
        self.run_dma();
    }

    fn read8(&mut self, addr: u16) -> u8 {
        if self.dma.is_active() && !Self::is_hram(addr) {
            return 0xFF;
        }
        match addr {
            0x8000..=0x9FFF if !self.ppu.vram_accessible() => 0xFF,
            0xFE00..=0xFE9F if !self.ppu.oam_accessible() => 0xFF,
            _ => self.read_raw(addr),
        }
    }

    fn write8(&mut self, addr: u16, value: u8) {
        if self.dma.is_active() && !Self::is_hram(addr) {
            return;
        }
        match addr {
            0x8000..=0x9FFF if !self.ppu.vram_accessible() => {}
            0xFE00..=0xFE9F if !self.ppu.oam_accessible() => {}
            _ => self.write_raw(addr, value),
        }
    }

    fn peek8(&self, addr: u16) -> u8 {
        self.read_raw(addr)
    }

    #[inline]
    fn interrupts(&self) -> &InterruptController {
        &self.interrupts
    }

    #[inline]
    fn interrupts_mut(&mut self) -> &mut InterruptController {
        &mut self.interrupts
    }
}
