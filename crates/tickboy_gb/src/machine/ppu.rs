//! Picture processing unit.
//!
//! Dot-driven state machine: each line is 456 dots (OAM scan 0-79, drawing
//! 80-251, HBlank up to 455) and a frame is 154 lines, the last ten being
//! VBlank. The whole scanline is rendered in one go when drawing ends.

mod framebuffer;
mod render;
#[cfg(test)]
mod tests;

pub use framebuffer::FrameBuffer;
use render::Sprite;

use crate::cpu::interrupts::{Interrupt, InterruptController};

pub const LCDC: u16 = 0xFF40;
pub const STAT: u16 = 0xFF41;
pub const SCY: u16 = 0xFF42;
pub const SCX: u16 = 0xFF43;
pub const LY: u16 = 0xFF44;
pub const LYC: u16 = 0xFF45;
pub const BGP: u16 = 0xFF47;
pub const OBP0: u16 = 0xFF48;
pub const OBP1: u16 = 0xFF49;
pub const WY: u16 = 0xFF4A;
pub const WX: u16 = 0xFF4B;

pub const VRAM_SIZE: usize = 0x2000;
pub const OAM_SIZE: usize = 0xA0;

pub const DOTS_PER_LINE: u32 = 456;
pub const LINES_PER_FRAME: u8 = 154;
pub const VISIBLE_LINES: u8 = 144;

const OAM_SCAN_END: u32 = 80;
const DRAWING_END: u32 = 252;

const LCDC_ENABLE: u8 = 0x80;
const STAT_WRITABLE: u8 = 0x78;
const STAT_HBLANK_SOURCE: u8 = 0x08;
const STAT_VBLANK_SOURCE: u8 = 0x10;
const STAT_OAM_SOURCE: u8 = 0x20;
const STAT_LYC_SOURCE: u8 = 0x40;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PpuMode {
    #[default]
    HBlank = 0,
    VBlank = 1,
    OamScan = 2,
    Drawing = 3,
}

/// The eleven CPU-visible LCD registers (DMA at FF46 lives elsewhere).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PpuRegisters {
    pub lcdc: u8,
    /// Only the interrupt source bits (0x78) are stored.
    pub stat: u8,
    pub scy: u8,
    pub scx: u8,
    pub ly: u8,
    pub lyc: u8,
    pub bgp: u8,
    pub obp0: u8,
    pub obp1: u8,
    pub wy: u8,
    pub wx: u8,
}

impl Default for PpuRegisters {
    fn default() -> Self {
        Self {
            lcdc: 0x91,
            stat: 0,
            scy: 0,
            scx: 0,
            ly: 0,
            lyc: 0,
            bgp: 0xFC,
            obp0: 0xFF,
            obp1: 0xFF,
            wy: 0,
            wx: 0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Ppu {
    regs: PpuRegisters,
    vram: Box<[u8; VRAM_SIZE]>,
    oam: [u8; OAM_SIZE],
    mode: PpuMode,
    dot: u32,
    window_line: u8,
    stat_line: bool,
    sprites: Vec<Sprite>,
    frame: FrameBuffer,
    frames_completed: u64,
}

impl Default for Ppu {
    fn default() -> Self {
        Self {
            regs: PpuRegisters::default(),
            vram: Box::new([0; VRAM_SIZE]),
            oam: [0; OAM_SIZE],
            mode: PpuMode::OamScan,
            dot: 0,
            window_line: 0,
            stat_line: false,
            sprites: Vec::with_capacity(render::MAX_SPRITES_PER_LINE),
            frame: FrameBuffer::default(),
            frames_completed: 0,
        }
    }
}

impl Ppu {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[inline]
    pub fn registers(&self) -> &PpuRegisters {
        &self.regs
    }

    #[inline]
    pub fn mode(&self) -> PpuMode {
        self.mode
    }

    #[inline]
    pub fn dot(&self) -> u32 {
        self.dot
    }

    #[inline]
    pub fn window_line(&self) -> u8 {
        self.window_line
    }

    #[inline]
    pub fn lcd_enabled(&self) -> bool {
        self.regs.lcdc & LCDC_ENABLE != 0
    }

    /// Front buffer: the last completed frame as 2-bit shade indices.
    #[inline]
    pub fn frame(&self) -> &[u8] {
        self.frame.front()
    }

    #[inline]
    pub fn frames_completed(&self) -> u64 {
        self.frames_completed
    }

    /// VRAM is off limits only while pixels are being pushed.
    pub fn vram_accessible(&self) -> bool {
        !(self.lcd_enabled() && self.mode == PpuMode::Drawing)
    }

    pub fn oam_accessible(&self) -> bool {
        !(self.lcd_enabled() && matches!(self.mode, PpuMode::OamScan | PpuMode::Drawing))
    }

    /// Ungated VRAM access; `addr` is a bus address in 8000-9FFF.
    #[inline]
    pub fn vram_read(&self, addr: u16) -> u8 {
        self.vram[(addr as usize - 0x8000) & (VRAM_SIZE - 1)]
    }

    #[inline]
    pub fn vram_write(&mut self, addr: u16, value: u8) {
        self.vram[(addr as usize - 0x8000) & (VRAM_SIZE - 1)] = value;
    }

    /// Ungated OAM access; `addr` is a bus address in FE00-FE9F.
    #[inline]
    pub fn oam_read(&self, addr: u16) -> u8 {
        self.oam.get(addr as usize - 0xFE00).copied().unwrap_or(0xFF)
    }

    #[inline]
    pub fn oam_write(&mut self, addr: u16, value: u8) {
        if let Some(slot) = self.oam.get_mut(addr as usize - 0xFE00) {
            *slot = value;
        }
    }

    /// OAM DMA destination write.
    #[inline]
    pub fn write_oam_indexed(&mut self, index: u8, value: u8) {
        if let Some(slot) = self.oam.get_mut(index as usize) {
            *slot = value;
        }
    }

    pub fn read_register(&self, addr: u16) -> u8 {
        match addr {
            LCDC => self.regs.lcdc,
            STAT => {
                let coincidence = if self.regs.ly == self.regs.lyc { 0x04 } else { 0 };
                0x80 | (self.regs.stat & STAT_WRITABLE) | coincidence | self.mode as u8
            }
            SCY => self.regs.scy,
            SCX => self.regs.scx,
            LY => self.regs.ly,
            LYC => self.regs.lyc,
            BGP => self.regs.bgp,
            OBP0 => self.regs.obp0,
            OBP1 => self.regs.obp1,
            WY => self.regs.wy,
            WX => self.regs.wx,
            _ => 0xFF,
        }
    }

    pub fn write_register(&mut self, addr: u16, value: u8, interrupts: &mut InterruptController) {
        match addr {
            LCDC => self.write_lcdc(value, interrupts),
            STAT => self.regs.stat = value & STAT_WRITABLE,
            SCY => self.regs.scy = value,
            SCX => self.regs.scx = value,
            // Read-only.
            LY => {}
            LYC => {
                self.regs.lyc = value;
                self.update_stat_line(interrupts);
            }
            BGP => self.regs.bgp = value,
            OBP0 => self.regs.obp0 = value,
            OBP1 => self.regs.obp1 = value,
            WY => self.regs.wy = value,
            WX => self.regs.wx = value,
            _ => {}
        }
    }

    fn write_lcdc(&mut self, value: u8, interrupts: &mut InterruptController) {
        let was_on = self.lcd_enabled();
        self.regs.lcdc = value;
        let now_on = self.lcd_enabled();

        if was_on && !now_on {
            log::debug!("LCD off at LY={}", self.regs.ly);
            self.regs.ly = 0;
            self.dot = 0;
            self.mode = PpuMode::HBlank;
            self.stat_line = false;
        } else if !was_on && now_on {
            log::debug!("LCD on");
            self.dot = 0;
            self.set_mode(PpuMode::OamScan, interrupts);
        }
    }

    pub fn tick(&mut self, cycles: u32, interrupts: &mut InterruptController) {
        if !self.lcd_enabled() {
            return;
        }
        for _ in 0..cycles {
            self.tick_dot(interrupts);
        }
    }

    fn tick_dot(&mut self, interrupts: &mut InterruptController) {
        self.dot += 1;

        match self.mode {
            PpuMode::OamScan if self.dot == OAM_SCAN_END => {
                self.select_sprites();
                self.set_mode(PpuMode::Drawing, interrupts);
            }
            PpuMode::Drawing if self.dot == DRAWING_END => {
                self.render_scanline();
                self.set_mode(PpuMode::HBlank, interrupts);
            }
            _ => {}
        }

        if self.dot < DOTS_PER_LINE {
            return;
        }
        self.dot = 0;
        self.regs.ly += 1;

        if self.mode == PpuMode::VBlank {
            if self.regs.ly == LINES_PER_FRAME {
                self.regs.ly = 0;
                self.window_line = 0;
                self.set_mode(PpuMode::OamScan, interrupts);
            } else {
                self.update_stat_line(interrupts);
            }
        } else if self.regs.ly == VISIBLE_LINES {
            self.set_mode(PpuMode::VBlank, interrupts);
            interrupts.request(Interrupt::VBlank);
            self.frame.swap();
            self.frames_completed += 1;
            log::trace!("VBlank, frame {}", self.frames_completed);
        } else {
            self.set_mode(PpuMode::OamScan, interrupts);
        }
    }

    fn set_mode(&mut self, mode: PpuMode, interrupts: &mut InterruptController) {
        self.mode = mode;
        self.update_stat_line(interrupts);
    }

    /// Recompute the STAT interrupt line; a rising edge requests INT 48.
    fn update_stat_line(&mut self, interrupts: &mut InterruptController) {
        if !self.lcd_enabled() {
            self.stat_line = false;
            return;
        }

        let stat = self.regs.stat;
        let mode_source = match self.mode {
            PpuMode::HBlank => STAT_HBLANK_SOURCE,
            PpuMode::VBlank => STAT_VBLANK_SOURCE,
            PpuMode::OamScan => STAT_OAM_SOURCE,
            PpuMode::Drawing => 0,
        };
        let line = (stat & mode_source) != 0
            || ((stat & STAT_LYC_SOURCE) != 0 && self.regs.ly == self.regs.lyc);

        if line && !self.stat_line {
            log::trace!("STAT edge: mode={:?} LY={}", self.mode, self.regs.ly);
            interrupts.request(Interrupt::LcdStat);
        }
        self.stat_line = line;
    }
}
