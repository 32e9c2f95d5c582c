//! Scanline compositing: background, window, then sprites.

use super::{Ppu, VISIBLE_LINES};
use crate::SCREEN_WIDTH;

pub const MAX_SPRITES_PER_LINE: usize = 10;
const OAM_ENTRIES: usize = 40;

const LCDC_BG_ENABLE: u8 = 0x01;
const LCDC_OBJ_ENABLE: u8 = 0x02;
const LCDC_OBJ_TALL: u8 = 0x04;
const LCDC_BG_MAP: u8 = 0x08;
const LCDC_TILE_DATA: u8 = 0x10;
const LCDC_WINDOW_ENABLE: u8 = 0x20;
const LCDC_WINDOW_MAP: u8 = 0x40;

const ATTR_PALETTE: u8 = 0x10;
const ATTR_X_FLIP: u8 = 0x20;
const ATTR_Y_FLIP: u8 = 0x40;
const ATTR_BEHIND_BG: u8 = 0x80;

/// One OAM entry picked during OAM scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sprite {
    pub y: u8,
    pub x: u8,
    pub tile: u8,
    pub attrs: u8,
    /// Object height latched at OAM scan; LCDC may change before drawing.
    pub height: u16,
}

#[inline]
fn apply_palette(palette: u8, color: u8) -> u8 {
    (palette >> (color * 2)) & 0x03
}

impl Ppu {
    fn sprite_height(&self) -> u16 {
        if self.regs.lcdc & LCDC_OBJ_TALL != 0 {
            16
        } else {
            8
        }
    }

    /// First ten OAM entries that overlap the current line, in OAM order.
    pub(super) fn select_sprites(&mut self) {
        self.sprites.clear();
        let line = self.regs.ly as u16 + 16;
        let height = self.sprite_height();

        for entry in self.oam.chunks_exact(4).take(OAM_ENTRIES) {
            let y = entry[0] as u16;
            if line >= y && line < y + height {
                self.sprites.push(Sprite {
                    y: entry[0],
                    x: entry[1],
                    tile: entry[2],
                    attrs: entry[3],
                    height,
                });
                if self.sprites.len() == MAX_SPRITES_PER_LINE {
                    break;
                }
            }
        }
    }

    /// Raw 2-bit color of pixel (`col`, `row`) in the tile at VRAM address
    /// `tile_addr`.
    #[inline]
    fn tile_pixel(&self, tile_addr: u16, col: u8, row: u16) -> u8 {
        let lo = self.vram_read(tile_addr + row * 2);
        let hi = self.vram_read(tile_addr + row * 2 + 1);
        let bit = 7 - (col & 7);
        (((hi >> bit) & 1) << 1) | ((lo >> bit) & 1)
    }

    /// Tile data address for a BG/window tile index.
    #[inline]
    fn bg_tile_addr(&self, index: u8) -> u16 {
        if self.regs.lcdc & LCDC_TILE_DATA != 0 {
            0x8000 + index as u16 * 16
        } else {
            0x9000u16.wrapping_add_signed(index as i8 as i16 * 16)
        }
    }

    /// Raw color of the map pixel at (`x`, `y`) in the 256x256 map at `map`.
    fn map_pixel(&self, map: u16, x: u8, y: u8) -> u8 {
        let index = self.vram_read(map + (y as u16 / 8) * 32 + x as u16 / 8);
        self.tile_pixel(self.bg_tile_addr(index), x % 8, y as u16 % 8)
    }

    pub(super) fn render_scanline(&mut self) {
        let ly = self.regs.ly;
        if ly >= VISIBLE_LINES {
            return;
        }

        let lcdc = self.regs.lcdc;
        let mut raw_bg = [0u8; SCREEN_WIDTH];
        let mut line = [0u8; SCREEN_WIDTH];

        if lcdc & LCDC_BG_ENABLE != 0 {
            let map = if lcdc & LCDC_BG_MAP != 0 { 0x9C00 } else { 0x9800 };
            let y = ly.wrapping_add(self.regs.scy);
            for (x, raw) in raw_bg.iter_mut().enumerate() {
                *raw = self.map_pixel(map, (x as u8).wrapping_add(self.regs.scx), y);
            }

            let wx = self.regs.wx;
            if lcdc & LCDC_WINDOW_ENABLE != 0 && ly >= self.regs.wy && wx <= 166 {
                let map = if lcdc & LCDC_WINDOW_MAP != 0 { 0x9C00 } else { 0x9800 };
                let start = wx as i16 - 7;
                let mut drew = false;
                for x in start.max(0)..SCREEN_WIDTH as i16 {
                    let wx_pixel = (x - start) as u8;
                    raw_bg[x as usize] = self.map_pixel(map, wx_pixel, self.window_line);
                    drew = true;
                }
                if drew {
                    self.window_line = self.window_line.wrapping_add(1);
                }
            }

            for (out, raw) in line.iter_mut().zip(raw_bg.iter()) {
                *out = apply_palette(self.regs.bgp, *raw);
            }
        }

        if lcdc & LCDC_OBJ_ENABLE != 0 {
            self.composite_sprites(&raw_bg, &mut line);
        }

        self.frame.line_mut(ly as usize).copy_from_slice(&line);
    }

    fn composite_sprites(&self, raw_bg: &[u8; SCREEN_WIDTH], line: &mut [u8; SCREEN_WIDTH]) {
        let line_y = self.regs.ly as u16 + 16;

        // Reverse order so earlier OAM entries end up on top.
        for sprite in self.sprites.iter().rev() {
            let height = sprite.height;
            let mut row = line_y - sprite.y as u16;
            if sprite.attrs & ATTR_Y_FLIP != 0 {
                row = height - 1 - row;
            }
            let tile = if height == 16 {
                sprite.tile & 0xFE
            } else {
                sprite.tile
            };
            let tile_addr = 0x8000 + tile as u16 * 16;
            let palette = if sprite.attrs & ATTR_PALETTE != 0 {
                self.regs.obp1
            } else {
                self.regs.obp0
            };

            for px in 0..8u8 {
                let screen_x = sprite.x as i16 - 8 + px as i16;
                if !(0..SCREEN_WIDTH as i16).contains(&screen_x) {
                    continue;
                }
                let col = if sprite.attrs & ATTR_X_FLIP != 0 { 7 - px } else { px };
                let color = self.tile_pixel(tile_addr, col, row);
                if color == 0 {
                    continue;
                }
                let sx = screen_x as usize;
                if sprite.attrs & ATTR_BEHIND_BG != 0 && raw_bg[sx] != 0 {
                    continue;
                }
                line[sx] = apply_palette(palette, color);
            }
        }
    }
}
