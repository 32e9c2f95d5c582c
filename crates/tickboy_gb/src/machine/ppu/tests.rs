use super::*;
use crate::SCREEN_WIDTH;

const IDENTITY_PALETTE: u8 = 0xE4;

fn render_frame(ppu: &mut Ppu) {
    let mut ic = InterruptController::default();
    ppu.tick(DOTS_PER_LINE * LINES_PER_FRAME as u32, &mut ic);
}

fn set_register(ppu: &mut Ppu, addr: u16, value: u8) {
    let mut ic = InterruptController::default();
    ppu.write_register(addr, value, &mut ic);
}

fn pixel(ppu: &Ppu, x: usize, y: usize) -> u8 {
    ppu.frame()[y * SCREEN_WIDTH + x]
}

/// Tile 1: top row color 1, everything else 0.
fn write_row_tile(ppu: &mut Ppu) {
    ppu.vram_write(0x8010, 0xFF);
    ppu.vram_write(0x8011, 0x00);
}

/// Tile 2: leftmost pixel of the top row color 3.
fn write_dot_tile(ppu: &mut Ppu) {
    ppu.vram_write(0x8020, 0x80);
    ppu.vram_write(0x8021, 0x80);
}

fn write_sprite(ppu: &mut Ppu, slot: u16, y: u8, x: u8, tile: u8, attrs: u8) {
    let base = 0xFE00 + slot * 4;
    ppu.oam_write(base, y);
    ppu.oam_write(base + 1, x);
    ppu.oam_write(base + 2, tile);
    ppu.oam_write(base + 3, attrs);
}

#[test]
fn background_goes_through_bgp() {
    let mut ppu = Ppu::default();
    write_row_tile(&mut ppu);
    ppu.vram_write(0x9800, 1);

    render_frame(&mut ppu);

    // Post-boot BGP 0xFC maps color 1 to shade 3.
    assert_eq!(pixel(&ppu, 0, 0), 3);
    assert_eq!(pixel(&ppu, 7, 0), 3);
    assert_eq!(pixel(&ppu, 8, 0), 0);
    assert_eq!(pixel(&ppu, 0, 1), 0);
    assert_eq!(ppu.frames_completed(), 1);
}

#[test]
fn scroll_shifts_background() {
    let mut ppu = Ppu::default();
    write_row_tile(&mut ppu);
    ppu.vram_write(0x9801, 1);
    set_register(&mut ppu, SCX, 4);

    render_frame(&mut ppu);

    assert_eq!(pixel(&ppu, 3, 0), 0);
    assert_eq!(pixel(&ppu, 4, 0), 3);
    assert_eq!(pixel(&ppu, 11, 0), 3);
    assert_eq!(pixel(&ppu, 12, 0), 0);
}

#[test]
fn window_draws_from_its_own_map() {
    let mut ppu = Ppu::default();
    write_row_tile(&mut ppu);
    ppu.vram_write(0x9C00, 1);
    set_register(&mut ppu, BGP, IDENTITY_PALETTE);
    // LCD, window map 9C00, window, unsigned tiles, BG.
    set_register(&mut ppu, LCDC, 0xF1);
    set_register(&mut ppu, WY, 0);
    set_register(&mut ppu, WX, 7 + 8);

    render_frame(&mut ppu);

    assert_eq!(pixel(&ppu, 0, 0), 0, "left of the window is background");
    assert_eq!(pixel(&ppu, 8, 0), 1);
    assert_eq!(pixel(&ppu, 15, 0), 1);
    assert_eq!(ppu.window_line(), 0, "counter restarts every frame");
}

#[test]
fn sprite_covers_background() {
    let mut ppu = Ppu::default();
    write_dot_tile(&mut ppu);
    set_register(&mut ppu, LCDC, 0x93);
    write_sprite(&mut ppu, 0, 16, 8, 2, 0x00);

    render_frame(&mut ppu);

    // OBP0 0xFF maps color 3 to shade 3.
    assert_eq!(pixel(&ppu, 0, 0), 3);
    assert_eq!(pixel(&ppu, 1, 0), 0, "color 0 is transparent");
}

#[test]
fn behind_background_sprite_hides_under_nonzero_bg() {
    let mut ppu = Ppu::default();
    write_row_tile(&mut ppu);
    write_dot_tile(&mut ppu);
    ppu.vram_write(0x9800, 1);
    set_register(&mut ppu, BGP, IDENTITY_PALETTE);
    set_register(&mut ppu, LCDC, 0x93);
    write_sprite(&mut ppu, 0, 16, 8, 2, 0x80);
    write_sprite(&mut ppu, 1, 16, 16, 2, 0x80);

    render_frame(&mut ppu);

    assert_eq!(pixel(&ppu, 0, 0), 1, "BG color 1 wins");
    assert_eq!(pixel(&ppu, 8, 0), 3, "BG color 0 lets the sprite through");
}

#[test]
fn sprite_flip_and_palette_select() {
    let mut ppu = Ppu::default();
    write_dot_tile(&mut ppu);
    set_register(&mut ppu, LCDC, 0x93);
    set_register(&mut ppu, OBP1, 0x40);
    write_sprite(&mut ppu, 0, 16, 8, 2, 0x20 | 0x10);

    render_frame(&mut ppu);

    assert_eq!(pixel(&ppu, 0, 0), 0);
    // X-flipped to the right edge; OBP1 maps color 3 to shade 1.
    assert_eq!(pixel(&ppu, 7, 0), 1);
}

#[test]
fn at_most_ten_sprites_per_line() {
    let mut ppu = Ppu::default();
    write_dot_tile(&mut ppu);
    set_register(&mut ppu, LCDC, 0x93);
    for slot in 0..11u16 {
        write_sprite(&mut ppu, slot, 16, 8 + slot as u8 * 8, 2, 0x00);
    }

    render_frame(&mut ppu);

    assert_eq!(pixel(&ppu, 72, 0), 3, "tenth sprite drawn");
    assert_eq!(pixel(&ppu, 80, 0), 0, "eleventh sprite dropped");
}

#[test]
fn earlier_oam_entry_wins_overlap() {
    let mut ppu = Ppu::default();
    write_dot_tile(&mut ppu);
    set_register(&mut ppu, LCDC, 0x93);
    set_register(&mut ppu, OBP0, 0x40);
    set_register(&mut ppu, OBP1, 0xC0);
    write_sprite(&mut ppu, 0, 16, 8, 2, 0x00);
    write_sprite(&mut ppu, 1, 16, 8, 2, 0x10);

    render_frame(&mut ppu);

    assert_eq!(pixel(&ppu, 0, 0), 1);
}

#[test]
fn stat_register_layout() {
    let mut ppu = Ppu::default();
    set_register(&mut ppu, STAT, 0xFF);
    // Bit 7 set, sources kept, LY == LYC, OAM scan.
    assert_eq!(ppu.read_register(STAT), 0x80 | 0x78 | 0x04 | 0x02);

    set_register(&mut ppu, LY, 0x42);
    assert_eq!(ppu.read_register(LY), 0);
}

#[test]
fn lcd_off_freezes_timing() {
    let mut ppu = Ppu::default();
    let mut ic = InterruptController::default();
    ppu.tick(DOTS_PER_LINE * 3 + 10, &mut ic);
    assert_eq!(ppu.read_register(LY), 3);

    ppu.write_register(LCDC, 0x11, &mut ic);
    assert_eq!(ppu.read_register(LY), 0);
    assert_eq!(ppu.mode(), PpuMode::HBlank);

    ppu.tick(1000, &mut ic);
    assert_eq!(ppu.dot(), 0);

    ppu.write_register(LCDC, 0x91, &mut ic);
    assert_eq!(ppu.mode(), PpuMode::OamScan);
}

#[test]
fn sprite_height_is_latched_at_oam_scan() {
    let mut ppu = Ppu::default();
    let mut ic = InterruptController::default();
    // Tile 0, row 5: leftmost pixel color 3.
    ppu.vram_write(0x8000 + 5 * 2, 0x80);
    ppu.vram_write(0x8000 + 5 * 2 + 1, 0x80);
    ppu.write_register(LCDC, 0x97, &mut ic);
    write_sprite(&mut ppu, 0, 16, 8, 0, 0x40);

    let line_10_drawing = DOTS_PER_LINE * 10 + 100;
    ppu.tick(line_10_drawing, &mut ic);
    assert_eq!(ppu.mode(), PpuMode::Drawing);
    // Back to 8x8 objects while line 10 is being drawn.
    ppu.write_register(LCDC, 0x93, &mut ic);
    ppu.tick(DOTS_PER_LINE * LINES_PER_FRAME as u32 - line_10_drawing, &mut ic);

    // Row 10 of the tall sprite, Y-flipped, is row 5 of the top tile.
    assert_eq!(pixel(&ppu, 0, 10), 3);
    assert_eq!(pixel(&ppu, 1, 10), 0);
    assert_eq!(ppu.frames_completed(), 1);
}
