pub mod input;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::new_rgb(0, 0, 0);
    pub const WHITE: Color = Color::new_rgb(255, 255, 255);

    /// The four DMG shades, lightest first, indexed by a 2-bit shade value.
    pub const DMG_SHADES: [Color; 4] = [
        Color::new_rgb(0xE0, 0xF8, 0xD0),
        Color::new_rgb(0x88, 0xC0, 0x70),
        Color::new_rgb(0x34, 0x68, 0x56),
        Color::new_rgb(0x08, 0x18, 0x20),
    ];

    #[inline]
    pub const fn new_rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b, a: 0xff }
    }

    #[inline]
    pub const fn new_rgba(r: u8, g: u8, b: u8, a: u8) -> Color {
        Color { r, g, b, a }
    }

    /// Map a 2-bit shade index from the frame buffer to its display colour.
    #[inline]
    pub const fn from_shade(shade: u8) -> Color {
        Self::DMG_SHADES[(shade & 0x03) as usize]
    }

    #[inline]
    pub const fn rgb(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    pub fn to_u32(&self) -> u32 {
        u32::from_le_bytes([self.r, self.g, self.b, self.a])
    }
}

/// Expand a frame of shade indices into packed RGB24 bytes.
pub fn shades_to_rgb24(shades: &[u8], out: &mut Vec<u8>) {
    out.clear();
    out.reserve(shades.len() * 3);
    for &shade in shades {
        let (r, g, b) = Color::from_shade(shade).rgb();
        out.extend_from_slice(&[r, g, b]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shade_lookup_masks_to_two_bits() {
        assert_eq!(Color::from_shade(0), Color::DMG_SHADES[0]);
        assert_eq!(Color::from_shade(7), Color::DMG_SHADES[3]);
    }

    #[test]
    fn rgb24_expansion_is_three_bytes_per_pixel() {
        let mut out = Vec::new();
        shades_to_rgb24(&[0, 3], &mut out);
        assert_eq!(out.len(), 6);
        assert_eq!(&out[3..], &[0x08, 0x18, 0x20]);
    }
}
