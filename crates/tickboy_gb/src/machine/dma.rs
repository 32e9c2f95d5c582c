//! OAM DMA (FF46).

pub const DMA: u16 = 0xFF46;

/// Bytes copied per transfer (FE00-FE9F).
pub const OAM_DMA_LENGTH: u16 = 0xA0;
const CYCLES_PER_BYTE: u32 = 4;

#[derive(Clone, Debug)]
pub struct Dma {
    register: u8,
    source: u16,
    index: u16,
    accumulator: u32,
    active: bool,
}

impl Default for Dma {
    fn default() -> Self {
        Self {
            register: 0xFF,
            source: 0,
            index: 0,
            accumulator: 0,
            active: false,
        }
    }
}

impl Dma {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Write to FF46: restart the transfer from `value << 8`.
    pub fn start(&mut self, value: u8) {
        self.register = value;
        self.source = (value as u16) << 8;
        self.index = 0;
        self.accumulator = 0;
        self.active = true;
    }

    #[inline]
    pub fn register(&self) -> u8 {
        self.register
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn accumulate(&mut self, cycles: u32) {
        if self.active {
            self.accumulator += cycles;
        }
    }

    /// Next `(source address, OAM index)` pair that is due, if any.
    pub fn next_transfer(&mut self) -> Option<(u16, u8)> {
        if !self.active || self.accumulator < CYCLES_PER_BYTE {
            return None;
        }
        self.accumulator -= CYCLES_PER_BYTE;

        let index = self.index;
        self.index += 1;
        if self.index >= OAM_DMA_LENGTH {
            self.active = false;
            self.accumulator = 0;
        }
        Some((self.source.wrapping_add(index), index as u8))
    }
}
