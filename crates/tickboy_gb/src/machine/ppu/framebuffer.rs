use crate::{SCREEN_HEIGHT, SCREEN_WIDTH};

pub const FRAME_PIXELS: usize = SCREEN_WIDTH * SCREEN_HEIGHT;

/// Two 160x144 planes of 2-bit shade indices. Scanlines are written into
/// the back plane; `swap` publishes it as the front.
#[derive(Clone, Debug)]
pub struct FrameBuffer {
    front: Vec<u8>,
    back: Vec<u8>,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self {
            front: vec![0; FRAME_PIXELS],
            back: vec![0; FRAME_PIXELS],
        }
    }
}

impl FrameBuffer {
    #[inline]
    pub fn front(&self) -> &[u8] {
        &self.front
    }

    #[inline]
    pub fn back_mut(&mut self) -> &mut [u8] {
        &mut self.back
    }

    /// Row `y` of the back plane.
    pub fn line_mut(&mut self, y: usize) -> &mut [u8] {
        let start = y * SCREEN_WIDTH;
        &mut self.back[start..start + SCREEN_WIDTH]
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.front, &mut self.back);
    }
}
