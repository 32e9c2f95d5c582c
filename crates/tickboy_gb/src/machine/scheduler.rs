//! Master clock and frame pacing.

use std::time::{Duration, Instant};

pub const CYCLES_PER_FRAME: u32 = 70_224;
pub const CYCLES_PER_SCANLINE: u32 = 456;
/// One DMG frame at 4.194304 MHz (~59.73 Hz).
pub const FRAME_DURATION: Duration = Duration::from_nanos(16_742_706);

/// Below this much remaining time pacing spins instead of sleeping.
const SPIN_THRESHOLD: Duration = Duration::from_millis(2);

#[derive(Clone, Debug)]
pub struct Scheduler {
    total_cycles: u64,
    frame_cycles: u32,
    frame_count: u64,
    frame_start: Instant,
    frame_limit: bool,
    fps: f64,
    fps_frames: u32,
    fps_window_start: Instant,
}

impl Default for Scheduler {
    fn default() -> Self {
        let now = Instant::now();
        Self {
            total_cycles: 0,
            frame_cycles: 0,
            frame_count: 0,
            frame_start: now,
            frame_limit: true,
            fps: 0.0,
            fps_frames: 0,
            fps_window_start: now,
        }
    }
}

impl Scheduler {
    /// Clear all counters; the pacing setting survives.
    pub fn reset(&mut self) {
        let frame_limit = self.frame_limit;
        *self = Self::default();
        self.frame_limit = frame_limit;
    }

    #[inline]
    pub fn advance(&mut self, cycles: u32) {
        self.total_cycles += cycles as u64;
        // Only `start_frame` clears this; raw stepping can run far past a frame.
        self.frame_cycles = self.frame_cycles.saturating_add(cycles);
    }

    pub fn start_frame(&mut self) {
        self.frame_cycles = 0;
        self.frame_start = Instant::now();
    }

    #[inline]
    pub fn frame_complete(&self) -> bool {
        self.frame_cycles >= CYCLES_PER_FRAME
    }

    pub fn end_frame(&mut self) {
        self.frame_count += 1;

        self.fps_frames += 1;
        let elapsed = self.fps_window_start.elapsed();
        if elapsed >= Duration::from_secs(1) {
            self.fps = self.fps_frames as f64 / elapsed.as_secs_f64();
            self.fps_frames = 0;
            self.fps_window_start = Instant::now();
        }

        if self.frame_limit {
            self.pace();
        }
    }

    /// Sleep most of the remaining frame time, then spin to the deadline.
    fn pace(&self) {
        let deadline = self.frame_start + FRAME_DURATION;
        loop {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let remaining = deadline - now;
            if remaining > SPIN_THRESHOLD {
                std::thread::sleep(remaining - SPIN_THRESHOLD / 2);
            } else {
                std::hint::spin_loop();
            }
        }
    }

    #[inline]
    pub fn set_frame_limit(&mut self, enabled: bool) {
        self.frame_limit = enabled;
    }

    #[inline]
    pub fn frame_limit(&self) -> bool {
        self.frame_limit
    }

    #[inline]
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    #[inline]
    pub fn total_mcycles(&self) -> u64 {
        self.total_cycles / 4
    }

    #[inline]
    pub fn frame_cycles(&self) -> u32 {
        self.frame_cycles
    }

    #[inline]
    pub fn current_scanline(&self) -> u32 {
        self.frame_cycles / CYCLES_PER_SCANLINE
    }

    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn fps(&self) -> f64 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_completes_at_70224_cycles() {
        let mut clock = Scheduler::default();
        clock.set_frame_limit(false);
        clock.start_frame();

        clock.advance(CYCLES_PER_FRAME - 4);
        assert!(!clock.frame_complete());
        assert_eq!(clock.current_scanline(), 153);
        clock.advance(4);
        assert!(clock.frame_complete());

        clock.end_frame();
        assert_eq!(clock.frame_count(), 1);
        assert_eq!(clock.total_mcycles(), CYCLES_PER_FRAME as u64 / 4);

        clock.start_frame();
        assert_eq!(clock.frame_cycles(), 0);
        assert_eq!(clock.total_cycles(), CYCLES_PER_FRAME as u64);
    }

    #[test]
    fn frame_counter_saturates_without_start_frame() {
        let mut clock = Scheduler::default();
        clock.advance(u32::MAX - 3);
        clock.advance(4);
        clock.advance(4);

        assert_eq!(clock.frame_cycles(), u32::MAX);
        assert!(clock.frame_complete());
        assert_eq!(clock.total_cycles(), u32::MAX as u64 + 5);

        clock.start_frame();
        assert_eq!(clock.frame_cycles(), 0);
    }

    #[test]
    fn paced_frame_takes_at_least_one_frame_time() {
        let mut clock = Scheduler::default();
        clock.start_frame();
        let start = Instant::now();
        clock.end_frame();
        assert!(start.elapsed() >= FRAME_DURATION - Duration::from_millis(1));
    }
}
