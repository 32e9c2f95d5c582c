//! DIV/TIMA/TMA/TAC.
//!
//! A 16-bit system counter advances once per T-cycle; DIV is its upper
//! byte. TIMA increments on a falling edge of the selected counter bit
//! ANDed with the enable bit, so DIV and TAC writes can bump TIMA too.

use crate::cpu::interrupts::{Interrupt, InterruptController};

pub const DIV: u16 = 0xFF04;
pub const TIMA: u16 = 0xFF05;
pub const TMA: u16 = 0xFF06;
pub const TAC: u16 = 0xFF07;

/// Counter value at PC=0x0100 after the boot ROM.
const POST_BOOT_COUNTER: u16 = 0xABCC;
/// Counter bit watched for each TAC clock select.
const CLOCK_BITS: [u16; 4] = [9, 3, 5, 7];
/// T-cycles between TIMA overflowing and the TMA reload + interrupt.
const RELOAD_DELAY: u8 = 4;

#[derive(Clone, Debug)]
pub struct Timer {
    counter: u16,
    tima: u8,
    tma: u8,
    tac: u8,
    /// Countdown to the pending reload; 0 when none is armed.
    reload_delay: u8,
}

impl Default for Timer {
    fn default() -> Self {
        Self {
            counter: POST_BOOT_COUNTER,
            tima: 0,
            tma: 0,
            tac: 0,
            reload_delay: 0,
        }
    }
}

impl Timer {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[inline]
    pub fn counter(&self) -> u16 {
        self.counter
    }

    #[inline]
    pub fn reload_pending(&self) -> bool {
        self.reload_delay != 0
    }

    #[inline]
    fn signal(&self) -> bool {
        let enabled = self.tac & 0x04 != 0;
        let bit = CLOCK_BITS[(self.tac & 0x03) as usize];
        enabled && (self.counter >> bit) & 1 != 0
    }

    fn increment_tima(&mut self) {
        let (next, overflow) = self.tima.overflowing_add(1);
        self.tima = next;
        if overflow {
            // TIMA reads 0x00 until the delayed reload.
            self.reload_delay = RELOAD_DELAY;
        }
    }

    pub fn tick(&mut self, cycles: u32, interrupts: &mut InterruptController) {
        for _ in 0..cycles {
            self.tick_tcycle(interrupts);
        }
    }

    fn tick_tcycle(&mut self, interrupts: &mut InterruptController) {
        if self.reload_delay > 0 {
            self.reload_delay -= 1;
            if self.reload_delay == 0 {
                self.tima = self.tma;
                interrupts.request(Interrupt::Timer);
            }
        }

        let before = self.signal();
        self.counter = self.counter.wrapping_add(1);
        if before && !self.signal() {
            self.increment_tima();
        }
    }

    pub fn read(&self, addr: u16) -> u8 {
        match addr {
            DIV => (self.counter >> 8) as u8,
            TIMA => self.tima,
            TMA => self.tma,
            TAC => self.tac | 0xF8,
            _ => 0xFF,
        }
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        match addr {
            DIV => {
                let before = self.signal();
                self.counter = 0;
                if before && !self.signal() {
                    self.increment_tima();
                }
            }
            TIMA => {
                if self.reload_delay == 0 {
                    self.tima = value;
                }
            }
            TMA => self.tma = value,
            TAC => {
                let before = self.signal();
                self.tac = value & 0x07;
                if before && !self.signal() {
                    self.increment_tima();
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> InterruptController {
        let mut ic = InterruptController::default();
        ic.write_if(0);
        ic
    }

    #[test]
    fn div_reads_upper_counter_byte() {
        let timer = Timer::default();
        assert_eq!(timer.read(DIV), 0xAB);
        assert_eq!(timer.read(TAC), 0xF8);
    }

    #[test]
    fn fastest_clock_increments_every_16_cycles() {
        let mut ic = controller();
        let mut timer = Timer::default();
        timer.write(DIV, 0);
        timer.write(TAC, 0x05);

        timer.tick(15, &mut ic);
        assert_eq!(timer.read(TIMA), 0);
        timer.tick(1, &mut ic);
        assert_eq!(timer.read(TIMA), 1);
        timer.tick(16 * 4, &mut ic);
        assert_eq!(timer.read(TIMA), 5);
    }

    #[test]
    fn overflow_reload_is_delayed_four_cycles() {
        let mut ic = controller();
        let mut timer = Timer::default();
        timer.write(DIV, 0);
        timer.write(TMA, 0x42);
        timer.write(TIMA, 0xFF);
        timer.write(TAC, 0x05);

        timer.tick(16, &mut ic);
        assert_eq!(timer.read(TIMA), 0x00);
        assert!(timer.reload_pending());

        timer.tick(3, &mut ic);
        assert_eq!(timer.read(TIMA), 0x00);
        assert_eq!(ic.read_if() & Interrupt::Timer.mask(), 0);

        timer.tick(1, &mut ic);
        assert_eq!(timer.read(TIMA), 0x42);
        assert_ne!(ic.read_if() & Interrupt::Timer.mask(), 0);
    }

    #[test]
    fn tima_write_ignored_while_reload_pending() {
        let mut ic = controller();
        let mut timer = Timer::default();
        timer.write(DIV, 0);
        timer.write(TMA, 0x10);
        timer.write(TIMA, 0xFF);
        timer.write(TAC, 0x05);
        timer.tick(16, &mut ic);

        timer.write(TIMA, 0x99);
        timer.tick(4, &mut ic);
        assert_eq!(timer.read(TIMA), 0x10);
    }

    #[test]
    fn div_reset_on_high_bit_bumps_tima() {
        let mut ic = controller();
        let mut timer = Timer::default();
        timer.write(DIV, 0);
        timer.write(TAC, 0x05);
        // Bit 3 goes high after 8 cycles.
        timer.tick(8, &mut ic);
        assert_eq!(timer.read(TIMA), 0);

        timer.write(DIV, 0);
        assert_eq!(timer.read(TIMA), 1);
        assert_eq!(timer.read(DIV), 0);
    }

    #[test]
    fn disabling_timer_on_high_bit_bumps_tima() {
        let mut ic = controller();
        let mut timer = Timer::default();
        timer.write(DIV, 0);
        timer.write(TAC, 0x05);
        timer.tick(8, &mut ic);

        timer.write(TAC, 0x01);
        assert_eq!(timer.read(TIMA), 1);
    }

    #[test]
    fn changing_clock_select_on_high_bit_bumps_tima() {
        let mut ic = controller();
        let mut timer = Timer::default();
        timer.write(DIV, 0);
        timer.write(TAC, 0x05);
        // Counter = 8: bit 3 high, bit 9 low.
        timer.tick(8, &mut ic);
        assert_eq!(timer.read(TIMA), 0);

        timer.write(TAC, 0x04);
        assert_eq!(timer.read(TIMA), 1);

        // No edge when the newly selected bit was already low.
        timer.write(TAC, 0x05);
        assert_eq!(timer.read(TIMA), 1);
    }
}
