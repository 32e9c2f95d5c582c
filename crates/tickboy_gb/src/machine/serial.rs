//! SB/SC link port.
//!
//! There is no link partner: a transfer started with the internal clock
//! completes immediately, as if the other side answered 0xFF.

use crate::cpu::interrupts::{Interrupt, InterruptController};

pub const SB: u16 = 0xFF01;
pub const SC: u16 = 0xFF02;

const SC_UNUSED_BITS: u8 = 0x7E;
const SC_START_INTERNAL: u8 = 0x81;

pub type SerialListener = Box<dyn FnMut(char) + Send>;

pub struct Serial {
    sb: u8,
    sc: u8,
    output: Vec<u8>,
    listener: Option<SerialListener>,
}

impl Default for Serial {
    fn default() -> Self {
        Self {
            sb: 0x00,
            sc: SC_UNUSED_BITS,
            output: Vec::new(),
            listener: None,
        }
    }
}

impl std::fmt::Debug for Serial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Serial")
            .field("sb", &self.sb)
            .field("sc", &self.sc)
            .field("output_len", &self.output.len())
            .finish_non_exhaustive()
    }
}

impl Serial {
    /// Registers and captured output are cleared; the listener stays.
    pub fn reset(&mut self) {
        self.sb = 0x00;
        self.sc = SC_UNUSED_BITS;
        self.output.clear();
    }

    pub fn set_listener(&mut self, listener: SerialListener) {
        self.listener = Some(listener);
    }

    /// Every byte sent so far.
    #[inline]
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    pub fn read(&self, addr: u16) -> u8 {
        match addr {
            SB => self.sb,
            SC => self.sc | SC_UNUSED_BITS,
            _ => 0xFF,
        }
    }

    pub fn write(&mut self, addr: u16, value: u8, interrupts: &mut InterruptController) {
        match addr {
            SB => self.sb = value,
            SC => {
                self.sc = value;
                if value & SC_START_INTERNAL == SC_START_INTERNAL {
                    self.complete_transfer(interrupts);
                }
            }
            _ => {}
        }
    }

    fn complete_transfer(&mut self, interrupts: &mut InterruptController) {
        let byte = self.sb;
        self.output.push(byte);
        if let Some(listener) = self.listener.as_mut() {
            listener(byte as char);
        }
        self.sc &= !0x80;
        self.sb = 0xFF;
        interrupts.request(Interrupt::Serial);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn transfer_completes_immediately() {
        let mut ic = InterruptController::default();
        ic.write_if(0);
        let seen = Arc::new(Mutex::new(String::new()));
        let sink = Arc::clone(&seen);

        let mut serial = Serial::default();
        serial.set_listener(Box::new(move |c: char| sink.lock().unwrap().push(c)));

        serial.write(SB, b'O', &mut ic);
        serial.write(SC, 0x81, &mut ic);
        serial.write(SB, b'K', &mut ic);
        serial.write(SC, 0x81, &mut ic);

        assert_eq!(serial.output(), b"OK");
        assert_eq!(seen.lock().unwrap().as_str(), "OK");
        assert_eq!(serial.read(SB), 0xFF);
        assert_eq!(serial.read(SC), 0x7F);
        assert_eq!(ic.read_if() & 0x1F, Interrupt::Serial.mask());
    }

    #[test]
    fn external_clock_does_not_transfer() {
        let mut ic = InterruptController::default();
        let mut serial = Serial::default();
        serial.write(SB, 0x42, &mut ic);
        serial.write(SC, 0x80, &mut ic);
        assert!(serial.output().is_empty());
        assert_eq!(serial.read(SC), 0xFE);
    }
}
