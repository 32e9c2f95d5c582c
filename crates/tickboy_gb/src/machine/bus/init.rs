use super::GameBoyBus;

/// Sound register values left behind by the DMG boot ROM.
const POST_BOOT_APU: [(u16, u8); 21] = [
    (0xFF10, 0x80),
    (0xFF11, 0xBF),
    (0xFF12, 0xF3),
    (0xFF13, 0xFF),
    (0xFF14, 0xBF),
    (0xFF16, 0x3F),
    (0xFF17, 0x00),
    (0xFF18, 0xFF),
    (0xFF19, 0xBF),
    (0xFF1A, 0x7F),
    (0xFF1B, 0xFF),
    (0xFF1C, 0x9F),
    (0xFF1D, 0xFF),
    (0xFF1E, 0xBF),
    (0xFF20, 0xFF),
    (0xFF21, 0x00),
    (0xFF22, 0x00),
    (0xFF23, 0xBF),
    (0xFF24, 0x77),
    (0xFF25, 0xF3),
    (0xFF26, 0xF1),
];

const RAM_SEED: u32 = 0xC0DE_1234;

impl GameBoyBus {
    /// Register and RAM contents as seen at PC=0x0100 after the boot ROM.
    ///
    /// Device registers come from each device's own reset; only the state
    /// the bus owns directly is set here.
    pub(super) fn apply_post_boot_state(&mut self) {
        for (addr, value) in POST_BOOT_APU {
            self.apu.poke(addr, value);
        }

        if self.seed_ram {
            self.seed_internal_ram();
        } else {
            self.wram.fill(0);
            self.hram.fill(0);
        }
    }

    /// WRAM/HRAM hold garbage at power-on. A fixed xorshift32 stream keeps
    /// runs reproducible without handing software an all-zero pattern.
    fn seed_internal_ram(&mut self) {
        let mut x = RAM_SEED;
        let mut next_byte = || {
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            x as u8
        };

        for byte in self.wram.iter_mut() {
            *byte = next_byte();
        }
        for byte in self.hram.iter_mut() {
            *byte = next_byte();
        }
    }
}
