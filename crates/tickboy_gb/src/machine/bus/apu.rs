//! Sound register file (FF10-FF3F). No audio is produced; the registers
//! are only stored so software sees NR52 power semantics.

const BASE: u16 = 0xFF10;
const NR52: u16 = 0xFF26;
const NR52_POWER: u8 = 0x80;
const WAVE_RAM_START: u16 = 0xFF30;

#[derive(Clone, Debug)]
pub(super) struct ApuRegisters {
    regs: [u8; 0x30],
}

impl Default for ApuRegisters {
    fn default() -> Self {
        Self { regs: [0; 0x30] }
    }
}

impl ApuRegisters {
    #[inline]
    fn slot(addr: u16) -> usize {
        (addr - BASE) as usize
    }

    #[inline]
    fn powered(&self) -> bool {
        self.regs[Self::slot(NR52)] & NR52_POWER != 0
    }

    pub(super) fn read(&self, addr: u16) -> u8 {
        self.regs[Self::slot(addr)]
    }

    pub(super) fn write(&mut self, addr: u16, value: u8) {
        match addr {
            NR52 => self.write_nr52(value),
            WAVE_RAM_START..=0xFF3F => self.regs[Self::slot(addr)] = value,
            // Channel and mixer registers are read-only while powered off.
            BASE..=0xFF25 if self.powered() => self.regs[Self::slot(addr)] = value,
            _ => {}
        }
    }

    /// Set a register without the power check, for post-boot values.
    pub(super) fn poke(&mut self, addr: u16, value: u8) {
        self.regs[Self::slot(addr)] = value;
    }

    fn write_nr52(&mut self, value: u8) {
        let was_on = self.powered();
        let now_on = value & NR52_POWER != 0;

        if was_on && !now_on {
            self.regs[..Self::slot(NR52)].fill(0);
            self.regs[Self::slot(NR52)] = 0;
        }
        // Only the power bit is writable; channel status bits stay as they are.
        let nr52 = &mut self.regs[Self::slot(NR52)];
        if now_on {
            *nr52 |= NR52_POWER;
        } else {
            *nr52 &= !NR52_POWER;
        }
    }
}
