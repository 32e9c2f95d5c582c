use crate::cpu::regs::R16;
use crate::cpu::{Bus, Cpu, CycleState};

impl Cpu {
    pub(super) fn exec_push<B: Bus>(&mut self, bus: &mut B, rr: R16) -> CycleState {
        let [hi, lo] = self.regs.read16(rr).to_be_bytes();
        match self.micro_stage {
            0 => {
                // Internal delay before the first stack write.
                self.tick_mcycle(bus);
                CycleState::Continue
            }
            1 => {
                self.push8(bus, hi);
                CycleState::Continue
            }
            _ => {
                self.push8(bus, lo);
                CycleState::Done
            }
        }
    }

    pub(super) fn exec_pop<B: Bus>(&mut self, bus: &mut B, rr: R16) -> CycleState {
        match self.micro_stage {
            0 => {
                self.micro_imm16 = self.pop8(bus) as u16;
                CycleState::Continue
            }
            _ => {
                let hi = self.pop8(bus) as u16;
                // POP AF drops the low nibble of F through `write16`.
                self.regs.write16(rr, (hi << 8) | self.micro_imm16);
                CycleState::Done
            }
        }
    }
}
