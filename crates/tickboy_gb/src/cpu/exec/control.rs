use crate::cpu::regs::Cond;
use crate::cpu::{Bus, Cpu, CycleState};

impl Cpu {
    #[inline]
    fn branch_taken(&self, cc: Option<Cond>) -> bool {
        cc.map_or(true, |cc| self.regs.condition(cc))
    }

    pub(super) fn exec_jp<B: Bus>(&mut self, bus: &mut B, cc: Option<Cond>) -> CycleState {
        match self.micro_stage {
            0 => {
                self.fetch_imm_lo(bus);
                CycleState::Continue
            }
            1 => {
                self.fetch_imm_hi(bus);
                if self.branch_taken(cc) {
                    CycleState::Continue
                } else {
                    CycleState::Done
                }
            }
            _ => {
                self.tick_mcycle(bus);
                self.regs.pc = self.micro_imm16;
                CycleState::Done
            }
        }
    }

    pub(super) fn exec_jr<B: Bus>(&mut self, bus: &mut B, cc: Option<Cond>) -> CycleState {
        match self.micro_stage {
            0 => {
                self.fetch_imm_lo(bus);
                if self.branch_taken(cc) {
                    CycleState::Continue
                } else {
                    CycleState::Done
                }
            }
            _ => {
                self.tick_mcycle(bus);
                let offset = self.micro_imm16 as u8 as i8;
                self.regs.pc = self.regs.pc.wrapping_add_signed(offset as i16);
                CycleState::Done
            }
        }
    }

    pub(super) fn exec_call<B: Bus>(&mut self, bus: &mut B, cc: Option<Cond>) -> CycleState {
        let [ret_hi, ret_lo] = self.regs.pc.to_be_bytes();
        match self.micro_stage {
            0 => {
                self.fetch_imm_lo(bus);
                CycleState::Continue
            }
            1 => {
                self.fetch_imm_hi(bus);
                if self.branch_taken(cc) {
                    CycleState::Continue
                } else {
                    CycleState::Done
                }
            }
            2 => {
                self.tick_mcycle(bus);
                CycleState::Continue
            }
            3 => {
                self.push8(bus, ret_hi);
                CycleState::Continue
            }
            _ => {
                self.push8(bus, ret_lo);
                self.regs.pc = self.micro_imm16;
                CycleState::Done
            }
        }
    }

    /// RET and RETI; RETI sets IME without delay.
    pub(super) fn exec_ret<B: Bus>(&mut self, bus: &mut B, enable_interrupts: bool) -> CycleState {
        match self.micro_stage {
            0 => {
                self.micro_imm16 = self.pop8(bus) as u16;
                CycleState::Continue
            }
            1 => {
                let hi = self.pop8(bus) as u16;
                self.micro_imm16 |= hi << 8;
                CycleState::Continue
            }
            _ => {
                self.tick_mcycle(bus);
                self.regs.pc = self.micro_imm16;
                if enable_interrupts {
                    bus.interrupts_mut().enable();
                }
                CycleState::Done
            }
        }
    }

    pub(super) fn exec_ret_cc<B: Bus>(&mut self, bus: &mut B, cc: Cond) -> CycleState {
        match self.micro_stage {
            0 => {
                // Condition evaluation costs an M-cycle either way.
                self.tick_mcycle(bus);
                if self.regs.condition(cc) {
                    CycleState::Continue
                } else {
                    CycleState::Done
                }
            }
            1 => {
                self.micro_imm16 = self.pop8(bus) as u16;
                CycleState::Continue
            }
            2 => {
                let hi = self.pop8(bus) as u16;
                self.micro_imm16 |= hi << 8;
                CycleState::Continue
            }
            _ => {
                self.tick_mcycle(bus);
                self.regs.pc = self.micro_imm16;
                CycleState::Done
            }
        }
    }

    pub(super) fn exec_rst<B: Bus>(&mut self, bus: &mut B, vector: u8) -> CycleState {
        let [ret_hi, ret_lo] = self.regs.pc.to_be_bytes();
        match self.micro_stage {
            0 => {
                self.tick_mcycle(bus);
                CycleState::Continue
            }
            1 => {
                self.push8(bus, ret_hi);
                CycleState::Continue
            }
            _ => {
                self.push8(bus, ret_lo);
                self.regs.pc = vector as u16;
                CycleState::Done
            }
        }
    }
}
