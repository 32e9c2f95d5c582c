use crate::cpu::alu;
use crate::cpu::instructions::Indirect;
use crate::cpu::regs::{R16, R8};
use crate::cpu::{Bus, Cpu, CycleState};

impl Cpu {
    pub(super) fn exec_ld_r_r(&mut self, dst: R8, src: R8) -> CycleState {
        let value = self.regs.read8(src);
        self.regs.write8(dst, value);
        CycleState::Done
    }

    pub(super) fn exec_ld_r_imm<B: Bus>(&mut self, bus: &mut B, r: R8) -> CycleState {
        let value = self.fetch8(bus);
        self.regs.write8(r, value);
        CycleState::Done
    }

    pub(super) fn exec_ld_r_hl<B: Bus>(&mut self, bus: &mut B, r: R8) -> CycleState {
        let value = self.cycle_read(bus, self.regs.hl());
        self.regs.write8(r, value);
        CycleState::Done
    }

    pub(super) fn exec_ld_hl_r<B: Bus>(&mut self, bus: &mut B, r: R8) -> CycleState {
        let value = self.regs.read8(r);
        self.cycle_write(bus, self.regs.hl(), value);
        CycleState::Done
    }

    pub(super) fn exec_ld_hl_imm<B: Bus>(&mut self, bus: &mut B) -> CycleState {
        match self.micro_stage {
            0 => {
                self.fetch_imm_lo(bus);
                CycleState::Continue
            }
            _ => {
                self.cycle_write(bus, self.regs.hl(), self.micro_imm16 as u8);
                CycleState::Done
            }
        }
    }

    /// Address of an accumulator load/store, or `None` while its operand
    /// bytes are still being fetched.
    fn indirect_address<B: Bus>(&mut self, bus: &mut B, ind: Indirect) -> Option<u16> {
        match ind {
            Indirect::BC => Some(self.regs.bc()),
            Indirect::DE => Some(self.regs.de()),
            Indirect::HlInc => {
                let hl = self.regs.hl();
                self.regs.set_hl(hl.wrapping_add(1));
                Some(hl)
            }
            Indirect::HlDec => {
                let hl = self.regs.hl();
                self.regs.set_hl(hl.wrapping_sub(1));
                Some(hl)
            }
            Indirect::HighC => Some(0xFF00 | self.regs.c as u16),
            Indirect::HighImm => match self.micro_stage {
                0 => {
                    self.fetch_imm_lo(bus);
                    None
                }
                _ => Some(0xFF00 | self.micro_imm16),
            },
            Indirect::Absolute => match self.micro_stage {
                0 => {
                    self.fetch_imm_lo(bus);
                    None
                }
                1 => {
                    self.fetch_imm_hi(bus);
                    None
                }
                _ => Some(self.micro_imm16),
            },
        }
    }

    pub(super) fn exec_ld_a_ind<B: Bus>(&mut self, bus: &mut B, ind: Indirect) -> CycleState {
        match self.indirect_address(bus, ind) {
            Some(addr) => {
                self.regs.a = self.cycle_read(bus, addr);
                CycleState::Done
            }
            None => CycleState::Continue,
        }
    }

    pub(super) fn exec_ld_ind_a<B: Bus>(&mut self, bus: &mut B, ind: Indirect) -> CycleState {
        match self.indirect_address(bus, ind) {
            Some(addr) => {
                self.cycle_write(bus, addr, self.regs.a);
                CycleState::Done
            }
            None => CycleState::Continue,
        }
    }

    pub(super) fn exec_ld_rr_imm<B: Bus>(&mut self, bus: &mut B, rr: R16) -> CycleState {
        match self.micro_stage {
            0 => {
                self.fetch_imm_lo(bus);
                CycleState::Continue
            }
            _ => {
                self.fetch_imm_hi(bus);
                self.regs.write16(rr, self.micro_imm16);
                CycleState::Done
            }
        }
    }

    /// LD (nn),SP
    pub(super) fn exec_ld_abs_sp<B: Bus>(&mut self, bus: &mut B) -> CycleState {
        let [sp_hi, sp_lo] = self.regs.sp.to_be_bytes();
        match self.micro_stage {
            0 => {
                self.fetch_imm_lo(bus);
                CycleState::Continue
            }
            1 => {
                self.fetch_imm_hi(bus);
                CycleState::Continue
            }
            2 => {
                self.cycle_write(bus, self.micro_imm16, sp_lo);
                CycleState::Continue
            }
            _ => {
                self.cycle_write(bus, self.micro_imm16.wrapping_add(1), sp_hi);
                CycleState::Done
            }
        }
    }

    pub(super) fn exec_ld_sp_hl<B: Bus>(&mut self, bus: &mut B) -> CycleState {
        self.tick_mcycle(bus);
        self.regs.sp = self.regs.hl();
        CycleState::Done
    }

    /// LD HL,SP+e
    pub(super) fn exec_ld_hl_sp_e<B: Bus>(&mut self, bus: &mut B) -> CycleState {
        match self.micro_stage {
            0 => {
                self.fetch_imm_lo(bus);
                CycleState::Continue
            }
            _ => {
                self.tick_mcycle(bus);
                let (value, flags) = alu::add_sp_signed(self.regs.sp, self.micro_imm16 as u8);
                self.regs.set_hl(value);
                self.regs.set_flags(flags);
                CycleState::Done
            }
        }
    }
}
