use crate::cpu::alu::{self, AluResult};
use crate::cpu::instructions::{AluOp, Op, Src8, Target};
use crate::cpu::regs::{Flags, R16};
use crate::cpu::{Bus, Cpu, CycleState};

impl Cpu {
    pub(super) fn exec_alu<B: Bus>(&mut self, bus: &mut B, op: AluOp, src: Src8) -> CycleState {
        let value = match src {
            Src8::Reg(r) => self.regs.read8(r),
            Src8::Hl => self.cycle_read(bus, self.regs.hl()),
            Src8::Imm => self.fetch8(bus),
        };
        self.apply_alu(op, value);
        CycleState::Done
    }

    fn apply_alu(&mut self, op: AluOp, value: u8) {
        let a = self.regs.a;
        let carry = self.regs.flag(Flags::C);
        let result = match op {
            AluOp::Add => alu::add8(a, value, false),
            AluOp::Adc => alu::add8(a, value, carry),
            AluOp::Sub | AluOp::Cp => alu::sub8(a, value, false),
            AluOp::Sbc => alu::sub8(a, value, carry),
            AluOp::And => alu::and8(a, value),
            AluOp::Xor => alu::xor8(a, value),
            AluOp::Or => alu::or8(a, value),
        };
        self.regs.set_flags(result.flags);
        if op != AluOp::Cp {
            self.regs.a = result.value;
        }
    }

    /// INC/DEC on a register or `(HL)`; C is preserved.
    pub(super) fn exec_inc_dec8<B: Bus>(
        &mut self,
        bus: &mut B,
        target: Target,
        f: fn(u8) -> AluResult,
    ) -> CycleState {
        let mask = Flags::Z | Flags::N | Flags::H;
        match target {
            Target::Reg(r) => {
                let result = f(self.regs.read8(r));
                self.regs.write8(r, result.value);
                self.regs.update_flags(mask, result.flags);
                CycleState::Done
            }
            Target::Hl => match self.micro_stage {
                0 => {
                    self.micro_imm16 = self.cycle_read(bus, self.regs.hl()) as u16;
                    CycleState::Continue
                }
                _ => {
                    let result = f(self.micro_imm16 as u8);
                    self.cycle_write(bus, self.regs.hl(), result.value);
                    self.regs.update_flags(mask, result.flags);
                    CycleState::Done
                }
            },
        }
    }

    /// INC rr / DEC rr; `delta` is 1 or 0xFFFF.
    pub(super) fn exec_step16<B: Bus>(&mut self, bus: &mut B, rr: R16, delta: u16) -> CycleState {
        self.tick_mcycle(bus);
        let value = self.regs.read16(rr).wrapping_add(delta);
        self.regs.write16(rr, value);
        CycleState::Done
    }

    pub(super) fn exec_add_hl<B: Bus>(&mut self, bus: &mut B, rr: R16) -> CycleState {
        self.tick_mcycle(bus);
        let (value, flags) = alu::add16(self.regs.hl(), self.regs.read16(rr));
        self.regs.set_hl(value);
        self.regs.update_flags(Flags::N | Flags::H | Flags::C, flags);
        CycleState::Done
    }

    pub(super) fn exec_add_sp_e<B: Bus>(&mut self, bus: &mut B) -> CycleState {
        match self.micro_stage {
            0 => {
                self.fetch_imm_lo(bus);
                CycleState::Continue
            }
            1 => {
                self.tick_mcycle(bus);
                CycleState::Continue
            }
            _ => {
                self.tick_mcycle(bus);
                let (value, flags) = alu::add_sp_signed(self.regs.sp, self.micro_imm16 as u8);
                self.regs.sp = value;
                self.regs.set_flags(flags);
                CycleState::Done
            }
        }
    }

    /// RLCA/RRCA/RLA/RRA: like their CB forms but Z is always cleared.
    pub(super) fn exec_rotate_a(&mut self, op: Op) -> CycleState {
        let a = self.regs.a;
        let carry = self.regs.flag(Flags::C);
        let result = match op {
            Op::Rlca => alu::rlc(a),
            Op::Rrca => alu::rrc(a),
            Op::Rla => alu::rl(a, carry),
            _ => alu::rr(a, carry),
        };
        self.regs.a = result.value;
        self.regs.set_flags(result.flags & Flags::C);
        CycleState::Done
    }

    pub(super) fn exec_daa(&mut self) -> CycleState {
        let result = alu::daa(self.regs.a, self.regs.flags());
        self.regs.a = result.value;
        self.regs.set_flags(result.flags);
        CycleState::Done
    }

    pub(super) fn exec_cpl(&mut self) -> CycleState {
        let result = alu::cpl(self.regs.a);
        self.regs.a = result.value;
        self.regs.update_flags(Flags::N | Flags::H, result.flags);
        CycleState::Done
    }

    pub(super) fn exec_scf(&mut self) -> CycleState {
        self.regs.update_flags(Flags::N | Flags::H | Flags::C, Flags::C);
        CycleState::Done
    }

    pub(super) fn exec_ccf(&mut self) -> CycleState {
        let carry = if self.regs.flag(Flags::C) {
            Flags::empty()
        } else {
            Flags::C
        };
        self.regs.update_flags(Flags::N | Flags::H | Flags::C, carry);
        CycleState::Done
    }
}
